pub mod error;
pub mod params;
pub mod types;
pub mod validate;

pub use error::QueryError;
pub use params::normalize;
pub use types::*;
pub use validate::validate;

use std::collections::HashMap;

/// Normalizes then validates query-string values for `endpoint`
pub fn translate(
    params: &HashMap<String, String>,
    endpoint: Endpoint,
    limits: &QueryLimits,
) -> Result<QueryDescriptor, QueryError> {
    let raw = normalize(params, endpoint, limits)?;
    validate(raw, endpoint)
}
