pub mod durations;
pub mod manager;
pub mod postgres;
pub mod records;
pub mod sql;

pub use durations::compute_durations;
pub use manager::{DatabaseError, DatabaseManager};
pub use postgres::PgPayloadStore;
pub use records::{PayloadRecord, PayloadStatusRecord};

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::query::QueryDescriptor;

/// Total matches for the filters plus the requested window of them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadPage {
    pub total: i64,
    pub records: Vec<PayloadRecord>,
}

/// Data access for payload status queries.
///
/// Implementations receive descriptors that already passed validation, so
/// `sort_by` is always a whitelisted field for the endpoint.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Count of all payloads matching the filters, and the page window of them
    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<PayloadPage, DatabaseError>;

    /// Every status for `request_id`, ordered and trimmed per the descriptor.
    /// An empty result means the id is unknown.
    async fn fetch_by_request_id(
        &self,
        request_id: &str,
        query: &QueryDescriptor,
    ) -> Result<Vec<PayloadStatusRecord>, DatabaseError>;

    fn compute_durations(&self, records: &[PayloadStatusRecord]) -> BTreeMap<String, String> {
        compute_durations(records)
    }

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
