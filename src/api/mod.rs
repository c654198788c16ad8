pub mod response;

pub use response::{CorrelationResponse, JsonResponse, PayloadsResponse};
