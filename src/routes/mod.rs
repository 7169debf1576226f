mod health_check;
pub mod response;
pub mod subscribers;

pub use health_check::health_check;
pub use response::{ApiError, Envelope};
