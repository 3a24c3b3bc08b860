pub mod models;
pub mod ports;
pub mod services;

pub use batch_job_errors::{ControllerError, ControllerResult};
pub use models::*;
pub use ports::*;
pub use services::*;
