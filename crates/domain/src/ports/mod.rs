pub mod kubernetes;
pub mod registry;
pub mod storage;

pub use kubernetes::*;
pub use registry::*;
pub use storage::*;
