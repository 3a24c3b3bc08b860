pub mod event;
pub mod execution;
pub mod object;

pub use event::*;
pub use execution::*;
pub use object::*;
