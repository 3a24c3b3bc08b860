pub mod message_format;
pub mod owner_resolver;

pub use message_format::format_message;
pub use owner_resolver::{OwnerResolver, DEFAULT_MAX_HOPS};
