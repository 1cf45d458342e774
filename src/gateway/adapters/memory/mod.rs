//! In-memory adapters for gateway ports.

mod source;

pub use source::InMemoryOperationSource;
