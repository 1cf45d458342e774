//! Adapter implementations for gateway ports.

pub mod memory;

mod function;

pub use function::{AsyncFnInvocable, FnInvocable};
