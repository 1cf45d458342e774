//! Port contracts for the host application's operations.

mod invocable;
mod source;

pub use invocable::{Invocable, InvocationError, InvocationResult, encode_result};
pub use source::{
    OperationSource, OperationSourceError, OperationSourceResult, RawOperation, RawParameter,
};
