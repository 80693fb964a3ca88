//! MySQL built-in functions for SQLite.
//!
//! [`FunctionRegistry`] holds the emulated built-ins. Value functions are
//! bound into a connection with [`bind_registry`]; syntax-rewrite functions
//! are applied to statement text by [`StatementRewriter`] before execution.

pub mod bind;
pub mod datetime;
pub mod error;
pub mod metadata;
pub mod misc;
pub mod numeric;
pub mod registry;
pub mod rewrite;
pub mod string;
pub mod value;

pub use bind::bind_registry;
pub use datetime::{IntervalExpression, IntervalUnit, DATE_FORMAT_MAP};
pub use error::FunctionError;
pub use metadata::{SchemaMetadata, StaticSchema};
pub use registry::{Arity, Call, CallOutcome, FunctionEnv, FunctionKind, FunctionRegistry, FunctionSpec};
pub use rewrite::StatementRewriter;
