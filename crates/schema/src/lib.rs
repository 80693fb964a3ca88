//! Transactional installation of MySQL-dialect schema definitions on SQLite.

pub mod batch;
pub mod engine;
pub mod error;
pub mod index_names;
pub mod installer;
pub mod rewriter;

pub use batch::split_statements;
pub use engine::DdlEngine;
pub use error::InstallError;
pub use index_names::IndexNameRegistry;
pub use installer::{InstallPlan, InstallReport, InstallState, SchemaInstaller};
pub use rewriter::{PassthroughRewriter, QueryRewriter, RewriteError, Rewritten};
