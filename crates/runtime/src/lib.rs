//! mylite runtime: a SQLite connection that speaks enough MySQL for
//! applications written against it.
//!
//! ```text
//! ┌──────────────┐   rewrite pass   ┌────────────┐
//! │ MySQL-dialect│ ───────────────▶ │   SQLite   │
//! │  statement   │                  │ connection │
//! └──────────────┘                  └─────┬──────┘
//!                                         │ bound value functions
//!                                   ┌─────┴──────┐
//!                                   │  registry  │
//!                                   └────────────┘
//! ```

pub mod connection;

pub use connection::CompatConnection;
