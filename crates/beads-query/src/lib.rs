//! DAG oracle (C3): pure queries over the dependency graph -- ready, blocked,
//! unblocks, critical path, cycle prediction.
//!
//! Operates entirely over an in-memory [`DagView`] snapshot so it has no
//! storage dependency and is unit-testable with plain fixtures.

pub mod dag_view;
pub mod error;
pub mod oracle;

pub use dag_view::DagView;
pub use error::{ErrorKind, QueryError, Result};
pub use oracle::{blocked, critical_path, ready, unblocks, would_cycle};
