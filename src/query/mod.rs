//! # Query Composition
//!
//! Declarative query specs rendered into SQLite statements.
//!
//! # Flow
//!
//! 1. A handler describes a read as a [`QuerySpec`]
//! 2. [`compose`] renders select, join, where and order clauses
//! 3. [`QueryExecutor`] runs the statement against a dataset handle
//!
//! Identifier and literal escaping exists only in [`builder`].

pub mod builder;
pub mod errors;
pub mod executor;
pub mod join;
pub mod spec;

pub use builder::{build_order_by, build_select, build_where, escape_identifier, escape_value};
pub use errors::{QueryError, QueryResult};
pub use executor::{QueryExecutor, Row};
pub use join::{build_joins, compose, JoinKind, JoinSpec};
pub use spec::{Direction, OrderSpec, QuerySpec, SelectSpec, SqlValue, WhereSpec, WhereValue};
