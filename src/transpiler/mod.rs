//! Renderers for the assembled plan.
//!
//! A [`QueryPlan`](crate::plan::QueryPlan) is backend-neutral. The relational
//! form renders it into SQL text and the document form into ordered
//! aggregation stages (or a single find document in retrieval mode).

pub mod mongo;
pub mod sql;

pub use mongo::{DocumentBody, DocumentQuery, ToMongo};
pub use sql::ToSql;
