//! # nlq: Natural-Language Query Compiler
//!
//! nlq turns a short English sentence into a query for one of two backends:
//! SQL text for a relational engine, or an ordered aggregation pipeline for a
//! document store.
//!
//! ## Quick Example
//!
//! ```
//! use nlq::prelude::*;
//!
//! let schema = Schema::new().with_table("loan", &["person_age", "loan_amnt"]);
//!
//! let sql = nlq::compile_relational(
//!     "choose loan_amnt from loan where person_age greater 25",
//!     &schema,
//! )
//! .unwrap();
//! assert_eq!(sql, "SELECT loan.loan_amnt FROM loan WHERE loan.person_age > 25;");
//!
//! let query = nlq::compile_document_query("sum loan_amnt from loan by person_age", &schema)
//!     .unwrap();
//! assert_eq!(query.pipeline().unwrap().len(), 2);
//! ```
//!
//! ## How a sentence is read
//!
//! Matching is lexical. Trigger words open a clause and the first word of
//! another clause closes it:
//!
//! | Clause       | Trigger words                            |
//! |--------------|------------------------------------------|
//! | Selection    | `choose`, `take`, `select`, `pick`       |
//! | Filter       | `where`, `if`, `when`                    |
//! | Join         | `combine`, `merge`, `join`, `link`, ...  |
//! | Grouping     | `group`, `by`, `for`                     |
//! | Aggregate    | `sum`, `total`, `average`, `count`, `min`, `max` |
//! | Ordering     | `sort`, `order`, `arrange`, `ascending`, `descending`, ... |
//! | Having       | `having`, `with`                         |
//!
//! Table and column names are found by substring against the [`Schema`].
//! Stages always assemble in the same order: filter, join, grouping,
//! ordering, post-aggregate filter, projection.

pub mod ast;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod keywords;
pub mod parser;
pub mod plan;
pub mod resolver;
pub mod schema;
pub mod transpiler;

pub use crate::engine::Translator;
pub use crate::error::{NlqError, NlqResult};
pub use crate::schema::Schema;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::classifier::{ExecutionMode, ModePolicy};
    pub use crate::config::NlqConfig;
    pub use crate::engine::Translator;
    pub use crate::error::*;
    pub use crate::keywords::{Role, Taxonomy};
    pub use crate::plan::QueryPlan;
    pub use crate::schema::Schema;
    pub use crate::transpiler::{DocumentBody, DocumentQuery, ToMongo, ToSql};
}

/// Translate a sentence into SQL text with the default translator.
///
/// # Example
///
/// ```
/// use nlq::Schema;
///
/// let schema = Schema::new().with_table("loan", &["person_age"]);
/// let sql = nlq::compile_relational("show me everything", &schema).unwrap();
/// assert_eq!(sql, "SELECT * FROM table_a;");
/// ```
pub fn compile_relational(text: &str, schema: &Schema) -> NlqResult<String> {
    Translator::default().compile_relational(text, schema)
}

/// Translate a sentence into a document-store query with the default translator.
pub fn compile_document_query(
    text: &str,
    schema: &Schema,
) -> NlqResult<transpiler::DocumentQuery> {
    Translator::default().compile_document(text, schema)
}
