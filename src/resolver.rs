//! Schema resolver: which tables and columns does the sentence mention?
//!
//! Matching is by literal substring of the raw text, in schema order. It is
//! not word-boundary safe: `loan` is detected inside `loan_amnt`. That is a
//! known limitation of the lexical model, not something to patch around here.

use serde::Serialize;
use tracing::debug;

use crate::ast::{ColumnRef, Warning, WarningKind};
use crate::parser::QueryText;
use crate::schema::Schema;

/// Name of the synthetic table used when no schema table is mentioned.
pub const DEFAULT_TABLE: &str = "table_a";

/// Columns resolved for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColumnSet {
    /// No column was mentioned: all columns.
    Wildcard,
    Named(Vec<String>),
}

impl ColumnSet {
    pub fn contains(&self, column: &str) -> bool {
        match self {
            ColumnSet::Wildcard => false,
            ColumnSet::Named(cols) => cols.iter().any(|c| c == column),
        }
    }
}

/// Tables and columns found literally in the query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRefs {
    tables: Vec<(String, ColumnSet)>,
    synthetic: bool,
}

impl ResolvedRefs {
    /// Detected table names, in order. Never empty.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(name, _)| name.as_str())
    }

    /// First detected table.
    pub fn primary(&self) -> &str {
        self.tables
            .first()
            .map(|(name, _)| name.as_str())
            .unwrap_or(DEFAULT_TABLE)
    }

    /// True when no real table was recognized and the synthetic default stands in.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn columns(&self, table: &str) -> Option<&ColumnSet> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, cols)| cols)
    }

    /// Qualify `token` against the first detected table that resolved it.
    pub fn resolve_column(&self, token: &str) -> Option<ColumnRef> {
        self.tables
            .iter()
            .find(|(_, cols)| cols.contains(token))
            .map(|(table, _)| ColumnRef::new(table.as_str(), token))
    }
}

/// Resolve `text` against `schema`.
///
/// Never fails: an unrecognized sentence resolves to a single synthetic
/// `default_table` with wildcard columns and an [`WarningKind::UnknownTable`]
/// warning.
pub fn resolve(
    text: &QueryText,
    schema: &Schema,
    default_table: &str,
    warnings: &mut Vec<Warning>,
) -> ResolvedRefs {
    let raw = text.raw();
    let mut tables = Vec::new();

    for table in schema.tables.iter().filter(|t| raw.contains(t.name.as_str())) {
        let named: Vec<String> = table
            .columns
            .iter()
            .filter(|col| raw.contains(col.as_str()))
            .cloned()
            .collect();

        let cols = if named.is_empty() {
            warnings.push(Warning::new(
                WarningKind::NoColumns,
                format!("No column names found for '{}'; using all columns", table.name),
            ));
            ColumnSet::Wildcard
        } else {
            ColumnSet::Named(named)
        };
        tables.push((table.name.clone(), cols));
    }

    if tables.is_empty() {
        let suggestion = text
            .tokens()
            .iter()
            .find_map(|t| schema.suggest_table(&t.lower));
        let message = match suggestion {
            Some(name) => format!(
                "No table names found; using default '{}'. Did you mean '{}'?",
                default_table, name
            ),
            None => format!("No table names found; using default '{}'", default_table),
        };
        warnings.push(Warning::new(WarningKind::UnknownTable, message));
        return ResolvedRefs {
            tables: vec![(default_table.to_string(), ColumnSet::Wildcard)],
            synthetic: true,
        };
    }

    debug!(?tables, "resolved schema references");
    ResolvedRefs {
        tables,
        synthetic: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new()
            .with_table("salaries", &["salary", "job_title", "person_gender"])
            .with_table("loan", &["person_age", "loan_amnt", "person_gender"])
            .with_table("purchases", &["person_age", "product_category"])
    }

    fn run(query: &str) -> (ResolvedRefs, Vec<Warning>) {
        let mut warnings = Vec::new();
        let refs = resolve(&QueryText::parse(query), &schema(), DEFAULT_TABLE, &mut warnings);
        (refs, warnings)
    }

    #[test]
    fn test_detects_tables_and_columns() {
        let (refs, warnings) = run("choose loan_amnt from loan where person_age greater 25");
        assert_eq!(refs.tables().collect::<Vec<_>>(), vec!["loan"]);
        assert_eq!(refs.primary(), "loan");
        assert_eq!(
            refs.columns("loan"),
            Some(&ColumnSet::Named(vec!["person_age".into(), "loan_amnt".into()]))
        );
        assert!(warnings.is_empty());
        assert!(!refs.is_synthetic());
    }

    #[test]
    fn test_table_without_columns_is_wildcard() {
        let (refs, warnings) = run("choose everything from loan");
        assert_eq!(refs.columns("loan"), Some(&ColumnSet::Wildcard));
        assert_eq!(warnings[0].kind, WarningKind::NoColumns);
    }

    #[test]
    fn test_per_table_wildcard() {
        let (refs, _) = run("combine loan and purchases on person_age");
        assert!(refs.columns("loan").unwrap().contains("person_age"));
        assert!(refs.columns("purchases").unwrap().contains("person_age"));

        let (refs, _) = run("combine loan and salaries");
        assert_eq!(refs.columns("salaries"), Some(&ColumnSet::Wildcard));
    }

    #[test]
    fn test_fallback_table() {
        let (refs, warnings) = run("show me everything");
        assert!(refs.is_synthetic());
        assert_eq!(refs.primary(), DEFAULT_TABLE);
        assert_eq!(refs.columns(DEFAULT_TABLE), Some(&ColumnSet::Wildcard));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnknownTable);
    }

    #[test]
    fn test_fallback_suggests_table() {
        let (_, warnings) = run("choose salary from salary_table");
        // "salary" is not a table name, but "salaries" is close to it.
        assert!(warnings[0].message.contains("Did you mean 'salaries'?"));
    }

    #[test]
    fn test_resolve_column_uses_first_table() {
        let (refs, _) = run("combine loan and purchases on person_age");
        assert_eq!(
            refs.resolve_column("person_age"),
            Some(ColumnRef::new("loan", "person_age"))
        );
        assert_eq!(refs.resolve_column("salary"), None);
    }
}
