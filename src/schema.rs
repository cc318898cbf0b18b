//! Schema descriptions supplied by the caller.
//!
//! The translator never talks to a database; it only needs table names and
//! their column names. Schemas load from JSON or TOML.
//!
//! # Example
//! ```
//! use nlq::schema::Schema;
//!
//! let json = r#"{
//!     "tables": [{ "name": "loan", "columns": ["person_age", "loan_amnt"] }]
//! }"#;
//!
//! let schema = Schema::from_json(json).unwrap();
//! assert!(schema.has_column("loan", "loan_amnt"));
//! ```
//!
//! The flat catalog shape produced by the data-loading layer is accepted as well:
//! ```
//! use nlq::schema::Schema;
//!
//! let json = r#"{ "collections": ["loan"], "loan": ["person_age", "loan_amnt"] }"#;
//! let schema = Schema::from_json(json).unwrap();
//! assert_eq!(schema.table_names(), vec!["loan"]);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::error::{NlqError, NlqResult};

/// Tables and their columns, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

impl TableDef {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with its columns. Re-adding a table replaces its columns.
    pub fn add_table(&mut self, name: &str, columns: &[&str]) {
        let def = TableDef {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        };
        match self.tables.iter_mut().find(|t| t.name == name) {
            Some(existing) => *existing = def,
            None => self.tables.push(def),
        }
    }

    /// Builder-style variant of [`Schema::add_table`].
    pub fn with_table(mut self, name: &str, columns: &[&str]) -> Self {
        self.add_table(name, columns);
        self
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.table(table).is_some_and(|t| t.has_column(column))
    }

    /// Load from JSON, accepting either the structured shape
    /// (`{"tables": [{"name", "columns"}]}`) or the flat catalog shape
    /// (`{"tables": ["t"], "t": ["c"]}`, `collections` also accepted).
    pub fn from_json(json: &str) -> NlqResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let list = value
            .get("tables")
            .or_else(|| value.get("collections"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| NlqError::Schema("missing 'tables' array".to_string()))?;

        if list.iter().all(|entry| entry.is_string()) {
            Self::from_catalog(&value)
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }

    /// Decode the flat catalog shape produced by the data-loading layer.
    pub fn from_catalog(catalog: &serde_json::Value) -> NlqResult<Self> {
        let names = catalog
            .get("tables")
            .or_else(|| catalog.get("collections"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| NlqError::Schema("missing 'tables' array".to_string()))?;

        let mut schema = Schema::new();
        for name in names {
            let name = name
                .as_str()
                .ok_or_else(|| NlqError::Schema(format!("table name is not a string: {}", name)))?;
            let columns = match catalog.get(name) {
                Some(serde_json::Value::Array(cols)) => cols
                    .iter()
                    .map(|c| {
                        c.as_str().map(str::to_string).ok_or_else(|| {
                            NlqError::Schema(format!("column of '{}' is not a string: {}", name, c))
                        })
                    })
                    .collect::<NlqResult<Vec<_>>>()?,
                Some(other) => {
                    return Err(NlqError::Schema(format!(
                        "columns of '{}' must be an array, got {}",
                        name, other
                    )));
                }
                None => Vec::new(),
            };
            schema.tables.push(TableDef {
                name: name.to_string(),
                columns,
            });
        }
        Ok(schema)
    }

    /// Load from TOML:
    ///
    /// ```toml
    /// [[tables]]
    /// name = "loan"
    /// columns = ["person_age", "loan_amnt"]
    /// ```
    pub fn from_toml(input: &str) -> NlqResult<Self> {
        toml::from_str(input).map_err(|e| NlqError::Schema(e.to_string()))
    }

    /// Load a schema file, choosing the format by extension (`.toml`, otherwise JSON).
    pub fn load(path: impl AsRef<Path>) -> NlqResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Closest table name within a length-dependent edit distance.
    pub fn suggest_table(&self, input: &str) -> Option<&str> {
        let threshold = match input.len() {
            0..=2 => 0,
            3..=5 => 2,
            _ => 3,
        };

        let mut best: Option<(&str, usize)> = None;
        for table in &self.tables {
            let dist = levenshtein(input, &table.name);
            if dist <= threshold && best.is_none_or(|(_, d)| dist < d) {
                best = Some((table.name.as_str(), dist));
            }
        }
        best.map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_json() {
        let schema = Schema::from_json(
            r#"{"tables": [{"name": "loan", "columns": ["person_age"]}, {"name": "debt"}]}"#,
        )
        .unwrap();
        assert_eq!(schema.table_names(), vec!["loan", "debt"]);
        assert!(schema.has_column("loan", "person_age"));
        assert!(schema.table("debt").unwrap().columns.is_empty());
    }

    #[test]
    fn test_catalog_json() {
        let schema = Schema::from_json(
            r#"{"tables": ["income", "debt"], "income": ["id", "amount"], "debt": ["debt_id"]}"#,
        )
        .unwrap();
        assert_eq!(schema.table_names(), vec!["income", "debt"]);
        assert!(schema.has_column("income", "amount"));
        assert!(!schema.has_column("debt", "amount"));
    }

    #[test]
    fn test_catalog_rejects_bad_columns() {
        let err = Schema::from_json(r#"{"tables": ["loan"], "loan": "oops"}"#).unwrap_err();
        assert!(err.to_string().contains("must be an array"));
    }

    #[test]
    fn test_missing_tables() {
        assert!(Schema::from_json(r#"{"loan": []}"#).is_err());
    }

    #[test]
    fn test_toml() {
        let schema = Schema::from_toml(
            r#"
            [[tables]]
            name = "loan"
            columns = ["person_age", "loan_amnt"]
            "#,
        )
        .unwrap();
        assert!(schema.has_column("loan", "loan_amnt"));
    }

    #[test]
    fn test_suggest_table() {
        let schema = Schema::new()
            .with_table("salaries", &["salary"])
            .with_table("loan", &["loan_amnt"]);
        assert_eq!(schema.suggest_table("salary"), Some("salaries"));
        assert_eq!(schema.suggest_table("loans"), Some("loan"));
        assert_eq!(schema.suggest_table("xyz"), None);
    }

    #[test]
    fn test_add_table_replaces() {
        let mut schema = Schema::new();
        schema.add_table("loan", &["a"]);
        schema.add_table("loan", &["b"]);
        assert_eq!(schema.tables.len(), 1);
        assert!(schema.has_column("loan", "b"));
    }
}
