//! Execution-mode classifier.

use serde::{Deserialize, Serialize};

use crate::keywords::{Role, Taxonomy};
use crate::parser::QueryText;
use crate::resolver::ResolvedRefs;

/// How the final query executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Single lookup with at most one filter.
    Retrieval,
    /// Ordered multi-stage pipeline.
    Aggregation,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Retrieval => write!(f, "retrieval"),
            ExecutionMode::Aggregation => write!(f, "aggregation"),
        }
    }
}

/// Policy deciding between retrieval and aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModePolicy {
    /// Every query runs as a pipeline.
    #[default]
    AlwaysAggregate,
    /// Pipeline only when a join or aggregate word is present.
    KeywordDriven,
}

/// Decide the execution mode and the primary table.
pub fn classify(
    text: &QueryText,
    refs: &ResolvedRefs,
    taxonomy: &Taxonomy,
    policy: ModePolicy,
) -> (ExecutionMode, String) {
    let mode = match policy {
        ModePolicy::AlwaysAggregate => ExecutionMode::Aggregation,
        ModePolicy::KeywordDriven => {
            let staged = text.any(|t| {
                taxonomy.is(Role::Join, &t.lower) || taxonomy.is(Role::Aggregate, &t.lower)
            });
            if staged {
                ExecutionMode::Aggregation
            } else {
                ExecutionMode::Retrieval
            }
        }
    };
    (mode, refs.primary().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{resolve, DEFAULT_TABLE};
    use crate::schema::Schema;

    fn run(query: &str, policy: ModePolicy) -> (ExecutionMode, String) {
        let schema = Schema::new()
            .with_table("loan", &["person_age", "loan_amnt"])
            .with_table("purchases", &["person_age"]);
        let text = QueryText::parse(query);
        let refs = resolve(&text, &schema, DEFAULT_TABLE, &mut Vec::new());
        classify(&text, &refs, &Taxonomy::default(), policy)
    }

    #[test]
    fn test_always_aggregate_is_default() {
        assert_eq!(ModePolicy::default(), ModePolicy::AlwaysAggregate);
        let (mode, primary) = run("choose loan_amnt from loan", ModePolicy::default());
        assert_eq!(mode, ExecutionMode::Aggregation);
        assert_eq!(primary, "loan");
    }

    #[test]
    fn test_keyword_driven() {
        let (mode, _) = run("choose loan_amnt from loan", ModePolicy::KeywordDriven);
        assert_eq!(mode, ExecutionMode::Retrieval);

        let (mode, _) = run("sum loan_amnt from loan", ModePolicy::KeywordDriven);
        assert_eq!(mode, ExecutionMode::Aggregation);

        let (mode, primary) = run("merge purchases and loan", ModePolicy::KeywordDriven);
        assert_eq!(mode, ExecutionMode::Aggregation);
        // Schema order, not sentence order.
        assert_eq!(primary, "loan");
    }

    #[test]
    fn test_primary_falls_back_to_synthetic() {
        let (_, primary) = run("show everything", ModePolicy::default());
        assert_eq!(primary, DEFAULT_TABLE);
    }
}
