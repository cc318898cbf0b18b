//! Translation engine.
//!
//! Runs the resolver and the classifier once, then every clause generator,
//! then assembles the plan. Rendering is left to [`ToSql`] and [`ToMongo`].

use tracing::{debug, warn};

use crate::ast::{Fragment, StageKind, Warning, WarningKind};
use crate::classifier::{self, ExecutionMode, ModePolicy};
use crate::config::NlqConfig;
use crate::error::NlqResult;
use crate::generator::{self, GenerationContext, GENERATION_ORDER};
use crate::keywords::{Role, Taxonomy};
use crate::parser::QueryText;
use crate::plan::QueryPlan;
use crate::resolver::{self, DEFAULT_TABLE};
use crate::schema::Schema;
use crate::transpiler::{DocumentQuery, ToMongo, ToSql};

/// Sentence-to-query translator.
///
/// Holds only read-only configuration, so one instance can serve any number
/// of threads.
///
/// # Example
///
/// ```
/// use nlq::{Schema, Translator};
///
/// let schema = Schema::new().with_table("loan", &["person_age", "loan_amnt"]);
/// let sql = Translator::new()
///     .compile_relational("choose loan_amnt from loan where person_age greater 25", &schema)
///     .unwrap();
/// assert_eq!(sql, "SELECT loan.loan_amnt FROM loan WHERE loan.person_age > 25;");
/// ```
#[derive(Debug, Clone)]
pub struct Translator {
    taxonomy: Taxonomy,
    policy: ModePolicy,
    default_table: String,
}

impl Default for Translator {
    fn default() -> Self {
        Self {
            taxonomy: Taxonomy::default(),
            policy: ModePolicy::default(),
            default_table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn with_policy(mut self, policy: ModePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_table(mut self, name: impl Into<String>) -> Self {
        self.default_table = name.into();
        self
    }

    pub fn from_config(config: &NlqConfig) -> Self {
        Self {
            taxonomy: config.taxonomy(),
            policy: config.mode,
            default_table: config.default_table.clone(),
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn policy(&self) -> ModePolicy {
        self.policy
    }

    /// Translate `input` into a backend-neutral plan.
    ///
    /// Errors only when a filter or post-aggregate filter trigger is present
    /// but its condition cannot be built. Everything else degrades into
    /// [`QueryPlan::warnings`].
    pub fn plan(&self, input: &str, schema: &Schema) -> NlqResult<QueryPlan> {
        let text = QueryText::parse(input);
        debug!(tokens = text.len(), "translating {:?}", text.raw());

        let mut warnings = Vec::new();
        let refs = resolver::resolve(&text, schema, &self.default_table, &mut warnings);
        let (mode, primary) = classifier::classify(&text, &refs, &self.taxonomy, self.policy);
        debug!(%mode, %primary, "classified");

        let ctx = GenerationContext {
            text: &text,
            schema,
            refs: &refs,
            taxonomy: &self.taxonomy,
            mode,
        };

        let mut fragments: Vec<Fragment> = Vec::new();
        for kind in GENERATION_ORDER {
            let Some(fragment) = generator::generate(kind, &ctx, &fragments, &mut warnings)? else {
                continue;
            };
            // Retrieval runs a single lookup. Grouping is withheld before its
            // consumers run, so no post-filter or group sort key is built on it.
            if mode == ExecutionMode::Retrieval && kind == StageKind::Grouping {
                warnings.push(Warning::new(
                    WarningKind::StageDropped,
                    "Grouping dropped: retrieval mode runs a single lookup",
                ));
                if ctx.has(Role::Having) {
                    warnings.push(Warning::new(
                        WarningKind::StageDropped,
                        "Post-aggregate filter dropped: no grouping in retrieval mode",
                    ));
                }
                continue;
            }
            debug!(stage = %kind, "fragment generated");
            fragments.push(fragment);
        }

        for warning in &warnings {
            warn!(kind = ?warning.kind, "{}", warning.message);
        }

        Ok(QueryPlan::assemble(mode, primary, fragments, refs, warnings))
    }

    /// Translate `input` into SQL text.
    pub fn compile_relational(&self, input: &str, schema: &Schema) -> NlqResult<String> {
        Ok(self.plan(input, schema)?.to_sql())
    }

    /// Translate `input` into a document-store query.
    pub fn compile_document(&self, input: &str, schema: &Schema) -> NlqResult<DocumentQuery> {
        Ok(self.plan(input, schema)?.to_mongo())
    }
}
