//! Clause generators.
//!
//! Each generator looks at the query through a [`GenerationContext`] and
//! either publishes one [`Fragment`] or nothing. Generators never see each
//! other's internals, only fragments already published in `prior`.

mod filter;
mod grouping;
mod having;
mod join;
mod ordering;
mod projection;

use crate::ast::{ColumnRef, Fragment, GroupBy, Projection, StageKind, Warning};
use crate::classifier::ExecutionMode;
use crate::error::NlqResult;
use crate::keywords::{Role, Taxonomy, Window};
use crate::parser::{QueryText, Token};
use crate::resolver::ResolvedRefs;
use crate::schema::Schema;

/// Order in which generators run. Later generators may read the fragments of
/// earlier ones; this is unrelated to the order stages are assembled in.
pub const GENERATION_ORDER: [StageKind; 6] = [
    StageKind::Filter,
    StageKind::Join,
    StageKind::Grouping,
    StageKind::Projection,
    StageKind::Ordering,
    StageKind::PostFilter,
];

/// Everything a generator may read. Built once per translation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub text: &'a QueryText,
    pub schema: &'a Schema,
    pub refs: &'a ResolvedRefs,
    pub taxonomy: &'a Taxonomy,
    pub mode: ExecutionMode,
}

impl<'a> GenerationContext<'a> {
    /// Position of the first word of `role`.
    pub fn first(&self, role: Role) -> Option<usize> {
        self.text.position(|t| self.taxonomy.is(role, &t.lower))
    }

    pub fn has(&self, role: Role) -> bool {
        self.first(role).is_some()
    }

    /// Tokens from `start` to the first exit word of `window`.
    pub fn window(&self, start: usize, window: Window) -> &'a [Token] {
        let taxonomy = self.taxonomy;
        self.text
            .window(start, |t| taxonomy.is_exit(window, &t.lower))
    }

    pub fn is_exit(&self, window: Window, token: &Token) -> bool {
        self.taxonomy.is_exit(window, &token.lower)
    }

    pub fn is_stop_word(&self, token: &Token) -> bool {
        self.taxonomy.is_stop_word(&token.lower)
    }

    /// Resolve a token to a column of a detected table.
    pub fn column(&self, token: &Token) -> Option<ColumnRef> {
        self.refs.resolve_column(&token.text)
    }

    /// Resolved columns in `tokens`, in order, without repeats.
    pub fn columns_in(&self, tokens: &[Token]) -> Vec<ColumnRef> {
        let mut columns: Vec<ColumnRef> = Vec::new();
        for col in tokens.iter().filter_map(|t| self.column(t)) {
            if !columns.contains(&col) {
                columns.push(col);
            }
        }
        columns
    }
}

/// Run the generator for `kind`.
///
/// `Ok(None)` is the normal "clause absent" result. Only the filter and
/// post-filter generators return errors.
pub fn generate(
    kind: StageKind,
    ctx: &GenerationContext<'_>,
    prior: &[Fragment],
    warnings: &mut Vec<Warning>,
) -> NlqResult<Option<Fragment>> {
    match kind {
        StageKind::Filter => filter::generate(ctx),
        StageKind::Join => Ok(join::generate(ctx, warnings)),
        StageKind::Grouping => Ok(grouping::generate(ctx, warnings)),
        StageKind::Ordering => Ok(ordering::generate(ctx, prior)),
        StageKind::PostFilter => having::generate(ctx, prior),
        StageKind::Projection => Ok(projection::generate(ctx, prior, warnings)),
    }
}

fn prior_grouping(prior: &[Fragment]) -> Option<&GroupBy> {
    prior.iter().find_map(|f| match f {
        Fragment::Grouping(group) => Some(group),
        _ => None,
    })
}

fn prior_projection(prior: &[Fragment]) -> Option<&Projection> {
    prior.iter().find_map(|f| match f {
        Fragment::Projection(proj) => Some(proj),
        _ => None,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::resolver::{resolve, DEFAULT_TABLE};

    pub fn schema() -> Schema {
        Schema::new()
            .with_table("salaries", &["salary", "job_title", "person_gender"])
            .with_table(
                "loan",
                &["id", "person_age", "loan_amnt", "person_gender", "loan_status"],
            )
            .with_table("purchases", &["id", "person_age", "product_category", "price"])
    }

    /// Parsed inputs kept alive for a [`GenerationContext`].
    pub struct Fixture {
        pub text: QueryText,
        pub schema: Schema,
        pub refs: ResolvedRefs,
        pub taxonomy: Taxonomy,
        pub mode: ExecutionMode,
    }

    impl Fixture {
        pub fn new(query: &str) -> Self {
            let text = QueryText::parse(query);
            let schema = schema();
            let refs = resolve(&text, &schema, DEFAULT_TABLE, &mut Vec::new());
            Self {
                text,
                schema,
                refs,
                taxonomy: Taxonomy::default(),
                mode: ExecutionMode::Aggregation,
            }
        }

        pub fn retrieval(mut self) -> Self {
            self.mode = ExecutionMode::Retrieval;
            self
        }

        pub fn ctx(&self) -> GenerationContext<'_> {
            GenerationContext {
                text: &self.text,
                schema: &self.schema,
                refs: &self.refs,
                taxonomy: &self.taxonomy,
                mode: self.mode,
            }
        }

        /// Run every generator in order, as the translator does.
        pub fn run_all(&self) -> NlqResult<(Vec<Fragment>, Vec<Warning>)> {
            let ctx = self.ctx();
            let mut fragments = Vec::new();
            let mut warnings = Vec::new();
            for kind in GENERATION_ORDER {
                if let Some(fragment) = generate(kind, &ctx, &fragments, &mut warnings)? {
                    fragments.push(fragment);
                }
            }
            Ok((fragments, warnings))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;

    #[test]
    fn test_no_trigger_means_no_fragment() {
        let fx = Fixture::new("loan person_age loan_amnt");
        let (fragments, warnings) = fx.run_all().unwrap();
        assert!(fragments.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_columns_in_dedupes() {
        let fx = Fixture::new("choose loan_amnt and loan_amnt from loan");
        let cols = fx.ctx().columns_in(fx.text.tokens());
        assert_eq!(cols, vec![ColumnRef::new("loan", "loan_amnt")]);
    }

    #[test]
    fn test_generation_order_covers_every_stage() {
        let mut kinds = GENERATION_ORDER.to_vec();
        kinds.sort();
        assert_eq!(kinds, StageKind::ORDER.to_vec());
    }
}
