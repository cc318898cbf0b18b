//! Output field bindings.

use tracing::{debug, warn};

use super::{prior_grouping, GenerationContext};
use crate::ast::{
    AggregateExpr, AggregateFunc, Binding, Fragment, Projection, Warning, WarningKind,
};
use crate::classifier::ExecutionMode;
use crate::keywords::{Role, Window};

pub(super) fn generate(
    ctx: &GenerationContext<'_>,
    prior: &[Fragment],
    warnings: &mut Vec<Warning>,
) -> Option<Fragment> {
    let bindings = match prior_grouping(prior) {
        Some(group) if ctx.mode == ExecutionMode::Aggregation => {
            let mut bindings: Vec<Binding> =
                group.key.iter().cloned().map(Binding::GroupKey).collect();
            bindings.extend(group.aggregates.iter().cloned().map(Binding::Aggregate));
            bindings
        }
        _ => selected(ctx),
    };

    if bindings.is_empty() {
        if ctx.has(Role::Selection) {
            let message = "No selected column could be resolved; projecting every field";
            warn!("{}", message);
            warnings.push(Warning::new(WarningKind::WildcardProjection, message));
        }
        return None;
    }

    Some(Fragment::Projection(Projection {
        bindings,
        exclude_row_id: true,
    }))
}

/// Columns named in the selection window, unless an aggregate word asks for
/// a single computed value instead.
fn selected(ctx: &GenerationContext<'_>) -> Vec<Binding> {
    if let Some(computed) = computed(ctx) {
        return vec![computed];
    }

    let Some(start) = ctx.first(Role::Selection) else {
        return Vec::new();
    };
    let window = ctx.window(start, Window::Projection);
    debug!(window = ?window.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), "projection window");

    ctx.columns_in(window)
        .into_iter()
        .map(Binding::Field)
        .collect()
}

/// The first aggregate word and the first column after it.
fn computed(ctx: &GenerationContext<'_>) -> Option<Binding> {
    let at = ctx.first(Role::Aggregate)?;
    let tokens = ctx.text.tokens();
    let func = ctx.taxonomy.aggregate(&tokens[at].lower)?;
    let column = tokens[at + 1..].iter().find_map(|t| ctx.column(t));
    match (func, column) {
        (AggregateFunc::Count, _) => Some(Binding::Computed(AggregateExpr::new(func, None))),
        (_, Some(col)) => Some(Binding::Computed(AggregateExpr::new(func, Some(col)))),
        (_, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ColumnRef;
    use crate::generator::test_support::Fixture;

    fn projection(fx: &Fixture) -> (Option<Projection>, Vec<Warning>) {
        let (fragments, warnings) = fx.run_all().unwrap();
        let proj = fragments.into_iter().find_map(|f| match f {
            Fragment::Projection(p) => Some(p),
            _ => None,
        });
        (proj, warnings)
    }

    #[test]
    fn test_selected_fields() {
        let fx = Fixture::new("choose loan_amnt and person_age from loan");
        let (proj, _) = projection(&fx);
        let proj = proj.unwrap();
        assert_eq!(
            proj.bindings,
            vec![
                Binding::Field(ColumnRef::new("loan", "loan_amnt")),
                Binding::Field(ColumnRef::new("loan", "person_age")),
            ]
        );
        assert!(proj.exclude_row_id);
    }

    #[test]
    fn test_grouped_projection_echoes_key_and_aggregates() {
        let fx = Fixture::new("sum loan_amnt from loan by person_age");
        let (proj, _) = projection(&fx);
        let bindings = proj.unwrap().bindings;
        assert_eq!(bindings.len(), 2);
        assert_eq!(
            bindings[0],
            Binding::GroupKey(ColumnRef::new("loan", "person_age"))
        );
        assert!(matches!(&bindings[1], Binding::Aggregate(agg) if agg.name == "total_loan_amnt"));
    }

    #[test]
    fn test_computed_in_retrieval_mode() {
        let fx = Fixture::new("choose person_age from loan average loan_amnt").retrieval();
        let (fragments, _) = fx.run_all().unwrap();
        let mut warnings = Vec::new();
        // Drop grouping as the translator does in retrieval mode.
        let prior: Vec<Fragment> = fragments
            .into_iter()
            .filter(|f| !matches!(f, Fragment::Grouping(_)))
            .collect();
        let Some(Fragment::Projection(proj)) = generate(&fx.ctx(), &prior, &mut warnings) else {
            panic!("expected a projection");
        };
        assert_eq!(
            proj.bindings,
            vec![Binding::Computed(AggregateExpr::new(
                AggregateFunc::Avg,
                Some(ColumnRef::new("loan", "loan_amnt"))
            ))]
        );
    }

    #[test]
    fn test_wildcard_warns_when_selection_requested() {
        let fx = Fixture::new("choose everything from loan");
        let (proj, warnings) = projection(&fx);
        assert_eq!(proj, None);
        assert!(warnings.iter().any(|w| w.kind == WarningKind::WildcardProjection));
    }

    #[test]
    fn test_no_selection_no_warning() {
        let fx = Fixture::new("loan where person_age greater 3");
        let (proj, warnings) = projection(&fx);
        assert_eq!(proj, None);
        assert!(warnings.is_empty());
    }
}
