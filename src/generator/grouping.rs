//! Grouping key and named aggregates.

use tracing::{debug, warn};

use super::GenerationContext;
use crate::ast::{AggregateExpr, AggregateFunc, Fragment, GroupBy, Warning, WarningKind};
use crate::keywords::{Role, Window};

pub(super) fn generate(ctx: &GenerationContext<'_>, warnings: &mut Vec<Warning>) -> Option<Fragment> {
    let group_at = group_trigger(ctx);
    let aggregate_at = ctx.first(Role::Aggregate);
    if group_at.is_none() && aggregate_at.is_none() {
        return None;
    }

    let key = group_at.and_then(|start| {
        let window = ctx.window(start, Window::GroupKey);
        debug!(window = ?window.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), "group key window");
        window.iter().find_map(|t| ctx.column(t))
    });

    let aggregates = aggregate_at
        .map(|start| collect_aggregates(ctx, start))
        .unwrap_or_default();

    let group = GroupBy { key, aggregates };
    if group.is_empty() {
        let message = "Grouping words found but no grouping key or aggregate could be resolved";
        warn!("{}", message);
        warnings.push(Warning::new(WarningKind::EmptyGrouping, message));
        return None;
    }
    Some(Fragment::Grouping(group))
}

/// First grouping word, ignoring a sort connective that belongs to an
/// ordering phrase (`sort by`, `order by`).
fn group_trigger(ctx: &GenerationContext<'_>) -> Option<usize> {
    let tokens = ctx.text.tokens();
    tokens.iter().enumerate().find_map(|(i, t)| {
        if !ctx.taxonomy.is(Role::Group, &t.lower) {
            return None;
        }
        let after_order = i > 0 && ctx.taxonomy.is(Role::Order, &tokens[i - 1].lower);
        if after_order && ctx.taxonomy.is_sort_connective(&t.lower) {
            None
        } else {
            Some(i)
        }
    })
}

/// Pair every aggregate word with the first column before the next aggregate word.
fn collect_aggregates(ctx: &GenerationContext<'_>, start: usize) -> Vec<AggregateExpr> {
    let window = ctx.window(start, Window::Aggregate);
    debug!(window = ?window.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), "aggregate window");

    let mut aggregates: Vec<AggregateExpr> = Vec::new();
    let mut push = |agg: AggregateExpr| {
        if !aggregates.iter().any(|a| a.name == agg.name) {
            aggregates.push(agg);
        }
    };

    let mut pending: Option<AggregateFunc> = None;
    for token in window {
        if let Some(func) = ctx.taxonomy.aggregate(&token.lower) {
            if pending == Some(AggregateFunc::Count) {
                push(AggregateExpr::new(AggregateFunc::Count, None));
            }
            pending = Some(func);
        } else if let Some(func) = pending {
            if let Some(col) = ctx.column(token) {
                push(AggregateExpr::new(func, Some(col)));
                pending = None;
            }
        }
    }
    if pending == Some(AggregateFunc::Count) {
        push(AggregateExpr::new(AggregateFunc::Count, None));
    }
    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ColumnRef;
    use crate::generator::test_support::Fixture;

    fn grouping(query: &str) -> (Option<GroupBy>, Vec<Warning>) {
        let fx = Fixture::new(query);
        let mut warnings = Vec::new();
        let group = match generate(&fx.ctx(), &mut warnings) {
            Some(Fragment::Grouping(group)) => Some(group),
            Some(other) => panic!("unexpected fragment {:?}", other),
            None => None,
        };
        (group, warnings)
    }

    #[test]
    fn test_key_and_sum() {
        let (group, _) = grouping("sum loan_amnt from loan by person_age");
        let group = group.unwrap();
        assert_eq!(group.key, Some(ColumnRef::new("loan", "person_age")));
        assert_eq!(group.aggregates.len(), 1);
        assert_eq!(group.aggregates[0].name, "total_loan_amnt");
        assert_eq!(group.aggregates[0].func, AggregateFunc::Sum);
    }

    #[test]
    fn test_several_aggregates() {
        let (group, _) =
            grouping("average loan_amnt and max person_age and count from loan group by loan_status");
        let names: Vec<String> = group
            .unwrap()
            .aggregates
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["avg_loan_amnt", "max_person_age", "count"]);
    }

    #[test]
    fn test_count_needs_no_column() {
        let (group, _) = grouping("count from loan by person_age");
        let group = group.unwrap();
        assert_eq!(group.aggregates, vec![AggregateExpr::new(AggregateFunc::Count, None)]);
    }

    #[test]
    fn test_duplicate_aggregates_collapse() {
        let (group, _) = grouping("sum loan_amnt total loan_amnt from loan");
        let group = group.unwrap();
        assert_eq!(group.key, None);
        assert_eq!(group.aggregates.len(), 1);
    }

    #[test]
    fn test_sort_by_is_not_grouping() {
        let (group, warnings) = grouping("choose loan_amnt from loan sort by person_age");
        assert_eq!(group, None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_grouping_warns() {
        let (group, warnings) = grouping("group by nothing from loan");
        assert_eq!(group, None);
        assert_eq!(warnings[0].kind, WarningKind::EmptyGrouping);
    }
}
