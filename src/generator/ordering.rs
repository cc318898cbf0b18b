//! Sort keys and direction.

use tracing::debug;

use super::{prior_grouping, prior_projection, GenerationContext};
use crate::ast::{Binding, ColumnRef, Fragment, GroupBy, OrderBy, SortKey, SortOrder};
use crate::keywords::{Role, Window};
use crate::parser::Token;

pub(super) fn generate(ctx: &GenerationContext<'_>, prior: &[Fragment]) -> Option<Fragment> {
    let trigger = ctx.first(Role::Order)?;
    let grouping = prior_grouping(prior);

    let tokens = ctx.text.tokens();
    // Skip the trigger itself, connectives and other ordering words.
    let start = (trigger + 1..tokens.len())
        .find(|&i| {
            let word = &tokens[i].lower;
            !(ctx.taxonomy.is(Role::Order, word)
                || ctx.taxonomy.is_sort_connective(word)
                || ctx.taxonomy.is_stop_word(word))
        })
        .unwrap_or(tokens.len());

    let window: &[Token] = match tokens.get(start) {
        Some(first) if !ctx.is_exit(Window::Ordering, first) => ctx.window(start, Window::Ordering),
        _ => &[],
    };
    debug!(window = ?window.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), "ordering window");

    let mut keys: Vec<SortKey> = ctx
        .columns_in(window)
        .into_iter()
        .map(|col| sort_key(col, grouping))
        .collect();

    if keys.is_empty() {
        keys.push(fallback_key(grouping, prior));
    }

    let direction = ctx
        .text
        .tokens()
        .iter()
        .find_map(|t| ctx.taxonomy.direction(&t.lower))
        .unwrap_or(SortOrder::Asc);

    Some(Fragment::Ordering(OrderBy { keys, direction }))
}

/// After grouping, only the key and the aggregate names remain addressable.
fn sort_key(col: ColumnRef, grouping: Option<&GroupBy>) -> SortKey {
    match grouping {
        Some(group) if group.is_key(&col) => SortKey::GroupKey(col),
        Some(group) => match group.aggregate_over(&col) {
            Some(agg) => SortKey::Aggregate(agg.name.clone()),
            None => SortKey::Column(col),
        },
        None => SortKey::Column(col),
    }
}

fn fallback_key(grouping: Option<&GroupBy>, prior: &[Fragment]) -> SortKey {
    if let Some(key) = grouping.and_then(|g| g.key.clone()) {
        return SortKey::GroupKey(key);
    }
    match prior_projection(prior).map(|p| p.bindings.as_slice()) {
        Some([Binding::Field(col)]) => SortKey::Column(col.clone()),
        Some([Binding::GroupKey(col)]) => SortKey::GroupKey(col.clone()),
        Some([Binding::Aggregate(agg)]) => SortKey::Aggregate(agg.name.clone()),
        Some([Binding::Computed(agg)]) => match &agg.column {
            Some(col) => SortKey::Column(col.clone()),
            None => SortKey::RowId,
        },
        _ => SortKey::RowId,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::test_support::Fixture;

    fn ordering(query: &str) -> Option<OrderBy> {
        let fx = Fixture::new(query);
        let (fragments, _) = fx.run_all().unwrap();
        fragments.into_iter().find_map(|f| match f {
            Fragment::Ordering(order) => Some(order),
            _ => None,
        })
    }

    #[test]
    fn test_sort_by_columns() {
        let order = ordering("choose loan_amnt from loan sort by person_age and loan_amnt descending")
            .unwrap();
        assert_eq!(
            order.keys,
            vec![
                SortKey::Column(ColumnRef::new("loan", "person_age")),
                SortKey::Column(ColumnRef::new("loan", "loan_amnt")),
            ]
        );
        assert_eq!(order.direction, SortOrder::Desc);
    }

    #[test]
    fn test_default_direction_is_ascending() {
        let order = ordering("choose loan_amnt from loan order by loan_amnt").unwrap();
        assert_eq!(order.direction, SortOrder::Asc);
    }

    #[test]
    fn test_group_key_and_aggregate_mapping() {
        let order = ordering("sum loan_amnt from loan group by person_age sort by loan_amnt").unwrap();
        assert_eq!(order.keys, vec![SortKey::Aggregate("total_loan_amnt".into())]);

        let order = ordering("sum loan_amnt from loan group by person_age sort by person_age").unwrap();
        assert_eq!(
            order.keys,
            vec![SortKey::GroupKey(ColumnRef::new("loan", "person_age"))]
        );
    }

    #[test]
    fn test_fallback_to_group_key() {
        let order = ordering("sum loan_amnt from loan group by person_age sort descending").unwrap();
        assert_eq!(
            order.keys,
            vec![SortKey::GroupKey(ColumnRef::new("loan", "person_age"))]
        );
        assert_eq!(order.direction, SortOrder::Desc);
    }

    #[test]
    fn test_fallback_to_single_projected_field() {
        let order = ordering("choose loan_amnt from loan sort").unwrap();
        assert_eq!(
            order.keys,
            vec![SortKey::Column(ColumnRef::new("loan", "loan_amnt"))]
        );
    }

    #[test]
    fn test_fallback_to_row_id() {
        let order = ordering("choose everything from loan arrange").unwrap();
        assert_eq!(order.keys, vec![SortKey::RowId]);
    }

    #[test]
    fn test_absent_trigger() {
        assert!(ordering("choose loan_amnt from loan").is_none());
    }
}
