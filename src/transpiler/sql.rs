//! Relational renderer.
//!
//! Clause keywords are emitted in SQL grammar order, which puts `HAVING`
//! before `ORDER BY` even though the plan keeps ordering ahead of the
//! post-aggregate filter.

use crate::ast::{AggregateExpr, AggregateFunc, Binding, Condition, GroupBy, SortKey};
use crate::plan::QueryPlan;

/// Trait for rendering a plan to SQL text.
pub trait ToSql {
    /// Render as a single statement terminated by `;`.
    fn to_sql(&self) -> String;
}

impl ToSql for QueryPlan {
    fn to_sql(&self) -> String {
        let mut clauses = vec![format!("SELECT {}", select_list(self))];

        match self.join() {
            Some(join) => {
                let mut from = format!("FROM {}", join.primary);
                for link in &join.links {
                    from.push_str(&format!(
                        " INNER JOIN {t} ON {p}.{k} = {t}.{k}",
                        t = link.table,
                        p = join.primary,
                        k = link.key
                    ));
                }
                clauses.push(from);
            }
            None => clauses.push(format!("FROM {}", self.primary_table)),
        }

        if let Some(cond) = self.filter() {
            clauses.push(format!("WHERE {}", cond));
        }

        if let Some(key) = self.grouping().and_then(|g| g.key.as_ref()) {
            clauses.push(format!("GROUP BY {}", key));
        }

        if let Some(cond) = self.post_filter() {
            clauses.push(format!("HAVING {}", having_condition(cond, self.grouping())));
        }

        if let Some(order) = self.ordering() {
            let keys: Vec<String> = order
                .keys
                .iter()
                .filter_map(|key| match key {
                    SortKey::Column(col) | SortKey::GroupKey(col) => Some(col.to_string()),
                    SortKey::Aggregate(name) => Some(name.clone()),
                    SortKey::RowId => None,
                })
                .map(|key| format!("{} {}", key, order.direction.sql_keyword()))
                .collect();
            if !keys.is_empty() {
                clauses.push(format!("ORDER BY {}", keys.join(", ")));
            }
        }

        format!("{};", clauses.join(" "))
    }
}

fn select_list(plan: &QueryPlan) -> String {
    let Some(proj) = plan.projection().filter(|p| !p.is_wildcard()) else {
        return "*".to_string();
    };
    proj.bindings
        .iter()
        .map(|binding| match binding {
            Binding::Field(col) | Binding::GroupKey(col) => col.to_string(),
            Binding::Aggregate(agg) | Binding::Computed(agg) => {
                format!("{} AS {}", aggregate_expr(agg), agg.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `SUM(loan.loan_amnt)`, `COUNT(*)`.
fn aggregate_expr(agg: &AggregateExpr) -> String {
    match &agg.column {
        Some(col) => format!("{}({})", agg.func.sql_name(), col),
        None => format!("{}(*)", agg.func.sql_name()),
    }
}

/// The post-aggregate filter may only reference the group key or an aggregate.
/// A plain column is summed.
fn having_condition(cond: &Condition, grouping: Option<&GroupBy>) -> String {
    let subject = match grouping {
        Some(group) if group.is_key(&cond.column) => cond.column.to_string(),
        Some(group) => match group.aggregate_over(&cond.column) {
            Some(agg) => aggregate_expr(agg),
            None => format!("{}({})", AggregateFunc::Sum.sql_name(), cond.column),
        },
        None => format!("{}({})", AggregateFunc::Sum.sql_name(), cond.column),
    };
    format!("{} {} {}", subject, cond.op, cond.value)
}
