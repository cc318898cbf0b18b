//! Document-store renderer.
//!
//! Aggregation mode renders one stage object per plan stage, in plan order:
//!
//! | Plan stage   | Stage      |
//! |--------------|------------|
//! | filter       | `$match`   |
//! | join         | `$lookup`  |
//! | grouping     | `$group`   |
//! | ordering     | `$sort`    |
//! | post-filter  | `$match`   |
//! | projection   | `$project` |
//!
//! Retrieval mode renders a single find document instead.

use serde::Serialize;
use serde_json::{json, Map, Value as Json};
use tracing::warn;

use crate::ast::{
    Binding, ColumnRef, Condition, Fragment, GroupBy, Join, OrderBy, Projection, SortKey, Warning,
    WarningKind,
};
use crate::classifier::ExecutionMode;
use crate::plan::QueryPlan;

/// Trait for rendering a plan to a document-store query.
pub trait ToMongo {
    fn to_mongo(&self) -> DocumentQuery;
}

/// A rendered document-store query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentQuery {
    pub mode: ExecutionMode,
    pub collection: String,
    pub body: DocumentBody,
    /// Plan warnings plus anything the document form could not express.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentBody {
    Find {
        filter: Json,
        #[serde(skip_serializing_if = "Option::is_none")]
        projection: Option<Json>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sort: Option<Json>,
    },
    Pipeline(Vec<Json>),
}

impl DocumentQuery {
    pub fn pipeline(&self) -> Option<&[Json]> {
        match &self.body {
            DocumentBody::Pipeline(stages) => Some(stages),
            DocumentBody::Find { .. } => None,
        }
    }

    /// Body as plain JSON: the stage array, or the find document.
    pub fn to_json(&self) -> Json {
        match &self.body {
            DocumentBody::Pipeline(stages) => Json::Array(stages.clone()),
            DocumentBody::Find {
                filter,
                projection,
                sort,
            } => {
                let mut doc = Map::new();
                doc.insert("filter".to_string(), filter.clone());
                if let Some(projection) = projection {
                    doc.insert("projection".to_string(), projection.clone());
                }
                if let Some(sort) = sort {
                    doc.insert("sort".to_string(), sort.clone());
                }
                Json::Object(doc)
            }
        }
    }

    /// Shell form, e.g. `db.loan.aggregate([...])`.
    pub fn to_shell(&self) -> String {
        match &self.body {
            DocumentBody::Pipeline(stages) => {
                format!("db.{}.aggregate({})", self.collection, Json::Array(stages.clone()))
            }
            DocumentBody::Find {
                filter,
                projection,
                sort,
            } => {
                let mut shell = match projection {
                    Some(projection) => {
                        format!("db.{}.find({}, {})", self.collection, filter, projection)
                    }
                    None => format!("db.{}.find({})", self.collection, filter),
                };
                if let Some(sort) = sort {
                    shell.push_str(&format!(".sort({})", sort));
                }
                shell
            }
        }
    }
}

impl ToMongo for QueryPlan {
    fn to_mongo(&self) -> DocumentQuery {
        let mut warnings = self.warnings.clone();
        let collection = self
            .join()
            .map(|j| j.primary.clone())
            .unwrap_or_else(|| self.primary_table.clone());
        let grouping = self.grouping();

        let body = match self.mode {
            ExecutionMode::Retrieval => DocumentBody::Find {
                filter: self.filter().map(match_doc).unwrap_or_else(|| json!({})),
                projection: self.projection().map(|p| project_doc(p, self.join())),
                sort: self.ordering().map(|o| sort_doc(o, grouping)),
            },
            ExecutionMode::Aggregation => {
                let stages = self
                    .stages
                    .iter()
                    .map(|fragment| match fragment {
                        Fragment::Filter(cond) => json!({ "$match": match_doc(cond) }),
                        Fragment::Join(join) => json!({ "$lookup": lookup_doc(join, &mut warnings) }),
                        Fragment::Grouping(group) => json!({ "$group": group_doc(group) }),
                        Fragment::Ordering(order) => json!({ "$sort": sort_doc(order, grouping) }),
                        Fragment::PostFilter(cond) => {
                            json!({ "$match": having_doc(cond, grouping) })
                        }
                        Fragment::Projection(proj) => {
                            json!({ "$project": project_doc(proj, self.join()) })
                        }
                    })
                    .collect();
                DocumentBody::Pipeline(stages)
            }
        };

        DocumentQuery {
            mode: self.mode,
            collection,
            body,
            warnings,
        }
    }
}

/// `{ field: { $op: value } }`
fn condition_doc(field: &str, cond: &Condition, op: &str) -> Json {
    let mut inner = Map::new();
    inner.insert(op.to_string(), cond.value.to_json());
    let mut doc = Map::new();
    doc.insert(field.to_string(), Json::Object(inner));
    Json::Object(doc)
}

fn match_doc(cond: &Condition) -> Json {
    condition_doc(&cond.column.column, cond, cond.op.mongo_op())
}

/// Only the first joined table can be expressed as a single lookup.
fn lookup_doc(join: &Join, warnings: &mut Vec<Warning>) -> Json {
    if join.links.len() > 1 {
        let dropped: Vec<&str> = join.links[1..].iter().map(|l| l.table.as_str()).collect();
        let message = format!(
            "Document queries join a single collection; ignoring {}",
            dropped.join(", ")
        );
        warn!("{}", message);
        warnings.push(Warning::new(WarningKind::JoinTruncated, message));
    }
    match join.links.first() {
        Some(link) => json!({
            "from": link.table,
            "localField": link.key,
            "foreignField": link.key,
            "as": joined_alias(&link.table),
        }),
        None => json!({}),
    }
}

fn joined_alias(table: &str) -> String {
    format!("{}_joined", table)
}

fn group_doc(group: &GroupBy) -> Json {
    let mut doc = Map::new();
    let id = match &group.key {
        Some(key) => Json::String(format!("${}", key.column)),
        None => Json::Null,
    };
    doc.insert("_id".to_string(), id);
    for agg in &group.aggregates {
        let value = match &agg.column {
            Some(col) => Json::String(format!("${}", col.column)),
            None => json!(1),
        };
        let mut acc = Map::new();
        acc.insert(agg.func.mongo_op().to_string(), value);
        doc.insert(agg.name.clone(), Json::Object(acc));
    }
    Json::Object(doc)
}

fn sort_doc(order: &OrderBy, grouping: Option<&GroupBy>) -> Json {
    let mut doc = Map::new();
    for key in &order.keys {
        let field = match key {
            SortKey::GroupKey(_) | SortKey::RowId => "_id".to_string(),
            SortKey::Aggregate(name) => name.clone(),
            SortKey::Column(col) => addressable(col, grouping),
        };
        doc.insert(field, json!(order.direction.mongo_value()));
    }
    Json::Object(doc)
}

fn having_doc(cond: &Condition, grouping: Option<&GroupBy>) -> Json {
    condition_doc(&addressable(&cond.column, grouping), cond, cond.op.mongo_op())
}

/// How a column is addressed once the grouping stage has run.
fn addressable(col: &ColumnRef, grouping: Option<&GroupBy>) -> String {
    match grouping {
        Some(group) if group.is_key(col) => "_id".to_string(),
        Some(group) => group
            .aggregate_over(col)
            .map(|agg| agg.name.clone())
            .unwrap_or_else(|| col.column.clone()),
        None => col.column.clone(),
    }
}

fn project_doc(proj: &Projection, join: Option<&Join>) -> Json {
    let joined = join.and_then(|j| j.links.first()).map(|l| l.table.as_str());
    let mut doc = Map::new();
    for binding in &proj.bindings {
        match binding {
            Binding::Field(col) => {
                let field = match joined {
                    Some(table) if col.table == table => {
                        format!("{}.{}", joined_alias(table), col.column)
                    }
                    _ => col.column.clone(),
                };
                doc.insert(field, json!(1));
            }
            Binding::GroupKey(col) => {
                doc.insert(col.column.clone(), json!("$_id"));
            }
            Binding::Aggregate(agg) => {
                doc.insert(agg.name.clone(), Json::String(format!("${}", agg.name)));
            }
            Binding::Computed(agg) => {
                let value = match &agg.column {
                    Some(col) => Json::String(format!("${}", col.column)),
                    None => json!(1),
                };
                let mut expr = Map::new();
                expr.insert(agg.func.mongo_op().to_string(), value);
                doc.insert(agg.name.clone(), Json::Object(expr));
            }
        }
    }
    if proj.exclude_row_id {
        doc.insert("_id".to_string(), json!(0));
    }
    Json::Object(doc)
}
