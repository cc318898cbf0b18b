//! Backend-neutral clause fragments.
//!
//! A generator either publishes one [`Fragment`] or nothing. Rendering into
//! SQL text or document stages happens later, in the transpiler.

use serde::{Deserialize, Serialize};

use crate::ast::{AggregateFunc, Operator, SortOrder, Value};

/// A column qualified by the table it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// `column <op> value`, used by both the filter and the post-aggregate filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: ColumnRef,
    pub op: Operator,
    pub value: Value,
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value)
    }
}

/// A named aggregate such as `total_loan_amnt = sum(loan_amnt)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateExpr {
    pub name: String,
    pub func: AggregateFunc,
    /// `None` only for row counts.
    pub column: Option<ColumnRef>,
}

impl AggregateExpr {
    pub fn new(func: AggregateFunc, column: Option<ColumnRef>) -> Self {
        let name = match &column {
            Some(col) => func.output_name(&col.column),
            None => func.output_name(""),
        };
        // Counting ignores any attached field.
        let column = if func == AggregateFunc::Count { None } else { column };
        Self { name, func, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupBy {
    /// Unset means "no grouping key": everything collapses into one group.
    pub key: Option<ColumnRef>,
    pub aggregates: Vec<AggregateExpr>,
}

impl GroupBy {
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.aggregates.is_empty()
    }

    /// Aggregate computed over `column`, if any.
    pub fn aggregate_over(&self, column: &ColumnRef) -> Option<&AggregateExpr> {
        self.aggregates
            .iter()
            .find(|agg| agg.column.as_ref() == Some(column))
    }

    pub fn is_key(&self, column: &ColumnRef) -> bool {
        self.key.as_ref() == Some(column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Column(ColumnRef),
    /// The grouping key, addressed as the group identifier after a grouping stage.
    GroupKey(ColumnRef),
    /// An aggregate output field, addressed by name.
    Aggregate(String),
    /// The backend's row identifier.
    RowId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub keys: Vec<SortKey>,
    pub direction: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    Field(ColumnRef),
    /// Echo of the grouping key under its original field name.
    GroupKey(ColumnRef),
    /// Echo of an aggregate computed by the grouping stage.
    Aggregate(AggregateExpr),
    /// A single computed expression that replaces the field list.
    Computed(AggregateExpr),
}

/// Output field bindings. No bindings means every field (wildcard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub bindings: Vec<Binding>,
    pub exclude_row_id: bool,
}

impl Projection {
    pub fn is_wildcard(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinLink {
    pub table: String,
    pub key: String,
    /// The key fell back to `id` because no shared `on <column>` was found.
    pub default_used: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub primary: String,
    pub links: Vec<JoinLink>,
}

/// Stage kinds in assembly priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StageKind {
    Filter,
    Join,
    Grouping,
    Ordering,
    PostFilter,
    Projection,
}

impl StageKind {
    /// The fixed stage priority shared by both backends.
    pub const ORDER: [StageKind; 6] = [
        StageKind::Filter,
        StageKind::Join,
        StageKind::Grouping,
        StageKind::Ordering,
        StageKind::PostFilter,
        StageKind::Projection,
    ];
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StageKind::Filter => "filter",
            StageKind::Join => "join",
            StageKind::Grouping => "grouping",
            StageKind::Ordering => "ordering",
            StageKind::PostFilter => "post-filter",
            StageKind::Projection => "projection",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fragment {
    Filter(Condition),
    Join(Join),
    Grouping(GroupBy),
    Ordering(OrderBy),
    PostFilter(Condition),
    Projection(Projection),
}

impl Fragment {
    pub fn kind(&self) -> StageKind {
        match self {
            Fragment::Filter(_) => StageKind::Filter,
            Fragment::Join(_) => StageKind::Join,
            Fragment::Grouping(_) => StageKind::Grouping,
            Fragment::Ordering(_) => StageKind::Ordering,
            Fragment::PostFilter(_) => StageKind::PostFilter,
            Fragment::Projection(_) => StageKind::Projection,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// No schema table appears in the query; the synthetic default table is used.
    UnknownTable,
    /// A detected table has no column mentioned; it defaults to all columns.
    NoColumns,
    /// A join was requested but fewer than two tables were named.
    JoinIncomplete,
    /// No shared `on` column; the join key defaulted to `id`.
    JoinKeyDefaulted,
    /// Only the first joined table is supported by the document form.
    JoinTruncated,
    /// A grouping trigger matched nothing usable.
    EmptyGrouping,
    /// The projection fell back to every field.
    WildcardProjection,
    /// A stage was dropped because the execution mode cannot express it.
    StageDropped,
}

/// Advisory note produced by degraded, non-fatal output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
