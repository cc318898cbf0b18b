pub mod fragments;
pub mod operators;
pub mod values;

pub use self::fragments::{
    AggregateExpr, Binding, ColumnRef, Condition, Fragment, GroupBy, Join, JoinLink, OrderBy,
    Projection, SortKey, StageKind, Warning, WarningKind,
};
pub use self::operators::{AggregateFunc, Operator, SortOrder};
pub use self::values::Value;
