use serde::{Deserialize, Serialize};

/// Comparison operator of a filter or post-aggregate filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Equal (=)
    Eq,
    /// Greater than (>)
    Gt,
    /// Less than (<)
    Lt,
    /// Greater than or equal (>=)
    Gte,
}

impl Operator {
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
        }
    }

    pub fn mongo_op(&self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Gt => "$gt",
            Operator::Lt => "$lt",
            Operator::Gte => "$gte",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_symbol())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// `1` / `-1` as used by `$sort`.
    pub fn mongo_value(&self) -> i64 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Aggregate function named by an aggregate trigger word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunc {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl AggregateFunc {
    /// Output field name of the aggregate over `column`.
    ///
    /// Counting ignores the column: a count always counts rows.
    pub fn output_name(&self, column: &str) -> String {
        match self {
            AggregateFunc::Sum => format!("total_{}", column),
            AggregateFunc::Avg => format!("avg_{}", column),
            AggregateFunc::Count => "count".to_string(),
            AggregateFunc::Min => format!("min_{}", column),
            AggregateFunc::Max => format!("max_{}", column),
        }
    }

    pub fn sql_name(&self) -> &'static str {
        match self {
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }

    /// Accumulator operator. Count is expressed as `$sum: 1`.
    pub fn mongo_op(&self) -> &'static str {
        match self {
            AggregateFunc::Sum | AggregateFunc::Count => "$sum",
            AggregateFunc::Avg => "$avg",
            AggregateFunc::Min => "$min",
            AggregateFunc::Max => "$max",
        }
    }
}

impl std::fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}
