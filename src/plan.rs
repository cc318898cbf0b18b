//! Assembled query plan.

use serde::Serialize;

use crate::ast::{Condition, Fragment, GroupBy, Join, OrderBy, Projection, StageKind, Warning};
use crate::classifier::ExecutionMode;
use crate::resolver::ResolvedRefs;

/// Backend-neutral result of one translation.
///
/// `stages` holds only the clauses that were present, sorted by
/// [`StageKind::ORDER`]. Both renderers walk them in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    pub mode: ExecutionMode,
    pub primary_table: String,
    pub stages: Vec<Fragment>,
    pub resolved: ResolvedRefs,
    pub warnings: Vec<Warning>,
}

impl QueryPlan {
    /// Build a plan, putting the fragments in stage priority order.
    pub fn assemble(
        mode: ExecutionMode,
        primary_table: impl Into<String>,
        mut stages: Vec<Fragment>,
        resolved: ResolvedRefs,
        warnings: Vec<Warning>,
    ) -> Self {
        stages.sort_by_key(Fragment::kind);
        Self {
            mode,
            primary_table: primary_table.into(),
            stages,
            resolved,
            warnings,
        }
    }

    pub fn stage(&self, kind: StageKind) -> Option<&Fragment> {
        self.stages.iter().find(|f| f.kind() == kind)
    }

    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(Fragment::kind).collect()
    }

    pub fn filter(&self) -> Option<&Condition> {
        match self.stage(StageKind::Filter) {
            Some(Fragment::Filter(cond)) => Some(cond),
            _ => None,
        }
    }

    pub fn join(&self) -> Option<&Join> {
        match self.stage(StageKind::Join) {
            Some(Fragment::Join(join)) => Some(join),
            _ => None,
        }
    }

    pub fn grouping(&self) -> Option<&GroupBy> {
        match self.stage(StageKind::Grouping) {
            Some(Fragment::Grouping(group)) => Some(group),
            _ => None,
        }
    }

    pub fn ordering(&self) -> Option<&OrderBy> {
        match self.stage(StageKind::Ordering) {
            Some(Fragment::Ordering(order)) => Some(order),
            _ => None,
        }
    }

    pub fn post_filter(&self) -> Option<&Condition> {
        match self.stage(StageKind::PostFilter) {
            Some(Fragment::PostFilter(cond)) => Some(cond),
            _ => None,
        }
    }

    pub fn projection(&self) -> Option<&Projection> {
        match self.stage(StageKind::Projection) {
            Some(Fragment::Projection(proj)) => Some(proj),
            _ => None,
        }
    }
}
