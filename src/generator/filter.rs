//! `where <field> <condition> <value>`

use tracing::debug;

use super::GenerationContext;
use crate::ast::{Condition, Fragment, Value};
use crate::error::{NlqError, NlqResult};
use crate::keywords::{Role, Window};
use crate::parser::Token;

pub(super) fn generate(ctx: &GenerationContext<'_>) -> NlqResult<Option<Fragment>> {
    let Some(start) = ctx.first(Role::Filter) else {
        return Ok(None);
    };

    let window: Vec<&Token> = ctx
        .window(start, Window::Filter)
        .iter()
        .filter(|t| !ctx.is_stop_word(t))
        .collect();
    debug!(window = ?window.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), "filter window");

    let trigger = window.first().map(|t| t.text.as_str()).unwrap_or_default();

    let (field_at, column) = window
        .iter()
        .enumerate()
        .find_map(|(i, t)| ctx.column(t).map(|col| (i, col)))
        .ok_or_else(|| NlqError::filter(format!("no known column after '{}'", trigger)))?;

    let (op_at, op) = window
        .iter()
        .enumerate()
        .skip(field_at + 1)
        .find_map(|(i, t)| ctx.taxonomy.condition(&t.lower).map(|op| (i, op)))
        .ok_or_else(|| {
            NlqError::filter(format!("no comparison word after '{}'", column.column))
        })?;

    let rest = &window[op_at + 1..];
    let value = rest
        .iter()
        .find_map(|t| t.number.clone())
        .or_else(|| {
            rest.iter()
                .find(|t| t.is_alphabetic() && ctx.taxonomy.condition(&t.lower).is_none())
                .map(|t| Value::String(t.text.clone()))
        })
        .ok_or_else(|| {
            NlqError::filter(format!("no value after '{} {}'", column.column, op))
        })?;

    Ok(Some(Fragment::Filter(Condition { column, op, value })))
}
