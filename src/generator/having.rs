//! Post-aggregate filter: `having <field> <value>`.
//!
//! Condition words are dropped along with stop words and the operator is
//! always `>=`. Only the field and the value are read from the sentence.

use tracing::debug;

use super::{prior_grouping, GenerationContext};
use crate::ast::{Condition, Fragment, Operator, Value};
use crate::error::{NlqError, NlqResult};
use crate::keywords::{Role, Window};
use crate::parser::Token;

pub(super) fn generate(
    ctx: &GenerationContext<'_>,
    prior: &[Fragment],
) -> NlqResult<Option<Fragment>> {
    if prior_grouping(prior).is_none() {
        return Ok(None);
    }
    let Some(start) = ctx.first(Role::Having) else {
        return Ok(None);
    };

    let window: Vec<&Token> = ctx
        .window(start, Window::Having)
        .iter()
        .filter(|t| !ctx.is_stop_word(t) && ctx.taxonomy.condition(&t.lower).is_none())
        .collect();
    debug!(window = ?window.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), "having window");

    let [trigger, field, value, ..] = window.as_slice() else {
        return Err(NlqError::having(format!(
            "expected a field and a value after '{}'",
            ctx.text.tokens()[start].text
        )));
    };

    let column = ctx.column(field).ok_or_else(|| {
        NlqError::having(format!("'{}' after '{}' is not a known column", field.text, trigger.text))
    })?;

    Ok(Some(Fragment::PostFilter(Condition {
        column,
        op: Operator::Gte,
        value: Value::parse_loose(&value.text),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ColumnRef;
    use crate::generator::test_support::Fixture;

    fn having(query: &str) -> NlqResult<Option<Condition>> {
        let (fragments, _) = Fixture::new(query).run_all()?;
        Ok(fragments.into_iter().find_map(|f| match f {
            Fragment::PostFilter(cond) => Some(cond),
            _ => None,
        }))
    }

    #[test]
    fn test_having_after_grouping() {
        let cond = having("group by person_age having loan_amnt equal 5000 from loan")
            .unwrap()
            .unwrap();
        assert_eq!(cond.column, ColumnRef::new("loan", "loan_amnt"));
        assert_eq!(cond.op, Operator::Gte);
        assert_eq!(cond.value, Value::Int(5000));
    }

    #[test]
    fn test_value_parsing() {
        let cond = having("group by person_age with loan_amnt 2.5 from loan")
            .unwrap()
            .unwrap();
        assert_eq!(cond.value, Value::Float(2.5));

        let cond = having("group by person_age having person_gender female from loan")
            .unwrap()
            .unwrap();
        assert_eq!(cond.value, Value::String("female".into()));
    }

    #[test]
    fn test_requires_grouping() {
        assert_eq!(having("choose loan_amnt from loan having loan_amnt 5").unwrap(), None);
    }

    #[test]
    fn test_incomplete_condition() {
        let err = having("group by person_age having loan_amnt from loan").unwrap_err();
        assert!(matches!(err, NlqError::Having(_)));

        let err = having("group by person_age having nothing 5 from loan").unwrap_err();
        assert!(err.to_string().contains("not a known column"));
    }
}
