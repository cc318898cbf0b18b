//! `combine <table> and <table> on <column>`

use tracing::{debug, warn};

use super::GenerationContext;
use crate::ast::{Fragment, Join, JoinLink, Warning, WarningKind};
use crate::keywords::Role;

/// Key used when no shared `on <column>` is named.
const DEFAULT_JOIN_KEY: &str = "id";

pub(super) fn generate(ctx: &GenerationContext<'_>, warnings: &mut Vec<Warning>) -> Option<Fragment> {
    if !ctx.has(Role::Join) {
        return None;
    }

    let mut tables: Vec<&str> = Vec::new();
    for token in ctx.text.tokens() {
        if let Some(table) = ctx.schema.table(&token.text) {
            if !tables.contains(&table.name.as_str()) {
                tables.push(table.name.as_str());
            }
        }
    }
    debug!(?tables, "join tables");

    if tables.len() < 2 {
        let message = format!(
            "Join requested but only {} table name(s) found; at least two are needed",
            tables.len()
        );
        warn!("{}", message);
        warnings.push(Warning::new(WarningKind::JoinIncomplete, message));
        return None;
    }

    // Sentence order decides: the first named table is the primary.
    let (primary, targets) = (tables[0], &tables[1..]);
    let links = targets
        .iter()
        .map(|target| link(ctx, primary, target, warnings))
        .collect();

    Some(Fragment::Join(Join {
        primary: primary.to_string(),
        links,
    }))
}

/// The first column named after an `on` that both tables carry.
fn link(
    ctx: &GenerationContext<'_>,
    primary: &str,
    target: &str,
    warnings: &mut Vec<Warning>,
) -> JoinLink {
    let tokens = ctx.text.tokens();
    let key = tokens
        .windows(2)
        .filter(|pair| pair[0].lower == "on")
        .map(|pair| pair[1].text.as_str())
        .find(|col| ctx.schema.has_column(primary, col) && ctx.schema.has_column(target, col));

    match key {
        Some(key) => JoinLink {
            table: target.to_string(),
            key: key.to_string(),
            default_used: false,
        },
        None => {
            let message = format!(
                "No shared 'on' column for {} and {}; joining on '{}'",
                primary, target, DEFAULT_JOIN_KEY
            );
            warn!("{}", message);
            warnings.push(Warning::new(WarningKind::JoinKeyDefaulted, message));
            JoinLink {
                table: target.to_string(),
                key: DEFAULT_JOIN_KEY.to_string(),
                default_used: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::test_support::Fixture;

    fn join(query: &str) -> (Option<Join>, Vec<Warning>) {
        let fx = Fixture::new(query);
        let mut warnings = Vec::new();
        let join = match generate(&fx.ctx(), &mut warnings) {
            Some(Fragment::Join(join)) => Some(join),
            Some(other) => panic!("unexpected fragment {:?}", other),
            None => None,
        };
        (join, warnings)
    }

    #[test]
    fn test_join_on_shared_column() {
        let (join, warnings) = join("combine loan and purchases on person_age");
        let join = join.unwrap();
        assert_eq!(join.primary, "loan");
        assert_eq!(
            join.links,
            vec![JoinLink {
                table: "purchases".into(),
                key: "person_age".into(),
                default_used: false,
            }]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_primary_follows_sentence_order() {
        // The schema lists loan before purchases; the sentence names purchases first.
        let (join, warnings) = join("merge purchases with loan on person_age");
        let join = join.unwrap();
        assert_eq!(join.primary, "purchases");
        assert_eq!(
            join.links,
            vec![JoinLink {
                table: "loan".into(),
                key: "person_age".into(),
                default_used: false,
            }]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_default_key() {
        let (join, warnings) = join("join loan and salaries");
        let join = join.unwrap();
        assert_eq!(join.links[0].key, "id");
        assert!(join.links[0].default_used);
        assert_eq!(warnings[0].kind, WarningKind::JoinKeyDefaulted);
    }

    #[test]
    fn test_chained_targets() {
        let (join, _) = join("link loan purchases salaries on person_age");
        let join = join.unwrap();
        assert_eq!(join.primary, "loan");
        let tables: Vec<String> = join.links.into_iter().map(|l| l.table).collect();
        assert_eq!(tables, vec!["purchases", "salaries"]);
    }

    #[test]
    fn test_single_table_is_incomplete() {
        let (join, warnings) = join("combine loan and loan");
        assert_eq!(join, None);
        assert_eq!(warnings[0].kind, WarningKind::JoinIncomplete);
    }

    #[test]
    fn test_absent_trigger() {
        let (join, warnings) = join("choose loan_amnt from loan and purchases");
        assert_eq!(join, None);
        assert!(warnings.is_empty());
    }
}
