//! Keyword taxonomy.
//!
//! Every clause is recognized purely lexically: a *trigger* word opens a
//! window of tokens and the first *exit* word closes it. The taxonomy holds
//! the trigger vocabularies, the condition/aggregate/direction mappings and
//! the stop words dropped inside windows.
//!
//! A [`Taxonomy`] is built once and only ever read afterwards, so a single
//! instance can be shared by any number of concurrent translations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ast::{AggregateFunc, Operator, SortOrder};

/// Vocabulary role of a trigger word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Selection,
    Filter,
    Condition,
    Join,
    Group,
    Order,
    Aggregate,
    Having,
    From,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::Selection,
        Role::Filter,
        Role::Condition,
        Role::Join,
        Role::Group,
        Role::Order,
        Role::Aggregate,
        Role::Having,
        Role::From,
    ];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Selection => "selection",
            Role::Filter => "filter",
            Role::Condition => "condition",
            Role::Join => "join",
            Role::Group => "group",
            Role::Order => "order",
            Role::Aggregate => "aggregate",
            Role::Having => "having",
            Role::From => "from",
        };
        write!(f, "{}", name)
    }
}

/// A token window scanned by one clause generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Filter,
    GroupKey,
    Aggregate,
    Ordering,
    Having,
    Projection,
}

impl Window {
    /// Roles whose words close this window.
    pub fn exits(&self) -> &'static [Role] {
        match self {
            Window::Filter => &[
                Role::Group,
                Role::Order,
                Role::Aggregate,
                Role::Selection,
                Role::Join,
                Role::From,
            ],
            Window::GroupKey => &[
                Role::Selection,
                Role::Order,
                Role::From,
                Role::Filter,
                Role::Having,
                Role::Aggregate,
                Role::Join,
            ],
            Window::Aggregate => &[
                Role::Selection,
                Role::Order,
                Role::From,
                Role::Filter,
                Role::Having,
                Role::Join,
            ],
            Window::Ordering => &[
                Role::Filter,
                Role::Selection,
                Role::Join,
                Role::Having,
                Role::Aggregate,
                Role::Group,
                Role::From,
            ],
            Window::Having => &[
                Role::Aggregate,
                Role::Group,
                Role::Order,
                Role::Join,
                Role::Selection,
                Role::From,
            ],
            Window::Projection => &[
                Role::Filter,
                Role::Group,
                Role::Order,
                Role::Join,
                Role::Having,
                Role::From,
            ],
        }
    }
}

const SELECTION: &[&str] = &["choose", "take", "select", "pick"];
const FILTER: &[&str] = &["where", "if", "when"];
const JOIN: &[&str] = &[
    "combine", "unite", "aggregate", "blend", "mix", "fuse", "coalesce", "meld", "merge",
    "unify", "connect", "join", "union", "conjoin", "link",
];
const GROUP: &[&str] = &["group", "by", "for"];
const ORDER: &[&str] = &["arrange", "order", "organize", "sort", "descending", "ascending"];
const HAVING: &[&str] = &["having", "with"];
const FROM: &[&str] = &["from"];
const SORT_CONNECTIVES: &[&str] = &["by"];

const CONDITIONS: &[(&str, Operator)] = &[
    ("equal", Operator::Eq),
    ("more", Operator::Gt),
    ("greater", Operator::Gt),
    ("less", Operator::Lt),
];

const AGGREGATES: &[(&str, AggregateFunc)] = &[
    ("sum", AggregateFunc::Sum),
    ("total", AggregateFunc::Sum),
    ("average", AggregateFunc::Avg),
    ("count", AggregateFunc::Count),
    ("min", AggregateFunc::Min),
    ("max", AggregateFunc::Max),
];

const DIRECTIONS: &[(&str, SortOrder)] =
    &[("ascending", SortOrder::Asc), ("descending", SortOrder::Desc)];

/// English function words dropped inside clause windows.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "been", "being", "below", "between", "both", "but", "can", "could", "did",
    "do", "does", "doing", "each", "either", "else", "ever", "every", "few", "get", "give",
    "had", "has", "have", "he", "her", "here", "him", "his", "how", "i", "in", "into", "is",
    "it", "its", "just", "list", "me", "might", "most", "much", "must", "my", "no", "nor",
    "not", "of", "off", "on", "only", "or", "other", "our", "ours", "out", "over", "own",
    "please", "same", "she", "should", "show", "so", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "us", "very", "was", "we", "were", "what", "which", "while", "who",
    "whom", "whose", "why", "will", "would", "you", "your",
];

/// Immutable keyword configuration shared by every generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    roles: BTreeMap<Role, BTreeSet<String>>,
    conditions: BTreeMap<String, Operator>,
    aggregates: BTreeMap<String, AggregateFunc>,
    directions: BTreeMap<String, SortOrder>,
    sort_connectives: BTreeSet<String>,
    stop_words: BTreeSet<String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect::<BTreeSet<_>>();

        let mut roles = BTreeMap::new();
        roles.insert(Role::Selection, words(SELECTION));
        roles.insert(Role::Filter, words(FILTER));
        roles.insert(Role::Join, words(JOIN));
        roles.insert(Role::Group, words(GROUP));
        roles.insert(Role::Order, words(ORDER));
        roles.insert(Role::Having, words(HAVING));
        roles.insert(Role::From, words(FROM));

        let mut taxonomy = Self {
            roles,
            conditions: CONDITIONS
                .iter()
                .map(|(w, op)| (w.to_string(), *op))
                .collect(),
            aggregates: AGGREGATES
                .iter()
                .map(|(w, func)| (w.to_string(), *func))
                .collect(),
            directions: DIRECTIONS
                .iter()
                .map(|(w, dir)| (w.to_string(), *dir))
                .collect(),
            sort_connectives: words(SORT_CONNECTIVES),
            stop_words: words(STOP_WORDS),
        };
        taxonomy.prune_stop_words();
        taxonomy
    }
}

impl Taxonomy {
    /// Is `word` (lowercase) part of the vocabulary for `role`?
    pub fn is(&self, role: Role, word: &str) -> bool {
        match role {
            Role::Condition => self.conditions.contains_key(word),
            Role::Aggregate => self.aggregates.contains_key(word),
            _ => self.roles.get(&role).is_some_and(|set| set.contains(word)),
        }
    }

    /// Does `word` close `window`?
    pub fn is_exit(&self, window: Window, word: &str) -> bool {
        window.exits().iter().any(|role| self.is(*role, word))
    }

    pub fn condition(&self, word: &str) -> Option<Operator> {
        self.conditions.get(word).copied()
    }

    pub fn aggregate(&self, word: &str) -> Option<AggregateFunc> {
        self.aggregates.get(word).copied()
    }

    pub fn direction(&self, word: &str) -> Option<SortOrder> {
        self.directions.get(word).copied()
    }

    pub fn is_sort_connective(&self, word: &str) -> bool {
        self.sort_connectives.contains(word)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Words of `role`, sorted.
    pub fn words(&self, role: Role) -> Vec<&str> {
        match role {
            Role::Condition => self.conditions.keys().map(String::as_str).collect(),
            Role::Aggregate => self.aggregates.keys().map(String::as_str).collect(),
            _ => self
                .roles
                .get(&role)
                .map(|set| set.iter().map(String::as_str).collect())
                .unwrap_or_default(),
        }
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&str, Operator)> {
        self.conditions.iter().map(|(w, op)| (w.as_str(), *op))
    }

    pub fn aggregates(&self) -> impl Iterator<Item = (&str, AggregateFunc)> {
        self.aggregates.iter().map(|(w, f)| (w.as_str(), *f))
    }

    pub fn directions(&self) -> impl Iterator<Item = (&str, SortOrder)> {
        self.directions.iter().map(|(w, d)| (w.as_str(), *d))
    }

    /// Add a trigger word to a plain vocabulary role.
    ///
    /// Condition and aggregate words carry a mapping and go through
    /// [`Taxonomy::add_condition`] and [`Taxonomy::add_aggregate`].
    pub fn add_word(&mut self, role: Role, word: &str) {
        if matches!(role, Role::Condition | Role::Aggregate) {
            return;
        }
        self.roles
            .entry(role)
            .or_default()
            .insert(word.to_lowercase());
        self.prune_stop_words();
    }

    pub fn add_condition(&mut self, word: &str, op: Operator) {
        self.conditions.insert(word.to_lowercase(), op);
        self.prune_stop_words();
    }

    pub fn add_aggregate(&mut self, word: &str, func: AggregateFunc) {
        self.aggregates.insert(word.to_lowercase(), func);
        self.prune_stop_words();
    }

    pub fn add_direction(&mut self, word: &str, direction: SortOrder) {
        self.directions.insert(word.to_lowercase(), direction);
    }

    pub fn add_stop_word(&mut self, word: &str) {
        self.stop_words.insert(word.to_lowercase());
        self.prune_stop_words();
    }

    // A trigger word is never dropped as a stop word.
    fn prune_stop_words(&mut self) {
        let triggers: Vec<String> = self
            .stop_words
            .iter()
            .filter(|w| Role::ALL.iter().any(|role| self.is(*role, w)))
            .cloned()
            .collect();
        for word in triggers {
            self.stop_words.remove(&word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary() {
        let t = Taxonomy::default();
        assert!(t.is(Role::Selection, "choose"));
        assert!(t.is(Role::Group, "by"));
        assert!(t.is(Role::Join, "merge"));
        assert_eq!(t.condition("greater"), Some(Operator::Gt));
        assert_eq!(t.condition("equal"), Some(Operator::Eq));
        assert_eq!(t.aggregate("average"), Some(AggregateFunc::Avg));
        assert_eq!(t.aggregate("total"), Some(AggregateFunc::Sum));
        assert_eq!(t.direction("descending"), Some(SortOrder::Desc));
        assert!(!t.is(Role::Filter, "choose"));
    }

    #[test]
    fn test_stop_words_never_contain_triggers() {
        let t = Taxonomy::default();
        assert!(t.is_stop_word("the"));
        assert!(t.is_stop_word("than"));
        for role in Role::ALL {
            for word in t.words(role) {
                assert!(!t.is_stop_word(word), "'{}' is both trigger and stop word", word);
            }
        }
    }

    #[test]
    fn test_exit_sets() {
        let t = Taxonomy::default();
        assert!(t.is_exit(Window::Filter, "from"));
        assert!(t.is_exit(Window::Filter, "sort"));
        assert!(!t.is_exit(Window::Filter, "greater"));
        assert!(!t.is_exit(Window::Aggregate, "by"));
        assert!(t.is_exit(Window::Having, "from"));
    }

    #[test]
    fn test_extension_prunes_stop_words() {
        let mut t = Taxonomy::default();
        assert!(t.is_stop_word("show"));
        t.add_word(Role::Selection, "Show");
        assert!(t.is(Role::Selection, "show"));
        assert!(!t.is_stop_word("show"));

        t.add_condition("above", Operator::Gt);
        assert_eq!(t.condition("above"), Some(Operator::Gt));
        assert!(!t.is_stop_word("above"));
    }
}
