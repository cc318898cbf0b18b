//! Translator configuration.
//!
//! ```toml
//! mode = "keyword-driven"
//! default_table = "records"
//! schema_path = "schema.json"
//!
//! [keywords]
//! selection = ["display"]
//! stop_words = ["kindly"]
//!
//! [keywords.conditions]
//! above = "gt"
//!
//! [keywords.aggregates]
//! mean = "avg"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::ast::{AggregateFunc, Operator, SortOrder};
use crate::classifier::ModePolicy;
use crate::error::{NlqError, NlqResult};
use crate::keywords::{Role, Taxonomy};
use crate::resolver::DEFAULT_TABLE;
use crate::schema::Schema;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NlqConfig {
    /// Path to a schema file (JSON or TOML)
    pub schema_path: Option<PathBuf>,

    /// Retrieval/aggregation decision policy
    pub mode: ModePolicy,

    /// Table name used when the sentence names no known table
    pub default_table: String,

    /// Extra vocabulary merged into the default taxonomy
    pub keywords: KeywordExtensions,
}

impl Default for NlqConfig {
    fn default() -> Self {
        Self {
            schema_path: None,
            mode: ModePolicy::default(),
            default_table: DEFAULT_TABLE.to_string(),
            keywords: KeywordExtensions::default(),
        }
    }
}

/// Words added to the built-in vocabularies.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeywordExtensions {
    pub selection: Vec<String>,
    pub filter: Vec<String>,
    pub join: Vec<String>,
    pub group: Vec<String>,
    pub order: Vec<String>,
    pub having: Vec<String>,
    pub from: Vec<String>,
    pub conditions: BTreeMap<String, Operator>,
    pub aggregates: BTreeMap<String, AggregateFunc>,
    pub directions: BTreeMap<String, SortOrder>,
    pub stop_words: Vec<String>,
}

impl NlqConfig {
    /// Create a new configuration builder
    pub fn builder() -> NlqConfigBuilder {
        NlqConfigBuilder::default()
    }

    pub fn from_toml(input: &str) -> NlqResult<Self> {
        toml::from_str(input).map_err(|e| NlqError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> NlqResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            NlqError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loading config");
        Self::from_toml(&content)
    }

    /// `<config dir>/nlq/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nlq").join("config.toml"))
    }

    /// Load the per-user configuration if one exists, otherwise the defaults.
    pub fn load_default() -> NlqResult<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// The default taxonomy with every configured word merged in.
    pub fn taxonomy(&self) -> Taxonomy {
        let mut taxonomy = Taxonomy::default();
        let kw = &self.keywords;
        let plain = [
            (Role::Selection, &kw.selection),
            (Role::Filter, &kw.filter),
            (Role::Join, &kw.join),
            (Role::Group, &kw.group),
            (Role::Order, &kw.order),
            (Role::Having, &kw.having),
            (Role::From, &kw.from),
        ];
        for (role, words) in plain {
            for word in words {
                taxonomy.add_word(role, word);
            }
        }
        for (word, op) in &kw.conditions {
            taxonomy.add_condition(word, *op);
        }
        for (word, func) in &kw.aggregates {
            taxonomy.add_aggregate(word, *func);
        }
        for (word, direction) in &kw.directions {
            taxonomy.add_direction(word, *direction);
        }
        for word in &kw.stop_words {
            taxonomy.add_stop_word(word);
        }
        taxonomy
    }

    /// Load the schema named by `schema_path`, if any.
    pub fn schema(&self) -> NlqResult<Option<Schema>> {
        self.schema_path.as_ref().map(|path| Schema::load(path)).transpose()
    }
}

/// Builder for NlqConfig
#[derive(Debug, Default)]
pub struct NlqConfigBuilder {
    config: NlqConfig,
}

impl NlqConfigBuilder {
    /// Set the schema path
    pub fn schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.schema_path = Some(path.into());
        self
    }

    pub fn mode(mut self, mode: ModePolicy) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn default_table(mut self, name: impl Into<String>) -> Self {
        self.config.default_table = name.into();
        self
    }

    pub fn keywords(mut self, keywords: KeywordExtensions) -> Self {
        self.config.keywords = keywords;
        self
    }

    /// Build the configuration
    pub fn build(self) -> NlqConfig {
        self.config
    }
}
