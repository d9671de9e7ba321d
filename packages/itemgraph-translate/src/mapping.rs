//! Generic class/field mapping
//!
//! Every source item passes through a [`ClassMapping`] before any class
//! specific rule runs. The mapping keeps the identifier, moves the class into
//! the target namespace and renames or drops fields. An item whose class has
//! no mapping produces no target item at all.
//!
//! [`FieldMapping`] is the YAML-backed implementation:
//!
//! ```yaml
//! version: 1
//! source_namespace: "http://www.flymine.org/model/mage#"
//! classes:
//!   BibliographicReference:
//!     target: Publication
//!     drop: [authors]
//!   Treatment: {}            # same class name, every field copied
//!   Reporter:
//!     passthrough: false     # only renamed fields are copied
//!     rename:
//!       name: identifier
//! ```

use itemgraph_store::Item;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::config::error::{check_version, ConfigError, ConfigResult};

/// Port for the generic per-class translation
pub trait ClassMapping: Send + Sync {
    /// Map `item` into the target model, or `None` when its class is unmapped
    fn translate(&self, item: &Item, target_ns: &str) -> Option<Item>;

    /// Namespace the mapped source classes live in
    fn source_namespace(&self) -> &str;
}

/// Mapping of one source class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassRule {
    /// Target class fragment; defaults to the source fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Source field name → target field name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rename: BTreeMap<String, String>,

    /// Source fields that are never copied
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub drop: BTreeSet<String>,

    /// Copy fields that are neither renamed nor dropped under their own name
    pub passthrough: bool,
}

impl Default for ClassRule {
    fn default() -> Self {
        Self {
            target: None,
            rename: BTreeMap::new(),
            drop: BTreeSet::new(),
            passthrough: true,
        }
    }
}

impl ClassRule {
    /// Rule mapping onto `target`, copying every field
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..Default::default()
        }
    }

    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    pub fn drop_field(mut self, name: impl Into<String>) -> Self {
        self.drop.insert(name.into());
        self
    }

    pub fn strict(mut self) -> Self {
        self.passthrough = false;
        self
    }

    fn target_name<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.drop.contains(name) {
            return None;
        }
        match self.rename.get(name) {
            Some(renamed) => Some(renamed.as_str()),
            None if self.passthrough => Some(name),
            None => None,
        }
    }
}

/// YAML-backed [`ClassMapping`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMapping {
    /// Schema version (always 1)
    pub version: u32,

    /// Namespace of the source classes, including the trailing `#`
    pub source_namespace: String,

    /// Source class fragment → rule
    #[serde(default)]
    pub classes: BTreeMap<String, ClassRule>,
}

/// Mapping for MAGE source graphs shipped with the crate
const BUILTIN_MAGE_MAPPING: &str = include_str!("../mappings/mage.yaml");

impl FieldMapping {
    pub fn new(source_namespace: impl Into<String>) -> Self {
        Self {
            version: 1,
            source_namespace: source_namespace.into(),
            classes: BTreeMap::new(),
        }
    }

    /// Add (or replace) the rule for a source class fragment
    pub fn class(mut self, fragment: impl Into<String>, rule: ClassRule) -> Self {
        self.classes.insert(fragment.into(), rule);
        self
    }

    /// Mapping for MAGE experiment graphs
    pub fn builtin_mage() -> ConfigResult<Self> {
        Self::from_yaml_str(BUILTIN_MAGE_MAPPING)
    }

    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        check_version(content)?;
        let mapping: Self = serde_yaml::from_str(content)?;
        mapping.validate()?;
        Ok(mapping)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        serde_yaml::to_string(self).map_err(ConfigError::Yaml)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.source_namespace.ends_with('#') {
            return Err(ConfigError::validation(format!(
                "source_namespace '{}' must end with '#'",
                self.source_namespace
            )));
        }
        for (fragment, rule) in &self.classes {
            if let Some(target) = &rule.target {
                if target.is_empty() || target.contains('#') {
                    return Err(ConfigError::validation(format!(
                        "class '{}' has invalid target '{}'",
                        fragment, target
                    )));
                }
            }
            if let Some(field) = rule.rename.keys().find(|f| rule.drop.contains(*f)) {
                return Err(ConfigError::validation(format!(
                    "class '{}' both renames and drops field '{}'",
                    fragment, field
                )));
            }
        }
        Ok(())
    }

    fn rule_for<'a>(&'a self, class_name: &'a str) -> Option<(&'a str, &'a ClassRule)> {
        let fragment = class_name.strip_prefix(self.source_namespace.as_str())?;
        let rule = self.classes.get(fragment)?;
        let target = rule.target.as_deref().unwrap_or(fragment);
        Some((target, rule))
    }

    /// Target class for a source class name
    pub fn target_class(&self, class_name: &str, target_ns: &str) -> Option<String> {
        self.rule_for(class_name)
            .map(|(target, _)| format!("{}{}", target_ns, target))
    }
}

impl ClassMapping for FieldMapping {
    fn translate(&self, item: &Item, target_ns: &str) -> Option<Item> {
        let (target, rule) = self.rule_for(&item.class_name)?;
        let mut tgt = Item::new(item.identifier.clone(), format!("{}{}", target_ns, target));

        // Interfaces without a mapping are dropped
        if let Some(implementations) = &item.implementations {
            let mapped: Vec<String> = implementations
                .split_whitespace()
                .filter_map(|class| self.target_class(class, target_ns))
                .collect();
            if !mapped.is_empty() {
                tgt.implementations = Some(mapped.join(" "));
            }
        }

        for (name, value) in &item.attributes {
            if let Some(to) = rule.target_name(name) {
                tgt.add_attribute(to, value.clone());
            }
        }
        for (name, ref_id) in &item.references {
            if let Some(to) = rule.target_name(name) {
                tgt.add_reference(to, ref_id.clone());
            }
        }
        for (name, ref_ids) in &item.collections {
            if let Some(to) = rule.target_name(name) {
                tgt.add_collection(to, ref_ids.clone());
            }
        }

        Some(tgt)
    }

    fn source_namespace(&self) -> &str {
        &self.source_namespace
    }
}
