//! Clone configuration
//!
//! [`CloneSettings`] is what a clone call runs with: discovery mode, depth
//! policy, ignore list, construction hook and descriptor cache.
//! [`CloneConfig`] is its plain-data half, which can be loaded from TOML:
//!
//! ```toml
//! member-kind = "both"
//! level = "first-level-only"
//! ignore = ["password", "Session.token"]
//! ```

use std::fmt;
use std::sync::Arc;

use graphclone_model::{Class, InstantiateError, Value};
use serde::{Deserialize, Serialize};

use crate::cache::{global_cache, DescriptorCache};
use crate::error::ConfigError;
use crate::ignore::{IgnoreSet, MemberPath};
use crate::resolver::MemberKind;

/// How deep the copy goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloneLevel {
    /// Copy the whole reachable graph
    #[default]
    Full,
    /// Copy only scalar members of general objects; other members stay unset
    FirstLevelOnly,
}

/// Hook producing fresh general-object instances
pub type InstanceFactory =
    Arc<dyn Fn(&Arc<Class>) -> Result<Value, InstantiateError> + Send + Sync>;

/// Settings for one clone operation
#[derive(Clone)]
pub struct CloneSettings {
    /// Which members are discovered
    pub member_kind: MemberKind,
    /// Depth policy
    pub level: CloneLevel,
    /// Members excluded from discovery
    pub ignore: IgnoreSet,
    create_instance: Option<InstanceFactory>,
    cache: Arc<dyn DescriptorCache>,
}

impl CloneSettings {
    /// Properties, full depth, nothing ignored, global cache
    pub fn new() -> Self {
        Self {
            member_kind: MemberKind::default(),
            level: CloneLevel::default(),
            ignore: IgnoreSet::new(),
            create_instance: None,
            cache: global_cache(),
        }
    }

    pub fn with_member_kind(mut self, member_kind: MemberKind) -> Self {
        self.member_kind = member_kind;
        self
    }

    pub fn with_level(mut self, level: CloneLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = ignore;
        self
    }

    /// Exclude every member with this name
    pub fn ignore_member(mut self, member: &str) -> Self {
        self.ignore.insert(MemberPath::member(member));
        self
    }

    /// Replace class constructors with a custom hook
    pub fn on_create_instance<F>(mut self, f: F) -> Self
    where
        F: Fn(&Arc<Class>) -> Result<Value, InstantiateError> + Send + Sync + 'static,
    {
        self.create_instance = Some(Arc::new(f));
        self
    }

    /// Use a specific descriptor cache instead of the global one
    pub fn with_cache(mut self, cache: Arc<dyn DescriptorCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &dyn DescriptorCache {
        self.cache.as_ref()
    }

    /// Produce a fresh instance through the hook, or the class constructor
    pub fn create_instance(&self, class: &Arc<Class>) -> Result<Value, InstantiateError> {
        match &self.create_instance {
            Some(create) => create(class),
            None => class.instantiate(),
        }
    }
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CloneSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloneSettings")
            .field("member_kind", &self.member_kind)
            .field("level", &self.level)
            .field("ignore", &self.ignore)
            .field("create_instance", &self.create_instance.is_some())
            .finish()
    }
}

/// Serializable clone configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CloneConfig {
    /// Which members are discovered
    pub member_kind: MemberKind,
    /// Depth policy
    pub level: CloneLevel,
    /// `member` or `Class.member` entries to exclude
    pub ignore: Vec<String>,
}

impl CloneConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Settings bound to the global cache and the class constructors
    pub fn into_settings(self) -> Result<CloneSettings, ConfigError> {
        Ok(CloneSettings::new()
            .with_member_kind(self.member_kind)
            .with_level(self.level)
            .with_ignore(IgnoreSet::parse(&self.ignore)?))
    }
}
