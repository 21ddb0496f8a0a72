//! Member ignore lists

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;

/// A member to exclude, optionally qualified by class name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberPath {
    class: Option<Arc<str>>,
    member: Arc<str>,
}

impl MemberPath {
    /// Any member with this name, on any class
    pub fn member(member: &str) -> Self {
        Self {
            class: None,
            member: Arc::from(member),
        }
    }

    /// The member with this name on the named class only
    pub fn qualified(class: &str, member: &str) -> Self {
        Self {
            class: Some(Arc::from(class)),
            member: Arc::from(member),
        }
    }

    fn matches(&self, class: &str, member: &str) -> bool {
        &*self.member == member && self.class.as_deref().is_none_or(|c| c == class)
    }
}

impl FromStr for MemberPath {
    type Err = ConfigError;

    /// Parse `member` or `Class.member`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::IgnoreEntry(s.to_string());
        match s.split_once('.') {
            None if !s.is_empty() => Ok(Self::member(s)),
            Some((class, member))
                if !class.is_empty() && !member.is_empty() && !member.contains('.') =>
            {
                Ok(Self::qualified(class, member))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}.{}", class, self.member),
            None => write!(f, "{}", self.member),
        }
    }
}

/// Set of members excluded from descriptor sets
///
/// Ordered so that equal sets hash equally; it is part of the descriptor
/// cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IgnoreSet(BTreeSet<MemberPath>);

impl IgnoreSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bare member name (builder style)
    pub fn with_member(mut self, member: &str) -> Self {
        self.insert(MemberPath::member(member));
        self
    }

    /// Add a class-qualified member (builder style)
    pub fn with_qualified(mut self, class: &str, member: &str) -> Self {
        self.insert(MemberPath::qualified(class, member));
        self
    }

    pub fn insert(&mut self, path: MemberPath) -> bool {
        self.0.insert(path)
    }

    /// Check whether `member` of `class` is excluded
    pub fn contains(&self, class: &str, member: &str) -> bool {
        self.0.iter().any(|path| path.matches(class, member))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberPath> {
        self.0.iter()
    }

    /// Parse a list of `member` / `Class.member` entries
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, ConfigError> {
        entries
            .iter()
            .map(|entry| entry.as_ref().parse::<MemberPath>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map(IgnoreSet)
    }
}

impl FromIterator<MemberPath> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = MemberPath>>(iter: I) -> Self {
        IgnoreSet(iter.into_iter().collect())
    }
}
