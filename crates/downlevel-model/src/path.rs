//! Addresses for nodes in the management model tree
//!
//! Provides [`PathElement`] (`key=value` segment) and [`PathAddress`]
//! (ordered segment sequence) for hierarchical addressing of resources.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

/// Wildcard marker accepted as a [`PathElement`] value in patterns.
pub const WILDCARD: &str = "*";

/// One `key=value` segment of a [`PathAddress`]
///
/// The key names a child type (`subsystem`, `store`), the value names the
/// concrete child (`store-subsystem`, `journal`). A value of `*` matches any
/// concrete value and is only meaningful in registration patterns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathElement {
    key: String,
    value: String,
}

impl PathElement {
    /// Create a new element
    ///
    /// # Errors
    /// Returns [`PathError::EmptySegment`] if key or value is empty and
    /// [`PathError::InvalidSegment`] if either contains `/` or `=`, or the
    /// key contains `*`.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, PathError> {
        let key = key.into();
        let value = value.into();
        validate_segment(&key, false)?;
        validate_segment(&value, true)?;
        Ok(Self { key, value })
    }

    /// Create a wildcard element (`key=*`) for registration patterns
    ///
    /// # Errors
    /// Returns an error if the key is empty or invalid.
    pub fn wildcard(key: impl Into<String>) -> Result<Self, PathError> {
        Self::new(key, WILDCARD)
    }

    /// Child type key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Child name value (may be `*` in patterns)
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Check if this element's value is the wildcard
    #[inline]
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD
    }

    /// Match this element, as a pattern, against a concrete element
    ///
    /// Keys must be equal; the value must be equal or this side a wildcard.
    /// Matching is pattern-vs-concrete: a wildcard on `concrete` does not
    /// match a named value on `self`.
    #[inline]
    #[must_use]
    pub fn matches(&self, concrete: &Self) -> bool {
        self.key == concrete.key && (self.is_wildcard() || self.value == concrete.value)
    }
}

fn validate_segment(segment: &str, allow_wildcard: bool) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment);
    }
    if segment.contains(['/', '=']) || (!allow_wildcard && segment.contains('*')) {
        return Err(PathError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

impl Display for PathElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl FromStr for PathElement {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| PathError::InvalidSegment(s.to_string()))?;
        Self::new(key, value)
    }
}

impl Serialize for PathElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PathElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Ordered, immutable address of a node in the resource tree
///
/// Comparable for prefix/ancestor relationships and matchable against
/// concrete addresses when used as a registration pattern.
///
/// # Examples
/// - `/subsystem=store` addresses the store subsystem root
/// - `/subsystem=store/journal=*` matches every journal child (pattern)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PathAddress(SmallVec<[PathElement; 4]>);

impl PathAddress {
    /// Empty address (tree root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    /// Address with a single element
    #[inline]
    #[must_use]
    pub fn of(element: PathElement) -> Self {
        Self(smallvec::smallvec![element])
    }

    /// Address from a sequence of elements
    #[inline]
    pub fn new(elements: impl IntoIterator<Item = PathElement>) -> Self {
        Self(elements.into_iter().collect())
    }

    /// Path elements from root to leaf
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    /// Number of elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this is the root address
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parent address (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].iter().cloned().collect()))
        }
    }

    /// Last element (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    /// First element (if not root)
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&PathElement> {
        self.0.first()
    }

    /// Append an element, returning the child address
    #[inline]
    #[must_use]
    pub fn child(&self, element: PathElement) -> Self {
        let mut new = self.clone();
        new.0.push(element);
        new
    }

    /// Check if this address is a prefix of another (wildcard-blind)
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0[..] == other.0[..self.0.len()]
    }

    /// Check if this address is a strict ancestor of another
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Match this address, as a pattern, against a concrete address
    ///
    /// Lengths must be equal and every element must match (wildcard-aware).
    #[must_use]
    pub fn matches(&self, concrete: &Self) -> bool {
        self.0.len() == concrete.0.len()
            && self.0.iter().zip(&concrete.0).all(|(p, c)| p.matches(c))
    }

    /// Match this address, as a pattern, against a prefix of a concrete address
    #[must_use]
    pub fn matches_prefix_of(&self, concrete: &Self) -> bool {
        self.0.len() <= concrete.0.len()
            && self.0.iter().zip(&concrete.0).all(|(p, c)| p.matches(c))
    }

    /// Common prefix of two addresses
    #[must_use]
    pub fn common_prefix(&self, other: &Self) -> Self {
        Self(
            self.0
                .iter()
                .zip(&other.0)
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a.clone())
                .collect(),
        )
    }

    /// Relative address from an ancestor
    ///
    /// # Errors
    /// Returns [`PathError::NotDescendant`] if `ancestor` is not a prefix of
    /// `self`.
    pub fn relative_to(&self, ancestor: &Self) -> Result<Self, PathError> {
        if !ancestor.is_prefix_of(self) {
            return Err(PathError::NotDescendant {
                path: self.to_string(),
                ancestor: ancestor.to_string(),
            });
        }
        Ok(Self(self.0[ancestor.0.len()..].iter().cloned().collect()))
    }

    /// Iterator over elements from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }
}

impl Display for PathAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for element in &self.0 {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}

impl FromStr for PathAddress {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix('/').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let elements: SmallVec<[PathElement; 4]> = trimmed
            .split('/')
            .map(PathElement::from_str)
            .collect::<Result<_, _>>()?;
        Ok(Self(elements))
    }
}

impl From<PathElement> for PathAddress {
    fn from(element: PathElement) -> Self {
        Self::of(element)
    }
}

impl FromIterator<PathElement> for PathAddress {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Errors related to path addresses
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty key or value in a segment
    #[error("path segment has an empty key or value")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid path segment: {0} (must not contain '/' or '=')")]
    InvalidSegment(String),

    /// Not a descendant path
    #[error("address '{path}' is not a descendant of '{ancestor}'")]
    NotDescendant {
        /// The address that was expected to be a descendant
        path: String,
        /// The claimed ancestor
        ancestor: String,
    },
}
