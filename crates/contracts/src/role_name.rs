//! RoleName - Cheap-to-clone role label
//!
//! Roles are assigned upstream ("sub0", "mid", ...) and are case-sensitive.
//! Uses Arc<str> internally so the same label can key several role maps.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Role label with cheap cloning.
///
/// A role is discovered lazily the first time an upstream message names it;
/// there is no registry of valid roles. Ordering is plain lexicographic byte
/// order of the label, which is what snapshot rendering sorts by.
///
/// # Examples
/// ```
/// use contracts::RoleName;
///
/// let role: RoleName = "sub0".into();
/// let again = role.clone();
/// assert_eq!(role, again);
/// assert_eq!(role.as_str(), "sub0");
/// ```
#[derive(Clone, Default)]
pub struct RoleName(Arc<str>);

impl RoleName {
    /// Create a new RoleName from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Deref to &str for easy string operations
impl Deref for RoleName {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for RoleName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RoleName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Conversions
impl From<&str> for RoleName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for RoleName {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<Arc<str>> for RoleName {
    #[inline]
    fn from(s: Arc<str>) -> Self {
        Self(s)
    }
}

// Display and Debug
impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleName({:?})", self.0)
    }
}

// Equality - can compare with &str, String, etc.
impl PartialEq for RoleName {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for RoleName {}

impl PartialEq<str> for RoleName {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for RoleName {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialEq<String> for RoleName {
    #[inline]
    fn eq(&self, other: &String) -> bool {
        self.0.as_ref() == other
    }
}

// Ordering follows the underlying string so sorted listings are lexicographic
impl PartialOrd for RoleName {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RoleName {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_ref().cmp(other.0.as_ref())
    }
}

// Hash - same as str hash for HashMap compatibility
impl Hash for RoleName {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

// Serde support
impl Serialize for RoleName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RoleName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_shares_storage() {
        let a: RoleName = "mid".into();
        let b = a.clone();
        assert_eq!(a.as_str().as_ptr(), b.as_str().as_ptr());
    }

    #[test]
    fn test_case_sensitive_equality() {
        let role: RoleName = "sub1".into();
        assert_eq!(role, "sub1");
        assert_eq!(role, String::from("sub1"));
        assert_ne!(role, RoleName::from("SUB1"));
    }

    #[test]
    fn test_lookup_by_str() {
        let mut map: HashMap<RoleName, i64> = HashMap::new();
        map.insert("sub0".into(), 3);
        assert_eq!(map.get("sub0"), Some(&3));
        assert_eq!(map.get("sub9"), None);
    }

    #[test]
    fn test_lexicographic_order() {
        let mut roles: Vec<RoleName> =
            vec!["sub2".into(), "mid".into(), "Sub0".into(), "sub1".into()];
        roles.sort();
        let names: Vec<&str> = roles.iter().map(RoleName::as_str).collect();
        assert_eq!(names, vec!["Sub0", "mid", "sub1", "sub2"]);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let role: RoleName = "mid".into();
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"mid\"");
        let parsed: RoleName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, role);
    }
}
