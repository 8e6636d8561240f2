//! Method exclusion index.
//!
//! Some accessors acquire a live resource merely by being read — calling
//! `getConnection()` on a pool opens a connection. The ignore list hides
//! such methods from attribute and operation discovery entirely, so blind
//! introspection cannot trip them. Built once at process start from a
//! fixed default set plus configured extensions; read-only afterwards, so
//! it needs no synchronization.

use std::collections::{HashMap, HashSet};

use crate::error::ProbeError;
use crate::signature::OperationSignature;

/// Accessor shapes excluded by default: resource-acquiring getters on the
/// pool and store component types this engine ships descriptors for.
const DEFAULT_IGNORES: &[(&str, &str)] = &[
    ("pool.DataSource", "getConnection()"),
    ("pool.DataSource", "getPooledConnection()"),
    ("store.SessionFactory", "getSession()"),
];

/// Declaring-type → canonical-signature exclusion index.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    index: HashMap<String, HashSet<String>>,
}

impl IgnoreList {
    /// The fixed default set only. Infallible.
    pub fn with_defaults() -> Self {
        let mut index: HashMap<String, HashSet<String>> = HashMap::new();
        for (type_name, signature) in DEFAULT_IGNORES {
            index
                .entry((*type_name).to_owned())
                .or_default()
                .insert((*signature).to_owned());
        }
        Self { index }
    }

    /// Defaults plus caller-supplied `(type, signature)` extensions.
    ///
    /// A malformed signature entry is a startup error — the caller must
    /// abort rather than run with a partially built index.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, ProbeError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut list = Self::with_defaults();
        for (type_name, signature) in entries {
            if type_name.trim().is_empty() {
                return Err(ProbeError::IgnoreEntry {
                    entry: format!("{type_name}#{signature}"),
                    reason: "empty type name".into(),
                });
            }
            let parsed =
                OperationSignature::parse(signature).map_err(|err| ProbeError::IgnoreEntry {
                    entry: format!("{type_name}#{signature}"),
                    reason: err.to_string(),
                })?;
            list.index
                .entry(type_name.trim().to_owned())
                .or_default()
                .insert(parsed.to_string());
        }
        Ok(list)
    }

    /// Whether a method is hidden from discovery. An absent declaring
    /// type short-circuits to `false` without touching any set.
    pub fn is_ignored(&self, type_name: &str, signature: &OperationSignature) -> bool {
        let Some(signatures) = self.index.get(type_name) else {
            return false;
        };
        signatures.contains(&signature.to_string())
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::descriptor::TypeRef;

    #[test]
    fn defaults_hide_connection_accessors() {
        let list = IgnoreList::with_defaults();
        let sig = OperationSignature::new("getConnection", Vec::new());
        assert!(list.is_ignored("pool.DataSource", &sig));
        assert!(!list.is_ignored("scheduler.JobStore", &sig));
    }

    #[test]
    fn extensions_are_normalized_to_canonical_text() {
        let list =
            IgnoreList::from_entries([("scheduler.JobStore", "drain( string , int )")]).unwrap();
        let sig = OperationSignature::new("drain", vec![TypeRef::Text, TypeRef::Int]);
        assert!(list.is_ignored("scheduler.JobStore", &sig));
    }

    #[test]
    fn malformed_extension_fails_construction() {
        let err = IgnoreList::from_entries([("scheduler.JobStore", "drain(")]).unwrap_err();
        assert!(matches!(err, ProbeError::IgnoreEntry { .. }));
    }

    #[test]
    fn empty_type_name_fails_construction() {
        let err = IgnoreList::from_entries([("  ", "drain()")]).unwrap_err();
        assert!(matches!(err, ProbeError::IgnoreEntry { .. }));
    }
}
