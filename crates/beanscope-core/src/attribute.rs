//! Attribute derivation.
//!
//! The logical attribute model of a type is derived from its registered
//! methods by naming convention: `get<X>` / `is<X>` / `set<X>`. A getter
//! and setter for the same `X` merge into a single attribute; the merge
//! is keyed by exact name and is order-independent over the method list.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::descriptor::{MethodDescriptor, TypeDescriptor, TypeRef};
use crate::ignore::IgnoreList;
use crate::signature::OperationSignature;

// ── Access classification ───────────────────────────────────────────

/// Derived read/write classification — never stored, always computed
/// from which accessors are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AccessKind {
    #[strum(serialize = "read-write")]
    ReadWrite,
    #[strum(serialize = "read-only")]
    ReadOnly,
    #[strum(serialize = "write-only")]
    WriteOnly,
}

// ── Attribute ───────────────────────────────────────────────────────

/// A named, typed property backed by accessor methods. At least one of
/// getter/setter is always present.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    getter: Option<Arc<MethodDescriptor>>,
    setter: Option<Arc<MethodDescriptor>>,
    value_type: TypeRef,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn getter(&self) -> Option<&Arc<MethodDescriptor>> {
        self.getter.as_ref()
    }

    pub fn setter(&self) -> Option<&Arc<MethodDescriptor>> {
        self.setter.as_ref()
    }

    pub fn value_type(&self) -> &TypeRef {
        &self.value_type
    }

    pub fn access_kind(&self) -> AccessKind {
        match (&self.getter, &self.setter) {
            (Some(_), Some(_)) => AccessKind::ReadWrite,
            (Some(_), None) => AccessKind::ReadOnly,
            // The derivation never produces (None, None).
            (None, _) => AccessKind::WriteOnly,
        }
    }
}

// ── Shape predicates ────────────────────────────────────────────────

fn getter_name(method: &MethodDescriptor) -> Option<&str> {
    let rest = method.name().strip_prefix("get")?;
    if rest.is_empty() || !method.params().is_empty() || method.returns().is_none() {
        return None;
    }
    Some(rest)
}

fn boolean_getter_name(method: &MethodDescriptor) -> Option<&str> {
    let rest = method.name().strip_prefix("is")?;
    if rest.is_empty() || !method.params().is_empty() {
        return None;
    }
    (method.returns() == Some(&TypeRef::Bool)).then_some(rest)
}

fn setter_name(method: &MethodDescriptor) -> Option<&str> {
    let rest = method.name().strip_prefix("set")?;
    if rest.is_empty() || method.params().len() != 1 || method.returns().is_some() {
        return None;
    }
    Some(rest)
}

/// Whether a method has any attribute-accessor shape. Everything else is
/// an operation.
pub fn is_attribute_accessor(method: &MethodDescriptor) -> bool {
    getter_name(method).is_some()
        || boolean_getter_name(method).is_some()
        || setter_name(method).is_some()
}

// ── Derivation ──────────────────────────────────────────────────────

/// Derive the attribute model of a type.
///
/// Ignore-listed methods are excluded before classification. Anomalies
/// are reported as warnings and downgraded, never fatal:
///
/// - getter/setter type conflict → the setter is dropped from the model
///   (read-only for safety); the attribute keeps the getter's type
/// - two getter shapes (`get` and `is`) for one name → first registered
///   wins; the count invariant holds either way
pub fn derive_attributes(
    descriptor: &TypeDescriptor,
    ignore: &IgnoreList,
) -> BTreeMap<String, Attribute> {
    let mut attributes: BTreeMap<String, Attribute> = BTreeMap::new();

    for method in descriptor.methods() {
        if ignore.is_ignored(descriptor.name(), &OperationSignature::of(method)) {
            continue;
        }

        if let Some(name) = getter_name(method).or_else(|| boolean_getter_name(method)) {
            let Some(value_type) = method.returns().cloned() else {
                continue;
            };
            merge_getter(&mut attributes, descriptor.name(), name, method, value_type);
        } else if let Some(name) = setter_name(method) {
            let Some(value_type) = method.params().first().cloned() else {
                continue;
            };
            merge_setter(&mut attributes, descriptor.name(), name, method, value_type);
        }
        // Anything else is an operation, not an attribute.
    }

    attributes
}

fn merge_getter(
    attributes: &mut BTreeMap<String, Attribute>,
    type_name: &str,
    name: &str,
    method: &Arc<MethodDescriptor>,
    value_type: TypeRef,
) {
    match attributes.get_mut(name) {
        None => {
            attributes.insert(
                name.to_owned(),
                Attribute {
                    name: name.to_owned(),
                    getter: Some(Arc::clone(method)),
                    setter: None,
                    value_type,
                },
            );
        }
        Some(existing) => {
            if let Some(previous) = &existing.getter {
                tracing::warn!(
                    managed_type = type_name,
                    attribute = name,
                    kept = previous.name(),
                    skipped = method.name(),
                    "duplicate getter shapes for one attribute; first registration wins"
                );
                return;
            }
            // Setter registered first. The attribute's type becomes the
            // getter's type; on conflict the set side is dropped.
            if existing.value_type != value_type {
                tracing::warn!(
                    managed_type = type_name,
                    attribute = name,
                    getter_type = %value_type,
                    setter_type = %existing.value_type,
                    "getter/setter type conflict; treating attribute as read-only"
                );
                existing.setter = None;
            }
            existing.getter = Some(Arc::clone(method));
            existing.value_type = value_type;
        }
    }
}

fn merge_setter(
    attributes: &mut BTreeMap<String, Attribute>,
    type_name: &str,
    name: &str,
    method: &Arc<MethodDescriptor>,
    value_type: TypeRef,
) {
    match attributes.get_mut(name) {
        None => {
            attributes.insert(
                name.to_owned(),
                Attribute {
                    name: name.to_owned(),
                    getter: None,
                    setter: Some(Arc::clone(method)),
                    value_type,
                },
            );
        }
        Some(existing) => {
            if existing.setter.is_some() {
                tracing::warn!(
                    managed_type = type_name,
                    attribute = name,
                    skipped = method.name(),
                    "duplicate setter for one attribute; first registration wins"
                );
                return;
            }
            if existing.getter.is_some() && existing.value_type != value_type {
                tracing::warn!(
                    managed_type = type_name,
                    attribute = name,
                    getter_type = %existing.value_type,
                    setter_type = %value_type,
                    "getter/setter type conflict; treating attribute as read-only"
                );
                return;
            }
            existing.setter = Some(Arc::clone(method));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::value::Value;

    fn ignore() -> IgnoreList {
        IgnoreList::with_defaults()
    }

    #[test]
    fn getter_setter_pair_merges_to_read_write() {
        let descriptor = TypeDescriptor::builder::<()>("sample.Counter")
            .getter("getCount", TypeRef::Int, |_| Value::Int(0))
            .setter("setCount", TypeRef::Int, |_, _| Ok(()))
            .build();
        let attrs = derive_attributes(&descriptor, &ignore());
        assert_eq!(attrs.len(), 1);
        let attr = attrs.get("Count").unwrap();
        assert_eq!(attr.access_kind(), AccessKind::ReadWrite);
        assert_eq!(attr.value_type(), &TypeRef::Int);
    }

    #[test]
    fn merge_is_order_independent() {
        let setter_first = TypeDescriptor::builder::<()>("sample.Counter")
            .setter("setCount", TypeRef::Int, |_, _| Ok(()))
            .getter("getCount", TypeRef::Int, |_| Value::Int(0))
            .build();
        let attrs = derive_attributes(&setter_first, &ignore());
        assert_eq!(attrs.get("Count").unwrap().access_kind(), AccessKind::ReadWrite);
    }

    #[test]
    fn boolean_getter_is_read_only() {
        let descriptor = TypeDescriptor::builder::<()>("sample.Worker")
            .getter("isPaused", TypeRef::Bool, |_| Value::Bool(false))
            .build();
        let attrs = derive_attributes(&descriptor, &ignore());
        let attr = attrs.get("Paused").unwrap();
        assert_eq!(attr.access_kind(), AccessKind::ReadOnly);
        assert_eq!(attr.value_type(), &TypeRef::Bool);
    }

    #[test]
    fn is_prefix_requires_boolean_return() {
        let descriptor = TypeDescriptor::builder::<()>("sample.Worker")
            .getter("isoDate", TypeRef::Text, |_| Value::Text(String::new()))
            .build();
        // "isoDate" strips to "oDate" but the return is not boolean, so it
        // is an operation, not an attribute.
        let attrs = derive_attributes(&descriptor, &ignore());
        assert!(attrs.is_empty());
    }

    #[test]
    fn duplicate_getter_shapes_do_not_double_count() {
        let descriptor = TypeDescriptor::builder::<()>("sample.Worker")
            .getter("getPaused", TypeRef::Bool, |_| Value::Bool(true))
            .getter("isPaused", TypeRef::Bool, |_| Value::Bool(false))
            .build();
        let attrs = derive_attributes(&descriptor, &ignore());
        assert_eq!(attrs.len(), 1);
        // First registration wins.
        assert_eq!(attrs.get("Paused").unwrap().getter().unwrap().name(), "getPaused");
    }

    #[test]
    fn type_conflict_downgrades_to_read_only_both_orders() {
        let getter_first = TypeDescriptor::builder::<()>("sample.Worker")
            .getter("getLimit", TypeRef::Int, |_| Value::Int(1))
            .setter("setLimit", TypeRef::Text, |_, _| Ok(()))
            .build();
        let setter_first = TypeDescriptor::builder::<()>("sample.Worker")
            .setter("setLimit", TypeRef::Text, |_, _| Ok(()))
            .getter("getLimit", TypeRef::Int, |_| Value::Int(1))
            .build();
        for descriptor in [getter_first, setter_first] {
            let attrs = derive_attributes(&descriptor, &ignore());
            let attr = attrs.get("Limit").unwrap();
            assert_eq!(attr.access_kind(), AccessKind::ReadOnly);
            assert_eq!(attr.value_type(), &TypeRef::Int);
        }
    }

    #[test]
    fn lone_setter_is_write_only() {
        let descriptor = TypeDescriptor::builder::<()>("sample.Worker")
            .setter("setSecret", TypeRef::Text, |_, _| Ok(()))
            .build();
        let attrs = derive_attributes(&descriptor, &ignore());
        assert_eq!(attrs.get("Secret").unwrap().access_kind(), AccessKind::WriteOnly);
    }

    #[test]
    fn ignored_accessors_never_become_attributes() {
        let descriptor = TypeDescriptor::builder::<()>("pool.DataSource")
            .getter("getConnection", TypeRef::Named("pool.Connection".into()), |_| {
                Value::Null
            })
            .getter("getSize", TypeRef::Int, |_| Value::Int(4))
            .build();
        let attrs = derive_attributes(&descriptor, &ignore());
        assert!(attrs.contains_key("Size"));
        assert!(!attrs.contains_key("Connection"));
    }

    #[test]
    fn operations_are_not_attributes() {
        let descriptor = TypeDescriptor::builder::<()>("sample.Worker")
            .method("restart", Vec::new(), None, |_, _| Ok(Value::Null))
            .method("getName", vec![TypeRef::Int], Some(TypeRef::Text), |_, _| {
                Ok(Value::Text(String::new()))
            })
            .build();
        // restart has no accessor prefix; getName takes a parameter.
        let attrs = derive_attributes(&descriptor, &ignore());
        assert!(attrs.is_empty());
    }
}
