//! Canonical operation signatures.
//!
//! The wire form is `name(type1,type2,...)` with canonical type tokens
//! (primitive keywords, `string`, `object`, `<elem>[]`). Two signatures
//! are equal iff the name and the full parameter-type sequence are equal,
//! regardless of declaring type. Display ordering is name, then arity,
//! then pairwise parameter tokens — deterministic run to run.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::attribute::is_attribute_accessor;
use crate::descriptor::{MethodDescriptor, TypeDescriptor, TypeRef};
use crate::error::ProbeError;
use crate::ignore::IgnoreList;

/// An operation's name plus its ordered parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationSignature {
    name: String,
    params: Vec<TypeRef>,
}

impl OperationSignature {
    pub fn new(name: impl Into<String>, params: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().map(TypeRef::normalize).collect(),
        }
    }

    /// The canonical signature of a registered method.
    pub fn of(method: &MethodDescriptor) -> Self {
        Self {
            name: method.name().to_owned(),
            params: method.params().to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Parse canonical text back into a signature.
    pub fn parse(text: &str) -> Result<Self, ProbeError> {
        let malformed = |reason: &str| ProbeError::MalformedSignature {
            text: text.to_owned(),
            reason: reason.to_owned(),
        };

        let trimmed = text.trim();
        let open = trimmed.find('(').ok_or_else(|| malformed("missing '('"))?;
        let name = trimmed[..open].trim();
        if name.is_empty() {
            return Err(malformed("empty operation name"));
        }
        if !trimmed.ends_with(')') {
            return Err(malformed("unbalanced parentheses"));
        }
        let body = &trimmed[open + 1..trimmed.len() - 1];
        if body.contains('(') || body.contains(')') {
            return Err(malformed("unbalanced parentheses"));
        }

        let params = if body.trim().is_empty() {
            Vec::new()
        } else {
            body.split(',')
                .map(|token| {
                    TypeRef::from_token(token).ok_or_else(|| malformed("empty parameter type"))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            name: name.to_owned(),
            params,
        })
    }

    /// Resolve this signature against a type's descriptor.
    ///
    /// Ignore-listed methods are invisible here — calling one reports
    /// [`ProbeError::MemberNotFound`], the same as a member that never
    /// existed. More than one match is [`ProbeError::MemberAmbiguous`],
    /// which only malformed registration can produce.
    pub fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        ignore: &IgnoreList,
    ) -> Result<Arc<MethodDescriptor>, ProbeError> {
        let mut matches = descriptor.methods().iter().filter(|method| {
            method.name() == self.name
                && method.params() == self.params.as_slice()
                && !ignore.is_ignored(descriptor.name(), &Self::of(method))
        });

        let Some(first) = matches.next() else {
            return Err(ProbeError::MemberNotFound {
                signature: self.to_string(),
            });
        };
        let extras = matches.count();
        if extras > 0 {
            return Err(ProbeError::MemberAmbiguous {
                signature: self.to_string(),
                count: extras + 1,
            });
        }
        Ok(Arc::clone(first))
    }
}

impl fmt::Display for OperationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", param.canonical_name())?;
        }
        write!(f, ")")
    }
}

impl Ord for OperationSignature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.params.len().cmp(&other.params.len()))
            .then_with(|| {
                for (a, b) in self.params.iter().zip(&other.params) {
                    let ord = a.canonical_name().cmp(&b.canonical_name());
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            })
    }
}

impl PartialOrd for OperationSignature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// All operations of a type: every registered method that is neither an
/// attribute accessor nor ignore-listed, in display order.
pub fn derive_operations(
    descriptor: &TypeDescriptor,
    ignore: &IgnoreList,
) -> Vec<OperationSignature> {
    let mut operations: Vec<OperationSignature> = descriptor
        .methods()
        .iter()
        .filter(|method| !is_attribute_accessor(method))
        .map(|method| OperationSignature::of(method))
        .filter(|signature| !ignore.is_ignored(descriptor.name(), signature))
        .collect();
    operations.sort();
    operations
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::value::Value;

    fn sample_descriptor() -> Arc<TypeDescriptor> {
        TypeDescriptor::builder::<()>("scheduler.JobStore")
            .method(
                "schedule",
                vec![TypeRef::Text, TypeRef::Int],
                Some(TypeRef::Bool),
                |_, _| Ok(Value::Bool(true)),
            )
            .method("schedule", vec![TypeRef::Text], Some(TypeRef::Bool), |_, _| {
                Ok(Value::Bool(true))
            })
            .method("pause", Vec::new(), None, |_, _| Ok(Value::Null))
            .getter("getDepth", TypeRef::Int, |_| Value::Int(0))
            .build()
    }

    #[test]
    fn display_uses_canonical_tokens() {
        let sig = OperationSignature::new(
            "schedule",
            vec![TypeRef::Text, TypeRef::Int, TypeRef::List(Box::new(TypeRef::Long))],
        );
        assert_eq!(sig.to_string(), "schedule(string,int,long[])");
    }

    #[test]
    fn parse_format_round_trip() {
        for text in ["pause()", "schedule(string,int)", "apply(object,double[])"] {
            let sig = OperationSignature::parse(text).unwrap();
            assert_eq!(sig.to_string(), text);
        }
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for text in ["", "noparens", "foo(int", "foo(int))", "foo(int,,long)", "(int)"] {
            let err = OperationSignature::parse(text).unwrap_err();
            assert!(
                matches!(err, ProbeError::MalformedSignature { .. }),
                "expected malformed for {text:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn resolve_picks_the_exact_overload() {
        let descriptor = sample_descriptor();
        let ignore = IgnoreList::with_defaults();
        let sig = OperationSignature::parse("schedule(string)").unwrap();
        let method = sig.resolve(&descriptor, &ignore).unwrap();
        assert_eq!(method.params().len(), 1);
    }

    #[test]
    fn resolve_reports_missing_members() {
        let descriptor = sample_descriptor();
        let ignore = IgnoreList::with_defaults();
        let sig = OperationSignature::parse("vanish()").unwrap();
        assert!(matches!(
            sig.resolve(&descriptor, &ignore),
            Err(ProbeError::MemberNotFound { .. })
        ));
    }

    #[test]
    fn resolved_method_matches_original() {
        let descriptor = sample_descriptor();
        let ignore = IgnoreList::with_defaults();
        for method in descriptor.methods() {
            let sig = OperationSignature::of(method);
            let resolved =
                OperationSignature::parse(&sig.to_string()).unwrap().resolve(&descriptor, &ignore);
            // getDepth resolves too — resolution is signature-based, not
            // attribute-aware.
            let resolved = resolved.unwrap();
            assert_eq!(resolved.name(), method.name());
            assert_eq!(resolved.params(), method.params());
        }
    }

    #[test]
    fn named_primitive_tokens_unify_with_their_variants() {
        let named = OperationSignature::new("pause", vec![TypeRef::Named("int".into())]);
        let primitive = OperationSignature::new("pause", vec![TypeRef::Int]);
        // Equality and ordering agree after normalization.
        assert_eq!(named, primitive);
        assert_eq!(named.cmp(&primitive), Ordering::Equal);
        assert_eq!(named.to_string(), "pause(int)");
    }

    #[test]
    fn ordering_is_name_arity_then_tokens() {
        let mut sigs = vec![
            OperationSignature::new("schedule", vec![TypeRef::Text, TypeRef::Int]),
            OperationSignature::new("pause", Vec::new()),
            OperationSignature::new("schedule", vec![TypeRef::Int]),
            OperationSignature::new("schedule", vec![TypeRef::Bool]),
        ];
        sigs.sort();
        let rendered: Vec<String> = sigs.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "pause()",
                "schedule(boolean)",
                "schedule(int)",
                "schedule(string,int)",
            ]
        );
    }

    #[test]
    fn operations_exclude_attribute_accessors() {
        let descriptor = sample_descriptor();
        let ignore = IgnoreList::with_defaults();
        let ops = derive_operations(&descriptor, &ignore);
        let rendered: Vec<String> = ops.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["pause()", "schedule(string)", "schedule(string,int)"]
        );
    }
}
