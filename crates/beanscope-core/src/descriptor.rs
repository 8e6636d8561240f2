//! Explicit capability descriptors.
//!
//! The engine never reaches for ambient reflection: every introspectable
//! type registers a [`TypeDescriptor`] once, up front, listing exactly the
//! methods it exposes. Dynamic dispatch is confined to the
//! [`MethodDescriptor`] invoke closures — a narrow, auditable surface.
//!
//! Managed implementations use interior mutability (atomics, mutexes)
//! because a [`ManagedObject`] handle is shared and only ever borrowed for
//! the duration of a request.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::InvocationFault;
use crate::value::Value;

// ── TypeRef ─────────────────────────────────────────────────────────

/// Logical reference to a value type, with a canonical wire name.
///
/// Primitive tokens keep their keyword names (`int`, not `Integer`); text
/// is `string`; the generic fallback type is `object`; element lists
/// append `[]`; everything else uses its registered name verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Bool,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Text,
    /// Generic object — the only type eligible for the raw-text codec
    /// fallback.
    Object,
    List(Box<TypeRef>),
    Named(String),
}

impl TypeRef {
    /// The canonical token used in signatures and diagnostics.
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Bool => "boolean".into(),
            Self::Byte => "byte".into(),
            Self::Char => "char".into(),
            Self::Short => "short".into(),
            Self::Int => "int".into(),
            Self::Long => "long".into(),
            Self::Float => "float".into(),
            Self::Double => "double".into(),
            Self::Text => "string".into(),
            Self::Object => "object".into(),
            Self::List(elem) => format!("{}[]", elem.canonical_name()),
            Self::Named(name) => name.clone(),
        }
    }

    /// Parse one canonical token back into a `TypeRef`.
    ///
    /// Returns `None` only for an empty token; unknown names become
    /// [`TypeRef::Named`]. This is the sole constructor signature parsing
    /// goes through, so primitive tokens always unify with their variants.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if let Some(elem) = token.strip_suffix("[]") {
            return Self::from_token(elem).map(|e| Self::List(Box::new(e)));
        }
        Some(match token {
            "boolean" => Self::Bool,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "string" => Self::Text,
            "object" => Self::Object,
            other => Self::Named(other.to_owned()),
        })
    }

    /// Collapse a `Named` token that spells a canonical type back into
    /// its variant, so `Named("int")` and `Int` can never coexist in one
    /// descriptor or signature. Registration goes through this, keeping
    /// equality and ordering in agreement for every stored `TypeRef`.
    pub fn normalize(self) -> Self {
        match self {
            Self::List(elem) => Self::List(Box::new(elem.normalize())),
            Self::Named(name) => match Self::from_token(&name) {
                Some(normalized) => normalized,
                None => Self::Named(name),
            },
            other => other,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

// ── Method descriptors ──────────────────────────────────────────────

/// Invoke closures receive the target as `&dyn Any` and downcast inside;
/// the typed builder captures the downcast once so registration code
/// never repeats it.
pub type InvokeFn = Arc<dyn Fn(&dyn Any, &[Value]) -> Result<Value, InvocationFault> + Send + Sync>;

/// One exposed method: name, parameter types, return type, and the
/// closure that performs the call.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<TypeRef>,
    returns: Option<TypeRef>,
    invoke: InvokeFn,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Declared return type; `None` means void.
    pub fn returns(&self) -> Option<&TypeRef> {
        self.returns.as_ref()
    }

    /// Perform the call. Arity is checked here so no closure has to.
    pub fn invoke(&self, target: &dyn Any, args: &[Value]) -> Result<Value, InvocationFault> {
        if args.len() != self.params.len() {
            return Err(InvocationFault::ArityMismatch {
                expected: self.params.len(),
                got: args.len(),
            });
        }
        (self.invoke)(target, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

// ── Type descriptors ────────────────────────────────────────────────

/// The full capability surface of one managed type, built once at
/// registration and shared immutably thereafter.
#[derive(Debug)]
pub struct TypeDescriptor {
    name: String,
    methods: Vec<Arc<MethodDescriptor>>,
}

impl TypeDescriptor {
    /// Start a typed builder for the concrete type `T`.
    pub fn builder<T: Any>(name: impl Into<String>) -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder {
            name: name.into(),
            methods: Vec::new(),
            _target: PhantomData,
        }
    }

    /// Registered type name, used in signatures and the ignore index.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.methods
    }
}

/// Builder that captures the `&dyn Any` downcast once per type.
pub struct TypeDescriptorBuilder<T> {
    name: String,
    methods: Vec<Arc<MethodDescriptor>>,
    _target: PhantomData<fn(&T)>,
}

impl<T: Any> TypeDescriptorBuilder<T> {
    /// Register a method with explicit parameter and return types.
    pub fn method<F>(
        mut self,
        name: impl Into<String>,
        params: Vec<TypeRef>,
        returns: Option<TypeRef>,
        body: F,
    ) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<Value, InvocationFault> + Send + Sync + 'static,
    {
        let type_name = self.name.clone();
        let invoke: InvokeFn = Arc::new(move |target, args| {
            let target = target
                .downcast_ref::<T>()
                .ok_or_else(|| InvocationFault::WrongTarget {
                    expected: type_name.clone(),
                })?;
            body(target, args)
        });
        self.methods.push(Arc::new(MethodDescriptor {
            name: name.into(),
            params: params.into_iter().map(TypeRef::normalize).collect(),
            returns: returns.map(TypeRef::normalize),
            invoke,
        }));
        self
    }

    /// Register a zero-parameter accessor returning `value_type`.
    pub fn getter<F>(self, name: impl Into<String>, value_type: TypeRef, read: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.method(name, Vec::new(), Some(value_type), move |target, _| {
            Ok(read(target))
        })
    }

    /// Register a one-parameter void mutator taking `value_type`.
    pub fn setter<F>(self, name: impl Into<String>, value_type: TypeRef, write: F) -> Self
    where
        F: Fn(&T, &Value) -> Result<(), InvocationFault> + Send + Sync + 'static,
    {
        self.method(name, vec![value_type], None, move |target, args| {
            // Arity is already enforced by MethodDescriptor::invoke.
            let arg = args.first().unwrap_or(&Value::Null);
            write(target, arg)?;
            Ok(Value::Null)
        })
    }

    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor {
            name: self.name,
            methods: self.methods,
        })
    }
}

// ── Managed objects ─────────────────────────────────────────────────

/// Opaque handle to a thing being introspected. Not owned by the engine;
/// borrowed for the duration of a request.
pub trait ManagedObject: Send + Sync {
    /// The capability descriptor for this object's concrete type.
    fn descriptor(&self) -> Arc<TypeDescriptor>;

    /// The concrete object, for descriptor invoke closures to downcast.
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn primitive_tokens_round_trip() {
        for token in [
            "boolean", "byte", "char", "short", "int", "long", "float", "double", "string",
            "object",
        ] {
            let ty = TypeRef::from_token(token).unwrap();
            assert_eq!(ty.canonical_name(), token);
        }
    }

    #[test]
    fn list_tokens_nest() {
        let ty = TypeRef::from_token("int[]").unwrap();
        assert_eq!(ty, TypeRef::List(Box::new(TypeRef::Int)));
        assert_eq!(ty.canonical_name(), "int[]");
    }

    #[test]
    fn unknown_token_becomes_named() {
        let ty = TypeRef::from_token("scheduler.JobDetail").unwrap();
        assert_eq!(ty, TypeRef::Named("scheduler.JobDetail".into()));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert_eq!(TypeRef::from_token("   "), None);
    }

    struct Probe {
        answer: i32,
    }

    #[test]
    fn builder_captures_downcast() {
        let descriptor = TypeDescriptor::builder::<Probe>("test.Probe")
            .getter("getAnswer", TypeRef::Int, |p| Value::Int(p.answer))
            .build();
        let probe = Probe { answer: 42 };
        let method = &descriptor.methods()[0];
        let value = method.invoke(&probe, &[]).unwrap();
        assert_eq!(value, Value::Int(42));
    }

    #[test]
    fn registration_normalizes_named_primitive_tokens() {
        let descriptor = TypeDescriptor::builder::<Probe>("test.Probe")
            .method(
                "touch",
                vec![TypeRef::Named("int".into()), TypeRef::Named("custom.Key".into())],
                Some(TypeRef::Named("string".into())),
                |_, _| Ok(Value::Null),
            )
            .build();
        let method = &descriptor.methods()[0];
        assert_eq!(
            method.params(),
            &[TypeRef::Int, TypeRef::Named("custom.Key".into())]
        );
        assert_eq!(method.returns(), Some(&TypeRef::Text));
    }

    #[test]
    fn wrong_target_is_reported() {
        let descriptor = TypeDescriptor::builder::<Probe>("test.Probe")
            .getter("getAnswer", TypeRef::Int, |p| Value::Int(p.answer))
            .build();
        let not_a_probe = "something else";
        let fault = descriptor.methods()[0]
            .invoke(&not_a_probe, &[])
            .unwrap_err();
        assert!(matches!(fault, InvocationFault::WrongTarget { .. }));
    }

    #[test]
    fn arity_is_checked_before_dispatch() {
        let descriptor = TypeDescriptor::builder::<Probe>("test.Probe")
            .getter("getAnswer", TypeRef::Int, |p| Value::Int(p.answer))
            .build();
        let probe = Probe { answer: 1 };
        let fault = descriptor.methods()[0]
            .invoke(&probe, &[Value::Int(9)])
            .unwrap_err();
        assert!(matches!(
            fault,
            InvocationFault::ArityMismatch {
                expected: 0,
                got: 1
            }
        ));
    }
}
