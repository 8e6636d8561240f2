//! Invocation orchestration.
//!
//! Each entry point is a single-shot resolve → coerce → invoke → format
//! pipeline on the calling thread, gated by caller-supplied policy flags.
//! No state persists between calls beyond the process-wide ignore list
//! and codec registry, both read-only after startup.

use std::sync::Arc;

use crate::attribute::{AccessKind, Attribute, derive_attributes};
use crate::codec::TypeCodecRegistry;
use crate::descriptor::{ManagedObject, TypeRef};
use crate::error::{InvocationFault, ProbeError};
use crate::format::ValueFormatter;
use crate::ignore::IgnoreList;
use crate::render::RenderNode;
use crate::signature::{OperationSignature, derive_operations};
use crate::value::Value;

/// Raw input meaning "coerce to the absent value". Checked before any
/// codec decode — a codec could legitimately decode the text "null" to a
/// non-null value otherwise.
const NULL_SENTINEL: &str = "null";

// ── Request-side types ──────────────────────────────────────────────

/// Caller-supplied access gates and rendering bound.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub attribute_write_allowed: bool,
    pub operation_call_allowed: bool,
    /// Scalar cell truncation bound; zero means unbounded.
    pub max_length: usize,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            attribute_write_allowed: true,
            operation_call_allowed: true,
            max_length: 0,
        }
    }
}

/// One operation argument: raw text plus an optional per-argument type
/// override for wire formats that cannot otherwise disambiguate
/// overloaded encodings.
#[derive(Debug, Clone)]
pub struct ArgInput {
    pub text: String,
    pub type_override: Option<TypeRef>,
}

impl ArgInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            type_override: None,
        }
    }

    pub fn with_override(text: impl Into<String>, type_override: TypeRef) -> Self {
        Self {
            text: text.into(),
            type_override: Some(type_override),
        }
    }
}

// ── Response-side types ─────────────────────────────────────────────

/// A successfully read attribute. `writable` is an HTML-surface hint
/// only; the JSON flattening never sees it.
#[derive(Debug)]
pub struct AttributeReading {
    pub name: String,
    pub access: AccessKind,
    pub writable: bool,
    pub node: RenderNode,
}

/// One row of the attribute overview. `value` is `None` for write-only
/// attributes (no value to read — distinct from a read null) and `Err`
/// when the getter raised.
#[derive(Debug)]
pub struct AttributeRow {
    pub name: String,
    pub access: AccessKind,
    pub writable: bool,
    pub value: Option<Result<RenderNode, ProbeError>>,
}

/// Marker result for a successful attribute write, distinct from any
/// business value so "set succeeded" can never be confused with "set
/// returned this value".
#[derive(Debug, PartialEq, Eq)]
pub struct SetOutcome;

/// Result of an operation call: the raw return value plus its rendering.
#[derive(Debug)]
pub struct CallOutcome {
    pub value: Value,
    pub node: RenderNode,
}

// ── Gateway ─────────────────────────────────────────────────────────

/// Orchestrates get/set/call against resolved managed objects.
pub struct InvocationGateway {
    codecs: Arc<TypeCodecRegistry>,
    ignore: Arc<IgnoreList>,
}

impl InvocationGateway {
    pub fn new(codecs: Arc<TypeCodecRegistry>, ignore: Arc<IgnoreList>) -> Self {
        Self { codecs, ignore }
    }

    /// Read and render one attribute. Write-only attributes are not
    /// readable and report as absent.
    pub fn get_attribute(
        &self,
        object: &dyn ManagedObject,
        name: &str,
        policy: &AccessPolicy,
    ) -> Result<AttributeReading, ProbeError> {
        let descriptor = object.descriptor();
        let attributes = derive_attributes(&descriptor, &self.ignore);
        let attribute = attributes
            .get(name)
            .filter(|attribute| attribute.getter().is_some())
            .ok_or_else(|| ProbeError::AttributeNotFound {
                object: descriptor.name().to_owned(),
                name: name.to_owned(),
            })?;

        let node = self.read_attribute(object, attribute, policy.max_length)?;
        Ok(AttributeReading {
            name: attribute.name().to_owned(),
            access: attribute.access_kind(),
            writable: self.writable(attribute, policy),
            node,
        })
    }

    /// Decode text and write one attribute. Gated by
    /// `attribute_write_allowed` before any member is resolved.
    pub fn set_attribute(
        &self,
        object: &dyn ManagedObject,
        name: &str,
        text: &str,
        policy: &AccessPolicy,
    ) -> Result<SetOutcome, ProbeError> {
        if !policy.attribute_write_allowed {
            return Err(ProbeError::AccessDenied {
                action: "attribute write".into(),
            });
        }

        let descriptor = object.descriptor();
        let attributes = derive_attributes(&descriptor, &self.ignore);
        let attribute = attributes
            .get(name)
            .filter(|attribute| attribute.setter().is_some())
            .ok_or_else(|| ProbeError::AttributeNotFound {
                object: descriptor.name().to_owned(),
                name: name.to_owned(),
            })?;
        // Lookup is gated on setter presence, so this cannot fail.
        let setter = attribute.setter().ok_or_else(|| ProbeError::AttributeNotFound {
            object: descriptor.name().to_owned(),
            name: name.to_owned(),
        })?;

        let value = self.coerce(text, attribute.value_type())?;
        tracing::debug!(object = descriptor.name(), attribute = name, "writing attribute");
        setter
            .invoke(object.as_any(), &[value])
            .map_err(|fault| map_fault(fault, setter.name()))?;
        Ok(SetOutcome)
    }

    /// Resolve a canonical signature and call it with coerced arguments.
    /// Gated by `operation_call_allowed`; ignore-listed members resolve
    /// as absent.
    pub fn call_operation(
        &self,
        object: &dyn ManagedObject,
        signature_text: &str,
        args: &[ArgInput],
        policy: &AccessPolicy,
    ) -> Result<CallOutcome, ProbeError> {
        if !policy.operation_call_allowed {
            return Err(ProbeError::AccessDenied {
                action: "operation call".into(),
            });
        }

        let signature = OperationSignature::parse(signature_text)?;
        let descriptor = object.descriptor();
        let method = signature.resolve(&descriptor, &self.ignore)?;

        if args.len() != method.params().len() {
            return Err(ProbeError::ArityMismatch {
                signature: signature.to_string(),
                expected: method.params().len(),
                got: args.len(),
            });
        }

        let coerced = args
            .iter()
            .zip(method.params())
            .map(|(arg, declared)| self.coerce_argument(arg, declared))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(object = descriptor.name(), operation = %signature, "calling operation");
        let value = method
            .invoke(object.as_any(), &coerced)
            .map_err(|fault| map_fault(fault, &signature.to_string()))?;

        let declared_return = method.returns().cloned().unwrap_or(TypeRef::Object);
        let node =
            ValueFormatter::new(&self.codecs).format(&value, &declared_return, policy.max_length);
        Ok(CallOutcome { value, node })
    }

    /// Overview of every derived attribute, with values read where a
    /// getter exists.
    pub fn attributes(
        &self,
        object: &dyn ManagedObject,
        policy: &AccessPolicy,
    ) -> Vec<AttributeRow> {
        let descriptor = object.descriptor();
        derive_attributes(&descriptor, &self.ignore)
            .values()
            .map(|attribute| AttributeRow {
                name: attribute.name().to_owned(),
                access: attribute.access_kind(),
                writable: self.writable(attribute, policy),
                value: attribute.getter().is_some().then(|| {
                    self.read_attribute(object, attribute, policy.max_length)
                }),
            })
            .collect()
    }

    /// Overview of every callable operation, in display order.
    pub fn operations(&self, object: &dyn ManagedObject) -> Vec<OperationSignature> {
        derive_operations(&object.descriptor(), &self.ignore)
    }

    // ── Pipeline pieces ─────────────────────────────────────────────

    fn read_attribute(
        &self,
        object: &dyn ManagedObject,
        attribute: &Attribute,
        max_length: usize,
    ) -> Result<RenderNode, ProbeError> {
        let getter = attribute
            .getter()
            .ok_or_else(|| ProbeError::AttributeNotFound {
                object: object.descriptor().name().to_owned(),
                name: attribute.name().to_owned(),
            })?;
        let value = getter
            .invoke(object.as_any(), &[])
            .map_err(|fault| map_fault(fault, getter.name()))?;
        Ok(ValueFormatter::new(&self.codecs).format(
            &value,
            attribute.value_type(),
            max_length,
        ))
    }

    fn writable(&self, attribute: &Attribute, policy: &AccessPolicy) -> bool {
        policy.attribute_write_allowed && attribute.setter().is_some()
    }

    fn coerce(&self, text: &str, target: &TypeRef) -> Result<Value, ProbeError> {
        if text == NULL_SENTINEL {
            return Ok(Value::Null);
        }
        self.codecs.decode(target, text)
    }

    /// Per-argument coercion with optional type override. An override
    /// that has no codec or fails to decode falls back silently to the
    /// declared parameter type.
    fn coerce_argument(&self, arg: &ArgInput, declared: &TypeRef) -> Result<Value, ProbeError> {
        if arg.text == NULL_SENTINEL {
            return Ok(Value::Null);
        }
        if let Some(override_type) = &arg.type_override {
            if let Some(codec) = self.codecs.find(override_type) {
                if let Ok(value) = codec.decode(&arg.text) {
                    return Ok(value);
                }
            }
        }
        self.coerce(&arg.text, declared)
    }
}

/// Map a closure fault to the engine taxonomy. Provider interruptions
/// stay distinct; everything else wraps as an invocation failure with
/// its cause preserved.
fn map_fault(fault: InvocationFault, member: &str) -> ProbeError {
    match fault {
        InvocationFault::Timeout => ProbeError::Timeout,
        InvocationFault::Cancelled => ProbeError::Cancelled,
        other => ProbeError::Invocation {
            member: member.to_owned(),
            cause: Box::new(other),
        },
    }
}
