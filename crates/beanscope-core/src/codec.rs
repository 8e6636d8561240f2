//! Reversible string⇄value codecs.
//!
//! One codec per concrete type, looked up exactly — no implicit widening.
//! The single sanctioned fallback is the raw-text pass-through for the
//! generic `object` type, and callers must opt into it through
//! [`TypeCodecRegistry::find_or_object_fallback`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::TypeRef;
use crate::error::ProbeError;
use crate::value::Value;

/// A reversible string⇄value converter for one concrete type.
pub trait TypeCodec: Send + Sync {
    /// Render a value of this codec's type to its wire text.
    ///
    /// Returns `None` when handed a value of the wrong shape, so the
    /// registry can keep searching structural renderings instead of
    /// producing garbage.
    fn encode(&self, value: &Value) -> Option<String>;

    /// Parse wire text into a value of this codec's type. The error is a
    /// human-readable reason; the registry wraps it with the offending
    /// text and target type.
    fn decode(&self, text: &str) -> Result<Value, String>;
}

// ── Built-in codecs ─────────────────────────────────────────────────

macro_rules! scalar_codec {
    ($codec:ident, $variant:ident, $ty:ty) => {
        struct $codec;

        impl TypeCodec for $codec {
            fn encode(&self, value: &Value) -> Option<String> {
                match value {
                    Value::$variant(v) => Some(v.to_string()),
                    _ => None,
                }
            }

            fn decode(&self, text: &str) -> Result<Value, String> {
                text.trim()
                    .parse::<$ty>()
                    .map(Value::$variant)
                    .map_err(|err| err.to_string())
            }
        }
    };
}

scalar_codec!(BoolCodec, Bool, bool);
scalar_codec!(ByteCodec, Byte, i8);
scalar_codec!(ShortCodec, Short, i16);
scalar_codec!(IntCodec, Int, i32);
scalar_codec!(LongCodec, Long, i64);
scalar_codec!(FloatCodec, Float, f32);
scalar_codec!(DoubleCodec, Double, f64);

struct CharCodec;

impl TypeCodec for CharCodec {
    fn encode(&self, value: &Value) -> Option<String> {
        match value {
            Value::Char(c) => Some(c.to_string()),
            _ => None,
        }
    }

    fn decode(&self, text: &str) -> Result<Value, String> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Value::Char(c)),
            _ => Err("expected exactly one character".into()),
        }
    }
}

struct TextCodec;

impl TypeCodec for TextCodec {
    fn encode(&self, value: &Value) -> Option<String> {
        match value {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn decode(&self, text: &str) -> Result<Value, String> {
        Ok(Value::Text(text.to_owned()))
    }
}

/// Raw pass-through used only for `object`-typed parameters, where the
/// wire format carries no better information than the text itself.
struct RawTextCodec;

impl TypeCodec for RawTextCodec {
    fn encode(&self, value: &Value) -> Option<String> {
        match value {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn decode(&self, text: &str) -> Result<Value, String> {
        Ok(Value::Text(text.to_owned()))
    }
}

// ── Registry ────────────────────────────────────────────────────────

/// Type-keyed codec registry. Built once at the composition root and
/// passed explicitly into every component that coerces — there is no
/// process-wide editor singleton here.
pub struct TypeCodecRegistry {
    codecs: HashMap<TypeRef, Arc<dyn TypeCodec>>,
    object_fallback: Arc<dyn TypeCodec>,
}

impl TypeCodecRegistry {
    /// Registry pre-loaded with the primitive and text codecs.
    pub fn new() -> Self {
        let mut codecs: HashMap<TypeRef, Arc<dyn TypeCodec>> = HashMap::new();
        codecs.insert(TypeRef::Bool, Arc::new(BoolCodec));
        codecs.insert(TypeRef::Byte, Arc::new(ByteCodec));
        codecs.insert(TypeRef::Char, Arc::new(CharCodec));
        codecs.insert(TypeRef::Short, Arc::new(ShortCodec));
        codecs.insert(TypeRef::Int, Arc::new(IntCodec));
        codecs.insert(TypeRef::Long, Arc::new(LongCodec));
        codecs.insert(TypeRef::Float, Arc::new(FloatCodec));
        codecs.insert(TypeRef::Double, Arc::new(DoubleCodec));
        codecs.insert(TypeRef::Text, Arc::new(TextCodec));
        Self {
            codecs,
            object_fallback: Arc::new(RawTextCodec),
        }
    }

    /// Register (or replace) the codec for an exact type. Exact
    /// registrations always win over the built-ins.
    pub fn register(&mut self, type_ref: TypeRef, codec: Arc<dyn TypeCodec>) {
        self.codecs.insert(type_ref, codec);
    }

    /// Exact-type lookup.
    pub fn find(&self, type_ref: &TypeRef) -> Option<&Arc<dyn TypeCodec>> {
        self.codecs.get(type_ref)
    }

    /// Exact-type lookup, falling back to the raw-text pass-through for
    /// the generic `object` type only.
    pub fn find_or_object_fallback(&self, type_ref: &TypeRef) -> Option<&Arc<dyn TypeCodec>> {
        self.find(type_ref).or_else(|| {
            matches!(type_ref, TypeRef::Object).then_some(&self.object_fallback)
        })
    }

    /// Decode text against the codec for `type_ref`, wrapping failures
    /// into the engine's coercion error.
    ///
    /// The `"null"` input sentinel is a gateway concern and is checked
    /// before this is ever called.
    pub fn decode(&self, type_ref: &TypeRef, text: &str) -> Result<Value, ProbeError> {
        let codec = self
            .find_or_object_fallback(type_ref)
            .ok_or_else(|| ProbeError::Coercion {
                text: text.to_owned(),
                target: type_ref.canonical_name(),
                reason: "no codec registered".into(),
            })?;
        codec.decode(text).map_err(|reason| ProbeError::Coercion {
            text: text.to_owned(),
            target: type_ref.canonical_name(),
            reason,
        })
    }

    /// Encode a value through the codec registered for its runtime type.
    pub fn encode(&self, value: &Value) -> Option<String> {
        let type_ref = value.runtime_type()?;
        self.find(&type_ref)?.encode(value)
    }
}

impl Default for TypeCodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
