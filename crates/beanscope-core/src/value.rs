//! Runtime value model.
//!
//! Values flow through the engine fully tagged: formatting and codec
//! lookup dispatch on the runtime shape here, never on a declared type.
//! Opaque Rust values travel as [`ObjectValue`] and are only renderable
//! through a registered codec.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::descriptor::TypeRef;

// ── Record schemas ──────────────────────────────────────────────────

/// Schema of a structured record: a name plus ordered, typed fields.
///
/// Field order here is the declared order, and it is the order every
/// downstream rendering preserves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    name: String,
    fields: Vec<(String, TypeRef)>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>, fields: Vec<(String, TypeRef)>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, TypeRef)] {
        &self.fields
    }
}

/// A record's values did not line up with its schema.
#[derive(Debug, Error)]
#[error("record '{schema}' expects {expected} field(s), got {got}")]
pub struct RecordShapeError {
    pub schema: String,
    pub expected: usize,
    pub got: usize,
}

/// A structured value: schema plus one value per schema field, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    schema: Arc<RecordSchema>,
    values: Vec<Value>,
}

impl RecordValue {
    /// Build a record, verifying arity against the schema.
    pub fn new(schema: Arc<RecordSchema>, values: Vec<Value>) -> Result<Self, RecordShapeError> {
        if values.len() != schema.fields().len() {
            return Err(RecordShapeError {
                schema: schema.name().to_owned(),
                expected: schema.fields().len(),
                got: values.len(),
            });
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Fields zipped with their declared names and types, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypeRef, &Value)> {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .map(|((name, ty), value)| (name.as_str(), ty, value))
    }
}

// ── Opaque objects ──────────────────────────────────────────────────

/// An opaque boxed value with a known type reference.
///
/// The engine cannot look inside; a codec registered for `type_ref` may
/// downcast and encode it. Without one the value renders as unsupported.
#[derive(Clone)]
pub struct ObjectValue {
    type_ref: TypeRef,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectValue {
    pub fn new<T: Any + Send + Sync>(type_ref: TypeRef, inner: T) -> Self {
        Self {
            type_ref,
            inner: Arc::new(inner),
        }
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectValue({})", self.type_ref)
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_ref == other.type_ref && Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// ── Value ───────────────────────────────────────────────────────────

/// Tagged runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
    List(Vec<Value>),
    Record(RecordValue),
    Object(ObjectValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The runtime type of this value, when it has a single one.
    ///
    /// Lists and records are structural; they dispatch on shape rather
    /// than a type reference and so return `None` here.
    pub fn runtime_type(&self) -> Option<TypeRef> {
        match self {
            Self::Null | Self::List(_) | Self::Record(_) => None,
            Self::Bool(_) => Some(TypeRef::Bool),
            Self::Byte(_) => Some(TypeRef::Byte),
            Self::Char(_) => Some(TypeRef::Char),
            Self::Short(_) => Some(TypeRef::Short),
            Self::Int(_) => Some(TypeRef::Int),
            Self::Long(_) => Some(TypeRef::Long),
            Self::Float(_) => Some(TypeRef::Float),
            Self::Double(_) => Some(TypeRef::Double),
            Self::Text(_) => Some(TypeRef::Text),
            Self::Object(obj) => Some(obj.type_ref().clone()),
        }
    }

    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::List(_) => "list".into(),
            Self::Record(record) => record.schema().name().to_owned(),
            other => other
                .runtime_type()
                .map_or_else(|| "unknown".into(), |ty| ty.canonical_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn record_arity_is_checked() {
        let schema = RecordSchema::new(
            "jobs.JobRecord",
            vec![
                ("name".into(), TypeRef::Text),
                ("priority".into(), TypeRef::Int),
            ],
        );
        let err = RecordValue::new(schema, vec![Value::Text("index".into())]).unwrap_err();
        assert_eq!(err.expected, 2);
        assert_eq!(err.got, 1);
    }

    #[test]
    fn record_fields_follow_schema_order() {
        let schema = RecordSchema::new(
            "jobs.JobRecord",
            vec![
                ("name".into(), TypeRef::Text),
                ("priority".into(), TypeRef::Int),
            ],
        );
        let record = RecordValue::new(
            schema,
            vec![Value::Text("index".into()), Value::Int(5)],
        )
        .unwrap();
        let names: Vec<&str> = record.fields().map(|(name, _, _)| name).collect();
        assert_eq!(names, vec!["name", "priority"]);
    }

    #[test]
    fn object_values_carry_their_type() {
        let obj = Value::Object(ObjectValue::new(
            TypeRef::Named("time.Interval".into()),
            std::time::Duration::from_secs(3),
        ));
        assert_eq!(obj.type_name(), "time.Interval");
        assert_eq!(obj.runtime_type(), Some(TypeRef::Named("time.Interval".into())));
    }

    #[test]
    fn scalar_runtime_types() {
        assert_eq!(Value::from(true).runtime_type(), Some(TypeRef::Bool));
        assert_eq!(Value::from(7i32).runtime_type(), Some(TypeRef::Int));
        assert_eq!(Value::from("x").runtime_type(), Some(TypeRef::Text));
        assert_eq!(Value::Null.runtime_type(), None);
    }
}
