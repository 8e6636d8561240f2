//! Recursive value formatting.
//!
//! Turns any runtime [`Value`] into a [`RenderNode`] tree, dispatching on
//! the value's runtime shape — a heterogeneous list renders each element
//! by what it actually is, not by the declared component type. Scalar
//! text is truncated by character, never mid-codepoint.

use indexmap::IndexMap;

use crate::codec::TypeCodecRegistry;
use crate::descriptor::TypeRef;
use crate::render::RenderNode;
use crate::value::{RecordValue, Value};

/// Stateless formatter borrowing the codec registry for scalar encoding.
pub struct ValueFormatter<'a> {
    codecs: &'a TypeCodecRegistry,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(codecs: &'a TypeCodecRegistry) -> Self {
        Self { codecs }
    }

    /// Format a value against its declared type.
    ///
    /// `max_length` truncates scalar cell text when positive; zero means
    /// unbounded. The declared type only steers list-element declared
    /// types downward — dispatch itself is by runtime shape.
    pub fn format(&self, value: &Value, declared: &TypeRef, max_length: usize) -> RenderNode {
        match value {
            Value::Null => RenderNode::Null,
            Value::List(items) => self.format_list(items, declared, max_length),
            Value::Record(record) => RenderNode::Record(self.format_fields(record, max_length)),
            scalar => match self.codecs.encode(scalar) {
                Some(text) => RenderNode::Scalar(truncate(text, max_length)),
                None => RenderNode::Unsupported {
                    type_name: scalar.type_name(),
                },
            },
        }
    }

    fn format_list(&self, items: &[Value], declared: &TypeRef, max_length: usize) -> RenderNode {
        if let Some(table) = self.try_table(items, max_length) {
            return table;
        }

        let element_type = match declared {
            TypeRef::List(elem) => elem.as_ref().clone(),
            _ => TypeRef::Object,
        };
        RenderNode::Array(
            items
                .iter()
                .map(|item| self.format(item, &element_type, max_length))
                .collect(),
        )
    }

    /// A non-empty list of records sharing one schema renders as a table
    /// with the schema's column order. Anything else falls back to the
    /// array shape.
    fn try_table(&self, items: &[Value], max_length: usize) -> Option<RenderNode> {
        let records: Vec<&RecordValue> = items
            .iter()
            .map(|item| match item {
                Value::Record(record) => Some(record),
                _ => None,
            })
            .collect::<Option<_>>()?;
        let (first, rest) = records.split_first()?;
        if rest.iter().any(|r| r.schema() != first.schema()) {
            return None;
        }

        let columns = first
            .schema()
            .fields()
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        let rows = records
            .iter()
            .map(|record| {
                record
                    .fields()
                    .map(|(_, field_type, field_value)| {
                        self.format(field_value, field_type, max_length)
                    })
                    .collect()
            })
            .collect();
        Some(RenderNode::Table { columns, rows })
    }

    fn format_fields(
        &self,
        record: &RecordValue,
        max_length: usize,
    ) -> IndexMap<String, RenderNode> {
        record
            .fields()
            .map(|(name, field_type, field_value)| {
                (
                    name.to_owned(),
                    self.format(field_value, field_type, max_length),
                )
            })
            .collect()
    }
}

fn truncate(text: String, max_length: usize) -> String {
    if max_length == 0 || text.chars().count() <= max_length {
        return text;
    }
    text.chars().take(max_length).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::value::{ObjectValue, RecordSchema};

    fn job_schema() -> Arc<RecordSchema> {
        RecordSchema::new(
            "jobs.JobRecord",
            vec![
                ("name".into(), TypeRef::Text),
                ("priority".into(), TypeRef::Int),
            ],
        )
    }

    fn job(name: &str, priority: i32) -> Value {
        Value::Record(
            RecordValue::new(job_schema(), vec![Value::from(name), Value::Int(priority)])
                .unwrap(),
        )
    }

    #[test]
    fn null_formats_as_null_for_every_declared_type() {
        let codecs = TypeCodecRegistry::new();
        let formatter = ValueFormatter::new(&codecs);
        for declared in [
            TypeRef::Int,
            TypeRef::Text,
            TypeRef::Object,
            TypeRef::Named("scheduler.Trigger".into()),
        ] {
            assert_eq!(formatter.format(&Value::Null, &declared, 0), RenderNode::Null);
        }
    }

    #[test]
    fn scalars_encode_through_the_registry() {
        let codecs = TypeCodecRegistry::new();
        let formatter = ValueFormatter::new(&codecs);
        assert_eq!(
            formatter.format(&Value::Int(42), &TypeRef::Int, 0),
            RenderNode::Scalar("42".into())
        );
        assert_eq!(
            formatter.format(&Value::Bool(true), &TypeRef::Bool, 0),
            RenderNode::Scalar("true".into())
        );
    }

    #[test]
    fn truncation_is_by_character() {
        let codecs = TypeCodecRegistry::new();
        let formatter = ValueFormatter::new(&codecs);
        let value = Value::Text("héllo wörld".into());
        let node = formatter.format(&value, &TypeRef::Text, 5);
        assert_eq!(node, RenderNode::Scalar("héllo".into()));
    }

    #[test]
    fn zero_max_length_means_unbounded() {
        let codecs = TypeCodecRegistry::new();
        let formatter = ValueFormatter::new(&codecs);
        let value = Value::Text("a long enough text".into());
        assert_eq!(
            formatter.format(&value, &TypeRef::Text, 0),
            RenderNode::Scalar("a long enough text".into())
        );
    }

    #[test]
    fn homogeneous_records_become_a_table_with_truncated_cells() {
        let codecs = TypeCodecRegistry::new();
        let formatter = ValueFormatter::new(&codecs);
        let list = Value::List(vec![
            job("reindex-all", 1),
            job("purge-expired", 2),
            job("compact-store", 3),
        ]);
        let node = formatter.format(
            &list,
            &TypeRef::List(Box::new(TypeRef::Named("jobs.JobRecord".into()))),
            5,
        );
        let RenderNode::Table { columns, rows } = node else {
            panic!("expected table, got {node:?}");
        };
        assert_eq!(columns, vec!["name", "priority"]);
        assert_eq!(rows.len(), 3);
        for row in &rows {
            for cell in row {
                let RenderNode::Scalar(text) = cell else {
                    panic!("expected scalar cell, got {cell:?}");
                };
                assert!(text.chars().count() <= 5, "cell too long: {text}");
            }
        }
    }

    #[test]
    fn mixed_lists_render_each_element_by_runtime_shape() {
        let codecs = TypeCodecRegistry::new();
        let formatter = ValueFormatter::new(&codecs);
        let list = Value::List(vec![
            Value::Int(1),
            Value::Text("two".into()),
            job("three", 3),
        ]);
        // Declared object[] — runtime shapes still win per element.
        let node = formatter.format(&list, &TypeRef::List(Box::new(TypeRef::Object)), 0);
        let RenderNode::Array(items) = node else {
            panic!("expected array, got {node:?}");
        };
        assert_eq!(items[0], RenderNode::Scalar("1".into()));
        assert_eq!(items[1], RenderNode::Scalar("two".into()));
        assert!(matches!(items[2], RenderNode::Record(_)));
    }

    #[test]
    fn record_fields_keep_schema_order() {
        let codecs = TypeCodecRegistry::new();
        let formatter = ValueFormatter::new(&codecs);
        let node = formatter.format(&job("reindex", 7), &TypeRef::Named("jobs.JobRecord".into()), 0);
        let RenderNode::Record(fields) = node else {
            panic!("expected record, got {node:?}");
        };
        let names: Vec<&String> = fields.keys().collect();
        assert_eq!(names, vec!["name", "priority"]);
    }

    #[test]
    fn empty_list_is_an_empty_array_not_a_table() {
        let codecs = TypeCodecRegistry::new();
        let formatter = ValueFormatter::new(&codecs);
        let node = formatter.format(&Value::List(Vec::new()), &TypeRef::Object, 0);
        assert_eq!(node, RenderNode::Array(Vec::new()));
    }

    #[test]
    fn codecless_opaque_value_is_unsupported() {
        let codecs = TypeCodecRegistry::new();
        let formatter = ValueFormatter::new(&codecs);
        let value = Value::Object(ObjectValue::new(
            TypeRef::Named("net.Socket".into()),
            (),
        ));
        assert_eq!(
            formatter.format(&value, &TypeRef::Object, 0),
            RenderNode::Unsupported {
                type_name: "net.Socket".into()
            }
        );
    }
}
