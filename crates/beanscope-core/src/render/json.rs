//! JSON flattening of the render tree.
//!
//! Conventional mapping: `Null → null`, `Scalar → string`, `Array →
//! array`, `Record → object` (field order preserved), `Table → array of
//! objects` (field order preserved per row), `Unsupported → null` plus a
//! side-channel diagnostic. Writability never reaches this path.

use serde_json::{Map, Value as Json};

use crate::error::{ProbeError, cause_chain};
use crate::render::RenderNode;

/// Flatten one node to its JSON value.
pub fn to_json(node: &RenderNode) -> Json {
    match node {
        RenderNode::Null | RenderNode::Unsupported { .. } => Json::Null,
        RenderNode::Scalar(text) => Json::String(text.clone()),
        RenderNode::Array(items) => Json::Array(items.iter().map(to_json).collect()),
        RenderNode::Record(fields) => {
            let mut object = Map::new();
            for (name, value) in fields {
                object.insert(name.clone(), to_json(value));
            }
            Json::Object(object)
        }
        RenderNode::Table { columns, rows } => Json::Array(
            rows.iter()
                .map(|row| {
                    let mut object = Map::new();
                    for (column, cell) in columns.iter().zip(row) {
                        object.insert(column.clone(), to_json(cell));
                    }
                    Json::Object(object)
                })
                .collect(),
        ),
    }
}

/// Full response envelope for the JSON surface.
///
/// Success carries `"value"` plus `"diagnostics"` when any unsupported
/// shape was reached; failure carries `"exception"` with the rendered
/// cause chain alongside whatever partial value exists.
pub fn response(node: Option<&RenderNode>, error: Option<&ProbeError>) -> Json {
    let mut envelope = Map::new();
    if let Some(node) = node {
        envelope.insert("value".to_owned(), to_json(node));
        let unsupported = node.unsupported_types();
        if !unsupported.is_empty() {
            envelope.insert(
                "diagnostics".to_owned(),
                Json::Array(
                    unsupported
                        .into_iter()
                        .map(|type_name| {
                            Json::String(format!("value of type {type_name} is not supported"))
                        })
                        .collect(),
                ),
            );
        }
    }
    if let Some(error) = error {
        envelope.insert("exception".to_owned(), Json::String(cause_chain(error)));
    }
    Json::Object(envelope)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn record_field_order_is_preserved() {
        let node = RenderNode::Record(IndexMap::from([
            ("zeta".to_owned(), RenderNode::Scalar("1".into())),
            ("alpha".to_owned(), RenderNode::Scalar("2".into())),
        ]));
        let rendered = serde_json::to_string(&to_json(&node)).unwrap();
        // zeta declared first stays first, despite sorting alphabetically
        // after alpha.
        assert_eq!(rendered, r#"{"zeta":"1","alpha":"2"}"#);
    }

    #[test]
    fn table_maps_to_array_of_objects() {
        let node = RenderNode::Table {
            columns: vec!["name".into(), "priority".into()],
            rows: vec![
                vec![RenderNode::Scalar("index".into()), RenderNode::Scalar("5".into())],
                vec![RenderNode::Scalar("purge".into()), RenderNode::Null],
            ],
        };
        assert_eq!(
            to_json(&node),
            json!([
                {"name": "index", "priority": "5"},
                {"name": "purge", "priority": null},
            ])
        );
    }

    #[test]
    fn unsupported_renders_null_with_diagnostic() {
        let node = RenderNode::Unsupported {
            type_name: "net.Socket".into(),
        };
        assert_eq!(to_json(&node), Json::Null);
        let envelope = response(Some(&node), None);
        assert_eq!(
            envelope,
            json!({
                "value": null,
                "diagnostics": ["value of type net.Socket is not supported"],
            })
        );
    }

    #[test]
    fn errors_render_the_cause_chain() {
        let error = ProbeError::Invocation {
            member: "restart()".into(),
            cause: Box::new(std::io::Error::other("socket closed")),
        };
        let envelope = response(None, Some(&error));
        assert_eq!(
            envelope,
            json!({"exception": "Invocation of restart() failed: socket closed"})
        );
    }

    #[test]
    fn null_and_unsupported_stay_distinguishable_upstream() {
        // Both flatten to JSON null, but only one produces a diagnostic.
        let null_envelope = response(Some(&RenderNode::Null), None);
        assert_eq!(null_envelope, json!({"value": null}));
    }
}
