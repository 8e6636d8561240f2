//! The shape-preserving intermediate representation.
//!
//! Every formatted value becomes a `RenderNode` tree first; the HTML and
//! JSON surfaces both flatten this one structure, so they cannot drift.
//! The tags stay distinct all the way down — `Null`, an unsupported
//! shape, and an absent value are never collapsed into the same
//! placeholder string.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Structural output of the value formatter.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Null,
    Scalar(String),
    Array(Vec<RenderNode>),
    /// Named fields in declared schema order.
    Record(IndexMap<String, RenderNode>),
    /// Homogeneous record rows sharing one column schema. Each row holds
    /// one cell per column, in column order.
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<RenderNode>>,
    },
    /// A value with no codec and no structural shape. The JSON surface
    /// renders this as `null` plus a diagnostic; the HTML surface prints
    /// literal "Not supported" text.
    Unsupported { type_name: String },
}

impl RenderNode {
    /// Collect the type names of every unsupported-shape leaf, in
    /// traversal order. This is the JSON surface's diagnostic side
    /// channel.
    pub fn unsupported_types(&self) -> Vec<String> {
        let mut found = Vec::new();
        self.collect_unsupported(&mut found);
        found
    }

    fn collect_unsupported(&self, found: &mut Vec<String>) {
        match self {
            Self::Null | Self::Scalar(_) => {}
            Self::Array(items) => {
                for item in items {
                    item.collect_unsupported(found);
                }
            }
            Self::Record(fields) => {
                for node in fields.values() {
                    node.collect_unsupported(found);
                }
            }
            Self::Table { rows, .. } => {
                for row in rows {
                    for cell in row {
                        cell.collect_unsupported(found);
                    }
                }
            }
            Self::Unsupported { type_name } => found.push(type_name.clone()),
        }
    }
}

/// Serializes through the JSON mapping, so `serde_json::to_string(&node)`
/// and [`crate::render::json::to_json`] can never disagree.
impl Serialize for RenderNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::render::json::to_json(self).serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_types_are_collected_depth_first() {
        let node = RenderNode::Record(IndexMap::from([
            (
                "first".to_owned(),
                RenderNode::Unsupported {
                    type_name: "a.Alpha".into(),
                },
            ),
            (
                "rest".to_owned(),
                RenderNode::Array(vec![RenderNode::Unsupported {
                    type_name: "b.Beta".into(),
                }]),
            ),
        ]));
        assert_eq!(node.unsupported_types(), vec!["a.Alpha", "b.Beta"]);
    }

    #[test]
    fn supported_trees_report_nothing() {
        let node = RenderNode::Array(vec![RenderNode::Null, RenderNode::Scalar("1".into())]);
        assert!(node.unsupported_types().is_empty());
    }
}
