//! Minimal HTML flattening of the render tree.
//!
//! This is the structural half only — tables, fields, and edit controls.
//! Page chrome belongs to the surface that embeds it. Writability is an
//! HTML-only concern: a writable scalar becomes a text input, and nothing
//! about it ever leaks into the JSON path.

use std::fmt::Write as _;

use crate::render::RenderNode;

/// Render a node, optionally as an editable control.
///
/// `writable` applies to a top-level scalar only; structured values are
/// always rendered read-only, matching the one-field-one-control model of
/// the management pages.
pub fn render(node: &RenderNode, writable: bool) -> String {
    let mut out = String::new();
    render_node(&mut out, node, writable);
    out
}

fn render_node(out: &mut String, node: &RenderNode, writable: bool) {
    match node {
        RenderNode::Null => out.push_str("null"),
        RenderNode::Scalar(text) => {
            if writable {
                // Infallible writer; ignore the fmt::Result plumbing.
                let _ = write!(out, r#"<input type="text" name="value" value="{}"/>"#, escape(text));
            } else {
                out.push_str(&escape(text));
            }
        }
        RenderNode::Array(items) => {
            out.push_str("<table>");
            for item in items {
                out.push_str("<tr><td>");
                render_node(out, item, false);
                out.push_str("</td></tr>");
            }
            out.push_str("</table>");
        }
        RenderNode::Record(fields) => {
            out.push_str("<table>");
            for (name, value) in fields {
                let _ = write!(out, "<tr><td>{}</td><td>", escape(name));
                render_node(out, value, false);
                out.push_str("</td></tr>");
            }
            out.push_str("</table>");
        }
        RenderNode::Table { columns, rows } => {
            out.push_str("<table><tr>");
            for column in columns {
                let _ = write!(out, "<th>{}</th>", escape(column));
            }
            out.push_str("</tr>");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str("<td>");
                    render_node(out, cell, false);
                    out.push_str("</td>");
                }
                out.push_str("</tr>");
            }
            out.push_str("</table>");
        }
        RenderNode::Unsupported { .. } => out.push_str("Not supported"),
    }
}

/// Escape text for embedding in an HTML fragment. Exposed so surfaces
/// that compose their own tables around rendered nodes escape the same
/// way the node renderer does.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
