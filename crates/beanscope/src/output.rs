//! Output formatting: tree, JSON, HTML.
//!
//! Renders engine results in the format selected by `--output`. Tree uses
//! `tabled` for tabular nodes, JSON emits the engine's response envelope,
//! HTML emits the fragment the management pages embed.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};

use beanscope_core::render::{RenderNode, html, json};
use beanscope_core::{AccessKind, AttributeRow, ProbeError, cause_chain};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one value node in the chosen format.
///
/// `writable` only affects the HTML surface, where a writable scalar
/// becomes an edit control.
pub fn render_node(format: OutputFormat, node: &RenderNode, writable: bool) -> String {
    match format {
        OutputFormat::Tree => render_tree(node),
        OutputFormat::Json => pretty_json(&json::response(Some(node), None)),
        OutputFormat::Html => html::render(node, writable),
    }
}

/// Render the attribute overview.
pub fn render_attr_rows(format: OutputFormat, rows: &[AttributeRow], color: bool) -> String {
    match format {
        OutputFormat::Tree => {
            let mut builder = Builder::default();
            builder.push_record(["NAME", "ACCESS", "VALUE"]);
            for row in rows {
                builder.push_record([
                    row.name.clone(),
                    access_cell(row.access, color),
                    value_cell(row.value.as_ref()),
                ]);
            }
            builder.build().with(Style::rounded()).to_string()
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = rows
                .iter()
                .map(|row| {
                    let value = match &row.value {
                        Some(Ok(node)) => json::to_json(node),
                        // A raising getter or a write-only attribute has
                        // no value in the overview.
                        Some(Err(_)) | None => serde_json::Value::Null,
                    };
                    serde_json::json!({
                        "name": row.name,
                        "access": row.access.to_string(),
                        "value": value,
                    })
                })
                .collect();
            pretty_json(&serde_json::Value::Array(entries))
        }
        OutputFormat::Html => {
            let mut out = String::from("<table><tr><th>Name</th><th>Access</th><th>Value</th></tr>");
            for row in rows {
                out.push_str("<tr><td>");
                out.push_str(&html::escape(&row.name));
                out.push_str("</td><td>");
                out.push_str(&html::escape(&row.access.to_string()));
                out.push_str("</td><td>");
                match &row.value {
                    Some(Ok(node)) => out.push_str(&html::render(node, row.writable)),
                    Some(Err(err)) => out.push_str(&html::escape(&cause_chain(err))),
                    None => {}
                }
                out.push_str("</td></tr>");
            }
            out.push_str("</table>");
            out
        }
    }
}

/// Render the operation overview, one canonical signature per entry.
pub fn render_operations(format: OutputFormat, signatures: &[String]) -> String {
    match format {
        OutputFormat::Tree => signatures.join("\n"),
        OutputFormat::Json => pretty_json(&serde_json::json!(signatures)),
        OutputFormat::Html => {
            let mut out = String::from("<table>");
            for signature in signatures {
                out.push_str("<tr><td>");
                out.push_str(&html::escape(signature));
                out.push_str("</td></tr>");
            }
            out.push_str("</table>");
            out
        }
    }
}

/// Render plain name listings (the `objects` overview).
pub fn render_names(format: OutputFormat, names: &[String]) -> String {
    render_operations(format, names)
}

// ── Tree renderer ────────────────────────────────────────────────────

fn render_tree(node: &RenderNode) -> String {
    match node {
        RenderNode::Null => "null".into(),
        RenderNode::Scalar(text) => text.clone(),
        RenderNode::Unsupported { type_name } => format!("Not supported ({type_name})"),
        RenderNode::Array(items) => {
            if items.is_empty() {
                return "(empty)".into();
            }
            let mut builder = Builder::default();
            for item in items {
                builder.push_record([render_tree(item)]);
            }
            builder.build().with(Style::rounded()).to_string()
        }
        RenderNode::Record(fields) => {
            let mut builder = Builder::default();
            for (name, value) in fields {
                builder.push_record([name.clone(), render_tree(value)]);
            }
            builder.build().with(Style::rounded()).to_string()
        }
        RenderNode::Table { columns, rows } => {
            let mut builder = Builder::default();
            builder.push_record(columns.iter().map(String::as_str));
            for row in rows {
                builder.push_record(row.iter().map(render_tree));
            }
            builder.build().with(Style::rounded()).to_string()
        }
    }
}

fn access_cell(access: AccessKind, color: bool) -> String {
    if !color {
        return access.to_string();
    }
    match access {
        AccessKind::ReadWrite => access.green().to_string(),
        AccessKind::ReadOnly => access.cyan().to_string(),
        AccessKind::WriteOnly => access.yellow().to_string(),
    }
}

fn value_cell(value: Option<&Result<RenderNode, ProbeError>>) -> String {
    match value {
        Some(Ok(node)) => render_tree(node),
        Some(Err(err)) => format!("! {}", cause_chain(err)),
        None => String::new(),
    }
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    #[test]
    fn tree_renders_scalars_bare() {
        assert_eq!(render_node(OutputFormat::Tree, &RenderNode::Scalar("42".into()), false), "42");
        assert_eq!(render_node(OutputFormat::Tree, &RenderNode::Null, false), "null");
    }

    #[test]
    fn tree_renders_tables_with_headers() {
        let node = RenderNode::Table {
            columns: vec!["name".into(), "priority".into()],
            rows: vec![vec![
                RenderNode::Scalar("reindex".into()),
                RenderNode::Scalar("5".into()),
            ]],
        };
        let rendered = render_node(OutputFormat::Tree, &node, false);
        assert!(rendered.contains("name"));
        assert!(rendered.contains("reindex"));
    }

    #[test]
    fn json_uses_the_engine_envelope() {
        let node = RenderNode::Record(IndexMap::from([(
            "count".to_owned(),
            RenderNode::Scalar("1".into()),
        )]));
        let rendered = render_node(OutputFormat::Json, &node, false);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["value"]["count"], "1");
    }

    #[test]
    fn html_overview_escapes_names_and_raised_causes() {
        let rows = vec![AttributeRow {
            name: "Payload<raw>".into(),
            access: AccessKind::ReadOnly,
            writable: false,
            value: Some(Err(ProbeError::Invocation {
                member: "getPayload()".into(),
                cause: "stream <closed>".into(),
            })),
        }];
        let rendered = render_attr_rows(OutputFormat::Html, &rows, false);
        assert!(rendered.contains("Payload&lt;raw&gt;"));
        assert!(rendered.contains("stream &lt;closed&gt;"));
        assert!(!rendered.contains("<raw>"));
    }

    #[test]
    fn html_respects_writability() {
        let node = RenderNode::Scalar("42".into());
        assert!(render_node(OutputFormat::Html, &node, true).contains("<input"));
        assert_eq!(render_node(OutputFormat::Html, &node, false), "42");
    }
}
