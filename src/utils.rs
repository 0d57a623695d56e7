//! Miscellaneous utility functions.

use anyhow::Context as _;
use colored::Colorize;
use serde_json::Value;
use std::io::Write;
use std::io::{self, ErrorKind};

use crate::snapshot::{NodeId, SnapshotTree};

/// The labels of every node from the root down to `node`, joined by ` > `.
#[must_use]
pub fn ancestry_path(tree: &SnapshotTree, node: NodeId) -> String {
    tree.ancestry(node)
        .into_iter()
        .map(|id| tree.label(id))
        .collect::<Vec<_>>()
        .join(" > ")
}

/// The properties of `node` as a JSON object; `null` for a stale node.
///
/// # Errors
///
/// Returns an error if the properties cannot be represented as JSON.
pub fn properties_json(tree: &SnapshotTree, node: NodeId) -> serde_json::Result<Value> {
    tree.properties(node).map_or(Ok(Value::Null), serde_json::to_value)
}

// ==============================================================================
// Colorized Output
// ==============================================================================

/// Write a single match (ancestry header + colorized properties) to `writer`.
/// Silently returns `Ok(())` on broken pipe so that piping to tools like
/// `less` or `head` exits cleanly.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_colored_match<W: Write>(
    writer: &mut W,
    tree: &SnapshotTree,
    node: NodeId,
    pretty: bool,
    show_path: bool,
) -> anyhow::Result<()> {
    let value = properties_json(tree, node).context("serialize properties")?;
    let path = ancestry_path(tree, node);

    let result = (|| -> io::Result<()> {
        if show_path {
            writeln!(writer, "{}:", path.bold().magenta())?;
        }
        write_colored_json(writer, &value, 0, pretty)?;
        writeln!(writer)?;
        Ok(())
    })();

    ignore_broken_pipe(result).context("write colorized match to stdout")
}

/// Write a plain line, tolerating a closed pipe like
/// [`write_colored_match`].
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> anyhow::Result<()> {
    ignore_broken_pipe(writeln!(writer, "{line}")).context("write to stdout")
}

fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Recursively write a JSON value with syntax highlighting.
fn write_colored_json<W: Write>(
    writer: &mut W,
    value: &Value,
    indent: usize,
    pretty: bool,
) -> io::Result<()> {
    let next_indent = indent + 2;

    match value {
        Value::Null => write!(writer, "{}", "null".red().dimmed()),
        Value::Bool(b) => {
            write!(writer, "{}", b.to_string().yellow().bold())
        }
        Value::Number(n) => write!(writer, "{}", n.to_string().yellow()),
        Value::String(s) => {
            // NOTE: Re-serialize to get proper JSON escaping and quoting.
            let quoted = serde_json::to_string(s).map_err(io::Error::other)?;
            write!(writer, "{}", quoted.green())
        }
        Value::Array(arr) => {
            write!(writer, "[")?;
            for (i, item) in arr.iter().enumerate() {
                if pretty {
                    writeln!(writer)?;
                    write!(writer, "{:width$}", "", width = next_indent)?;
                }
                write_colored_json(writer, item, next_indent, pretty)?;
                if i + 1 < arr.len() {
                    write!(writer, ",")?;
                }
            }
            if pretty && !arr.is_empty() {
                writeln!(writer)?;
                write!(writer, "{:width$}", "", width = indent)?;
            }
            write!(writer, "]")
        }
        Value::Object(obj) => {
            write!(writer, "{{")?;
            for (i, (key, val)) in obj.iter().enumerate() {
                if pretty {
                    writeln!(writer)?;
                    write!(writer, "{:width$}", "", width = next_indent)?;
                }
                // Key with quotes -> colored cyan.
                let quoted_key =
                    serde_json::to_string(key).map_err(io::Error::other)?;
                write!(writer, "{}", quoted_key.cyan())?;
                if pretty {
                    write!(writer, ": ")?;
                } else {
                    write!(writer, ":")?;
                }
                write_colored_json(writer, val, next_indent, pretty)?;
                if i + 1 < obj.len() {
                    write!(writer, ",")?;
                }
            }
            if pretty && !obj.is_empty() {
                writeln!(writer)?;
                write!(writer, "{:width$}", "", width = indent)?;
            }
            write!(writer, "}}")
        }
    }
}
