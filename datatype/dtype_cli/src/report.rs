//! Layout reports, as an aligned table or JSON.

use std::fmt::Write as _;

use dtype_layout::{BasicType, LayoutError, TypeId, TypeLayout, TypePool};
use serde::Serialize;

use crate::config::OutputFormat;

/// Failure while rendering a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct LayoutEntry<'a> {
    name: &'a str,
    combiner: &'static str,
    layout: TypeLayout,
}

#[derive(Serialize)]
struct BuiltinEntry {
    name: &'static str,
    size: i64,
}

/// Render every definition, in order.
pub fn layouts(
    pool: &TypePool,
    definitions: &[(String, TypeId)],
    format: OutputFormat,
) -> Result<String, ReportError> {
    let entries = definitions
        .iter()
        .map(|(name, id)| {
            Ok(LayoutEntry {
                name,
                combiner: pool.contents(*id)?.combiner(),
                layout: pool.layout(*id)?,
            })
        })
        .collect::<Result<Vec<_>, LayoutError>>()?;

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => Ok(layout_table(&entries)),
    }
}

/// Render the builtin element table.
pub fn builtins(format: OutputFormat) -> Result<String, ReportError> {
    let entries: Vec<BuiltinEntry> = BasicType::ALL
        .iter()
        .map(|basic| BuiltinEntry {
            name: basic.name(),
            size: basic.size(),
        })
        .collect();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for entry in &entries {
                let _ = writeln!(out, "{:<16} {:>3}", entry.name, entry.size);
            }
            Ok(out)
        }
    }
}

fn layout_table(entries: &[LayoutEntry<'_>]) -> String {
    let name_width = entries
        .iter()
        .map(|entry| entry.name.len())
        .max()
        .unwrap_or(0)
        .max("name".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<14} {:>6} {:>6} {:>6} {:>6} {:>7} {:>7} {:>5} {:>6} {:<11} {:<6} {:>6}",
        "name",
        "combiner",
        "size",
        "extent",
        "lb",
        "ub",
        "true_lb",
        "true_ub",
        "align",
        "elems",
        "element",
        "contig",
        "blocks",
    );

    for entry in entries {
        let layout = &entry.layout;
        let element = layout.basic_type.map_or("-", BasicType::name);
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<14} {:>6} {:>6} {:>6} {:>6} {:>7} {:>7} {:>5} {:>6} {:<11} {:<6} {:>6}",
            entry.name,
            entry.combiner,
            layout.size,
            layout.extent,
            layout.lb,
            layout.ub,
            layout.true_lb,
            layout.true_ub,
            layout.alignsize,
            layout.n_builtin_elements,
            element,
            if layout.is_contig { "yes" } else { "no" },
            layout.num_contig_blocks,
        );
    }

    out
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests {
    use super::*;
    use crate::script;

    #[test]
    fn text_table_has_one_row_per_definition() {
        let pool = TypePool::new();
        let session = script::run(&pool, "gapped = hvector 3 2 16 int\n").unwrap();

        let table = layouts(&pool, session.definitions(), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("name"));
        let columns: Vec<&str> = lines[1].split_whitespace().collect();
        assert_eq!(
            columns,
            ["gapped", "hvector", "24", "40", "0", "40", "0", "40", "4", "6", "int", "no", "3"]
        );
    }

    #[test]
    fn json_report_nests_layout() {
        let pool = TypePool::new();
        let session = script::run(&pool, "row = contiguous 4 double\n").unwrap();

        let json = layouts(&pool, session.definitions(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["name"], "row");
        assert_eq!(value[0]["combiner"], "contiguous");
        assert_eq!(value[0]["layout"]["size"], 32);
        assert_eq!(value[0]["layout"]["is_contig"], true);
        assert_eq!(value[0]["layout"]["num_contig_blocks"], 1);
    }

    #[test]
    fn builtins_list_every_element() {
        let text = builtins(OutputFormat::Text).unwrap();
        assert_eq!(text.lines().count(), BasicType::ALL.len());
        assert!(text.lines().any(|line| line.split_whitespace().eq(["double", "8"])));
    }
}
