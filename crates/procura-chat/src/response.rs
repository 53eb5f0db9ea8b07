//! Response formatting.
//!
//! Turns backend output into the markdown shown in the chat pane. All
//! formatting is deterministic: the same input always yields the same text.

use procura_core::types::{CellValue, ResultTable};

use crate::prompts::{DOCUMENT_HEADING, GENERAL_HEADING, RESULTS_HEADING};

/// Minimum rendered column width, so the separator row stays valid markdown.
const MIN_COLUMN_WIDTH: usize = 3;

// =============================================================================
// ResponseFormatter
// =============================================================================

/// Renders explanations, result tables, and completion text.
#[derive(Clone, Debug)]
pub struct ResponseFormatter {
    /// Maximum number of table rows included in a response.
    pub max_rows: usize,
}

impl ResponseFormatter {
    /// Create a formatter that shows at most `max_rows` rows (at least one).
    pub fn new(max_rows: usize) -> Self {
        Self {
            max_rows: max_rows.max(1),
        }
    }

    /// Explanation followed by the (possibly truncated) result table.
    pub fn structured(&self, explanation: &str, table: &ResultTable) -> String {
        let shown = table.len().min(self.max_rows);
        let mut out = format!(
            "{}\n\n{}\n\n{}",
            explanation,
            RESULTS_HEADING,
            self.render_table(table)
        );
        if table.len() > shown {
            out.push_str(&format!(
                "\n\n*Showing {} of {} results*",
                shown,
                table.len()
            ));
        }
        out
    }

    /// Wrap a document-backend answer.
    pub fn document(&self, text: &str) -> String {
        format!("{}\n\n{}", DOCUMENT_HEADING, text)
    }

    /// Wrap a generic completion answer.
    pub fn general(&self, text: &str) -> String {
        format!("{}\n\n{}", GENERAL_HEADING, text)
    }

    /// Render the first `max_rows` rows as a pipe table.
    ///
    /// Columns whose visible cells are all numeric are right-aligned. Rows
    /// shorter than the header are padded with blanks; extra cells are
    /// rendered under generated `column_N` headers.
    pub fn render_table(&self, table: &ResultTable) -> String {
        let rows = &table.rows[..table.len().min(self.max_rows)];

        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(table.columns.len()))
            .max()
            .unwrap_or(0);
        if width == 0 {
            return String::new();
        }

        let headers: Vec<String> = (0..width)
            .map(|i| {
                table
                    .columns
                    .get(i)
                    .map(|c| escape_cell(c))
                    .unwrap_or_else(|| format!("column_{}", i + 1))
            })
            .collect();

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                (0..width)
                    .map(|i| row.get(i).map(|c| escape_cell(&c.to_string())).unwrap_or_default())
                    .collect()
            })
            .collect();

        let right_align: Vec<bool> = (0..width)
            .map(|i| is_numeric_column(rows, i))
            .collect();

        let widths: Vec<usize> = (0..width)
            .map(|i| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(headers[i].chars().count()))
                    .max()
                    .unwrap_or(0)
                    .max(MIN_COLUMN_WIDTH)
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(render_row(&headers, &widths, &right_align));
        lines.push(render_separator(&widths, &right_align));
        for row in &cells {
            lines.push(render_row(row, &widths, &right_align));
        }
        lines.join("\n")
    }
}

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self::new(10)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn render_row(cells: &[String], widths: &[usize], right_align: &[bool]) -> String {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths)
        .zip(right_align)
        .map(|((cell, &w), &right)| {
            if right {
                format!(" {:>w$} ", cell, w = w)
            } else {
                format!(" {:<w$} ", cell, w = w)
            }
        })
        .collect();
    format!("|{}|", parts.join("|"))
}

fn render_separator(widths: &[usize], right_align: &[bool]) -> String {
    let parts: Vec<String> = widths
        .iter()
        .zip(right_align)
        .map(|(&w, &right)| {
            if right {
                format!(" {}: ", "-".repeat(w - 1))
            } else {
                format!(" {} ", "-".repeat(w))
            }
        })
        .collect();
    format!("|{}|", parts.join("|"))
}

/// A column is numeric when it has at least one numeric cell and every
/// non-null cell is numeric.
fn is_numeric_column(rows: &[Vec<CellValue>], index: usize) -> bool {
    let mut seen = false;
    for cell in rows.iter().filter_map(|r| r.get(index)) {
        match cell {
            CellValue::Null => {}
            c if c.is_numeric() => seen = true,
            _ => return false,
        }
    }
    seen
}

/// Keep a cell on one line and stop it from closing the column early.
fn escape_cell(raw: &str) -> String {
    raw.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier_table(rows: usize) -> ResultTable {
        let mut table = ResultTable::new(vec!["supplier".into(), "spend".into()]);
        for i in 0..rows {
            table = table.with_row(vec![
                CellValue::from(format!("Supplier {}", i + 1)),
                CellValue::from((i as i64 + 1) * 100),
            ]);
        }
        table
    }

    #[test]
    fn test_render_simple_table() {
        let table = ResultTable::new(vec!["name".into(), "spend".into()])
            .with_row(vec!["X".into(), CellValue::from(100_i64)]);
        let rendered = ResponseFormatter::default().render_table(&table);
        assert_eq!(
            rendered,
            "| name | spend |\n| ---- | ----: |\n| X    |   100 |"
        );
    }

    #[test]
    fn test_structured_layout() {
        let table = ResultTable::new(vec!["name".into(), "spend".into()])
            .with_row(vec!["X".into(), CellValue::from(100_i64)]);
        let out = ResponseFormatter::default().structured("Top supplier is X", &table);
        assert!(out.starts_with("Top supplier is X\n\n**Results:**\n\n| name"));
        assert!(out.contains("| X    |"));
        assert!(!out.contains("Showing"));
    }

    #[test]
    fn test_truncates_to_max_rows_with_note() {
        let out = ResponseFormatter::new(10).structured("Spend by supplier", &supplier_table(15));
        assert!(out.ends_with("*Showing 10 of 15 results*"));
        assert!(out.contains("Supplier 10 "));
        assert!(!out.contains("Supplier 11"));
        // header + separator + 10 data rows
        let table_lines = out.lines().filter(|l| l.starts_with('|')).count();
        assert_eq!(table_lines, 12);
    }

    #[test]
    fn test_exactly_max_rows_has_no_note() {
        let out = ResponseFormatter::new(10).structured("x", &supplier_table(10));
        assert!(!out.contains("Showing"));
    }

    #[test]
    fn test_zero_max_rows_clamps_to_one() {
        let f = ResponseFormatter::new(0);
        assert_eq!(f.max_rows, 1);
        let out = f.structured("x", &supplier_table(3));
        assert!(out.contains("*Showing 1 of 3 results*"));
    }

    #[test]
    fn test_mixed_column_is_left_aligned() {
        let table = ResultTable::new(vec!["value".into()])
            .with_row(vec![CellValue::from(1_i64)])
            .with_row(vec![CellValue::from("n/a")]);
        let rendered = ResponseFormatter::default().render_table(&table);
        assert!(rendered.contains("| ----- |"));
        assert!(!rendered.contains(':'));
    }

    #[test]
    fn test_nulls_do_not_break_numeric_alignment() {
        let table = ResultTable::new(vec!["spend".into()])
            .with_row(vec![CellValue::Null])
            .with_row(vec![CellValue::from(2.5_f64)]);
        let rendered = ResponseFormatter::default().render_table(&table);
        assert!(rendered.contains("----:"));
        assert!(rendered.contains("|       |"));
    }

    #[test]
    fn test_ragged_rows_are_padded_and_extended() {
        let table = ResultTable::new(vec!["a".into()])
            .with_row(vec![])
            .with_row(vec!["1".into(), "2".into()]);
        let rendered = ResponseFormatter::default().render_table(&table);
        let first = rendered.lines().next().unwrap();
        assert_eq!(first, "| a   | column_2 |");
        assert_eq!(rendered.lines().count(), 4);
    }

    #[test]
    fn test_cells_are_escaped() {
        let table = ResultTable::new(vec!["note".into()])
            .with_row(vec!["a|b\nc".into()]);
        let rendered = ResponseFormatter::default().render_table(&table);
        assert!(rendered.contains("a\\|b c"));
        assert_eq!(rendered.lines().count(), 3);
    }

    #[test]
    fn test_unicode_widths_count_chars() {
        let table = ResultTable::new(vec!["name".into()])
            .with_row(vec!["Müller GmbH".into()]);
        let rendered = ResponseFormatter::default().render_table(&table);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0].chars().count(), lines[2].chars().count());
    }

    #[test]
    fn test_empty_header_and_rows_render_nothing() {
        assert_eq!(
            ResponseFormatter::default().render_table(&ResultTable::default()),
            ""
        );
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let f = ResponseFormatter::default();
        let table = supplier_table(12);
        assert_eq!(f.structured("e", &table), f.structured("e", &table));
    }

    #[test]
    fn test_wrappers() {
        let f = ResponseFormatter::default();
        assert_eq!(f.document("Net 30"), "**Document Analysis:**\n\nNet 30");
        assert_eq!(f.general("Hi"), "**Assistant Response:**\n\nHi");
    }
}
