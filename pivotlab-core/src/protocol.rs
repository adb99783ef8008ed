//! Append-only derivation protocol.
//!
//! Engines never print. They write [`ProtocolEntry`] values into a
//! [`ProtocolSink`] handed to them by the caller, and the caller decides how
//! (and whether) the record is displayed.

use crate::numeric::format_number;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Owned point-in-time copy of a labelled table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Optional caption printed above the table.
    pub caption: Option<String>,
    /// Row headers (one per row of `cells`).
    pub row_labels: Vec<String>,
    /// Column headers (one per column of `cells`).
    pub col_labels: Vec<String>,
    /// Cell values, row-major.
    pub cells: Vec<Vec<f64>>,
    /// Pivot cell to highlight, if any.
    pub pivot: Option<(usize, usize)>,
}

impl TableSnapshot {
    /// Create a snapshot without caption or pivot mark.
    pub fn new(row_labels: Vec<String>, col_labels: Vec<String>, cells: Vec<Vec<f64>>) -> Self {
        Self {
            caption: None,
            row_labels,
            col_labels,
            cells,
            pivot: None,
        }
    }

    /// Snapshot of a bare matrix, labelled by 1-based row and column numbers.
    pub fn from_matrix(cells: &[Vec<f64>]) -> Self {
        let cols = cells.first().map_or(0, Vec::len);
        Self::new(
            (1..=cells.len()).map(|i| i.to_string()).collect(),
            (1..=cols).map(|j| j.to_string()).collect(),
            cells.to_vec(),
        )
    }

    /// Attach a caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Mark the pivot cell.
    pub fn with_pivot(mut self, row: usize, column: usize) -> Self {
        self.pivot = Some((row, column));
        self
    }

    /// Render the table with aligned columns.
    pub fn render(&self, precision: usize) -> String {
        let header_width = self
            .row_labels
            .iter()
            .map(|label| label.chars().count())
            .max()
            .unwrap_or(0);

        let mut columns: Vec<Vec<String>> = vec![Vec::new(); self.col_labels.len()];
        for (i, row) in self.cells.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let text = format_number(*value, precision);
                let text = if self.pivot == Some((i, j)) {
                    format!("[{}]", text)
                } else {
                    text
                };
                if let Some(column) = columns.get_mut(j) {
                    column.push(text);
                }
            }
        }

        let widths: Vec<usize> = self
            .col_labels
            .iter()
            .zip(&columns)
            .map(|(label, column)| {
                column
                    .iter()
                    .map(|text| text.chars().count())
                    .chain(std::iter::once(label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        if let Some(caption) = &self.caption {
            let _ = writeln!(out, "{}", caption);
        }

        let _ = write!(out, "{:>width$}", "", width = header_width);
        for (label, width) in self.col_labels.iter().zip(&widths) {
            let _ = write!(out, " | {:>width$}", label, width = *width);
        }
        out.push('\n');

        let rule_len = header_width + widths.iter().map(|w| w + 3).sum::<usize>();
        out.push_str(&"-".repeat(rule_len));
        out.push('\n');

        for (i, label) in self.row_labels.iter().enumerate() {
            let _ = write!(out, "{:>width$}", label, width = header_width);
            for (j, width) in widths.iter().enumerate() {
                let text = columns
                    .get(j)
                    .and_then(|column| column.get(i))
                    .map_or("", String::as_str);
                let _ = write!(out, " | {:>width$}", text, width = *width);
            }
            out.push('\n');
        }
        out
    }
}

/// One record of the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum ProtocolEntry {
    /// Section heading; level 1 is the top level.
    Heading {
        /// Nesting level.
        level: u8,
        /// Heading text.
        text: String,
    },
    /// Explanatory prose.
    Paragraph(String),
    /// Text whose line breaks and spacing must be kept.
    Preformatted(String),
    /// Table snapshot.
    Table(TableSnapshot),
}

impl ProtocolEntry {
    /// Render the entry as plain text.
    pub fn render_text(&self, precision: usize) -> String {
        match self {
            ProtocolEntry::Heading { level, text } => {
                let underline = if *level <= 1 { '=' } else { '-' };
                let len = text.chars().count();
                format!("{}\n{}\n", text, underline.to_string().repeat(len))
            }
            ProtocolEntry::Paragraph(text) => format!("{}\n", text),
            ProtocolEntry::Preformatted(text) => {
                if text.ends_with('\n') {
                    text.clone()
                } else {
                    format!("{}\n", text)
                }
            }
            ProtocolEntry::Table(table) => table.render(precision),
        }
    }
}

/// Destination for protocol entries.
///
/// Engines take `&mut dyn ProtocolSink`, so the helpers stay object safe.
pub trait ProtocolSink {
    /// Append one entry.
    fn record(&mut self, entry: ProtocolEntry);

    /// Append a heading.
    fn heading(&mut self, level: u8, text: &str) {
        self.record(ProtocolEntry::Heading {
            level,
            text: text.to_string(),
        });
    }

    /// Append a paragraph.
    fn paragraph(&mut self, text: &str) {
        self.record(ProtocolEntry::Paragraph(text.to_string()));
    }

    /// Append preformatted text.
    fn preformatted(&mut self, text: &str) {
        self.record(ProtocolEntry::Preformatted(text.to_string()));
    }

    /// Append a table snapshot.
    fn table(&mut self, table: TableSnapshot) {
        self.record(ProtocolEntry::Table(table));
    }
}

/// In-memory protocol owned by a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    entries: Vec<ProtocolEntry>,
}

impl Protocol {
    /// Create an empty protocol.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded entries in order.
    pub fn entries(&self) -> &[ProtocolEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the table snapshots only.
    pub fn tables(&self) -> impl Iterator<Item = &TableSnapshot> {
        self.entries.iter().filter_map(|entry| match entry {
            ProtocolEntry::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Whether any text entry or table caption contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| match entry {
            ProtocolEntry::Heading { text, .. }
            | ProtocolEntry::Paragraph(text)
            | ProtocolEntry::Preformatted(text) => text.contains(needle),
            ProtocolEntry::Table(table) => table
                .caption
                .as_deref()
                .is_some_and(|caption| caption.contains(needle)),
        })
    }

    /// Consume the protocol, yielding its entries.
    pub fn into_entries(self) -> Vec<ProtocolEntry> {
        self.entries
    }

    /// Render the whole protocol as plain text, entries separated by blank lines.
    pub fn render_text(&self, precision: usize) -> String {
        self.entries
            .iter()
            .map(|entry| entry.render_text(precision))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ProtocolSink for Protocol {
    fn record(&mut self, entry: ProtocolEntry) {
        self.entries.push(entry);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProtocol;

impl ProtocolSink for NullProtocol {
    fn record(&mut self, _entry: ProtocolEntry) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_is_append_only_in_order() {
        let mut protocol = Protocol::new();
        protocol.heading(1, "Inverse");
        protocol.paragraph("first");
        protocol.preformatted("y1 = x1 + x2");
        assert_eq!(protocol.len(), 3);
        assert_eq!(protocol.entries()[1], ProtocolEntry::Paragraph("first".into()));
        assert!(protocol.mentions("x1 + x2"));
        assert!(!protocol.mentions("x3"));
    }

    #[test]
    fn test_dyn_sink_helpers() {
        let mut protocol = Protocol::new();
        {
            let sink: &mut dyn ProtocolSink = &mut protocol;
            sink.heading(2, "Step 1");
            sink.paragraph(&format!("pivot {}", 3));
            sink.table(TableSnapshot::from_matrix(&[vec![1.0]]));
        }
        assert_eq!(protocol.len(), 3);
        assert_eq!(protocol.tables().count(), 1);
    }

    #[test]
    fn test_null_protocol_discards() {
        let mut sink = NullProtocol;
        sink.paragraph("ignored");
        let dyn_sink: &mut dyn ProtocolSink = &mut sink;
        dyn_sink.paragraph("also ignored");
    }

    #[test]
    fn test_render_heading_and_table() {
        let mut protocol = Protocol::new();
        protocol.heading(1, "Tableau");
        protocol.table(
            TableSnapshot::new(
                vec!["y1".into(), "Z'".into()],
                vec!["-x1".into(), "1".into()],
                vec![vec![2.0, 4.0], vec![-3.0, -0.0]],
            )
            .with_pivot(0, 0),
        );

        let text = protocol.render_text(2);
        assert!(text.starts_with("Tableau\n=======\n"));
        assert!(text.contains("[2.00]"));
        assert!(text.contains("-3.00"));
        assert!(!text.contains("-0.00"));
        assert!(text.contains("-x1"));
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut cells = vec![vec![1.0, 2.0]];
        let snapshot = TableSnapshot::from_matrix(&cells);
        cells[0][0] = 9.0;
        assert_eq!(snapshot.cells[0][0], 1.0);
        assert_eq!(snapshot.col_labels, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_entry_serde_shape() {
        let entry = ProtocolEntry::Paragraph("done".into());
        let json = serde_json::to_string(&entry).expect("serialize");
        assert_eq!(json, r#"{"kind":"paragraph","content":"done"}"#);
    }
}
