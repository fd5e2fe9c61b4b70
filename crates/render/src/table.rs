//! Table shaping — turns computed comparison rows into renderable tables
//! with formatted cells, difference-cell colors, and layout constants.

use serde::{Deserialize, Serialize};

use offerscope_reporting::{ComparisonRow, PriceRow, RevenueShareTable};

use crate::highlight::{DivergingScale, Rgb};

/// Row height and padding used by the dashboard front end.
const ROW_HEIGHT_PX: u32 = 35;
const TABLE_PADDING_PX: u32 = 3;

const ABSENT_CELL: &str = "n/a";

/// Numeric display format for a table's value cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// `"12.34%"`
    Percent2,
    /// `"1.5 h"`
    Hours1,
    /// `"2 h"`
    Hours0,
    /// `"$12.34"`
    Usd2,
}

impl ValueFormat {
    pub fn format(&self, value: Option<f64>) -> String {
        let Some(value) = value else {
            return ABSENT_CELL.to_string();
        };
        match self {
            ValueFormat::Percent2 => format!("{value:.2}%"),
            ValueFormat::Hours1 => format!("{value:.1} h"),
            ValueFormat::Hours0 => format!("{value:.0} h"),
            ValueFormat::Usd2 => format!("${value:.2}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    pub background: Option<Rgb>,
}

impl Cell {
    fn plain(text: String) -> Self {
        Self {
            text,
            background: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRow {
    pub label: String,
    pub cells: Vec<Cell>,
}

/// A fully shaped table ready for a front end (or the CLI text printer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderTable {
    pub title: String,
    pub subtitle: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<RenderRow>,
    pub height_px: u32,
}

fn table_height(rows: usize) -> u32 {
    (rows as u32 + 1) * ROW_HEIGHT_PX + TABLE_PADDING_PX
}

impl RenderTable {
    /// Shape a control/test comparison table. The Difference column is
    /// colored through `scale`; value cells are left plain.
    pub fn comparison(
        title: &str,
        rows: &[ComparisonRow],
        format: ValueFormat,
        scale: &DivergingScale,
    ) -> Self {
        let rendered = rows
            .iter()
            .map(|row| RenderRow {
                label: row.bucket.label().to_string(),
                cells: vec![
                    Cell::plain(format.format(row.control)),
                    Cell::plain(format.format(row.test)),
                    Cell {
                        text: format.format(row.diff),
                        background: row.diff.map(|d| scale.color(d)),
                    },
                ],
            })
            .collect::<Vec<_>>();
        Self {
            title: title.to_string(),
            subtitle: None,
            headers: vec![
                "Control".to_string(),
                "Test".to_string(),
                "Difference".to_string(),
            ],
            height_px: table_height(rendered.len()),
            rows: rendered,
        }
    }

    /// The revenue table additionally shows the absolute per-group totals.
    pub fn revenue(
        title: &str,
        table: &RevenueShareTable,
        format: ValueFormat,
        scale: &DivergingScale,
    ) -> Self {
        let mut rendered = Self::comparison(title, &table.rows, format, scale);
        rendered.subtitle = Some(format!(
            "Control total ${:.2}, test total ${:.2}",
            table.control_total_usd, table.test_total_usd
        ));
        rendered
    }

    /// Descriptive pricing table: mean and median, no difference column.
    pub fn prices(title: &str, rows: &[PriceRow]) -> Self {
        let rendered = rows
            .iter()
            .map(|row| RenderRow {
                label: row.bucket.label().to_string(),
                cells: vec![
                    Cell::plain(ValueFormat::Usd2.format(row.mean_usd)),
                    Cell::plain(ValueFormat::Usd2.format(row.median_usd)),
                ],
            })
            .collect::<Vec<_>>();
        Self {
            title: title.to_string(),
            subtitle: None,
            headers: vec!["Mean".to_string(), "Median".to_string()],
            height_px: table_height(rendered.len()),
            rows: rendered,
        }
    }

    /// Placeholder for a table the pipeline skipped.
    pub fn skipped(title: &str, reason: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: Some(reason.to_string()),
            headers: Vec::new(),
            rows: Vec::new(),
            height_px: table_height(0),
        }
    }

    /// Aligned plain-text rendering for terminal output.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        if let Some(subtitle) = &self.subtitle {
            out.push_str(subtitle);
            out.push('\n');
        }
        if self.rows.is_empty() {
            return out;
        }

        let label_width = self
            .rows
            .iter()
            .map(|r| r.label.len())
            .max()
            .unwrap_or(0)
            .max("Offer".len());
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.cells.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.text.len());
                }
            }
        }

        out.push_str(&format!("{:<label_width$}", "Offer"));
        for (header, &width) in self.headers.iter().zip(&widths) {
            out.push_str(&format!("  {header:>width$}"));
        }
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format!("{:<label_width$}", row.label));
            for (cell, &width) in row.cells.iter().zip(&widths) {
                out.push_str(&format!("  {:>width$}", cell.text));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offerscope_core::types::OfferBucket;

    fn rows() -> Vec<ComparisonRow> {
        vec![
            ComparisonRow {
                bucket: OfferBucket::Other,
                control: Some(20.0),
                test: Some(40.0),
                diff: Some(20.0),
            },
            ComparisonRow {
                bucket: OfferBucket::Named("al.2x2startofer".to_string()),
                control: Some(80.0),
                test: Some(60.0),
                diff: Some(-20.0),
            },
        ]
    }

    #[test]
    fn test_value_formats() {
        assert_eq!(ValueFormat::Percent2.format(Some(12.3)), "12.30%");
        assert_eq!(ValueFormat::Hours1.format(Some(1.44)), "1.4 h");
        assert_eq!(ValueFormat::Hours0.format(Some(2.6)), "3 h");
        assert_eq!(ValueFormat::Usd2.format(Some(4.5)), "$4.50");
        assert_eq!(ValueFormat::Percent2.format(None), "n/a");
    }

    #[test]
    fn test_comparison_table_shape_and_height() {
        let scale = DivergingScale::symmetric(10.0);
        let table = RenderTable::comparison("Revenue per offer", &rows(), ValueFormat::Percent2, &scale);

        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.height_px, 3 * 35 + 3);
        assert_eq!(table.rows[0].cells[0].text, "20.00%");
        // Only the difference cell gets a background.
        assert!(table.rows[0].cells[0].background.is_none());
        assert!(table.rows[0].cells[2].background.is_some());
        // Positive share diff leans green, negative leans red.
        let up = table.rows[0].cells[2].background.unwrap();
        let down = table.rows[1].cells[2].background.unwrap();
        assert!(up.g > up.r);
        assert!(down.r > down.g);
    }

    #[test]
    fn test_absent_latency_cell_has_no_color() {
        let scale = DivergingScale::inverted(500.0);
        let rows = vec![ComparisonRow {
            bucket: OfferBucket::Other,
            control: None,
            test: Some(3.0),
            diff: None,
        }];
        let table = RenderTable::comparison("First show time", &rows, ValueFormat::Hours0, &scale);
        assert_eq!(table.rows[0].cells[0].text, "n/a");
        assert!(table.rows[0].cells[2].background.is_none());
    }

    #[test]
    fn test_text_rendering_aligns_columns() {
        let scale = DivergingScale::symmetric(10.0);
        let table = RenderTable::comparison("Paying share", &rows(), ValueFormat::Percent2, &scale);
        let text = table.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Paying share");
        assert!(lines[1].contains("Control"));
        assert!(lines[2].starts_with("Other"));
        assert!(lines[3].starts_with("al.2x2startofer"));
    }

    #[test]
    fn test_render_table_serializes() {
        let scale = DivergingScale::symmetric(10.0);
        let table = RenderTable::comparison("Revenue", &rows(), ValueFormat::Percent2, &scale);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["headers"][2], "Difference");
        assert!(json["rows"][0]["cells"][2]["background"].is_object());
    }

    #[test]
    fn test_skipped_table_carries_reason() {
        let table = RenderTable::skipped("Revenue per offer", "no eligible data");
        assert_eq!(table.rows.len(), 0);
        let text = table.to_text();
        assert!(text.contains("no eligible data"));
    }
}
