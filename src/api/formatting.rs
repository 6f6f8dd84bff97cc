//! Output formatting for position fixes
//!
//! Renders fixes as human-readable text, JSON or CSV rows for whatever
//! collaborator displays or logs them.

use crate::algorithms::ConfidenceLevel;
use crate::api::session::PositionFix;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line
    #[default]
    Text,
    /// JSON object
    Json,
    /// CSV row, see `FixFormatter::csv_header`
    Csv,
}

/// Serializable view of a position fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedFix {
    pub x: f64,
    pub y: f64,
    pub accuracy: f64,
    pub confidence: ConfidenceLevel,
    pub neighbors: Vec<String>,
    pub map_id: Option<String>,
    pub map_name: Option<String>,
    /// Epoch milliseconds
    pub timestamp_ms: i64,
}

impl From<&PositionFix> for FormattedFix {
    fn from(fix: &PositionFix) -> Self {
        Self {
            x: fix.position.x,
            y: fix.position.y,
            accuracy: fix.position.accuracy,
            confidence: fix.confidence,
            neighbors: fix.position.neighbor_ids.clone(),
            map_id: fix.map.as_ref().map(|m| m.map_id.clone()),
            map_name: fix.map.as_ref().map(|m| m.name.clone()),
            timestamp_ms: fix.timestamp.timestamp_millis(),
        }
    }
}

/// Formats fixes in the selected output format
#[derive(Debug, Clone)]
pub struct FixFormatter {
    pub format: OutputFormat,
    /// Pretty print JSON
    pub pretty: bool,
}

impl Default for FixFormatter {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            pretty: false,
        }
    }
}

impl FixFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// CSV header matching `format` output in CSV mode
    pub fn csv_header() -> &'static str {
        "timestamp_ms,x,y,accuracy,confidence,neighbors,map_id"
    }

    pub fn format(&self, fix: &PositionFix) -> Result<String, serde_json::Error> {
        let view = FormattedFix::from(fix);
        match self.format {
            OutputFormat::Text => Ok(Self::format_text(&view)),
            OutputFormat::Json if self.pretty => serde_json::to_string_pretty(&view),
            OutputFormat::Json => serde_json::to_string(&view),
            OutputFormat::Csv => Ok(Self::format_csv(&view)),
        }
    }

    fn format_text(view: &FormattedFix) -> String {
        let map = match (&view.map_name, &view.map_id) {
            (Some(name), _) => format!(" on {}", name),
            (None, Some(id)) => format!(" on {}", id),
            _ => String::new(),
        };
        format!(
            "Position{}: x={:.1}% y={:.1}% accuracy={:.2} ({:?}), neighbors: {}",
            map,
            view.x,
            view.y,
            view.accuracy,
            view.confidence,
            view.neighbors.join(", ")
        )
    }

    fn format_csv(view: &FormattedFix) -> String {
        format!(
            "{},{:.3},{:.3},{:.3},{:?},{},{}",
            view.timestamp_ms,
            view.x,
            view.y,
            view.accuracy,
            view.confidence,
            view.neighbors.join(";"),
            view.map_id.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CurrentPosition, MapContext};
    use chrono::DateTime;

    fn sample_fix() -> PositionFix {
        PositionFix {
            position: CurrentPosition {
                x: 25.0,
                y: 75.5,
                accuracy: 0.82,
                neighbor_ids: vec!["p1".to_string(), "p2".to_string()],
            },
            confidence: ConfidenceLevel::High,
            map: Some(MapContext {
                map_id: "b1".to_string(),
                name: "Basement".to_string(),
            }),
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            reference_count: 12,
        }
    }

    #[test]
    fn test_text_format() {
        let text = FixFormatter::new().format(&sample_fix()).unwrap();
        assert_eq!(
            text,
            "Position on Basement: x=25.0% y=75.5% accuracy=0.82 (High), neighbors: p1, p2"
        );
    }

    #[test]
    fn test_json_format() {
        let json = FixFormatter::new()
            .with_format(OutputFormat::Json)
            .format(&sample_fix())
            .unwrap();
        let parsed: FormattedFix = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.map_id.as_deref(), Some("b1"));
        assert_eq!(parsed.timestamp_ms, 1_700_000_000_000);
        assert_eq!(parsed.confidence, ConfidenceLevel::High);
    }

    #[test]
    fn test_csv_format() {
        let row = FixFormatter::new()
            .with_format(OutputFormat::Csv)
            .format(&sample_fix())
            .unwrap();
        assert_eq!(row, "1700000000000,25.000,75.500,0.820,High,p1;p2,b1");
        assert_eq!(
            row.split(',').count(),
            FixFormatter::csv_header().split(',').count()
        );
    }
}
