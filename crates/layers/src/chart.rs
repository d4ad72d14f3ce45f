use std::fmt;
use std::str::FromStr;

use foundation::color::{GREENS, Rgb};
use formats::table::Row;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown chart kind: {0:?}")]
pub struct UnknownChartKind(pub String);

impl FromStr for ChartKind {
    type Err = UnknownChartKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            other => Err(UnknownChartKind(other.to_string())),
        }
    }
}

/// The two independent chart positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChartSlot {
    First,
    Second,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 2] = [ChartSlot::First, ChartSlot::Second];

    pub fn index(self) -> usize {
        match self {
            ChartSlot::First => 0,
            ChartSlot::Second => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Surface name used in redraw traces and metrics.
    pub fn surface_name(self) -> &'static str {
        match self {
            ChartSlot::First => "chart1",
            ChartSlot::Second => "chart2",
        }
    }
}

/// Per-slot selection. An empty field means the slot shows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub field: String,
}

impl ChartConfig {
    pub fn new(kind: ChartKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
        }
    }
}

/// One-series chart data, ready for a charting library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub kind: ChartKind,
    pub title: String,
    pub series_label: String,
    pub labels: Vec<String>,
    /// `None` where the cell is not numeric; the chart leaves a gap.
    pub values: Vec<Option<f64>>,
    pub fill_colors: Vec<Rgb>,
    pub border_colors: Vec<Rgb>,
}

/// Builds the slot's chart from the filtered rows, or `None` when the slot
/// has no field selected.
pub fn build_chart(rows: &[&Row], key: &str, config: &ChartConfig) -> Option<ChartSnapshot> {
    if config.field.is_empty() {
        return None;
    }
    let field = config.field.as_str();
    let labels = rows
        .iter()
        .map(|r| r.get(key).unwrap_or_default().to_string())
        .collect();
    let values = rows.iter().map(|r| r.number(field)).collect();
    let fill_colors: Vec<Rgb> = GREENS.iter().copied().cycle().take(rows.len()).collect();
    let border_colors = match config.kind {
        ChartKind::Line => vec![GREENS[5]],
        ChartKind::Bar => fill_colors.clone(),
    };

    Some(ChartSnapshot {
        kind: config.kind,
        title: format!("{field}分布"),
        series_label: field.to_string(),
        labels,
        values,
        fill_colors,
        border_colors,
    })
}
