use compute::binning::BinSet;
use foundation::color::{GREENS, Rgb};
use formats::table::Row;
use scene::region::RegionSet;
use serde::{Deserialize, Serialize};

use crate::symbology::RegionStyle;

/// Fill of a region when no bins exist for the current metric.
pub const DEFAULT_FILL: Rgb = GREENS[0];

/// How one region is painted for the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPaint {
    /// Region name; also its persistent label.
    pub name: String,
    /// Numeric reading of the metric for the matched row. Unmatched regions
    /// are colored as 0, non-numeric cells with the lowest tier.
    pub value: Option<f64>,
    pub matched: bool,
    pub style: RegionStyle,
}

impl RegionPaint {
    pub fn highlight_style(&self) -> RegionStyle {
        RegionStyle::highlight(self.style.fill)
    }
}

/// Read-only snapshot pushed to the map surface, one entry per region in
/// region order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlaySnapshot {
    pub metric: Option<String>,
    pub regions: Vec<RegionPaint>,
}

impl OverlaySnapshot {
    pub fn matched(&self) -> usize {
        self.regions.iter().filter(|r| r.matched).count()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|r| r.name == name)
    }
}

/// Joins `rows` to `regions` on `key` and colors each region through `bins`.
///
/// The first row whose key equals the region name wins. Rows with no region
/// are not drawn.
pub fn build_overlay(
    regions: &RegionSet,
    rows: &[&Row],
    key: &str,
    metric: Option<&str>,
    bins: Option<&BinSet>,
) -> OverlaySnapshot {
    let paints: Vec<RegionPaint> = regions
        .iter()
        .map(|region| {
            let row = rows.iter().find(|r| r.get(key) == Some(region.name.as_str()));
            let value = match (row, metric) {
                (Some(r), Some(m)) => r.number(m),
                _ => None,
            };
            let color_value = match row {
                Some(_) => value.unwrap_or(f64::NAN),
                None => 0.0,
            };
            let fill = bins.map_or(DEFAULT_FILL, |b| b.color_for(color_value));
            RegionPaint {
                name: region.name.clone(),
                value,
                matched: row.is_some(),
                style: RegionStyle::base(fill),
            }
        })
        .collect();

    let snapshot = OverlaySnapshot {
        metric: metric.map(str::to_string),
        regions: paints,
    };
    let matched = snapshot.matched();
    let unmatched = snapshot.regions.len() - matched;
    if unmatched > 0 && !rows.is_empty() {
        tracing::warn!(matched, unmatched, "regions without a table row");
    } else {
        tracing::debug!(regions = snapshot.regions.len(), matched, "built choropleth overlay");
    }
    snapshot
}
