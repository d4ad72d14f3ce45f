use compute::binning::{BOUNDARY_COUNT, BinSet};
use foundation::color::{GREENS, Rgb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub from: f64,
    /// `None` for the open-ended top tier.
    pub to: Option<f64>,
    pub color: Rgb,
}

impl LegendEntry {
    pub fn label(&self) -> String {
        match self.to {
            Some(to) => format!("{:.2} - {:.2}", self.from, to),
            None => format!("{:.2}+", self.from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

/// One entry per boundary, lowest first, labelled with rounded values.
pub fn build_legend(metric: &str, bins: &BinSet) -> Legend {
    let shown = bins.display_boundaries();
    let entries = (0..BOUNDARY_COUNT)
        .map(|i| LegendEntry {
            from: shown[i],
            to: shown.get(i + 1).copied(),
            color: GREENS[i],
        })
        .collect();
    Legend {
        title: metric.to_string(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::build_legend;
    use compute::binning::BinSet;
    use foundation::color::GREENS;
    use pretty_assertions::assert_eq;

    #[test]
    fn entries_follow_boundaries() {
        let legend = build_legend("GDP", &BinSet::from_range(10.0, 80.0));
        assert_eq!(legend.title, "GDP");
        assert_eq!(legend.entries.len(), 8);
        let labels: Vec<String> = legend.entries.iter().map(|e| e.label()).collect();
        assert_eq!(labels[0], "10.00 - 20.00");
        assert_eq!(labels[6], "70.00 - 80.00");
        assert_eq!(labels[7], "80.00+");
        assert_eq!(legend.entries[7].color, GREENS[7]);
    }

    #[test]
    fn labels_use_rounded_boundaries() {
        let legend = build_legend("率", &BinSet::from_range(0.0, 1.0));
        assert_eq!(legend.entries[1].from, 0.14);
        assert_eq!(legend.entries[0].label(), "0.00 - 0.14");
    }
}
