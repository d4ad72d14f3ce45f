use foundation::color::Rgb;
use serde::{Deserialize, Serialize};

/// Stroke and fill of one region polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStyle {
    pub weight: f32,
    pub opacity: f32,
    pub stroke: String,
    pub dash: Option<String>,
    pub fill: Rgb,
    pub fill_opacity: f32,
}

impl RegionStyle {
    pub fn base(fill: Rgb) -> Self {
        Self {
            weight: 2.0,
            opacity: 1.0,
            stroke: "white".to_string(),
            dash: Some("3".to_string()),
            fill,
            fill_opacity: 0.7,
        }
    }

    /// Hover emphasis. Keeps the fill so the bin color stays readable.
    pub fn highlight(fill: Rgb) -> Self {
        Self {
            weight: 3.0,
            stroke: "#666".to_string(),
            dash: None,
            fill_opacity: 0.8,
            ..Self::base(fill)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RegionStyle;
    use foundation::color::GREENS;

    #[test]
    fn highlight_differs_only_in_emphasis() {
        let base = RegionStyle::base(GREENS[3]);
        let hi = RegionStyle::highlight(GREENS[3]);
        assert_eq!(base.dash.as_deref(), Some("3"));
        assert_eq!(hi.dash, None);
        assert_eq!(hi.fill, base.fill);
        assert_eq!(hi.opacity, base.opacity);
        assert!(hi.weight > base.weight);
        assert!(hi.fill_opacity > base.fill_opacity);
    }
}
