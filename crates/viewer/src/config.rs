use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Tile sources and initial view of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// `[lat, lon]` in degrees.
    pub center: [f64; 2],
    pub zoom: u8,
    pub base_tiles: String,
    pub satellite_tiles: String,
    pub annotation_tiles: String,
    pub subdomains: Vec<String>,
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [35.8298, 104.7881],
            zoom: 4,
            base_tiles: "https://webrd0{s}.is.autonavi.com/appmaptile?lang=zh_cn&size=1&scale=1&style=8&x={x}&y={y}&z={z}".to_string(),
            satellite_tiles: "https://webst0{s}.is.autonavi.com/appmaptile?style=6&x={x}&y={y}&z={z}".to_string(),
            annotation_tiles: "https://webst0{s}.is.autonavi.com/appmaptile?style=8&x={x}&y={y}&z={z}".to_string(),
            subdomains: ["1", "2", "3", "4"].map(String::from).to_vec(),
            attribution: "© 高德地图".to_string(),
        }
    }
}

/// Session configuration. Missing keys fall back to defaults and unknown
/// keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Column joined against region names.
    pub key_field: String,
    pub geo_data_url: String,
    pub export_file_name: String,
    /// Shown in the info panel for missing values.
    pub placeholder: String,
    pub map: MapConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            key_field: "城市".to_string(),
            geo_data_url: "https://geo.datav.aliyun.com/areas_v3/bound/100000_full_city.json"
                .to_string(),
            export_file_name: "filtered_data.csv".to_string(),
            placeholder: "暂无数据".to_string(),
            map: MapConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, ViewerError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ViewerError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::ViewerConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ViewerConfig::from_json(r#"{"key_field": "city", "map": {"zoom": 6}, "extra": 1}"#)
            .unwrap();
        assert_eq!(cfg.key_field, "city");
        assert_eq!(cfg.map.zoom, 6);
        assert_eq!(cfg.map.center, [35.8298, 104.7881]);
        assert_eq!(cfg.export_file_name, "filtered_data.csv");
    }

    #[test]
    fn json_round_trips() {
        let cfg = ViewerConfig::default();
        let back = ViewerConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(ViewerConfig::from_json("{").is_err());
    }
}
