use foundation::bounds::LonLat;
use serde::{Deserialize, Serialize};

pub const OUTSIDE_TITLE: &str = "点击位置";
pub const OUTSIDE_CREDIT: &str = "信息：北部湾大学出品";
pub const OUTSIDE_NOTICE: &str = "数据：非中华人民共和国区域，数据暂无";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

/// An informational pin placed where no region covers the click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: LonLat,
    pub popup: Popup,
}

impl Marker {
    pub fn outside_coverage(position: LonLat) -> Self {
        Self {
            position,
            popup: Popup {
                title: OUTSIDE_TITLE.to_string(),
                lines: vec![
                    OUTSIDE_CREDIT.to_string(),
                    OUTSIDE_NOTICE.to_string(),
                    format!("经度：{:.6}", position.lon_deg),
                    format!("纬度：{:.6}", position.lat_deg),
                ],
            },
        }
    }
}
