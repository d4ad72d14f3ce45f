use formats::table::Row;
use serde::{Deserialize, Serialize};

pub const INFO_TITLE: &str = "城市数据信息";
pub const HOVER_HINT: &str = "鼠标悬停在城市上查看信息";

/// Icon hint for one info line, chosen from the field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldIcon {
    /// Key field.
    Place,
    /// Rates and ratios ("率").
    Percentage,
    /// Volumes and counts ("量").
    Trend,
    Info,
}

impl FieldIcon {
    pub fn for_field(field: &str) -> Self {
        if field.contains('率') {
            FieldIcon::Percentage
        } else if field.contains('量') {
            FieldIcon::Trend
        } else {
            FieldIcon::Info
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoLine {
    pub field: String,
    pub value: String,
    pub icon: FieldIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfoBody {
    Idle { hint: String },
    Hovered { lines: Vec<InfoLine> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoPanel {
    pub title: String,
    pub body: InfoBody,
}

impl InfoPanel {
    pub fn idle() -> Self {
        Self {
            title: INFO_TITLE.to_string(),
            body: InfoBody::Idle {
                hint: HOVER_HINT.to_string(),
            },
        }
    }

    /// Key line first, then every non-key header; missing or empty values
    /// show `placeholder`. A hovered region with no row lists only the
    /// placeholder for each field.
    pub fn hovered<'a>(
        region: &str,
        row: Option<&Row>,
        headers: impl IntoIterator<Item = &'a str>,
        key: &str,
        placeholder: &str,
    ) -> Self {
        let mut lines = vec![InfoLine {
            field: key.to_string(),
            value: region.to_string(),
            icon: FieldIcon::Place,
        }];
        lines.extend(headers.into_iter().filter(|h| *h != key).map(|h| InfoLine {
            field: h.to_string(),
            value: row
                .and_then(|r| r.non_empty(h))
                .unwrap_or(placeholder)
                .to_string(),
            icon: FieldIcon::for_field(h),
        }));
        Self {
            title: INFO_TITLE.to_string(),
            body: InfoBody::Hovered { lines },
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.body, InfoBody::Idle { .. })
    }
}
