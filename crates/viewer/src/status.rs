use serde::{Deserialize, Serialize};

pub const LOADING_MESSAGE: &str = "正在加载地图数据...";
pub const SUCCESS_MESSAGE: &str = "数据加载完成！请将鼠标悬停在地图上查看详细信息。";

/// The single user-visible status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Status {
    Loading,
    Success,
    Error(String),
}

impl Status {
    pub fn message(&self) -> &str {
        match self {
            Status::Loading => LOADING_MESSAGE,
            Status::Success => SUCCESS_MESSAGE,
            Status::Error(msg) => msg,
        }
    }

    /// CSS class used by the status element.
    pub fn kind(&self) -> &'static str {
        match self {
            Status::Loading => "loading",
            Status::Success => "success",
            Status::Error(_) => "error",
        }
    }
}
