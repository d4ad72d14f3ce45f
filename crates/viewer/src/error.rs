use formats::{ExportError, GeoJsonError, MergeError};
use thiserror::Error;

/// Every failure the viewer reports. The `Display` text is what the status
/// line shows.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error("地图数据加载失败: {0}")]
    Network(String),
    #[error("地图数据格式错误: {0}")]
    GeoData(#[from] GeoJsonError),
    #[error("导出失败: {0}")]
    Export(#[from] ExportError),
    #[error("配置无效: {0}")]
    Config(#[from] serde_json::Error),
    #[error("数据正在加载中，请稍候")]
    LoadInFlight,
    #[error("请先选择要上传的文件")]
    NoFilesQueued,
    #[error("文件 {file} 不包含 {column} 列")]
    KeyColumnNotFound { file: String, column: String },
    #[error("load {got} is not the active load (active: {expected:?})")]
    StaleLoad { expected: Option<u64>, got: u64 },
}
