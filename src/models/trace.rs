use std::path::PathBuf;
use std::time::Duration;
use crate::service::image::LoadedImage;

pub struct TraceInput<'a> {
    pub image: &'a LoadedImage,
    pub bitmap_path: PathBuf,
    pub svg_path: PathBuf,
}

/// 追蹤工具設定，`program` 為 None 時代表停用
#[derive(Debug, Clone)]
pub struct TracerSettings {
    pub program: Option<String>,
    pub timeout: Duration,
}

impl Default for TracerSettings {
    fn default() -> Self {
        TracerSettings {
            program: Some("potrace".to_string()),
            timeout: Duration::from_secs(10),
        }
    }
}
