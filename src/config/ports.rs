use std::io;
use std::path::PathBuf;
use std::time::Duration;
use crate::models::trace::TracerSettings;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(30);

// 轉換配置，啟動時驗證一次，整個執行期間不可變
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub workers: usize,
    pub tracer: TracerSettings,
    pub task_timeout: Duration,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub no_progress: bool,
}

impl ConverterConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        ConverterConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            workers: DEFAULT_WORKERS,
            tracer: TracerSettings::default(),
            task_timeout: DEFAULT_TASK_TIMEOUT,
            include: vec!["*.png".to_string()],
            exclude: Vec::new(),
            no_progress: false,
        }
    }
}

// 配置來源的 Port
pub trait ConfigPort {
    fn get_config(&self) -> io::Result<ConverterConfig>;
}
