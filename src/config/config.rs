use clap::Parser;
use std::io;
use std::path::Path;
use std::time::Duration;
use crate::config::ports::ConverterConfig;

#[derive(Parser, Clone, Debug)]
#[command(
    name = "png_to_svg",
    about = "將 PNG 卡牌圖片批次轉換為網頁用 SVG",
    long_about = "將目錄中的 PNG 卡牌圖片批次轉換為 SVG。優先使用 potrace 產生真正的向量路徑，\n若工具不存在、逾時或失敗，改為將原圖以 Base64 內嵌於 SVG 中。\n\n範例：\n  png_to_svg cards/png/ cards/svg/\n  png_to_svg cards/png/ cards/svg/ --workers 8\n  png_to_svg cards/png/ cards/svg/ --verbose\n\n不帶任何參數執行時進入互動模式。",
    arg_required_else_help = true
)]
pub struct Cli {
    /// 含 PNG 檔案的輸入目錄
    pub input_dir: String,
    /// SVG 輸出目錄，不存在時自動建立
    pub output_dir: String,
    /// 平行轉換的工作執行緒數
    #[arg(short, long, default_value_t = 4)]
    pub workers: usize,
    /// 顯示除錯層級日誌
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
    /// 日誌層級（info、warn、error）；指定 --verbose 時一律為 debug
    #[arg(long, default_value = "info", value_parser = ["info", "warn", "error"])]
    pub log_level: String,
    /// 外部追蹤工具的執行檔名稱或路徑
    #[arg(long, default_value = "potrace")]
    pub tracer: String,
    /// 停用追蹤工具，一律使用內嵌轉換
    #[arg(long, default_value_t = false)]
    pub no_tracer: bool,
    /// 單次追蹤工具執行的逾時秒數
    #[arg(long, default_value_t = 10.0)]
    pub tracer_timeout: f64,
    /// 單一檔案轉換任務的逾時秒數
    #[arg(long, default_value_t = 30.0)]
    pub task_timeout: f64,
    /// 要轉換的檔名模式，以逗號分隔（不分大小寫）
    #[arg(long, default_value = "*.png", value_delimiter = ',')]
    pub include: Vec<String>,
    /// 要排除的檔名模式，以逗號分隔
    #[arg(long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,
    /// 不顯示進度條
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

pub fn validate_input_dir(input: &Path) -> io::Result<&Path> {
    if !input.exists() {
        log::error!("輸入目錄不存在：{}", input.display());
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("輸入目錄 '{}' 不存在", input.display())
        ));
    }
    if !input.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("輸入路徑 '{}' 不是目錄", input.display())
        ));
    }
    Ok(input)
}

pub fn is_valid_pattern(pattern: &str) -> bool {
    let invalid_chars = ['/', '\\', ':', '?', '"', '<', '>', '|'];
    !pattern.is_empty() && !pattern.contains(&invalid_chars[..])
}

pub fn validate_file_patterns(include: &[String], exclude: &[String]) -> io::Result<()> {
    if include.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "至少需要一個包含模式"));
    }
    for pattern in include {
        if !is_valid_pattern(pattern) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("無效的包含模式: {}", pattern)));
        }
    }
    for pattern in exclude {
        if !is_valid_pattern(pattern) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("無效的排除模式: {}", pattern)));
        }
    }
    Ok(())
}

pub fn parse_timeout(seconds: f64, name: &str) -> io::Result<Duration> {
    match Duration::try_from_secs_f64(seconds) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} 必須為正數秒數，收到：{}", name, seconds)
        )),
    }
}

pub fn validate_config(config: &ConverterConfig) -> io::Result<()> {
    validate_input_dir(&config.input_dir)?;
    validate_file_patterns(&config.include, &config.exclude)?;
    if config.workers == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "工作執行緒數必須至少為 1"));
    }
    if config.task_timeout.is_zero() || config.tracer.timeout.is_zero() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "逾時設定必須大於 0"));
    }
    Ok(())
}
