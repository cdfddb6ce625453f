use std::io;
use std::time::Instant;
use indicatif::{ProgressBar, ProgressStyle};
use regex::RegexSet;

pub fn setup_logging(log_level: &str, verbose: bool) -> io::Result<()> {
    let log_level_filter = if verbose {
        log::LevelFilter::Debug
    } else {
        match log_level {
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("日誌初始化失敗: {}", e)))
}

pub struct ProgressManager {
    pb: ProgressBar,
    no_progress: bool,
    start: Instant,
}

impl ProgressManager {
    pub fn new(total: u64, no_progress: bool) -> Self {
        let pb = if no_progress {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(total);
            let style = ProgressStyle::default_bar()
                .template("{msg} [{bar:40}] {pos}/{len} ETA: {eta_precise}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-");
            pb.set_style(style);
            pb
        };
        ProgressManager {
            pb,
            no_progress,
            start: Instant::now(),
        }
    }

    pub fn update(&self, settled: u64, failed: u64) {
        if self.no_progress {
            return;
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        let speed = if elapsed > 0.0 { settled as f64 / elapsed } else { 0.0 };
        self.pb.set_message(format!("轉換中（失敗 {} 個，速度：{:.1} 檔案/秒）", failed, speed));
        self.pb.set_position(settled);
    }

    pub fn finish(&self, converted: usize, total: usize) {
        if self.no_progress {
            return;
        }
        self.pb.finish_with_message(format!(
            "完成，成功 {}/{}，耗時 {:.1} 秒",
            converted,
            total,
            self.start.elapsed().as_secs_f64()
        ));
    }
}

pub fn create_progress_bar(total: u64, no_progress: bool) -> ProgressManager {
    ProgressManager::new(total, no_progress)
}

/// 將 `*.png` 之類的模式轉為不分大小寫、完整比對檔名的正規表示式
pub fn glob_to_regex(pattern: &str) -> String {
    format!("(?i)^{}$", regex::escape(pattern).replace("\\*", ".*"))
}

pub fn create_regex_sets(include: &[String], exclude: &[String]) -> (RegexSet, RegexSet) {
    let include_patterns: Vec<_> = include.iter().map(|p| glob_to_regex(p)).collect();
    let exclude_patterns: Vec<_> = exclude.iter().map(|p| glob_to_regex(p)).collect();

    let include_set = RegexSet::new(&include_patterns)
        .unwrap_or_else(|e| {
            log::warn!("無效的包含模式: {}，使用空集作為回退", e);
            RegexSet::empty()
        });

    let exclude_set = RegexSet::new(&exclude_patterns)
        .unwrap_or_else(|e| {
            log::warn!("無效的排除模式: {}，使用空集作為回退", e);
            RegexSet::empty()
        });

    (include_set, exclude_set)
}
