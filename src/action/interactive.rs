use dialoguer::{Confirm, Input};
use std::io;
use std::path::Path;
use crate::action::cli::run_conversion;
use crate::config::ports::{ConfigPort, ConverterConfig, DEFAULT_WORKERS};
use crate::service::config_service::{ConfigService, DefaultConfigAdapter};
use crate::utils::utils::setup_logging;

pub fn process_interactive_mode() -> io::Result<String> {
    println!("=== 歡迎使用互動模式 ===");
    setup_logging("info", false)?;
    let input = get_input_path()?;
    let output = get_output_path()?;
    let use_default_config = get_default_config_option()?;

    let config_port: Box<dyn ConfigPort> = if use_default_config {
        println!("使用預設配置：{} 個工作執行緒，優先使用 potrace", DEFAULT_WORKERS);
        Box::new(DefaultConfigAdapter::new(input, output))
    } else {
        Box::new(InteractiveConfigAdapter::new(input, output, get_workers()?, get_use_tracer()?))
    };

    let config = ConfigService::new(config_port).get_config()?;
    run_conversion(config)
}

pub fn get_default_config_option() -> io::Result<bool> {
    Confirm::new()
        .with_prompt("是否使用預設配置？（4 個工作執行緒、優先使用 potrace）")
        .default(true)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("預設配置選擇失敗: {}", e)))
}

pub fn get_input_path() -> io::Result<String> {
    Input::new()
        .with_prompt("請輸入 PNG 目錄路徑（例如：./cards/png）")
        .validate_with(|input: &String| -> Result<(), String> {
            if Path::new(input).is_dir() { Ok(()) } else { Err(format!("目錄 '{}' 不存在", input)) }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

pub fn get_output_path() -> io::Result<String> {
    Input::new()
        .with_prompt("輸入 SVG 輸出目錄（例如：./cards/svg，預設為 svg）")
        .default("svg".to_string())
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

pub fn get_workers() -> io::Result<usize> {
    Input::<usize>::new()
        .with_prompt("平行工作執行緒數")
        .default(DEFAULT_WORKERS)
        .validate_with(|n: &usize| -> Result<(), String> {
            if *n >= 1 { Ok(()) } else { Err("至少需要 1 個工作執行緒".to_string()) }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

pub fn get_use_tracer() -> io::Result<bool> {
    Confirm::new()
        .with_prompt("是否使用 potrace 進行向量追蹤？（否則一律內嵌原圖）")
        .default(true)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("追蹤工具選擇失敗: {}", e)))
}

// 互動配置適配器
pub struct InteractiveConfigAdapter {
    input: String,
    output: String,
    workers: usize,
    use_tracer: bool,
}

impl InteractiveConfigAdapter {
    pub fn new(input: String, output: String, workers: usize, use_tracer: bool) -> Self {
        InteractiveConfigAdapter { input, output, workers, use_tracer }
    }
}

impl ConfigPort for InteractiveConfigAdapter {
    fn get_config(&self) -> io::Result<ConverterConfig> {
        let mut config = ConverterConfig::new(&self.input, &self.output);
        config.workers = self.workers;
        if !self.use_tracer {
            config.tracer.program = None;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_applies_answers() {
        let config = InteractiveConfigAdapter::new("in".into(), "out".into(), 2, false)
            .get_config()
            .unwrap();
        assert_eq!(config.workers, 2);
        assert!(config.tracer.program.is_none());
        assert_eq!(config.include, vec!["*.png".to_string()]);
    }
}
