use std::fs;
use std::io;
use crate::config::config::validate_config;
use crate::config::ports::{ConfigPort, ConverterConfig};

// 配置服務，取得配置後統一驗證並建立輸出目錄
pub struct ConfigService {
    config_port: Box<dyn ConfigPort>,
}

impl ConfigService {
    pub fn new(config_port: Box<dyn ConfigPort>) -> Self {
        ConfigService { config_port }
    }

    pub fn get_config(&self) -> io::Result<ConverterConfig> {
        let config = self.config_port.get_config()?;
        validate_config(&config)?;
        fs::create_dir_all(&config.output_dir)?;
        log::debug!("使用配置：{:?}", config);
        Ok(config)
    }
}

// 預設配置適配器，只需輸入與輸出目錄
pub struct DefaultConfigAdapter {
    input: String,
    output: String,
}

impl DefaultConfigAdapter {
    pub fn new(input: String, output: String) -> Self {
        DefaultConfigAdapter { input, output }
    }
}

impl ConfigPort for DefaultConfigAdapter {
    fn get_config(&self) -> io::Result<ConverterConfig> {
        Ok(ConverterConfig::new(&self.input, &self.output))
    }
}
