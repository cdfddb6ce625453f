use std::io;
use std::path::Path;
use clap::Parser;
use crate::action::interactive::process_interactive_mode;
use crate::config::config::{parse_timeout, Cli};
use crate::config::ports::{ConfigPort, ConverterConfig};
use crate::facade::conversion_facade::ConversionFacade;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::conversion::BatchReport;
use crate::models::trace::TracerSettings;
use crate::service::config_service::ConfigService;
use crate::utils::utils::setup_logging;

/// 摘要中列出的檔案數上限
const SUMMARY_PREVIEW: usize = 5;

pub fn process_args(args: Vec<String>) -> io::Result<String> {
    if args.len() == 1 {
        process_interactive_mode()
    } else {
        process_cli_mode()
    }
}

pub fn process_cli_mode() -> io::Result<String> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level, cli.verbose)?;

    let config_service = ConfigService::new(Box::new(CliConfigAdapter::new(cli)));
    let config = config_service.get_config()?;
    run_conversion(config)
}

/// 執行批次轉換並輸出摘要，回傳輸出目錄
pub fn run_conversion(config: ConverterConfig) -> io::Result<String> {
    let facade = ConversionFacade::with_defaults(config);
    let report = facade.convert_batch()?;
    let config = facade.config();
    print!("{}", format_summary(&config.input_dir, &config.output_dir, &report));
    Ok(config.output_dir.display().to_string())
}

pub fn format_summary(input_dir: &Path, output_dir: &Path, report: &BatchReport) -> String {
    let rule = "=".repeat(50);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        "轉換完成".to_string(),
        rule,
        format!("輸入目錄：{}", input_dir.display()),
        format!("輸出目錄：{}", output_dir.display()),
        format!("成功轉換：{}/{}", report.converted.len(), report.total),
    ];

    let names: Vec<String> = report
        .converted
        .iter()
        .map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default())
        .collect();

    match names.first() {
        Some(first) => {
            lines.push(String::new());
            lines.push(format!("前 {} 個轉換的檔案：", SUMMARY_PREVIEW.min(names.len())));
            for name in names.iter().take(SUMMARY_PREVIEW) {
                lines.push(format!("  • {}", name));
            }
            if names.len() > SUMMARY_PREVIEW {
                lines.push(format!("  ... 還有 {} 個", names.len() - SUMMARY_PREVIEW));
            }
            lines.push(String::new());
            lines.push("SVG 檔案已可用於網頁！".to_string());
            lines.push(format!("在模板中使用：<img src=\"/cards/{}\" />", first));
        }
        None => {
            lines.push(String::new());
            lines.push("沒有任何檔案成功轉換，請查看日誌了解原因".to_string());
        }
    }

    let mut summary = lines.join("\n");
    summary.push('\n');
    summary
}

// CLI 配置適配器
pub struct CliConfigAdapter {
    cli: Cli,
}

impl CliConfigAdapter {
    pub fn new(cli: Cli) -> Self {
        CliConfigAdapter { cli }
    }
}

impl ConfigPort for CliConfigAdapter {
    fn get_config(&self) -> io::Result<ConverterConfig> {
        let tracer = TracerSettings {
            program: if self.cli.no_tracer { None } else { Some(self.cli.tracer.clone()) },
            timeout: parse_timeout(self.cli.tracer_timeout, "--tracer-timeout")?,
        };
        if self.cli.no_tracer {
            log::info!("已停用追蹤工具，所有檔案將使用內嵌轉換");
        }

        Ok(ConverterConfig {
            input_dir: self.cli.input_dir.clone().into(),
            output_dir: self.cli.output_dir.clone().into(),
            workers: self.cli.workers,
            tracer,
            task_timeout: parse_timeout(self.cli.task_timeout, "--task-timeout")?,
            include: self.cli.include.clone(),
            exclude: self.cli.exclude.clone().unwrap_or_default(),
            no_progress: self.cli.no_progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report_with(count: usize, total: usize) -> BatchReport {
        BatchReport {
            total,
            converted: (0..count).map(|i| PathBuf::from(format!("/out/card{}.svg", i))).collect(),
            failures: Vec::new(),
        }
    }

    #[test]
    fn summary_without_results_has_no_usage_hint() {
        let summary = format_summary(Path::new("in"), Path::new("out"), &report_with(0, 2));
        assert!(summary.contains("成功轉換：0/2"));
        assert!(!summary.contains("<img"));
    }

    #[test]
    fn summary_lists_first_five_and_hint() {
        let summary = format_summary(Path::new("in"), Path::new("out"), &report_with(7, 7));
        assert!(summary.contains("  • card4.svg"));
        assert!(!summary.contains("  • card5.svg"));
        assert!(summary.contains("... 還有 2 個"));
        assert!(summary.contains(r#"<img src="/cards/card0.svg" />"#));
    }

    #[test]
    fn cli_adapter_maps_flags() {
        let cli = Cli::parse_from([
            "png_to_svg", "in", "out", "--no-tracer", "--task-timeout", "5", "--exclude", "a*,b*",
        ]);
        let config = CliConfigAdapter::new(cli).get_config().unwrap();
        assert!(config.tracer.program.is_none());
        assert_eq!(config.task_timeout.as_secs(), 5);
        assert_eq!(config.exclude, vec!["a*".to_string(), "b*".to_string()]);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn cli_adapter_rejects_bad_timeout() {
        let cli = Cli::parse_from(["png_to_svg", "in", "out", "--tracer-timeout", "0"]);
        assert!(CliConfigAdapter::new(cli).get_config().is_err());
    }
}
