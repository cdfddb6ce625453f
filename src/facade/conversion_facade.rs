use std::collections::HashSet;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use crate::config::ports::ConverterConfig;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::conversion::{
    AttemptOutcome, BatchReport, ConversionMethod, ConversionRequest, ConversionResult, FailureKind,
};
use crate::models::embed::EmbedInput;
use crate::models::trace::TraceInput;
use crate::service::embed::EmbedService;
use crate::service::image::{ImageService, LoadedImage};
use crate::service::observer::{ConversionObserver, LogObserver};
use crate::service::tracer::TracerService;
use crate::service::traits::i_service::{EmbedServiceTrait, ImageServiceTrait, TracerServiceTrait};
use crate::utils::file::collect_files;
use crate::utils::pool::{TaskOutcome, WorkerPool};
use crate::utils::utils::{create_progress_bar, create_regex_sets};

#[derive(Clone)]
pub struct ConversionFacade {
    config: Arc<ConverterConfig>,
    image_service: Arc<dyn ImageServiceTrait>,
    tracer_service: Arc<dyn TracerServiceTrait>,
    embed_service: Arc<dyn EmbedServiceTrait>,
    observer: Arc<dyn ConversionObserver>,
}

impl ConversionFacade {
    pub fn new(
        config: ConverterConfig,
        image_service: Arc<dyn ImageServiceTrait>,
        tracer_service: Arc<dyn TracerServiceTrait>,
        embed_service: Arc<dyn EmbedServiceTrait>,
        observer: Arc<dyn ConversionObserver>,
    ) -> Self {
        ConversionFacade {
            config: Arc::new(config),
            image_service,
            tracer_service,
            embed_service,
            observer,
        }
    }

    /// 使用正式服務與 `log` 觀察者
    pub fn with_defaults(config: ConverterConfig) -> Self {
        let tracer = TracerService::new(config.tracer.clone());
        Self::new(
            config,
            Arc::new(ImageService::new()),
            Arc::new(tracer),
            Arc::new(EmbedService::new()),
            Arc::new(LogObserver),
        )
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// 列舉待轉換的請求；檔名主幹重複者保留排序最前的一個，其餘列為失敗
    pub fn collect_requests(&self) -> io::Result<(Vec<ConversionRequest>, Vec<(PathBuf, FailureKind)>)> {
        let (include_set, exclude_set) = create_regex_sets(&self.config.include, &self.config.exclude);
        let files = collect_files(&self.config.input_dir, &include_set, &exclude_set)?;

        let mut seen = HashSet::new();
        let mut requests = Vec::with_capacity(files.len());
        let mut duplicates = Vec::new();
        for file in files {
            let request = ConversionRequest::new(&file, &self.config.output_dir);
            if seen.insert(request.stem().to_string()) {
                requests.push(request);
            } else {
                self.observer.warn(&format!(
                    "檔名主幹重複，略過 {}（{} 已由其他檔案使用）",
                    file.display(),
                    request.output().display()
                ));
                duplicates.push((file, FailureKind::DuplicateStem));
            }
        }
        Ok((requests, duplicates))
    }

    fn try_primary(&self, request: &ConversionRequest, image: &LoadedImage) -> AttemptOutcome {
        let input = TraceInput {
            image,
            bitmap_path: request.bitmap_path(),
            svg_path: request.output().to_path_buf(),
        };
        match self.tracer_service.trace(input) {
            Ok(outcome) => outcome,
            Err(e) => AttemptOutcome::failed(FailureKind::ToolFailure, e.to_string()),
        }
    }

    fn convert_inner(&self, request: &ConversionRequest) -> ConversionResult {
        let name = request.file_name();
        let output_name = request.output().file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();

        let image = match self.image_service.load(request.source()) {
            Ok(image) => image,
            Err(e) => {
                self.observer.error(&format!("✗ 轉換失敗：{}（{}）", name, e));
                return ConversionResult::failed(request.clone(), FailureKind::LoadError);
            }
        };

        let primary = self.try_primary(request, &image);
        if primary.success {
            self.observer.info(&format!("✓ 已轉換：{} -> {}（{}）", name, output_name, ConversionMethod::Primary));
            return ConversionResult::converted(request.clone(), ConversionMethod::Primary, None);
        }

        let trigger = primary.failure.unwrap_or(FailureKind::ToolFailure);
        self.observer.warn(&format!("{} 向量追蹤失敗（{}），改用內嵌轉換", name, trigger));
        if let Some(detail) = &primary.detail {
            self.observer.debug(detail);
        }

        let fallback = self.embed_service.embed(EmbedInput {
            image: &image,
            svg_path: request.output().to_path_buf(),
        });
        if fallback.success {
            self.observer.info(&format!("✓ 已轉換：{} -> {}（{}）", name, output_name, ConversionMethod::Fallback));
            return ConversionResult::converted(request.clone(), ConversionMethod::Fallback, Some(trigger));
        }

        self.observer.error(&format!(
            "✗ 轉換失敗：{}（{}）",
            name,
            fallback.detail.as_deref().unwrap_or("未知原因")
        ));
        ConversionResult::failed(request.clone(), fallback.failure.unwrap_or(FailureKind::FallbackFailure))
    }
}

impl ConversionFacadeTrait for ConversionFacade {
    fn convert_single(&self, request: &ConversionRequest) -> ConversionResult {
        match panic::catch_unwind(AssertUnwindSafe(|| self.convert_inner(request))) {
            Ok(result) => result,
            Err(_) => {
                self.observer.error(&format!("轉換 {} 時發生非預期錯誤", request.file_name()));
                ConversionResult::failed(request.clone(), FailureKind::TaskPanicked)
            }
        }
    }

    fn convert_batch(&self) -> io::Result<BatchReport> {
        let (requests, duplicates) = self.collect_requests()?;
        let total = requests.len() + duplicates.len();
        if total == 0 {
            self.observer.warn(&format!("在 {} 中找不到符合的 PNG 檔案", self.config.input_dir.display()));
            return Ok(BatchReport::empty());
        }
        self.observer.info(&format!("找到 {} 個 PNG 檔案待轉換", total));

        let mut report = BatchReport {
            total,
            converted: Vec::new(),
            failures: duplicates,
        };

        let pool = WorkerPool::new(self.config.workers, self.config.task_timeout)?;
        self.observer.debug(&format!(
            "使用 {} 個工作執行緒，任務逾時 {} 秒",
            pool.workers(),
            self.config.task_timeout.as_secs_f64()
        ));

        let progress = create_progress_bar(requests.len() as u64, self.config.no_progress);
        let facade = self.clone();
        let mut settled = 0u64;
        pool.run(
            requests.clone(),
            move |request: ConversionRequest| facade.convert_single(&request),
            |task| {
                let source = requests[task.index].source().to_path_buf();
                match task.outcome {
                    TaskOutcome::Completed(result) => match result.output {
                        Some(path) => report.converted.push(path),
                        None => report
                            .failures
                            .push((source, result.failure.unwrap_or(FailureKind::FallbackFailure))),
                    },
                    TaskOutcome::TimedOut => {
                        self.observer.error(&format!(
                            "任務逾時：{}（超過 {} 秒）",
                            source.display(),
                            self.config.task_timeout.as_secs_f64()
                        ));
                        report.failures.push((source, FailureKind::TaskTimeout));
                    }
                    TaskOutcome::Panicked(message) => {
                        self.observer.error(&format!("任務異常終止：{}（{}）", source.display(), message));
                        report.failures.push((source, FailureKind::TaskPanicked));
                    }
                }
                settled += 1;
                progress.update(settled, report.failures.len() as u64);
            },
        );

        progress.finish(report.converted.len(), total);
        self.observer.info(&format!("成功轉換 {}/{} 個檔案", report.converted.len(), total));
        Ok(report)
    }
}
