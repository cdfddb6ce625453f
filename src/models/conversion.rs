use std::fmt;
use std::path::{Path, PathBuf};

/// 單一來源圖片的轉換請求，於列舉時建立，之後不可變
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    source: PathBuf,
    stem: String,
    output: PathBuf,
}

impl ConversionRequest {
    pub fn new(source: &Path, output_dir: &Path) -> Self {
        let stem = source
            .file_stem()
            .unwrap_or(std::ffi::OsStr::new("image"))
            .to_string_lossy()
            .to_string();
        let output = output_dir.join(format!("{}.svg", stem));
        ConversionRequest {
            source: source.to_path_buf(),
            stem,
            output,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// 追蹤工具使用的暫存點陣圖路徑，與輸出 SVG 同目錄同名
    pub fn bitmap_path(&self) -> PathBuf {
        self.output.with_extension("pbm")
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.stem.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMethod {
    Primary,
    Fallback,
    None,
}

impl fmt::Display for ConversionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionMethod::Primary => write!(f, "向量追蹤"),
            ConversionMethod::Fallback => write!(f, "內嵌點陣"),
            ConversionMethod::None => write!(f, "無"),
        }
    }
}

/// 預期中的失敗類型，以值回傳而非錯誤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    LoadError,
    ToolUnavailable,
    ToolTimeout,
    ToolFailure,
    FallbackFailure,
    TaskTimeout,
    TaskPanicked,
    DuplicateStem,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::LoadError => "無法讀取圖片",
            FailureKind::ToolUnavailable => "追蹤工具不可用",
            FailureKind::ToolTimeout => "追蹤工具逾時",
            FailureKind::ToolFailure => "追蹤工具執行失敗",
            FailureKind::FallbackFailure => "內嵌轉換失敗",
            FailureKind::TaskTimeout => "任務逾時",
            FailureKind::TaskPanicked => "任務異常終止",
            FailureKind::DuplicateStem => "檔名主幹重複",
        };
        write!(f, "{}", text)
    }
}

/// 單一轉換階段的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub success: bool,
    pub failure: Option<FailureKind>,
    pub detail: Option<String>,
}

impl AttemptOutcome {
    pub fn succeeded() -> Self {
        AttemptOutcome {
            success: true,
            failure: None,
            detail: None,
        }
    }

    pub fn failed(kind: FailureKind, detail: impl Into<String>) -> Self {
        AttemptOutcome {
            success: false,
            failure: Some(kind),
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub request: ConversionRequest,
    pub output: Option<PathBuf>,
    pub method: ConversionMethod,
    /// 失敗時為最終原因；改用內嵌成功時為觸發回退的追蹤失敗
    pub failure: Option<FailureKind>,
}

impl ConversionResult {
    pub fn converted(request: ConversionRequest, method: ConversionMethod, failure: Option<FailureKind>) -> Self {
        let output = Some(request.output().to_path_buf());
        ConversionResult {
            request,
            output,
            method,
            failure,
        }
    }

    pub fn failed(request: ConversionRequest, kind: FailureKind) -> Self {
        ConversionResult {
            request,
            output: None,
            method: ConversionMethod::None,
            failure: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    pub converted: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, FailureKind)>,
}

impl BatchReport {
    pub fn empty() -> Self {
        BatchReport::default()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}
