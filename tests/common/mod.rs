#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{DynamicImage, Rgba, RgbaImage};
use log::Level;

use png_to_svg::config::ports::ConverterConfig;
use png_to_svg::facade::conversion_facade::ConversionFacade;
use png_to_svg::models::conversion::AttemptOutcome;
use png_to_svg::models::embed::EmbedInput;
use png_to_svg::models::trace::TracerSettings;
use png_to_svg::service::embed::EmbedService;
use png_to_svg::service::image::ImageService;
use png_to_svg::service::observer::ConversionObserver;
use png_to_svg::service::tracer::TracerService;
use png_to_svg::service::traits::i_service::{EmbedServiceTrait, TracerServiceTrait};

pub fn write_card_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if (x / 10 + y / 10) % 2 == 0 {
            Rgba([20, 20, 20, 255])
        } else {
            Rgba([240, 230, 200, 255])
        }
    });
    DynamicImage::ImageRgba8(img).save(path).unwrap();
}

pub fn write_corrupt_png(path: &Path) {
    fs::write(path, b"\x89PNG but then garbage bytes follow").unwrap();
}

/// 寫入可執行的替身追蹤工具腳本，參數為 `<input> -s -o <output> --flat --opaque`
#[cfg(unix)]
pub fn write_tracer_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub const TRACER_WRITES_SVG: &str =
    "test -f \"$1\" || exit 3\nprintf '<svg xmlns=\"http://www.w3.org/2000/svg\"><path d=\"M0 0h1v1z\"/></svg>' > \"$4\"";
pub const TRACER_FAILS: &str = "echo 'tracing exploded' >&2\nexit 1";
pub const TRACER_SILENT: &str = "exit 0";
pub const TRACER_HANGS: &str = "exec sleep 5";

pub fn config_for(input: &Path, output: &Path, program: Option<String>) -> ConverterConfig {
    let mut config = ConverterConfig::new(input, output);
    config.tracer = TracerSettings {
        program,
        timeout: Duration::from_secs(5),
    };
    config.no_progress = true;
    fs::create_dir_all(output).unwrap();
    config
}

pub fn missing_tracer() -> Option<String> {
    Some("png-to-svg-test-missing-tracer".to_string())
}

#[derive(Default)]
pub struct RecordingObserver {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingObserver {
    pub fn count(&self, level: Level) -> usize {
        self.entries.lock().unwrap().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl ConversionObserver for RecordingObserver {
    fn log(&self, level: Level, message: &str) {
        self.entries.lock().unwrap().push((level, message.to_string()));
    }
}

/// 計算呼叫次數的內嵌服務；`fail` 為 true 時一律回報失敗
pub struct CountingEmbed {
    pub calls: AtomicUsize,
    pub fail: bool,
    inner: EmbedService,
}

impl CountingEmbed {
    pub fn new(fail: bool) -> Self {
        CountingEmbed {
            calls: AtomicUsize::new(0),
            fail,
            inner: EmbedService::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbedServiceTrait for CountingEmbed {
    fn embed(&self, input: EmbedInput<'_>) -> AttemptOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return AttemptOutcome::failed(
                png_to_svg::models::conversion::FailureKind::FallbackFailure,
                "disk full",
            );
        }
        self.inner.embed(input)
    }
}

pub struct Harness {
    pub facade: ConversionFacade,
    pub observer: Arc<RecordingObserver>,
    pub embed: Arc<CountingEmbed>,
}

pub fn harness(config: ConverterConfig, failing_embed: bool) -> Harness {
    let tracer = TracerService::new(config.tracer.clone());
    harness_with_tracer(config, Arc::new(tracer), failing_embed)
}

pub fn harness_with_tracer(
    config: ConverterConfig,
    tracer: Arc<dyn TracerServiceTrait>,
    failing_embed: bool,
) -> Harness {
    let observer = Arc::new(RecordingObserver::default());
    let embed = Arc::new(CountingEmbed::new(failing_embed));
    let facade = ConversionFacade::new(
        config,
        Arc::new(ImageService::new()),
        tracer,
        embed.clone(),
        observer.clone(),
    );
    Harness { facade, observer, embed }
}

pub fn leftover_bitmaps(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().map_or(false, |e| e == "pbm"))
        .collect()
}
