use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use log::debug;
use crate::error::ConvertResult;
use crate::models::conversion::{AttemptOutcome, FailureKind};
use crate::models::trace::{TraceInput, TracerSettings};
use crate::service::image::{write_bitmap, ScratchFile};
use crate::service::traits::i_service::TracerServiceTrait;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 外部點陣追蹤工具（potrace）適配器
pub struct TracerService {
    settings: TracerSettings,
}

impl TracerService {
    pub fn new(settings: TracerSettings) -> Self {
        TracerService { settings }
    }

    fn run_tool(&self, program: &str, bitmap: &Path, svg: &Path) -> ConvertResult<AttemptOutcome> {
        // stderr 導向暫存檔，結束後由守衛刪除
        let stderr_log = ScratchFile::new(&bitmap.with_extension("log"));
        let stderr_file = File::create(stderr_log.path())?;

        let mut child = match Command::new(program)
            .arg(bitmap)
            .arg("-s")
            .arg("-o")
            .arg(svg)
            .arg("--flat")
            .arg("--opaque")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_file))
            .spawn()
        {
            Ok(child) => child,
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied) => {
                return Ok(AttemptOutcome::failed(
                    FailureKind::ToolUnavailable,
                    format!("找不到可執行的追蹤工具 {}: {}", program, e),
                ));
            }
            Err(e) => {
                return Ok(AttemptOutcome::failed(
                    FailureKind::ToolFailure,
                    format!("無法啟動追蹤工具 {}: {}", program, e),
                ));
            }
        };
        debug!("執行追蹤工具：{} {} -s -o {} --flat --opaque", program, bitmap.display(), svg.display());

        let outcome = match wait_with_timeout(&mut child, self.settings.timeout)? {
            None => AttemptOutcome::failed(
                FailureKind::ToolTimeout,
                format!("追蹤工具超過 {} 秒仍未完成", self.settings.timeout.as_secs_f64()),
            ),
            Some(status) if status.success() && svg.exists() => AttemptOutcome::succeeded(),
            Some(status) if status.success() => AttemptOutcome::failed(
                FailureKind::ToolFailure,
                "追蹤工具回報成功但未產生輸出檔案",
            ),
            Some(status) => {
                let stderr_text = fs::read_to_string(stderr_log.path()).unwrap_or_default();
                AttemptOutcome::failed(
                    FailureKind::ToolFailure,
                    format!("追蹤工具結束狀態 {}：{}", status, stderr_text.trim()),
                )
            }
        };
        Ok(outcome)
    }
}

/// 逾時回傳 Ok(None)，並確保子程序已被終止與回收
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                child.wait()?;
                return Ok(None);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

impl TracerServiceTrait for TracerService {
    fn trace(&self, input: TraceInput<'_>) -> ConvertResult<AttemptOutcome> {
        let Some(program) = self.settings.program.as_deref() else {
            return Ok(AttemptOutcome::failed(FailureKind::ToolUnavailable, "追蹤工具已停用"));
        };

        // 舊的輸出檔會讓「檔案存在」的判斷失準
        remove_if_exists(&input.svg_path)?;

        let bitmap = write_bitmap(&input.image.to_bitmap(), &input.bitmap_path)?;
        let outcome = self.run_tool(program, bitmap.path(), &input.svg_path)?;
        drop(bitmap);

        if !outcome.success {
            remove_if_exists(&input.svg_path)?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::image::LoadedImage;
    use image::{DynamicImage, RgbImage};
    use tempfile::tempdir;

    fn blank_image() -> LoadedImage {
        LoadedImage::new(Path::new("card.png"), DynamicImage::ImageRgb8(RgbImage::new(8, 8)))
    }

    #[test]
    fn disabled_tracer_is_unavailable() {
        let dir = tempdir().unwrap();
        let service = TracerService::new(TracerSettings {
            program: None,
            timeout: Duration::from_secs(1),
        });
        let image = blank_image();
        let outcome = service
            .trace(TraceInput {
                image: &image,
                bitmap_path: dir.path().join("card.pbm"),
                svg_path: dir.path().join("card.svg"),
            })
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.failure, Some(FailureKind::ToolUnavailable));
    }

    #[test]
    fn missing_binary_is_unavailable_and_cleans_bitmap() {
        let dir = tempdir().unwrap();
        let service = TracerService::new(TracerSettings {
            program: Some("definitely-not-a-real-tracer-binary".to_string()),
            timeout: Duration::from_secs(1),
        });
        let image = blank_image();
        let bitmap_path = dir.path().join("card.pbm");
        let outcome = service
            .trace(TraceInput {
                image: &image,
                bitmap_path: bitmap_path.clone(),
                svg_path: dir.path().join("card.svg"),
            })
            .unwrap();
        assert_eq!(outcome.failure, Some(FailureKind::ToolUnavailable));
        assert!(!bitmap_path.exists());
    }

    #[cfg(unix)]
    fn tool_script(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-tracer");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().to_string()
    }

    #[cfg(unix)]
    fn scratch_files(dir: &Path) -> Vec<std::path::PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().map_or(false, |e| e == "pbm" || e == "log"))
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn tool_stderr_is_captured_and_cleaned_up() {
        let dir = tempdir().unwrap();
        let tools = tempdir().unwrap();
        let service = TracerService::new(TracerSettings {
            program: Some(tool_script(tools.path(), "echo 'bad bitmap header' >&2\nexit 2")),
            timeout: Duration::from_secs(5),
        });
        let image = blank_image();
        let outcome = service
            .trace(TraceInput {
                image: &image,
                bitmap_path: dir.path().join("card.pbm"),
                svg_path: dir.path().join("card.svg"),
            })
            .unwrap();

        assert_eq!(outcome.failure, Some(FailureKind::ToolFailure));
        assert!(outcome.detail.unwrap().contains("bad bitmap header"));
        assert!(scratch_files(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn timeout_returns_even_when_a_grandchild_keeps_stderr_open() {
        let dir = tempdir().unwrap();
        let tools = tempdir().unwrap();
        let service = TracerService::new(TracerSettings {
            program: Some(tool_script(tools.path(), "sleep 5 &\necho started >&2\nexec sleep 5")),
            timeout: Duration::from_millis(300),
        });
        let image = blank_image();
        let start = Instant::now();
        let outcome = service
            .trace(TraceInput {
                image: &image,
                bitmap_path: dir.path().join("card.pbm"),
                svg_path: dir.path().join("card.svg"),
            })
            .unwrap();

        assert!(start.elapsed() < Duration::from_secs(3));
        assert_eq!(outcome.failure, Some(FailureKind::ToolTimeout));
        assert!(scratch_files(dir.path()).is_empty());
        assert!(!dir.path().join("card.svg").exists());
    }
}
