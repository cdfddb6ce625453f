use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use log::debug;
use crate::error::ConvertResult;
use crate::models::conversion::{AttemptOutcome, FailureKind};
use crate::models::embed::EmbedInput;
use crate::service::traits::i_service::EmbedServiceTrait;

const SVG_TEMPLATE: &str = include_str!("../../assets/template/svg_template.svg");

/// 內嵌服務，將原圖以 data URI 包進只有一個 `<image>` 元素的 SVG
pub struct EmbedService;

impl EmbedService {
    pub fn new() -> Self {
        EmbedService
    }

    fn write_embedded(&self, input: &EmbedInput<'_>) -> ConvertResult<usize> {
        let (width, height) = input.image.dimensions();
        let png_base64 = input.image.to_png_base64()?;
        let svg_content = generate_svg_content(width, height, &png_base64);
        write_svg_file(&svg_content, &input.svg_path)?;
        Ok(svg_content.len())
    }
}

impl Default for EmbedService {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbedServiceTrait for EmbedService {
    fn embed(&self, input: EmbedInput<'_>) -> AttemptOutcome {
        match self.write_embedded(&input) {
            Ok(size) => {
                debug!("生成內嵌 SVG：{}，大小：{} 位元組", input.svg_path.display(), size);
                AttemptOutcome::succeeded()
            }
            Err(e) => AttemptOutcome::failed(FailureKind::FallbackFailure, e.to_string()),
        }
    }
}

/// 生成 SVG 內容，替換模板中的佔位符
pub fn generate_svg_content(width: u32, height: u32, png_base64: &str) -> String {
    SVG_TEMPLATE
        .replace("{{WIDTH}}", &width.to_string())
        .replace("{{HEIGHT}}", &height.to_string())
        .replace("{{PNG_BASE64}}", png_base64)
}

/// 將 SVG 內容寫入檔案
pub fn write_svg_file(svg_content: &str, output_path: &Path) -> io::Result<()> {
    let file = fs::File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(svg_content.as_bytes())?;
    writer.flush()?;
    Ok(())
}
