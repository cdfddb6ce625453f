use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use base64::{engine::general_purpose, write::EncoderWriter};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::imageops::{dither, BiLevel};
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, ImageFormat, ImageReader};
use log::{debug, warn};
use crate::error::{ConvertError, ConvertResult};
use crate::service::traits::i_service::ImageServiceTrait;

/// 超過此大小的 Base64 內容可能影響網頁載入
const MAX_BASE64_SIZE: usize = 1_000_000;

/// 已解碼的來源圖片
pub struct LoadedImage {
    path: PathBuf,
    image: DynamicImage,
}

impl LoadedImage {
    pub fn new(path: &Path, image: DynamicImage) -> Self {
        LoadedImage {
            path: path.to_path_buf(),
            image,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// 轉為 1 位元黑白圖（Floyd-Steinberg 抖色），樣本值 0 為黑、1 為白
    pub fn to_bitmap(&self) -> GrayImage {
        let mut luma = self.image.to_luma8();
        dither(&mut luma, &BiLevel);
        for pixel in luma.pixels_mut() {
            pixel.0[0] = u8::from(pixel.0[0] > 0);
        }
        luma
    }

    pub fn to_png_bytes(&self) -> ConvertResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }

    pub fn to_png_base64(&self) -> ConvertResult<String> {
        let png = self.to_png_bytes()?;
        Ok(encode_to_base64(&png, &self.path)?)
    }
}

/// 暫存檔案（點陣圖、工具輸出），離開作用域時自動刪除
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: &Path) -> Self {
        ScratchFile {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("已刪除暫存檔：{}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("刪除暫存檔 {} 失敗: {}", self.path.display(), e),
        }
    }
}

/// 將黑白圖寫成二進位 PBM（P4），回傳的守衛負責清除檔案
pub fn write_bitmap(bitmap: &GrayImage, path: &Path) -> ConvertResult<ScratchFile> {
    let guard = ScratchFile::new(path);
    let mut writer = BufWriter::new(File::create(path)?);
    PnmEncoder::new(&mut writer)
        .with_subtype(PnmSubtype::Bitmap(SampleEncoding::Binary))
        .write_image(bitmap.as_raw(), bitmap.width(), bitmap.height(), ExtendedColorType::L8)?;
    writer.flush()?;
    debug!("寫入暫存點陣圖：{}（{}x{}）", path.display(), bitmap.width(), bitmap.height());
    Ok(guard)
}

/// 將數據編碼為 Base64 格式
pub fn encode_to_base64(data: &[u8], file_path: &Path) -> io::Result<String> {
    let mut base64_buffer = Vec::new();
    {
        let mut encoder = EncoderWriter::new(&mut base64_buffer, &general_purpose::STANDARD);
        encoder.write_all(data)?;
        encoder.finish()?;
    }
    let encoded = String::from_utf8(base64_buffer)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if encoded.len() > MAX_BASE64_SIZE {
        warn!(
            "Base64 資料過大：{} 位元組，超過建議限制 {} 位元組，可能影響網頁載入：{}",
            encoded.len(), MAX_BASE64_SIZE, file_path.display()
        );
    }
    Ok(encoded)
}

/// 圖片讀取服務
pub struct ImageService;

impl ImageService {
    pub fn new() -> Self {
        ImageService
    }
}

impl Default for ImageService {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageServiceTrait for ImageService {
    fn load(&self, path: &Path) -> ConvertResult<LoadedImage> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let image = reader.decode().map_err(|source| ConvertError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("讀取圖片：{}，尺寸：{}x{}", path.display(), image.width(), image.height());
        Ok(LoadedImage::new(path, image))
    }
}
