use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 單一檔案轉換過程中的錯誤，不會越過檔案邊界
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("無法解碼圖片 {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("圖片編碼失敗: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O 錯誤: {0}")]
    Io(#[from] io::Error),
}

pub type ConvertResult<T> = Result<T, ConvertError>;
