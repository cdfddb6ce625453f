use std::io;
use crate::models::conversion::{BatchReport, ConversionRequest, ConversionResult};

// Facade 接口，負責協調單檔與批次轉換流程
pub trait ConversionFacadeTrait: Send + Sync {
    /// 轉換單一檔案：先嘗試追蹤工具，失敗時改用內嵌。
    /// 所有失敗都在檔案邊界內處理，只回傳結果不回傳錯誤。
    fn convert_single(&self, request: &ConversionRequest) -> ConversionResult;

    /// 轉換輸入目錄中所有符合的檔案
    /// # 回傳
    /// - 只有配置層級的錯誤（例如無法讀取輸入目錄）會返回 IO 錯誤
    fn convert_batch(&self) -> io::Result<BatchReport>;
}
