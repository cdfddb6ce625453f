use std::path::Path;
use crate::error::ConvertResult;
use crate::models::conversion::AttemptOutcome;
use crate::models::embed::EmbedInput;
use crate::models::trace::TraceInput;
use crate::service::image::LoadedImage;

// 圖片服務接口，負責讀取與解碼來源圖片
pub trait ImageServiceTrait: Send + Sync {
    /// 讀取並解碼圖片
    /// # 回傳
    /// - 無法解碼時返回 `ConvertError::Load`
    fn load(&self, path: &Path) -> ConvertResult<LoadedImage>;
}

// 追蹤服務接口，呼叫外部工具產生真正的向量 SVG
pub trait TracerServiceTrait: Send + Sync {
    /// 工具缺失、逾時、非零結束碼都以 `AttemptOutcome` 回傳，
    /// 只有非預期的 I/O 錯誤才會返回 Err
    fn trace(&self, input: TraceInput<'_>) -> ConvertResult<AttemptOutcome>;
}

// 內嵌服務接口，將原圖以 Base64 包進 SVG
pub trait EmbedServiceTrait: Send + Sync {
    /// 作為最後手段，任何失敗都轉為 `FallbackFailure`
    fn embed(&self, input: EmbedInput<'_>) -> AttemptOutcome;
}
