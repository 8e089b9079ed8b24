use crate::domain::model::{OrderReceipt, Step};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// UI 綁定層：控制器透過這個介面呈現結果，本身不依賴任何渲染技術
pub trait CheckoutHost: Send + Sync {
    fn show_step(&self, step: Step);

    /// 標記欄位錯誤；`clear_after` 之後外觀上應自動移除
    fn flag_invalid(&self, field: &str, clear_after: Duration);

    fn clear_invalid(&self, field: &str);

    /// 阻斷式提示（例如未勾選條款）
    fn alert(&self, message: &str);

    fn set_processing(&self, processing: bool);

    fn show_completion(&self, receipt: &OrderReceipt);

    fn hide_completion(&self);

    fn navigate(&self, location: &str);
}

#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// 取得站內相對路徑的 HTML 片段
    async fn fetch(&self, path: &str) -> Result<String>;
}

pub trait FragmentSink: Send + Sync {
    fn inject(&self, container: &str, html: &str);
}
