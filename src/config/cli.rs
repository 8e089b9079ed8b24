use crate::core::{CheckoutHost, FragmentSink, OrderReceipt, Step};
use std::time::Duration;

/// 把控制器的 UI 指令輸出到終端機
#[derive(Debug, Clone, Default)]
pub struct ConsoleHost;

impl CheckoutHost for ConsoleHost {
    fn show_step(&self, step: Step) {
        println!("➡️  Showing {}", step);
    }

    fn flag_invalid(&self, field: &str, clear_after: Duration) {
        println!("   ⚠️  {} is invalid (highlight clears after {:?})", field, clear_after);
    }

    fn clear_invalid(&self, field: &str) {
        tracing::debug!("Cleared error mark on {}", field);
    }

    fn alert(&self, message: &str) {
        println!("🔔 {}", message);
    }

    fn set_processing(&self, processing: bool) {
        if processing {
            println!("⏳ Processing payment...");
        }
    }

    fn show_completion(&self, receipt: &OrderReceipt) {
        println!(
            "🎉 Order {} confirmed: {} ({})",
            receipt.reference, receipt.item_name, receipt.total
        );
    }

    fn hide_completion(&self) {
        tracing::debug!("Completion dialog closed");
    }

    fn navigate(&self, location: &str) {
        println!("🔗 Redirecting to {}", location);
    }
}

/// 把片段內容印到標準輸出
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

impl FragmentSink for StdoutSink {
    fn inject(&self, container: &str, html: &str) {
        println!("<!-- #{} -->", container);
        println!("{}", html);
    }
}
