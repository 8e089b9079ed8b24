use crate::core::catalog;
use crate::core::form::{
    validate_step, CheckoutForm, StepValidation, CARD_DETAIL_FIELDS, CARD_NAME_FIELD,
    CARD_NUMBER_FIELD, CVV_FIELD, EXPIRY_FIELD, FIRST_NAME_FIELD, LAST_NAME_FIELD, TERMS_ALERT,
    TERMS_FIELD,
};
use crate::core::format::{detect_card_network, format_card_number, format_cvv, format_expiry};
use crate::core::pricing::{compute_breakdown, PricingBreakdown};
use crate::core::session::CheckoutSession;
use crate::core::{
    CardNetwork, CheckoutHost, CheckoutState, OrderItem, OrderReceipt, PaymentMethod, Step,
};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

/// 控制器的時間與導向設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// 模擬付款處理時間
    pub processing_delay: Duration,
    pub error_clear_delay: Duration,
    /// 關閉完成視窗後到導向服務頁之間的延遲
    pub redirect_delay: Duration,
    pub services_page: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            processing_delay: Duration::from_millis(3000),
            error_clear_delay: Duration::from_millis(3000),
            redirect_delay: Duration::from_millis(500),
            services_page: "service.html".to_string(),
        }
    }
}

/// 頁面載入時計算一次的訂單摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub item: OrderItem,
    pub description: String,
    pub icon_class: String,
    pub breakdown: PricingBreakdown,
}

impl OrderSummary {
    pub fn for_item(item: OrderItem) -> Self {
        let breakdown = compute_breakdown(&item);
        Self {
            description: catalog::describe(&item).to_string(),
            icon_class: catalog::icon_class(&item.kind).to_string(),
            breakdown,
            item,
        }
    }

    /// `£599`，方案卡片上不含小數
    pub fn price_display(&self) -> String {
        format!("{}{}", crate::core::CURRENCY_SYMBOL, self.item.unit_price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 驗證失敗，已跳回第一個不合格的步驟
    Rejected { step: Step },
    Completed(OrderReceipt),
    /// 已在送出中或已完成
    Ignored,
}

/// 單一欄位輸入後的結果，交給 UI 層回填
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub value: String,
    pub card_network: Option<CardNetwork>,
    /// 建議移動焦點到的欄位
    pub focus_next: Option<&'static str>,
    /// 自動帶入的持卡人姓名
    pub card_name: Option<String>,
}

pub struct CheckoutController<H: CheckoutHost> {
    host: H,
    form: CheckoutForm,
    session: CheckoutSession,
    summary: OrderSummary,
    settings: CheckoutSettings,
}

impl<H: CheckoutHost> CheckoutController<H> {
    pub fn new(item: OrderItem, form: CheckoutForm, host: H, settings: CheckoutSettings) -> Self {
        let summary = OrderSummary::for_item(item);
        tracing::info!(
            "🛒 Checkout for '{}' ({}), total {}",
            summary.item.display_name,
            summary.item.period_label(),
            summary.breakdown.total
        );

        let session = CheckoutSession::new(settings.error_clear_delay);
        host.show_step(session.current_step());

        Self {
            host,
            form,
            session,
            summary,
            settings,
        }
    }

    /// 由結帳頁網址的查詢字串建立
    pub fn from_query(query: &str, form: CheckoutForm, host: H, settings: CheckoutSettings) -> Self {
        Self::new(catalog::item_from_query(query), form, host, settings)
    }

    pub fn summary(&self) -> &OrderSummary {
        &self.summary
    }

    pub fn session(&self) -> &CheckoutSession {
        &self.session
    }

    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn state(&self) -> CheckoutState {
        self.session.state()
    }

    pub fn current_step(&self) -> Step {
        self.session.current_step()
    }

    /// 目前仍在顯示的錯誤欄位
    pub fn flagged_fields(&self) -> Vec<String> {
        self.session.field_errors().active(Instant::now())
    }

    /// 驗證目前步驟，通過才前進
    pub fn advance(&mut self) -> bool {
        let CheckoutState::Editing(step) = self.session.state() else {
            tracing::debug!("Ignoring advance while {:?}", self.session.state());
            return false;
        };

        let validation = validate_step(&self.form, step);
        if !self.report(&validation) {
            tracing::info!("⛔ {} has invalid fields: {:?}", step, validation.invalid_fields);
            return false;
        }

        if let Some(next) = self.present_step_after(step) {
            self.move_to(next);
        }
        true
    }

    pub fn retreat(&mut self) {
        let CheckoutState::Editing(step) = self.session.state() else {
            return;
        };

        if let Some(previous) = self.present_step_before(step) {
            self.move_to(previous);
        }
    }

    /// 驗證全部步驟後模擬付款；不會發出任何網路請求
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.session.is_editing() {
            tracing::debug!("Ignoring submit while {:?}", self.session.state());
            return SubmitOutcome::Ignored;
        }

        let results: Vec<StepValidation> = Step::ALL
            .iter()
            .map(|step| validate_step(&self.form, *step))
            .collect();

        let mut first_invalid = None;
        for result in &results {
            if !self.report(result) && first_invalid.is_none() {
                first_invalid = Some(result.step);
            }
        }

        if let Some(step) = first_invalid {
            tracing::warn!("❌ Submission rejected, returning to {}", step);
            self.move_to(step);
            return SubmitOutcome::Rejected { step };
        }

        tracing::info!("💳 All validations passed, processing payment...");
        self.session.set_state(CheckoutState::Submitting);
        self.host.set_processing(true);

        tokio::time::sleep(self.settings.processing_delay).await;

        self.host.set_processing(false);
        let receipt = self.receipt();
        self.session.set_state(CheckoutState::Completed);
        self.host.show_completion(&receipt);
        tracing::info!("✅ Order {} completed, total {}", receipt.reference, receipt.total);

        SubmitOutcome::Completed(receipt)
    }

    /// 關閉完成視窗，短暫延遲後導向服務頁
    pub async fn close_completion(&mut self) -> bool {
        if self.session.state() != CheckoutState::Completed {
            return false;
        }

        self.host.hide_completion();
        tokio::time::sleep(self.settings.redirect_delay).await;
        tracing::debug!("Redirecting to {}", self.settings.services_page);
        self.host.navigate(&self.settings.services_page);
        true
    }

    /// 套用輸入格式化並回傳 UI 應顯示的值；未知欄位回傳 `None`
    pub fn update_field(&mut self, id: &str, raw: &str) -> Option<FieldUpdate> {
        let value = match id {
            CARD_NUMBER_FIELD => format_card_number(raw),
            EXPIRY_FIELD => format_expiry(raw),
            CVV_FIELD => format_cvv(raw),
            _ => raw.to_string(),
        };

        let field = self.form.field_mut(id)?;
        field.value = value.clone();
        let required = field.required;

        if required && !value.trim().is_empty() {
            self.clear_mark(id);
        }

        let card_name = match id {
            FIRST_NAME_FIELD | LAST_NAME_FIELD => self.autofill_card_name(),
            _ => None,
        };

        let focus_next = match id {
            EXPIRY_FIELD if value.len() == 5 => Some(CVV_FIELD),
            CVV_FIELD if value.len() == 3 => Some(CARD_NAME_FIELD),
            _ => None,
        };

        let card_network = if id == CARD_NUMBER_FIELD {
            detect_card_network(&value)
        } else {
            None
        };

        Some(FieldUpdate {
            value,
            card_network,
            focus_next,
            card_name,
        })
    }

    /// 非信用卡付款時隱藏卡片欄位，使其免於必填檢查
    pub fn select_payment_method(&mut self, method: &PaymentMethod) {
        let show_card = *method == PaymentMethod::Card;
        for id in CARD_DETAIL_FIELDS {
            self.form.set_applicable(id, show_card);
            if !show_card {
                self.clear_mark(id);
            }
        }
        tracing::debug!("Payment method selected: {:?}", method);
    }

    pub fn set_terms_agreed(&mut self, agreed: bool) {
        self.form.set_terms_agreed(agreed);
        if agreed {
            self.clear_mark(TERMS_FIELD);
        }
    }

    fn autofill_card_name(&mut self) -> Option<String> {
        let first = self.form.value(FIRST_NAME_FIELD)?.trim().to_string();
        let last = self.form.value(LAST_NAME_FIELD)?.trim().to_string();
        if first.is_empty() || last.is_empty() {
            return None;
        }

        let full_name = format!("{} {}", first, last);
        let card_name = self.form.field_mut(CARD_NAME_FIELD)?;
        card_name.value = full_name.clone();
        Some(full_name)
    }

    /// 把驗證結果反映到 session 與 UI，回傳是否通過
    fn report(&mut self, validation: &StepValidation) -> bool {
        let now = Instant::now();
        let ttl = self.session.field_errors().ttl();

        for field in self.form.fields().iter().filter(|f| f.step == validation.step) {
            let still_invalid = validation.invalid_fields.contains(&field.id);
            if !still_invalid && self.session.field_errors().is_flagged(&field.id, now) {
                self.session.field_errors_mut().clear(&field.id);
                self.host.clear_invalid(&field.id);
            }
        }

        for field in &validation.invalid_fields {
            self.session.field_errors_mut().mark(field, now);
            self.host.flag_invalid(field, ttl);
        }

        if validation.terms_rejected {
            self.host.alert(TERMS_ALERT);
        }

        self.session.field_errors_mut().purge_expired(now);
        validation.is_valid()
    }

    fn clear_mark(&mut self, id: &str) {
        if self.session.field_errors().is_flagged(id, Instant::now()) {
            self.session.field_errors_mut().clear(id);
            self.host.clear_invalid(id);
        }
    }

    fn move_to(&mut self, step: Step) {
        self.session.set_state(CheckoutState::Editing(step));
        self.host.show_step(step);
        tracing::debug!("Showing {}", step);
    }

    fn present_step_after(&self, step: Step) -> Option<Step> {
        let mut candidate = step.next();
        while let Some(next) = candidate {
            if self.form.has_step(next) {
                return Some(next);
            }
            candidate = next.next();
        }
        None
    }

    fn present_step_before(&self, step: Step) -> Option<Step> {
        let mut candidate = step.previous();
        while let Some(previous) = candidate {
            if self.form.has_step(previous) {
                return Some(previous);
            }
            candidate = previous.previous();
        }
        None
    }

    fn receipt(&self) -> OrderReceipt {
        let completed_at = chrono::Utc::now();
        OrderReceipt {
            reference: format!("EF-{}", completed_at.format("%Y%m%d%H%M%S")),
            item_name: self.summary.item.display_name.clone(),
            total: self.summary.breakdown.total,
            completed_at,
        }
    }
}
