use crate::core::Step;
use regex::Regex;
use std::sync::LazyLock;

pub const EMAIL_FIELD: &str = "email";
pub const PHONE_FIELD: &str = "phone";
pub const TERMS_FIELD: &str = "agreeTerms";
pub const FIRST_NAME_FIELD: &str = "firstName";
pub const LAST_NAME_FIELD: &str = "lastName";
pub const CARD_NUMBER_FIELD: &str = "cardNumber";
pub const EXPIRY_FIELD: &str = "expiryDate";
pub const CVV_FIELD: &str = "cvv";
pub const CARD_NAME_FIELD: &str = "cardName";

/// 只有選擇信用卡付款時才顯示的欄位
pub const CARD_DETAIL_FIELDS: [&str; 4] = [CARD_NUMBER_FIELD, EXPIRY_FIELD, CVV_FIELD, CARD_NAME_FIELD];

pub const TERMS_ALERT: &str = "Please agree to the Terms & Conditions to continue.";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("valid phone regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// 先移除空白再比對
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_RE.is_match(&compact)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub id: String,
    pub step: Step,
    pub required: bool,
    /// 目前是否呈現給使用者；隱藏欄位不做必填檢查
    pub applicable: bool,
    pub value: String,
}

impl FormField {
    pub fn required(id: &str, step: Step) -> Self {
        Self {
            id: id.to_string(),
            step,
            required: true,
            applicable: true,
            value: String::new(),
        }
    }

    pub fn optional(id: &str, step: Step) -> Self {
        Self {
            required: false,
            ..Self::required(id, step)
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.applicable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermsCheckbox {
    pub checked: bool,
    pub applicable: bool,
}

/// 表單的目前快照：包含哪些步驟、各欄位的值與是否顯示
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    steps: Vec<Step>,
    fields: Vec<FormField>,
    terms: Option<TermsCheckbox>,
}

impl CheckoutForm {
    pub fn new(steps: &[Step]) -> Self {
        let mut steps = steps.to_vec();
        steps.sort();
        steps.dedup();
        Self {
            steps,
            fields: Vec::new(),
            terms: None,
        }
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_terms(mut self, checked: bool) -> Self {
        self.terms = Some(TermsCheckbox {
            checked,
            applicable: true,
        });
        self
    }

    pub fn has_step(&self, step: Step) -> bool {
        self.steps.contains(&step)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.field(id).map(|f| f.value.as_str())
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn terms(&self) -> Option<TermsCheckbox> {
        self.terms
    }

    /// 表單沒有條款勾選框時不做任何事
    pub fn set_terms_agreed(&mut self, checked: bool) {
        if let Some(terms) = self.terms.as_mut() {
            terms.checked = checked;
        }
    }

    pub fn set_applicable(&mut self, id: &str, applicable: bool) {
        if id == TERMS_FIELD {
            if let Some(terms) = self.terms.as_mut() {
                terms.applicable = applicable;
            }
        } else if let Some(field) = self.field_mut(id) {
            field.applicable = applicable;
        }
    }

    fn applicable_field(&self, id: &str) -> Option<&FormField> {
        self.field(id).filter(|f| f.applicable)
    }
}

/// 單一步驟的驗證結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepValidation {
    pub step: Step,
    pub invalid_fields: Vec<String>,
    /// 未勾選條款，需要阻斷式提示
    pub terms_rejected: bool,
}

impl StepValidation {
    fn vacuous(step: Step) -> Self {
        Self {
            step,
            invalid_fields: Vec::new(),
            terms_rejected: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_fields.is_empty() && !self.terms_rejected
    }

    fn flag(&mut self, id: &str) {
        if !self.invalid_fields.iter().any(|f| f == id) {
            self.invalid_fields.push(id.to_string());
        }
    }
}

pub fn validate_step(form: &CheckoutForm, step: Step) -> StepValidation {
    let mut result = StepValidation::vacuous(step);

    if !form.has_step(step) {
        tracing::debug!("{} not present in form, considering valid", step);
        return result;
    }

    for field in form.fields().iter().filter(|f| f.step == step && f.required) {
        if !field.applicable {
            tracing::debug!("Skipping validation for hidden field: {}", field.id);
            continue;
        }
        if field.value.trim().is_empty() {
            tracing::debug!("Validation failed for {}: empty value", field.id);
            result.flag(&field.id);
        }
    }

    match step {
        Step::Contact => {
            if let Some(email) = form.applicable_field(EMAIL_FIELD) {
                if !is_valid_email(&email.value) {
                    tracing::debug!("Email validation failed");
                    result.flag(EMAIL_FIELD);
                }
            }
            if let Some(phone) = form.applicable_field(PHONE_FIELD) {
                if !is_valid_phone(&phone.value) {
                    tracing::debug!("Phone validation failed");
                    result.flag(PHONE_FIELD);
                }
            }
        }
        Step::Review => {
            if let Some(terms) = form.terms().filter(|t| t.applicable) {
                if !terms.checked {
                    tracing::debug!("Terms agreement validation failed");
                    result.terms_rejected = true;
                    result.flag(TERMS_FIELD);
                }
            }
        }
        Step::Payment => {}
    }

    tracing::debug!("{} validation: {}", step, result.is_valid());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact_form(email: &str, phone: &str) -> CheckoutForm {
        CheckoutForm::new(&[Step::Contact, Step::Review])
            .with_field(FormField::required(FIRST_NAME_FIELD, Step::Contact).with_value("Jane"))
            .with_field(FormField::required(EMAIL_FIELD, Step::Contact).with_value(email))
            .with_field(FormField::required(PHONE_FIELD, Step::Contact).with_value(phone))
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("jane@example.co.uk"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_phone_shape() {
        assert!(is_valid_phone("+44 7700 900123"));
        assert!(is_valid_phone("1"));
        assert!(!is_valid_phone("07700900123"));
        assert!(!is_valid_phone("+4477009001234567890"));
        // 最多 16 位數字
        assert!(is_valid_phone("1234567890123456"));
        assert!(is_valid_phone("+1234567890123456"));
        assert!(!is_valid_phone("12345678901234567"));
        assert!(!is_valid_phone("phone"));
    }

    #[test]
    fn test_empty_required_fields_are_flagged() {
        let form = contact_form("", "   ");
        let result = validate_step(&form, Step::Contact);

        assert!(!result.is_valid());
        assert_eq!(result.invalid_fields, vec![EMAIL_FIELD.to_string(), PHONE_FIELD.to_string()]);
    }

    #[test]
    fn test_contact_step_checks_formats() {
        assert!(validate_step(&contact_form("jane@example.com", "+447700900123"), Step::Contact).is_valid());

        let result = validate_step(&contact_form("jane@", "+447700900123"), Step::Contact);
        assert_eq!(result.invalid_fields, vec![EMAIL_FIELD.to_string()]);
    }

    #[test]
    fn test_terms_toggle_without_checkbox_keeps_review_valid() {
        let mut form = CheckoutForm::new(&[Step::Review]);
        form.set_terms_agreed(false);

        assert_eq!(form.terms(), None);
        assert!(validate_step(&form, Step::Review).is_valid());
    }

    #[test]
    fn test_hidden_required_fields_are_exempt() {
        let form = CheckoutForm::new(&[Step::Payment])
            .with_field(FormField::required(CARD_NUMBER_FIELD, Step::Payment).hidden())
            .with_field(FormField::optional("promoCode", Step::Payment));
        assert!(validate_step(&form, Step::Payment).is_valid());
    }

    #[test]
    fn test_absent_step_is_vacuously_valid() {
        let form = contact_form("", "");
        assert!(validate_step(&form, Step::Payment).is_valid());
    }

    #[test]
    fn test_review_requires_terms() {
        let mut form = CheckoutForm::new(&[Step::Review])
            .with_field(FormField::required("billingPostcode", Step::Review).with_value("SW1A 1AA"))
            .with_terms(false);

        let result = validate_step(&form, Step::Review);
        assert!(result.terms_rejected);
        assert_eq!(result.invalid_fields, vec![TERMS_FIELD.to_string()]);

        form.set_terms_agreed(true);
        assert!(validate_step(&form, Step::Review).is_valid());
    }

    #[test]
    fn test_hidden_terms_checkbox_is_exempt() {
        let mut form = CheckoutForm::new(&[Step::Review]).with_terms(false);
        form.set_applicable(TERMS_FIELD, false);
        assert!(validate_step(&form, Step::Review).is_valid());
    }
}
