use crate::core::form::{CheckoutForm, FormField};
use crate::core::{PaymentMethod, Step};
use crate::utils::error::{CheckoutError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 表單測試資料：描述頁面上有哪些步驟、欄位與使用者輸入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormFile {
    pub steps: Vec<u8>,
    pub payment_method: Option<String>,
    /// 沒有設定代表頁面上沒有條款勾選框
    pub terms_agreed: Option<bool>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntry {
    pub id: String,
    pub step: u8,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub value: String,
}

fn default_true() -> bool {
    true
}

impl FormFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CheckoutError::FormError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method.as_deref().map(PaymentMethod::parse)
    }

    fn step(number: u8, context: &str) -> Result<Step> {
        Step::from_number(number).ok_or_else(|| CheckoutError::FormError {
            message: format!("{} refers to step {}, expected 1-3", context, number),
        })
    }

    pub fn to_form(&self) -> Result<CheckoutForm> {
        let steps = self
            .steps
            .iter()
            .map(|n| Self::step(*n, "steps"))
            .collect::<Result<Vec<_>>>()?;

        let mut form = CheckoutForm::new(&steps);
        for entry in &self.fields {
            let step = Self::step(entry.step, &format!("field '{}'", entry.id))?;
            if !form.has_step(step) {
                return Err(CheckoutError::FormError {
                    message: format!("field '{}' belongs to missing {}", entry.id, step),
                });
            }

            let mut field = if entry.required {
                FormField::required(&entry.id, step)
            } else {
                FormField::optional(&entry.id, step)
            };
            field.applicable = entry.visible;
            form = form.with_field(field.with_value(&entry.value));
        }

        if let Some(agreed) = self.terms_agreed {
            form = form.with_terms(agreed);
        }

        Ok(form)
    }
}
