use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CURRENCY_SYMBOL: &str = "£";

/// 金額，以便士（1/100 英鎊）為單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_pounds(pounds: i64) -> Self {
        Money(pounds * 100)
    }

    pub fn pence(self) -> i64 {
        self.0
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}{}.{:02}", sign, CURRENCY_SYMBOL, abs / 100, abs % 100)
    }
}

/// 月費方案的標記字串，其他任何值都視為單次計費
pub const MONTHLY_MARKER: &str = "/month";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingPeriod {
    Monthly,
    PerUnit,
}

impl BillingPeriod {
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some(MONTHLY_MARKER) => BillingPeriod::Monthly,
            _ => BillingPeriod::PerUnit,
        }
    }
}

/// 結帳頁面上的訂購項目（方案或單項服務）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub kind: String,
    pub display_name: String,
    pub description: Option<String>,
    /// 整數英鎊，上限為 [`OrderItem::MAX_UNIT_PRICE`]
    pub unit_price: u64,
    /// 原始的計費標記，例如 `/month`、`/session`
    pub period_marker: Option<String>,
    pub features: Vec<String>,
}

impl OrderItem {
    /// 超過此值的價格會被截到上限，確保便士與稅額運算不溢位
    pub const MAX_UNIT_PRICE: u64 = 1_000_000_000_000;

    pub fn billing_period(&self) -> BillingPeriod {
        BillingPeriod::from_marker(self.period_marker.as_deref())
    }

    /// 顯示用的計費標籤；缺少時顯示 `/month`
    pub fn period_label(&self) -> &str {
        self.period_marker.as_deref().unwrap_or(MONTHLY_MARKER)
    }
}

/// 結帳表單的三個步驟
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Contact,
    Payment,
    Review,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Contact, Step::Payment, Step::Review];

    pub fn number(self) -> u8 {
        match self {
            Step::Contact => 1,
            Step::Payment => 2,
            Step::Review => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Step::Contact),
            2 => Some(Step::Payment),
            3 => Some(Step::Review),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Step::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Step::from_number)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step-{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckoutState {
    Editing(Step),
    Submitting,
    Completed,
}

/// 付款完成後顯示給使用者的收據
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub reference: String,
    pub item_name: String,
    pub total: Money,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Discover,
}

impl CardNetwork {
    pub fn name(self) -> &'static str {
        match self {
            CardNetwork::Visa => "visa",
            CardNetwork::Mastercard => "mastercard",
            CardNetwork::Amex => "amex",
            CardNetwork::Discover => "discover",
        }
    }

    pub fn icon_class(self) -> String {
        format!("fa-cc-{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    Paypal,
    Other(String),
}

impl PaymentMethod {
    pub fn parse(method: &str) -> Self {
        match method {
            "card" => PaymentMethod::Card,
            "paypal" => PaymentMethod::Paypal,
            other => PaymentMethod::Other(other.to_string()),
        }
    }
}
