use crate::core::{BillingPeriod, Money, OrderItem};
use serde::Serialize;

/// 稅率 8.25%，以萬分比表示以避免浮點誤差
pub const TAX_RATE_BASIS_POINTS: i64 = 825;

const MONTHLY_SETUP_FEE: i64 = 99;
const MONTHLY_DISCOUNT: i64 = 100;
const PER_UNIT_SETUP_FEE: i64 = 25;

/// 訂單摘要的費用拆解
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricingBreakdown {
    /// 項目原價，畫面上的 "Subtotal" 列
    pub unit_price: Money,
    pub setup_fee: Money,
    pub discount: Money,
    /// 原價 + 設定費 - 折扣，月費項目低於 £1 時為負值
    pub taxable: Money,
    pub tax: Money,
    pub total: Money,
}

impl PricingBreakdown {
    pub fn subtotal_display(&self) -> String {
        self.unit_price.to_string()
    }

    pub fn setup_fee_display(&self) -> String {
        self.setup_fee.to_string()
    }

    /// 折扣為零時不顯示該列
    pub fn discount_display(&self) -> Option<String> {
        if self.discount == Money::ZERO {
            None
        } else {
            Some(format!("-{}", self.discount))
        }
    }

    pub fn tax_display(&self) -> String {
        self.tax.to_string()
    }

    pub fn total_display(&self) -> String {
        self.total.to_string()
    }
}

pub fn compute_breakdown(item: &OrderItem) -> PricingBreakdown {
    let (setup_fee, discount) = match item.billing_period() {
        BillingPeriod::Monthly => (MONTHLY_SETUP_FEE, MONTHLY_DISCOUNT),
        BillingPeriod::PerUnit => (PER_UNIT_SETUP_FEE, 0),
    };

    let pounds = item.unit_price.min(OrderItem::MAX_UNIT_PRICE) as i64;
    let unit_price = Money::from_pounds(pounds);
    let setup_fee = Money::from_pounds(setup_fee);
    let discount = Money::from_pounds(discount);
    let taxable = unit_price + setup_fee - discount;
    let tax = apply_tax(taxable);

    PricingBreakdown {
        unit_price,
        setup_fee,
        discount,
        taxable,
        tax,
        total: taxable + tax,
    }
}

/// 四捨五入到便士（half-up），負值依絕對值進位
fn apply_tax(amount: Money) -> Money {
    let pence = amount.pence();
    let rounded = (pence.abs() * TAX_RATE_BASIS_POINTS + 5_000) / 10_000;
    Money(pence.signum() * rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: u64, period: Option<&str>) -> OrderItem {
        OrderItem {
            kind: "pro".to_string(),
            display_name: "Elite Pro".to_string(),
            description: None,
            unit_price: price,
            period_marker: period.map(str::to_string),
            features: vec![],
        }
    }

    #[test]
    fn test_monthly_package_breakdown() {
        let breakdown = compute_breakdown(&item(599, Some("/month")));

        assert_eq!(breakdown.subtotal_display(), "£599.00");
        assert_eq!(breakdown.setup_fee_display(), "£99.00");
        assert_eq!(breakdown.discount_display().as_deref(), Some("-£100.00"));
        // 598 * 0.0825 = 49.335 -> 49.34
        assert_eq!(breakdown.tax_display(), "£49.34");
        assert_eq!(breakdown.total_display(), "£647.34");
    }

    #[test]
    fn test_per_unit_service_breakdown() {
        let breakdown = compute_breakdown(&item(80, Some("/session")));

        assert_eq!(breakdown.setup_fee, Money::from_pounds(25));
        assert_eq!(breakdown.discount, Money::ZERO);
        assert_eq!(breakdown.discount_display(), None);
        // 105 * 0.0825 = 8.6625 -> 8.66
        assert_eq!(breakdown.tax, Money(866));
        assert_eq!(breakdown.total, Money(11_366));
    }

    #[test]
    fn test_total_matches_formula_for_all_catalogue_prices() {
        for (price, period) in [(299, "/month"), (999, "/month"), (45, "/class"), (0, "/class")] {
            let b = compute_breakdown(&item(price, Some(period)));
            let expected_taxable = price as i64 * 100 + b.setup_fee.pence() - b.discount.pence();
            assert_eq!(b.taxable.pence(), expected_taxable);
            let exact = expected_taxable as f64 * 1.0825;
            assert!((b.total.pence() as f64 - exact).abs() <= 0.5);
        }
    }

    #[test]
    fn test_free_monthly_item_has_negative_total() {
        let breakdown = compute_breakdown(&item(0, Some("/month")));
        assert_eq!(breakdown.taxable, Money(-100));
        // -1.00 * 0.0825 = -0.0825 -> -0.08
        assert_eq!(breakdown.tax, Money(-8));
        assert_eq!(breakdown.total.pence(), -108);
        assert_eq!(breakdown.total_display(), "-£1.08");
    }

    #[test]
    fn test_negative_tax_rounds_half_away_from_zero() {
        // -0.40 * 0.0825 = -0.033 -> -0.03；-2.00 * 0.0825 = -0.165 -> -0.17
        assert_eq!(apply_tax(Money(-40)), Money(-3));
        assert_eq!(apply_tax(Money(-200)), Money(-17));
        assert_eq!(apply_tax(Money(200)), Money(17));
    }

    #[test]
    fn test_large_price_stays_exact() {
        let breakdown = compute_breakdown(&item(5_000_000_000, Some("/year")));
        assert_eq!(breakdown.taxable, Money::from_pounds(5_000_000_025));
        assert_eq!(breakdown.tax.pence(), (500_000_002_500 * 825 + 5_000) / 10_000);
    }

    #[test]
    fn test_breakdown_is_stable() {
        let pro = item(599, Some("/month"));
        assert_eq!(compute_breakdown(&pro), compute_breakdown(&pro));
    }
}
