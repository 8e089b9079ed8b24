use crate::core::{OrderItem, Result, MONTHLY_MARKER};
use url::form_urlencoded;

pub const DEFAULT_PACKAGE: &str = "pro";

const GENERIC_DESCRIPTION: &str = "Premium fitness service designed for excellence";
const DEFAULT_ICON: &str = "fas fa-dumbbell";

struct PackageDef {
    kind: &'static str,
    name: &'static str,
    price: u64,
    description: &'static str,
    features: [&'static str; 3],
}

const PACKAGES: [PackageDef; 3] = [
    PackageDef {
        kind: "starter",
        name: "Elite Starter",
        price: 299,
        description: "Perfect for fitness beginners",
        features: ["Gym Access", "Group Classes", "Basic Nutrition"],
    },
    PackageDef {
        kind: "pro",
        name: "Elite Pro",
        price: 599,
        description: "Everything you need to dominate your fitness goals",
        features: ["Personal Training", "Group Classes", "Recovery Sessions"],
    },
    PackageDef {
        kind: "champion",
        name: "Elite Champion",
        price: 999,
        description: "Ultimate elite experience with dedicated coach",
        features: ["Dedicated Coach", "VIP Access", "Performance Testing"],
    },
];

/// (kind, description, icon class)
const SERVICES: [(&str, &str, &str); 9] = [
    (
        "personal-training",
        "One-on-one elite coaching with world-class trainers",
        "fas fa-user-ninja",
    ),
    (
        "group-classes",
        "High-energy group workouts led by expert instructors",
        "fas fa-users",
    ),
    (
        "recovery-wellness",
        "Advanced recovery protocols using cutting-edge technology",
        "fas fa-spa",
    ),
    (
        "nutrition-coaching",
        "Science-based nutrition planning with metabolic testing",
        "fas fa-apple-alt",
    ),
    (
        "performance-testing",
        "Comprehensive biomechanical and physiological assessment",
        "fas fa-chart-line",
    ),
    (
        "mind-body-training",
        "Mental performance coaching and meditation practices",
        "fas fa-brain",
    ),
    ("starter", "Perfect for fitness beginners", "fas fa-dumbbell"),
    ("pro", "Everything you need to dominate your fitness goals", "fas fa-crown"),
    ("champion", "Ultimate elite experience with dedicated coach", "fas fa-trophy"),
];

/// 依方案代號取得內建方案，未知代號回退到 `pro`
pub fn package(kind: &str) -> OrderItem {
    let def = PACKAGES
        .iter()
        .find(|p| p.kind == kind)
        .or_else(|| PACKAGES.iter().find(|p| p.kind == DEFAULT_PACKAGE))
        .unwrap_or(&PACKAGES[1]);

    OrderItem {
        kind: def.kind.to_string(),
        display_name: def.name.to_string(),
        description: Some(def.description.to_string()),
        unit_price: def.price,
        period_marker: Some(MONTHLY_MARKER.to_string()),
        features: def.features.iter().map(|f| f.to_string()).collect(),
    }
}

pub fn default_item() -> OrderItem {
    package(DEFAULT_PACKAGE)
}

pub fn service_description(kind: &str) -> &'static str {
    SERVICES
        .iter()
        .find(|(k, _, _)| *k == kind)
        .map(|(_, description, _)| *description)
        .unwrap_or(GENERIC_DESCRIPTION)
}

pub fn icon_class(kind: &str) -> &'static str {
    SERVICES
        .iter()
        .find(|(k, _, _)| *k == kind)
        .map(|(_, _, icon)| *icon)
        .unwrap_or(DEFAULT_ICON)
}

/// 顯示用描述：項目自帶的描述優先
pub fn describe(item: &OrderItem) -> &str {
    item.description
        .as_deref()
        .unwrap_or_else(|| service_description(&item.kind))
}

/// 從結帳頁網址的查詢字串重建訂購項目。
///
/// 缺少 `type`/`name`/`price`，或價格開頭不是數字時，回退到預設的 Elite Pro 方案。
pub fn item_from_query(query: &str) -> OrderItem {
    let query = query.strip_prefix('?').unwrap_or(query);
    let param = |key: &str| -> Option<String> {
        form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    };

    let (Some(kind), Some(name), Some(raw_price)) = (param("type"), param("name"), param("price"))
    else {
        tracing::debug!("Checkout query incomplete, using default package");
        return default_item();
    };

    let Some(unit_price) = parse_leading_price(&raw_price) else {
        tracing::warn!("⚠️ Unusable price '{}' in checkout query, using default package", raw_price);
        return default_item();
    };

    let features = param("features")
        .map(|raw| parse_features(&raw))
        .unwrap_or_default();

    OrderItem {
        kind,
        display_name: name,
        description: None,
        unit_price,
        period_marker: param("period"),
        features,
    }
}

/// 取字串開頭的整數部分，例如 `"599abc"` -> 599；過大的值截到上限
fn parse_leading_price(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = unsigned.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let price = digits
        .parse::<u64>()
        .map_or(OrderItem::MAX_UNIT_PRICE, |p| p.min(OrderItem::MAX_UNIT_PRICE));
    if price == OrderItem::MAX_UNIT_PRICE {
        tracing::warn!("⚠️ Price '{}' capped at {}", raw, price);
    }
    Some(price)
}

fn parse_features(raw: &str) -> Vec<String> {
    match decode_features(raw) {
        Ok(features) => features,
        Err(e) => {
            tracing::warn!("⚠️ Ignoring malformed features parameter: {}", e);
            Vec::new()
        }
    }
}

/// 非字串元素轉成其 JSON 文字，例如 `1` -> `"1"`
fn decode_features(raw: &str) -> Result<Vec<String>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    Ok(values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

/// 由方案/服務頁導向結帳頁的網址
pub fn checkout_url(item: &OrderItem, checkout_page: &str, from_nested_page: bool, nested_dir: &str) -> String {
    let features = serde_json::to_string(&item.features).unwrap_or_else(|_| "[]".to_string());
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("type", &item.kind)
        .append_pair("name", &item.display_name)
        .append_pair("price", &item.unit_price.to_string())
        .append_pair("period", item.period_marker.as_deref().unwrap_or(""))
        .append_pair("features", &features)
        .finish();

    if from_nested_page {
        format!("{}?{}", checkout_page, query)
    } else {
        format!("{}{}?{}", nested_dir, checkout_page, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BillingPeriod;

    #[test]
    fn test_query_with_all_parameters() {
        let item = item_from_query(
            "?type=pro&name=Elite%20Pro&price=599&period=%2Fmonth&features=%5B%22Personal%20Training%22%5D",
        );
        assert_eq!(item.kind, "pro");
        assert_eq!(item.display_name, "Elite Pro");
        assert_eq!(item.unit_price, 599);
        assert_eq!(item.billing_period(), BillingPeriod::Monthly);
        assert_eq!(item.features, vec!["Personal Training".to_string()]);
        assert_eq!(describe(&item), "Everything you need to dominate your fitness goals");
    }

    #[test]
    fn test_missing_parameters_fall_back_to_pro() {
        for query in ["", "?type=pro", "?type=x&name=Y", "?type=x&name=&price=10"] {
            let item = item_from_query(query);
            assert_eq!(item.display_name, "Elite Pro");
            assert_eq!(item.unit_price, 599);
        }
    }

    #[test]
    fn test_non_numeric_price_falls_back_to_pro() {
        let item = item_from_query("type=yoga&name=Yoga&price=free");
        assert_eq!(item.display_name, "Elite Pro");

        let item = item_from_query("type=yoga&name=Yoga&price=-5");
        assert_eq!(item.unit_price, 599);
    }

    #[test]
    fn test_price_takes_leading_digits() {
        let item = item_from_query("type=group-classes&name=Group+Classes&price=45abc&period=%2Fclass");
        assert_eq!(item.unit_price, 45);
        assert_eq!(item.display_name, "Group Classes");
        assert_eq!(item.billing_period(), BillingPeriod::PerUnit);
        assert_eq!(describe(&item), "High-energy group workouts led by expert instructors");
    }

    #[test]
    fn test_malformed_features_are_dropped() {
        let item = item_from_query("type=pro&name=Pro&price=599&features=not-json");
        assert!(item.features.is_empty());
        assert_eq!(item.unit_price, 599);
    }

    #[test]
    fn test_mixed_feature_elements_are_kept() {
        let item = item_from_query("type=pro&name=Pro&price=599&features=%5B1%2C%22Gym%22%2Ctrue%5D");
        assert_eq!(item.features, vec!["1".to_string(), "Gym".to_string(), "true".to_string()]);
    }

    #[test]
    fn test_feature_decoding_reports_serialization_error() {
        let err = decode_features("{\"a\":1}").unwrap_err();
        assert!(matches!(err, crate::utils::error::CheckoutError::SerializationError(_)));
    }

    #[test]
    fn test_large_price_is_kept() {
        let item = item_from_query("type=corp&name=Corporate&price=5000000000&period=%2Fyear");
        assert_eq!(item.display_name, "Corporate");
        assert_eq!(item.unit_price, 5_000_000_000);

        let item = item_from_query("type=corp&name=Corporate&price=99999999999999999999999");
        assert_eq!(item.display_name, "Corporate");
        assert_eq!(item.unit_price, OrderItem::MAX_UNIT_PRICE);
    }

    #[test]
    fn test_unknown_package_key_uses_pro() {
        assert_eq!(package("platinum").display_name, "Elite Pro");
        assert_eq!(package("champion").unit_price, 999);
        assert_eq!(icon_class("champion"), "fas fa-trophy");
        assert_eq!(icon_class("kickboxing"), "fas fa-dumbbell");
        assert_eq!(service_description("kickboxing"), GENERIC_DESCRIPTION);
    }

    #[test]
    fn test_checkout_url_round_trips_through_query_parsing() {
        let starter = package("starter");
        let url = checkout_url(&starter, "checkout.html", false, "assets/pages/");
        assert!(url.starts_with("assets/pages/checkout.html?type=starter&name=Elite+Starter"));

        let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        let parsed = item_from_query(query);
        assert_eq!(parsed.display_name, starter.display_name);
        assert_eq!(parsed.unit_price, 299);
        assert_eq!(parsed.features, starter.features);
        assert_eq!(parsed.billing_period(), BillingPeriod::Monthly);
    }

    #[test]
    fn test_checkout_url_from_nested_page_is_relative() {
        let url = checkout_url(&default_item(), "checkout.html", true, "assets/pages/");
        assert!(url.starts_with("checkout.html?"));
    }
}
