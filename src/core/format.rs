//! Per-keystroke input formatting for the payment step.

use crate::core::CardNetwork;

const CARD_GROUP: usize = 4;
const CARD_MAX_DIGITS: usize = 16;

fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `4111111111111111` -> `4111 1111 1111 1111`
///
/// 少於 4 位數時原樣回傳數字；超過 16 位數只取前 16 位。
pub fn format_card_number(input: &str) -> String {
    let digits = digits_only(input);
    if digits.len() < CARD_GROUP {
        return digits;
    }

    let digits = &digits[..digits.len().min(CARD_MAX_DIGITS)];
    digits
        .as_bytes()
        .chunks(CARD_GROUP)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `1225` -> `12/25`
pub fn format_expiry(input: &str) -> String {
    let digits = digits_only(input);
    if digits.len() < 2 {
        return digits;
    }
    let year_end = digits.len().min(4);
    format!("{}/{}", &digits[..2], &digits[2..year_end])
}

pub fn format_cvv(input: &str) -> String {
    digits_only(input)
}

/// 只用來決定顯示哪個卡片圖示，不做卡號驗證
pub fn detect_card_network(number: &str) -> Option<CardNetwork> {
    let number: String = number.chars().filter(|c| !c.is_whitespace()).collect();

    if number.starts_with('4') {
        return Some(CardNetwork::Visa);
    }
    if ["51", "52", "53", "54", "55"].iter().any(|p| number.starts_with(p)) {
        return Some(CardNetwork::Mastercard);
    }
    if number.starts_with("34") || number.starts_with("37") {
        return Some(CardNetwork::Amex);
    }
    if number.starts_with("6011") || number.starts_with("65") {
        return Some(CardNetwork::Discover);
    }
    None
}
