use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::job::{Salary, SalaryInterval};

// Multi-character symbols come first so `HK$` wins over `$`-less prefixes.
const CURRENCY_SYMBOLS: &[&str] = &[
    "د.إ", "HK$", "CHF", "A$", "C$", "S$", "RM", "$", "€", "£", "₹", "¥", "₽", "₺", "₴", "₦",
    "₩", "₫", "₱", "R", "฿", "৳", "₪",
];

const CURRENCY_CODES: &[&str] = &[
    "USD", "EUR", "GBP", "INR", "JPY", "CNY", "RUB", "TRY", "UAH", "NGN", "KRW", "VND", "PHP",
    "ZAR", "THB", "AED", "BDT", "ILS", "MYR", "BRL", "MXN", "SGD", "AUD", "CAD", "NZD",
];

#[derive(Debug, Clone, PartialEq)]
enum Currency {
    Symbol(String),
    Code(String),
}

impl Currency {
    fn label(&self) -> &str {
        match self {
            Currency::Symbol(s) | Currency::Code(s) => s,
        }
    }

    fn strip<'a>(&self, token: &'a str) -> std::borrow::Cow<'a, str> {
        let marker = match self {
            Currency::Symbol(s) => s.clone(),
            Currency::Code(c) => format!("{} ", c),
        };
        match token.find(&marker) {
            Some(idx) => {
                let mut out = String::with_capacity(token.len());
                out.push_str(&token[..idx]);
                out.push_str(&token[idx + marker.len()..]);
                std::borrow::Cow::Owned(out.trim().to_string())
            }
            None => std::borrow::Cow::Borrowed(token),
        }
    }
}

/// Extracts an amount range from free text such as
/// `"$200K - $240K    0.05% - 0.20%"`. Never fails: anything it cannot
/// read comes back as `None`.
pub fn parse_salary_range(text: &str) -> Salary {
    let parts: Vec<&str> = text.split('-').collect();
    if parts.len() < 2 {
        return Salary::default();
    }

    let min_token = parts[0].trim();
    // Only the first word of the upper bound; the rest is equity text.
    let max_token = parts[1].split_whitespace().next().unwrap_or("");

    let currency = detect_currency(min_token);

    Salary {
        min_amount: parse_amount(min_token, currency.as_ref()),
        max_amount: parse_amount(max_token, currency.as_ref()),
        currency: currency.map(|c| c.label().to_string()),
        interval: Some(SalaryInterval::Yearly),
        source: None,
    }
}

fn detect_currency(token: &str) -> Option<Currency> {
    if token.is_empty() {
        return None;
    }
    if let Some(symbol) = CURRENCY_SYMBOLS.iter().find(|s| token.starts_with(**s)) {
        return Some(Currency::Symbol(symbol.to_string()));
    }
    if token.contains(' ') {
        let code = token.split(' ').next().unwrap_or("");
        if CURRENCY_CODES.contains(&code) {
            return Some(Currency::Code(code.to_string()));
        }
    }
    None
}

fn parse_amount(token: &str, currency: Option<&Currency>) -> Option<Decimal> {
    if token.is_empty() {
        return None;
    }
    let stripped = match currency {
        Some(c) => c.strip(token),
        None => std::borrow::Cow::Borrowed(token),
    };
    let cleaned = stripped.trim();

    let (number, multiplier) = if let Some(idx) = cleaned.find('K') {
        (cleaned[..idx].trim().to_string(), Decimal::from(1_000))
    } else if let Some(idx) = cleaned.find('M') {
        (cleaned[..idx].trim().to_string(), Decimal::from(1_000_000))
    } else {
        let digits: String = cleaned
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if digits.is_empty() {
            return None;
        }
        (digits, Decimal::ONE)
    };

    match Decimal::from_str(&number) {
        Ok(value) => value.checked_mul(multiplier).or_else(|| {
            warn!(token = %token, "Salary amount out of range");
            None
        }),
        Err(_) => {
            warn!(token = %token, "Could not convert salary to a number");
            None
        }
    }
}
