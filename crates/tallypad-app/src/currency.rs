// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Currency table and conversions between backend amounts and the strings a
//! user sees or types.
//!
//! Backend amounts are integers in hundredths of the major unit for every
//! currency. Display values honour the currency's own decimal count, so a
//! zero-decimal currency rounds the hundredths away.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const BACKEND_DECIMALS: u32 = 2;

/// Fixed-point scale used when comparing typed values against limits.
pub const MICROS_DECIMALS: u32 = 6;

const DEFAULT_DECIMALS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

const CURRENCIES: [CurrencyInfo; 16] = [
    CurrencyInfo { code: "USD", symbol: "$", decimals: 2 },
    CurrencyInfo { code: "EUR", symbol: "€", decimals: 2 },
    CurrencyInfo { code: "GBP", symbol: "£", decimals: 2 },
    CurrencyInfo { code: "CAD", symbol: "CA$", decimals: 2 },
    CurrencyInfo { code: "AUD", symbol: "A$", decimals: 2 },
    CurrencyInfo { code: "NZD", symbol: "NZ$", decimals: 2 },
    CurrencyInfo { code: "INR", symbol: "₹", decimals: 2 },
    CurrencyInfo { code: "MXN", symbol: "MX$", decimals: 2 },
    CurrencyInfo { code: "CHF", symbol: "CHF", decimals: 2 },
    CurrencyInfo { code: "JPY", symbol: "¥", decimals: 0 },
    CurrencyInfo { code: "KRW", symbol: "₩", decimals: 0 },
    CurrencyInfo { code: "VND", symbol: "₫", decimals: 0 },
    CurrencyInfo { code: "CLP", symbol: "CLP", decimals: 0 },
    CurrencyInfo { code: "BHD", symbol: "BHD", decimals: 3 },
    CurrencyInfo { code: "KWD", symbol: "KWD", decimals: 3 },
    CurrencyInfo { code: "OMR", symbol: "OMR", decimals: 3 },
];

/// ISO-4217 style currency code, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn usd() -> Self {
        Self("USD".to_owned())
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return None;
        }
        Some(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn info(&self) -> Option<&'static CurrencyInfo> {
        CURRENCIES.iter().find(|info| info.code == self.0)
    }

    /// Decimal places shown for this currency; unknown codes use two.
    pub fn decimals(&self) -> u8 {
        self.info().map_or(DEFAULT_DECIMALS, |info| info.decimals)
    }

    pub fn symbol(&self) -> &str {
        self.info().map_or(self.0.as_str(), |info| info.symbol)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid currency code {value:?}"))
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

/// Backend amount expressed in the currency's own minor units, rounded half
/// away from zero when the currency has fewer than two decimals.
pub fn to_frontend_minor_units(backend_amount: i64, currency: &Currency) -> i64 {
    rescale(backend_amount, BACKEND_DECIMALS, u32::from(currency.decimals()))
}

/// Plain editable string for a backend amount (`1234` USD -> `"12.34"`).
pub fn to_frontend_string(backend_amount: i64, currency: &Currency) -> String {
    let decimals = u32::from(currency.decimals());
    let minor = to_frontend_minor_units(backend_amount, currency);
    let (sign, digits) = split_minor_units(minor, decimals);
    match digits.1 {
        Some(fraction) => format!("{sign}{}.{fraction}", digits.0),
        None => format!("{sign}{}", digits.0),
    }
}

/// User-facing string with symbol and grouping (`123456` USD -> `"$1,234.56"`).
pub fn to_display_string(backend_amount: i64, currency: &Currency) -> String {
    let decimals = u32::from(currency.decimals());
    let minor = to_frontend_minor_units(backend_amount, currency);
    let (sign, (whole, fraction)) = split_minor_units(minor, decimals);
    let grouped = group_thousands(&whole);
    let symbol = currency.symbol();
    let separator = if symbol.chars().all(|ch| ch.is_ascii_alphabetic()) {
        "\u{a0}"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{symbol}{separator}{grouped}.{fraction}"),
        None => format!("{sign}{symbol}{separator}{grouped}"),
    }
}

/// Same comparison scale as [`parse_micros`] for a backend amount after it has
/// been rounded to the currency's decimals.
pub fn backend_to_micros(backend_amount: i64, currency: &Currency) -> i64 {
    let decimals = u32::from(currency.decimals());
    rescale(
        to_frontend_minor_units(backend_amount, currency),
        decimals,
        MICROS_DECIMALS,
    )
}

/// Parses a typed decimal (`"12"`, `"12."`, `"0.5"`) into millionths.
/// Returns `None` for anything that is not a plain non-negative decimal.
pub fn parse_micros(text: &str) -> Option<i64> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > MICROS_DECIMALS as usize
        || !whole.bytes().all(|byte| byte.is_ascii_digit())
        || !fraction.bytes().all(|byte| byte.is_ascii_digit())
    {
        return None;
    }

    let whole_value = if whole.is_empty() {
        0
    } else {
        whole.parse::<i64>().ok()?
    };
    let mut fraction_value = if fraction.is_empty() {
        0
    } else {
        fraction.parse::<i64>().ok()?
    };
    for _ in fraction.len()..MICROS_DECIMALS as usize {
        fraction_value *= 10;
    }
    whole_value
        .checked_mul(10_i64.pow(MICROS_DECIMALS))?
        .checked_add(fraction_value)
}

/// Backend amount (hundredths) for a typed decimal, rounded half up.
pub fn micros_to_backend(micros: i64) -> i64 {
    rescale(micros, MICROS_DECIMALS, BACKEND_DECIMALS)
}

fn rescale(value: i64, from_decimals: u32, to_decimals: u32) -> i64 {
    if to_decimals >= from_decimals {
        return value.saturating_mul(10_i64.pow(to_decimals - from_decimals));
    }
    let divisor = 10_i64.pow(from_decimals - to_decimals);
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder.abs() * 2 >= divisor {
        quotient + value.signum()
    } else {
        quotient
    }
}

fn split_minor_units(minor: i64, decimals: u32) -> (&'static str, (String, Option<String>)) {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    if decimals == 0 {
        return (sign, (abs.to_string(), None));
    }
    let scale = 10_u64.pow(decimals);
    let whole = abs / scale;
    let fraction = abs % scale;
    (
        sign,
        (
            whole.to_string(),
            Some(format!("{fraction:0width$}", width = decimals as usize)),
        ),
    )
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
