//! Checkout form validation: card number, expiry, CVV and email.
//!
//! Inputs are raw strings as typed; non-digits are stripped before the
//! numeric checks. Each validator's error `Display` is the message shown
//! under the field.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Card number is required")]
    CardNumberRequired,
    #[error("Invalid card number")]
    InvalidCardNumber,
    #[error("Expiry date is required")]
    ExpiryRequired,
    #[error("Enter a valid expiry date (MM/YY)")]
    ExpiryFormat,
    #[error("Invalid month (01-12)")]
    ExpiryMonth,
    #[error("Card has expired")]
    CardExpired,
    #[error("Invalid expiry year")]
    ExpiryYear,
    #[error("{name} is required")]
    CvvRequired { name: &'static str },
    #[error("{name} must be {expected} digits")]
    CvvLength { name: &'static str, expected: usize },
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Amex,
    Visa,
    Mastercard,
    Discover,
    Diners,
    Jcb,
}

// Checked in order; the first matching prefix wins.
static CARD_PREFIXES: LazyLock<Vec<(CardType, Regex)>> = LazyLock::new(|| {
    [
        (CardType::Amex, r"^3[47]"),
        (CardType::Visa, r"^4"),
        (CardType::Mastercard, r"^(5[1-5]|2[2-7])"),
        (CardType::Discover, r"^(6011|65|64[4-9])"),
        (CardType::Diners, r"^(30[0-5]|36|38)"),
        (CardType::Jcb, r"^35(2[89]|[3-8])"),
    ]
    .into_iter()
    .map(|(card_type, prefix)| {
        (card_type, Regex::new(prefix).expect("card prefix pattern is valid"))
    })
    .collect()
});

/// Longest card number accepted while typing.
pub const MAX_CARD_DIGITS: usize = 19;

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Amex => "amex",
            CardType::Visa => "visa",
            CardType::Mastercard => "mastercard",
            CardType::Discover => "discover",
            CardType::Diners => "diners",
            CardType::Jcb => "jcb",
        }
    }

    pub fn valid_lengths(&self) -> &'static [usize] {
        match self {
            CardType::Amex => &[15],
            CardType::Visa => &[16, 18, 19],
            CardType::Diners => &[14],
            CardType::Mastercard | CardType::Discover | CardType::Jcb => &[16],
        }
    }

    /// Expected security-code length.
    pub fn cvv_length(&self) -> usize {
        match self {
            CardType::Amex => 4,
            _ => 3,
        }
    }

    /// Digit positions a space is inserted before.
    pub fn gaps(&self) -> &'static [usize] {
        match self {
            CardType::Amex | CardType::Diners => &[4, 10],
            _ => &[4, 8, 12],
        }
    }
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Card brand from the number's prefix.
pub fn detect_card_type(number: &str) -> Option<CardType> {
    let clean = digits(number);
    CARD_PREFIXES
        .iter()
        .find(|(_, prefix)| prefix.is_match(&clean))
        .map(|(card_type, _)| *card_type)
}

/// Group digits with spaces at the brand's gap positions; unknown
/// brands are grouped in fours. Digits past `MAX_CARD_DIGITS` are dropped.
pub fn format_card_number(value: &str, card_type: Option<CardType>) -> String {
    let clean: String = digits(value).chars().take(MAX_CARD_DIGITS).collect();
    let gaps: &[usize] = match card_type {
        Some(card_type) => card_type.gaps(),
        None => &[4, 8, 12, 16],
    };
    let mut formatted = String::with_capacity(clean.len() + gaps.len());
    for (i, c) in clean.chars().enumerate() {
        if i > 0 && gaps.contains(&i) {
            formatted.push(' ');
        }
        formatted.push(c);
    }
    formatted
}

/// Luhn checksum. False for anything but ASCII digits.
pub fn luhn_valid(clean: &str) -> bool {
    if !clean.bytes().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let mut sum = 0;
    for (i, c) in clean.bytes().rev().enumerate() {
        let mut digit = u32::from(c - b'0');
        if i % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

pub fn validate_card_number(number: &str) -> Result<CardType, ValidationError> {
    let clean = digits(number);
    if clean.is_empty() {
        return Err(ValidationError::CardNumberRequired);
    }
    let card_type = detect_card_type(&clean).ok_or(ValidationError::InvalidCardNumber)?;
    if !card_type.valid_lengths().contains(&clean.len()) || !luhn_valid(&clean) {
        return Err(ValidationError::InvalidCardNumber);
    }
    Ok(card_type)
}

/// Format up to four digits as `MM/YY`.
pub fn format_expiry(value: &str) -> String {
    let clean: String = digits(value).chars().take(4).collect();
    if clean.len() >= 2 {
        format!("{}/{}", &clean[..2], &clean[2..])
    } else {
        clean
    }
}

/// Validate an `MM/YY` expiry against the current month.
///
/// Two-digit years 00-49 are 2000-2049, 50-99 are 1950-1999. Cards more
/// than twenty years out are rejected.
pub fn validate_expiry(
    value: &str,
    current_year: u32,
    current_month: u32,
) -> Result<(u32, u32), ValidationError> {
    let clean = digits(value);
    if clean.is_empty() {
        return Err(ValidationError::ExpiryRequired);
    }
    if clean.len() != 4 {
        return Err(ValidationError::ExpiryFormat);
    }
    let month: u32 = clean[..2].parse().map_err(|_| ValidationError::ExpiryFormat)?;
    let short_year: u32 = clean[2..].parse().map_err(|_| ValidationError::ExpiryFormat)?;
    if !(1..=12).contains(&month) {
        return Err(ValidationError::ExpiryMonth);
    }

    let year = if short_year < 50 {
        2000 + short_year
    } else {
        1900 + short_year
    };
    if (year, month) < (current_year, current_month) {
        return Err(ValidationError::CardExpired);
    }
    if year > current_year + 20 {
        return Err(ValidationError::ExpiryYear);
    }
    Ok((month, year))
}

/// Name of the security code for the brand ("CID" on amex).
pub fn cvv_name(card_type: Option<CardType>) -> &'static str {
    match card_type {
        Some(CardType::Amex) => "CID",
        _ => "CVV",
    }
}

pub fn cvv_length(card_type: Option<CardType>) -> usize {
    card_type.map_or(3, |c| c.cvv_length())
}

pub fn validate_cvv(value: &str, card_type: Option<CardType>) -> Result<(), ValidationError> {
    let clean = digits(value);
    let name = cvv_name(card_type);
    if clean.is_empty() {
        return Err(ValidationError::CvvRequired { name });
    }
    let expected = cvv_length(card_type);
    if clean.len() != expected {
        return Err(ValidationError::CvvLength { name, expected });
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !EMAIL.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}
