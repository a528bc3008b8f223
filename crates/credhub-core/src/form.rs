//! Pure helpers for the credit request form: CNPJ and BRL formatting,
//! sector list, session identifiers.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Business sectors offered by the request form.
pub const SECTORS: &[&str] = &[
    "Agronegócio",
    "Comércio",
    "Construção Civil",
    "Educação",
    "Indústria",
    "Saúde",
    "Serviços",
    "Tecnologia",
    "Transporte e Logística",
    "Outros",
];

const CNPJ_LEN: usize = 14;
const SESSION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid CNPJ \"{0}\": expected 14 digits")]
    InvalidCnpj(String),

    #[error("invalid credit amount \"{0}\"")]
    InvalidAmount(String),

    #[error("unknown sector \"{0}\"")]
    UnknownSector(String),
}

/// Strips everything but ASCII digits.
#[must_use]
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Renders a CNPJ as `NN.NNN.NNN/NNNN-NN`.
///
/// Inputs that do not carry exactly 14 digits are returned as bare digits,
/// which lets a form re-format on every keystroke.
#[must_use]
pub fn format_cnpj(raw: &str) -> String {
    let d = digits_only(raw);
    if d.len() != CNPJ_LEN {
        return d;
    }
    format!(
        "{}.{}.{}/{}-{}",
        &d[0..2],
        &d[2..5],
        &d[5..8],
        &d[8..12],
        &d[12..14]
    )
}

/// Returns the 14 CNPJ digits.
///
/// # Errors
///
/// Returns [`FormError::InvalidCnpj`] when the input does not hold exactly 14 digits.
pub fn cnpj_digits(raw: &str) -> Result<String, FormError> {
    let d = digits_only(raw);
    if d.len() == CNPJ_LEN {
        Ok(d)
    } else {
        Err(FormError::InvalidCnpj(raw.to_owned()))
    }
}

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,56`.
#[must_use]
pub fn format_brl(amount: Decimal) -> String {
    let cents = (amount.abs().round_dp(2) * Decimal::ONE_HUNDRED)
        .trunc()
        .to_u128()
        .unwrap_or(0);
    let integer = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && cents > 0 {
        "-"
    } else {
        ""
    };
    format!("{sign}R$ {grouped},{fraction:02}")
}

/// Interprets typed digits as cents and formats them, the way a currency
/// input mask does (`"123456"` renders as `R$ 1.234,56`).
///
/// Returns `None` when the input has no digits.
#[must_use]
pub fn format_brl_from_digits(raw: &str) -> Option<String> {
    let d = digits_only(raw);
    if d.is_empty() {
        return None;
    }
    let cents = Decimal::from_str(&d).ok()?;
    Some(format_brl(cents / Decimal::ONE_HUNDRED))
}

/// Parses a BRL amount such as `R$ 1.234,56` or `1234,56`.
///
/// # Errors
///
/// Returns [`FormError::InvalidAmount`] when the text is not a decimal amount.
pub fn parse_brl(raw: &str) -> Result<Decimal, FormError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&cleaned).map_err(|_| FormError::InvalidAmount(raw.to_owned()))
}

#[must_use]
pub fn is_known_sector(sector: &str) -> bool {
    SECTORS.iter().any(|s| *s == sector)
}

/// Builds a session identifier: `session_<unix millis>_<9 base-36 chars>`.
pub fn new_session_id<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("session_{}_{suffix}", now.timestamp_millis())
}

/// Company data typed into the request form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditForm {
    pub cnpj: String,
    pub company_name: String,
    pub sector: String,
    pub credit_amount: String,
}

impl CreditForm {
    /// Checks that every field is present and well-formed.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found, checking fields in form order.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.cnpj.trim().is_empty() {
            return Err(FormError::MissingField("cnpj"));
        }
        cnpj_digits(&self.cnpj)?;
        if self.company_name.trim().is_empty() {
            return Err(FormError::MissingField("company_name"));
        }
        if self.sector.trim().is_empty() {
            return Err(FormError::MissingField("sector"));
        }
        if !is_known_sector(&self.sector) {
            return Err(FormError::UnknownSector(self.sector.clone()));
        }
        if self.credit_amount.trim().is_empty() {
            return Err(FormError::MissingField("credit_amount"));
        }
        self.credit_amount_value()?;
        Ok(())
    }

    /// The requested amount as a positive decimal.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidAmount`] for unparsable or non-positive amounts.
    pub fn credit_amount_value(&self) -> Result<Decimal, FormError> {
        let amount = parse_brl(&self.credit_amount)?;
        if amount <= Decimal::ZERO {
            return Err(FormError::InvalidAmount(self.credit_amount.clone()));
        }
        Ok(amount)
    }
}
