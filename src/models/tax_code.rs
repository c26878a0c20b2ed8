//! PAYE tax code parsing.
//!
//! Supported forms:
//!
//! | Code            | Meaning                                             |
//! |-----------------|-----------------------------------------------------|
//! | `1257L`, `0T`   | numeric part × 10 is the annual personal allowance  |
//! | `K475`          | numeric part × 10 is added to taxable pay           |
//! | `BR`, `D0`, `D1`| all pay at the rate of band 0, 1 or 2               |
//! | `NT`            | no tax                                              |
//!
//! A leading `S` or `C` country prefix is accepted and ignored, and a trailing
//! `W1`, `M1` or `X` marks the code as non-cumulative.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Allowance suffix letters that carry no extra meaning for the computation.
const ALLOWANCE_SUFFIXES: [char; 4] = ['L', 'M', 'N', 'T'];

/// How a tax code affects the tax computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxCodeBasis {
    /// Annual tax-free allowance deducted from pay.
    Allowance {
        /// Annual allowance amount.
        annual: Decimal,
    },
    /// Annual amount added to taxable pay (K codes).
    Additional {
        /// Annual addition amount.
        annual: Decimal,
    },
    /// All pay taxed at a single band's rate without allowance.
    FlatRate {
        /// Zero-based index into the configured tax bands.
        band_index: usize,
    },
    /// No tax deducted.
    NoTax,
}

/// A parsed tax code.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{TaxCode, TaxCodeBasis};
/// use rust_decimal::Decimal;
///
/// let code: TaxCode = "1257L".parse().unwrap();
/// assert_eq!(code.basis(), TaxCodeBasis::Allowance { annual: Decimal::from(12570) });
///
/// let emergency: TaxCode = "1257L M1".parse().unwrap();
/// assert!(emergency.is_non_cumulative());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxCode {
    raw: String,
    basis: TaxCodeBasis,
    non_cumulative: bool,
}

impl TaxCode {
    /// The normalized code (upper case, whitespace removed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// How the code affects the computation.
    pub fn basis(&self) -> TaxCodeBasis {
        self.basis
    }

    /// Whether the code carried an emergency (`W1`/`M1`/`X`) marker.
    pub fn is_non_cumulative(&self) -> bool {
        self.non_cumulative
    }
}

impl fmt::Display for TaxCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for TaxCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        let invalid = |message: &str| EngineError::InvalidTaxCode {
            code: s.trim().to_string(),
            message: message.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("tax code is empty"));
        }

        let (body, non_cumulative) = strip_emergency_marker(&raw);
        let body = strip_country_prefix(body);

        if body.is_empty() {
            return Err(invalid("no code after prefix/suffix"));
        }

        let basis = parse_basis(body).ok_or_else(|| invalid("unrecognised format"))?;

        Ok(TaxCode {
            raw,
            basis,
            non_cumulative,
        })
    }
}

fn strip_emergency_marker(code: &str) -> (&str, bool) {
    if let Some(body) = code.strip_suffix("W1").or_else(|| code.strip_suffix("M1")) {
        (body, true)
    } else if let Some(body) = code.strip_suffix('X') {
        (body, true)
    } else {
        (code, false)
    }
}

fn strip_country_prefix(code: &str) -> &str {
    match code.strip_prefix('S').or_else(|| code.strip_prefix('C')) {
        Some(rest) if parse_basis(rest).is_some() => rest,
        _ => code,
    }
}

fn parse_basis(body: &str) -> Option<TaxCodeBasis> {
    match body {
        "BR" => return Some(TaxCodeBasis::FlatRate { band_index: 0 }),
        "D0" => return Some(TaxCodeBasis::FlatRate { band_index: 1 }),
        "D1" => return Some(TaxCodeBasis::FlatRate { band_index: 2 }),
        "NT" => return Some(TaxCodeBasis::NoTax),
        _ => {}
    }

    if let Some(digits) = body.strip_prefix('K') {
        return annual_amount(digits).map(|annual| TaxCodeBasis::Additional { annual });
    }

    let suffix = body.chars().last()?;
    if ALLOWANCE_SUFFIXES.contains(&suffix) {
        let digits = &body[..body.len() - suffix.len_utf8()];
        return annual_amount(digits).map(|annual| TaxCodeBasis::Allowance { annual });
    }

    None
}

fn annual_amount(digits: &str) -> Option<Decimal> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(Decimal::from(value) * Decimal::TEN)
}
