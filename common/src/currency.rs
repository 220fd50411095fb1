use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// Currency a listing is priced in. Prices are stored as entered; no conversion happens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "BDT")]
    Bdt,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "INR")]
    Inr,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::all()
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("currency", s))
    }
}

/// Format a price for display, e.g. "150 BDT" or "12.5 USD".
pub fn format_price(price: f64, currency: Currency) -> String {
    format!("{price} {currency}")
}

impl Currency {
    pub fn all() -> &'static [Currency] {
        &[Currency::Bdt, Currency::Usd, Currency::Eur, Currency::Inr]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Bdt => "BDT",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Inr => "INR",
        }
    }
}

/// Unit a listing's quantity is measured in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Kg,
    G,
    Piece,
    Bunch,
    Dozen,
    Litre,
}

impl Unit {
    pub fn all() -> &'static [Unit] {
        &[
            Unit::Kg,
            Unit::G,
            Unit::Piece,
            Unit::Bunch,
            Unit::Dozen,
            Unit::Litre,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::Piece => "piece",
            Unit::Bunch => "bunch",
            Unit::Dozen => "dozen",
            Unit::Litre => "litre",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Unit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::all()
            .iter()
            .copied()
            .find(|u| u.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("unit", s))
    }
}
