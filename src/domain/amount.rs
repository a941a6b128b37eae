use crate::error::AccountingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A quantity of value in indivisible base units.
///
/// All arithmetic on the ledger goes through the checked helpers so that an
/// overflow surfaces as `ArithmeticOverflow` instead of wrapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u128) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self, what: &'static str) -> Result<Self, AccountingError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(AccountingError::ArithmeticOverflow(what))
    }

    pub fn checked_sub(self, rhs: Self, what: &'static str) -> Result<Self, AccountingError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(AccountingError::ArithmeticOverflow(what))
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// `floor(self * numerator / denominator)`.
    ///
    /// Splits `self` into quotient and remainder by `denominator` first, so the
    /// only overflow reported is that of the final result.
    pub fn pro_rata(
        self,
        numerator: u64,
        denominator: u64,
        what: &'static str,
    ) -> Result<Self, AccountingError> {
        if denominator == 0 {
            return Err(AccountingError::DivisionByZero(what));
        }
        let (numerator, denominator) = (u128::from(numerator), u128::from(denominator));
        let whole = (self.0 / denominator)
            .checked_mul(numerator)
            .ok_or(AccountingError::ArithmeticOverflow(what))?;
        // remainder < 2^64 and numerator < 2^64, so this product fits.
        let part = (self.0 % denominator) * numerator / denominator;
        whole
            .checked_add(part)
            .map(Self)
            .ok_or(AccountingError::ArithmeticOverflow(what))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
