// wallet-core/src/crypto/amount.rs
//
// Fixed-point token amounts: integer atoms + per-chain scale.
// Human -> atoms truncates toward zero (never rounds up a spend).

use crate::error::{WalletError, WalletResult};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Native token of a chain and the number of decimals between its atom and
/// its human unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Denomination {
    pub symbol: &'static str,
    pub decimals: u32,
}

impl Denomination {
    /// Ether, atoms are wei.
    pub const ETH: Denomination = Denomination { symbol: "ETH", decimals: 18 };
    /// Filecoin, atoms are attoFIL.
    pub const FIL: Denomination = Denomination { symbol: "FIL", decimals: 18 };
    /// Solana, atoms are lamports.
    pub const SOL: Denomination = Denomination { symbol: "SOL", decimals: 9 };

    fn unit(&self) -> WalletResult<u128> {
        10u128.checked_pow(self.decimals).ok_or_else(|| {
            WalletError::InvalidAmount(format!("unsupported scale {}", self.decimals))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    atoms: u128,
    denom: Denomination,
}

impl TokenAmount {
    pub fn from_atoms(atoms: u128, denom: Denomination) -> Self {
        Self { atoms, denom }
    }

    #[inline]
    pub fn atoms(&self) -> u128 {
        self.atoms
    }

    #[inline]
    pub fn denomination(&self) -> Denomination {
        self.denom
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.atoms == 0
    }

    /// Convert a human amount ("1.5") into atoms.
    ///
    /// Digits below the atom are truncated toward zero: `0.0000000009` SOL is
    /// 0 lamports. Negative values and values that overflow `u128` atoms are
    /// rejected with `InvalidAmount`.
    pub fn from_decimal(value: Decimal, denom: Denomination) -> WalletResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(WalletError::InvalidAmount(format!(
                "negative amount {}",
                value
            )));
        }

        let mantissa = value.mantissa().unsigned_abs();
        let scale = value.scale();
        let overflow = || WalletError::InvalidAmount(format!("{} {} overflows", value, denom.symbol));

        let atoms = if scale <= denom.decimals {
            let factor = 10u128
                .checked_pow(denom.decimals - scale)
                .ok_or_else(overflow)?;
            mantissa.checked_mul(factor).ok_or_else(overflow)?
        } else {
            match 10u128.checked_pow(scale - denom.decimals) {
                Some(divisor) => mantissa / divisor,
                // More than 38 extra digits: below one atom whatever the mantissa.
                None => 0,
            }
        };

        Ok(Self { atoms, denom })
    }

    /// Parse a human amount string, e.g. `"0.25"`.
    pub fn parse(value: &str, denom: Denomination) -> WalletResult<Self> {
        let decimal = Decimal::from_str(value.trim())
            .map_err(|e| WalletError::InvalidAmount(format!("'{}': {}", value, e)))?;
        Self::from_decimal(decimal, denom)
    }

    /// Human-unit value. Fails when the atom count exceeds the 96-bit
    /// mantissa of `Decimal`.
    pub fn to_decimal(&self) -> WalletResult<Decimal> {
        let atoms = i128::try_from(self.atoms)
            .map_err(|_| WalletError::InvalidAmount(format!("{} atoms out of range", self.atoms)))?;
        Decimal::try_from_i128_with_scale(atoms, self.denom.decimals)
            .map(|d| d.normalize())
            .map_err(|e| WalletError::InvalidAmount(format!("{} atoms: {}", self.atoms, e)))
    }

    pub fn checked_add(&self, other: &TokenAmount) -> Option<TokenAmount> {
        if self.denom != other.denom {
            return None;
        }
        self.atoms
            .checked_add(other.atoms)
            .map(|atoms| Self::from_atoms(atoms, self.denom))
    }

    pub fn checked_sub(&self, other: &TokenAmount) -> Option<TokenAmount> {
        if self.denom != other.denom {
            return None;
        }
        self.atoms
            .checked_sub(other.atoms)
            .map(|atoms| Self::from_atoms(atoms, self.denom))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.denom.unit() {
            Ok(unit) => unit,
            Err(_) => return write!(f, "{} atoms {}", self.atoms, self.denom.symbol),
        };
        let whole = self.atoms / unit;
        let frac = self.atoms % unit;
        if frac == 0 {
            return write!(f, "{} {}", whole, self.denom.symbol);
        }
        let frac = format!("{:0width$}", frac, width = self.denom.decimals as usize);
        write!(f, "{}.{} {}", whole, frac.trim_end_matches('0'), self.denom.symbol)
    }
}
