//! Core type aliases, constants and the `UFix64` fixed-point type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// 32-byte hash used for code hashes and transaction/script locations.
pub type Hash = [u8; 32];

/// Width of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 8;

/// Number of fractional units in one whole `UFix64` (8 decimal places).
pub const UFIX64_SCALE: u64 = 100_000_000;

/// Unsigned fixed-point number with 8 decimal places.
///
/// Balances and key weights are carried in this representation from the
/// host all the way to interpreted code. The raw `u64` is the number of
/// 10^-8 units; no arithmetic in this crate rounds it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UFix64(u64);

impl UFix64 {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// The largest representable value.
    pub const MAX: Self = Self(u64::MAX);

    /// Wrap a raw count of 10^-8 units.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Build from a whole number. Returns `None` on overflow.
    pub fn from_integer(value: u64) -> Option<Self> {
        value.checked_mul(UFIX64_SCALE).map(Self)
    }

    /// The raw count of 10^-8 units.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The integer part, truncating the fraction.
    pub const fn to_integer(self) -> u64 {
        self.0 / UFIX64_SCALE
    }

    /// The fractional part in 10^-8 units.
    pub const fn fraction(self) -> u64 {
        self.0 % UFIX64_SCALE
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl fmt::Display for UFix64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08}", self.to_integer(), self.fraction())
    }
}

/// Encode bytes as lowercase hex without a prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use core::fmt::Write;
        let _ = write!(s, "{:02x}", byte);
    }
    s
}

/// Decode a hex string (no prefix). Returns `None` on odd length or a
/// non-hex digit.
pub fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    s.as_bytes()
        .chunks(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}
