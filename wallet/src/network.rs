//! # Network Parameters
//!
//! Which network a transaction belongs to is decided by one string, the
//! passphrase. Its SHA-256 is the network id, and the network id is the
//! first thing in every signature base, so a transaction signed for the
//! test network is worthless on the main one.
//!
//! The same struct carries the two other things that differ between
//! networks: how many decimal places amounts have, and how far the local
//! clock is from the network's.
//!
//! ## Amounts
//!
//! On the wire an amount is a `u64` count of the smallest unit. Humans deal
//! in decimals. Conversion multiplies by `10^precision` and truncates toward
//! zero; negative amounts and anything past `u64::MAX` are refused instead
//! of wrapping.
//!
//! ## Time
//!
//! "Now" is read through the [`Clock`] trait so tests and deterministic
//! callers can pin it. [`SystemClock`] is the real thing.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{NetworkConfig, DEFAULT_PRECISION, MAX_PRECISION};
use crate::crypto::sha256;

/// Errors from network parameter validation and amount conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("precision {precision} is larger than the maximum of {max}")]
    PrecisionTooLarge { precision: u32, max: u32 },

    #[error("amount can't be negative")]
    NegativeAmount,

    #[error("precised amount overflows uint64")]
    AmountOverflow,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current unix time.
pub trait Clock: Send + Sync {
    fn now_unix_seconds(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix_seconds(&self) -> i64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// NetworkParams
// ---------------------------------------------------------------------------

/// Validated, derived parameters of one network.
///
/// Serializes as a [`NetworkConfig`]; deserializing re-validates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NetworkConfig", into = "NetworkConfig")]
pub struct NetworkParams {
    passphrase: String,
    precision: u32,
    precision_multiplier: u64,
    network_id: [u8; 32],
    time_offset_seconds: i64,
}

impl NetworkParams {
    /// Parameters with the default precision and no clock offset.
    pub fn new(passphrase: impl Into<String>) -> Result<Self, NetworkError> {
        Self::with_options(passphrase, DEFAULT_PRECISION, 0)
    }

    /// Parameters with an explicit precision and clock offset. Fails if
    /// `precision` exceeds [`MAX_PRECISION`].
    pub fn with_options(
        passphrase: impl Into<String>,
        precision: u32,
        time_offset_seconds: i64,
    ) -> Result<Self, NetworkError> {
        if precision > MAX_PRECISION {
            return Err(NetworkError::PrecisionTooLarge {
                precision,
                max: MAX_PRECISION,
            });
        }
        let passphrase = passphrase.into();
        let network_id = sha256(passphrase.as_bytes());
        Ok(Self {
            passphrase,
            precision,
            precision_multiplier: 10u64.pow(precision),
            network_id,
            time_offset_seconds,
        })
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// Decimal places in human-readable amounts.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// `10^precision`.
    pub fn precision_multiplier(&self) -> u64 {
        self.precision_multiplier
    }

    /// SHA-256 of the passphrase.
    pub fn network_id(&self) -> [u8; 32] {
        self.network_id
    }

    pub fn time_offset_seconds(&self) -> i64 {
        self.time_offset_seconds
    }

    /// Network time according to the system clock.
    pub fn now_timestamp(&self) -> i64 {
        self.now_timestamp_with(&SystemClock)
    }

    /// Network time according to `clock`.
    pub fn now_timestamp_with(&self, clock: &dyn Clock) -> i64 {
        clock
            .now_unix_seconds()
            .saturating_add(self.time_offset_seconds)
    }

    /// Human-readable amount to network units, rounding toward zero.
    pub fn amount_to_precised(&self, amount: Decimal) -> Result<u64, NetworkError> {
        if amount.is_zero() {
            return Ok(0);
        }
        if amount.is_sign_negative() {
            return Err(NetworkError::NegativeAmount);
        }
        amount
            .checked_mul(Decimal::from(self.precision_multiplier))
            .map(|scaled| scaled.trunc())
            .and_then(|scaled| scaled.to_u64())
            .ok_or(NetworkError::AmountOverflow)
    }

    /// Network units to a human-readable amount. Exact: the result has
    /// exactly `precision` decimal places.
    pub fn amount_from_precised(&self, amount: u64) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(amount), self.precision)
    }
}

impl TryFrom<NetworkConfig> for NetworkParams {
    type Error = NetworkError;

    fn try_from(config: NetworkConfig) -> Result<Self, Self::Error> {
        config.into_params()
    }
}

impl From<NetworkParams> for NetworkConfig {
    fn from(params: NetworkParams) -> Self {
        NetworkConfig::from(&params)
    }
}
