//! # Wallet Configuration & Constants
//!
//! Every magic number the wire format depends on lives here. These are not
//! tuning knobs: change one and the network will politely reject everything
//! you sign from that point on.
//!
//! The one thing that *is* configurable is which network you are talking to.
//! [`NetworkConfig`] is the serde-friendly description of that (passphrase,
//! amount precision, clock offset) and turns into a validated
//! [`NetworkParams`](crate::network::NetworkParams).

use serde::{Deserialize, Serialize};

use crate::network::{NetworkError, NetworkParams};

// ---------------------------------------------------------------------------
// Key material
// ---------------------------------------------------------------------------

/// Raw Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Raw Ed25519 seed length in bytes. The seed *is* the secret key.
pub const SEED_LENGTH: usize = 32;

/// Every signature is prefixed with the last four bytes of the signer's
/// public key so verifiers can skip keys that obviously don't match.
pub const SIGNATURE_HINT_LENGTH: usize = 4;

/// Upper bound for the `signature` opaque in a decorated signature.
/// Ed25519 signatures are exactly 64 bytes.
pub const MAX_SIGNATURE_LENGTH: u32 = 64;

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Envelope type code mixed into the signature base of a transaction.
pub const ENVELOPE_TYPE_TX: i32 = 2;

/// Default transaction lifetime: one week minus one hour. The hour of slack
/// keeps us under the network's one-week ceiling even with a skewed clock.
pub const DEFAULT_TX_LIFETIME_SECONDS: u64 = 7 * 24 * 3600 - 3600;

/// Maximum number of operations a single transaction may carry.
pub const MAX_OPERATIONS: u32 = 100;

/// Maximum number of signatures an envelope may carry.
pub const MAX_SIGNATURES: u32 = 20;

/// `string<28>`: the memo text limit, in bytes (not characters).
pub const MAX_MEMO_TEXT_LENGTH: u32 = 28;

/// `string<256>` used for payment subjects.
pub const MAX_SUBJECT_LENGTH: u32 = 256;

/// `string<64>` used for payment references.
pub const MAX_REFERENCE_LENGTH: u32 = 64;

/// `string<16>` used for asset codes.
pub const MAX_ASSET_CODE_LENGTH: u32 = 16;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Maximum amount precision. 10^6 is the largest power of ten that still
/// leaves room for meaningful whole amounts in a `u64`.
pub const MAX_PRECISION: u32 = 6;

/// Default amount precision of TokenD networks.
pub const DEFAULT_PRECISION: u32 = MAX_PRECISION;

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

/// Serializable description of a network, suitable for config files.
///
/// ```
/// use tokend_wallet::config::NetworkConfig;
///
/// let config = NetworkConfig::from_json(r#"{ "passphrase": "Example Test Network" }"#).unwrap();
/// let params = config.into_params().unwrap();
/// assert_eq!(params.precision(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network passphrase. Its SHA-256 is the network id.
    pub passphrase: String,

    /// Decimal places in human-readable amounts.
    #[serde(default = "default_precision")]
    pub precision: u32,

    /// Offset between the local clock and the network clock, in seconds.
    #[serde(default)]
    pub time_offset_seconds: i64,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl NetworkConfig {
    /// A config with default precision and no clock offset.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
            precision: DEFAULT_PRECISION,
            time_offset_seconds: 0,
        }
    }

    /// Parse a JSON network description.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate and derive the runtime [`NetworkParams`].
    pub fn into_params(self) -> Result<NetworkParams, NetworkError> {
        NetworkParams::with_options(self.passphrase, self.precision, self.time_offset_seconds)
    }
}

impl From<&NetworkParams> for NetworkConfig {
    fn from(params: &NetworkParams) -> Self {
        Self {
            passphrase: params.passphrase().to_string(),
            precision: params.precision(),
            time_offset_seconds: params.time_offset_seconds(),
        }
    }
}
