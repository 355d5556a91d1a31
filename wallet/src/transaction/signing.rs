//! The signature base, transaction hashing, and decorated signatures.
//!
//! What gets signed is never the envelope itself. It is the SHA-256 of the
//! *signature base*:
//!
//! ```text
//! network_id (32 bytes) || ENVELOPE_TYPE_TX (int32) || XDR(transaction body)
//! ```
//!
//! Binding the network id in is what keeps a test-network signature from
//! being replayed on the main network. The body excludes signatures, so
//! adding one never changes the hash the next signer sees.

use tracing::debug;

use crate::account::{Account, AccountError};
use crate::config::ENVELOPE_TYPE_TX;
use crate::crypto::sha256;
use crate::network::NetworkParams;
use crate::xdr::{DecoratedSignature, TransactionBody, XdrEncode, XdrError, XdrWriter};

/// `network_id || ENVELOPE_TYPE_TX || XDR(body)`.
pub fn signature_base(network: &NetworkParams, body: &TransactionBody) -> Result<Vec<u8>, XdrError> {
    let mut writer = XdrWriter::with_capacity(256);
    writer.write_fixed_opaque(&network.network_id());
    writer.write_i32(ENVELOPE_TYPE_TX);
    body.encode(&mut writer)?;
    Ok(writer.into_bytes())
}

/// SHA-256 of the signature base. This is the message every signer signs.
pub fn transaction_hash(network: &NetworkParams, body: &TransactionBody) -> Result<[u8; 32], XdrError> {
    Ok(sha256(&signature_base(network, body)?))
}

/// Sign a transaction hash with `account`.
pub fn sign_hash(account: &Account, hash: &[u8; 32]) -> Result<DecoratedSignature, AccountError> {
    let signature = account.sign_decorated(hash)?;
    debug!(hint = %hex::encode(signature.hint), "signature produced");
    Ok(signature)
}

/// `true` iff `signature` carries `account`'s hint and verifies over `hash`.
pub fn verify_decorated(account: &Account, hash: &[u8; 32], signature: &DecoratedSignature) -> bool {
    signature.hint == account.signature_hint() && account.verify(hash, &signature.signature)
}
