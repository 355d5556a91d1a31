//! # Accounts
//!
//! An [`Account`] is an Ed25519 key pair, or just the public half of one.
//! It knows its `G…` account id, can hand out its `S…` seed while it still
//! has one, signs and verifies, and produces the decorated signatures that
//! go into envelopes.
//!
//! ## Destruction
//!
//! `destroy()` drops the signing key, which zeroizes the seed
//! (ed25519-dalek wipes `SigningKey` on drop). It is idempotent and it is
//! visible through every reference to the account: the key lives behind a
//! `parking_lot::RwLock`, signing holds the read lock, destruction takes the
//! write lock, so a signature can never observe half-wiped key material.
//!
//! Destruction also changes identity. A destroyed account is only equal to
//! itself, so a stale handle can't be mistaken for a live one that happens
//! to share the same key.
//!
//! ## Security considerations
//!
//! - Seeds are never logged, never part of `Debug` output, and only leave
//!   the account inside a [`Zeroizing`] wrapper.
//! - There is no `Clone`. [`Account::verify_only`] gives you a copy that
//!   can verify but not sign, which is almost always what you wanted.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey, SIGNATURE_LENGTH};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::{PUBLIC_KEY_LENGTH, SEED_LENGTH, SIGNATURE_HINT_LENGTH};
use crate::strkey::{self, FormatError};
use crate::xdr::{DecoratedSignature, PublicKey};

/// Errors that can occur during account operations.
///
/// None of them carry key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("signing unavailable: account has no secret seed")]
    SigningUnavailable,

    #[error("invalid secret seed: {0}")]
    InvalidSeed(#[source] FormatError),

    #[error("invalid account id: {0}")]
    InvalidAccountId(#[source] FormatError),

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

enum KeyState {
    Signing(SigningKey),
    VerifyOnly,
    Destroyed,
}

/// A TokenD account defined by a key pair or by its public key alone.
///
/// # Examples
///
/// ```
/// use tokend_wallet::account::Account;
///
/// let account = Account::random();
/// let signature = account.sign(b"send 100 OLG to alice").unwrap();
/// assert!(account.verify(b"send 100 OLG to alice", &signature));
///
/// account.destroy();
/// assert!(account.sign(b"too late").is_err());
/// assert!(account.secret_seed().is_none());
/// ```
pub struct Account {
    public_key: VerifyingKey,
    state: RwLock<KeyState>,
    instance: u64,
}

impl Account {
    fn with_state(public_key: VerifyingKey, state: KeyState) -> Self {
        Self {
            public_key,
            state: RwLock::new(state),
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        Self::with_state(signing_key.verifying_key(), KeyState::Signing(signing_key))
    }

    /// Generate a fresh key pair from the OS RNG.
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Load a signing account from its `S…` secret seed.
    pub fn from_secret_seed(seed: &str) -> Result<Self, AccountError> {
        let bytes = strkey::decode_secret_seed(seed).map_err(AccountError::InvalidSeed)?;
        Ok(Self::from_seed_bytes(&bytes))
    }

    /// Load a signing account from the raw 32-byte seed.
    pub fn from_seed_bytes(seed: &[u8; SEED_LENGTH]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// A verify-only account for a `G…` account id.
    pub fn from_account_id(account_id: &str) -> Result<Self, AccountError> {
        let bytes = strkey::decode_account_id(account_id).map_err(AccountError::InvalidAccountId)?;
        Self::from_public_key(&bytes)
    }

    /// A verify-only account for a raw public key. Rejects bytes that are
    /// not a valid curve point.
    pub fn from_public_key(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self, AccountError> {
        let key = VerifyingKey::from_bytes(public_key).map_err(|_| AccountError::InvalidPublicKey)?;
        Ok(Self::with_state(key, KeyState::VerifyOnly))
    }

    /// A verify-only copy of this account. Works on destroyed accounts too,
    /// since the public key is not secret.
    pub fn verify_only(&self) -> Self {
        Self::with_state(self.public_key, KeyState::VerifyOnly)
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// The `G…` account id.
    pub fn account_id(&self) -> String {
        strkey::encode_account_id(&self.public_key_bytes())
    }

    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.public_key.to_bytes()
    }

    /// The public key as the ledger encodes it.
    pub fn public_key_xdr(&self) -> PublicKey {
        PublicKey::Ed25519(self.public_key_bytes())
    }

    /// The `S…` secret seed, or `None` for verify-only and destroyed
    /// accounts.
    pub fn secret_seed(&self) -> Option<Zeroizing<String>> {
        match &*self.state.read() {
            KeyState::Signing(key) => Some(strkey::encode_secret_seed(key.as_bytes())),
            KeyState::VerifyOnly | KeyState::Destroyed => None,
        }
    }

    pub fn can_sign(&self) -> bool {
        matches!(*self.state.read(), KeyState::Signing(_))
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(*self.state.read(), KeyState::Destroyed)
    }

    /// Last four bytes of the public key.
    pub fn signature_hint(&self) -> [u8; SIGNATURE_HINT_LENGTH] {
        let bytes = self.public_key_bytes();
        let mut hint = [0u8; SIGNATURE_HINT_LENGTH];
        hint.copy_from_slice(&bytes[PUBLIC_KEY_LENGTH - SIGNATURE_HINT_LENGTH..]);
        hint
    }

    // -----------------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------------

    /// Sign `data`. Fails for verify-only and destroyed accounts.
    pub fn sign(&self, data: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], AccountError> {
        match &*self.state.read() {
            KeyState::Signing(key) => Ok(key.sign(data).to_bytes()),
            KeyState::VerifyOnly | KeyState::Destroyed => Err(AccountError::SigningUnavailable),
        }
    }

    /// Sign `data` and attach this account's signature hint.
    pub fn sign_decorated(&self, data: &[u8]) -> Result<DecoratedSignature, AccountError> {
        Ok(DecoratedSignature {
            hint: self.signature_hint(),
            signature: self.sign(data)?.to_vec(),
        })
    }

    /// Check `signature` over `data` against this account's public key.
    /// Malformed signatures simply fail to verify.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        self.public_key.verify(data, &signature).is_ok()
    }

    /// Verify against a `G…` account id without building an account first.
    pub fn verify_with_account_id(
        data: &[u8],
        signature: &[u8],
        account_id: &str,
    ) -> Result<bool, AccountError> {
        Ok(Self::from_account_id(account_id)?.verify(data, signature))
    }

    /// Wipe the secret seed. Idempotent; afterwards the account can only
    /// verify and compares equal to nothing but itself.
    pub fn destroy(&self) {
        let mut state = self.state.write();
        if !matches!(*state, KeyState::Destroyed) {
            // Dropping the SigningKey zeroizes it.
            *state = KeyState::Destroyed;
            debug!(account_id = %self.account_id(), "account destroyed");
        }
    }
}

impl PartialEq for Account {
    /// Live accounts are equal when they hold the same key material: the
    /// same public key, and either both or neither able to sign. A destroyed
    /// account is equal only to itself.
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) || self.instance == other.instance {
            return true;
        }
        // Read each side on its own so two comparisons running in opposite
        // directions never hold both locks.
        let (mine, theirs) = (self.identity(), other.identity());
        match (mine, theirs) {
            (Identity::Live(a_key, a_signs), Identity::Live(b_key, b_signs)) => {
                a_key == b_key && a_signs == b_signs
            }
            _ => false,
        }
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.identity() {
            Identity::Live(key, can_sign) => {
                0u8.hash(state);
                key.hash(state);
                can_sign.hash(state);
            }
            Identity::Destroyed(instance) => {
                1u8.hash(state);
                instance.hash(state);
            }
        }
    }
}

enum Identity {
    Live([u8; PUBLIC_KEY_LENGTH], bool),
    Destroyed(u64),
}

impl Account {
    fn identity(&self) -> Identity {
        match *self.state.read() {
            KeyState::Signing(_) => Identity::Live(self.public_key_bytes(), true),
            KeyState::VerifyOnly => Identity::Live(self.public_key_bytes(), false),
            KeyState::Destroyed => Identity::Destroyed(self.instance),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material, not even partially.
        f.debug_struct("Account")
            .field("account_id", &self.account_id())
            .field("can_sign", &self.can_sign())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
