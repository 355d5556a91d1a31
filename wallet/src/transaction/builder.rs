//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] accumulates operations, memo, time bounds,
//! salt, fee cap and signers, then `.build()` validates everything at once
//! and hands back a [`Transaction`]. There is no way to get a `Transaction`
//! with zero operations or with the reserved salt: construction fails before
//! anything exists.
//!
//! After building, a transaction is immutable except for its signature list,
//! which only ever grows.

use tracing::debug;

use super::salt::{OsSaltSource, SaltSource};
use super::signing::{sign_hash, signature_base, transaction_hash, verify_decorated};
use super::TransactionError;
use crate::account::Account;
use crate::config::{
    DEFAULT_TX_LIFETIME_SECONDS, MAX_MEMO_TEXT_LENGTH, MAX_OPERATIONS, MAX_SIGNATURES,
};
use crate::network::{Clock, NetworkParams, SystemClock};
use crate::xdr::{
    AccountId, DecoratedSignature, Memo, Operation, PublicKey, TimeBounds, TransactionBody,
    TransactionEnvelope, TransactionExt, XdrDecode, XdrEncode,
};

static SYSTEM_CLOCK: SystemClock = SystemClock;
static OS_SALT: OsSaltSource = OsSaltSource;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A built TokenD transaction bound to one network.
///
/// The hash, and therefore every signature, covers the network id plus the
/// XDR body: source account, salt, time bounds, memo, operations and the
/// optional fee cap. Signatures themselves are not covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    network: NetworkParams,
    source_account: AccountId,
    memo: Memo,
    operations: Vec<Operation>,
    time_bounds: TimeBounds,
    salt: u64,
    max_total_fee: Option<u64>,
    signatures: Vec<DecoratedSignature>,
}

impl Transaction {
    pub fn network(&self) -> &NetworkParams {
        &self.network
    }

    pub fn source_account(&self) -> &AccountId {
        &self.source_account
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn time_bounds(&self) -> TimeBounds {
        self.time_bounds
    }

    pub fn salt(&self) -> u64 {
        self.salt
    }

    pub fn max_total_fee(&self) -> Option<u64> {
        self.max_total_fee
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        &self.signatures
    }

    /// The XDR transaction body, without signatures.
    pub fn body(&self) -> TransactionBody {
        TransactionBody {
            source_account: self.source_account,
            salt: self.salt,
            time_bounds: self.time_bounds,
            memo: self.memo.clone(),
            operations: self.operations.clone(),
            ext: TransactionExt::from(self.max_total_fee),
        }
    }

    /// `network_id || ENVELOPE_TYPE_TX || XDR(body)`.
    pub fn signature_base(&self) -> Result<Vec<u8>, TransactionError> {
        Ok(signature_base(&self.network, &self.body())?)
    }

    /// SHA-256 of the signature base.
    pub fn hash(&self) -> Result<[u8; 32], TransactionError> {
        Ok(transaction_hash(&self.network, &self.body())?)
    }

    /// Sign with `signer` and append the signature. Fails if the account
    /// can't sign or the envelope is already full; the signature list is
    /// left untouched in either case.
    pub fn add_signature(&mut self, signer: &Account) -> Result<(), TransactionError> {
        self.ensure_signature_capacity()?;
        let signature = sign_hash(signer, &self.hash()?)?;
        self.signatures.push(signature);
        Ok(())
    }

    /// Append a signature produced elsewhere (another party, a hardware
    /// signer). It is not checked here; see [`Self::has_signature_from`].
    pub fn add_decorated_signature(
        &mut self,
        signature: DecoratedSignature,
    ) -> Result<(), TransactionError> {
        self.ensure_signature_capacity()?;
        debug!(hint = %hex::encode(signature.hint), "external signature added");
        self.signatures.push(signature);
        Ok(())
    }

    // The envelope encodes at most MAX_SIGNATURES entries.
    fn ensure_signature_capacity(&self) -> Result<(), TransactionError> {
        if self.signatures.len() >= MAX_SIGNATURES as usize {
            return Err(TransactionError::TooManySignatures {
                max: MAX_SIGNATURES,
            });
        }
        Ok(())
    }

    /// `true` if some attached signature carries `account`'s hint and
    /// verifies over this transaction's hash.
    pub fn has_signature_from(&self, account: &Account) -> Result<bool, TransactionError> {
        let hash = self.hash()?;
        Ok(self
            .signatures
            .iter()
            .any(|signature| verify_decorated(account, &hash, signature)))
    }

    /// `true` if there is at least one signature and every one of them
    /// verifies against one of `signers`.
    pub fn verify_signatures(&self, signers: &[&Account]) -> Result<bool, TransactionError> {
        let hash = self.hash()?;
        Ok(!self.signatures.is_empty()
            && self.signatures.iter().all(|signature| {
                signers
                    .iter()
                    .any(|signer| verify_decorated(signer, &hash, signature))
            }))
    }

    /// Body plus signatures, ready to submit.
    pub fn envelope(&self) -> TransactionEnvelope {
        TransactionEnvelope {
            tx: self.body(),
            signatures: self.signatures.clone(),
        }
    }

    /// The envelope as standard base64 XDR.
    pub fn to_base64(&self) -> Result<String, TransactionError> {
        Ok(self.envelope().to_base64()?)
    }

    /// Rebuild a transaction, signatures included, from a decoded envelope.
    pub fn from_envelope(
        network: NetworkParams,
        envelope: TransactionEnvelope,
    ) -> Result<Self, TransactionError> {
        let TransactionEnvelope { tx, signatures } = envelope;
        if tx.operations.is_empty() {
            return Err(TransactionError::NoOperations);
        }
        debug!(
            operations = tx.operations.len(),
            signatures = signatures.len(),
            "envelope decoded"
        );
        Ok(Self {
            network,
            source_account: tx.source_account,
            memo: tx.memo,
            operations: tx.operations,
            time_bounds: tx.time_bounds,
            salt: tx.salt,
            max_total_fee: tx.ext.max_total_fee(),
            signatures,
        })
    }

    /// Decode a base64 envelope for `network`.
    pub fn from_base64(network: NetworkParams, envelope: &str) -> Result<Self, TransactionError> {
        Self::from_envelope(network, TransactionEnvelope::from_base64(envelope)?)
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Transaction`].
///
/// # Usage
///
/// ```
/// use tokend_wallet::account::Account;
/// use tokend_wallet::network::{FixedClock, NetworkParams};
/// use tokend_wallet::transaction::{FixedSalt, TransactionBuilder};
/// use tokend_wallet::xdr::{ManageBalanceOp, Memo, OperationBody};
///
/// let network = NetworkParams::new("Example Test Network").unwrap();
/// let signer = Account::random();
/// let clock = FixedClock(1_700_000_000);
///
/// let tx = TransactionBuilder::new(network, signer.public_key_xdr())
///     .add_operation(OperationBody::ManageBalance(ManageBalanceOp::create(
///         signer.public_key_xdr(),
///         "OLG",
///     )))
///     .memo(Memo::text("hello").unwrap())
///     .clock(&clock)
///     .salt_source(&FixedSalt(1))
///     .add_signer(&signer)
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.salt(), 1);
/// assert_eq!(tx.time_bounds().max_time, 1_700_000_000 + 601_200);
/// assert!(tx.has_signature_from(&signer).unwrap());
/// ```
///
/// Defaults: no memo, time bounds `[0, now + one week minus an hour]` with
/// `now` taken from the network-adjusted clock, a random non-negative salt,
/// no fee cap.
pub struct TransactionBuilder<'a> {
    network: NetworkParams,
    source_account: AccountId,
    operations: Vec<Operation>,
    memo: Memo,
    time_bounds: Option<TimeBounds>,
    salt: Option<i64>,
    max_total_fee: Option<u64>,
    signers: Vec<&'a Account>,
    clock: &'a dyn Clock,
    salt_source: &'a dyn SaltSource,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(network: NetworkParams, source_account: AccountId) -> Self {
        Self {
            network,
            source_account,
            operations: Vec::new(),
            memo: Memo::None,
            time_bounds: None,
            salt: None,
            max_total_fee: None,
            signers: Vec::new(),
            clock: &SYSTEM_CLOCK,
            salt_source: &OS_SALT,
        }
    }

    /// Start from a `G…` source account id.
    pub fn for_account_id(network: NetworkParams, source_account: &str) -> Result<Self, TransactionError> {
        let source = PublicKey::from_account_id(source_account)
            .map_err(TransactionError::InvalidSourceAccount)?;
        Ok(Self::new(network, source))
    }

    /// Append an operation. Accepts a bare [`OperationBody`](crate::xdr::OperationBody)
    /// or a full [`Operation`] with its own source account.
    pub fn add_operation(mut self, operation: impl Into<Operation>) -> Self {
        self.operations.push(operation.into());
        self
    }

    pub fn add_operations<I>(mut self, operations: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Operation>,
    {
        self.operations.extend(operations.into_iter().map(Into::into));
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    pub fn time_bounds(mut self, time_bounds: TimeBounds) -> Self {
        self.time_bounds = Some(time_bounds);
        self
    }

    /// Explicit salt. Its absolute value is stored; `i64::MIN` has none and
    /// is rejected at build time.
    pub fn salt(mut self, salt: i64) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Cap the total fee the network may charge.
    pub fn max_total_fee(mut self, max_total_fee: u64) -> Self {
        self.max_total_fee = Some(max_total_fee);
        self
    }

    /// Sign with `signer` as part of `build()`.
    pub fn add_signer(mut self, signer: &'a Account) -> Self {
        self.signers.push(signer);
        self
    }

    /// Clock used for the default time bounds.
    pub fn clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Source of the default salt.
    pub fn salt_source(mut self, salt_source: &'a dyn SaltSource) -> Self {
        self.salt_source = salt_source;
        self
    }

    /// Validate, assemble and sign.
    pub fn build(self) -> Result<Transaction, TransactionError> {
        if self.operations.is_empty() {
            return Err(TransactionError::NoOperations);
        }
        if self.operations.len() > MAX_OPERATIONS as usize {
            return Err(TransactionError::TooManyOperations {
                count: self.operations.len(),
                max: MAX_OPERATIONS,
            });
        }
        if self.signers.len() > MAX_SIGNATURES as usize {
            return Err(TransactionError::TooManySignatures {
                max: MAX_SIGNATURES,
            });
        }
        if let Memo::Text(text) = &self.memo {
            if text.len() > MAX_MEMO_TEXT_LENGTH as usize {
                return Err(TransactionError::MemoTooLong {
                    length: text.len(),
                    max: MAX_MEMO_TEXT_LENGTH,
                });
            }
        }

        let raw_salt = self.salt.unwrap_or_else(|| self.salt_source.next_salt());
        if raw_salt == i64::MIN {
            return Err(TransactionError::ReservedSalt);
        }
        let salt = raw_salt.unsigned_abs();

        let time_bounds = match self.time_bounds {
            Some(bounds) => bounds,
            None => {
                let now = self.network.now_timestamp_with(self.clock);
                let now = u64::try_from(now).unwrap_or(0);
                TimeBounds::new(0, now.saturating_add(DEFAULT_TX_LIFETIME_SECONDS))
            }
        };

        let mut tx = Transaction {
            network: self.network,
            source_account: self.source_account,
            memo: self.memo,
            operations: self.operations,
            time_bounds,
            salt,
            max_total_fee: self.max_total_fee,
            signatures: Vec::new(),
        };

        debug!(
            operations = tx.operations.len(),
            salt = tx.salt,
            min_time = tx.time_bounds.min_time,
            max_time = tx.time_bounds.max_time,
            "transaction built"
        );

        for signer in self.signers {
            tx.add_signature(signer)?;
        }
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountError;
    use crate::network::FixedClock;
    use crate::transaction::FixedSalt;
    use crate::xdr::{ManageBalanceOp, OperationBody};

    const SOURCE: &str = "GDVJSBSBSERR3YP3LKLHTODWEFGCSLDWDIODER3CKLZXUMVPZOPT4MHY";

    fn network() -> NetworkParams {
        NetworkParams::new("Example Test Network").unwrap()
    }

    fn source() -> AccountId {
        PublicKey::from_account_id(SOURCE).unwrap()
    }

    fn op() -> OperationBody {
        OperationBody::ManageBalance(ManageBalanceOp::create(source(), "OLG"))
    }

    fn builder<'a>() -> TransactionBuilder<'a> {
        TransactionBuilder::new(network(), source()).add_operation(op())
    }

    #[test]
    fn empty_operation_list_is_rejected() {
        let result = TransactionBuilder::new(network(), source()).build();
        assert!(matches!(result, Err(TransactionError::NoOperations)));
    }

    #[test]
    fn too_many_operations_are_rejected() {
        let result = TransactionBuilder::new(network(), source())
            .add_operations((0..101).map(|_| op()))
            .build();
        assert!(matches!(
            result,
            Err(TransactionError::TooManyOperations { count: 101, max: 100 })
        ));
    }

    #[test]
    fn reserved_salt_is_rejected() {
        let result = builder().salt(i64::MIN).build();
        assert!(matches!(result, Err(TransactionError::ReservedSalt)));

        let result = builder().salt_source(&FixedSalt(i64::MIN)).build();
        assert!(matches!(result, Err(TransactionError::ReservedSalt)));
    }

    #[test]
    fn salt_absolute_value_is_stored() {
        let tx = builder().salt(i64::MIN + 1).build().unwrap();
        assert_eq!(tx.salt(), i64::MAX as u64);

        let tx = builder().salt(-5).build().unwrap();
        assert_eq!(tx.salt(), 5);

        let tx = builder().salt(5).build().unwrap();
        assert_eq!(tx.salt(), 5);
    }

    #[test]
    fn default_salt_comes_from_the_salt_source() {
        let tx = builder().salt_source(&FixedSalt(1234)).build().unwrap();
        assert_eq!(tx.salt(), 1234);

        let random = builder().build().unwrap();
        assert!(random.salt() <= i64::MAX as u64);
    }

    #[test]
    fn default_time_bounds_use_network_adjusted_clock() {
        let network = NetworkParams::with_options("Example Test Network", 6, 100).unwrap();
        let clock = FixedClock(1_000);
        let tx = TransactionBuilder::new(network, source())
            .add_operation(op())
            .clock(&clock)
            .build()
            .unwrap();
        assert_eq!(tx.time_bounds(), TimeBounds::new(0, 1_100 + 601_200));
    }

    #[test]
    fn explicit_time_bounds_win() {
        let tx = builder().time_bounds(TimeBounds::new(10, 42)).build().unwrap();
        assert_eq!(tx.time_bounds(), TimeBounds::new(10, 42));
    }

    #[test]
    fn defaults_have_no_memo_and_no_fee_cap() {
        let tx = builder().build().unwrap();
        assert_eq!(tx.memo(), &Memo::None);
        assert_eq!(tx.max_total_fee(), None);
        assert_eq!(tx.body().ext, TransactionExt::EmptyVersion);
        assert!(tx.signatures().is_empty());
    }

    #[test]
    fn fee_cap_goes_into_the_extension() {
        let tx = builder().max_total_fee(500).build().unwrap();
        assert_eq!(tx.body().ext, TransactionExt::AddTransactionFee(500));

        let without = builder().salt(1).time_bounds(TimeBounds::new(0, 1)).build().unwrap();
        let with = builder()
            .salt(1)
            .time_bounds(TimeBounds::new(0, 1))
            .max_total_fee(500)
            .build()
            .unwrap();
        assert_ne!(without.hash().unwrap(), with.hash().unwrap());
    }

    #[test]
    fn oversized_memo_is_rejected() {
        let result = builder().memo(Memo::Text("x".repeat(29))).build();
        assert!(matches!(
            result,
            Err(TransactionError::MemoTooLong { length: 29, max: 28 })
        ));
    }

    #[test]
    fn invalid_source_account_id_is_rejected() {
        let result = TransactionBuilder::for_account_id(network(), "GNOPE");
        assert!(matches!(result, Err(TransactionError::InvalidSourceAccount(_))));
    }

    #[test]
    fn signer_that_cannot_sign_fails_the_build() {
        let verifier = Account::from_account_id(SOURCE).unwrap();
        let result = builder().add_signer(&verifier).build();
        assert!(matches!(
            result,
            Err(TransactionError::Signing(AccountError::SigningUnavailable))
        ));
    }

    #[test]
    fn signatures_are_append_only_and_do_not_change_the_hash() {
        let a = Account::random();
        let b = Account::random();
        let mut tx = builder().add_signer(&a).build().unwrap();
        let hash = tx.hash().unwrap();

        tx.add_signature(&b).unwrap();
        assert_eq!(tx.hash().unwrap(), hash);
        assert_eq!(tx.signatures().len(), 2);
        assert_eq!(tx.signatures()[0].hint, a.signature_hint());
        assert_eq!(tx.signatures()[1].hint, b.signature_hint());

        assert!(tx.has_signature_from(&a).unwrap());
        assert!(tx.has_signature_from(&b.verify_only()).unwrap());
        assert!(tx.verify_signatures(&[&a, &b]).unwrap());
        assert!(!tx.verify_signatures(&[&a]).unwrap());
    }

    #[test]
    fn failed_signature_leaves_list_untouched() {
        let signer = Account::random();
        let mut tx = builder().add_signer(&signer).build().unwrap();
        signer.destroy();
        assert!(tx.add_signature(&signer).is_err());
        assert_eq!(tx.signatures().len(), 1);
    }

    #[test]
    fn external_signature_can_be_attached() {
        let signer = Account::random();
        let mut tx = builder().build().unwrap();
        let signature = signer.sign_decorated(&tx.hash().unwrap()).unwrap();

        tx.add_decorated_signature(signature).unwrap();
        assert!(tx.has_signature_from(&signer).unwrap());
    }

    #[test]
    fn signature_list_is_capped_and_stays_encodable() {
        let signer = Account::random();
        let mut tx = builder().build().unwrap();
        for _ in 0..MAX_SIGNATURES {
            tx.add_signature(&signer).unwrap();
        }

        assert!(matches!(
            tx.add_signature(&signer),
            Err(TransactionError::TooManySignatures { max: 20 })
        ));
        let external = signer.sign_decorated(&tx.hash().unwrap()).unwrap();
        assert!(matches!(
            tx.add_decorated_signature(external),
            Err(TransactionError::TooManySignatures { max: 20 })
        ));
        assert_eq!(tx.signatures().len(), MAX_SIGNATURES as usize);

        let encoded = tx.to_base64().unwrap();
        let decoded = Transaction::from_base64(network(), &encoded).unwrap();
        assert_eq!(decoded.signatures().len(), MAX_SIGNATURES as usize);
    }

    #[test]
    fn too_many_builder_signers_are_rejected() {
        let signer = Account::random();
        let result = (0..=MAX_SIGNATURES)
            .fold(builder(), |builder, _| builder.add_signer(&signer))
            .build();
        assert!(matches!(
            result,
            Err(TransactionError::TooManySignatures { max: 20 })
        ));
    }

    #[test]
    fn envelope_roundtrips_through_base64() {
        let signer = Account::random();
        let tx = builder()
            .memo(Memo::Id(9))
            .max_total_fee(10)
            .add_signer(&signer)
            .build()
            .unwrap();

        let encoded = tx.to_base64().unwrap();
        let decoded = Transaction::from_base64(network(), &encoded).unwrap();
        assert_eq!(decoded, tx);
        assert!(decoded.has_signature_from(&signer).unwrap());
    }

    #[test]
    fn envelope_without_operations_is_rejected() {
        let tx = builder().build().unwrap();
        let mut envelope = tx.envelope();
        envelope.tx.operations.clear();
        assert!(matches!(
            Transaction::from_envelope(network(), envelope),
            Err(TransactionError::NoOperations)
        ));
    }
}
