//! End-to-end tests for signed envelopes.
//!
//! These go through the public API only: load keys from their text form,
//! build and sign a payment, compare the envelope byte for byte with one the
//! network is known to accept, then decode it again and check every field
//! survived.

use tokend_wallet::account::Account;
use tokend_wallet::network::{FixedClock, NetworkParams};
use tokend_wallet::strkey;
use tokend_wallet::transaction::{FixedSalt, Transaction, TransactionBuilder, TransactionError};
use tokend_wallet::xdr::{
    self, FeeData, ManageBalanceOp, Memo, Operation, OperationBody, PaymentFeeData, PaymentOp,
    PublicKey, TimeBounds, TransactionEnvelope, XdrDecode, XdrEncode,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const PASSPHRASE: &str = "Example Test Network";
const SOURCE: &str = "GDVJSBSBSERR3YP3LKLHTODWEFGCSLDWDIODER3CKLZXUMVPZOPT4MHY";
const SIGNER_SEED: &str = "SBEBZQIXHAZ3BZXOJEN6R57KMEDISGBIIP6LAVRCNDM4WZIQPHNYZICC";
const SIGNER_ID: &str = "GBDUUU2YCXSO4EI7J7V2BRO7LZQLA25LLJYN6WOF4IDNQ7HDIE4KSGTY";
const FROM_BALANCE: &str = "BBVRUASMC2OMFGWHQPD4TTXTZZ7ACOFWWFTB5Y3K6757FSUSAEPEPXAS";
const TO_BALANCE: &str = "BCN65IW4JYFLLJADTA5PNP2N27KPGDWUBD27UAHQITRTO3ADVST4WI3O";

const EXPECTED_ENVELOPE: &str = "AAAAAOqZBkGRIx3h+1qWebh2IUwpLHYaHDJHYlLzejKvy58+AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAqAAAAAQAAAAtTYW1wbGUgdGV4dAAAAAABAAAAAAAAAAEAAAAAaxoCTBacwprHg8fJzvPOfgE4trFmHuNq9/vyypIBHkcAAAAAm+6i3E4KtaQDmDr2v03X1PMO1Aj1+gDwROM3bAOsp8sAAAAAAA9CQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAARUZXN0AAAAAAAAAAAAAAAAAAAAAAAAAAHjQTipAAAAQGslKbormeLjf75qgaaJlvVbTAM2cXgObU7pd3MWnfw+eJ4BmIJwGZxsMXBm7kY0xe1FTszUIYGs31T5MpmA2AE=";
const EXPECTED_HASH: &str = "LLMyyTiWGBjAQE95h6eH2ScEXJ6qBCW4FfCtsyp8uE8=";

fn network() -> NetworkParams {
    NetworkParams::new(PASSPHRASE).expect("valid network")
}

fn payment() -> PaymentOp {
    PaymentOp::simple(
        PublicKey::from_balance_id(FROM_BALANCE).expect("from balance"),
        PublicKey::from_balance_id(TO_BALANCE).expect("to balance"),
        1_000_000,
        PaymentFeeData::new(FeeData::new(0, 0), FeeData::new(0, 0), false),
        "Test",
    )
}

/// The payment every other wallet implementation signs in its test suite.
fn golden_transaction(signer: &Account) -> Transaction {
    TransactionBuilder::for_account_id(network(), SOURCE)
        .expect("source account")
        .add_operation(OperationBody::Payment(payment()))
        .memo(Memo::text("Sample text").expect("memo"))
        .time_bounds(TimeBounds::new(0, 42))
        .salt(0)
        .add_signer(signer)
        .build()
        .expect("build")
}

// ---------------------------------------------------------------------------
// Golden envelope
// ---------------------------------------------------------------------------

#[test]
fn signed_payment_matches_known_envelope() {
    let signer = Account::from_secret_seed(SIGNER_SEED).expect("seed");
    assert_eq!(signer.account_id(), SIGNER_ID);

    let tx = golden_transaction(&signer);

    let hash = tx.hash().expect("hash");
    assert_eq!(xdr::encode_base64(&hash), EXPECTED_HASH);
    assert_eq!(tx.to_base64().expect("envelope"), EXPECTED_ENVELOPE);

    assert_eq!(tx.signatures().len(), 1);
    assert_eq!(hex::encode(tx.signatures()[0].hint), "e34138a9");
}

#[test]
fn known_envelope_decodes_to_the_same_transaction() {
    let signer = Account::from_secret_seed(SIGNER_SEED).expect("seed");
    let decoded = Transaction::from_base64(network(), EXPECTED_ENVELOPE).expect("decode");

    assert_eq!(decoded, golden_transaction(&signer));
    assert_eq!(decoded.source_account().to_account_id(), SOURCE);
    assert_eq!(decoded.salt(), 0);
    assert_eq!(decoded.time_bounds(), TimeBounds::new(0, 42));
    assert_eq!(decoded.memo(), &Memo::Text("Sample text".to_string()));
    assert_eq!(decoded.max_total_fee(), None);

    match &decoded.operations()[0].body {
        OperationBody::Payment(op) => {
            assert_eq!(op.source_balance_id.to_balance_id(), FROM_BALANCE);
            assert_eq!(op.destination_balance_id.to_balance_id(), TO_BALANCE);
            assert_eq!(op.amount, 1_000_000);
            assert_eq!(op.subject, "Test");
            assert_eq!(op.reference, "");
            assert!(op.invoice_reference.is_none());
        }
        other => panic!("expected payment, got {other:?}"),
    }

    // A verify-only copy of the signer is enough to check the signature.
    let verifier = Account::from_account_id(SIGNER_ID).expect("account id");
    assert!(decoded.has_signature_from(&verifier).expect("hash"));
    assert!(decoded.verify_signatures(&[&verifier]).expect("hash"));
}

#[test]
fn envelope_is_rejected_on_another_network() {
    let other = NetworkParams::new("Public Global TokenD Network").expect("network");
    let verifier = Account::from_account_id(SIGNER_ID).expect("account id");
    let decoded = Transaction::from_base64(other, EXPECTED_ENVELOPE).expect("decode");

    assert!(!decoded.has_signature_from(&verifier).expect("hash"));
}

#[test]
fn envelope_bytes_are_four_byte_aligned_and_strict() {
    let bytes = xdr::decode_base64(EXPECTED_ENVELOPE).expect("base64");
    assert_eq!(bytes.len() % 4, 0);

    let mut truncated = bytes.clone();
    truncated.pop();
    assert!(TransactionEnvelope::from_xdr(&truncated).is_err());

    let mut extended = bytes;
    extended.extend_from_slice(&[0, 0, 0, 0]);
    assert!(TransactionEnvelope::from_xdr(&extended).is_err());
}

// ---------------------------------------------------------------------------
// Multi-party signing
// ---------------------------------------------------------------------------

#[test]
fn co_signer_adds_signature_to_decoded_envelope() {
    let alice = Account::random();
    let bob = Account::random();
    let clock = FixedClock(1_700_000_000);
    let salt = FixedSalt(77);

    let tx = TransactionBuilder::new(network(), alice.public_key_xdr())
        .add_operation(Operation {
            source_account: Some(bob.public_key_xdr()),
            body: OperationBody::ManageBalance(ManageBalanceOp::create(
                bob.public_key_xdr(),
                "OLG",
            )),
        })
        .clock(&clock)
        .salt_source(&salt)
        .add_signer(&alice)
        .build()
        .expect("build");

    // Alice ships the envelope, Bob decodes it and co-signs.
    let wire = tx.to_base64().expect("envelope");
    let mut received = Transaction::from_base64(network(), &wire).expect("decode");
    assert_eq!(received.hash().expect("hash"), tx.hash().expect("hash"));

    received.add_signature(&bob).expect("sign");
    assert_eq!(received.signatures().len(), 2);
    assert!(received.verify_signatures(&[&alice, &bob]).expect("hash"));

    // Once Bob wipes his key he can still be verified against, never sign.
    bob.destroy();
    assert!(matches!(
        received.add_signature(&bob),
        Err(TransactionError::Signing(_))
    ));
    assert_eq!(received.signatures().len(), 2);
}

#[test]
fn operation_roundtrips_through_generic_decoder() {
    let op = Operation::from(OperationBody::Payment(payment()));
    let bytes = op.to_xdr().expect("encode");
    assert_eq!(Operation::from_xdr(&bytes).expect("decode"), op);
}

#[test]
fn strkey_helpers_agree_with_account() {
    let signer = Account::from_secret_seed(SIGNER_SEED).expect("seed");
    let seed = signer.secret_seed().expect("seed available");
    assert_eq!(seed.as_str(), SIGNER_SEED);

    let raw = strkey::decode_account_id(SIGNER_ID).expect("account id");
    assert_eq!(raw, signer.public_key_bytes());
    assert_eq!(strkey::encode_account_id(&raw), SIGNER_ID);
}
