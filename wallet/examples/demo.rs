//! Terminal walkthrough of the wallet lifecycle.
//!
//! Loads a network description, creates and restores accounts, builds a
//! payment, signs it with two parties, round-trips the envelope through
//! base64 and finally wipes the signing keys.
//!
//! Run with:
//!   cargo run --example demo
//!
//! Set `RUST_LOG=tokend_wallet=debug` to see the library's own events.

use std::time::Instant;

use tokend_wallet::account::Account;
use tokend_wallet::config::NetworkConfig;
use tokend_wallet::logging::{init_logging, LogFormat};
use tokend_wallet::transaction::{Transaction, TransactionBuilder};
use tokend_wallet::xdr::{
    encode_base64, FeeData, ManageBalanceOp, Memo, OperationBody, PaymentFeeData, PaymentOp,
    PublicKey,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                          {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    TOKEND WALLET  --  Transaction Lifecycle Demo         {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                          {RESET}");
    println!();
}

fn section(title: &str) {
    println!();
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!("{DIM}  {}{RESET}", "-".repeat(title.len()));
}

fn narrate(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn ok(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn field(label: &str, value: impl std::fmt::Display) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("warn", LogFormat::Pretty);
    banner();

    // -- Network -------------------------------------------------------------

    section("1. Network");
    let network = NetworkConfig::from_json(
        r#"{ "passphrase": "Example Test Network", "precision": 6 }"#,
    )?
    .into_params()?;
    field("passphrase", network.passphrase());
    field("network id", hex::encode(network.network_id()));
    field("1.5 in network units", network.amount_to_precised("1.5".parse()?)?);

    // -- Accounts ------------------------------------------------------------

    section("2. Accounts");
    narrate("Alice gets a fresh key; Bob restores his from a seed.");
    let alice = Account::random();
    let bob = Account::from_secret_seed("SBEBZQIXHAZ3BZXOJEN6R57KMEDISGBIIP6LAVRCNDM4WZIQPHNYZICC")?;
    field("alice", alice.account_id());
    field("bob", bob.account_id());
    field("bob's hint", hex::encode(bob.signature_hint()));

    // -- Build ---------------------------------------------------------------

    section("3. Build");
    let started = Instant::now();
    let payment = PaymentOp::simple(
        PublicKey::from_balance_id("BBVRUASMC2OMFGWHQPD4TTXTZZ7ACOFWWFTB5Y3K6757FSUSAEPEPXAS")?,
        PublicKey::from_balance_id("BCN65IW4JYFLLJADTA5PNP2N27KPGDWUBD27UAHQITRTO3ADVST4WI3O")?,
        network.amount_to_precised("1".parse()?)? as i64,
        PaymentFeeData::new(FeeData::new(0, 0), FeeData::new(0, 0), false),
        "Lunch",
    );
    let mut tx = TransactionBuilder::new(network.clone(), alice.public_key_xdr())
        .add_operation(OperationBody::Payment(payment))
        .add_operation(OperationBody::ManageBalance(ManageBalanceOp::create(
            bob.public_key_xdr(),
            "OLG",
        )))
        .memo(Memo::text("Sample text")?)
        .max_total_fee(10)
        .add_signer(&alice)
        .build()?;
    field("operations", tx.operations().len());
    field("salt", tx.salt());
    field("valid until", tx.time_bounds().max_time);
    field("hash", encode_base64(&tx.hash()?));
    ok(&format!("built and signed in {:.2} ms", started.elapsed().as_secs_f64() * 1e3));

    // -- Co-sign -------------------------------------------------------------

    section("4. Co-sign");
    narrate("Bob receives the envelope, decodes it and adds his signature.");
    let wire = tx.to_base64()?;
    let mut received = Transaction::from_base64(network, &wire)?;
    received.add_signature(&bob)?;
    tx = received;
    field("signatures", tx.signatures().len());
    if tx.verify_signatures(&[&alice, &bob])? {
        ok("every signature verifies");
    }
    field("envelope", tx.to_base64()?);

    // -- Destroy -------------------------------------------------------------

    section("5. Destroy");
    alice.destroy();
    bob.destroy();
    narrate("Keys are wiped. Verification still works, signing does not.");
    field("alice can sign", alice.can_sign());
    field("bob's signature still verifies", tx.has_signature_from(&bob)?);
    if tx.add_signature(&alice).is_err() {
        ok("destroyed account refused to sign");
    }

    println!();
    Ok(())
}
