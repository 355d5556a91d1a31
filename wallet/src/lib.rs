// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # TokenD Wallet Core Library
//!
//! Everything a client needs to talk to a TokenD network without trusting
//! anyone else to assemble its bytes: build a transaction, encode it to XDR,
//! hash it the way validators will, sign it, and ship the envelope.
//!
//! The network does not care how pretty our Rust is. It cares that every
//! byte we emit matches the XDR definition exactly, that addresses carry
//! the right version byte and checksum, and that signatures cover the
//! canonical signature base. This crate is organised around those three
//! contracts.
//!
//! ## Architecture
//!
//! - **crypto**: SHA-256, CRC16/XMODEM and the secret-aware base-32 codec.
//! - **strkey**: Checksummed text addresses (`G…`, `S…`, `B…`, `T…`, `X…`).
//! - **xdr**: Streams, encoders, schema descriptors and the one generic
//!   decoder that turns bytes back into any described record. The
//!   operation union models two arms: `Payment` (wire code 1) and
//!   `ManageBalance` (wire code 9). Envelopes carrying any other operation
//!   are rejected with an unknown-discriminant error.
//! - **account**: Ed25519 key material with explicit destruction.
//! - **network**: Passphrase-derived network id, amount precision, clock.
//! - **transaction**: Builder, signature base, hashing, envelopes.
//! - **config**: Constants and the serde-loadable network description.
//! - **logging**: `tracing-subscriber` setup for host applications.
//!
//! ## Quick tour
//!
//! ```
//! use tokend_wallet::account::Account;
//! use tokend_wallet::network::NetworkParams;
//! use tokend_wallet::transaction::TransactionBuilder;
//! use tokend_wallet::xdr::{ManageBalanceOp, OperationBody};
//!
//! let network = NetworkParams::new("Example Test Network").unwrap();
//! let signer = Account::random();
//! let source = signer.public_key_xdr();
//!
//! let tx = TransactionBuilder::new(network, source)
//!     .add_operation(OperationBody::ManageBalance(ManageBalanceOp::create(source, "OLG")))
//!     .add_signer(&signer)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(tx.signatures().len(), 1);
//! let envelope = tx.to_base64().unwrap();
//! assert!(!envelope.is_empty());
//! ```

pub mod account;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod network;
pub mod strkey;
pub mod transaction;
pub mod xdr;

pub use account::Account;
pub use error::Error;
pub use network::NetworkParams;
pub use transaction::{Transaction, TransactionBuilder};
