//! Crate-wide error type.
//!
//! Each module has its own error enum naming exactly what can go wrong
//! there. [`Error`] wraps all of them for callers that just want `?` to
//! work across module boundaries.

use thiserror::Error;

use crate::account::AccountError;
use crate::crypto::Base32Error;
use crate::network::NetworkError;
use crate::strkey::FormatError;
use crate::transaction::TransactionError;
use crate::xdr::XdrError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Base32(#[from] Base32Error),

    #[error(transparent)]
    Xdr(#[from] XdrError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::network::NetworkParams;
    use crate::transaction::Transaction;

    fn load(json: &str, envelope: &str) -> Result<Transaction> {
        let params = NetworkConfig::from_json(json)?.into_params()?;
        Ok(Transaction::from_base64(params, envelope)?)
    }

    #[test]
    fn question_mark_converts_module_errors() {
        let err = load("not json", "").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = load(r#"{ "passphrase": "p", "precision": 9 }"#, "").unwrap_err();
        assert!(matches!(err, Error::Network(_)));

        let err = load(r#"{ "passphrase": "p" }"#, "!!!").unwrap_err();
        assert!(matches!(err, Error::Transaction(TransactionError::Xdr(_))));
    }

    #[test]
    fn transparent_display() {
        let err: Error = NetworkParams::with_options("p", 7, 0).unwrap_err().into();
        assert_eq!(err.to_string(), "precision 7 is larger than the maximum of 6");
    }
}
