use thiserror::Error;

use crate::domain::Cents;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid identity number: check the digits")]
    InvalidIdentity,

    #[error("Identity number already registered")]
    DuplicateIdentity,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Recipient identity number not found")]
    RecipientNotFound,

    #[error("Cannot transfer to the same account")]
    SelfTransfer,

    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: Cents, required: Cents },

    #[error("Insufficient holdings of {ticker}: held {held}, requested {requested}")]
    InsufficientHoldings {
        ticker: String,
        held: u32,
        requested: u32,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
