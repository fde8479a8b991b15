use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Cents;

/// Timestamp format used in the durable statement log, e.g. "28/02/2026 14:30".
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    TransferSent,
    TransferReceived,
    Investment,
    Divestment,
    Dividend,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::TransferSent => "Transfer sent",
            TransactionKind::TransferReceived => "Transfer received",
            TransactionKind::Investment => "Investment",
            TransactionKind::Divestment => "Divestment",
            TransactionKind::Dividend => "Dividend",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single statement entry. Immutable once recorded - the log is append-only
/// and corrections happen through new entries, never edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub kind: TransactionKind,
    pub amount_cents: Cents,
    #[serde(default)]
    pub detail: String,
}

impl Transaction {
    /// Create a transaction stamped with the current local time.
    pub fn new(kind: TransactionKind, amount_cents: Cents, detail: impl Into<String>) -> Self {
        Self::at(Local::now().naive_local(), kind, amount_cents, detail)
    }

    /// Create a transaction with an explicit timestamp.
    pub fn at(
        timestamp: NaiveDateTime,
        kind: TransactionKind,
        amount_cents: Cents,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            kind,
            amount_cents,
            detail: detail.into(),
        }
    }

    /// Negative amounts are money leaving the account.
    pub fn is_outflow(&self) -> bool {
        self.amount_cents < 0
    }
}

/// Serde adapter for the "DD/MM/YYYY HH:MM" timestamp encoding.
mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
