use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, div_round};

/// Which way an equity trade goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A held instrument: how many units, and the running weighted average price
/// paid per unit. Selling reduces quantity but never touches the average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub quantity: u32,
    pub average_cost_cents: Cents,
}

/// One customer record. Accounts are keyed by their normalized identity
/// number, which is immutable after registration.
///
/// The three collections default to empty on deserialization so that records
/// written before those fields existed load cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub identity_number: String,
    pub credential: String,
    pub balance_cents: Cents,
    #[serde(default)]
    pub transaction_log: Vec<Transaction>,
    #[serde(default)]
    pub holdings: BTreeMap<String, Position>,
    #[serde(default)]
    pub dividends_claimed: BTreeSet<String>,
}

impl Account {
    /// Create a fresh account with zero balance and empty history.
    /// `identity_number` must already be normalized and validated.
    pub fn new(name: String, identity_number: String, credential: String) -> Self {
        Self {
            name,
            identity_number,
            credential,
            balance_cents: 0,
            transaction_log: Vec::new(),
            holdings: BTreeMap::new(),
            dividends_claimed: BTreeSet::new(),
        }
    }

    /// Prepend a transaction - the statement is kept newest first.
    pub fn record(&mut self, transaction: Transaction) {
        self.transaction_log.insert(0, transaction);
    }

    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.holdings.get(ticker)
    }

    /// Fold a purchase into the holding, recomputing the weighted average
    /// cost: (existing_qty * existing_avg + total_cost) / (existing_qty + qty),
    /// rounded to the nearest cent.
    pub fn add_holding(&mut self, ticker: &str, quantity: u32, total_cost_cents: Cents) {
        let position = self
            .holdings
            .entry(ticker.to_string())
            .or_insert(Position {
                quantity: 0,
                average_cost_cents: 0,
            });

        let prior_cost = position.quantity as i64 * position.average_cost_cents;
        let combined_quantity = position.quantity as i64 + quantity as i64;
        position.average_cost_cents = div_round(prior_cost + total_cost_cents, combined_quantity);
        position.quantity += quantity;
    }

    /// Take `quantity` units out of the holding. Returns false (and leaves the
    /// account untouched) if the ticker is absent or short; a position drained
    /// to zero is removed from the map entirely.
    pub fn remove_holding(&mut self, ticker: &str, quantity: u32) -> bool {
        let Some(position) = self.holdings.get_mut(ticker) else {
            return false;
        };
        if position.quantity < quantity {
            return false;
        }

        position.quantity -= quantity;
        if position.quantity == 0 {
            self.holdings.remove(ticker);
        }
        true
    }

    /// Composite key marking a dividend payment as settled.
    pub fn claim_key(ticker: &str, payment_date: NaiveDate) -> String {
        format!("{}_{}", ticker, payment_date.format("%d/%m/%Y"))
    }

    pub fn has_claimed(&self, key: &str) -> bool {
        self.dividends_claimed.contains(key)
    }

    pub fn claim(&mut self, key: String) {
        self.dividends_claimed.insert(key);
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::TransactionKind;

    use super::*;

    fn sample_account() -> Account {
        Account::new(
            "Joana Lima".into(),
            "11144477735".into(),
            "secret".into(),
        )
    }

    #[test]
    fn test_new_account_is_empty() {
        let account = sample_account();
        assert_eq!(account.balance_cents, 0);
        assert!(account.transaction_log.is_empty());
        assert!(account.holdings.is_empty());
        assert!(account.dividends_claimed.is_empty());
    }

    #[test]
    fn test_log_is_newest_first() {
        let mut account = sample_account();
        account.record(Transaction::new(TransactionKind::Deposit, 10000, ""));
        account.record(Transaction::new(TransactionKind::Withdrawal, -2000, ""));

        assert_eq!(account.transaction_log.len(), 2);
        assert_eq!(
            account.transaction_log[0].kind,
            TransactionKind::Withdrawal
        );
        assert_eq!(account.transaction_log[1].kind, TransactionKind::Deposit);
    }

    #[test]
    fn test_first_buy_sets_average_to_unit_price() {
        let mut account = sample_account();
        account.add_holding("PETR4", 10, 40000); // 10 @ 40.00

        let position = account.position("PETR4").unwrap();
        assert_eq!(position.quantity, 10);
        assert_eq!(position.average_cost_cents, 4000);
    }

    #[test]
    fn test_second_buy_reweights_average() {
        let mut account = sample_account();
        account.add_holding("PETR4", 10, 40000); // 10 @ 40.00
        account.add_holding("PETR4", 10, 60000); // 10 @ 60.00

        let position = account.position("PETR4").unwrap();
        assert_eq!(position.quantity, 20);
        // (10*4000 + 60000) / 20 = 5000
        assert_eq!(position.average_cost_cents, 5000);
    }

    #[test]
    fn test_sell_keeps_average_cost() {
        let mut account = sample_account();
        account.add_holding("VALE3", 8, 54560);
        let average = account.position("VALE3").unwrap().average_cost_cents;

        assert!(account.remove_holding("VALE3", 3));
        let position = account.position("VALE3").unwrap();
        assert_eq!(position.quantity, 5);
        assert_eq!(position.average_cost_cents, average);
    }

    #[test]
    fn test_drained_position_is_removed() {
        let mut account = sample_account();
        account.add_holding("WEGE3", 5, 20000);

        assert!(account.remove_holding("WEGE3", 5));
        assert!(account.position("WEGE3").is_none());
    }

    #[test]
    fn test_oversell_is_rejected_untouched() {
        let mut account = sample_account();
        account.add_holding("WEGE3", 5, 20000);

        assert!(!account.remove_holding("WEGE3", 6));
        assert!(!account.remove_holding("PETR4", 1));
        assert_eq!(account.position("WEGE3").unwrap().quantity, 5);
    }

    #[test]
    fn test_claim_key_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(Account::claim_key("PETR4", date), "PETR4_05/03/2026");
    }

    #[test]
    fn test_claims_are_remembered() {
        let mut account = sample_account();
        let key = Account::claim_key("PETR4", NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());

        assert!(!account.has_claimed(&key));
        account.claim(key.clone());
        assert!(account.has_claimed(&key));
    }
}
