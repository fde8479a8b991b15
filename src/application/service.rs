use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{
    Account, Cents, TradeSide, Transaction, TransactionKind, normalize_identity,
    validate_identity,
};
use crate::market::{DividendEntry, Market, Quote};
use crate::storage::AccountStore;

use super::AppError;

/// Application service providing the banking operations. This is the primary
/// interface for any client (CLI, API, TUI, etc.).
///
/// Every mutating operation is a full cycle: load the whole collection, locate
/// the account(s) by identity number, validate, mutate in memory, save the
/// whole collection. A failed validation never mutates and never persists.
/// There is no ambient session state: callers pass the identity into each call
/// and get the updated account snapshot back.
pub struct LedgerService {
    store: AccountStore,
    market: Market,
}

/// Result of a peer transfer.
pub struct TransferReceipt {
    /// Sender account after the debit.
    pub sender: Account,
    pub recipient_name: String,
    pub amount_cents: Cents,
}

/// One dividend credit within a settlement.
pub struct DividendPayment {
    pub ticker: String,
    pub amount_cents: Cents,
}

/// Result of a dividend settlement run.
pub struct DividendSettlement {
    pub total_cents: Cents,
    pub payments: Vec<DividendPayment>,
    /// Account after all credits (unchanged if nothing was due).
    pub account: Account,
}

impl LedgerService {
    /// Create a service with the given store.
    pub fn new(store: AccountStore) -> Self {
        Self {
            store,
            market: Market::new(),
        }
    }

    /// Open a service over the account file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(AccountStore::new(path))
    }

    // ========================
    // Account lifecycle
    // ========================

    /// Register a new account with zero balance.
    pub async fn register(
        &self,
        name: String,
        identity_raw: &str,
        credential: String,
    ) -> Result<Account, AppError> {
        if !validate_identity(identity_raw) {
            return Err(AppError::InvalidIdentity);
        }
        let identity = normalize_identity(identity_raw);

        let mut accounts = self.store.load_all().await?;
        if accounts.iter().any(|a| a.identity_number == identity) {
            return Err(AppError::DuplicateIdentity);
        }

        let account = Account::new(name, identity, credential);
        accounts.push(account.clone());
        self.store.save_all(&accounts).await?;

        info!(identity = %account.identity_number, "account registered");
        Ok(account)
    }

    /// Authenticate and return the account snapshot.
    pub async fn authenticate(
        &self,
        identity_raw: &str,
        credential: &str,
    ) -> Result<Account, AppError> {
        let identity = normalize_identity(identity_raw);
        let accounts = self.store.load_all().await?;

        accounts
            .into_iter()
            .find(|a| a.identity_number == identity && a.credential == credential)
            .ok_or(AppError::InvalidCredentials)
    }

    // ========================
    // Balance operations
    // ========================

    /// Add a signed amount to the balance and record a transaction of `kind`.
    ///
    /// This is the raw primitive: it does not enforce a non-negative balance.
    /// Callers are responsible for the sign and for pre-checking funds; the
    /// `deposit`/`withdraw`/`transfer`/`invest` operations do exactly that.
    pub async fn adjust_balance(
        &self,
        identity: &str,
        amount_cents: Cents,
        kind: TransactionKind,
    ) -> Result<Account, AppError> {
        let mut accounts = self.store.load_all().await?;
        let account = find_account(&mut accounts, identity)?;

        account.balance_cents += amount_cents;
        account.record(Transaction::new(kind, amount_cents, ""));
        let snapshot = account.clone();

        self.store.save_all(&accounts).await?;
        info!(identity, amount = amount_cents, kind = %kind, "balance adjusted");
        Ok(snapshot)
    }

    /// Credit the balance. Fails with `InvalidAmount` unless `amount_cents > 0`.
    pub async fn deposit(&self, identity: &str, amount_cents: Cents) -> Result<Account, AppError> {
        require_positive(amount_cents)?;
        self.adjust_balance(identity, amount_cents, TransactionKind::Deposit)
            .await
    }

    /// Debit the balance. Fails with `InvalidAmount` unless `amount_cents > 0`,
    /// and with `InsufficientFunds` if the balance would go negative.
    pub async fn withdraw(&self, identity: &str, amount_cents: Cents) -> Result<Account, AppError> {
        require_positive(amount_cents)?;

        let account = self.authenticate_by_identity(identity).await?;
        if account.balance_cents < amount_cents {
            return Err(AppError::InsufficientFunds {
                balance: account.balance_cents,
                required: amount_cents,
            });
        }

        self.adjust_balance(identity, -amount_cents, TransactionKind::Withdrawal)
            .await
    }

    /// Move money to another account, keyed by the recipient's identity
    /// number. Both legs are recorded and persisted in the same save.
    pub async fn transfer(
        &self,
        sender_identity: &str,
        recipient_raw: &str,
        amount_cents: Cents,
    ) -> Result<TransferReceipt, AppError> {
        require_positive(amount_cents)?;
        let recipient_identity = normalize_identity(recipient_raw);

        let mut accounts = self.store.load_all().await?;

        let Some(recipient_index) = accounts
            .iter()
            .position(|a| a.identity_number == recipient_identity)
        else {
            return Err(AppError::RecipientNotFound);
        };
        let Some(sender_index) = accounts
            .iter()
            .position(|a| a.identity_number == sender_identity)
        else {
            return Err(AppError::InvalidCredentials);
        };
        if sender_index == recipient_index {
            return Err(AppError::SelfTransfer);
        }
        if accounts[sender_index].balance_cents < amount_cents {
            return Err(AppError::InsufficientFunds {
                balance: accounts[sender_index].balance_cents,
                required: amount_cents,
            });
        }

        let sender_name = accounts[sender_index].name.clone();
        let recipient_name = accounts[recipient_index].name.clone();

        let sender = &mut accounts[sender_index];
        sender.balance_cents -= amount_cents;
        sender.record(Transaction::new(
            TransactionKind::TransferSent,
            -amount_cents,
            format!("To: {recipient_name}"),
        ));
        let sender_snapshot = sender.clone();

        let recipient = &mut accounts[recipient_index];
        recipient.balance_cents += amount_cents;
        recipient.record(Transaction::new(
            TransactionKind::TransferReceived,
            amount_cents,
            format!("From: {sender_name}"),
        ));

        self.store.save_all(&accounts).await?;
        info!(
            from = sender_identity,
            to = %recipient_identity,
            amount = amount_cents,
            "transfer applied"
        );

        Ok(TransferReceipt {
            sender: sender_snapshot,
            recipient_name,
            amount_cents,
        })
    }

    // ========================
    // Investments
    // ========================

    /// Buy or sell `quantity` units of `ticker` at `unit_price_cents`.
    pub async fn invest(
        &self,
        identity: &str,
        ticker: &str,
        quantity: u32,
        unit_price_cents: Cents,
        side: TradeSide,
    ) -> Result<Account, AppError> {
        if quantity == 0 {
            return Err(AppError::InvalidAmount(
                "Quantity must be positive".to_string(),
            ));
        }
        require_positive(unit_price_cents)?;

        let total_cents = quantity as i64 * unit_price_cents;
        let mut accounts = self.store.load_all().await?;
        let account = find_account(&mut accounts, identity)?;

        match side {
            TradeSide::Buy => {
                if account.balance_cents < total_cents {
                    return Err(AppError::InsufficientFunds {
                        balance: account.balance_cents,
                        required: total_cents,
                    });
                }
                account.balance_cents -= total_cents;
                account.add_holding(ticker, quantity, total_cents);
                account.record(Transaction::new(
                    TransactionKind::Investment,
                    -total_cents,
                    format!("{quantity}x {ticker}"),
                ));
            }
            TradeSide::Sell => {
                let held = account.position(ticker).map_or(0, |p| p.quantity);
                if !account.remove_holding(ticker, quantity) {
                    return Err(AppError::InsufficientHoldings {
                        ticker: ticker.to_string(),
                        held,
                        requested: quantity,
                    });
                }
                account.balance_cents += total_cents;
                account.record(Transaction::new(
                    TransactionKind::Divestment,
                    total_cents,
                    format!("{quantity}x {ticker}"),
                ));
            }
        }

        let snapshot = account.clone();
        self.store.save_all(&accounts).await?;
        info!(identity, ticker, quantity, total = total_cents, ?side, "trade applied");
        Ok(snapshot)
    }

    /// Credit every dividend due on or before `today` that has not been
    /// claimed yet. Persists only when at least one payment was made, so a
    /// second run on the same day settles nothing.
    pub async fn settle_dividends(
        &self,
        identity: &str,
        today: NaiveDate,
    ) -> Result<DividendSettlement, AppError> {
        let schedule = self.market.dividend_schedule(today);

        let mut accounts = self.store.load_all().await?;
        let account = find_account(&mut accounts, identity)?;

        let mut payments = Vec::new();
        let mut total_cents: Cents = 0;

        for (ticker, entry) in &schedule {
            let held = account.position(ticker).map_or(0, |p| p.quantity);
            if held == 0 || entry.payment_date > today {
                continue;
            }

            let key = Account::claim_key(ticker, entry.payment_date);
            if account.has_claimed(&key) {
                continue;
            }

            let amount_cents = entry.per_share_cents * held as i64;
            account.balance_cents += amount_cents;
            account.claim(key);
            account.record(Transaction::new(
                TransactionKind::Dividend,
                amount_cents,
                ticker.clone(),
            ));

            total_cents += amount_cents;
            payments.push(DividendPayment {
                ticker: ticker.clone(),
                amount_cents,
            });
        }

        let snapshot = account.clone();
        if !payments.is_empty() {
            self.store.save_all(&accounts).await?;
            info!(identity, total = total_cents, count = payments.len(), "dividends settled");
        }

        Ok(DividendSettlement {
            total_cents,
            payments,
            account: snapshot,
        })
    }

    // ========================
    // Read-only views
    // ========================

    /// Market quotes for rendering.
    pub fn quotes(&self) -> BTreeMap<String, Quote> {
        self.market.quotes()
    }

    /// Quote for a single ticker.
    pub fn quote(&self, ticker: &str) -> Result<Quote, AppError> {
        self.market
            .quote(ticker)
            .ok_or_else(|| AppError::UnknownTicker(ticker.to_string()))
    }

    /// Dividend calendar relative to `today`, for rendering.
    pub fn dividend_schedule(&self, today: NaiveDate) -> BTreeMap<String, DividendEntry> {
        self.market.dividend_schedule(today)
    }

    /// The newest `limit` statement entries (all of them if `None`).
    pub async fn statement(
        &self,
        identity_raw: &str,
        credential: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>, AppError> {
        let account = self.authenticate(identity_raw, credential).await?;
        let mut log = account.transaction_log;
        if let Some(limit) = limit {
            log.truncate(limit);
        }
        Ok(log)
    }

    /// Look up an account by normalized identity number alone. Internal:
    /// operations that already hold an authenticated identity use this to
    /// re-read fresh state.
    async fn authenticate_by_identity(&self, identity: &str) -> Result<Account, AppError> {
        let accounts = self.store.load_all().await?;
        accounts
            .into_iter()
            .find(|a| a.identity_number == identity)
            .ok_or(AppError::InvalidCredentials)
    }
}

fn require_positive(amount_cents: Cents) -> Result<(), AppError> {
    if amount_cents <= 0 {
        return Err(AppError::InvalidAmount(
            "Amount must be positive".to_string(),
        ));
    }
    Ok(())
}

fn find_account<'a>(
    accounts: &'a mut [Account],
    identity: &str,
) -> Result<&'a mut Account, AppError> {
    accounts
        .iter_mut()
        .find(|a| a.identity_number == identity)
        .ok_or(AppError::InvalidCredentials)
}
