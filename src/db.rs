// src/db.rs
use crate::models::{Account, PortfolioEntry};
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use scylla::{query::Query, Session, SessionBuilder};
use std::collections::HashMap;
use std::sync::Mutex;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Keyed account persistence. Absent accounts are a valid silent outcome
/// (`Ok(None)` from `balance`); nothing here ever creates one. The balance
/// overwrite and the portfolio append are two independent writes with no
/// transaction between them.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn balance(&self, phone_number: &str) -> Result<Option<f64>, StoreError>;
    async fn set_balance(&self, phone_number: &str, balance: f64) -> Result<(), StoreError>;
    async fn append_purchase(
        &self,
        phone_number: &str,
        symbol: &str,
        amount: f64,
    ) -> Result<(), StoreError>;
}

pub async fn init(node: &str) -> Result<Session, Box<dyn std::error::Error>> {
    let session = SessionBuilder::new().known_node(node).build().await?;

    // Create keyspace and tables if they don't exist
    session.query("CREATE KEYSPACE IF NOT EXISTS ivr_trading WITH REPLICATION = {'class': 'SimpleStrategy', 'replication_factor': 1}", &[]).await?;
    session
        .query(
            "CREATE TABLE IF NOT EXISTS ivr_trading.accounts (phone_number TEXT PRIMARY KEY, balance DOUBLE)",
            &[],
        )
        .await?;
    session.query("CREATE TABLE IF NOT EXISTS ivr_trading.portfolio_entries (phone_number TEXT, purchased_at TIMESTAMP, symbol TEXT, amount DOUBLE, PRIMARY KEY (phone_number, purchased_at)) WITH CLUSTERING ORDER BY (purchased_at ASC)", &[]).await?;

    info!("Successfully connected to ScyllaDB.");
    Ok(session)
}

pub struct ScyllaAccountStore {
    session: Session,
}

impl ScyllaAccountStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl AccountStore for ScyllaAccountStore {
    async fn balance(&self, phone_number: &str) -> Result<Option<f64>, StoreError> {
        let query = Query::new("SELECT balance FROM ivr_trading.accounts WHERE phone_number = ?");
        let result = self.session.query(query, (phone_number,)).await?;
        if let Some(row) = result.rows.unwrap_or_default().into_iter().next() {
            let balance = row.columns[0]
                .as_ref()
                .and_then(|col| col.as_double())
                .ok_or("balance column missing")?;
            Ok(Some(balance))
        } else {
            Ok(None)
        }
    }

    async fn set_balance(&self, phone_number: &str, balance: f64) -> Result<(), StoreError> {
        // A bare CQL UPDATE is an upsert; IF EXISTS keeps this an overwrite
        // of existing rows only.
        let query = Query::new(
            "UPDATE ivr_trading.accounts SET balance = ? WHERE phone_number = ? IF EXISTS",
        );
        self.session.query(query, (balance, phone_number)).await?;
        Ok(())
    }

    async fn append_purchase(
        &self,
        phone_number: &str,
        symbol: &str,
        amount: f64,
    ) -> Result<(), StoreError> {
        // Appends for unknown accounts are dropped, not inserted.
        if self.balance(phone_number).await?.is_none() {
            return Ok(());
        }
        let query = Query::new("INSERT INTO ivr_trading.portfolio_entries (phone_number, purchased_at, symbol, amount) VALUES (?, ?, ?, ?)");
        let purchased_at = Utc::now().timestamp_millis();
        self.session
            .query(query, (phone_number, purchased_at, symbol, amount))
            .await?;
        Ok(())
    }
}

/// In-memory store for tests and local runs without a database.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, phone_number: &str, balance: f64) -> Self {
        self.accounts.lock().unwrap().insert(
            phone_number.to_string(),
            Account {
                phone_number: phone_number.to_string(),
                balance,
                portfolio: Vec::new(),
            },
        );
        self
    }

    pub fn account(&self, phone_number: &str) -> Option<Account> {
        self.accounts.lock().unwrap().get(phone_number).cloned()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn balance(&self, phone_number: &str) -> Result<Option<f64>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(phone_number)
            .map(|account| account.balance))
    }

    async fn set_balance(&self, phone_number: &str, balance: f64) -> Result<(), StoreError> {
        // Updating a missing account is a no-op, never an insert.
        if let Some(account) = self.accounts.lock().unwrap().get_mut(phone_number) {
            account.balance = balance;
        }
        Ok(())
    }

    async fn append_purchase(
        &self,
        phone_number: &str,
        symbol: &str,
        amount: f64,
    ) -> Result<(), StoreError> {
        if let Some(account) = self.accounts.lock().unwrap().get_mut(phone_number) {
            account.portfolio.push(PortfolioEntry {
                symbol: symbol.to_string(),
                amount,
            });
        }
        Ok(())
    }
}
