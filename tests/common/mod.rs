// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use bancario::application::LedgerService;
use bancario::domain::Account;
use tempfile::TempDir;

/// Check-digit-valid identity numbers for test accounts.
pub const IDENTITY_A: &str = "11144477735";
pub const IDENTITY_B: &str = "52998224725";
pub const IDENTITY_C: &str = "12345678909";

/// Helper to create a test service backed by a temporary store file
pub fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let store_path = temp_dir.path().join("accounts.json");
    let service = LedgerService::open(&store_path);
    Ok((service, temp_dir))
}

/// Register the two standard test accounts: Alice (A) and Bruno (B)
pub async fn register_pair(service: &LedgerService) -> Result<(Account, Account)> {
    let alice = service
        .register("Alice Souza".into(), IDENTITY_A, "alice-pass".into())
        .await?;
    let bruno = service
        .register("Bruno Costa".into(), IDENTITY_B, "bruno-pass".into())
        .await?;
    Ok((alice, bruno))
}
