mod common;

use anyhow::Result;
use bancario::application::AppError;
use common::{IDENTITY_A, register_pair, test_service};

#[tokio::test]
async fn test_register_normalizes_identity() -> Result<()> {
    let (service, _temp) = test_service()?;

    let account = service
        .register("Alice Souza".into(), "111.444.777-35", "alice-pass".into())
        .await?;

    assert_eq!(account.identity_number, "11144477735");
    assert_eq!(account.balance_cents, 0);
    assert!(account.transaction_log.is_empty());
    assert!(account.holdings.is_empty());
    assert!(account.dividends_claimed.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_invalid_identity() -> Result<()> {
    let (service, _temp) = test_service()?;

    let result = service
        .register("Mallory".into(), "11144477734", "pass".into())
        .await;
    assert!(matches!(result, Err(AppError::InvalidIdentity)));

    let result = service
        .register("Mallory".into(), "11111111111", "pass".into())
        .await;
    assert!(matches!(result, Err(AppError::InvalidIdentity)));

    // Nothing was persisted
    let auth = service.authenticate("11144477734", "pass").await;
    assert!(matches!(auth, Err(AppError::InvalidCredentials)));

    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_identity_leaves_store_unchanged() -> Result<()> {
    let (service, _temp) = test_service()?;

    service
        .register("Alice Souza".into(), IDENTITY_A, "alice-pass".into())
        .await?;

    // Same number, formatted differently and with a different credential
    let result = service
        .register("Impostor".into(), "111.444.777-35", "other-pass".into())
        .await;
    assert!(matches!(result, Err(AppError::DuplicateIdentity)));

    // The original account is intact and the impostor's credential is unknown
    let account = service.authenticate(IDENTITY_A, "alice-pass").await?;
    assert_eq!(account.name, "Alice Souza");
    let auth = service.authenticate(IDENTITY_A, "other-pass").await;
    assert!(matches!(auth, Err(AppError::InvalidCredentials)));

    Ok(())
}

#[tokio::test]
async fn test_authenticate_accepts_formatted_identity() -> Result<()> {
    let (service, _temp) = test_service()?;
    register_pair(&service).await?;

    let account = service
        .authenticate("111.444.777-35", "alice-pass")
        .await?;
    assert_eq!(account.identity_number, IDENTITY_A);

    Ok(())
}

#[tokio::test]
async fn test_authenticate_requires_both_factors() -> Result<()> {
    let (service, _temp) = test_service()?;
    register_pair(&service).await?;

    let wrong_credential = service.authenticate(IDENTITY_A, "bruno-pass").await;
    assert!(matches!(wrong_credential, Err(AppError::InvalidCredentials)));

    let unknown_identity = service.authenticate("12345678909", "alice-pass").await;
    assert!(matches!(unknown_identity, Err(AppError::InvalidCredentials)));

    Ok(())
}

#[tokio::test]
async fn test_accounts_survive_service_reopen() -> Result<()> {
    let (service, temp) = test_service()?;
    register_pair(&service).await?;
    service.deposit(IDENTITY_A, 10000).await?;
    drop(service);

    let reopened =
        bancario::application::LedgerService::open(temp.path().join("accounts.json"));
    let account = reopened.authenticate(IDENTITY_A, "alice-pass").await?;
    assert_eq!(account.balance_cents, 10000);
    assert_eq!(account.transaction_log.len(), 1);

    Ok(())
}
