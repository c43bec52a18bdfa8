mod common;

use std::sync::Arc;

use common::TestService;
use identity_service::account::errors::AccountError;
use identity_service::account::errors::AccountField;
use identity_service::account::models::EmailAddress;
use identity_service::account::models::RegisterCommand;
use identity_service::account::models::Username;
use identity_service::account::ports::AuthServicePort;
use identity_service::account::ports::CredentialStore;

#[tokio::test]
async fn test_register_login_identify() {
    let test = TestService::new();

    let registered = test
        .service
        .register(RegisterCommand::new("alice@example.com", "alice", "password123"))
        .await
        .unwrap();
    let logged_in = test
        .service
        .login("alice@example.com", "password123")
        .await
        .unwrap();

    assert_eq!(registered.account.id, logged_in.account.id);
    assert!(test.service.validate_token(&logged_in.token));

    let caller = test
        .service
        .identify_caller(&logged_in.token)
        .await
        .unwrap()
        .expect("token should resolve to an account");
    assert_eq!(caller.id, registered.account.id);
    assert!(caller.last_login_at.is_some());
}

#[tokio::test]
async fn test_failed_insert_leaves_no_account() {
    let test = TestService::new();
    test.store.fail_inserts(true);

    let result = test
        .service
        .register(RegisterCommand::new("alice@example.com", "alice", "password123"))
        .await;
    assert!(matches!(result, Err(AccountError::DatabaseError(_))));

    let email = EmailAddress::new("alice@example.com".to_string()).unwrap();
    let username = Username::new("alice".to_string()).unwrap();
    assert!(test.store.find_by_email(&email).await.unwrap().is_none());
    assert!(test.store.find_by_username(&username).await.unwrap().is_none());

    test.store.fail_inserts(false);
    assert!(test
        .service
        .register(RegisterCommand::new("alice@example.com", "alice", "password123"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_display_name_cannot_claim_registered_email() {
    let test = TestService::new();
    test.service
        .register(RegisterCommand::new("alice@example.com", "alice", "password123"))
        .await
        .unwrap();

    let result = test
        .service
        .register(RegisterCommand::new(
            "Bob <alice@example.com>",
            "bobby",
            "password123",
        ))
        .await;

    assert!(matches!(result, Err(AccountError::InvalidEmail(_))));
    assert_eq!(test.store.len().await, 1);
}

#[tokio::test]
async fn test_whitespace_password_is_rejected() {
    let test = TestService::new();

    let result = test
        .service
        .register(RegisterCommand::new("white@example.com", "white", "      "))
        .await;
    assert!(matches!(result, Err(AccountError::InvalidPassword(_))));
    assert!(test.store.is_empty().await);

    let result = test.service.login("white@example.com", "      ").await;
    assert!(matches!(result, Err(AccountError::InvalidPassword(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_creates_one_account() {
    let test = TestService::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&test.service);
            tokio::spawn(async move {
                service
                    .register(RegisterCommand::new(
                        "race@example.com",
                        format!("racer{}", i),
                        "password123",
                    ))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AccountError::DuplicateAccount { field, .. }) => {
                assert_eq!(field, AccountField::Email)
            }
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(test.store.len().await, 1);
}

#[tokio::test]
async fn test_deactivated_account_is_rejected_as_inactive() {
    let test = TestService::new();
    test.service
        .register(RegisterCommand::new("alice@example.com", "alice", "password123"))
        .await
        .unwrap();

    let email = EmailAddress::new("alice@example.com".to_string()).unwrap();
    let mut account = test.store.find_by_email(&email).await.unwrap().unwrap();
    account.deactivate();
    test.store.update(&account).await.unwrap();

    let result = test.service.login("alice@example.com", "password123").await;
    assert!(matches!(result, Err(AccountError::Inactive)));

    account.activate();
    test.store.update(&account).await.unwrap();
    assert!(test
        .service
        .login("alice@example.com", "password123")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_share_message() {
    let test = TestService::new();
    test.service
        .register(RegisterCommand::new("alice@example.com", "alice", "password123"))
        .await
        .unwrap();

    let wrong = test
        .service
        .login("alice@example.com", "password124")
        .await
        .unwrap_err();
    let unknown = test
        .service
        .login("bob@example.com", "password123")
        .await
        .unwrap_err();

    assert_eq!(wrong.kind(), unknown.kind());
    assert_eq!(wrong.public_message(), unknown.public_message());
}

#[tokio::test]
async fn test_token_from_other_deployment_is_rejected() {
    let test = TestService::new();
    let other = TestService::new();

    let registered = other
        .service
        .register(RegisterCommand::new("alice@example.com", "alice", "password123"))
        .await
        .unwrap();

    // Same secret, issuer and audience: the token verifies but names no local account.
    assert!(test.service.validate_token(&registered.token));
    assert_eq!(
        test.service.identify_caller(&registered.token).await.unwrap(),
        None
    );
}
