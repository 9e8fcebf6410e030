//! Integration tests for registration, login and token authentication.

mod support;

use common::UserRole;
use domain::{DomainError, ErrorKind, UserError, Users};

use support::{identity, provider};

#[tokio::test]
async fn register_returns_stored_user_with_token() {
    let provider = provider();
    let service = identity(&provider);

    let user = service
        .register("employee@example.com", "secret", UserRole::Employee)
        .await
        .unwrap();

    assert_eq!(user.email, "employee@example.com");
    assert_eq!(user.role, UserRole::Employee);
    assert_ne!(user.password_hash, "secret");

    let authenticated = service.authenticate(&user.token).unwrap();
    assert_eq!(authenticated.id, user.id);
    assert_eq!(authenticated.role, UserRole::Employee);
}

#[tokio::test]
async fn register_validates_input_before_storage() {
    let provider = provider();
    let service = identity(&provider);

    let err = service
        .register("not-an-email", "secret", UserRole::Employee)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::User(UserError::InvalidEmail)));

    let err = service
        .register("a@b.c", "", UserRole::Employee)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::User(UserError::EmptyPassword)));
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let provider = provider();
    let service = identity(&provider);

    service
        .register("dup@example.com", "one", UserRole::Employee)
        .await
        .unwrap();
    let err = service
        .register("dup@example.com", "two", UserRole::Moderator)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::User(UserError::Create(_))));
    assert!(err.to_string().contains("users_email_key"));
}

#[tokio::test]
async fn login_issues_token_for_correct_password() {
    let provider = provider();
    let service = identity(&provider);
    let user = service
        .register("moderator@example.com", "secret", UserRole::Moderator)
        .await
        .unwrap();

    let token = service
        .login("moderator@example.com", "secret")
        .await
        .unwrap();

    let authenticated = service.authenticate(&token).unwrap();
    assert_eq!(authenticated.id, user.id);
    assert_eq!(authenticated.role, UserRole::Moderator);
}

#[tokio::test]
async fn login_failures_are_credentials_errors() {
    let provider = provider();
    let service = identity(&provider);
    service
        .register("employee@example.com", "secret", UserRole::Employee)
        .await
        .unwrap();

    let err = service
        .login("employee@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::User(UserError::WrongPassword(_))));
    assert_eq!(err.kind(), ErrorKind::Credentials);

    let err = service
        .login("nobody@example.com", "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::User(UserError::FindToken(_))));
    assert_eq!(err.kind(), ErrorKind::Credentials);
}

#[tokio::test]
async fn dummy_login_mints_token_for_requested_role() {
    let provider = provider();
    let service = identity(&provider);

    let employee = service.dummy_login(UserRole::Employee).await.unwrap();
    let moderator = service.dummy_login(UserRole::Moderator).await.unwrap();

    assert_eq!(service.authenticate(&employee).unwrap().role, UserRole::Employee);
    assert_eq!(service.authenticate(&moderator).unwrap().role, UserRole::Moderator);
    assert_ne!(employee, moderator);
}

#[tokio::test]
async fn malformed_token_is_rejected() {
    let provider = provider();
    let service = identity(&provider);

    let err = service.authenticate("garbage").unwrap_err();
    assert!(matches!(err, DomainError::User(UserError::InvalidToken(_))));
    assert!(err.to_string().contains("invalid token"));
}
