//! Password hashing and bearer-token handling.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use common::{ParseEnumError, UserId, UserRole};
use thiserror::Error;

/// Caller identity resolved from a bearer token. Request-scoped, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, role: UserRole) -> Self {
        Self { id, role }
    }
}

/// Returns true if `user` is present and holds `role`.
pub(crate) fn has_role(user: Option<&AuthenticatedUser>, role: UserRole) -> bool {
    user.is_some_and(|u| u.role == role)
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(#[source] argon2::password_hash::Error),

    #[error("wrong password")]
    WrongPassword,

    #[error("hashing task failed: {0}")]
    Blocking(#[source] tokio::task::JoinError),

    #[error("invalid token format")]
    TokenFormat,

    #[error("invalid user id in token: {0}")]
    TokenUserId(#[source] uuid::Error),

    #[error("invalid role in token: {0}")]
    TokenRole(#[source] ParseEnumError),
}

/// Hashing and token capabilities consumed by the user service.
///
/// Hashing is CPU-bound; callers run it on the blocking pool.
pub trait Credentials: Send + Sync + 'static {
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Fails with [`AuthError::WrongPassword`] if `password` does not match `hash`.
    fn compare_password(&self, password: &str, hash: &str) -> Result<(), AuthError>;

    fn issue_token(&self, user_id: UserId, role: UserRole) -> Result<String, AuthError>;

    fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Argon2id password hashes and unsigned `"<user id>:<role>"` tokens.
///
/// Tokens carry no signature: anyone can mint one for any role, which is the
/// same power the dummy login endpoint already grants.
#[derive(Debug, Clone, Default)]
pub struct PlainTokenCredentials {
    params: Params,
}

impl PlainTokenCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses custom Argon2 cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Credentials for PlainTokenCredentials {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(AuthError::Hash)
    }

    fn compare_password(&self, password: &str, hash: &str) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(hash).map_err(AuthError::Hash)?;
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|e| match e {
                argon2::password_hash::Error::Password => AuthError::WrongPassword,
                other => AuthError::Hash(other),
            })
    }

    fn issue_token(&self, user_id: UserId, role: UserRole) -> Result<String, AuthError> {
        Ok(format!("{user_id}:{role}"))
    }

    fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut parts = token.split(':');
        let (Some(id), Some(role), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AuthError::TokenFormat);
        };

        let id = UserId::parse_str(id).map_err(AuthError::TokenUserId)?;
        let role = role.parse().map_err(AuthError::TokenRole)?;
        Ok(AuthenticatedUser::new(id, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> PlainTokenCredentials {
        PlainTokenCredentials::with_params(
            Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None).unwrap(),
        )
    }

    #[test]
    fn hash_then_compare() {
        let creds = credentials();
        let hash = creds.hash_password("secret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(creds.compare_password("secret", &hash).is_ok());
        assert!(matches!(
            creds.compare_password("other", &hash),
            Err(AuthError::WrongPassword)
        ));
    }

    #[test]
    fn compare_rejects_garbage_hash() {
        assert!(matches!(
            credentials().compare_password("secret", "not-a-hash"),
            Err(AuthError::Hash(_))
        ));
    }

    #[test]
    fn token_resolves_to_issuing_user() {
        let creds = credentials();
        let id = UserId::new();
        let token = creds.issue_token(id, UserRole::Moderator).unwrap();
        assert_eq!(token, format!("{id}:moderator"));

        let user = creds.authenticate(&token).unwrap();
        assert_eq!(user, AuthenticatedUser::new(id, UserRole::Moderator));
    }

    #[test]
    fn authenticate_rejects_malformed_tokens() {
        let creds = credentials();
        let id = UserId::new();

        assert!(matches!(creds.authenticate("no-colon"), Err(AuthError::TokenFormat)));
        assert!(matches!(
            creds.authenticate(&format!("{id}:employee:extra")),
            Err(AuthError::TokenFormat)
        ));
        assert!(matches!(
            creds.authenticate("not-a-uuid:employee"),
            Err(AuthError::TokenUserId(_))
        ));
        assert!(matches!(
            creds.authenticate(&format!("{id}:admin")),
            Err(AuthError::TokenRole(_))
        ));
    }

    #[test]
    fn role_check() {
        let user = AuthenticatedUser::new(UserId::new(), UserRole::Employee);
        assert!(has_role(Some(&user), UserRole::Employee));
        assert!(!has_role(Some(&user), UserRole::Moderator));
        assert!(!has_role(None, UserRole::Employee));
    }
}
