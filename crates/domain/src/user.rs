//! Registration, login and token authentication.

use std::sync::Arc;

use async_trait::async_trait;
use common::{User, UserId, UserRole};
use storage::{ConnectionProvider, UserRepository};
use uuid::Uuid;

use crate::auth::{AuthError, AuthenticatedUser, Credentials};
use crate::error::{DomainError, UserError};

#[async_trait]
pub trait Users: Send + Sync {
    /// Creates a user and returns it as stored, token included.
    async fn register(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, DomainError>;

    /// Checks the password and returns a freshly issued token.
    async fn login(&self, email: &str, password: &str) -> Result<String, DomainError>;

    /// Registers a throw-away user with the given role and returns its token.
    async fn dummy_login(&self, role: UserRole) -> Result<String, DomainError>;

    fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, DomainError>;
}

pub struct UserService<P, U> {
    provider: P,
    users: U,
    credentials: Arc<dyn Credentials>,
}

impl<P, U> UserService<P, U>
where
    P: ConnectionProvider,
    U: UserRepository<P::Conn>,
{
    pub fn new(provider: P, users: U, credentials: Arc<dyn Credentials>) -> Self {
        Self {
            provider,
            users,
            credentials,
        }
    }

    async fn read_by_email(&self, email: &str) -> storage::Result<User> {
        let users = self.users.clone();
        let email = email.to_string();
        self.provider
            .execute(move |conn| Box::pin(async move { Ok(users.read_by_email(conn, &email).await?) }))
            .await
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let credentials = Arc::clone(&self.credentials);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || credentials.hash_password(&password))
            .await
            .map_err(AuthError::Blocking)?
    }

    async fn compare_password(&self, password: &str, hash: &str) -> Result<(), AuthError> {
        let credentials = Arc::clone(&self.credentials);
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || credentials.compare_password(&password, &hash))
            .await
            .map_err(AuthError::Blocking)?
    }
}

fn is_valid_email(email: &str) -> bool {
    matches!(email.split_once('@'), Some((local, domain)) if !local.is_empty() && !domain.is_empty())
}

#[async_trait]
impl<P, U> Users for UserService<P, U>
where
    P: ConnectionProvider,
    U: UserRepository<P::Conn>,
{
    #[tracing::instrument(skip(self, password))]
    async fn register(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, DomainError> {
        if !is_valid_email(email) {
            return Err(UserError::InvalidEmail.into());
        }
        if password.is_empty() {
            return Err(UserError::EmptyPassword.into());
        }

        let password_hash = self.hash_password(password).await.map_err(UserError::Hash)?;
        let id = UserId::new();
        let token = self
            .credentials
            .issue_token(id, role)
            .map_err(UserError::IssueToken)?;

        let users = self.users.clone();
        let user = User {
            id,
            email: email.to_string(),
            role,
            password_hash,
            token,
        };
        self.provider
            .execute_tx(move |conn| Box::pin(async move { Ok(users.create(conn, &user).await?) }))
            .await
            .map_err(UserError::Create)?;

        let user = self.read_by_email(email).await.map_err(UserError::Create)?;

        metrics::counter!("users_created_total").increment(1);
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    #[tracing::instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<String, DomainError> {
        let user = self
            .read_by_email(email)
            .await
            .map_err(UserError::FindToken)?;

        self.compare_password(password, &user.password_hash)
            .await
            .map_err(|e| match e {
                AuthError::WrongPassword => UserError::WrongPassword(e),
                other => UserError::Hash(other),
            })?;

        let token = self
            .credentials
            .issue_token(user.id, user.role)
            .map_err(UserError::IssueToken)?;

        let users = self.users.clone();
        let email = user.email.clone();
        let stored = token.clone();
        self.provider
            .execute_tx(move |conn| {
                Box::pin(async move { Ok(users.update_token_by_email(conn, &email, &stored).await?) })
            })
            .await
            .map_err(UserError::UpdateToken)?;

        tracing::debug!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    #[tracing::instrument(skip(self))]
    async fn dummy_login(&self, role: UserRole) -> Result<String, DomainError> {
        let email = format!("{}@email.foo", Uuid::new_v4().simple());
        let password = Uuid::new_v4().to_string();
        let user = self.register(&email, &password, role).await?;
        Ok(user.token)
    }

    fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, DomainError> {
        self.credentials
            .authenticate(token)
            .map_err(|e| UserError::InvalidToken(e).into())
    }
}
