//! Session state for the authoring side
//!
//! [`AuthGuard`] owns the one current-session value. It is built at startup,
//! shared as an `Arc`, and only ever changed by [`AuthGuard::login`] and
//! [`AuthGuard::logout`].

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::gateway::{GatewayError, Session, SessionProvider};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("sign-in rejected: {0}")]
    Rejected(#[source] GatewayError),
}

/// Who is using the blog right now
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated(session) => Some(session),
        }
    }
}

pub struct AuthGuard {
    provider: Arc<dyn SessionProvider>,
    state: RwLock<AuthState>,
}

impl AuthGuard {
    /// Anonymous guard; nothing is asked of the provider yet
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(AuthState::Anonymous),
        }
    }

    /// Build a guard and restore any session the provider still holds
    pub async fn start(provider: Arc<dyn SessionProvider>) -> Self {
        let guard = Self::new(provider);
        guard.check_session().await;
        guard
    }

    /// Ask the provider for a live session
    ///
    /// Provider errors count as "no session".
    pub async fn check_session(&self) -> AuthState {
        let next = match self.provider.current_session().await {
            Ok(Some(session)) => {
                tracing::info!("Restored session for user {}", session.user_id);
                AuthState::Authenticated(session)
            }
            Ok(None) => AuthState::Anonymous,
            Err(e) => {
                tracing::warn!("Could not check session: {}", e);
                AuthState::Anonymous
            }
        };

        *self.state.write().await = next.clone();
        next
    }

    /// Password sign-in; state is untouched on failure
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self
            .provider
            .create_session(email, password)
            .await
            .map_err(|e| {
                tracing::warn!("Sign-in failed for {}: {}", email, e);
                AuthError::Rejected(e)
            })?;

        tracing::info!("Signed in as {}", session.user_id);
        *self.state.write().await = AuthState::Authenticated(session.clone());
        Ok(session)
    }

    /// Sign out; always ends anonymous
    pub async fn logout(&self) {
        let previous = std::mem::take(&mut *self.state.write().await);

        if let AuthState::Authenticated(session) = previous {
            if let Err(e) = self.provider.destroy_session(&session).await {
                tracing::warn!("Provider sign-out failed: {}", e);
            }
            tracing::info!("Signed out {}", session.user_id);
        }
    }

    pub async fn current(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, AuthState::Authenticated(_))
    }

    /// The current session, or [`AuthError::NotAuthenticated`]
    pub async fn require_session(&self) -> Result<Session, AuthError> {
        self.state
            .read()
            .await
            .session()
            .cloned()
            .ok_or(AuthError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSessions, PASSWORD, USER_ID};

    #[tokio::test]
    async fn test_start_restores_session() {
        let provider = Arc::new(FakeSessions::signed_in());
        let guard = AuthGuard::start(provider.clone()).await;

        assert!(guard.is_authenticated().await);
        assert_eq!(guard.require_session().await.unwrap().user_id, USER_ID);
        assert_eq!(provider.count("current"), 1);
    }

    #[tokio::test]
    async fn test_start_treats_provider_error_as_anonymous() {
        let provider = Arc::new(FakeSessions::signed_in());
        provider.fail_current();
        let guard = AuthGuard::start(provider).await;

        assert_eq!(guard.current().await, AuthState::Anonymous);
        assert!(matches!(
            guard.require_session().await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_login_success_and_failure() {
        let guard = AuthGuard::start(Arc::new(FakeSessions::default())).await;
        assert!(!guard.is_authenticated().await);

        let err = guard.login("admin@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));
        assert!(!guard.is_authenticated().await);

        let session = guard.login("admin@example.com", PASSWORD).await.unwrap();
        assert_eq!(session.email.as_deref(), Some("admin@example.com"));
        assert!(guard.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let guard = AuthGuard::start(Arc::new(FakeSessions::signed_in())).await;
        assert!(guard.login("other@example.com", "nope").await.is_err());
        assert!(guard.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_ends_anonymous_even_when_provider_fails() {
        let provider = Arc::new(FakeSessions::signed_in());
        provider.fail_destroy();
        let guard = AuthGuard::start(provider.clone()).await;

        guard.logout().await;
        assert_eq!(guard.current().await, AuthState::Anonymous);
        assert_eq!(provider.count("destroy"), 1);

        // Already anonymous: nothing to tell the provider
        guard.logout().await;
        assert_eq!(provider.count("destroy"), 1);
    }
}
