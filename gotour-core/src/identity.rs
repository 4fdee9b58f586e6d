use async_trait::async_trait;
use gotour_shared::Masked;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Profile of the signed-in customer, used to prefill contact details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    pub is_authenticated: bool,
    pub token: Option<Masked<String>>,
    pub user: Option<UserProfile>,
}

impl AuthSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, user: Option<UserProfile>) -> Self {
        Self {
            is_authenticated: true,
            token: Some(Masked(token.into())),
            user,
        }
    }

    /// The token to forward to the backend, only when the session may submit.
    pub fn bearer(&self) -> Option<&str> {
        if !self.is_authenticated {
            return None;
        }
        self.token
            .as_ref()
            .map(|t| t.expose().as_str())
            .filter(|t| !t.is_empty())
    }
}

/// Source of the caller's authentication state. Injected into each workflow
/// so nothing reads a process-wide session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn session(&self) -> AuthSession;
}

/// Fixed session, for tests and single-user tools.
pub struct StaticAuthProvider {
    session: AuthSession,
}

impl StaticAuthProvider {
    pub fn new(session: AuthSession) -> Self {
        Self { session }
    }

    pub fn anonymous() -> Self {
        Self::new(AuthSession::anonymous())
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn session(&self) -> AuthSession {
        self.session.clone()
    }
}

/// Session that follows whatever bearer token the client last presented.
/// Tokens are issued and verified by the external auth service; this type
/// only carries them.
#[derive(Default)]
pub struct BearerAuthProvider {
    session: RwLock<AuthSession>,
}

impl BearerAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, token: impl Into<String>, user: Option<UserProfile>) {
        let mut session = self.session.write().await;
        *session = AuthSession::authenticated(token, user);
        tracing::debug!("Bearer session updated");
    }

    pub async fn sign_out(&self) {
        let mut session = self.session.write().await;
        *session = AuthSession::anonymous();
    }
}

#[async_trait]
impl AuthProvider for BearerAuthProvider {
    async fn session(&self) -> AuthSession {
        self.session.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_requires_authentication_and_token() {
        assert_eq!(AuthSession::anonymous().bearer(), None);
        assert_eq!(AuthSession::authenticated("", None).bearer(), None);

        let unauthenticated = AuthSession {
            is_authenticated: false,
            token: Some(Masked("stale".into())),
            user: None,
        };
        assert_eq!(unauthenticated.bearer(), None);

        assert_eq!(AuthSession::authenticated("tok", None).bearer(), Some("tok"));
    }

    #[test]
    fn test_token_is_masked_in_debug() {
        let session = AuthSession::authenticated("secret-token", None);
        assert!(!format!("{:?}", session).contains("secret-token"));
    }

    #[tokio::test]
    async fn test_bearer_provider_follows_sign_in() {
        let provider = BearerAuthProvider::new();
        assert!(!provider.session().await.is_authenticated);

        provider.sign_in("tok", None).await;
        assert_eq!(provider.session().await.bearer(), Some("tok"));

        provider.sign_out().await;
        assert_eq!(provider.session().await.bearer(), None);
    }
}
