//! Session provider
//!
//! Holds the identity of the signed-in user (if any) together with the token
//! the identity service issued for it. Lifecycle is login -> logout; nothing
//! is cached beyond the current grant.

use bento_api::{Credentials, Identity, SessionGrant};
use bento_store::IdentityService;
use bento_util::{OwnerId, SessionToken};
use std::sync::Arc;
use tracing::{info, warn};

use crate::PlannerResult;

pub struct SessionProvider {
    identity: Arc<dyn IdentityService>,
    grant: Option<SessionGrant>,
}

impl SessionProvider {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self {
            identity,
            grant: None,
        }
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.grant.as_ref().map(|g| &g.identity)
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        self.current_identity().map(|i| &i.owner_id)
    }

    /// Token of the current session, for persisting between invocations
    pub fn token(&self) -> Option<&SessionToken> {
        self.grant.as_ref().map(|g| &g.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.grant.is_some()
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> PlannerResult<&Identity> {
        let grant = self
            .identity
            .sign_in(&Credentials::new(email, password))
            .await?;
        info!(owner_id = %grant.identity.owner_id, "Signed in");
        Ok(&self.grant.insert(grant).identity)
    }

    pub async fn register(&mut self, email: &str, password: &str) -> PlannerResult<&Identity> {
        let grant = self
            .identity
            .register(&Credentials::new(email, password))
            .await?;
        info!(owner_id = %grant.identity.owner_id, "Registered");
        Ok(&self.grant.insert(grant).identity)
    }

    /// Resume a session from a previously issued token
    pub async fn restore(&mut self, token: SessionToken) -> PlannerResult<&Identity> {
        let identity = self.identity.resolve(&token).await?;
        info!(owner_id = %identity.owner_id, "Session restored");
        Ok(&self.grant.insert(SessionGrant { token, identity }).identity)
    }

    /// Revoke a token that is no longer the current session's
    pub async fn revoke(&self, token: &SessionToken) -> PlannerResult<()> {
        self.identity.sign_out(token).await?;
        info!("Replaced session revoked");
        Ok(())
    }

    /// Drop the local session and revoke its token.
    ///
    /// The identity is gone locally even when revocation fails; the failure
    /// is still returned.
    pub async fn sign_out(&mut self) -> PlannerResult<()> {
        let Some(grant) = self.grant.take() else {
            return Ok(());
        };

        if let Err(e) = self.identity.sign_out(&grant.token).await {
            warn!(error = %e, "Token revocation failed");
            return Err(e.into());
        }

        info!(owner_id = %grant.identity.owner_id, "Signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlannerError;
    use bento_store::{MemoryStore, StoreError};

    #[tokio::test]
    async fn test_register_then_sign_out() {
        let store = Arc::new(MemoryStore::new());
        let mut session = SessionProvider::new(store.clone());
        assert!(!session.is_authenticated());

        let identity = session.register("ada@example.com", "secret1").await.unwrap().clone();
        assert!(session.is_authenticated());
        assert_eq!(session.owner(), Some(&identity.owner_id));

        let token = session.token().cloned().unwrap();
        session.sign_out().await.unwrap();
        assert!(session.current_identity().is_none());
        assert!(store.resolve(&token).await.is_err());

        // Signing out twice is harmless
        session.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_from_token() {
        let store = Arc::new(MemoryStore::new());
        let grant = store
            .register(&Credentials::new("ada@example.com", "secret1"))
            .await
            .unwrap();

        let mut session = SessionProvider::new(store.clone());
        let identity = session.restore(grant.token.clone()).await.unwrap();
        assert_eq!(identity, &grant.identity);

        let mut stale = SessionProvider::new(store);
        let result = stale.restore(SessionToken::new("nope")).await;
        assert!(matches!(
            result,
            Err(PlannerError::Store(StoreError::Unauthenticated))
        ));
        assert!(!stale.is_authenticated());
    }

    #[tokio::test]
    async fn test_bad_credentials_leave_session_empty() {
        let store = Arc::new(MemoryStore::new());
        store
            .register(&Credentials::new("ada@example.com", "secret1"))
            .await
            .unwrap();

        let mut session = SessionProvider::new(store);
        let result = session.sign_in("ada@example.com", "wrong!!").await;
        assert!(matches!(
            result,
            Err(PlannerError::Store(StoreError::InvalidCredentials))
        ));
        assert!(!session.is_authenticated());
    }
}
