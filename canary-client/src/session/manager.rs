use super::{ProfileVerifier, Session, SessionSnapshot, SessionStatus};
use crate::error::{ClientError, ClientResult};
use crate::models::{AuthResponse, User};
use crate::storage::{CredentialStore, StoredCredential};
use crate::utils::jwt;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokio::sync::watch;

pub struct SessionManager {
    credentials: CredentialStore,
    verifier: Arc<dyn ProfileVerifier>,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionManager {
    pub fn new(credentials: CredentialStore, verifier: Arc<dyn ProfileVerifier>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            credentials,
            verifier,
            state,
        }
    }

    /// Restores the session persisted by a previous run.
    ///
    /// Only the first call boots; concurrent callers wait for that boot and
    /// later callers get the current status without any network traffic.
    pub async fn initialize(&self) -> SessionStatus {
        let started = self.state.send_if_modified(|state| {
            if state.status == SessionStatus::Uninitialized {
                state.status = SessionStatus::Loading;
                true
            } else {
                false
            }
        });

        if !started {
            let mut receiver = self.state.subscribe();
            return match receiver
                .wait_for(|state| state.status != SessionStatus::Loading)
                .await
            {
                Ok(state) => state.status,
                Err(_) => self.status(),
            };
        }

        let status = self.boot().await;
        tracing::info!(status = ?status, "Session initialized");
        status
    }

    async fn boot(&self) -> SessionStatus {
        let credential = match self.credentials.read().await {
            Ok(Some(credential)) => credential,
            Ok(None) => return self.finish_boot(None),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored credential");
                self.discard_while_loading().await;
                return self.finish_boot(None);
            }
        };

        let token_expiry = match jwt::decode_token_claims(&credential.token) {
            Ok(claims) if !claims.is_expired_at(Utc::now()) => claims.expires_at(),
            Ok(_) => {
                tracing::info!(user_id = %credential.user.user_id, "Stored token has expired");
                self.discard_while_loading().await;
                return self.finish_boot(None);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored token could not be decoded");
                self.discard_while_loading().await;
                return self.finish_boot(None);
            }
        };

        let optimistic = Session::new(
            credential.user.clone(),
            credential.token.clone(),
            token_expiry,
        );
        self.state.send_if_modified(|state| {
            if state.status == SessionStatus::Loading {
                state.session = Some(optimistic);
                true
            } else {
                false
            }
        });

        match self.verifier.verify_profile().await {
            Ok(user) => {
                if self.status() == SessionStatus::Loading {
                    self.persist(&credential.token, &user).await;
                }
                self.finish_boot(Some(Session::new(user, credential.token, token_expiry)))
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = %credential.user.user_id, "Session verification failed");
                self.discard_while_loading().await;
                self.finish_boot(None)
            }
        }
    }

    /// Settles boot unless `login` or `logout` already moved the state on.
    fn finish_boot(&self, session: Option<Session>) -> SessionStatus {
        let mut settled = SessionStatus::Unauthenticated;
        self.state.send_if_modified(|state| {
            if state.status != SessionStatus::Loading {
                settled = state.status;
                return false;
            }
            state.status = if session.is_some() {
                SessionStatus::Authenticated
            } else {
                SessionStatus::Unauthenticated
            };
            state.session = session;
            settled = state.status;
            true
        });
        settled
    }

    async fn discard_while_loading(&self) {
        if self.status() != SessionStatus::Loading {
            return;
        }
        if let Err(e) = self.credentials.clear().await {
            tracing::error!(error = %e, "Failed to clear stored credential");
        }
    }

    async fn persist(&self, token: &str, user: &User) {
        let credential = StoredCredential {
            token: token.to_string(),
            user: user.clone(),
        };
        if let Err(e) = self.credentials.write(&credential).await {
            tracing::error!(error = %e, user_id = %user.user_id, "Failed to persist verified user");
        }
    }

    /// Starts a session from a login or registration response. Makes no
    /// network call.
    pub async fn login(&self, response: AuthResponse) -> ClientResult<Session> {
        let (Some(token), Some(user)) = (response.token, response.user) else {
            return Err(ClientError::MissingCredential);
        };

        let token_expiry: Option<DateTime<Utc>> = jwt::decode_token_claims(&token)
            .ok()
            .and_then(|claims| claims.expires_at());

        self.credentials
            .write(&StoredCredential {
                token: token.clone(),
                user: user.clone(),
            })
            .await?;

        let session = Session::new(user, token, token_expiry);
        self.state.send_modify(|state| {
            state.status = SessionStatus::Authenticated;
            state.session = Some(session.clone());
        });

        tracing::info!(user_id = %session.user_id(), "Logged in");
        Ok(session)
    }

    /// Clears the session and the stored credential. Never fails; storage
    /// errors are logged.
    pub async fn logout(&self) {
        if let Err(e) = self.credentials.clear().await {
            tracing::error!(error = %e, "Failed to clear stored credential on logout");
        }

        self.state.send_if_modified(|state| {
            let was_signed_in = state.session.is_some();
            state.session = None;
            if state.status == SessionStatus::Uninitialized
                || state.status == SessionStatus::Unauthenticated
            {
                return was_signed_in;
            }
            state.status = SessionStatus::Unauthenticated;
            true
        });

        tracing::info!("Logged out");
    }

    /// Re-verifies an authenticated session with the server. Any failure
    /// logs the user out.
    pub async fn revalidate(&self) -> SessionStatus {
        let Some(current) = self.snapshot().session else {
            return self.status();
        };
        if self.status() != SessionStatus::Authenticated {
            return self.status();
        }

        match self.verifier.verify_profile().await {
            Ok(user) => {
                let token = current.token.expose_secret().clone();
                self.persist(&token, &user).await;
                self.state.send_if_modified(|state| match state.session.as_mut() {
                    Some(session) if state.status == SessionStatus::Authenticated => {
                        session.user = user;
                        true
                    }
                    _ => false,
                });
                self.status()
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = %current.user_id(), "Session revalidation failed");
                self.logout().await;
                SessionStatus::Unauthenticated
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Receives every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }
}
