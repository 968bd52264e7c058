use super::http::{ApiTransport, Auth};
use crate::error::{ClientError, ClientResult};
use crate::models::user::{LoginRequest, RegisterRequest};
use crate::models::{AuthResponse, UserProfile};
use crate::storage::StoredCredential;
use chrono::Utc;
use tracing::instrument;

/// Client for the `/auth` endpoints and the locally stored credential.
#[derive(Clone)]
pub struct AuthClient {
    transport: ApiTransport,
}

impl AuthClient {
    pub fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> ClientResult<AuthResponse> {
        let request = RegisterRequest {
            email,
            password,
            username,
        };

        let response: AuthResponse = self
            .transport
            .post("/auth/register", &request, Auth::Anonymous, "Registration failed")
            .await?;

        self.store_credential(&response).await?;
        Ok(response)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let request = LoginRequest { email, password };

        let response: AuthResponse = self
            .transport
            .post("/auth/login", &request, Auth::Anonymous, "Login failed")
            .await?;

        self.store_credential(&response).await?;
        Ok(response)
    }

    /// Fetches the profile of the stored session. A 401 clears the stored
    /// credential before the error is returned.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> ClientResult<UserProfile> {
        match self
            .transport
            .get("/auth/profile", "Failed to get profile")
            .await
        {
            Err(ClientError::SessionExpired) => {
                tracing::info!("Profile request rejected, clearing stored credential");
                self.transport.credentials().clear().await?;
                Err(ClientError::SessionExpired)
            }
            result => result,
        }
    }

    /// Whether an unexpired token is stored. Expired or malformed tokens are
    /// cleared along with the cached user.
    pub async fn is_authenticated(&self) -> ClientResult<bool> {
        self.transport
            .credentials()
            .has_valid_token(Utc::now())
            .await
    }

    pub async fn token(&self) -> ClientResult<Option<String>> {
        self.transport.credentials().token().await
    }

    pub async fn clear_credentials(&self) -> ClientResult<()> {
        self.transport.credentials().clear().await
    }

    async fn store_credential(&self, response: &AuthResponse) -> ClientResult<()> {
        if let (Some(token), Some(user)) = (&response.token, &response.user) {
            tracing::info!(user_id = %user.user_id, "Storing credential");
            self.transport
                .credentials()
                .write(&StoredCredential {
                    token: token.clone(),
                    user: user.clone(),
                })
                .await?;
        }
        Ok(())
    }
}
