use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::types::{Account, AccountUpdate, Envelope, UserType};
use super::{read_envelope, ApiError, SoteriaClient};

#[derive(Debug, Serialize)]
struct CreateAccountBody<'a> {
    username: &'a str,
    password: &'a str,
    user_type: UserType,
}

impl SoteriaClient {
    /// Register a new account. Sign-up is the one account endpoint that
    /// takes no credentials.
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        user_type: UserType,
    ) -> Result<(), ApiError> {
        let url = self.endpoint("accounts")?;
        debug!(url = %url, username = %username, user_type = %user_type, "creating account");

        let body = CreateAccountBody {
            username,
            password,
            user_type,
        };
        let resp = self.http.post(url).json(&body).send().await?;
        let env: Envelope<Value> = read_envelope(resp).await?;
        env.into_data().map(|_| ())
    }

    /// Fetch the account record behind the given credentials.
    pub async fn account(&self, username: &str, password: &str) -> Result<Account, ApiError> {
        let url = self.endpoint(&format!("accounts/{username}"))?;
        debug!(url = %url, username = %username, "fetching account");

        let resp = self
            .http
            .get(url)
            .basic_auth(username, Some(password))
            .send()
            .await?;
        let env: Envelope<Account> = read_envelope(resp).await?;
        env.into_data()?.ok_or(ApiError::MissingData("account"))
    }

    /// Apply a partial update. See [`AccountUpdate`] for the settable fields.
    pub async fn update_account(
        &self,
        username: &str,
        password: &str,
        update: &AccountUpdate,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("accounts/{username}"))?;
        debug!(url = %url, username = %username, "updating account");

        let resp = self
            .http
            .put(url)
            .basic_auth(username, Some(password))
            .json(update)
            .send()
            .await?;
        let env: Envelope<Value> = read_envelope(resp).await?;
        env.into_data().map(|_| ())
    }

    /// Replace the secret used for token minting. Distinct from the password.
    pub async fn set_secret(
        &self,
        username: &str,
        password: &str,
        secret: &str,
    ) -> Result<(), ApiError> {
        self.update_account(username, password, &AccountUpdate::secret(secret))
            .await
    }

    /// Set the lifetime of minted tokens, in nanoseconds.
    pub async fn set_token_expiration(
        &self,
        username: &str,
        password: &str,
        nanos: i64,
    ) -> Result<(), ApiError> {
        self.update_account(username, password, &AccountUpdate::expiration(nanos))
            .await
    }

    pub async fn set_password(
        &self,
        username: &str,
        password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        self.update_account(username, password, &AccountUpdate::password(new_password))
            .await
    }

    pub async fn delete_account(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("accounts/{username}"))?;
        debug!(url = %url, username = %username, "deleting account");

        let resp = self
            .http
            .delete(url)
            .basic_auth(username, Some(password))
            .send()
            .await?;
        let env: Envelope<Value> = read_envelope(resp).await?;
        env.into_data().map(|_| ())
    }
}
