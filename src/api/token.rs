use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::types::{AccessType, Credential, Envelope};
use super::{read_envelope, ApiError, SoteriaClient};

#[derive(Debug, Serialize)]
struct TokenBody<'a> {
    grant_type: AccessType,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Serialize)]
struct EmqUserBody<'a> {
    username: &'a str,
    password: &'a str,
    duration: u64,
}

impl SoteriaClient {
    /// Mint an access token. `client_secret` is the account secret set via
    /// [`set_secret`](SoteriaClient::set_secret), not the password. The
    /// service answers 202 with the bare token string as the body.
    pub async fn token(
        &self,
        client_id: &str,
        client_secret: &str,
        grant_type: AccessType,
    ) -> Result<String, ApiError> {
        let url = self.endpoint("token")?;
        debug!(url = %url, client_id = %client_id, grant_type = %grant_type, "requesting token");

        let body = TokenBody {
            grant_type,
            client_id,
            client_secret,
        };
        let resp = self.http.post(url).json(&body).send().await?;

        let status = resp.status();
        if status.is_success() {
            let token = resp.text().await?;
            return Ok(token.trim_end_matches('\n').to_string());
        }
        Err(plain_failure(status, resp).await)
    }

    /// Probe `/auth` with a token or a username/password pair. Ok means the
    /// service accepted the credential.
    pub async fn check_auth(&self, credential: &Credential) -> Result<(), ApiError> {
        let url = self.endpoint("auth")?;

        let form: Vec<(&str, &str)> = match credential {
            Credential::Token(token) => {
                debug!(url = %url, "auth probe with token");
                vec![("token", token.as_str())]
            }
            Credential::Login { username, password } => {
                debug!(url = %url, username = %username, "auth probe with login");
                vec![
                    ("username", username.as_str()),
                    ("password", password.as_str()),
                ]
            }
        };

        let resp = self.http.post(url).form(&form).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(plain_failure(status, resp).await)
        }
    }

    /// Probe `/acl`: would `token` be allowed `access` on the raw broker
    /// topic `topic`? A topic the service does not recognize is a 400.
    pub async fn check_acl(
        &self,
        token: &str,
        access: AccessType,
        topic: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint("acl")?;
        debug!(url = %url, access = %access, topic = %topic, "acl probe");

        let form = [("access", access.wire()), ("token", token), ("topic", topic)];
        let resp = self.http.post(url).form(&form).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(plain_failure(status, resp).await)
        }
    }

    /// Store a broker user in the EMQ credential store, valid for
    /// `duration_secs` seconds.
    pub async fn store_emq_user(
        &self,
        username: &str,
        password: &str,
        duration_secs: u64,
    ) -> Result<(), ApiError> {
        let url = self.endpoint("emq")?;
        debug!(url = %url, username = %username, duration_secs = %duration_secs, "storing emq user");

        let body = EmqUserBody {
            username,
            password,
            duration: duration_secs,
        };
        let resp = self.http.post(url).json(&body).send().await?;
        let env: Envelope<Value> = read_envelope(resp).await?;
        env.into_data().map(|_| ())
    }
}

async fn plain_failure(status: StatusCode, resp: Response) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized;
    }
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read body>".to_string());
    ApiError::UnexpectedStatus { status, body }
}
