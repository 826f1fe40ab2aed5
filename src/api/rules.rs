use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::types::{Envelope, Rule, RuleSpec};
use super::{read_envelope, ApiError, SoteriaClient};

impl SoteriaClient {
    /// Attach a topic grant to an account. The service assigns the UUID.
    pub async fn create_rule(
        &self,
        username: &str,
        password: &str,
        spec: &RuleSpec,
    ) -> Result<Rule, ApiError> {
        let url = self.endpoint(&format!("accounts/{username}/rules"))?;
        debug!(url = %url, username = %username, topic = %spec.topic, access_type = %spec.access_type, "creating rule");

        let resp = self
            .http
            .post(url)
            .basic_auth(username, Some(password))
            .json(spec)
            .send()
            .await?;
        let env: Envelope<Rule> = read_envelope(resp).await?;
        env.into_data()?.ok_or(ApiError::MissingData("rule"))
    }

    pub async fn rule(&self, username: &str, password: &str, uuid: Uuid) -> Result<Rule, ApiError> {
        let url = self.endpoint(&format!("accounts/{username}/rules/{uuid}"))?;
        debug!(url = %url, username = %username, "fetching rule");

        let resp = self
            .http
            .get(url)
            .basic_auth(username, Some(password))
            .send()
            .await?;
        let env: Envelope<Rule> = read_envelope(resp).await?;
        env.into_data()?.ok_or(ApiError::MissingData("rule"))
    }

    /// Replace a rule's topic, access type and endpoint in one shot.
    pub async fn update_rule(
        &self,
        username: &str,
        password: &str,
        uuid: Uuid,
        spec: &RuleSpec,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("accounts/{username}/rules/{uuid}"))?;
        debug!(url = %url, username = %username, "updating rule");

        let resp = self
            .http
            .put(url)
            .basic_auth(username, Some(password))
            .json(spec)
            .send()
            .await?;
        let env: Envelope<Value> = read_envelope(resp).await?;
        env.into_data().map(|_| ())
    }

    pub async fn delete_rule(
        &self,
        username: &str,
        password: &str,
        uuid: Uuid,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("accounts/{username}/rules/{uuid}"))?;
        debug!(url = %url, username = %username, "deleting rule");

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
