use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use super::error::ApiError;

/// Access grant for broker topics and endpoints. The service speaks numeric
/// strings on the wire: "1" subscribe, "2" publish, "3" both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessType {
    #[serde(rename = "1")]
    Sub,
    #[serde(rename = "2")]
    Pub,
    #[serde(rename = "3")]
    PubSub,
}

impl AccessType {
    /// Wire value, for form-encoded endpoints that bypass serde.
    pub fn wire(self) -> &'static str {
        match self {
            AccessType::Sub => "1",
            AccessType::Pub => "2",
            AccessType::PubSub => "3",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessType::Sub => "subscribe",
            AccessType::Pub => "publish",
            AccessType::PubSub => "publish-subscribe",
        })
    }
}

/// Account class as stored by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    #[serde(rename = "HeraldUser")]
    Herald,
    #[serde(rename = "EMQUser")]
    Emq,
    #[serde(rename = "Staff")]
    Staff,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UserType::Herald => "HeraldUser",
            UserType::Emq => "EMQUser",
            UserType::Staff => "Staff",
        })
    }
}

/// Machine-readable result code carried in every account/rule envelope.
///
/// Codes the service may grow later decode as [`Code::Other`] rather than
/// failing the whole response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    SuccessfulOperation,
    BadRequestPayload,
    SignUpUserFailure,
    WrongUsernameOrPassword,
    DatabaseSaveFailure,
    DatabaseGetFailure,
    DatabaseUpdateFailure,
    DatabaseDeleteFailure,
    PasswordHashGenerationFailure,
    UsernameMismatch,
    IpMismatch,
    InvalidRuleUuid,
    RuleNotFound,
    InvalidRule,
    Other(String),
}

impl Code {
    pub fn as_str(&self) -> &str {
        match self {
            Code::SuccessfulOperation => "successful_operation",
            Code::BadRequestPayload => "bad_request_payload",
            Code::SignUpUserFailure => "sign_up_user_failure",
            Code::WrongUsernameOrPassword => "wrong_username_or_password",
            Code::DatabaseSaveFailure => "database_save_failure",
            Code::DatabaseGetFailure => "database_get_failure",
            Code::DatabaseUpdateFailure => "database_update_failure",
            Code::DatabaseDeleteFailure => "database_delete_failure",
            Code::PasswordHashGenerationFailure => "password_hash_generation_failure",
            Code::UsernameMismatch => "username_mismatch",
            Code::IpMismatch => "ip_mismatch",
            Code::InvalidRuleUuid => "invalid_rule_uuid",
            Code::RuleNotFound => "rule_not_found",
            Code::InvalidRule => "invalid_rule",
            Code::Other(code) => code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Code::SuccessfulOperation)
    }
}

impl From<&str> for Code {
    fn from(value: &str) -> Self {
        match value {
            "successful_operation" => Code::SuccessfulOperation,
            "bad_request_payload" => Code::BadRequestPayload,
            "sign_up_user_failure" => Code::SignUpUserFailure,
            "wrong_username_or_password" => Code::WrongUsernameOrPassword,
            "database_save_failure" => Code::DatabaseSaveFailure,
            "database_get_failure" => Code::DatabaseGetFailure,
            "database_update_failure" => Code::DatabaseUpdateFailure,
            "database_delete_failure" => Code::DatabaseDeleteFailure,
            "password_hash_generation_failure" => Code::PasswordHashGenerationFailure,
            "username_mismatch" => Code::UsernameMismatch,
            "ip_mismatch" => Code::IpMismatch,
            "invalid_rule_uuid" => Code::InvalidRuleUuid,
            "rule_not_found" => Code::RuleNotFound,
            "invalid_rule" => Code::InvalidRule,
            other => Code::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Code::from(raw.as_str()))
    }
}

/// Account record as returned by `GET /accounts/{username}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub secret: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ips: Option<Vec<String>>,
    /// Token lifetime in nanoseconds; 0 means the service default.
    #[serde(default)]
    pub token_expiration_duration: i64,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
}

/// A single topic/endpoint grant attached to an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub uuid: Uuid,
    #[serde(default)]
    pub endpoint: String,
    pub topic: String,
    pub access_type: AccessType,
}

/// Body of a rule create/update. `topic` is a named topic class defined by
/// the service (`driver_location`, ...), not a raw broker topic.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub topic: String,
    pub access_type: AccessType,
}

/// Partial account update. Only fields that are set go on the wire, so one
/// operation never clobbers another field's value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ips: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    /// Token lifetime in nanoseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expiration: Option<i64>,
}

impl AccountUpdate {
    pub fn secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            ..Self::default()
        }
    }

    pub fn password(new_password: impl Into<String>) -> Self {
        Self {
            new_password: Some(new_password.into()),
            ..Self::default()
        }
    }

    pub fn expiration(nanos: i64) -> Self {
        Self {
            token_expiration: Some(nanos),
            ..Self::default()
        }
    }
}

/// Credential accepted by the `/auth` probe.
#[derive(Debug, Clone)]
pub enum Credential {
    Token(String),
    Login { username: String, password: String },
}

/// Response wrapper used by all account/rule endpoints.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub code: Code,
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// The envelope is authoritative: a failure code is an error no matter
    /// what HTTP status carried it.
    pub(crate) fn into_data(self) -> Result<Option<T>, ApiError> {
        if self.code.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::Service {
                code: self.code,
                message: self.message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn access_type_wire_values() {
        assert_eq!(serde_json::to_value(AccessType::Sub).unwrap(), json!("1"));
        assert_eq!(serde_json::to_value(AccessType::Pub).unwrap(), json!("2"));
        assert_eq!(serde_json::to_value(AccessType::PubSub).unwrap(), json!("3"));
        assert_eq!(AccessType::Pub.wire(), "2");

        let parsed: AccessType = serde_json::from_value(json!("3")).unwrap();
        assert_eq!(parsed, AccessType::PubSub);
        assert_eq!(parsed.to_string(), "publish-subscribe");
    }

    #[test]
    fn user_type_wire_values() {
        assert_eq!(
            serde_json::to_value(UserType::Emq).unwrap(),
            json!("EMQUser")
        );
        let parsed: UserType = serde_json::from_value(json!("HeraldUser")).unwrap();
        assert_eq!(parsed, UserType::Herald);
    }

    #[test]
    fn unknown_code_is_preserved() {
        let code: Code = serde_json::from_value(json!("weird_failure")).unwrap();
        assert_eq!(code, Code::Other("weird_failure".to_string()));
        assert_eq!(code.as_str(), "weird_failure");
        assert!(!code.is_success());
    }

    #[test]
    fn known_code_round_trips() {
        let code: Code = serde_json::from_value(json!("rule_not_found")).unwrap();
        assert_eq!(code, Code::RuleNotFound);
        assert_eq!(serde_json::to_value(&code).unwrap(), json!("rule_not_found"));
    }

    #[test]
    fn envelope_failure_wins_over_data() {
        let env: Envelope<Account> = serde_json::from_value(json!({
            "code": "wrong_username_or_password",
            "message": "username or password is not correct: []",
            "data": null
        }))
        .unwrap();

        match env.into_data() {
            Err(ApiError::Service { code, message }) => {
                assert_eq!(code, Code::WrongUsernameOrPassword);
                assert!(message.starts_with("username or password"));
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn account_decodes_with_missing_optionals() {
        let account: Account = serde_json::from_value(json!({
            "username": "driver",
            "type": "EMQUser"
        }))
        .unwrap();
        assert_eq!(account.username, "driver");
        assert_eq!(account.user_type, UserType::Emq);
        assert_eq!(account.token_expiration_duration, 0);
        assert!(account.rules.is_none());
    }

    #[test]
    fn account_update_serializes_only_set_fields() {
        let update = AccountUpdate::secret("s3cret");
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "secret": "s3cret" })
        );

        let update = AccountUpdate::expiration(3_600_000_000_000);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "token_expiration": 3_600_000_000_000i64 })
        );
    }

    #[test]
    fn rule_spec_omits_empty_endpoint() {
        let spec = RuleSpec {
            endpoint: None,
            topic: "driver_location".to_string(),
            access_type: AccessType::Pub,
        };
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({ "topic": "driver_location", "access_type": "2" })
        );
    }
}
