use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of the `auth/user` identity probe.
///
/// Depending on session state the endpoint returns either the current
/// account identity or a pending-second-factor marker, so both shapes live
/// in one struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProbe {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// `true` or a non-empty list of available methods while a second
    /// factor is pending; absent otherwise.
    #[serde(default)]
    requires_two_factor_auth: Value,
}

impl IdentityProbe {
    pub fn second_factor_required(&self) -> bool {
        match &self.requires_two_factor_auth {
            Value::Bool(required) => *required,
            Value::Array(methods) => !methods.is_empty(),
            _ => false,
        }
    }

    pub fn is_identified(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// TOTP verification request body
#[derive(Debug, Clone, Serialize)]
pub struct TotpVerifyRequest {
    pub code: String,
}

/// TOTP verification response body
#[derive(Debug, Clone, Deserialize)]
pub struct TotpVerifyResponse {
    #[serde(default)]
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_marker_requires_second_factor() {
        let probe: IdentityProbe =
            serde_json::from_str(r#"{"requiresTwoFactorAuth": true}"#).unwrap();
        assert!(probe.second_factor_required());
        assert!(!probe.is_identified());
    }

    #[test]
    fn method_list_requires_second_factor() {
        let probe: IdentityProbe =
            serde_json::from_str(r#"{"requiresTwoFactorAuth": ["totp", "otp"]}"#).unwrap();
        assert!(probe.second_factor_required());
    }

    #[test]
    fn empty_method_list_does_not_require_second_factor() {
        let probe: IdentityProbe =
            serde_json::from_str(r#"{"requiresTwoFactorAuth": []}"#).unwrap();
        assert!(!probe.second_factor_required());
    }

    #[test]
    fn identity_payload_is_identified() {
        let probe: IdentityProbe =
            serde_json::from_str(r#"{"id": "usr_1", "displayName": "Tester"}"#).unwrap();
        assert!(probe.is_identified());
        assert!(!probe.second_factor_required());
        assert_eq!(probe.display_name.as_deref(), Some("Tester"));
    }
}
