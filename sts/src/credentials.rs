use chrono::{DateTime, Utc};
use shared::env::{
    ASSUMED_ROLE, AWS_ACCESS_KEY_ID, AWS_REGION, AWS_SECRET_ACCESS_KEY, AWS_SECURITY_TOKEN,
    AWS_SESSION_TOKEN,
};

/// Temporary credentials for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssumedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
}

impl AssumedCredentials {
    /// The variables handed to a shell or child process, in output order.
    pub fn exports<'a>(&'a self, role: &'a str) -> [(&'static str, &'a str); 6] {
        [
            (AWS_ACCESS_KEY_ID, self.access_key_id.as_str()),
            (AWS_SECRET_ACCESS_KEY, self.secret_access_key.as_str()),
            (AWS_SESSION_TOKEN, self.session_token.as_str()),
            (AWS_SECURITY_TOKEN, self.session_token.as_str()),
            (AWS_REGION, self.region.as_deref().unwrap_or_default()),
            (ASSUMED_ROLE, role),
        ]
    }
}
