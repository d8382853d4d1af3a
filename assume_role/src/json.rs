use serde::Serialize;
use sts::credentials::AssumedCredentials;

/// The document AWS tooling expects from a `credential_process`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct JsonCredential<'a> {
    pub version: u8,
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub session_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
}

impl<'a> JsonCredential<'a> {
    pub fn convert(credentials: &'a AssumedCredentials) -> Self {
        Self {
            version: 1,
            access_key_id: &credentials.access_key_id,
            secret_access_key: &credentials.secret_access_key,
            session_token: &credentials.session_token,
            expiration: credentials
                .expiration
                .map(|expiration| expiration.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        }
    }
}
