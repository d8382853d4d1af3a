use crate::credentials::AssumedCredentials;
use crate::mfa::TokenProvider;
use anyhow::{anyhow, bail, Context, Result};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_sts::config::Region;
use aws_sdk_sts::error::DisplayErrorContext;
use chrono::{DateTime, Utc};
use file_manager::aws_config::AwsConfig;
use std::time::Duration;
use tracing::{debug, info};

#[allow(async_fn_in_trait)]
pub trait RoleAssumer {
    /// Resolves temporary credentials for `profile`, asking `token` for an MFA code at most once.
    async fn assume(&self, profile: &str, token: &dyn TokenProvider) -> Result<AssumedCredentials>;
}

/// Assumes roles described in the shared AWS config file through STS.
#[derive(Debug, Clone)]
pub struct SdkRoleAssumer {
    default_duration: Duration,
}

impl SdkRoleAssumer {
    pub fn new(default_duration: Duration) -> Self {
        Self { default_duration }
    }
}

impl RoleAssumer for SdkRoleAssumer {
    async fn assume(&self, profile: &str, token: &dyn TokenProvider) -> Result<AssumedCredentials> {
        let configs = AwsConfig::read_file()?;

        match AwsConfig::profile(profile, &configs) {
            Some(config) if config.assumes_role() => {
                assume_role(profile, config, self.default_duration, token).await
            }
            _ => load_profile(profile).await,
        }
    }
}

async fn assume_role(
    profile_name: &str,
    config: &AwsConfig,
    default_duration: Duration,
    token: &dyn TokenProvider,
) -> Result<AssumedCredentials> {
    let role_arn = config
        .role_arn
        .as_deref()
        .ok_or(anyhow!("Profile '{}' has no role_arn", profile_name))?;

    let source_config = match source_profile(profile_name, config)? {
        Some(source) => {
            debug!("Loading source credentials from profile: {}", source);
            aws_config::defaults(BehaviorVersion::latest())
                .profile_name(source)
                .load()
                .await
        }
        None => aws_config::defaults(BehaviorVersion::latest()).load().await,
    };

    let region = resolve_region(profile_name, config.region.as_deref(), &source_config)?;
    let duration_seconds = session_duration(default_duration, config)?;
    let session_name = config
        .role_session_name
        .clone()
        .unwrap_or_else(|| format!("assume-role-{}", Utc::now().timestamp()));

    let token_code = match &config.mfa_serial {
        Some(serial) => {
            debug!("Profile requires MFA device: {}", serial);
            Some(token.token_code()?)
        }
        None => None,
    };

    let sts_config = aws_sdk_sts::config::Builder::from(&source_config)
        .region(Region::new(region.clone()))
        .build();
    let sts_client = aws_sdk_sts::Client::from_conf(sts_config);

    info!("Assuming role: {}", role_arn);
    debug!("Session name: {}", session_name);
    debug!("Duration: {} seconds", duration_seconds);

    let assume_role_response = sts_client
        .assume_role()
        .role_arn(role_arn)
        .role_session_name(session_name)
        .duration_seconds(duration_seconds)
        .set_external_id(config.external_id.clone())
        .set_serial_number(config.mfa_serial.clone())
        .set_token_code(token_code)
        .send()
        .await
        .map_err(|e| anyhow!("Failed to assume role {}: {}", role_arn, DisplayErrorContext(&e)))?;

    let credentials = assume_role_response
        .credentials()
        .ok_or(anyhow!("No credentials found in assume role response"))?;

    let expiration = credentials.expiration();
    let expiration = DateTime::<Utc>::from_timestamp(expiration.secs(), expiration.subsec_nanos());
    if let Some(expiration) = expiration {
        info!("Credentials expire at {}", expiration.to_rfc3339());
    }

    Ok(AssumedCredentials {
        access_key_id: credentials.access_key_id().to_owned(),
        secret_access_key: credentials.secret_access_key().to_owned(),
        session_token: credentials.session_token().to_owned(),
        region: Some(region),
        expiration,
    })
}

/// Profiles without a `role_arn`, or only known to the credentials file, go through the
/// SDK chain untouched.
async fn load_profile(profile_name: &str) -> Result<AssumedCredentials> {
    info!("Loading credentials for profile: {}", profile_name);

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .profile_name(profile_name)
        .load()
        .await;

    let region = resolve_region(profile_name, None, &sdk_config)?;

    let provider = sdk_config
        .credentials_provider()
        .ok_or(anyhow!("No credentials provider for profile '{}'", profile_name))?;

    let credentials = provider.provide_credentials().await.map_err(|e| {
        anyhow!(
            "Failed to load credentials for profile '{}': {}",
            profile_name,
            DisplayErrorContext(&e)
        )
    })?;

    Ok(AssumedCredentials {
        access_key_id: credentials.access_key_id().to_owned(),
        secret_access_key: credentials.secret_access_key().to_owned(),
        session_token: credentials.session_token().unwrap_or_default().to_owned(),
        region: Some(region),
        expiration: credentials.expiry().map(DateTime::<Utc>::from),
    })
}

fn source_profile<'a>(profile_name: &str, config: &'a AwsConfig) -> Result<Option<&'a str>> {
    match (&config.source_profile, &config.credential_source) {
        (Some(source), _) => Ok(Some(source.as_str())),
        (None, Some(_)) => Ok(None),
        (None, None) => bail!(
            "Profile '{}' has a role_arn but neither source_profile nor credential_source",
            profile_name
        ),
    }
}

fn resolve_region(
    profile_name: &str,
    configured: Option<&str>,
    sdk_config: &SdkConfig,
) -> Result<String> {
    configured
        .filter(|region| !region.is_empty())
        .map(str::to_owned)
        .or_else(|| sdk_config.region().map(|region| region.to_string()))
        .with_context(|| format!("No region configured for profile '{}'", profile_name))
}

/// A `duration_seconds` in the profile wins over the default from the command line.
fn session_duration(default_duration: Duration, config: &AwsConfig) -> Result<i32> {
    let seconds = config
        .duration_seconds
        .map(u64::from)
        .unwrap_or_else(|| default_duration.as_secs());

    i32::try_from(seconds).with_context(|| format!("Session duration {}s is too long", seconds))
}
