use anyhow::{anyhow, Context, Result};
use directories::UserDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The subset of a shared config profile that decides how a role gets assumed.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AwsConfig {
    pub role_arn: Option<String>,
    pub source_profile: Option<String>,
    pub credential_source: Option<String>,
    pub mfa_serial: Option<String>,
    pub external_id: Option<String>,
    pub role_session_name: Option<String>,
    pub duration_seconds: Option<u32>,
    pub region: Option<String>,
}

impl AwsConfig {
    fn file_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os("AWS_CONFIG_FILE").filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        match UserDirs::new() {
            Some(user_dirs) => Ok(user_dirs.home_dir().join(".aws/config")),
            None => Err(anyhow!("Unable to get user directories")),
        }
    }

    pub fn read_file() -> Result<HashMap<String, AwsConfig>> {
        Self::read_path(&Self::file_path()?)
    }

    /// A missing file has no profiles; anything unreadable or malformed is an error.
    pub fn read_path(config_path: &Path) -> Result<HashMap<String, AwsConfig>> {
        let file = match File::open(config_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No AWS config file at {}", config_path.display());
                return Ok(HashMap::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", config_path.display()))
            }
        };

        debug!("Reading AWS config from {}", config_path.display());

        Self::read(BufReader::new(file))
            .with_context(|| format!("Invalid AWS config file {}", config_path.display()))
    }

    pub fn read(reader: impl BufRead) -> Result<HashMap<String, AwsConfig>> {
        let profiles: HashMap<String, AwsConfig> =
            serde_ini::from_bufread(reader).context("Failed to parse AWS config file")?;

        Ok(profiles)
    }

    /// Looks up `[default]` or `[profile <name>]`.
    pub fn profile<'a>(
        name: &str,
        profiles: &'a HashMap<String, AwsConfig>,
    ) -> Option<&'a AwsConfig> {
        match name {
            "default" => profiles.get(name),
            _ => profiles.get(&format!("profile {name}")),
        }
    }

    pub fn assumes_role(&self) -> bool {
        self.role_arn.as_deref().is_some_and(|arn| !arn.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "\
[default]
region = ap-southeast-2
output = json

[profile dev]
role_arn = arn:aws:iam::123456789012:role/developer
source_profile = default
mfa_serial = arn:aws:iam::111111111111:mfa/jane
duration_seconds = 7200

[profile ci]
role_arn = arn:aws:iam::123456789012:role/ci
credential_source = Environment
external_id = build-system
role_session_name = ci-run
region = us-east-1
";

    fn profiles() -> HashMap<String, AwsConfig> {
        AwsConfig::read(CONFIG.as_bytes()).unwrap()
    }

    #[test]
    fn test_read_profiles() {
        let profiles = profiles();
        assert_eq!(profiles.len(), 3);

        let dev = AwsConfig::profile("dev", &profiles).unwrap();
        assert_eq!(
            dev.role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/developer")
        );
        assert_eq!(dev.source_profile.as_deref(), Some("default"));
        assert_eq!(
            dev.mfa_serial.as_deref(),
            Some("arn:aws:iam::111111111111:mfa/jane")
        );
        assert_eq!(dev.duration_seconds, Some(7200));
        assert_eq!(dev.region, None);
        assert!(dev.assumes_role());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let profiles = profiles();
        let default = AwsConfig::profile("default", &profiles).unwrap();
        assert_eq!(default.region.as_deref(), Some("ap-southeast-2"));
        assert!(!default.assumes_role());
    }

    #[test]
    fn test_credential_source_profile() {
        let profiles = profiles();
        let ci = AwsConfig::profile("ci", &profiles).unwrap();
        assert_eq!(ci.credential_source.as_deref(), Some("Environment"));
        assert_eq!(ci.external_id.as_deref(), Some("build-system"));
        assert_eq!(ci.role_session_name.as_deref(), Some("ci-run"));
        assert_eq!(ci.source_profile, None);
    }

    #[test]
    fn test_missing_profile() {
        let profiles = profiles();
        assert!(AwsConfig::profile("prod", &profiles).is_none());
        assert!(AwsConfig::profile("profile dev", &profiles).is_none());
    }

    #[test]
    fn test_malformed_value_fails_whole_file() {
        let config = format!("{CONFIG}\n[profile other]\nduration_seconds = 1h\n");
        assert!(AwsConfig::read(config.as_bytes()).is_err());
    }

    #[test]
    fn test_read_path() {
        let dir = std::env::temp_dir().join(format!("assume-role-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing");
        assert!(AwsConfig::read_path(&missing).unwrap().is_empty());

        let valid = dir.join("valid");
        std::fs::write(&valid, CONFIG).unwrap();
        assert_eq!(AwsConfig::read_path(&valid).unwrap().len(), 3);

        let malformed = dir.join("malformed");
        std::fs::write(&malformed, "[profile dev]\nduration_seconds = 1h\n").unwrap();
        let err = AwsConfig::read_path(&malformed).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid AWS config file"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
