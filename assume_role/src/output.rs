use crate::json::JsonCredential;
use anyhow::{bail, Result};
use std::fmt::Write;
use std::str::FromStr;
use sts::credentials::AssumedCredentials;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Bash,
    PowerShell,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bash" => Ok(OutputFormat::Bash),
            "powershell" => Ok(OutputFormat::PowerShell),
            "json" => Ok(OutputFormat::Json),
            other => bail!("Unknown format '{}'", other),
        }
    }
}

impl OutputFormat {
    /// Values are interpolated as-is; quotes inside them are not escaped.
    pub fn render(
        self,
        role: &str,
        credentials: &AssumedCredentials,
        invocation: &str,
    ) -> Result<String> {
        let mut output = String::new();

        match self {
            OutputFormat::Bash => {
                for (key, value) in credentials.exports(role) {
                    writeln!(output, "export {}=\"{}\"", key, value)?;
                }
                writeln!(output, "# Run this to configure your shell:")?;
                writeln!(output, "# eval $({})", invocation)?;
            }
            OutputFormat::PowerShell => {
                for (key, value) in credentials.exports(role) {
                    writeln!(output, "$env:{}=\"{}\"", key, value)?;
                }
                writeln!(output, "# Run this to configure your shell:")?;
                writeln!(output, "# {} | Invoke-Expression ", invocation)?;
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&JsonCredential::convert(credentials))?;
                writeln!(output, "{}", json)?;
            }
        }

        Ok(output)
    }
}
