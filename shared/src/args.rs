use std::time::Duration;

#[derive(clap::Parser, Debug)]
#[command(name = "assume-role", author, version, about, long_about = None)]
pub struct Args {
    /// The profile in the AWS config file describing the role to assume
    pub role: String,

    /// Command to run with the assumed credentials instead of printing them
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// The duration that the credentials will be valid for
    #[arg(short, long, default_value = "1h", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Output format, can be 'bash', 'powershell' or 'json'
    #[arg(short, long, default_value_t = default_format().to_string())]
    pub format: String,

    /// Enables verbose logging to stderr
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

pub fn default_format() -> &'static str {
    let shell = std::env::var("SHELL").ok();
    format_for_platform(cfg!(windows), shell.as_deref())
}

/// PowerShell is only assumed on Windows when no unix-style shell is around.
pub fn format_for_platform(windows: bool, shell: Option<&str>) -> &'static str {
    match shell {
        Some(shell) if !shell.is_empty() => "bash",
        _ if windows => "powershell",
        _ => "bash",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{error::ErrorKind, Parser};

    #[test]
    fn test_role_only() {
        let args = Args::try_parse_from(["assume-role", "dev"]).unwrap();
        assert_eq!(args.role, "dev");
        assert!(args.command.is_empty());
        assert_eq!(args.duration, Duration::from_secs(3600));
        assert!(!args.debug);
    }

    #[test]
    fn test_missing_role_is_an_error() {
        let err = Args::try_parse_from(["assume-role"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_trailing_command_keeps_its_flags() {
        let args = Args::try_parse_from([
            "assume-role",
            "-d",
            "15m",
            "prod",
            "aws",
            "s3",
            "ls",
            "--recursive",
        ])
        .unwrap();

        assert_eq!(args.role, "prod");
        assert_eq!(args.command, vec!["aws", "s3", "ls", "--recursive"]);
        assert_eq!(args.duration, Duration::from_secs(900));
    }

    #[test]
    fn test_duration_formats() {
        let args = Args::try_parse_from(["assume-role", "--duration", "1h 30m", "dev"]).unwrap();
        assert_eq!(args.duration, Duration::from_secs(5400));

        let err = Args::try_parse_from(["assume-role", "--duration", "soon", "dev"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_format_is_not_validated_by_the_parser() {
        let args = Args::try_parse_from(["assume-role", "-f", "zsh", "dev"]).unwrap();
        assert_eq!(args.format, "zsh");
    }

    #[test]
    fn test_format_for_platform() {
        assert_eq!(format_for_platform(false, None), "bash");
        assert_eq!(format_for_platform(false, Some("/bin/zsh")), "bash");
        assert_eq!(format_for_platform(true, None), "powershell");
        assert_eq!(format_for_platform(true, Some("")), "powershell");
        assert_eq!(format_for_platform(true, Some("/usr/bin/bash")), "bash");
    }
}
