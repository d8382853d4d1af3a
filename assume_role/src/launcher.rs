use crate::app::Outcome;
use anyhow::{Context, Result};
use shared::env::Environment;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use sts::credentials::AssumedCredentials;
use tracing::debug;

/// Runs the resolved program in place of this tool.
pub trait Executor {
    /// `argv` includes the program name as typed. On success this only returns when the
    /// platform cannot replace the running process.
    fn exec(&self, program: &Path, argv: &[String], env: Vec<(OsString, OsString)>) -> Result<Outcome>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    #[cfg(unix)]
    fn exec(&self, program: &Path, argv: &[String], env: Vec<(OsString, OsString)>) -> Result<Outcome> {
        use std::os::unix::process::CommandExt;

        let (argv0, args) = argv.split_first().context("No command given")?;

        let error = Command::new(program)
            .arg0(argv0)
            .args(args)
            .env_clear()
            .envs(env)
            .exec();

        Err(error).with_context(|| format!("Failed to execute {}", program.display()))
    }

    #[cfg(not(unix))]
    fn exec(&self, program: &Path, argv: &[String], env: Vec<(OsString, OsString)>) -> Result<Outcome> {
        let status = Command::new(program)
            .args(argv.iter().skip(1))
            .env_clear()
            .envs(env)
            .status()
            .with_context(|| format!("Failed to execute {}", program.display()))?;

        Ok(Outcome::Exited(status.code().unwrap_or(1)))
    }
}

/// Finds `program` on the `PATH` of `env`.
pub fn lookup(program: &str, env: &impl Environment) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let resolved = which::which_in(program, env.var("PATH"), cwd)
        .with_context(|| format!("{}: executable file not found in PATH", program))?;

    debug!("Resolved {} to {}", program, resolved.display());
    Ok(resolved)
}

/// Exports the credentials into `env` and hands control to `argv`.
pub fn launch(
    argv: &[String],
    role: &str,
    credentials: &AssumedCredentials,
    env: &impl Environment,
    executor: &impl Executor,
) -> Result<Outcome> {
    let program = argv.first().context("No command given")?;
    let resolved = lookup(program, env)?;

    for (key, value) in credentials.exports(role) {
        env.set_var(key, value);
    }

    executor.exec(&resolved, argv, env.vars())
}
