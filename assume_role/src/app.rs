use crate::launcher::{self, Executor};
use crate::output::OutputFormat;
use anyhow::Result;
use shared::args::Args;
use shared::env::{clear_stale_credentials, Environment};
use std::io::Write;
use sts::assume::RoleAssumer;
use sts::mfa::TokenProvider;
use tracing::debug;

/// What the user asked for, independent of how the arguments were parsed.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub role: String,
    pub command: Vec<String>,
    pub format: String,
    /// The command line as typed, echoed in the shell hint.
    pub command_line: String,
}

impl Invocation {
    pub fn new(args: &Args, command_line: String) -> Self {
        Self {
            role: args.role.clone(),
            command: args.command.clone(),
            format: args.format.clone(),
            command_line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Printed,
    /// Invalid arguments that clap cannot catch on its own.
    Usage,
    Exited(i32),
}

pub async fn run(
    invocation: &Invocation,
    env: &impl Environment,
    assumer: &impl RoleAssumer,
    token: &dyn TokenProvider,
    executor: &impl Executor,
    out: &mut impl Write,
) -> Result<Outcome> {
    let format = if invocation.command.is_empty() {
        match invocation.format.parse::<OutputFormat>() {
            Ok(format) => Some(format),
            Err(e) => {
                debug!("{:#}", e);
                return Ok(Outcome::Usage);
            }
        }
    } else {
        None
    };

    clear_stale_credentials(env);

    let credentials = assumer.assume(&invocation.role, token).await?;

    match format {
        Some(format) => {
            let output = format.render(&invocation.role, &credentials, &invocation.command_line)?;
            out.write_all(output.as_bytes())?;
            out.flush()?;
            Ok(Outcome::Printed)
        }
        None => launcher::launch(
            &invocation.command,
            &invocation.role,
            &credentials,
            env,
            executor,
        ),
    }
}
