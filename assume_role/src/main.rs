use crate::app::{Invocation, Outcome};
use crate::launcher::ProcessExecutor;
use anyhow::Result;
use clap::{CommandFactory, Parser};
use shared::args::Args;
use shared::env::ProcessEnv;
use std::io::Write;
use std::process::ExitCode;
use sts::assume::SdkRoleAssumer;
use sts::mfa::StdinTokenProvider;
use tracing_subscriber::EnvFilter;

mod app;
mod json;
mod launcher;
mod output;

/// SDK and HTTP internals stay quiet even with --debug, unless RUST_LOG says otherwise.
const DEBUG_FILTER: &str =
    "debug,aws_smithy_runtime=info,aws_smithy_runtime_api=info,aws_smithy_http_client=info,hyper=info,hyper_util=info,rustls=info,h2=info";

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { DEBUG_FILTER } else { "warn" }));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_line_number(debug)
        .with_env_filter(filter)
        .init();
}

/// Help and version go to stdout with status 0, real parse errors to stderr with status 1.
fn parse_error_status(e: &clap::Error, stdout: &mut impl Write, stderr: &mut impl Write) -> u8 {
    let rendered = e.render();
    if e.use_stderr() {
        let _ = write!(stderr, "{}", rendered);
        1
    } else {
        let _ = write!(stdout, "{}", rendered);
        0
    }
}

fn exit_status(result: Result<Outcome>, stderr: &mut impl Write) -> u8 {
    match result {
        Ok(Outcome::Printed) => 0,
        Ok(Outcome::Usage) => {
            let _ = writeln!(stderr, "{}", Args::command().render_help());
            1
        }
        // The child already reported its own failure.
        Ok(Outcome::Exited(code)) => u8::try_from(code).unwrap_or(1),
        Err(e) => {
            let _ = writeln!(stderr, "error: {:#}", e);
            1
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let status =
                parse_error_status(&e, &mut std::io::stdout(), &mut std::io::stderr());
            return ExitCode::from(status);
        }
    };

    init_tracing(args.debug);

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let invocation = Invocation::new(&args, command_line);
    let assumer = SdkRoleAssumer::new(args.duration);

    let result = app::run(
        &invocation,
        &ProcessEnv,
        &assumer,
        &StdinTokenProvider,
        &ProcessExecutor,
        &mut std::io::stdout().lock(),
    )
    .await;

    ExitCode::from(exit_status(result, &mut std::io::stderr()))
}
