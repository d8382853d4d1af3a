use anyhow::{bail, Context, Result};
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};

/// Supplies the one-time code for profiles that declare an `mfa_serial`.
pub trait TokenProvider {
    fn token_code(&self) -> Result<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Result<String>,
{
    fn token_code(&self) -> Result<String> {
        self()
    }
}

/// Prompts on stderr and reads the code from stdin, so stdout stays clean for `eval`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinTokenProvider;

impl TokenProvider for StdinTokenProvider {
    fn token_code(&self) -> Result<String> {
        if io::stdin().is_terminal() && io::stderr().is_terminal() {
            let code: String = Input::new()
                .with_prompt("MFA code")
                .interact_text()
                .context("Failed to read MFA code")?;
            return Ok(code.trim().to_string());
        }

        read_token_code(&mut io::stdin().lock(), &mut io::stderr())
    }
}

pub fn read_token_code(input: &mut impl BufRead, prompt: &mut impl Write) -> Result<String> {
    write!(prompt, "MFA code: ")?;
    prompt.flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read MFA code")?;
    if read == 0 {
        bail!("Failed to read MFA code: unexpected end of input");
    }

    Ok(line.trim().to_string())
}
