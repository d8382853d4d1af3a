//! Access to process environment variables.
//!
//! Everything that reads or writes the environment goes through [`Environment`] so the
//! orchestration can run against an in-memory map in tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ffi::OsString;
use tracing::debug;

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
/// Legacy alias of the session token still read by older SDKs.
pub const AWS_SECURITY_TOKEN: &str = "AWS_SECURITY_TOKEN";
pub const AWS_REGION: &str = "AWS_REGION";
/// Set to the role name in every environment this tool produces.
pub const ASSUMED_ROLE: &str = "ASSUMED_ROLE";

pub const CREDENTIAL_VARIABLES: [&str; 4] = [
    AWS_ACCESS_KEY_ID,
    AWS_SECRET_ACCESS_KEY,
    AWS_SESSION_TOKEN,
    AWS_SECURITY_TOKEN,
];

pub trait Environment {
    /// Returns `None` when the variable is unset or not valid unicode.
    fn var(&self, key: &str) -> Option<String>;
    fn set_var(&self, key: &str, value: &str);
    fn remove_var(&self, key: &str);
    /// Every variable, byte-for-byte, for handing to a child process.
    fn vars(&self) -> Vec<(OsString, OsString)>;
}

/// The real environment of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set_var(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn remove_var(&self, key: &str) {
        std::env::remove_var(key);
    }

    fn vars(&self) -> Vec<(OsString, OsString)> {
        std::env::vars_os().collect()
    }
}

#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: RefCell<BTreeMap<String, String>>,
}

impl MemoryEnv {
    pub fn new<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: RefCell::new(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl Environment for MemoryEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.borrow().get(key).cloned()
    }

    fn set_var(&self, key: &str, value: &str) {
        self.vars
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove_var(&self, key: &str) {
        self.vars.borrow_mut().remove(key);
    }

    fn vars(&self) -> Vec<(OsString, OsString)> {
        self.vars
            .borrow()
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }
}

/// Drops the credentials of a previously assumed role so the SDK does not pick them up
/// as the source identity for the next assumption.
pub fn clear_stale_credentials(env: &impl Environment) {
    let Some(previous) = env.var(ASSUMED_ROLE).filter(|role| !role.is_empty()) else {
        return;
    };

    debug!("Running inside assumed role '{}', clearing credentials", previous);

    for key in CREDENTIAL_VARIABLES {
        env.remove_var(key);
    }
}
