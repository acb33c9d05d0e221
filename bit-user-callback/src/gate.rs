//! Invocation gate
//!
//! Back In Time calls the user-callback with `<profile id> <profile name>
//! <reason> [extra...]`. Only the "mount all necessary drives" reason for the
//! configured profile wakes the server, every other call is a no-op.

use crate::config::CallbackConfig;
use crate::error::CallbackError;
use std::fmt;

/// Reason codes sent by Back In Time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    BackupStarted,
    BackupFinished,
    NewSnapshot,
    Error,
    AppStarted,
    AppExited,
    Mount,
    Unmount,
    Other(String),
}

impl Reason {
    pub fn from_code(code: &str) -> Self {
        match code {
            "1" => Reason::BackupStarted,
            "2" => Reason::BackupFinished,
            "3" => Reason::NewSnapshot,
            "4" => Reason::Error,
            "5" => Reason::AppStarted,
            "6" => Reason::AppExited,
            "7" => Reason::Mount,
            "8" => Reason::Unmount,
            other => Reason::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::BackupStarted => f.write_str("backup started"),
            Reason::BackupFinished => f.write_str("backup finished"),
            Reason::NewSnapshot => f.write_str("new snapshot"),
            Reason::Error => f.write_str("error"),
            Reason::AppStarted => f.write_str("app started"),
            Reason::AppExited => f.write_str("app exited"),
            Reason::Mount => f.write_str("mount all necessary drives"),
            Reason::Unmount => f.write_str("unmount all drives"),
            Reason::Other(code) => write!(f, "unknown reason {code:?}"),
        }
    }
}

/// Positional arguments of one callback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub profile_id: String,
    pub profile_name: String,
    pub reason: Reason,
    pub extra: Vec<String>,
}

impl Invocation {
    pub fn from_args(args: &[String]) -> Result<Self, CallbackError> {
        match args {
            [profile_id, profile_name, reason, extra @ ..] => Ok(Invocation {
                profile_id: profile_id.clone(),
                profile_name: profile_name.clone(),
                reason: Reason::from_code(reason),
                extra: extra.to_vec(),
            }),
            _ => Err(CallbackError::Usage(args.len())),
        }
    }

    pub fn is_applicable(&self, config: &CallbackConfig) -> bool {
        self.profile_name == config.profile && self.reason == Reason::Mount
    }
}

/// Whether this invocation should run the wake-and-poll sequence.
pub fn should_proceed(profile: &str, reason: &str, config: &CallbackConfig) -> bool {
    profile == config.profile && Reason::from_code(reason) == Reason::Mount
}
