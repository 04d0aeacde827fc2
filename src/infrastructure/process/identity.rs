use nix::unistd::User;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::{LaunchError, LaunchResult};
use crate::domain::models::ProcessPolicy;

/// Account a worker is launched under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAsIdentity {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
}

/// Look up the run-as account for a worker, if one is configured
///
/// The domain part and the password are not needed for a uid switch on
/// Unix and are ignored.
pub fn resolve_identity(worker: &str, policy: &ProcessPolicy) -> LaunchResult<Option<RunAsIdentity>> {
    let Some(user) = policy.run_as_user.as_deref().filter(|u| !u.is_empty()) else {
        return Ok(None);
    };

    if let Some(domain) = policy.run_as_domain.as_deref().filter(|d| !d.is_empty()) {
        debug!(worker, domain, "ignoring run-as domain");
    }

    let account = User::from_name(user)
        .map_err(|e| LaunchError::UserLookup {
            user: user.to_string(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| LaunchError::UnknownUser {
            worker: worker.to_string(),
            user: user.to_string(),
        })?;

    Ok(Some(RunAsIdentity {
        name: account.name,
        uid: account.uid.as_raw(),
        gid: account.gid.as_raw(),
        home: account.dir,
    }))
}

/// Configure `command` to run as `identity`
///
/// With `load_profile` the child also gets the account's `HOME`, `USER` and
/// `LOGNAME`.
pub fn apply_identity(command: &mut Command, identity: &RunAsIdentity, load_profile: bool) {
    command.uid(identity.uid).gid(identity.gid);
    if load_profile {
        command
            .env("HOME", &identity.home)
            .env("USER", &identity.name)
            .env("LOGNAME", &identity.name);
    }
}
