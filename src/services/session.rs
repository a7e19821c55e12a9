use crate::banking::CustomerIdentity;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("malformed session record in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Why the guest identity was used instead of a signed-in customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestReason {
    NoSessionConfigured,
    NoSessionRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    Customer(CustomerIdentity),
    Guest {
        identity: CustomerIdentity,
        reason: GuestReason,
    },
}

impl SessionLookup {
    pub fn identity(&self) -> &CustomerIdentity {
        match self {
            SessionLookup::Customer(identity) => identity,
            SessionLookup::Guest { identity, .. } => identity,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, SessionLookup::Guest { .. })
    }
}

#[derive(Debug, Deserialize)]
struct SessionRecord {
    id: i64,
    name: String,
}

/// Reads the "current customer" record left behind by the sign-in flow.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Option<PathBuf>,
    guest: CustomerIdentity,
}

impl SessionStore {
    pub fn new(path: Option<PathBuf>, guest: CustomerIdentity) -> Self {
        Self { path, guest }
    }

    pub fn lookup(&self) -> Result<SessionLookup, SessionError> {
        let Some(path) = &self.path else {
            return Ok(self.guest(GuestReason::NoSessionConfigured));
        };

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(self.guest(GuestReason::NoSessionRecord));
            }
            Err(source) => {
                return Err(SessionError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(self.guest(GuestReason::NoSessionRecord));
        }

        let record: SessionRecord =
            serde_json::from_str(&raw).map_err(|source| SessionError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok(SessionLookup::Customer(CustomerIdentity::new(
            record.id,
            record.name,
        )))
    }

    fn guest(&self, reason: GuestReason) -> SessionLookup {
        tracing::debug!(?reason, guest_id = self.guest.id, "using guest identity");
        SessionLookup::Guest {
            identity: self.guest.clone(),
            reason,
        }
    }
}
