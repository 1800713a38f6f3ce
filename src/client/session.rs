//! Client-held authentication state.
//!
//! The session tracks the single authenticated identity for the running
//! client. A durable copy lives as one JSON-serialized user record at a
//! fixed path; presence means "logged in". The record carries no expiry and
//! is restored without re-validating against the backend.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::models::{PublicUser, Role};

use super::PortalError;

/// Dashboard variant a session resolves to. Decided once when the identity
/// is established, not re-derived on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardView {
    Admin,
    Doctor,
    Nurse,
    Patient,
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DashboardView::Admin => "admin",
            DashboardView::Doctor => "doctor",
            DashboardView::Nurse => "nurse",
            DashboardView::Patient => "patient",
        };
        f.write_str(name)
    }
}

/// What a session is allowed to do and see, fixed at establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub view: DashboardView,
    pub manage_users: bool,
    pub approve_appointments: bool,
    pub write_medical_records: bool,
    pub view_all_records: bool,
    pub view_all_tasks: bool,
}

impl Capabilities {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::SuperAdmin => Self {
                view: DashboardView::Admin,
                manage_users: true,
                approve_appointments: true,
                write_medical_records: false,
                view_all_records: true,
                view_all_tasks: true,
            },
            Role::Doctor => Self {
                view: DashboardView::Doctor,
                manage_users: false,
                approve_appointments: true,
                write_medical_records: true,
                view_all_records: true,
                view_all_tasks: false,
            },
            Role::Nurse => Self {
                view: DashboardView::Nurse,
                manage_users: false,
                approve_appointments: false,
                write_medical_records: false,
                view_all_records: true,
                view_all_tasks: false,
            },
            Role::Patient => Self {
                view: DashboardView::Patient,
                manage_users: false,
                approve_appointments: false,
                write_medical_records: false,
                view_all_records: false,
                view_all_tasks: false,
            },
        }
    }

    /// Each session resolves to exactly one dashboard.
    pub fn allows(&self, view: DashboardView) -> bool {
        self.view == view
    }
}

/// Durable session record: a single JSON-serialized user at a fixed path.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored identity. Anything unreadable or unparsable counts
    /// as logged-out.
    pub fn load(&self) -> Option<PublicUser> {
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("discarding unreadable session record: {err}");
                None
            }
        }
    }

    pub fn save(&self, user: &PublicUser) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(user)?;
        fs::write(&self.path, json)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

struct Identity {
    user: PublicUser,
    capabilities: Capabilities,
}

/// Volatile identity plus its durable copy.
pub struct AuthSession {
    store: SessionStore,
    identity: Option<Identity>,
}

impl AuthSession {
    /// Restore from the durable record, read once at construction. A stored
    /// identity is trusted as-is; there is no re-check against the backend.
    pub fn restore(store: SessionStore) -> Self {
        let identity = store.load().map(|user| {
            debug!("restored session for {}", user.email);
            Identity {
                capabilities: Capabilities::for_role(user.role),
                user,
            }
        });
        Self { store, identity }
    }

    /// Hold the identity in memory and persist the durable copy.
    /// Capabilities are resolved here, once.
    pub fn establish(&mut self, user: PublicUser) -> Result<(), PortalError> {
        self.store.save(&user)?;
        self.identity = Some(Identity {
            capabilities: Capabilities::for_role(user.role),
            user,
        });
        Ok(())
    }

    /// Drop both copies of the identity. Safe to call when already logged
    /// out.
    pub fn clear(&mut self) {
        self.identity = None;
        if let Err(err) = self.store.clear() {
            warn!("failed to remove session record: {err}");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn user(&self) -> Option<&PublicUser> {
        self.identity.as_ref().map(|identity| &identity.user)
    }

    pub fn capabilities(&self) -> Option<Capabilities> {
        self.identity.as_ref().map(|identity| identity.capabilities)
    }

    pub fn authorize(&self, view: DashboardView) -> Result<(), PortalError> {
        match &self.identity {
            None => Err(PortalError::NotAuthenticated),
            Some(identity) if identity.capabilities.allows(view) => Ok(()),
            Some(_) => Err(PortalError::Forbidden(view)),
        }
    }
}
