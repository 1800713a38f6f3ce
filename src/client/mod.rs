//! Client core: session state, data cache, and the portal facade that keeps
//! them in step with the backend.
//!
//! Mutations follow a server-confirmed contract: the backend call happens
//! first and the cache changes only after the write is acknowledged. The
//! portal is an explicit object handed to the UI tree root; nothing here is
//! a global.

pub mod backend;
pub mod cache;
pub mod session;

use thiserror::Error;
use validator::Validate;

use crate::models::{
    Appointment, AppointmentUpdate, MedicalRecord, NewAppointment, NewMedicalRecord,
    NewNotification, NewTask, NewUser, Notification, PublicUser, Role, Task, TaskUpdate,
};

pub use backend::{Backend, HttpBackend};
pub use cache::{DashboardStats, DataCache};
pub use session::{AuthSession, Capabilities, DashboardView, SessionStore};

#[derive(Debug, Error)]
pub enum PortalError {
    /// Caught locally, before any network call.
    #[error("{0}")]
    Validation(String),
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("session storage: {0}")]
    SessionStore(#[from] std::io::Error),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("the {0} dashboard is not available to this session")]
    Forbidden(DashboardView),
}

#[derive(Debug, Validate)]
struct LoginForm {
    #[validate(email(message = "a valid email is required"))]
    email: String,
    #[validate(length(min = 1, message = "password is required"))]
    password: String,
}

/// Facade the dashboards consume: one object owning the session, the cache,
/// and the backend connection.
pub struct Portal<B: Backend> {
    backend: B,
    session: AuthSession,
    cache: DataCache,
}

impl<B: Backend> Portal<B> {
    /// Restores any stored identity as part of construction.
    pub fn new(backend: B, store: SessionStore) -> Self {
        Self {
            backend,
            session: AuthSession::restore(store),
            cache: DataCache::new(),
        }
    }

    // ===== Authentication =====

    /// True establishes the identity; false means the backend rejected the
    /// credentials. Transport and storage failures surface as errors.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<bool, PortalError> {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
        .validate()
        .map_err(|err| PortalError::Validation(err.to_string()))?;

        match self.backend.login(email, password, role).await {
            Ok(user) => {
                self.session.establish(user)?;
                Ok(true)
            }
            Err(PortalError::Rejected { status: 401, .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// On success behaves like login: the new identity is established and
    /// persisted. False means the email is already taken.
    pub async fn register(&mut self, user: NewUser) -> Result<bool, PortalError> {
        user.validate()
            .map_err(|err| PortalError::Validation(err.to_string()))?;

        match self.backend.register(user).await {
            Ok(user) => {
                self.session.establish(user)?;
                Ok(true)
            }
            Err(PortalError::Rejected { status: 400, .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn logout(&mut self) {
        self.session.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<&PublicUser> {
        self.session.user()
    }

    pub fn authorize(&self, view: DashboardView) -> Result<(), PortalError> {
        self.session.authorize(view)
    }

    // ===== Collections =====

    /// Re-fetch every collection this session may see, scoped by the
    /// capabilities resolved at login.
    pub async fn refresh(&mut self) -> Result<(), PortalError> {
        let (user_id, caps) = match (self.session.user(), self.session.capabilities()) {
            (Some(user), Some(caps)) => (user.id, caps),
            _ => return Err(PortalError::NotAuthenticated),
        };

        let appointments = if caps.manage_users {
            self.backend.appointments().await?
        } else {
            self.backend.appointments_for_user(user_id).await?
        };
        let records = if caps.view_all_records {
            self.backend.medical_records().await?
        } else {
            self.backend.medical_records_for_patient(user_id).await?
        };
        let notifications = self.backend.notifications_for_user(user_id).await?;
        let tasks = if caps.view_all_tasks {
            self.backend.tasks().await?
        } else {
            self.backend.tasks_for_user(user_id).await?
        };

        self.cache.replace_appointments(appointments);
        self.cache.replace_medical_records(records);
        self.cache.replace_notifications(notifications);
        self.cache.replace_tasks(tasks);
        Ok(())
    }

    pub async fn add_appointment(
        &mut self,
        appointment: NewAppointment,
    ) -> Result<Appointment, PortalError> {
        let created = self.backend.create_appointment(appointment).await?;
        self.cache.insert_appointment(created.clone());
        Ok(created)
    }

    /// Partial merge by id. An id unknown to the backend is a no-op, not an
    /// error.
    pub async fn update_appointment(
        &mut self,
        id: i64,
        updates: AppointmentUpdate,
    ) -> Result<(), PortalError> {
        if self.backend.update_appointment(id, &updates).await?.is_some() {
            self.cache.update_appointment(id, &updates);
        }
        Ok(())
    }

    pub async fn add_medical_record(
        &mut self,
        record: NewMedicalRecord,
    ) -> Result<MedicalRecord, PortalError> {
        let created = self.backend.create_medical_record(record).await?;
        self.cache.insert_medical_record(created.clone());
        Ok(created)
    }

    pub async fn add_notification(
        &mut self,
        notification: NewNotification,
    ) -> Result<Notification, PortalError> {
        let created = self.backend.create_notification(notification).await?;
        self.cache.insert_notification(created.clone());
        Ok(created)
    }

    pub async fn mark_notification_read(&mut self, id: i64) -> Result<(), PortalError> {
        self.backend.mark_notification_read(id).await?;
        self.cache.mark_notification_read(id);
        Ok(())
    }

    pub async fn add_task(&mut self, task: NewTask) -> Result<Task, PortalError> {
        let created = self.backend.create_task(task).await?;
        self.cache.insert_task(created.clone());
        Ok(created)
    }

    /// Partial merge by id. An id unknown to the backend is a no-op, not an
    /// error.
    pub async fn update_task(&mut self, id: i64, updates: TaskUpdate) -> Result<(), PortalError> {
        if self.backend.update_task(id, &updates).await?.is_some() {
            self.cache.update_task(id, &updates);
        }
        Ok(())
    }

    pub fn appointments(&self) -> &[Appointment] {
        self.cache.appointments()
    }

    pub fn medical_records(&self) -> &[MedicalRecord] {
        self.cache.medical_records()
    }

    pub fn notifications(&self) -> &[Notification] {
        self.cache.notifications()
    }

    pub fn tasks(&self) -> &[Task] {
        self.cache.tasks()
    }

    pub fn stats(&self) -> DashboardStats {
        self.cache.stats()
    }
}
