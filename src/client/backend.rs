//! Backend contract between the client core and the REST API, plus the
//! production HTTP implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::models::{
    Appointment, AppointmentUpdate, MedicalRecord, NewAppointment, NewMedicalRecord,
    NewNotification, NewTask, NewUser, Notification, PublicUser, Role, Task, TaskUpdate,
};

use super::PortalError;

/// The endpoint surface the portal depends on, one method per endpoint.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<PublicUser, PortalError>;
    async fn register(&self, user: NewUser) -> Result<PublicUser, PortalError>;

    async fn appointments(&self) -> Result<Vec<Appointment>, PortalError>;
    async fn appointments_for_user(&self, user_id: i64) -> Result<Vec<Appointment>, PortalError>;
    async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, PortalError>;
    /// Returns None when the id is unknown to the backend.
    async fn update_appointment(
        &self,
        id: i64,
        updates: &AppointmentUpdate,
    ) -> Result<Option<Appointment>, PortalError>;

    async fn medical_records(&self) -> Result<Vec<MedicalRecord>, PortalError>;
    async fn medical_records_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<MedicalRecord>, PortalError>;
    async fn create_medical_record(
        &self,
        record: NewMedicalRecord,
    ) -> Result<MedicalRecord, PortalError>;

    async fn notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>, PortalError>;
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, PortalError>;
    async fn mark_notification_read(&self, id: i64) -> Result<(), PortalError>;

    async fn tasks(&self) -> Result<Vec<Task>, PortalError>;
    async fn tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>, PortalError>;
    async fn create_task(&self, task: NewTask) -> Result<Task, PortalError>;
    /// Returns None when the id is unknown to the backend.
    async fn update_task(&self, id: i64, updates: &TaskUpdate) -> Result<Option<Task>, PortalError>;
}

/// reqwest-based implementation against a running Medora server.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

async fn expect_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PortalError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        Err(rejection(status, response).await)
    }
}

async fn rejection(status: StatusCode, response: reqwest::Response) -> PortalError {
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    PortalError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<PublicUser, PortalError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password, "role": role }))
            .send()
            .await?;
        expect_json(response).await
    }

    async fn register(&self, user: NewUser) -> Result<PublicUser, PortalError> {
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&user)
            .send()
            .await?;
        expect_json(response).await
    }

    async fn appointments(&self) -> Result<Vec<Appointment>, PortalError> {
        let response = self.http.get(self.url("/api/appointments")).send().await?;
        expect_json(response).await
    }

    async fn appointments_for_user(&self, user_id: i64) -> Result<Vec<Appointment>, PortalError> {
        let response = self
            .http
            .get(self.url(&format!("/api/appointments/user/{user_id}")))
            .send()
            .await?;
        expect_json(response).await
    }

    async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, PortalError> {
        let response = self
            .http
            .post(self.url("/api/appointments"))
            .json(&appointment)
            .send()
            .await?;
        expect_json(response).await
    }

    async fn update_appointment(
        &self,
        id: i64,
        updates: &AppointmentUpdate,
    ) -> Result<Option<Appointment>, PortalError> {
        let response = self
            .http
            .patch(self.url(&format!("/api/appointments/{id}")))
            .json(updates)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(expect_json(response).await?))
    }

    async fn medical_records(&self) -> Result<Vec<MedicalRecord>, PortalError> {
        let response = self.http.get(self.url("/api/medical-records")).send().await?;
        expect_json(response).await
    }

    async fn medical_records_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<MedicalRecord>, PortalError> {
        let response = self
            .http
            .get(self.url(&format!("/api/medical-records/patient/{patient_id}")))
            .send()
            .await?;
        expect_json(response).await
    }

    async fn create_medical_record(
        &self,
        record: NewMedicalRecord,
    ) -> Result<MedicalRecord, PortalError> {
        let response = self
            .http
            .post(self.url("/api/medical-records"))
            .json(&record)
            .send()
            .await?;
        expect_json(response).await
    }

    async fn notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>, PortalError> {
        let response = self
            .http
            .get(self.url(&format!("/api/notifications/{user_id}")))
            .send()
            .await?;
        expect_json(response).await
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, PortalError> {
        let response = self
            .http
            .post(self.url("/api/notifications"))
            .json(&notification)
            .send()
            .await?;
        expect_json(response).await
    }

    async fn mark_notification_read(&self, id: i64) -> Result<(), PortalError> {
        let response = self
            .http
            .post(self.url(&format!("/api/notifications/{id}/read")))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(rejection(status, response).await)
        }
    }

    async fn tasks(&self) -> Result<Vec<Task>, PortalError> {
        let response = self.http.get(self.url("/api/tasks")).send().await?;
        expect_json(response).await
    }

    async fn tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>, PortalError> {
        let response = self
            .http
            .get(self.url(&format!("/api/tasks/user/{user_id}")))
            .send()
            .await?;
        expect_json(response).await
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, PortalError> {
        let response = self
            .http
            .post(self.url("/api/tasks"))
            .json(&task)
            .send()
            .await?;
        expect_json(response).await
    }

    async fn update_task(
        &self,
        id: i64,
        updates: &TaskUpdate,
    ) -> Result<Option<Task>, PortalError> {
        let response = self
            .http
            .patch(self.url(&format!("/api/tasks/{id}")))
            .json(updates)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(expect_json(response).await?))
    }
}
