//! Shared record definitions for the Medora portal.
//!
//! Every entity here is exchanged as JSON between the API, the persistence
//! gateway, and the client core. Wire field names are camelCase; enum values
//! use the snake_case strings the relational store holds.

mod appointment;
mod notification;
mod record;
mod task;
mod user;

pub use appointment::{Appointment, AppointmentStatus, AppointmentUpdate, NewAppointment};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use record::{MedicalRecord, NewMedicalRecord};
pub use task::{NewTask, Task, TaskPriority, TaskStatus, TaskUpdate};
pub use user::{NewUser, PublicUser, Role, User};

/// A string value that does not name a known enum variant.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized {field} value: {value}")]
pub struct ParseError {
    pub field: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("super_admin", Role::SuperAdmin)]
    #[test_case("doctor", Role::Doctor)]
    #[test_case("nurse", Role::Nurse)]
    #[test_case("patient", Role::Patient)]
    fn role_round_trips(text: &str, role: Role) {
        assert_eq!(text.parse::<Role>().unwrap(), role);
        assert_eq!(role.as_str(), text);
        assert_eq!(serde_json::to_string(&role).unwrap(), format!("\"{text}\""));
    }

    #[test_case("pending", AppointmentStatus::Pending)]
    #[test_case("approved", AppointmentStatus::Approved)]
    #[test_case("rejected", AppointmentStatus::Rejected)]
    #[test_case("completed", AppointmentStatus::Completed)]
    #[test_case("cancelled", AppointmentStatus::Cancelled)]
    fn appointment_status_round_trips(text: &str, status: AppointmentStatus) {
        assert_eq!(text.parse::<AppointmentStatus>().unwrap(), status);
        assert_eq!(status.as_str(), text);
    }

    #[test_case("pending", TaskStatus::Pending)]
    #[test_case("in_progress", TaskStatus::InProgress)]
    #[test_case("completed", TaskStatus::Completed)]
    fn task_status_round_trips(text: &str, status: TaskStatus) {
        assert_eq!(text.parse::<TaskStatus>().unwrap(), status);
        assert_eq!(status.as_str(), text);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "janitor".parse::<Role>().unwrap_err();
        assert_eq!(err.field, "role");
        assert_eq!(err.value, "janitor");
    }

    #[test]
    fn user_wire_shape_is_camel_case() {
        let json = serde_json::json!({
            "id": 4,
            "name": "John Doe",
            "email": "patient@medora.com",
            "role": "patient",
            "avatar": null,
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z"
        });
        let user: PublicUser = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(user.role, Role::Patient);
        assert_eq!(serde_json::to_value(&user).unwrap(), json);
    }
}
