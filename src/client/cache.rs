//! Client-local cache of the four mutable collections and their derived
//! dashboard statistics.
//!
//! Entries land here only after the backend has confirmed the write; the
//! cache itself never talks to the network.

use chrono::Utc;
use serde::Serialize;

use crate::models::{
    Appointment, AppointmentStatus, AppointmentUpdate, MedicalRecord, Notification, Task,
    TaskStatus, TaskUpdate,
};

/// Aggregate counts shown on every dashboard, recomputed on each change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_appointments: usize,
    pub pending_appointments: usize,
    pub completed_appointments: usize,
    pub unread_notifications: usize,
    pub tasks_due_today: usize,
    pub completed_tasks: usize,
}

#[derive(Debug, Default)]
pub struct DataCache {
    appointments: Vec<Appointment>,
    medical_records: Vec<MedicalRecord>,
    notifications: Vec<Notification>,
    tasks: Vec<Task>,
    stats: DashboardStats,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn medical_records(&self) -> &[MedicalRecord] {
        &self.medical_records
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    pub fn replace_appointments(&mut self, items: Vec<Appointment>) {
        self.appointments = items;
        self.recompute();
    }

    pub fn replace_medical_records(&mut self, items: Vec<MedicalRecord>) {
        self.medical_records = items;
        self.recompute();
    }

    pub fn replace_notifications(&mut self, items: Vec<Notification>) {
        self.notifications = items;
        self.recompute();
    }

    pub fn replace_tasks(&mut self, items: Vec<Task>) {
        self.tasks = items;
        self.recompute();
    }

    pub fn insert_appointment(&mut self, appointment: Appointment) {
        self.appointments.push(appointment);
        self.recompute();
    }

    pub fn insert_medical_record(&mut self, record: MedicalRecord) {
        self.medical_records.push(record);
        self.recompute();
    }

    pub fn insert_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
        self.recompute();
    }

    pub fn insert_task(&mut self, task: Task) {
        self.tasks.push(task);
        self.recompute();
    }

    /// Merge a partial update by id. An absent id leaves the collection
    /// untouched and raises nothing.
    pub fn update_appointment(&mut self, id: i64, updates: &AppointmentUpdate) {
        if let Some(appointment) = self.appointments.iter_mut().find(|a| a.id == id) {
            updates.apply(appointment);
        }
        self.recompute();
    }

    /// Merge a partial update by id. An absent id leaves the collection
    /// untouched and raises nothing.
    pub fn update_task(&mut self, id: i64, updates: &TaskUpdate) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            updates.apply(task);
        }
        self.recompute();
    }

    /// Flips is_read forward only; nothing un-reads a notification.
    pub fn mark_notification_read(&mut self, id: i64) {
        if let Some(notification) = self.notifications.iter_mut().find(|n| n.id == id) {
            notification.is_read = true;
        }
        self.recompute();
    }

    // Full pass over each collection; fine at portal scale.
    fn recompute(&mut self) {
        let today = today();
        self.stats = DashboardStats {
            total_appointments: self.appointments.len(),
            pending_appointments: self
                .appointments
                .iter()
                .filter(|a| a.status == AppointmentStatus::Pending)
                .count(),
            completed_appointments: self
                .appointments
                .iter()
                .filter(|a| a.status == AppointmentStatus::Completed)
                .count(),
            unread_notifications: self.notifications.iter().filter(|n| !n.is_read).count(),
            tasks_due_today: self.tasks.iter().filter(|t| t.due_date == today).count(),
            completed_tasks: self
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count(),
        };
    }
}

/// Calendar date string task due dates are compared against.
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
