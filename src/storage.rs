//! Persistence gateway for the Medora portal.
//!
//! One operation per entity per access pattern over the relational store.
//! Reads are equality-filtered only; no operation spans more than one
//! entity, and nothing cascades on delete (there are no deletes).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{info, instrument};

use crate::models::{
    Appointment, AppointmentStatus, AppointmentUpdate, MedicalRecord, NewAppointment,
    NewMedicalRecord, NewNotification, NewTask, NewUser, Notification, NotificationKind,
    ParseError, Role, Task, TaskPriority, TaskStatus, TaskUpdate, User,
};

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(url).await?;
        Self::initialize_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Single-connection in-memory store. SQLite gives every connection its
    /// own `:memory:` database, so the pool is capped at one.
    pub async fn open_in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::initialize_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                role TEXT NOT NULL,
                avatar TEXT,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL,
                doctor_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                status TEXT NOT NULL,
                type TEXT NOT NULL,
                notes TEXT,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES users(id),
                FOREIGN KEY (doctor_id) REFERENCES users(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS medical_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL,
                doctor_id INTEGER NOT NULL,
                diagnosis TEXT NOT NULL,
                treatment TEXT NOT NULL,
                prescription TEXT NOT NULL,
                notes TEXT,
                date TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES users(id),
                FOREIGN KEY (doctor_id) REFERENCES users(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS notifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                type TEXT NOT NULL,
                is_read BOOLEAN NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                assigned_to INTEGER NOT NULL,
                patient_id INTEGER,
                priority TEXT NOT NULL,
                status TEXT NOT NULL,
                due_date TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (assigned_to) REFERENCES users(id),
                FOREIGN KEY (patient_id) REFERENCES users(id)
            )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    // ===== Users =====

    pub async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, user), fields(email = %user.email, role = user.role.as_str()))]
    pub async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let (secs, created_at) = stamp_now();
        let result = sqlx::query(
            "INSERT INTO users (name, email, password, role, avatar, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(&user.avatar)
        .bind(user.is_active)
        .bind(secs)
        .execute(&self.pool)
        .await?;

        info!("user created: {}", user.email);
        Ok(User {
            id: result.last_insert_rowid(),
            name: user.name,
            email: user.email,
            password: user.password,
            role: user.role,
            avatar: user.avatar,
            is_active: user.is_active,
            created_at,
        })
    }

    // ===== Appointments =====

    pub async fn appointments(&self) -> Result<Vec<Appointment>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM appointments")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(appointment_from_row).collect()
    }

    /// Appointments where the user appears on either side of the visit.
    pub async fn appointments_for_user(&self, user_id: i64) -> Result<Vec<Appointment>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM appointments WHERE patient_id = ? OR doctor_id = ?")
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(appointment_from_row).collect()
    }

    #[instrument(skip(self, appointment), fields(patient_id = appointment.patient_id, doctor_id = appointment.doctor_id))]
    pub async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, sqlx::Error> {
        let (secs, created_at) = stamp_now();
        let result = sqlx::query(
            "INSERT INTO appointments (patient_id, doctor_id, date, time, status, type, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(appointment.patient_id)
        .bind(appointment.doctor_id)
        .bind(&appointment.date)
        .bind(&appointment.time)
        .bind(appointment.status.as_str())
        .bind(&appointment.kind)
        .bind(&appointment.notes)
        .bind(secs)
        .execute(&self.pool)
        .await?;

        Ok(Appointment {
            id: result.last_insert_rowid(),
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            date: appointment.date,
            time: appointment.time,
            status: appointment.status,
            kind: appointment.kind,
            notes: appointment.notes,
            created_at,
        })
    }

    /// Merge the given fields into the row; returns None when the id does
    /// not exist.
    #[instrument(skip(self, updates))]
    pub async fn update_appointment(
        &self,
        id: i64,
        updates: &AppointmentUpdate,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let mut appointment = match row {
            Some(row) => appointment_from_row(&row)?,
            None => return Ok(None),
        };
        updates.apply(&mut appointment);

        sqlx::query(
            "UPDATE appointments SET date = ?, time = ?, status = ?, type = ?, notes = ? WHERE id = ?",
        )
        .bind(&appointment.date)
        .bind(&appointment.time)
        .bind(appointment.status.as_str())
        .bind(&appointment.kind)
        .bind(&appointment.notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(appointment))
    }

    // ===== Medical records =====

    pub async fn medical_records(&self) -> Result<Vec<MedicalRecord>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM medical_records")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(record_from_row).collect()
    }

    pub async fn medical_records_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<MedicalRecord>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM medical_records WHERE patient_id = ?")
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(record_from_row).collect()
    }

    #[instrument(skip(self, record), fields(patient_id = record.patient_id))]
    pub async fn create_medical_record(
        &self,
        record: NewMedicalRecord,
    ) -> Result<MedicalRecord, sqlx::Error> {
        let (secs, created_at) = stamp_now();
        let result = sqlx::query(
            "INSERT INTO medical_records (patient_id, doctor_id, diagnosis, treatment, prescription, notes, date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.patient_id)
        .bind(record.doctor_id)
        .bind(&record.diagnosis)
        .bind(&record.treatment)
        .bind(&record.prescription)
        .bind(&record.notes)
        .bind(&record.date)
        .bind(secs)
        .execute(&self.pool)
        .await?;

        Ok(MedicalRecord {
            id: result.last_insert_rowid(),
            patient_id: record.patient_id,
            doctor_id: record.doctor_id,
            diagnosis: record.diagnosis,
            treatment: record.treatment,
            prescription: record.prescription,
            notes: record.notes,
            date: record.date,
            created_at,
        })
    }

    // ===== Notifications =====

    pub async fn notifications_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM notifications WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(notification_from_row).collect()
    }

    pub async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        let (secs, created_at) = stamp_now();
        let result = sqlx::query(
            "INSERT INTO notifications (user_id, title, message, type, is_read, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(notification.is_read)
        .bind(secs)
        .execute(&self.pool)
        .await?;

        Ok(Notification {
            id: result.last_insert_rowid(),
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            is_read: notification.is_read,
            created_at,
        })
    }

    /// Flips is_read to true. A no-op for ids that do not exist.
    pub async fn mark_notification_read(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ===== Tasks =====

    pub async fn tasks(&self) -> Result<Vec<Task>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM tasks").fetch_all(&self.pool).await?;
        rows.iter().map(task_from_row).collect()
    }

    pub async fn tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM tasks WHERE assigned_to = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(task_from_row).collect()
    }

    #[instrument(skip(self, task), fields(assigned_to = task.assigned_to))]
    pub async fn create_task(&self, task: NewTask) -> Result<Task, sqlx::Error> {
        let (secs, created_at) = stamp_now();
        let result = sqlx::query(
            "INSERT INTO tasks (title, description, assigned_to, patient_id, priority, status, due_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assigned_to)
        .bind(task.patient_id)
        .bind(task.priority.as_str())
        .bind(task.status.as_str())
        .bind(&task.due_date)
        .bind(secs)
        .execute(&self.pool)
        .await?;

        Ok(Task {
            id: result.last_insert_rowid(),
            title: task.title,
            description: task.description,
            assigned_to: task.assigned_to,
            patient_id: task.patient_id,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            created_at,
        })
    }

    /// Merge the given fields into the row; returns None when the id does
    /// not exist.
    #[instrument(skip(self, updates))]
    pub async fn update_task(
        &self,
        id: i64,
        updates: &TaskUpdate,
    ) -> Result<Option<Task>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let mut task = match row {
            Some(row) => task_from_row(&row)?,
            None => return Ok(None),
        };
        updates.apply(&mut task);

        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, assigned_to = ?, patient_id = ?, priority = ?, status = ?, due_date = ? WHERE id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assigned_to)
        .bind(task.patient_id)
        .bind(task.priority.as_str())
        .bind(task.status.as_str())
        .bind(&task.due_date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(task))
    }

    // ===== Demo data =====

    /// Seed the demo accounts and sample rows. Skipped when any user
    /// already exists, so it is safe to run repeatedly.
    pub async fn seed_demo_data(&self) -> Result<(), sqlx::Error> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await?
            .try_get("n")?;
        if count > 0 {
            info!("database already seeded");
            return Ok(());
        }

        self.create_user(NewUser {
            name: "Admin User".into(),
            email: "admin@medora.com".into(),
            password: "demo123".into(),
            role: Role::SuperAdmin,
            avatar: None,
            is_active: true,
        })
        .await?;
        let doctor = self
            .create_user(NewUser {
                name: "Dr. Sarah Johnson".into(),
                email: "doctor@medora.com".into(),
                password: "demo123".into(),
                role: Role::Doctor,
                avatar: None,
                is_active: true,
            })
            .await?;
        let nurse = self
            .create_user(NewUser {
                name: "Nurse Mary Smith".into(),
                email: "nurse@medora.com".into(),
                password: "demo123".into(),
                role: Role::Nurse,
                avatar: None,
                is_active: true,
            })
            .await?;
        let patient = self
            .create_user(NewUser {
                name: "John Doe".into(),
                email: "patient@medora.com".into(),
                password: "demo123".into(),
                role: Role::Patient,
                avatar: None,
                is_active: true,
            })
            .await?;

        self.create_appointment(NewAppointment {
            patient_id: patient.id,
            doctor_id: doctor.id,
            date: "2024-06-15".into(),
            time: "10:00 AM".into(),
            status: AppointmentStatus::Pending,
            kind: "General Checkup".into(),
            notes: Some("Routine health checkup".into()),
        })
        .await?;
        self.create_appointment(NewAppointment {
            patient_id: patient.id,
            doctor_id: doctor.id,
            date: "2024-06-20".into(),
            time: "2:00 PM".into(),
            status: AppointmentStatus::Approved,
            kind: "Follow-up".into(),
            notes: Some("Follow-up appointment for test results".into()),
        })
        .await?;

        self.create_medical_record(NewMedicalRecord {
            patient_id: patient.id,
            doctor_id: doctor.id,
            diagnosis: "Hypertension".into(),
            treatment: "Lifestyle changes and medication".into(),
            prescription: "Lisinopril 10mg daily".into(),
            notes: Some("Patient responded well to treatment".into()),
            date: "2024-06-10".into(),
        })
        .await?;

        self.create_notification(NewNotification {
            user_id: patient.id,
            title: "Appointment Reminder".into(),
            message: "You have an upcoming appointment on June 15th at 10:00 AM".into(),
            kind: NotificationKind::Info,
            is_read: false,
        })
        .await?;
        self.create_notification(NewNotification {
            user_id: doctor.id,
            title: "New Appointment Request".into(),
            message: "Patient John Doe has requested an appointment".into(),
            kind: NotificationKind::Info,
            is_read: false,
        })
        .await?;

        self.create_task(NewTask {
            title: "Review Patient Charts".into(),
            description: "Review and update patient charts for morning appointments".into(),
            assigned_to: nurse.id,
            patient_id: Some(patient.id),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            due_date: "2024-06-15".into(),
        })
        .await?;
        self.create_task(NewTask {
            title: "Prepare Examination Room".into(),
            description: "Prepare room 5 for Dr. Johnson's 10 AM appointment".into(),
            assigned_to: nurse.id,
            patient_id: None,
            priority: TaskPriority::High,
            status: TaskStatus::InProgress,
            due_date: "2024-06-15".into(),
        })
        .await?;

        info!("database seeding completed");
        Ok(())
    }
}

// ===== Row mapping =====

fn stamp_now() -> (i64, DateTime<Utc>) {
    let now = Utc::now();
    let secs = now.timestamp();
    (secs, DateTime::from_timestamp(secs, 0).unwrap_or(now))
}

fn decode_timestamp(row: &SqliteRow, column: &'static str) -> Result<DateTime<Utc>, sqlx::Error> {
    let secs: i64 = row.try_get(column)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(ParseError::new(column, &secs.to_string())),
    })
}

fn decode_enum<T>(row: &SqliteRow, column: &'static str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseError>,
{
    let text: String = row.try_get(column)?;
    text.parse().map_err(|err: ParseError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        role: decode_enum(row, "role")?,
        avatar: row.try_get("avatar")?,
        is_active: row.try_get("is_active")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

fn appointment_from_row(row: &SqliteRow) -> Result<Appointment, sqlx::Error> {
    Ok(Appointment {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        date: row.try_get("date")?,
        time: row.try_get("time")?,
        status: decode_enum(row, "status")?,
        kind: row.try_get("type")?,
        notes: row.try_get("notes")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

fn record_from_row(row: &SqliteRow) -> Result<MedicalRecord, sqlx::Error> {
    Ok(MedicalRecord {
        id: row.try_get("id")?,
        patient_id: row.try_get("patient_id")?,
        doctor_id: row.try_get("doctor_id")?,
        diagnosis: row.try_get("diagnosis")?,
        treatment: row.try_get("treatment")?,
        prescription: row.try_get("prescription")?,
        notes: row.try_get("notes")?,
        date: row.try_get("date")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

fn notification_from_row(row: &SqliteRow) -> Result<Notification, sqlx::Error> {
    Ok(Notification {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        kind: decode_enum(row, "type")?,
        is_read: row.try_get("is_read")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

fn task_from_row(row: &SqliteRow) -> Result<Task, sqlx::Error> {
    Ok(Task {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        assigned_to: row.try_get("assigned_to")?,
        patient_id: row.try_get("patient_id")?,
        priority: decode_enum(row, "priority")?,
        status: decode_enum(row, "status")?,
        due_date: row.try_get("due_date")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> Storage {
        let storage = Storage::open_in_memory().await.unwrap();
        storage.seed_demo_data().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn user_lookup_by_email_and_id() {
        let storage = seeded().await;
        let doctor = storage
            .get_user_by_email("doctor@medora.com")
            .await
            .unwrap()
            .expect("seeded doctor");
        assert_eq!(doctor.role, Role::Doctor);
        assert_eq!(doctor.name, "Dr. Sarah Johnson");

        let by_id = storage.get_user(doctor.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, doctor.email);
        assert!(storage.get_user_by_email("nobody@medora.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_schema() {
        let storage = seeded().await;
        let err = storage
            .create_user(NewUser {
                name: "Imposter".into(),
                email: "doctor@medora.com".into(),
                password: "x".into(),
                role: Role::Doctor,
                avatar: None,
                is_active: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, sqlx::Error::Database(_)));
    }

    #[tokio::test]
    async fn appointments_for_user_covers_both_sides_of_the_visit() {
        let storage = seeded().await;
        let doctor = storage.get_user_by_email("doctor@medora.com").await.unwrap().unwrap();
        let patient = storage.get_user_by_email("patient@medora.com").await.unwrap().unwrap();
        let nurse = storage.get_user_by_email("nurse@medora.com").await.unwrap().unwrap();

        assert_eq!(storage.appointments_for_user(doctor.id).await.unwrap().len(), 2);
        assert_eq!(storage.appointments_for_user(patient.id).await.unwrap().len(), 2);
        assert!(storage.appointments_for_user(nurse.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_appointment_merges_only_given_fields() {
        let storage = seeded().await;
        let pending = storage
            .appointments()
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.status == AppointmentStatus::Pending)
            .unwrap();

        let updated = storage
            .update_appointment(
                pending.id,
                &AppointmentUpdate {
                    status: Some(AppointmentStatus::Approved),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, AppointmentStatus::Approved);
        assert_eq!(updated.date, pending.date);
        assert_eq!(updated.time, pending.time);
        assert_eq!(updated.notes, pending.notes);

        // absent id: no row touched, no error
        assert!(storage
            .update_appointment(9999, &AppointmentUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn mark_notification_read_flips_forward_only() {
        let storage = seeded().await;
        let patient = storage.get_user_by_email("patient@medora.com").await.unwrap().unwrap();
        let unread = storage.notifications_for_user(patient.id).await.unwrap();
        assert!(unread.iter().all(|n| !n.is_read));

        storage.mark_notification_read(unread[0].id).await.unwrap();
        storage.mark_notification_read(unread[0].id).await.unwrap();

        let after = storage.notifications_for_user(patient.id).await.unwrap();
        assert!(after.iter().find(|n| n.id == unread[0].id).unwrap().is_read);
    }

    #[tokio::test]
    async fn task_create_and_partial_update() {
        let storage = seeded().await;
        let nurse = storage.get_user_by_email("nurse@medora.com").await.unwrap().unwrap();

        let task = storage
            .create_task(NewTask {
                title: "Check vitals for Room 201".into(),
                description: "Monitor blood pressure and heart rate".into(),
                assigned_to: nurse.id,
                patient_id: None,
                priority: TaskPriority::High,
                status: TaskStatus::Pending,
                due_date: "2024-12-25".into(),
            })
            .await
            .unwrap();

        let updated = storage
            .update_task(
                task.id,
                &TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, task.title);
        assert_eq!(updated.due_date, task.due_date);
    }

    #[tokio::test]
    async fn seeding_twice_does_not_duplicate() {
        let storage = seeded().await;
        storage.seed_demo_data().await.unwrap();
        assert_eq!(storage.appointments().await.unwrap().len(), 2);
        assert_eq!(storage.tasks().await.unwrap().len(), 2);
    }
}
