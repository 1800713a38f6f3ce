//! End-to-end flows through the portal facade against a live server: every
//! mutation goes over HTTP and lands in the cache only once confirmed.

use actix_web::{web, App, HttpServer};

use medora::api::{self, AppState};
use medora::client::{cache, DashboardView, HttpBackend, Portal, PortalError, SessionStore};
use medora::models::{
    AppointmentStatus, AppointmentUpdate, NewAppointment, NewMedicalRecord, NewNotification,
    NewTask, NewUser, NotificationKind, Role, TaskPriority, TaskStatus, TaskUpdate,
};
use medora::storage::Storage;

async fn spawn_server(storage: Storage) -> String {
    let state = web::Data::new(AppState { storage });
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::configure)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}")
}

async fn seeded_server() -> String {
    let storage = Storage::open_in_memory().await.unwrap();
    storage.seed_demo_data().await.unwrap();
    spawn_server(storage).await
}

fn portal_at(base: &str, dir: &tempfile::TempDir) -> Portal<HttpBackend> {
    Portal::new(
        HttpBackend::new(base),
        SessionStore::new(dir.path().join("session.json")),
    )
}

#[actix_web::test]
async fn register_auto_logs_in_and_logout_revokes_the_patient_view() {
    let storage = Storage::open_in_memory().await.unwrap();
    let base = spawn_server(storage).await;
    let dir = tempfile::tempdir().unwrap();
    let mut portal = portal_at(&base, &dir);

    let registered = portal
        .register(NewUser {
            name: "Alice".into(),
            email: "a@b.com".into(),
            password: "pw".into(),
            role: Role::Patient,
            avatar: None,
            is_active: true,
        })
        .await
        .unwrap();
    assert!(registered);
    assert!(portal.is_authenticated());
    assert_eq!(portal.current_user().unwrap().role, Role::Patient);
    assert!(portal.authorize(DashboardView::Patient).is_ok());

    portal.logout();
    assert!(!portal.is_authenticated());
    assert!(matches!(
        portal.authorize(DashboardView::Patient),
        Err(PortalError::NotAuthenticated)
    ));
}

#[actix_web::test]
async fn login_outcomes_and_session_restore() {
    let base = seeded_server().await;
    let dir = tempfile::tempdir().unwrap();

    let mut portal = portal_at(&base, &dir);
    // wrong role for a known email
    assert!(!portal
        .login("patient@medora.com", "anything", Role::Doctor)
        .await
        .unwrap());
    assert!(!portal.is_authenticated());

    // any non-empty password passes for the matching role
    assert!(portal
        .login("patient@medora.com", "anything", Role::Patient)
        .await
        .unwrap());
    assert!(portal.is_authenticated());

    // a second portal over the same store restores the identity without
    // talking to the backend
    let restored = portal_at(&base, &dir);
    assert!(restored.is_authenticated());
    assert_eq!(restored.current_user().unwrap().email, "patient@medora.com");

    // empty password never reaches the network
    let mut fresh = portal_at(&base, &tempfile::tempdir().unwrap());
    assert!(matches!(
        fresh.login("patient@medora.com", "", Role::Patient).await,
        Err(PortalError::Validation(_))
    ));
}

#[actix_web::test]
async fn added_task_is_server_confirmed_and_counted() {
    let base = seeded_server().await;
    let dir = tempfile::tempdir().unwrap();
    let mut portal = portal_at(&base, &dir);

    assert!(portal
        .login("nurse@medora.com", "demo123", Role::Nurse)
        .await
        .unwrap());
    portal.refresh().await.unwrap();
    assert_eq!(portal.tasks().len(), 2);

    let nurse_id = portal.current_user().unwrap().id;
    let added = portal
        .add_task(NewTask {
            title: "Administer medication".into(),
            description: "Give prescribed medication to patient".into(),
            assigned_to: nurse_id,
            patient_id: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            due_date: cache::today(),
        })
        .await
        .unwrap();

    assert_eq!(portal.tasks().len(), 3);
    let held = portal.tasks().iter().find(|t| t.id == added.id).unwrap();
    assert_eq!(held.priority, TaskPriority::Medium);
    assert_eq!(held.status, TaskStatus::Pending);
    assert_eq!(held.due_date, cache::today());
    // the server-assigned id is unique in the collection
    assert_eq!(
        portal.tasks().iter().filter(|t| t.id == added.id).count(),
        1
    );
    assert_eq!(portal.stats().tasks_due_today, 1);

    portal
        .update_task(
            added.id,
            TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(portal.stats().completed_tasks, 1);
}

#[actix_web::test]
async fn appointment_update_touches_only_the_status_and_feeds_the_stats() {
    let base = seeded_server().await;
    let dir = tempfile::tempdir().unwrap();
    let mut portal = portal_at(&base, &dir);

    assert!(portal
        .login("doctor@medora.com", "demo123", Role::Doctor)
        .await
        .unwrap());
    portal.refresh().await.unwrap();
    assert_eq!(portal.stats().total_appointments, 2);
    assert_eq!(portal.stats().pending_appointments, 1);

    let pending = portal
        .appointments()
        .iter()
        .find(|a| a.status == AppointmentStatus::Pending)
        .cloned()
        .unwrap();

    portal
        .update_appointment(
            pending.id,
            AppointmentUpdate {
                status: Some(AppointmentStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let held = portal
        .appointments()
        .iter()
        .find(|a| a.id == pending.id)
        .unwrap();
    assert_eq!(held.status, AppointmentStatus::Approved);
    assert_eq!(held.date, pending.date);
    assert_eq!(held.time, pending.time);
    assert_eq!(held.notes, pending.notes);
    assert_eq!(portal.stats().pending_appointments, 0);

    // unknown id: nothing changes and nothing errors
    portal
        .update_appointment(
            9999,
            AppointmentUpdate {
                status: Some(AppointmentStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(portal.appointments().len(), 2);
}

#[actix_web::test]
async fn admin_refresh_sees_every_collection() {
    let base = seeded_server().await;
    let dir = tempfile::tempdir().unwrap();
    let mut portal = portal_at(&base, &dir);

    assert!(portal
        .login("admin@medora.com", "demo123", Role::SuperAdmin)
        .await
        .unwrap());
    assert!(portal.authorize(DashboardView::Admin).is_ok());

    portal.refresh().await.unwrap();
    assert_eq!(portal.appointments().len(), 2);
    assert_eq!(portal.medical_records().len(), 1);
    assert_eq!(portal.tasks().len(), 2);
    // no notifications are seeded for the admin account
    assert!(portal.notifications().is_empty());

    let doctor_id = portal.appointments()[0].doctor_id;
    let sent = portal
        .add_notification(NewNotification {
            user_id: doctor_id,
            title: "Policy Update".into(),
            message: "New visiting hours take effect Monday".into(),
            kind: NotificationKind::Info,
            is_read: false,
        })
        .await
        .unwrap();
    assert!(sent.id > 0);
    assert_eq!(portal.notifications().len(), 1);
}

#[actix_web::test]
async fn doctor_writes_flow_through_the_server_before_the_cache() {
    let base = seeded_server().await;
    let dir = tempfile::tempdir().unwrap();
    let mut portal = portal_at(&base, &dir);

    assert!(portal
        .login("doctor@medora.com", "demo123", Role::Doctor)
        .await
        .unwrap());
    portal.refresh().await.unwrap();

    let doctor_id = portal.current_user().unwrap().id;
    let patient_id = portal.appointments()[0].patient_id;

    let appointment = portal
        .add_appointment(NewAppointment {
            patient_id,
            doctor_id,
            date: "2024-08-01".into(),
            time: "9:30 AM".into(),
            status: AppointmentStatus::Pending,
            kind: "Consultation".into(),
            notes: None,
        })
        .await
        .unwrap();
    assert!(appointment.id > 0);
    assert_eq!(portal.stats().total_appointments, 3);

    let record = portal
        .add_medical_record(NewMedicalRecord {
            patient_id,
            doctor_id,
            diagnosis: "Migraine".into(),
            treatment: "Rest and hydration".into(),
            prescription: "Sumatriptan 50mg as needed".into(),
            notes: None,
            date: "2024-08-01".into(),
        })
        .await
        .unwrap();
    assert_eq!(portal.medical_records().len(), 2);

    // both writes are visible to a fresh session, not just this cache
    let mut second = portal_at(&base, &tempfile::tempdir().unwrap());
    assert!(second
        .login("doctor@medora.com", "demo123", Role::Doctor)
        .await
        .unwrap());
    second.refresh().await.unwrap();
    assert!(second.appointments().iter().any(|a| a.id == appointment.id));
    assert!(second.medical_records().iter().any(|r| r.id == record.id));
}

#[actix_web::test]
async fn notification_read_state_survives_a_refresh() {
    let base = seeded_server().await;
    let dir = tempfile::tempdir().unwrap();
    let mut portal = portal_at(&base, &dir);

    assert!(portal
        .login("patient@medora.com", "demo123", Role::Patient)
        .await
        .unwrap());
    portal.refresh().await.unwrap();
    assert_eq!(portal.stats().unread_notifications, 1);

    let id = portal.notifications()[0].id;
    portal.mark_notification_read(id).await.unwrap();
    assert_eq!(portal.stats().unread_notifications, 0);

    // the flip was written through, not just cached
    portal.refresh().await.unwrap();
    assert_eq!(portal.stats().unread_notifications, 0);
    assert!(portal.notifications()[0].is_read);
}

#[actix_web::test]
async fn duplicate_registration_reports_failure_without_an_identity() {
    let base = seeded_server().await;
    let dir = tempfile::tempdir().unwrap();
    let mut portal = portal_at(&base, &dir);

    let registered = portal
        .register(NewUser {
            name: "Second John".into(),
            email: "patient@medora.com".into(),
            password: "pw".into(),
            role: Role::Patient,
            avatar: None,
            is_active: true,
        })
        .await
        .unwrap();
    assert!(!registered);
    assert!(!portal.is_authenticated());
}
