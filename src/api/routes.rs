use actix_web::web;

use super::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Authentication
            .route("/auth/login", web::post().to(handlers::login))
            .route("/auth/register", web::post().to(handlers::register))
            // Appointments
            .route("/appointments", web::get().to(handlers::appointments))
            .route("/appointments", web::post().to(handlers::create_appointment))
            .route(
                "/appointments/user/{user_id}",
                web::get().to(handlers::appointments_for_user),
            )
            .route("/appointments/{id}", web::patch().to(handlers::update_appointment))
            // Medical records
            .route("/medical-records", web::get().to(handlers::medical_records))
            .route("/medical-records", web::post().to(handlers::create_medical_record))
            .route(
                "/medical-records/patient/{patient_id}",
                web::get().to(handlers::medical_records_for_patient),
            )
            // Notifications
            .route("/notifications", web::post().to(handlers::create_notification))
            .route(
                "/notifications/{user_id}",
                web::get().to(handlers::notifications_for_user),
            )
            .route(
                "/notifications/{id}/read",
                web::post().to(handlers::mark_notification_read),
            )
            // Tasks
            .route("/tasks", web::get().to(handlers::tasks))
            .route("/tasks", web::post().to(handlers::create_task))
            .route("/tasks/user/{user_id}", web::get().to(handlers::tasks_for_user))
            .route("/tasks/{id}", web::patch().to(handlers::update_task)),
    );
}
