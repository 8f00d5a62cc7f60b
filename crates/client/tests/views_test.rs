mod common;

use std::sync::atomic::Ordering;

use tandem_client::backend::Table;
use tandem_client::models::SessionStatus;
use tandem_client::views::{AdminDashboardModel, DashboardModel};

const ADMIN: &str = "admin-1";
const MENTEE: &str = "mentee-1";

#[tokio::test]
async fn dashboard_loads_every_section() {
    let api = common::api();
    api.backend()
        .seed(
            Table::Profiles,
            common::profile_row(MENTEE, "ana@example.com", "Ana Lima", "mentee"),
        )
        .await;
    api.backend()
        .seed(
            Table::MentorshipSessions,
            common::session_row("s1", MENTEE, ADMIN, "2024-05-03T10:00:00Z", 60, "scheduled"),
        )
        .await;
    api.backend()
        .seed(
            Table::Courses,
            serde_json::json!({ "id": "course-1", "title": "Foundations", "description": null }),
        )
        .await;
    api.backend()
        .seed(Table::Modules, common::module_row("mod-1", "course-1", 1))
        .await;
    api.backend()
        .seed(Table::Modules, common::module_row("mod-2", "course-1", 2))
        .await;
    api.backend()
        .seed(
            Table::UserModuleProgress,
            common::progress_row(MENTEE, "mod-1", true, Some("done")),
        )
        .await;

    let model = DashboardModel::load(&api, MENTEE, common::ts("2024-05-01T00:00:00Z")).await;

    assert_eq!(model.profile.as_ref().unwrap().full_name, "Ana Lima");
    assert_eq!(model.upcoming_sessions.len(), 1);
    assert_eq!(model.courses.len(), 1);
    assert_eq!(model.courses[0].percent, 50);
    assert!(model.notices.is_empty());
}

#[tokio::test]
async fn dashboard_sections_fail_soft() {
    let api = common::api();
    api.backend().fail_selects.store(true, Ordering::Relaxed);

    let mut model = DashboardModel::load(&api, MENTEE, common::ts("2024-05-01T00:00:00Z")).await;

    assert!(model.profile.is_none());
    assert!(model.upcoming_sessions.is_empty());
    assert!(model.courses.is_empty());
    assert!(!model.notices.is_empty());
    model.dismiss_notices();
    assert!(model.notices.is_empty());
}

#[tokio::test]
async fn admin_dashboard_manages_documents_per_mentee() {
    let api = common::api();
    api.backend()
        .seed(
            Table::Profiles,
            common::profile_row(MENTEE, "ana@example.com", "Ana Lima", "mentee"),
        )
        .await;
    api.backend()
        .seed(
            Table::Profiles,
            common::profile_row(ADMIN, "miguel@example.com", "Miguel Reyes", "admin"),
        )
        .await;

    let mut model = AdminDashboardModel::load(&api).await;
    assert_eq!(model.mentees.len(), 1);

    // Sharing without a selected mentee is a validation error
    let early = model
        .share_document(&api, ADMIN, "Reading list", "https://example.com/list")
        .await;
    assert!(early.is_err());

    model.select_mentee(&api, MENTEE).await;
    model
        .share_document(&api, ADMIN, "Reading list", "https://example.com/list")
        .await
        .unwrap();
    assert_eq!(model.documents.len(), 1);

    let id = model.documents[0].id.clone();
    model.remove_document(&api, &id).await.unwrap();
    assert!(model.documents.is_empty());
}

#[tokio::test]
async fn admin_session_mutations_update_the_local_book() {
    let api = common::api();
    api.backend()
        .seed(
            Table::MentorshipSessions,
            common::session_row("s1", MENTEE, ADMIN, "2024-05-03T10:00:00Z", 60, "scheduled"),
        )
        .await;
    api.backend()
        .seed(
            Table::MentorshipSessions,
            common::session_row("s2", MENTEE, ADMIN, "2024-05-10T10:00:00Z", 60, "scheduled"),
        )
        .await;

    let mut model = AdminDashboardModel::load(&api).await;
    assert_eq!(model.sessions.len(), 2);

    model.cancel_session(&api, "s1").await.unwrap();
    let s1 = model.sessions.iter().find(|s| s.id == "s1").unwrap();
    assert_eq!(s1.status, SessionStatus::Canceled);

    model
        .reschedule_session(&api, "s2", common::ts("2024-05-11T09:00:00Z"), 45)
        .await
        .unwrap();
    let s2 = model.sessions.iter().find(|s| s.id == "s2").unwrap();
    assert_eq!(s2.scheduled_at, common::ts("2024-05-11T09:00:00Z"));
    assert_eq!(s2.duration_minutes, 45);

    model.complete_session(&api, "s2", Some("good work")).await.unwrap();
    let s2 = model.sessions.iter().find(|s| s.id == "s2").unwrap();
    assert_eq!(s2.status, SessionStatus::Completed);
    assert_eq!(s2.notes.as_deref(), Some("good work"));
}
