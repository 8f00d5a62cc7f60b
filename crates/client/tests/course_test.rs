mod common;

use tandem_client::backend::Table;
use tandem_client::views::{CourseProgress, CourseViewerModel};

const USER: &str = "mentee-1";
const COURSE: &str = "course-1";

async fn seed_course(api: &tandem_client::api::Api<common::MemoryBackend>, modules: i64) {
    for n in 1..=modules {
        api.backend()
            .seed(
                Table::Modules,
                common::module_row(&format!("mod-{n}"), COURSE, n),
            )
            .await;
    }
}

#[tokio::test]
async fn first_module_is_unlocked_and_later_ones_are_gated() {
    let api = common::api();
    seed_course(&api, 3).await;

    let progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert!(progress.is_unlocked(0));
    assert!(!progress.is_unlocked(1));
    assert!(!progress.is_unlocked(2));
}

#[tokio::test]
async fn unlock_requires_completion_and_homework() {
    let api = common::api();
    seed_course(&api, 3).await;
    // Module 1 completed but no homework turned in
    api.backend()
        .seed(
            Table::UserModuleProgress,
            common::progress_row(USER, "mod-1", true, None),
        )
        .await;

    let progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert!(!progress.is_unlocked(1));

    // Homework alone is not enough either
    let api = common::api();
    seed_course(&api, 3).await;
    api.backend()
        .seed(
            Table::UserModuleProgress,
            common::progress_row(USER, "mod-1", false, Some("my essay")),
        )
        .await;
    let progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert!(!progress.is_unlocked(1));

    // Both together unlock the next module, and only the next
    let api = common::api();
    seed_course(&api, 3).await;
    api.backend()
        .seed(
            Table::UserModuleProgress,
            common::progress_row(USER, "mod-1", true, Some("my essay")),
        )
        .await;
    let progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert!(progress.is_unlocked(1));
    assert!(!progress.is_unlocked(2));
}

#[tokio::test]
async fn whitespace_homework_does_not_satisfy_the_gate() {
    let api = common::api();
    seed_course(&api, 2).await;
    api.backend()
        .seed(
            Table::UserModuleProgress,
            common::progress_row(USER, "mod-1", true, Some("   ")),
        )
        .await;

    let progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert!(!progress.is_unlocked(1));
}

#[tokio::test]
async fn marking_incomplete_cascades_forward_but_keeps_homework() {
    let api = common::api();
    seed_course(&api, 4).await;
    for n in 1..=3 {
        api.backend()
            .seed(
                Table::UserModuleProgress,
                common::progress_row(USER, &format!("mod-{n}"), true, Some("done")),
            )
            .await;
    }

    let mut progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert!(progress.is_unlocked(3));

    progress.mark_incomplete(&api, 1).await.unwrap();

    assert!(progress.is_completed(0));
    assert!(!progress.is_completed(1));
    assert!(!progress.is_completed(2));
    assert!(!progress.is_unlocked(2));
    // Homework submissions survive the cascade
    assert_eq!(progress.homework(1), Some("done"));
    assert_eq!(progress.homework(2), Some("done"));
}

#[tokio::test]
async fn locked_modules_reject_completion_and_homework() {
    let api = common::api();
    seed_course(&api, 3).await;

    let mut progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert!(progress.mark_complete(&api, 2).await.is_err());
    assert!(progress.submit_homework(&api, 2, "early").await.is_err());

    // Working through module 0 unlocks module 1
    progress.submit_homework(&api, 0, "first essay").await.unwrap();
    progress.mark_complete(&api, 0).await.unwrap();
    assert!(progress.is_unlocked(1));
    progress.mark_complete(&api, 1).await.unwrap();
    assert!(progress.is_completed(1));
}

#[tokio::test]
async fn percent_is_rounded_to_the_nearest_integer() {
    let api = common::api();
    seed_course(&api, 3).await;
    api.backend()
        .seed(
            Table::UserModuleProgress,
            common::progress_row(USER, "mod-1", true, Some("done")),
        )
        .await;

    let progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert_eq!(progress.percent(), 33);

    api.backend()
        .seed(
            Table::UserModuleProgress,
            common::progress_row(USER, "mod-2", true, Some("done")),
        )
        .await;
    let progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert_eq!(progress.percent(), 67);
}

#[tokio::test]
async fn empty_course_reports_zero_percent() {
    let api = common::api();
    let progress = CourseProgress::load(&api, USER, COURSE).await.unwrap();
    assert_eq!(progress.percent(), 0);
}

#[tokio::test]
async fn viewer_model_degrades_to_a_notice_on_load_failure() {
    let api = common::api();
    api.backend()
        .fail_selects
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let model = CourseViewerModel::load(&api, USER, COURSE).await;
    assert!(model.progress.is_none());
    assert!(model.notice.is_some());
}
