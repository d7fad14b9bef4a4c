//! The roster view driven through key presses against the in-process backend.

mod common;

use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use student_marks_manager::{App, Student, StudentDraft};

use common::mock_backend::MockBackend;
use common::{client_for, free_port, loaded_app, next_event, press, type_text};

fn scenario() -> Vec<Student> {
    vec![
        Student::new("A", "Ann").with_marks(vec![80, 90]),
        Student::new("B", "Ben"),
    ]
}

fn screen_text(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

#[tokio::test]
async fn initial_fetch_seeds_the_roster() {
    let mock = MockBackend::with_students(scenario()).await;
    let app = loaded_app(&mock).await;

    assert_eq!(app.roster().students(), scenario().as_slice());
    assert_eq!(mock.requests_with_method("GET").await, 1);
}

#[tokio::test]
async fn start_fetches_only_once() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    app.start();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.drain_remote_events(), 0);
    assert_eq!(mock.requests_with_method("GET").await, 1);
}

#[tokio::test]
async fn failed_fetch_leaves_roster_empty() {
    let mut app = App::new(
        client_for(&format!("http://127.0.0.1:{}", free_port())),
        tokio::runtime::Handle::current(),
    );
    app.start();
    next_event(&mut app).await;

    assert!(app.roster().students().is_empty());
    assert!(app.alert_message().is_none());
}

#[tokio::test]
async fn summary_panel_shows_class_average_and_top_student() {
    let mock = MockBackend::with_students(scenario()).await;
    let app = loaded_app(&mock).await;

    let screen = screen_text(&app);
    assert!(screen.contains("Class Average: 85.00"), "{screen}");
    assert!(screen.contains("Top Student: Ann (Average: 85.00)"), "{screen}");
    assert!(screen.contains("80, 90"), "{screen}");
    assert!(screen.contains("0.00"), "{screen}");
}

#[tokio::test]
async fn adding_a_student_appends_and_resets_draft() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    press(&mut app, KeyCode::Char('+'));
    type_text(&mut app, "C");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Cat");
    press(&mut app, KeyCode::Enter);
    next_event(&mut app).await;

    let ids: Vec<_> = app
        .roster()
        .students()
        .iter()
        .map(|s| s.student_id.as_str())
        .collect();
    assert_eq!(ids, ["A", "B", "C"]);
    assert_eq!(app.roster().draft(), &StudentDraft::default());
    assert_eq!(app.status(), Some("Added Cat (C)."));
}

#[tokio::test]
async fn blank_fields_block_creation_without_a_request() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    press(&mut app, KeyCode::Char('+'));
    type_text(&mut app, "C");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.alert_message(), Some("Please fill in all fields."));
    assert!(screen_text(&app).contains("Please fill in all fields."));

    // Dismissing returns to the form with the draft intact.
    press(&mut app, KeyCode::Enter);
    assert!(app.alert_message().is_none());
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Cat");
    assert_eq!(app.roster().draft(), &StudentDraft::new("C", "Cat"));

    assert_eq!(mock.requests_with_method("POST").await, 0);
    assert_eq!(app.roster().students().len(), 2);
}

#[tokio::test]
async fn failed_creation_keeps_draft_and_roster() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;
    mock.set_failing(true);

    press(&mut app, KeyCode::Char('+'));
    type_text(&mut app, "C");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Cat");
    press(&mut app, KeyCode::Enter);
    next_event(&mut app).await;

    assert_eq!(app.roster().students(), scenario().as_slice());
    assert_eq!(app.roster().draft(), &StudentDraft::new("C", "Cat"));
    assert!(app.alert_message().is_none());
    assert_eq!(mock.requests_with_method("POST").await, 1);
}

#[tokio::test]
async fn updating_marks_replaces_only_the_selected_student() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    // Highlight Ben, select him and replace the (empty) draft.
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.roster().selected().map(|s| s.student_id.as_str()), Some("B"));
    type_text(&mut app, "60, 70");
    press(&mut app, KeyCode::Enter);
    next_event(&mut app).await;

    let students = app.roster().students();
    assert_eq!(students[0], scenario()[0]);
    assert_eq!(students[1].marks, vec![60, 70]);
    assert!(app.roster().selected().is_none());
    assert_eq!(app.roster().marks_draft(), "");
}

#[tokio::test]
async fn selecting_prefills_existing_marks() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.roster().marks_draft(), "80,90");

    press(&mut app, KeyCode::Backspace);
    type_text(&mut app, "5");
    press(&mut app, KeyCode::Enter);
    next_event(&mut app).await;

    assert_eq!(app.roster().students()[0].marks, vec![80, 95]);
}

#[tokio::test]
async fn update_without_selection_alerts_and_sends_nothing() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    press(&mut app, KeyCode::Char('u'));
    assert_eq!(app.alert_message(), Some("Please select a student."));
    press(&mut app, KeyCode::Esc);
    assert!(app.alert_message().is_none());
    assert_eq!(mock.requests_with_method("PUT").await, 0);
}

#[tokio::test]
async fn malformed_marks_are_rejected_before_sending() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    press(&mut app, KeyCode::Enter);
    type_text(&mut app, ",,");
    press(&mut app, KeyCode::Enter);

    assert!(app.alert_message().is_some());
    assert_eq!(mock.requests_with_method("PUT").await, 0);
    assert!(app.roster().selected().is_some());
}

#[tokio::test]
async fn failed_update_keeps_selection_and_draft() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;
    mock.set_failing(true);

    press(&mut app, KeyCode::Enter);
    type_text(&mut app, ",100");
    press(&mut app, KeyCode::Enter);
    next_event(&mut app).await;

    assert_eq!(app.roster().selected().map(|s| s.student_id.as_str()), Some("A"));
    assert_eq!(app.roster().marks_draft(), "80,90,100");
    assert_eq!(app.roster().students()[0].marks, vec![80, 90]);
}

#[tokio::test]
async fn concurrent_requests_reconcile_against_latest_state() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    press(&mut app, KeyCode::Enter);
    type_text(&mut app, ",100");
    press(&mut app, KeyCode::Enter);

    press(&mut app, KeyCode::Char('+'));
    type_text(&mut app, "C");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Cat");
    press(&mut app, KeyCode::Enter);

    next_event(&mut app).await;
    next_event(&mut app).await;

    let students = app.roster().students();
    assert_eq!(students.len(), 3);
    assert_eq!(students[0].marks, vec![80, 90, 100]);
    assert_eq!(students[2].student_id, "C");
    assert!(app.roster().selected().is_none());
}

#[tokio::test]
async fn marks_update_closes_editor_waiting_behind_an_alert() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    press(&mut app, KeyCode::Enter);
    type_text(&mut app, ",100");
    press(&mut app, KeyCode::Enter);

    // Reopen the editor and trip the malformed-marks notice before the
    // first update lands.
    press(&mut app, KeyCode::Char('u'));
    type_text(&mut app, ",,");
    press(&mut app, KeyCode::Enter);
    assert!(app.alert_message().is_some());

    next_event(&mut app).await;
    assert!(app.roster().selected().is_none());

    press(&mut app, KeyCode::Enter);
    assert!(app.alert_message().is_none());
    // Back on the table, so `q` quits instead of being typed into an editor.
    assert!(app.handle_key(KeyCode::Char('q')));
}

#[tokio::test]
async fn response_after_view_is_dropped_is_discarded() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    press(&mut app, KeyCode::Char('+'));
    type_text(&mut app, "C");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "Cat");
    press(&mut app, KeyCode::Enter);
    drop(app);

    tokio::time::timeout(Duration::from_secs(5), async {
        while mock.requests_with_method("POST").await == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("create request never reached the backend");
    // Let the spawned request finish and hit the closed channel.
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(mock.requests_with_method("POST").await, 1);
    assert_eq!(mock.students().await.len(), 3);
}

#[tokio::test]
async fn detail_popup_uses_console_summary_format() {
    let mock = MockBackend::with_students(scenario()).await;
    let mut app = loaded_app(&mock).await;

    press(&mut app, KeyCode::Char('v'));
    let screen = screen_text(&app);
    assert!(screen.contains("ID: A, Name: Ann, Average Marks: 85.00"), "{screen}");
    press(&mut app, KeyCode::Esc);
    assert!(!app.handle_key(KeyCode::Down));
}

#[tokio::test]
async fn q_quits() {
    let mock = MockBackend::start().await;
    let mut app = loaded_app(&mock).await;
    assert!(app.handle_key(KeyCode::Char('q')));
}
