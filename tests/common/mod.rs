//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::net::TcpListener;
use std::time::Duration;

use crossterm::event::KeyCode;
use student_marks_manager::{ApiConfig, App, RosterClient};

use mock_backend::MockBackend;

/// Find an available port for testing.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

pub fn client_for(base_url: &str) -> RosterClient {
    RosterClient::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    })
    .expect("client should build")
}

/// A view wired to `mock`, with the initial fetch already applied.
pub async fn loaded_app(mock: &MockBackend) -> App {
    let mut app = App::new(
        client_for(&mock.base_url()),
        tokio::runtime::Handle::current(),
    );
    app.start();
    next_event(&mut app).await;
    app
}

/// Wait for one remote result to be applied, failing the test after 5s.
pub async fn next_event(app: &mut App) {
    let applied = tokio::time::timeout(Duration::from_secs(5), app.next_remote_event())
        .await
        .expect("timed out waiting for backend response");
    assert!(applied, "remote event channel closed");
}

pub fn press(app: &mut App, code: KeyCode) {
    assert!(!app.handle_key(code), "key unexpectedly quit the app");
}

pub fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch));
    }
}
