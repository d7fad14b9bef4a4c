//! In-process roster backend for exercising the client and the view.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::Value;
use student_marks_manager::models::MarksPayload;
use student_marks_manager::{Student, StudentDraft};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// A captured request for assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct MockState {
    students: Arc<Mutex<Vec<Student>>>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    failing: Arc<AtomicBool>,
}

impl MockState {
    async fn record(&self, method: &'static str, path: String, body: Option<Value>) {
        self.requests
            .lock()
            .await
            .push(CapturedRequest { method, path, body });
    }

    fn failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

/// Backend implementing list / create / update-marks over an in-memory list.
pub struct MockBackend {
    pub addr: SocketAddr,
    state: MockState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self::with_students(Vec::new()).await
    }

    pub async fn with_students(students: Vec<Student>) -> Self {
        let state = MockState::default();
        *state.students.lock().await = students;

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/api/students", get(list_students).post(create_student))
            .route("/api/students/{student_id}/marks", put(update_marks))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every subsequent request answers 500.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().await.clone()
    }

    pub async fn requests_with_method(&self, method: &str) -> usize {
        self.requests()
            .await
            .iter()
            .filter(|request| request.method == method)
            .count()
    }

    pub async fn students(&self) -> Vec<Student> {
        self.state.students.lock().await.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

fn failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "backend unavailable").into_response()
}

async fn list_students(State(state): State<MockState>) -> Response {
    state.record("GET", "/api/students".to_string(), None).await;
    if state.failing() {
        return failure();
    }
    Json(state.students.lock().await.clone()).into_response()
}

async fn create_student(
    State(state): State<MockState>,
    Json(draft): Json<StudentDraft>,
) -> Response {
    state
        .record(
            "POST",
            "/api/students".to_string(),
            serde_json::to_value(&draft).ok(),
        )
        .await;
    if state.failing() {
        return failure();
    }

    let mut students = state.students.lock().await;
    if students.iter().any(|s| s.student_id == draft.student_id) {
        return (StatusCode::CONFLICT, "student already exists").into_response();
    }
    let student = Student::new(draft.student_id, draft.name);
    students.push(student.clone());
    (StatusCode::CREATED, Json(student)).into_response()
}

async fn update_marks(
    State(state): State<MockState>,
    Path(student_id): Path<String>,
    Json(payload): Json<MarksPayload>,
) -> Response {
    state
        .record(
            "PUT",
            format!("/api/students/{student_id}/marks"),
            serde_json::to_value(&payload).ok(),
        )
        .await;
    if state.failing() {
        return failure();
    }

    let mut students = state.students.lock().await;
    match students.iter_mut().find(|s| s.student_id == student_id) {
        Some(student) => {
            student.marks = payload.marks;
            Json(student.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "student not found").into_response(),
    }
}
