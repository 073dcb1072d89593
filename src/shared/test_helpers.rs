#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
#[cfg(test)]
use fake::{
    faker::{address::en::CityName, lorem::en::Sentence, name::en::Name},
    Fake,
};
#[cfg(test)]
use serde_json::{json, Map, Value};

#[cfg(test)]
use crate::features::auth::model::UserSession;
#[cfg(test)]
use crate::features::reports::models::{Report, ReportRecord};

#[cfg(test)]
const WEATHER: &[&str] = &["Heavy rain", "Drizzle", "Overcast", "Thunderstorm"];

#[cfg(test)]
pub fn fake_report(id: &str) -> Report {
    let weather = WEATHER[(0..WEATHER.len()).fake::<usize>()];
    Report::new(
        id,
        ReportRecord {
            title: Sentence(2..5).fake(),
            description: Sentence(6..12).fake(),
            location: CityName().fake(),
            height: (0.0f64..4.0).fake::<f64>(),
            weather: weather.to_string(),
            author: Name().fake(),
            uid: format!("uid-{}", (1u32..1000).fake::<u32>()),
            image: Some(format!("/uploads/{}.jpg", id)),
            created_at: None,
        },
    )
}

#[cfg(test)]
pub fn fake_reports(count: usize) -> Vec<Report> {
    (0..count).map(|i| fake_report(&format!("r{}", i))).collect()
}

#[cfg(test)]
pub fn test_session() -> UserSession {
    UserSession {
        uid: "test-uid".to_string(),
        email: "ani@example.com".to_string(),
        display_name: "Ani".to_string(),
    }
}

/// Multipart write received by the mock service
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub id: Option<String>,
    pub report_data: Value,
    pub image_name: Option<String>,
    pub image_type: Option<String>,
    pub image_len: usize,
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockReportState {
    /// Stored reports in insertion order, keyed by id
    pub reports: Map<String, Value>,
    /// When set, every route answers with this status
    pub fail_with: Option<u16>,
    pub uploads: Vec<ReceivedUpload>,
    pub deleted: Vec<String>,
    pub logins: Vec<Value>,
    pub registrations: Vec<Value>,
    pub request_ids: Vec<String>,
    next_id: u64,
}

/// In-process stand-in for the remote report service
#[cfg(test)]
pub struct MockReportService {
    pub base_url: String,
    pub state: Arc<Mutex<MockReportState>>,
}

#[cfg(test)]
type SharedMockState = Arc<Mutex<MockReportState>>;

#[cfg(test)]
impl MockReportService {
    pub async fn start() -> Self {
        let state: SharedMockState = Arc::new(Mutex::new(MockReportState::default()));

        let app = Router::new()
            .route("/api/reports", get(list_reports).post(create_report))
            .route(
                "/api/reports/{id}",
                get(list_user_reports)
                    .put(update_report)
                    .delete(delete_report),
            )
            .route("/api/users/login", post(record_login))
            .route("/api/users/register", post(record_registration))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                record_request_id,
            ))
            .with_state(state.clone());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn seed(&self, id: &str, record: Value) {
        self.state
            .lock()
            .unwrap()
            .reports
            .insert(id.to_string(), record);
    }

    pub fn fail_with(&self, status: u16) {
        self.state.lock().unwrap().fail_with = Some(status);
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().fail_with = None;
    }

    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn stored(&self, id: &str) -> Option<Value> {
        self.state.lock().unwrap().reports.get(id).cloned()
    }
}

#[cfg(test)]
async fn record_request_id(
    State(state): State<SharedMockState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if let Some(id) = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
    {
        state.lock().unwrap().request_ids.push(id.to_string());
    }
    next.run(request).await
}

#[cfg(test)]
fn injected_failure(state: &SharedMockState) -> Option<Response> {
    state.lock().unwrap().fail_with.map(|code| {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "message": "Mock failure" }))).into_response()
    })
}

#[cfg(test)]
async fn list_reports(State(state): State<SharedMockState>) -> Response {
    if let Some(failure) = injected_failure(&state) {
        return failure;
    }
    let reports = state.lock().unwrap().reports.clone();
    if reports.is_empty() {
        return Json(Value::Null).into_response();
    }
    Json(Value::Object(reports)).into_response()
}

#[cfg(test)]
async fn list_user_reports(
    State(state): State<SharedMockState>,
    Path(uid): Path<String>,
) -> Response {
    if let Some(failure) = injected_failure(&state) {
        return failure;
    }
    let filtered: Map<String, Value> = state
        .lock()
        .unwrap()
        .reports
        .iter()
        .filter(|(_, v)| v["uid"] == uid)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Json(Value::Object(filtered)).into_response()
}

#[cfg(test)]
async fn read_upload(id: Option<String>, mut multipart: Multipart) -> ReceivedUpload {
    let mut upload = ReceivedUpload {
        id,
        report_data: Value::Null,
        image_name: None,
        image_type: None,
        image_len: 0,
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "reportData" => {
                let text = field.text().await.unwrap();
                upload.report_data = serde_json::from_str(&text).unwrap();
            }
            "image" => {
                upload.image_name = field.file_name().map(String::from);
                upload.image_type = field.content_type().map(String::from);
                upload.image_len = field.bytes().await.unwrap().len();
            }
            _ => {}
        }
    }
    upload
}

#[cfg(test)]
async fn create_report(State(state): State<SharedMockState>, multipart: Multipart) -> Response {
    if let Some(failure) = injected_failure(&state) {
        return failure;
    }
    let upload = read_upload(None, multipart).await;

    let mut guard = state.lock().unwrap();
    guard.next_id += 1;
    let id = format!("-Mock{}", guard.next_id);
    let image = upload.image_name.as_ref().map(|n| format!("/uploads/{}", n));
    let created_at = "2024-11-02T08:30:00.000Z";

    let mut record = upload.report_data.clone();
    if let Value::Object(ref mut fields) = record {
        fields.insert("image".to_string(), json!(image));
        fields.insert("createdAt".to_string(), json!(created_at));
    }
    guard.reports.insert(id.clone(), record);
    guard.uploads.push(upload);

    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "image": image, "createdAt": created_at })),
    )
        .into_response()
}

#[cfg(test)]
async fn update_report(
    State(state): State<SharedMockState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    if let Some(failure) = injected_failure(&state) {
        return failure;
    }
    let upload = read_upload(Some(id.clone()), multipart).await;

    let mut guard = state.lock().unwrap();
    let Some(existing) = guard.reports.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Report not found" })),
        )
            .into_response();
    };
    if let (Value::Object(target), Value::Object(fields)) = (existing, &upload.report_data) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
    guard.uploads.push(upload);

    Json(json!({ "message": "Report updated" })).into_response()
}

#[cfg(test)]
async fn delete_report(State(state): State<SharedMockState>, Path(id): Path<String>) -> Response {
    if let Some(failure) = injected_failure(&state) {
        return failure;
    }
    let mut guard = state.lock().unwrap();
    if guard.reports.shift_remove(&id).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Report not found" })),
        )
            .into_response();
    }
    guard.deleted.push(id);
    StatusCode::OK.into_response()
}

#[cfg(test)]
async fn record_login(State(state): State<SharedMockState>, Json(body): Json<Value>) -> Response {
    if let Some(failure) = injected_failure(&state) {
        return failure;
    }
    state.lock().unwrap().logins.push(body);
    Json(json!({ "message": "Login recorded" })).into_response()
}

#[cfg(test)]
async fn record_registration(
    State(state): State<SharedMockState>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = injected_failure(&state) {
        return failure;
    }
    state.lock().unwrap().registrations.push(body);
    (StatusCode::CREATED, Json(json!({ "message": "User registered" }))).into_response()
}
