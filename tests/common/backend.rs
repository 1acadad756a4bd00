use std::sync::Mutex;

use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::{json, Value};
use uuid::Uuid;

pub const TOKEN: &str = "stub-session-token";
pub const PASSWORD: &str = "password123";

/// A request as the stub saw it.
#[derive(Debug, Clone)]
pub struct Received {
    pub method: String,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
pub struct Inner {
    pub user: Value,
    pub routines: Vec<Value>,
    pub progress: Vec<Value>,
    pub clients: Vec<Value>,
    pub requests: Vec<Value>,
    pub videos: Vec<Value>,
    /// Urls `GET /api/videos` can find.
    pub catalogue: Vec<String>,
    pub fail_next: Option<u16>,
    pub received: Vec<Received>,
}

/// In-memory stand-in for the REST backend.
#[derive(Default)]
pub struct BackendState {
    inner: Mutex<Inner>,
}

impl BackendState {
    pub fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap();
        f(&mut inner)
    }

    /// The next authorized request answers with `status`.
    pub fn fail_next(&self, status: u16) {
        self.with(|inner| inner.fail_next = Some(status));
    }

    pub fn received(&self) -> Vec<Received> {
        self.with(|inner| inner.received.clone())
    }

    pub fn received_on(&self, method: &str, path: &str) -> Vec<Received> {
        self.received()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn insert_routine(&self, mut routine: Value) -> Value {
        assign_ids(&mut routine);
        self.with(|inner| inner.routines.push(routine.clone()));
        routine
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/login", web::post().to(login))
        .route("/api/verify", web::get().to(verify))
        .route("/api/routines", web::get().to(list_routines))
        .route("/api/routines", web::post().to(create_routine))
        .route("/api/routines/{id}", web::get().to(get_routine))
        .route("/api/routines/{id}", web::put().to(update_routine))
        .route("/api/routines/{id}", web::delete().to(delete_routine))
        .route("/api/exercises/{id}", web::put().to(update_exercise))
        .route("/api/videos", web::get().to(search_videos))
        .route("/api/videos", web::post().to(create_video))
        .route("/api/progress", web::get().to(list_progress))
        .route("/api/progress", web::post().to(add_progress))
        .route("/api/clients", web::get().to(list_clients))
        .route("/api/coaches/requests", web::get().to(list_requests))
        .route("/api/coaches/accept", web::post().to(accept_request))
        .route("/api/coaches/requests/{id}/reject", web::post().to(reject_request));
}

fn record(state: &BackendState, req: &HttpRequest, body: Option<&Value>) {
    state.with(|inner| {
        inner.received.push(Received {
            method: req.method().to_string(),
            path: req.path().to_string(),
            body: body.cloned().unwrap_or(Value::Null),
        })
    });
}

/// Records the request, then answers 401 without the stub token or with the
/// queued failure.
fn gate(state: &BackendState, req: &HttpRequest, body: Option<&Value>) -> Option<HttpResponse> {
    record(state, req, body);
    let expected = format!("Bearer {}", TOKEN);
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return Some(HttpResponse::Unauthorized().json(json!({ "message": "No token provided" })));
    }
    match state.with(|inner| inner.fail_next.take()) {
        Some(401) => Some(HttpResponse::Unauthorized().json(json!({ "message": "Token expired" }))),
        Some(status) => Some(
            HttpResponse::build(StatusCode::from_u16(status).unwrap())
                .json(json!({ "message": "Stub failure" })),
        ),
        None => None,
    }
}

fn ensure_id(value: &mut Value) {
    if value.get("_id").is_none() {
        value["_id"] = json!(Uuid::new_v4().to_string());
    }
}

fn assign_ids(routine: &mut Value) {
    ensure_id(routine);
    for day in routine["days"].as_array_mut().into_iter().flatten() {
        ensure_id(day);
        for exercise in day["exercises"].as_array_mut().into_iter().flatten() {
            ensure_id(exercise);
            for video in exercise["videos"].as_array_mut().into_iter().flatten() {
                ensure_id(video);
            }
        }
    }
}

fn not_found(what: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "message": format!("{} not found", what) }))
}

async fn login(
    state: web::Data<BackendState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    record(&state, &req, Some(&body.0));
    let user = state.with(|inner| inner.user.clone());
    if body["email"] != user["email"] || body["password"] != PASSWORD {
        return HttpResponse::BadRequest().json(json!({ "message": "Invalid credentials" }));
    }
    HttpResponse::Ok().json(json!({ "token": TOKEN, "user": user }))
}

async fn verify(state: web::Data<BackendState>, req: HttpRequest) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, None) {
        return denied;
    }
    HttpResponse::Ok().json(json!({ "user": state.with(|inner| inner.user.clone()) }))
}

async fn list_routines(state: web::Data<BackendState>, req: HttpRequest) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, None) {
        return denied;
    }
    HttpResponse::Ok().json(state.with(|inner| inner.routines.clone()))
}

async fn get_routine(
    state: web::Data<BackendState>,
    req: HttpRequest,
    id: web::Path<String>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, None) {
        return denied;
    }
    let found = state.with(|inner| inner.routines.iter().find(|r| r["_id"] == *id).cloned());
    match found {
        Some(routine) => HttpResponse::Ok().json(routine),
        None => not_found("Routine"),
    }
}

async fn create_routine(
    state: web::Data<BackendState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, Some(&body.0)) {
        return denied;
    }
    let mut routine = body.into_inner();
    routine["userId"] = state.with(|inner| inner.user["_id"].clone());
    HttpResponse::Created().json(state.insert_routine(routine))
}

async fn update_routine(
    state: web::Data<BackendState>,
    req: HttpRequest,
    id: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, Some(&body.0)) {
        return denied;
    }
    let mut routine = body["routineData"].clone();
    if !routine.is_object() {
        return HttpResponse::BadRequest().json(json!({ "message": "routineData is required" }));
    }
    assign_ids(&mut routine);
    state.with(|inner| match inner.routines.iter_mut().find(|r| r["_id"] == *id) {
        Some(stored) => {
            routine["userId"] = stored["userId"].clone();
            *stored = routine.clone();
            HttpResponse::Ok().json(routine)
        }
        None => not_found("Routine"),
    })
}

async fn delete_routine(
    state: web::Data<BackendState>,
    req: HttpRequest,
    id: web::Path<String>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, None) {
        return denied;
    }
    let removed = state.with(|inner| {
        let before = inner.routines.len();
        inner.routines.retain(|r| r["_id"] != *id);
        before != inner.routines.len()
    });
    if removed {
        HttpResponse::Ok().json(json!({ "message": "Routine deleted" }))
    } else {
        not_found("Routine")
    }
}

async fn update_exercise(
    state: web::Data<BackendState>,
    req: HttpRequest,
    id: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, Some(&body.0)) {
        return denied;
    }
    state.with(|inner| {
        let videos = inner.videos.clone();
        let exercise = inner
            .routines
            .iter_mut()
            .flat_map(|r| r["days"].as_array_mut().into_iter().flatten())
            .flat_map(|d| d["exercises"].as_array_mut().into_iter().flatten())
            .find(|e| e["_id"] == *id);
        let Some(exercise) = exercise else {
            return not_found("Exercise");
        };
        for (key, value) in body.as_object().into_iter().flatten() {
            if key == "videos" {
                let resolved: Vec<Value> = value
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter_map(|vid| videos.iter().find(|v| v["_id"] == *vid).cloned())
                    .collect();
                exercise["videos"] = json!(resolved);
            } else {
                exercise[key.as_str()] = value.clone();
            }
        }
        HttpResponse::Ok().json(exercise.clone())
    })
}

/// Every catalogued video whose url mentions the exercise name.
async fn search_videos(
    state: web::Data<BackendState>,
    req: HttpRequest,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, None) {
        return denied;
    }
    let name = query
        .get("exerciseName")
        .map(|n| n.to_lowercase().replace(' ', "-"))
        .unwrap_or_default();
    let found: Vec<Value> = state.with(|inner| {
        inner
            .catalogue
            .iter()
            .filter(|url| url.contains(&name))
            .enumerate()
            .map(|(i, url)| json!({ "url": url, "isCurrent": i == 0 }))
            .collect()
    });
    HttpResponse::Ok().json(found)
}

async fn create_video(
    state: web::Data<BackendState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, Some(&body.0)) {
        return denied;
    }
    let mut video = body.into_inner();
    ensure_id(&mut video);
    state.with(|inner| inner.videos.push(video.clone()));
    HttpResponse::Created().json(video)
}

async fn list_progress(state: web::Data<BackendState>, req: HttpRequest) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, None) {
        return denied;
    }
    HttpResponse::Ok().json(state.with(|inner| inner.progress.clone()))
}

async fn add_progress(
    state: web::Data<BackendState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, Some(&body.0)) {
        return denied;
    }
    let mut entry = body.into_inner();
    ensure_id(&mut entry);
    state.with(|inner| inner.progress.push(entry.clone()));
    HttpResponse::Created().json(entry)
}

async fn list_clients(state: web::Data<BackendState>, req: HttpRequest) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, None) {
        return denied;
    }
    HttpResponse::Ok().json(state.with(|inner| inner.clients.clone()))
}

async fn list_requests(state: web::Data<BackendState>, req: HttpRequest) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, None) {
        return denied;
    }
    HttpResponse::Ok().json(state.with(|inner| inner.requests.clone()))
}

async fn accept_request(
    state: web::Data<BackendState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, Some(&body.0)) {
        return denied;
    }
    let user_id = body["id"].clone();
    state.with(|inner| {
        let Some(index) = inner.requests.iter().position(|r| r["userId"]["_id"] == user_id) else {
            return not_found("Request");
        };
        let request = inner.requests.remove(index);
        let mut client = request["userId"].clone();
        client["coachId"] = inner.user["_id"].clone();
        inner.clients.push(client.clone());
        HttpResponse::Ok().json(client)
    })
}

async fn reject_request(
    state: web::Data<BackendState>,
    req: HttpRequest,
    user_id: web::Path<String>,
) -> HttpResponse {
    if let Some(denied) = gate(&state, &req, None) {
        return denied;
    }
    state.with(|inner| {
        let Some(index) = inner.requests.iter().position(|r| r["userId"]["_id"] == *user_id) else {
            return not_found("Request");
        };
        let mut request = inner.requests.remove(index);
        request["status"] = json!("rejected");
        HttpResponse::Ok().json(request)
    })
}
