use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::json;

use super::{UpstreamClient, UpstreamConfig};

/// Knobs and counters of the fake upstream
#[derive(Default)]
pub struct UpstreamState {
    pub token_requests: AtomicUsize,
    pub data_requests: AtomicUsize,
    pub expires_in: AtomicI64,
    /// Number of upcoming data requests answered with 401
    pub reject_with_401: AtomicUsize,
    pub omit_access_token: AtomicBool,
    pub last_authorization: Mutex<Option<String>>,
    /// Path and query of the last data request
    pub last_request: Mutex<Option<String>>,
}

/// Local actix server standing in for the upstream API and its token endpoint
pub struct MockUpstream {
    pub state: Arc<UpstreamState>,
    pub base_url: String,
    pub auth_url: String,
    handle: ServerHandle,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(UpstreamState {
            expires_in: AtomicI64::new(3600),
            ..Default::default()
        });
        let data = web::Data::from(Arc::clone(&state));

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/oauth/token", web::post().to(issue_token))
                .service(
                    web::scope("/api/v1")
                        .route("/departments", web::get().to(list_departments))
                        .route("/departments/{id}", web::get().to(get_department))
                        .route("/locations/{id}", web::get().to(get_location))
                        .route("/locationTypes", web::get().to(unavailable))
                        .route("/locationTypes/{id}", web::get().to(get_location_type))
                        .route("/jobitems", web::get().to(malformed))
                        .route("/jobitems/{id}", web::get().to(get_job_item))
                        .route("/jobs", web::get().to(list_jobs))
                        .route("/jobs", web::post().to(create_job))
                        .route("/jobs/{id}", web::get().to(get_job)),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind mock upstream");

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            state,
            base_url: format!("http://{addr}"),
            auth_url: format!("http://{addr}/oauth/token"),
            handle,
        }
    }

    pub fn client(&self) -> UpstreamClient {
        UpstreamClient::new(UpstreamConfig {
            base_url: self.base_url.clone(),
            auth_url: self.auth_url.clone(),
            client_id: "gateway".into(),
            client_secret: "s3cret".into(),
            timeout: Duration::from_secs(5),
        })
        .expect("mock upstream client")
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn data_requests(&self) -> usize {
        self.state.data_requests.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<String> {
        self.state.last_request.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn issue_token(
    state: web::Data<UpstreamState>,
    form: web::Form<HashMap<String, String>>,
) -> HttpResponse {
    let issued = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;

    let valid_grant = form.get("grant_type").map(String::as_str) == Some("client_credentials")
        && form.get("scope").map(String::as_str) == Some("openapi")
        && form.get("client_id").map(String::as_str) == Some("gateway")
        && form.get("client_secret").map(String::as_str) == Some("s3cret");
    if !valid_grant {
        return HttpResponse::BadRequest().finish();
    }

    if state.omit_access_token.load(Ordering::SeqCst) {
        return HttpResponse::Ok().json(json!({ "token_type": "bearer" }));
    }

    HttpResponse::Ok().json(json!({
        "access_token": format!("token-{issued}"),
        "expires_in": state.expires_in.load(Ordering::SeqCst),
    }))
}

/// Count the request and reject it when it is not authorized
fn authorize(state: &UpstreamState, req: &HttpRequest) -> Option<HttpResponse> {
    state.data_requests.fetch_add(1, Ordering::SeqCst);
    *state.last_request.lock().unwrap() = req.uri().path_and_query().map(|pq| pq.to_string());

    let authorization = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_authorization.lock().unwrap() = authorization.clone();

    let forced = state
        .reject_with_401
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    let bearer_ok = authorization.is_some_and(|a| a.starts_with("Bearer token-"));

    if forced || !bearer_ok {
        return Some(HttpResponse::Unauthorized().finish());
    }
    None
}

async fn list_departments(state: web::Data<UpstreamState>, req: HttpRequest) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    HttpResponse::Ok().json(json!({
        "pageInfo": { "totalCount": 1, "endCursor": 7, "hasNextPage": false },
        "items": [{ "id": 7, "name": "Engineering" }],
    }))
}

async fn get_department(
    state: web::Data<UpstreamState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    HttpResponse::Ok().json(json!({ "id": path.into_inner(), "name": "Engineering" }))
}

async fn unavailable(state: web::Data<UpstreamState>, req: HttpRequest) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    HttpResponse::ServiceUnavailable().finish()
}

async fn malformed(state: web::Data<UpstreamState>, req: HttpRequest) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    HttpResponse::Ok()
        .content_type("application/json")
        .body("{\"items\": [")
}

async fn create_job(
    state: web::Data<UpstreamState>,
    req: HttpRequest,
    job: web::Json<serde_json::Value>,
) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    let mut created = job.into_inner();
    created["id"] = json!(42);
    HttpResponse::Created().json(created)
}

async fn get_location(
    state: web::Data<UpstreamState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    HttpResponse::Ok().json(json!({
        "id": path.into_inner(),
        "name": "101",
        "displayName": "Room 101",
        "locationType": { "id": 3, "displayName": "Room" },
    }))
}

async fn get_location_type(
    state: web::Data<UpstreamState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    HttpResponse::Ok().json(json!({ "id": path.into_inner(), "displayName": "Room" }))
}

async fn get_job_item(
    state: web::Data<UpstreamState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    HttpResponse::Ok().json(json!({ "id": path.into_inner(), "displayName": "Towel" }))
}

async fn get_job(
    state: web::Data<UpstreamState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    HttpResponse::Ok().json(json!({
        "id": path.into_inner(),
        "priority": "highest",
        "action": "deliver",
        "item": { "name": "Towel" },
    }))
}

/// Single job whose display name echoes the `displayName` filter
async fn list_jobs(
    state: web::Data<UpstreamState>,
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    if let Some(rejection) = authorize(&state, &req) {
        return rejection;
    }
    HttpResponse::Ok().json(json!({
        "pageInfo": { "totalCount": 1, "endCursor": 5, "hasNextPage": false },
        "items": [{ "id": 5, "displayName": query.get("displayName") }],
    }))
}
