//! End-to-end tests for the HTTP surface, driving the router directly.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use crate::db::repositories::LocalRepository;
use crate::db::RestrictionRepository;
use crate::http::{create_router, AppState};
use crate::services::{start_mailer, LogTransport};
use crate::session::MemorySessionStore;

fn test_router() -> (Router, Arc<LocalRepository>) {
    let repo = Arc::new(LocalRepository::new());
    repo.add_room(1, "General's Quarters");
    repo.add_room(2, "Major's Suite");
    let (mailer, _handle) = start_mailer(LogTransport, 8);
    let state = AppState::new(
        repo.clone(),
        Arc::new(MemorySessionStore::new()),
        mailer,
    );
    (create_router(state), repo)
}

struct Client {
    router: Router,
    cookie: Option<String>,
}

impl Client {
    fn new(router: Router) -> Self {
        Self {
            router,
            cookie: None,
        }
    }

    async fn request(
        &mut self,
        method: &str,
        uri: &str,
        form: Option<&str>,
    ) -> (StatusCode, Option<String>, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie.clone());
        }
        let request = match form {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let raw = set_cookie.to_str().unwrap();
            let pair = raw.split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, location, body)
    }

    async fn get(&mut self, uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
        self.request("GET", uri, None).await
    }

    async fn post(
        &mut self,
        uri: &str,
        form: &str,
    ) -> (StatusCode, Option<String>, serde_json::Value) {
        self.request("POST", uri, Some(form)).await
    }
}

#[tokio::test]
async fn health_reports_connected_store() {
    let (router, _repo) = test_router();
    let mut client = Client::new(router);
    let (status, _, body) = client.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn full_booking_flow_over_http() {
    let (router, repo) = test_router();
    let mut client = Client::new(router);

    // search shows both rooms
    let (status, _, body) = client
        .post("/search-availability", "start=2024-05-01&end=2024-05-03")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rooms"].as_array().unwrap().len(), 2);

    // pick room 1 via the slug route
    let (status, location, _) = client.get("/choose-room/1-generals-quarters").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/make-reservation"));

    // the form page knows the room and the dates
    let (status, _, body) = client.get("/make-reservation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"]["id"], 1);
    assert_eq!(body["stay"]["start_date"], "2024-05-01");

    // commit
    let (status, location, _) = client
        .post(
            "/make-reservation",
            "first_name=Ada&last_name=Byron&email=ada%40example.com&phone=555",
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/reservation-summary"));

    // summary renders once…
    let (status, _, body) = client.get("/reservation-summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reservation"]["first_name"], "Ada");

    // …and only once
    let (status, location, _) = client.get("/reservation-summary").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/search-availability"));

    // exactly one reservation and its paired restriction exist
    assert_eq!(repo.restriction_count(), 1);
    let (_, _, body) = client.get("/admin/reservations-all").await;
    assert_eq!(body["reservations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_guest_form_redisplays_with_field_errors() {
    let (router, repo) = test_router();
    let mut client = Client::new(router);

    client
        .post("/search-availability", "start=2024-05-01&end=2024-05-03")
        .await;
    client.get("/choose-room/1-generals-quarters").await;

    let (status, _, body) = client
        .post(
            "/make-reservation",
            "first_name=Jo&last_name=Lee&email=jo%40x.com",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["errors"]["first_name"][0]
        .as_str()
        .unwrap()
        .contains("at least 3 characters"));
    // the typed values come back for redisplay, nothing was written
    assert_eq!(body["form"]["first_name"], "Jo");
    assert_eq!(repo.restriction_count(), 0);

    // fixing the name completes the booking with the draft still alive
    let (status, location, _) = client
        .post(
            "/make-reservation",
            "first_name=Joan&last_name=Lee&email=jo%40x.com",
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/reservation-summary"));
}

#[tokio::test]
async fn unavailable_dates_redirect_back_with_a_message() {
    let (router, repo) = test_router();
    let mut client = Client::new(router);

    // block both rooms for the window
    repo.insert_block(1, "2024-05-02".parse().unwrap()).await.unwrap();
    repo.insert_block(2, "2024-05-02".parse().unwrap()).await.unwrap();

    let (status, location, _) = client
        .post("/search-availability", "start=2024-05-01&end=2024-05-03")
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/search-availability"));

    // the message is waiting on the search page, once
    let (_, _, body) = client.get("/search-availability").await;
    assert_eq!(body["error"], "No availability");
    let (_, _, body) = client.get("/search-availability").await;
    assert!(body.get("error").is_none() || body["error"].is_null());
}

#[tokio::test]
async fn room_scoped_check_redirects_to_form_or_back() {
    let (router, repo) = test_router();
    let mut client = Client::new(router);

    repo.insert_block(1, "2024-05-02".parse().unwrap()).await.unwrap();

    // room 1 is taken → back to its page
    let (status, location, _) = client
        .post(
            "/search-availability-by-id",
            "room_id=1&start=2024-05-01&end=2024-05-03",
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/rooms/1"));

    // room 2 is free → straight to the guest form
    let (status, location, _) = client
        .post(
            "/search-availability-by-id",
            "room_id=2&start=2024-05-01&end=2024-05-03",
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/make-reservation"));
}

#[tokio::test]
async fn json_probe_answers_availability() {
    let (router, repo) = test_router();
    let mut client = Client::new(router);

    let (status, _, body) = client
        .post(
            "/api/search-availability",
            "room_id=1&start=2024-05-01&end=2024-05-03",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], true);

    repo.insert_block(1, "2024-05-01".parse().unwrap()).await.unwrap();
    let (_, _, body) = client
        .post(
            "/api/search-availability",
            "room_id=1&start=2024-05-01&end=2024-05-03",
        )
        .await;
    assert_eq!(body["result"], false);
}

#[tokio::test]
async fn calendar_round_trip_adds_and_removes_blocks() {
    let (router, repo) = test_router();
    let mut client = Client::new(router);

    // seed one block and render the month so the session caches it
    let blocked = repo.insert_block(1, "2024-05-10".parse().unwrap()).await.unwrap();
    let (status, _, body) = client
        .get("/admin/reservations-calendar?y=2024&m=5")
        .await;
    assert_eq!(status, StatusCode::OK);
    let room1 = &body["rooms"][0];
    let day10 = room1["days"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["day"] == "2024-05-10")
        .unwrap();
    assert_eq!(day10["status"], "blocked");
    assert_eq!(day10["restriction_id"], blocked);

    // save without the remove checkbox, adding a block elsewhere
    let (status, location, _) = client
        .post(
            "/admin/reservations-calendar",
            "y=2024&m=5&add_block_2_2024-05-20=1",
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        location.as_deref(),
        Some("/admin/reservations-calendar?y=2024&m=5")
    );

    // old block gone, new one present
    let (_, _, body) = client
        .get("/admin/reservations-calendar?y=2024&m=5")
        .await;
    let day10 = body["rooms"][0]["days"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["day"] == "2024-05-10")
        .unwrap()
        .clone();
    assert_eq!(day10["status"], "free");
    let day20 = body["rooms"][1]["days"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["day"] == "2024-05-20")
        .unwrap()
        .clone();
    assert_eq!(day20["status"], "blocked");
}
