mod common;

use axum::{
    body::{to_bytes, Body},
    extract::Path,
    http::{header, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use skillswap::{auth::Clients, session::USER_ID, store::Store, AppState};
use tower::ServiceExt;
use tower_sessions::Session;
use uuid::Uuid;

use common::{member, pending_match, store};

async fn login_as(session: Session, Path(id): Path<String>) -> StatusCode {
    session.insert(USER_ID, id).await.unwrap();
    StatusCode::NO_CONTENT
}

fn app(store: Store) -> Router {
    let clients = Clients::from_json(json!({ "firebase": { "apikey": "test" } }), "http://localhost:8080").unwrap();
    skillswap::routes()
        .route("/test/login/{id}", get(login_as))
        .with_state(AppState { store, clients })
        .layer(skillswap::session_layer(time::Duration::minutes(5)))
}

struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    fn new(store: Store) -> Self {
        Self { app: app(store), cookie: None }
    }

    async fn login(store: Store, user_id: &str) -> Self {
        let mut client = Self::new(store);
        let response = client.send("GET", &format!("/test/login/{user_id}"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        client
    }

    async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_owned();
            self.cookie = Some(pair);
        }
        response
    }

    async fn json(&mut self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.send(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }
}

fn location(response: &Response) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn guarded_routes_redirect_to_login() {
    let mut client = Client::new(store().await);

    let response = client.send("GET", "/api/profile", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?return_url=%2Fapi%2Fprofile");

    let response = client.send("GET", "/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?return_url=%2Fdashboard");
}

#[tokio::test]
async fn public_pages_render() {
    let mut client = Client::new(store().await);

    let response = client.send("GET", "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.send("GET", "/terms", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&html).contains("<h1>SkillSwap Terms of Service</h1>"));
}

#[tokio::test]
async fn signed_in_user_gets_profile_provisioned() {
    let store = store().await;
    let mut client = Client::login(store, "ada").await;

    let (status, me) = client.json("GET", "/api/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], "ada");

    let (status, view) = client.json("GET", "/api/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["profile"]["display_name"], "User");
    assert_eq!(view["profile"]["profile_completed"], false);
    assert_eq!(view["skills"], json!([]));

    let response = client.send("GET", "/", None).await;
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn validation_errors_come_back_as_notifications() {
    let store = store().await;
    member(&store, "ada").await;
    let mut client = Client::login(store, "ada").await;

    let (status, body) = client
        .json("PATCH", "/api/profile", Some(json!({ "display_name": "x".repeat(51) })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Error");
    assert!(body["description"].as_str().unwrap().contains("Display name"));

    let (status, body) = client
        .json("PATCH", &format!("/api/matches/{}", Uuid::now_v7()), Some(json!({ "status": "accepted" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["title"], "Error");
}

#[tokio::test]
async fn skills_round_trip_over_http() {
    let store = store().await;
    member(&store, "ada").await;
    let mut client = Client::login(store, "ada").await;

    let (status, added) = client
        .json(
            "POST",
            "/api/skills",
            Some(json!({ "skill_name": "Rust", "skill_type": "teach", "skill_level": "expert" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = added["id"].as_str().unwrap().to_owned();

    let (_, found) = client.json("GET", "/api/skills/search?q=rU&type=teach", None).await;
    assert_eq!(found[0]["skill_name"], "Rust");
    assert_eq!(found[0]["owner_display_name"], "ada");

    let response = client.send("DELETE", &format!("/api/skills/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let (_, skills) = client.json("GET", "/api/skills", None).await;
    assert_eq!(skills, json!([]));
}

#[tokio::test]
async fn illegal_transition_is_a_conflict() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    let pending = pending_match(&store, &ada, &bob).await;
    let mut client = Client::login(store, "bob").await;

    let uri = format!("/api/matches/{}", pending.id);
    let (status, _) = client.json("PATCH", &uri, Some(json!({ "status": "completed" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, accepted) = client.json("PATCH", &uri, Some(json!({ "status": "accepted" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    let (status, sent) = client
        .json("POST", &format!("/api/matches/{}/messages", pending.id), Some(json!({ "content": "hi" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["sender_id"], "bob");

    let (_, history) = client.json("GET", &format!("/api/matches/{}/messages", pending.id), None).await;
    assert_eq!(history.as_array().unwrap().last().unwrap()["content"], "hi");
}

#[tokio::test]
async fn outsiders_cannot_read_a_thread() {
    let store = store().await;
    let ada = member(&store, "ada").await;
    let bob = member(&store, "bob").await;
    member(&store, "eve").await;
    let pending = pending_match(&store, &ada, &bob).await;
    let mut client = Client::login(store, "eve").await;

    let (status, _) = client.json("GET", &format!("/api/matches/{}/messages", pending.id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn library_search_and_browse_differ_on_blank_query() {
    let store = store().await;
    store.library.seed_if_empty().await.unwrap();
    let mut client = Client::new(store);

    let (status, empty) = client.json("GET", "/api/library/search?q=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty, json!([]));

    let (_, top) = client.json("GET", "/api/library/browse?limit=5", None).await;
    assert_eq!(top.as_array().unwrap().len(), 5);
    assert_eq!(top[0]["name"], "Python");

    let (_, found) = client.json("GET", "/api/library/search?q=pyth", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn library_listings_use_their_default_limits() {
    let store = store().await;
    let crafts = store.library.add_category("Crafts", None, None).await.unwrap();
    for i in 0..25 {
        store.library.add_item(&format!("Craft {i:02}"), Some(crafts.id), None, i).await.unwrap();
    }
    let mut client = Client::new(store);

    let (_, browsed) = client.json("GET", "/api/library/browse", None).await;
    assert_eq!(browsed.as_array().unwrap().len(), 20);
    assert_eq!(browsed[0]["name"], "Craft 24");

    let (_, searched) = client.json("GET", "/api/library/search?q=craft", None).await;
    assert_eq!(searched.as_array().unwrap().len(), 20);

    let (_, in_category) = client
        .json("GET", &format!("/api/library/categories/{}", crafts.id), None)
        .await;
    assert_eq!(in_category.as_array().unwrap().len(), 10);

    let (_, popular) = client.json("GET", "/api/library/popular", None).await;
    assert_eq!(popular.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn selection_is_consumed_by_setup() {
    let store = store().await;
    let mut client = Client::login(store, "ada").await;

    let (status, selection) = client
        .json("PUT", "/api/selection", Some(json!({ "selected_skill": "Guitar", "search_query": "gui" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selection["selected_skill"], "Guitar");

    let form = json!({
        "display_name": "Ada",
        "skills": [{ "name": "Guitar", "type": "learn", "level": "beginner" }],
    });
    let (status, view) = client.json("POST", "/api/profile/setup", Some(form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["profile"]["profile_completed"], true);
    assert_eq!(view["skills"][0]["skill_name"], "Guitar");

    let (_, selection) = client.json("GET", "/api/selection", None).await;
    assert_eq!(selection, json!({ "selected_skill": null, "search_query": null }));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let store = store().await;
    let mut client = Client::login(store, "ada").await;

    let response = client.send("GET", "/logout", None).await;
    assert_eq!(location(&response), "/");

    let response = client.send("GET", "/api/me", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
