use std::collections::HashMap;
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use activity_board::api::{ActivitiesClient, ActivityApi};
use activity_board::banner::Severity;
use activity_board::dom::Element;
use activity_board::error::PageError;
use activity_board::models::{Activity, ActivityCatalog};
use activity_board::page::{Headless, PageController};
use activity_board::timer::ManualScheduler;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

type Shared = Arc<Mutex<ActivityCatalog>>;

fn seed() -> ActivityCatalog {
    let activity = |description: &str, schedule: &str, max: u32, participants: &[&str]| Activity {
        description: description.to_string(),
        schedule: schedule.to_string(),
        max_participants: max,
        participants: participants.iter().map(|p| p.to_string()).collect(),
    };
    [
        (
            "Chess Club",
            activity(
                "Learn strategies and compete in chess tournaments",
                "Fridays, 3:30 PM - 5:00 PM",
                12,
                &["michael@mergington.edu", "daniel@mergington.edu"],
            ),
        ),
        (
            "Programming Class",
            activity(
                "Learn programming fundamentals and build software projects",
                "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
                20,
                &["emma@mergington.edu", "sophia@mergington.edu"],
            ),
        ),
        (
            "Gym Class",
            activity(
                "Physical education and sports activities",
                "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
                30,
                &[],
            ),
        ),
    ]
    .into_iter()
    .collect()
}

async fn list(State(state): State<Shared>) -> Json<ActivityCatalog> {
    Json(state.lock().unwrap().clone())
}

fn not_found(detail: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
}

async fn signup(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let email = query.get("email").cloned().unwrap_or_default();
    let mut catalog = state.lock().unwrap();
    let Some(activity) = catalog.get_mut(&name) else {
        return not_found("Activity not found");
    };
    if activity.participants.contains(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Student is already signed up"})),
        )
            .into_response();
    }
    activity.participants.push(email.clone());
    Json(json!({"message": format!("Signed up {email} for {name}")})).into_response()
}

async fn unregister(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let email = query.get("email").cloned().unwrap_or_default();
    let mut catalog = state.lock().unwrap();
    let Some(activity) = catalog.get_mut(&name) else {
        return not_found("Activity not found");
    };
    if !activity.participants.contains(&email) {
        return not_found("Student is not signed up for this activity");
    }
    activity.participants.retain(|p| p != &email);
    Json(json!({"message": format!("Unregistered {email} from {name}")})).into_response()
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

async fn spawn_server() -> (SocketAddr, Shared) {
    let state: Shared = Arc::new(Mutex::new(seed()));
    let app = Router::new()
        .route("/activities", get(list))
        .route("/activities/{name}/signup", post(signup).delete(unregister))
        .route("/broken/activities", get(broken))
        .route("/broken/activities/{name}/signup", post(broken).delete(broken))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn controller(base_url: &str) -> PageController<ActivitiesClient> {
    PageController::new(
        ActivitiesClient::new(base_url).unwrap(),
        Rc::new(Headless),
        Rc::new(ManualScheduler::new()),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn lists_activities_in_server_order() {
    let (addr, _) = spawn_server().await;
    let client = ActivitiesClient::new(&format!("http://{addr}")).unwrap();

    let catalog = client.list_activities().await.unwrap();
    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(names, vec!["Chess Club", "Programming Class", "Gym Class"]);
    assert_eq!(catalog.get("Chess Club").unwrap().spots_left(), 10);
}

#[tokio::test]
async fn signup_and_unregister_flow() {
    let (addr, state) = spawn_server().await;
    let client = ActivitiesClient::new(&format!("http://{addr}")).unwrap();
    let email = "pytest+user@example.com";

    let reply = client.signup("Chess Club", email).await.unwrap();
    assert!(reply.is_success());
    assert_eq!(
        reply.body.unwrap().message(),
        Some("Signed up pytest+user@example.com for Chess Club")
    );
    assert!(state
        .lock()
        .unwrap()
        .get("Chess Club")
        .unwrap()
        .participants
        .iter()
        .any(|p| p == email));

    let duplicate = client.signup("Chess Club", email).await.unwrap();
    assert_eq!(duplicate.status, 400);
    assert_eq!(
        duplicate.body.unwrap().detail(),
        Some("Student is already signed up")
    );

    let reply = client.unregister("Chess Club", email).await.unwrap();
    assert!(reply.is_success());

    let again = client.unregister("Chess Club", email).await.unwrap();
    assert_eq!(again.status, 404);

    let missing = client.signup("Underwater Basket Weaving", email).await.unwrap();
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body.unwrap().detail(), Some("Activity not found"));
}

#[tokio::test]
async fn non_json_bodies_are_reported_as_missing() {
    let (addr, _) = spawn_server().await;
    let client = ActivitiesClient::new(&format!("http://{addr}/broken")).unwrap();

    let reply = client.unregister("Chess Club", "a@b.com").await.unwrap();
    assert_eq!(reply.status, 500);
    assert!(reply.body.is_none());

    let err = client.list_activities().await.unwrap_err();
    assert!(matches!(err, PageError::Api { status: 500, .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let client = ActivitiesClient::new(&format!("http://127.0.0.1:{}", closed_port())).unwrap();
    let err = client.signup("Chess Club", "a@b.com").await.unwrap_err();
    assert!(matches!(err, PageError::Http(_)));
}

#[tokio::test]
async fn page_round_trip_over_http() {
    let (addr, _) = spawn_server().await;
    let page = controller(&format!("http://{addr}"));
    page.sync().await;

    page.fill_form("Gym Class", "new@mergington.edu");
    page.submit().await;
    {
        let document = page.document();
        let card = document.card("Gym Class").unwrap();
        assert_eq!(card.find_by_class("badge").unwrap().text_content(), "1");
        assert_eq!(
            card.find_all(&|el: &Element| el.has_class("participant-email"))
                .len(),
            1
        );
        assert_eq!(document.message.severity(), Some(Severity::Success));
    }

    page.unregister("Gym Class", "new@mergington.edu").await;
    let document = page.document();
    let card = document.card("Gym Class").unwrap();
    assert!(card.find_by_class("participants-empty").is_some());
    assert_eq!(
        document.message.text(),
        "Unregistered new@mergington.edu from Gym Class"
    );
}

#[tokio::test]
async fn page_survives_unreachable_server() {
    let page = controller(&format!("http://127.0.0.1:{}", closed_port()));
    page.sync().await;
    assert_eq!(
        page.document().activities_list.text_content(),
        "Failed to load activities. Please try again later."
    );

    page.fill_form("Chess Club", "a@b.com");
    page.submit().await;
    assert_eq!(
        page.document().message.text(),
        "Failed to sign up. Please try again."
    );

    page.unregister("Chess Club", "a@b.com").await;
    assert_eq!(
        page.document().message.text(),
        "Error unregistering. Try again."
    );
}
