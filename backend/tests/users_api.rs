//! End-to-end CRUD flows over the HTTP surface, backed by the in-memory
//! gateway so the suite runs without a database.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use backend::domain::ports::InMemoryUserRepository;
use backend::inbound::http::error::json_config;
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{
    DELETED_MESSAGE, create_user, delete_user, get_user, list_users, update_user,
};

fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(Arc::new(InMemoryUserRepository::new()));
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .app_data(json_config())
            .service(list_users)
            .service(get_user)
            .service(create_user)
            .service(update_user)
            .service(delete_user),
    )
}

async fn create(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    name: &str,
    email: &str,
) -> ServiceResponse {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({"name": name, "email": email}))
        .to_request();
    actix_test::call_service(app, request).await
}

#[rstest]
#[actix_web::test]
async fn create_then_get_round_trips() {
    let app = actix_test::init_service(test_app()).await;

    let created = create(&app, "Ada Lovelace", "ada@example.com").await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created_body: Value = actix_test::read_body_json(created).await;
    let id = created_body.get("id").and_then(Value::as_i64).expect("id");

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let fetched: Value = actix_test::read_body_json(response).await;
    assert_eq!(fetched, created_body);
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_does_not_create_a_second_user() {
    let app = actix_test::init_service(test_app()).await;

    let first = create(&app, "Ada", "ada@example.com").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = create(&app, "Imposter", "ada@example.com").await;
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = actix_test::read_body_json(second).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Internal server error")
    );

    // The failed attempt must leave the store unchanged.
    let listing = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/users").to_request(),
    )
    .await;
    let users: Value = actix_test::read_body_json(listing).await;
    assert_eq!(users.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn unknown_id_yields_404_for_get_update_and_delete() {
    let app = actix_test::init_service(test_app()).await;

    let get = actix_test::TestRequest::get()
        .uri("/api/v1/users/12345")
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, get).await.status(),
        StatusCode::NOT_FOUND
    );

    let put = actix_test::TestRequest::put()
        .uri("/api/v1/users/12345")
        .set_json(json!({"name": "Ada", "email": "ada@example.com"}))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, put).await.status(),
        StatusCode::NOT_FOUND
    );

    let delete = actix_test::TestRequest::delete()
        .uri("/api/v1/users/12345")
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, delete).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[rstest]
#[actix_web::test]
async fn update_changes_fields_but_never_the_id() {
    let app = actix_test::init_service(test_app()).await;

    let created = create(&app, "Ada", "ada@example.com").await;
    let created_body: Value = actix_test::read_body_json(created).await;
    let id = created_body.get("id").and_then(Value::as_i64).expect("id");

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(json!({"name": "Ada King", "email": "countess@example.com"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = actix_test::read_body_json(response).await;
    assert_eq!(updated.get("id").and_then(Value::as_i64), Some(id));
    assert_eq!(updated.get("name").and_then(Value::as_str), Some("Ada King"));
    assert_eq!(
        updated.get("email").and_then(Value::as_str),
        Some("countess@example.com")
    );
}

#[rstest]
#[actix_web::test]
async fn delete_then_get_yields_404() {
    let app = actix_test::init_service(test_app()).await;

    let created = create(&app, "Ada", "ada@example.com").await;
    let created_body: Value = actix_test::read_body_json(created).await;
    let id = created_body.get("id").and_then(Value::as_i64).expect("id");

    let delete = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{id}"))
        .to_request();
    let ack = actix_test::call_service(&app, delete).await;
    assert_eq!(ack.status(), StatusCode::OK);
    let ack_body: Value = actix_test::read_body_json(ack).await;
    assert_eq!(
        ack_body.get("message").and_then(Value::as_str),
        Some(DELETED_MESSAGE)
    );

    let get = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{id}"))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, get).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[rstest]
#[actix_web::test]
async fn list_returns_every_user_exactly_once() {
    let app = actix_test::init_service(test_app()).await;

    let people = [
        ("Ada", "ada@example.com"),
        ("Grace", "grace@example.com"),
        ("Edsger", "edsger@example.com"),
    ];
    for (name, email) in people {
        assert_eq!(create(&app, name, email).await.status(), StatusCode::CREATED);
    }

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/users").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let users: Value = actix_test::read_body_json(response).await;
    let array = users.as_array().expect("array of users");
    assert_eq!(array.len(), people.len());

    let mut emails: Vec<&str> = array
        .iter()
        .filter_map(|u| u.get("email").and_then(Value::as_str))
        .collect();
    emails.sort_unstable();
    assert_eq!(
        emails,
        vec!["ada@example.com", "edsger@example.com", "grace@example.com"]
    );
}

#[rstest]
#[case("{not json")]
#[case("[]")]
#[case("{\"name\": 7, \"email\": \"ada@example.com\"}")]
#[actix_web::test]
async fn malformed_create_body_yields_400_and_no_write(#[case] raw: &str) {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(("content-type", "application/json"))
        .set_payload(raw.to_owned())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert!(body.get("message").and_then(Value::as_str).is_some());

    let listing = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/users").to_request(),
    )
    .await;
    let users: Value = actix_test::read_body_json(listing).await;
    assert_eq!(users.as_array().map(Vec::len), Some(0));
}

#[rstest]
#[actix_web::test]
async fn malformed_update_body_leaves_record_unchanged() {
    let app = actix_test::init_service(test_app()).await;

    let created = create(&app, "Ada", "ada@example.com").await;
    let created_body: Value = actix_test::read_body_json(created).await;
    let id = created_body.get("id").and_then(Value::as_i64).expect("id");

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"name\": \"Hacker\"")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let get = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{id}"))
        .to_request();
    let current: Value = actix_test::read_body_json(actix_test::call_service(&app, get).await).await;
    assert_eq!(current, created_body);
}
