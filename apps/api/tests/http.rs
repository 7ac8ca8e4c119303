//! HTTP round trips through the real routes against an in-memory database.

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use chrono::{Duration, Local};
use pharmos_api::{configure, ApiConfig, AppState};
use pharmos_core::{NewItem, NewUser, Role, User};
use pharmos_db::{Database, DbConfig};
use serde_json::{json, Value};

const PASSWORD: &str = "correct-horse-battery";

async fn state() -> web::Data<AppState> {
    let config = ApiConfig::from_lookup(|_| None).unwrap();
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    web::Data::new(AppState::new(db, &config))
}

async fn user(state: &AppState, email: &str, role: Role) -> User {
    let users = state.db.users();
    match role {
        Role::Superadmin => users
            .bootstrap_superadmin("Owner", email, PASSWORD)
            .await
            .unwrap(),
        role => users
            .create(&NewUser {
                name: email.to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
                role,
            })
            .await
            .unwrap(),
    }
}

async fn token(state: &AppState, email: &str, role: Role) -> String {
    let user = user(state, email, role).await;
    state.jwt.issue(&user).unwrap().0
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token))
}

fn new_item(name: &str, price_sell_cents: i64, stock: i64, days_to_expiry: i64) -> NewItem {
    NewItem {
        name: name.to_string(),
        description: None,
        price_buy_cents: price_sell_cents / 2,
        price_sell_cents,
        stock,
        expire_date: Local::now().date_naive() + Duration::days(days_to_expiry),
        category: None,
        barcode: None,
    }
}

async fn call<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[actix_web::test]
async fn health_is_public() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let (status, body) = call(&app, TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}

#[actix_web::test]
async fn missing_or_bad_token_is_unauthenticated() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let body = json!({ "lines": [{ "itemId": "x", "quantity": 1 }] });

    let (status, err) = call(
        &app,
        TestRequest::post().uri("/api/sales").set_json(&body).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["code"], "UNAUTHENTICATED");

    for header in ["Bearer not-a-jwt", "Basic dXNlcjpwYXNz", "Bearer "] {
        let (status, _) = call(
            &app,
            TestRequest::post()
                .uri("/api/sales")
                .insert_header((AUTHORIZATION, header))
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
    }

    // A token signed with another secret
    let foreign = pharmos_api::auth::JwtManager::new("some-other-secret", 3600);
    let intruder = user(&state, "intruder@pharmos.local", Role::Pharmacist).await;
    let (forged, _) = foreign.issue(&intruder).unwrap();
    let (status, _) = call(
        &app,
        TestRequest::get()
            .uri("/api/sales")
            .insert_header(bearer(&forged))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn only_pharmacists_create_sales() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let item = state.db.items().create(&new_item("Paracetamol", 1000, 50, 365)).await.unwrap();
    let body = json!({ "lines": [{ "itemId": item.id, "quantity": 1 }] });

    for (email, role) in [
        ("owner@pharmos.local", Role::Superadmin),
        ("admin@pharmos.local", Role::Admin),
    ] {
        let token = token(&state, email, role).await;
        let (status, err) = call(
            &app,
            TestRequest::post()
                .uri("/api/sales")
                .insert_header(bearer(&token))
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role}");
        assert_eq!(err["code"], "FORBIDDEN");
        assert_eq!(err["message"], "Forbidden");
    }

    assert_eq!(state.db.items().get(&item.id).await.unwrap().stock, 50);
    assert_eq!(state.db.sales().count().await.unwrap(), 0);
}

#[actix_web::test]
async fn admin_cannot_manage_items() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let token = token(&state, "admin@pharmos.local", Role::Admin).await;

    let (status, _) = call(
        &app,
        TestRequest::post()
            .uri("/api/items")
            .insert_header(bearer(&token))
            .set_json(new_item("Ibuprofen", 500, 10, 365))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(state.db.items().count().await.unwrap(), 0);
}

#[actix_web::test]
async fn forbidden_is_decided_before_the_body_is_read() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let admin = token(&state, "admin@pharmos.local", Role::Admin).await;
    let pharmacist = token(&state, "pharma@pharmos.local", Role::Pharmacist).await;

    let cases = [
        (&admin, "/api/sales", json!({ "lines": "nope" })),
        (&admin, "/api/items", json!({ "name": "x" })),
        (&pharmacist, "/api/users", json!({ "email": 42 })),
    ];

    for (token, uri, body) in cases {
        let (status, err) = call(
            &app,
            TestRequest::post()
                .uri(uri)
                .insert_header(bearer(token))
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(err["code"], "FORBIDDEN");
    }

    // Not JSON at all
    let (status, _) = call(
        &app,
        TestRequest::post()
            .uri("/api/sales")
            .insert_header(bearer(&admin))
            .insert_header(("content-type", "text/plain"))
            .set_payload("lines=1")
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The caller that holds the capability still gets the input error
    let (status, err) = call(
        &app,
        TestRequest::post()
            .uri("/api/sales")
            .insert_header(bearer(&pharmacist))
            .set_json(json!({ "lines": "nope" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_INPUT");
}

#[actix_web::test]
async fn pharmacist_sale_flow() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let pharmacist = token(&state, "pharma@pharmos.local", Role::Pharmacist).await;
    let admin = token(&state, "admin@pharmos.local", Role::Admin).await;

    let (status, item) = call(
        &app,
        TestRequest::post()
            .uri("/api/items")
            .insert_header(bearer(&pharmacist))
            .set_json(new_item("Paracetamol 500mg", 1000, 5, 365))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "LowStock");
    let item_id = item["id"].as_str().unwrap().to_string();

    let sale_body = json!({ "lines": [{ "itemId": item_id, "quantity": 3 }] });
    let (status, body) = call(
        &app,
        TestRequest::post()
            .uri("/api/sales")
            .insert_header(bearer(&pharmacist))
            .set_json(&sale_body)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sale"]["totalCents"], 3000);
    assert_eq!(body["sale"]["lines"][0]["priceAtSaleCents"], 1000);
    assert_eq!(body["sale"]["lines"][0]["quantity"], 3);
    let sale_id = body["sale"]["id"].as_str().unwrap().to_string();

    let (_, item) = call(
        &app,
        TestRequest::get().uri(&format!("/api/items/{}", item_id)).to_request(),
    )
    .await;
    assert_eq!(item["stock"], 2);

    let (status, err) = call(
        &app,
        TestRequest::post()
            .uri("/api/sales")
            .insert_header(bearer(&pharmacist))
            .set_json(&sale_body)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "INSUFFICIENT_STOCK");
    assert_eq!(state.db.items().get(&item_id).await.unwrap().stock, 2);

    // Admins read billing history
    let (status, sales) = call(
        &app,
        TestRequest::get()
            .uri("/api/sales")
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sales.as_array().unwrap().len(), 1);

    let (status, sale) = call(
        &app,
        TestRequest::get()
            .uri(&format!("/api/sales/{}", sale_id))
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sale["lines"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn invalid_sales_are_rejected() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let pharmacist = token(&state, "pharma@pharmos.local", Role::Pharmacist).await;

    let cases = [
        (json!({ "lines": [] }), StatusCode::BAD_REQUEST),
        (
            json!({ "lines": [{ "itemId": "missing", "quantity": 0 }] }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "lines": [{ "itemId": "missing", "quantity": 1 }] }),
            StatusCode::NOT_FOUND,
        ),
        (json!({ "lines": "nope" }), StatusCode::BAD_REQUEST),
    ];

    for (body, expected) in cases {
        let (status, err) = call(
            &app,
            TestRequest::post()
                .uri("/api/sales")
                .insert_header(bearer(&pharmacist))
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(status, expected, "body {body}");
        assert!(err["code"].is_string());
    }
    assert_eq!(state.db.sales().count().await.unwrap(), 0);
}

#[actix_web::test]
async fn missing_resources_are_not_found() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let admin = token(&state, "admin@pharmos.local", Role::Admin).await;

    let (status, err) = call(&app, TestRequest::get().uri("/api/items/nope").to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");

    let (status, _) = call(
        &app,
        TestRequest::get()
            .uri("/api/sales/nope")
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn item_list_reports_status_and_filters_sellable() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let items = state.db.items();
    items.create(&new_item("Expired", 100, 50, -1)).await.unwrap();
    items.create(&new_item("Low", 100, 5, 30)).await.unwrap();
    let valid = items.create(&new_item("Valid", 100, 6, 30)).await.unwrap();

    let (status, all) = call(&app, TestRequest::get().uri("/api/items").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    let statuses: Vec<(&str, &str)> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|v| (v["name"].as_str().unwrap(), v["status"].as_str().unwrap()))
        .collect();
    assert_eq!(
        statuses,
        vec![("Expired", "Expired"), ("Low", "LowStock"), ("Valid", "Valid")]
    );

    let (_, sellable) = call(
        &app,
        TestRequest::get().uri("/api/items?sellable=true").to_request(),
    )
    .await;
    let sellable = sellable.as_array().unwrap();
    assert_eq!(sellable.len(), 1);
    assert_eq!(sellable[0]["id"], valid.id.as_str());
}

#[actix_web::test]
async fn item_update_and_delete() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let owner = token(&state, "owner@pharmos.local", Role::Superadmin).await;
    let item = state.db.items().create(&new_item("Cetirizine", 300, 20, 200)).await.unwrap();

    let (status, updated) = call(
        &app,
        TestRequest::put()
            .uri(&format!("/api/items/{}", item.id))
            .insert_header(bearer(&owner))
            .set_json(json!({ "priceSellCents": 350 }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["priceSellCents"], 350);
    assert_eq!(updated["stock"], 20);

    let (status, _) = call(
        &app,
        TestRequest::put()
            .uri(&format!("/api/items/{}", item.id))
            .insert_header(bearer(&owner))
            .set_json(json!({ "stock": -1 }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, deleted) = call(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/items/{}", item.id))
            .insert_header(bearer(&owner))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], item.id.as_str());
    assert!(state.db.items().find(&item.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn bootstrap_and_login_flow() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let owner = json!({ "name": "Owner", "email": "Owner@Pharmos.local", "password": PASSWORD });

    let (status, created) = call(
        &app,
        TestRequest::post().uri("/api/auth/bootstrap").set_json(&owner).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["role"], "superadmin");
    assert!(created.get("passwordHash").is_none());

    let (status, _) = call(
        &app,
        TestRequest::post().uri("/api/auth/bootstrap").set_json(&owner).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, err) = call(
        &app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "owner@pharmos.local", "password": "wrong-password" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["code"], "UNAUTHENTICATED");

    let (status, login) = call(
        &app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "owner@pharmos.local", "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["role"], "superadmin");
    assert!(login["expiresAt"].is_string());
    let token = login["token"].as_str().unwrap();

    let (status, me) = call(
        &app,
        TestRequest::get()
            .uri("/api/users/me")
            .insert_header(bearer(token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "owner@pharmos.local");
}

#[actix_web::test]
async fn user_management_is_superadmin_only() {
    let state = state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
    let owner = token(&state, "owner@pharmos.local", Role::Superadmin).await;
    let pharmacist = token(&state, "pharma@pharmos.local", Role::Pharmacist).await;

    let (status, _) = call(
        &app,
        TestRequest::get()
            .uri("/api/users")
            .insert_header(bearer(&pharmacist))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let new_admin = json!({
        "name": "Auditor",
        "email": "auditor@pharmos.local",
        "password": PASSWORD,
        "role": "admin"
    });
    let (status, created) = call(
        &app,
        TestRequest::post()
            .uri("/api/users")
            .insert_header(bearer(&owner))
            .set_json(&new_admin)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["role"], "admin");

    let (status, _) = call(
        &app,
        TestRequest::post()
            .uri("/api/users")
            .insert_header(bearer(&owner))
            .set_json(&new_admin)
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, users) = call(
        &app,
        TestRequest::get()
            .uri("/api/users")
            .insert_header(bearer(&owner))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 3);
}
