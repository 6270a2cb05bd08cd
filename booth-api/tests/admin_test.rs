mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use booth_shared::{OrderLine, OrderStatus};
use common::{food, order, table, TestApp};
use booth_shared::FoodCategory;
use serde_json::json;

fn seed_orders(app: &TestApp) {
    let line = |id: i64, qty: u32| OrderLine {
        food: food(id, "x", 1000, FoodCategory::Main),
        quantity: qty,
        price: 1000,
    };

    let mut paid = order("aaa-1", table("t1", "A-1"), 8000, OrderStatus::Completed, vec![line(1, 1)]);
    paid.payer_name = Some("Kim".to_string());
    let mut pending = order("bbb-2", table("t2", "A-2"), 0, OrderStatus::PreOrder, vec![line(2, 2)]);
    pending.pre_order_amount = Some(6000);
    pending.payer_name = Some("Lee".to_string());
    let refunded = order("ccc-3", table("t1", "A-1"), 3000, OrderStatus::Refunded, vec![line(2, 1)]);

    app.api.push_order(paid);
    app.api.push_order(pending);
    app.api.push_order(refunded);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = TestApp::new();

    let (status, _) = app.get("/admin/dashboard").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Request::get("/admin/dashboard")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post_json("/admin/login", json!({ "username": "admin", "password": "wrong" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_dashboard() {
    let app = TestApp::new();
    seed_orders(&app);

    let (status, body) = app.admin("GET", "/admin/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_orders"], 1);
    assert_eq!(body["today_orders"], 1);
    assert_eq!(body["total_revenue"], 8000);
    assert_eq!(body["sold_out_foods"], 1);
    assert_eq!(body["total_foods"], 3);
    assert_eq!(body["total_tables"], 2);
    assert_eq!(body["recent_orders"][0]["id"], "aaa-1");
    assert_eq!(body["popular_foods"][0]["order_count"], 1);
}

#[tokio::test]
async fn test_food_management() {
    let app = TestApp::new();

    let (status, body) = app.admin("GET", "/admin/foods?search=LEMON&page=abc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["items"][0]["name"], "Lemonade");

    let (status, _) = app
        .admin("POST", "/admin/foods", Some(json!({ "name": " ", "price": 1000, "category": "main" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .admin(
            "POST",
            "/admin/foods",
            Some(json!({ "name": "Sundae", "price": 5000, "category": "menu", "image": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"], "main");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .admin("POST", &format!("/admin/foods/{}/toggle-sold-out", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["soldOut"], true);

    let (status, body) = app
        .admin("PATCH", &format!("/admin/foods/{}", id), Some(json!({ "price": 5500 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 5500);

    let (status, _) = app.admin("DELETE", &format!("/admin/foods/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.admin("GET", &format!("/admin/foods/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_list_filters_and_summarizes() {
    let app = TestApp::new();
    seed_orders(&app);

    let (status, body) = app.admin("GET", "/admin/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_orders"], 3);
    assert_eq!(body["summary"]["completed_orders"], 1);
    assert_eq!(body["summary"]["pre_orders"], 1);
    assert_eq!(body["summary"]["total_revenue"], 8000 + 6000 + 3000);

    let (_, body) = app
        .admin("GET", "/admin/orders?status=pre_order", None)
        .await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
    assert_eq!(body["orders"][0]["id"], "bbb-2");

    let (_, body) = app
        .admin("GET", "/admin/orders?sort_by=amount&order=asc", None)
        .await;
    let ids: Vec<&str> = body["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["ccc-3", "bbb-2", "aaa-1"]);

    let (_, body) = app.admin("GET", "/admin/orders?search=kim", None).await;
    assert_eq!(body["summary"]["total_orders"], 1);
}

#[tokio::test]
async fn test_tables_and_checkout() {
    let app = TestApp::new();
    seed_orders(&app);

    let (status, body) = app.admin("GET", "/admin/tables?search=a-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["active_order_count"], 2);

    let (status, body) = app.admin("GET", "/admin/tables/t1/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_count"], 2);
    assert_eq!(body["total_revenue"], 11000);
    assert_eq!(body["orders"]["per_page"], 10);
    assert_eq!(body["orders"]["items"][0]["lines"][0]["refunded"], 0);
    assert_eq!(body["orders"]["items"][0]["lines"][0]["refundable"], 1);

    let (status, body) = app.admin("POST", "/admin/tables/t1/checkout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checked_out"], true);
    assert_eq!(app.api.resets.lock().unwrap().as_slice(), ["t1".to_string()]);

    let (_, body) = app.admin("GET", "/admin/tables/t1/orders", None).await;
    assert_eq!(body["order_count"], 0);

    let (status, _) = app.admin("GET", "/admin/tables/zzz/orders", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.admin("POST", "/admin/tables", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "t3");
}
