//! Catalog, inventory, restock and sales over HTTP.

use axum::http::StatusCode;
use serde_json::{Value, json};

use waterline_integration_tests::{Session, TestApp};

/// Create a category, item and supplier, then an inventory record.
async fn stock(app: &TestApp, admin: &Session, quantity: i32, price: &str) -> Value {
    let (_, category) = app
        .post("/api/catalog/categories", admin, &json!({ "name": "Pipes" }))
        .await;
    let (status, item) = app
        .post(
            "/api/catalog/items",
            admin,
            &json!({ "name": "PVC 2in", "parent_id": category["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, supplier) = app
        .post("/api/catalog/supplier", admin, &json!({ "name": "Acme Pipes" }))
        .await;

    let (status, record) = app
        .post(
            "/api/inventory",
            admin,
            &json!({
                "item_id": item["id"],
                "supplier_id": supplier["id"],
                "quantity": quantity,
                "price": price
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    record
}

fn sale(record: &Value, quantity: i32, selling_price: &str) -> Value {
    json!({
        "inventory_id": record["id"],
        "quantity_sold": quantity,
        "selling_price": selling_price
    })
}

#[tokio::test]
async fn test_sale_decrements_stock_and_records_profit() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let record = stock(&app, &admin, 10, "5.00").await;
    assert_eq!(record["amount"], "50.00");

    let (status, sold) = app.post("/api/sales", &admin, &sale(&record, 3, "8.00")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sold["quantity_sold"], 3);
    assert_eq!(sold["profit"], "9.00");
    assert_eq!(sold["sold_by"], admin.user_id.as_i32());

    let (_, after) = app
        .get(&format!("/api/inventory/{}", record["id"]), Some(&admin))
        .await;
    assert_eq!(after["quantity"], 7);

    let (_, sales) = app
        .get(&format!("/api/sales?inventory_id={}", record["id"]), Some(&admin))
        .await;
    assert_eq!(sales.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_unstorable_selling_price_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let record = stock(&app, &admin, 10, "5.00").await;

    for price in ["79228162514264337593543950335", "10000000000.00", "5.005"] {
        let (status, _) = app.post("/api/sales", &admin, &sale(&record, 2, price)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "selling price {price}");
    }

    let (_, after) = app
        .get(&format!("/api/inventory/{}", record["id"]), Some(&admin))
        .await;
    assert_eq!(after["quantity"], 10);
    let (_, sales) = app.get("/api/sales", Some(&admin)).await;
    assert_eq!(sales, json!([]));
}

#[tokio::test]
async fn test_oversell_is_a_conflict_and_changes_nothing() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let record = stock(&app, &admin, 10, "5.00").await;

    let (status, body) = app.post("/api/sales", &admin, &sale(&record, 11, "8.00")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "insufficient stock: requested 11, available 10");

    let (_, after) = app
        .get(&format!("/api/inventory/{}", record["id"]), Some(&admin))
        .await;
    assert_eq!(after["quantity"], 10);

    let (_, sales) = app.get("/api/sales", Some(&admin)).await;
    assert_eq!(sales, json!([]));
}

#[tokio::test]
async fn test_invalid_sale_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let record = stock(&app, &admin, 10, "5.00").await;

    let (status, _) = app.post("/api/sales", &admin, &sale(&record, 0, "8.00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/sales",
            &admin,
            &json!({ "inventory_id": 9999, "quantity_sold": 1, "selling_price": "8.00" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restock_adds_to_quantity() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let record = stock(&app, &admin, 10, "5.00").await;

    let (status, restocked) = app
        .put(
            &format!("/api/inventory/{}", record["id"]),
            &admin,
            &json!({ "quantity": 25, "price": "6.50", "supplier_id": record["supplier_id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restocked["quantity"], 35);
    assert_eq!(restocked["price"], "6.50");

    let (status, _) = app
        .put(
            &format!("/api/inventory/{}", record["id"]),
            &admin,
            &json!({ "quantity": -5, "price": "6.50", "supplier_id": record["supplier_id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_referenced_catalog_entry_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let record = stock(&app, &admin, 1, "1.00").await;

    let (status, _) = app
        .delete(&format!("/api/catalog/items/{}", record["item_id"]), &admin)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.get("/api/catalog/pipes", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_writes_are_audited() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;
    let record = stock(&app, &admin, 10, "5.00").await;
    app.post("/api/sales", &admin, &sale(&record, 1, "8.00")).await;

    let (status, entries) = app.get("/api/audit-logs?limit=2", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let entries = entries.as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "sell");
    assert_eq!(entries[1]["action"], "create");
}
