use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{delete, get, post},
    Form, Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use billing_console::api::{ApiError, BillingClient, INSUFFICIENT_BALANCE};
use billing_console::invoice_form::CreateInvoiceRequest;
use billing_console::models::{Credentials, CustomerDraft, PaymentStatus, StatKey};
use billing_console::session::Role;

/// Serve `router` on an ephemeral port and point a client at it
async fn serve(router: Router) -> BillingClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    BillingClient::new(&format!("http://{addr}/")).unwrap()
}

fn invoice_json(id: i64, customer: i64, status: &str) -> Value {
    json!({
        "id": id,
        "customer": { "id": customer, "name": "Meera", "email": "meera@example.com" },
        "totalAmount": 99.5,
        "invoiceDate": "2024-03-01T10:00:00",
        "paymentStatus": status,
        "paymentDate": null
    })
}

#[tokio::test]
async fn duplicate_customer_email_is_a_conflict() {
    let router = Router::new().route(
        "/api/users/createCustomer",
        post(|| async { (StatusCode::CONFLICT, Json(json!({ "message": "Email already exists" }))) }),
    );
    let client = serve(router).await;

    let draft = CustomerDraft {
        name: "Asha".into(),
        email: "taken@example.com".into(),
        city: "Pune".into(),
        mobile_number: "98200".into(),
        password: "secret".into(),
    };
    match client.create_customer(&draft).await {
        Err(ApiError::Conflict(message)) => assert_eq!(message, "Email already exists"),
        other => panic!("expected a conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn insufficient_balance_is_refused_whatever_the_status() {
    let router = Router::new()
        .route(
            "/wallet",
            post(|Query(params): Query<HashMap<String, String>>| async move {
                let status = match params.get("invoiceId").map(String::as_str) {
                    Some("1") => StatusCode::OK,
                    Some("2") => StatusCode::BAD_REQUEST,
                    _ => return (StatusCode::OK, Json(json!({ "message": "Payment successful" }))),
                };
                (status, Json(json!({ "message": INSUFFICIENT_BALANCE })))
            }),
        );
    let client = serve(router).await;

    for invoice_id in [1, 2] {
        match client.pay_invoice(42, invoice_id).await {
            Err(ApiError::InsufficientBalance(message)) => {
                assert!(message.contains(INSUFFICIENT_BALANCE))
            }
            other => panic!("invoice {invoice_id}: expected a refusal, got {other:?}"),
        }
    }

    let receipt = client.pay_invoice(42, 3).await.unwrap();
    assert_eq!(receipt.message, "Payment successful");
}

#[tokio::test]
async fn customer_invoices_come_from_the_customer_path() {
    let router = Router::new().route(
        "/invoice/{id}",
        get(|Path(id): Path<String>| async move {
            if id == "42" {
                Json(json!([invoice_json(8, 42, "Unpaid"), invoice_json(9, 42, "Paid")]))
            } else {
                Json(json!({ "message": "No invoices found" }))
            }
        }),
    );
    let client = serve(router).await;

    let invoices = client.customer_invoices("42").await.unwrap();
    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[0].customer.id, 42);
    assert_eq!(invoices[0].payment_status, PaymentStatus::Unpaid);
    assert_eq!(invoices[0].total_amount, Decimal::new(995, 1));
    assert!(invoices[1].is_paid());

    match client.customer_invoices("7").await {
        Err(ApiError::Status { message, .. }) => assert_eq!(message, "No invoices found"),
        other => panic!("expected the server message, got {other:?}"),
    }
}

#[tokio::test]
async fn create_invoice_posts_comma_joined_form_fields() {
    let seen = Arc::new(Mutex::new(None));
    let store = seen.clone();
    let router = Router::new().route(
        "/api/accountant/createInvoice",
        post(move |Form(body): Form<HashMap<String, String>>| {
            let store = store.clone();
            async move {
                *store.lock().unwrap() = Some(body);
                Json(json!({ "id": 77, "totalAmount": 25.5 }))
            }
        }),
    );
    let client = serve(router).await;

    let ack = client
        .create_invoice(&CreateInvoiceRequest {
            customer_id: 5,
            product_ids: vec![3, 4],
            quantities: vec![2, 1],
        })
        .await
        .unwrap();
    assert_eq!(ack.id, Some(77));

    let body = seen.lock().unwrap().clone().unwrap();
    assert_eq!(body["customerId"], "5");
    assert_eq!(body["productIds"], "3,4");
    assert_eq!(body["quantities"], "2,1");
}

#[tokio::test]
async fn create_invoice_accepts_a_bare_acknowledgement() {
    let router = Router::new().route("/api/accountant/createInvoice", post(|| async { "created" }));
    let client = serve(router).await;

    let ack = client
        .create_invoice(&CreateInvoiceRequest {
            customer_id: 5,
            product_ids: vec![3],
            quantities: vec![1],
        })
        .await
        .unwrap();
    assert_eq!(ack.id, None);
}

#[tokio::test]
async fn login_returns_role_and_id() {
    let router = Router::new().route(
        "/api/admin/login",
        post(|Json(body): Json<Value>| async move {
            if body["password"] == "right" {
                (StatusCode::OK, Json(json!({ "role": "ROLE_ADMIN", "id": 1 })))
            } else {
                (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Bad credentials" })))
            }
        }),
    );
    let client = serve(router).await;

    let response = client
        .login(
            Role::Admin,
            &Credentials {
                email: "admin@example.com".into(),
                password: "right".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(response.role.as_deref(), Some("ROLE_ADMIN"));
    assert_eq!(response.id, "1");

    let refused = client
        .login(
            Role::Admin,
            &Credentials {
                email: "admin@example.com".into(),
                password: "wrong".into(),
            },
        )
        .await;
    assert!(matches!(refused, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn stats_accept_numbers_and_quoted_numbers() {
    let router = Router::new()
        .route("/analysis/totalSales", get(|| async { Json(json!(1234.5)) }))
        .route("/analysis/countCustomer", get(|| async { Json(json!("42")) }))
        .route(
            "/analysis/countProducts",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
    let client = serve(router).await;

    assert_eq!(client.stat(StatKey::TotalSales).await.unwrap(), Decimal::new(12345, 1));
    assert_eq!(client.stat(StatKey::CustomerCount).await.unwrap(), Decimal::from(42));
    assert!(matches!(
        client.stat(StatKey::ProductCount).await,
        Err(ApiError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn delete_product_targets_the_id() {
    let seen = Arc::new(Mutex::new(None));
    let store = seen.clone();
    let router = Router::new().route(
        "/api/admin/deleteProduct/{id}",
        delete(move |Path(id): Path<i64>| {
            let store = store.clone();
            async move {
                *store.lock().unwrap() = Some(id);
                StatusCode::OK
            }
        }),
    );
    let client = serve(router).await;

    client.delete_product(7).await.unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(7));
}

#[tokio::test]
async fn daily_sales_come_back_in_order() {
    let router = Router::new().route(
        "/analysis/dailySales",
        get(|| async {
            Json(json!([
                { "date": "2024-03-01", "sales": 1250.5 },
                { "date": "2024-03-02", "sales": 0 }
            ]))
        }),
    );
    let client = serve(router).await;

    let days = client.daily_sales().await.unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].date, "2024-03-01");
    assert_eq!(days[0].sales, Decimal::new(12505, 1));
    assert_eq!(days[1].sales, Decimal::ZERO);
}

#[tokio::test]
async fn daily_sales_failure_is_reported() {
    let router = Router::new().route(
        "/analysis/dailySales",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let client = serve(router).await;

    assert!(matches!(
        client.daily_sales().await,
        Err(ApiError::Status { status: 500, .. })
    ));
}
