//! API integration tests
//!
//! These run against a live server at localhost:8080. Provision the
//! fixture accounts first with `cargo run --bin seed`:
//! admin@example.org/admin (superuser), alice@example.org/alice,
//! bob@example.org/bob and carol@example.org/carol (regular users).

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in and get a bearer token
async fn get_token(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_token(client: &Client) -> String {
    get_token(client, "admin@example.org", "admin").await
}

/// Create a book as admin and return its id
async fn create_book(client: &Client, token: &str, title: &str, count: i64) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "count": count
        }))
        .send()
        .await
        .expect("Failed to send create request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

async fn borrow(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send borrow request")
}

async fn return_book(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send return request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_seeded_users_can_login() {
    let client = Client::new();

    for (email, password) in [
        ("admin@example.org", "admin"),
        ("alice@example.org", "alice"),
        ("bob@example.org", "bob"),
        ("carol@example.org", "carol"),
    ] {
        let response = client
            .post(format!("{}/auth/login", BASE_URL))
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to send request");

        assert!(
            response.status().is_success(),
            "login failed for {}",
            email
        );

        let body: Value = response.json().await.expect("Failed to parse response");
        assert!(body["token"].is_string());
        assert_eq!(body["token_type"], "Bearer");
    }
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@example.org",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "admin@example.org");
    assert_eq!(body["is_superuser"], true);
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_superuser() {
    let client = Client::new();
    let token = get_token(&client, "alice@example.org", "alice").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"title": "Forbidden", "count": 1}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_book_rejects_bad_input() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"title": "", "count": 1}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"title": "Negative", "count": -3}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_update_book_can_clear_description() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "title": "Annotated",
            "description": "First edition",
            "count": 1
        }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.unwrap();
    let book_id = book["id"].as_i64().unwrap();

    // Omitting the field leaves the description untouched
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin)
        .json(&json!({"count": 2}))
        .send()
        .await
        .expect("Failed to send update request");
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["description"], "First edition");
    assert_eq!(book["count"], 2);

    // An explicit null clears it
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin)
        .json(&json!({"description": null}))
        .send()
        .await
        .expect("Failed to send update request");
    let book: Value = response.json().await.unwrap();
    assert!(book["description"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_borrow_with_no_copies_fails() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let alice = get_token(&client, "alice@example.org", "alice").await;

    let book_id = create_book(&client, &admin, "Out of stock", 0).await;

    let response = borrow(&client, &alice, book_id).await;
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "no_copies_available");

    // Count unchanged
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["count"], 0);
}

#[tokio::test]
#[ignore]
async fn test_return_without_borrow_fails() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let alice = get_token(&client, "alice@example.org", "alice").await;

    let book_id = create_book(&client, &admin, "Never borrowed", 2).await;

    let response = return_book(&client, &alice, book_id).await;
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "not_borrowed");
}

#[tokio::test]
#[ignore]
async fn test_borrow_then_return_restores_count() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let alice = get_token(&client, "alice@example.org", "alice").await;

    let book_id = create_book(&client, &admin, "Round trip", 3).await;

    let response = borrow(&client, &alice, book_id).await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["count"], 2);
    assert!(body["history"]["return_date"].is_null());

    let response = return_book(&client, &alice, book_id).await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["count"], 3);
    assert!(!body["history"]["return_date"].is_null());

    // A second return must fail: the only matching row is already closed
    let response = return_book(&client, &alice, book_id).await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_lending_scenario() {
    // create Dune with 2 copies, borrow as A and B, fail as C,
    // return as A, check A's history shows one closed row
    let client = Client::new();
    let admin = admin_token(&client).await;
    let alice = get_token(&client, "alice@example.org", "alice").await;
    let bob = get_token(&client, "bob@example.org", "bob").await;
    let carol = get_token(&client, "carol@example.org", "carol").await;

    let book_id = create_book(&client, &admin, "Dune", 2).await;

    let response = borrow(&client, &alice, book_id).await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["book"]["count"], 1);

    let response = borrow(&client, &bob, book_id).await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["book"]["count"], 0);

    let response = borrow(&client, &carol, book_id).await;
    assert_eq!(response.status(), 409);

    let response = return_book(&client, &alice, book_id).await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["book"]["count"], 1);

    // Alice's history for this book: exactly one row, closed
    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let alice_id = me["id"].as_i64().unwrap();

    let history: Value = client
        .get(format!("{}/users/{}/history", BASE_URL, alice_id))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let rows: Vec<&Value> = history
        .as_array()
        .unwrap()
        .iter()
        .filter(|row| row["book_id"].as_i64() == Some(book_id))
        .collect();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0]["return_date"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_history_access_policy() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let alice = get_token(&client, "alice@example.org", "alice").await;
    let bob = get_token(&client, "bob@example.org", "bob").await;

    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let alice_id = me["id"].as_i64().unwrap();

    // Alice can read her own history
    let response = client
        .get(format!("{}/users/{}/history", BASE_URL, alice_id))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // Bob cannot read Alice's history
    let response = client
        .get(format!("{}/users/{}/history", BASE_URL, alice_id))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // The superuser can
    let response = client
        .get(format!("{}/users/{}/history", BASE_URL, alice_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_of_last_copy() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let alice = get_token(&client, "alice@example.org", "alice").await;
    let bob = get_token(&client, "bob@example.org", "bob").await;

    let book_id = create_book(&client, &admin, "Last copy", 1).await;

    let (a, b) = tokio::join!(
        borrow(&client, &alice, book_id),
        borrow(&client, &bob, book_id)
    );

    let successes = [a.status(), b.status()]
        .iter()
        .filter(|s| s.is_success())
        .count();
    assert_eq!(successes, 1, "exactly one borrow must win the last copy");

    // Count never goes below zero
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["count"], 0);
}

#[tokio::test]
#[ignore]
async fn test_list_books_filters_by_owner() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let alice = get_token(&client, "alice@example.org", "alice").await;

    create_book(&client, &admin, "Admin's book", 1).await;

    // Alice created no books, so her listing contains none of admin's
    let books: Value = client
        .get(format!("{}/books?skip=0&limit=50", BASE_URL))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for book in books.as_array().unwrap() {
        assert_eq!(book["author"], "alice@example.org");
    }
}
