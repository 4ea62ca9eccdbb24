//! Seed development users
//!
//! Inserts the fixture accounts the integration tests authenticate as:
//! one superuser (admin@example.org/admin) and three regular users
//! (alice, bob, carol @example.org, password = local part). Idempotent;
//! existing accounts are updated in place.
//!
//! Usage: cargo run --bin seed

use sqlx::postgres::PgPoolOptions;

use booklend_server::{config::AppConfig, services::auth::AuthService};

const USERS: &[(&str, &str, &str, bool)] = &[
    ("admin@example.org", "admin", "Admin", true),
    ("alice@example.org", "alice", "Alice", false),
    ("bob@example.org", "bob", "Bob", false),
    ("carol@example.org", "carol", "Carol", false),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    for &(email, password, full_name, is_superuser) in USERS {
        let hashed = AuthService::hash_password(password)?;

        sqlx::query(
            r#"
            INSERT INTO users (email, hashed_password, full_name, is_superuser, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (email) DO UPDATE
            SET hashed_password = EXCLUDED.hashed_password,
                full_name = EXCLUDED.full_name,
                is_superuser = EXCLUDED.is_superuser,
                is_active = TRUE
            "#,
        )
        .bind(email)
        .bind(&hashed)
        .bind(full_name)
        .bind(is_superuser)
        .execute(&pool)
        .await?;

        println!("seeded {}", email);
    }

    Ok(())
}
