//! Shared fixtures for the SQLite integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use pb_core::domain::entities::user::{NewUser, Role, User};
use pb_core::repositories::UserRepository;
use pb_infra::{DatabasePool, SqliteTokenRepository, SqliteUserRepository};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub struct TestDb {
    pub pool: DatabasePool,
    pub users: SqliteUserRepository,
    pub tokens: SqliteTokenRepository,
}

pub async fn setup() -> TestDb {
    let pool = DatabasePool::in_memory()
        .await
        .expect("in-memory database");

    TestDb {
        users: SqliteUserRepository::new(pool.get_pool().clone()),
        tokens: SqliteTokenRepository::new(pool.get_pool().clone()),
        pool,
    }
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        role: Role::User,
        hashed_password: "$2b$04$not-a-real-hash".to_string(),
        created_at: t0(),
    }
}

pub async fn seed_user(db: &TestDb, username: &str) -> User {
    db.users.create(new_user(username)).await.expect("seed user")
}
