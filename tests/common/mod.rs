//! Shared fixtures: a freshly seeded in-memory store per test.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use recipe_box::db::{self, bootstrap, BootstrapOptions, BootstrapReport, Db, Dialect};
use recipe_box::{AppState, Config};
use sqlx::AnyPool;

pub const SECRET: &str = "integration-secret";
pub const USERNAME: &str = "chef";
pub const PASSWORD: &str = "mise en place";

pub fn seed_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("bootstrapping")
}

pub fn seed_options(force: bool) -> BootstrapOptions {
    BootstrapOptions {
        seed_dir: seed_dir(),
        force,
        hash_cost: 4,
    }
}

/// Empty in-memory SQLite pool.
pub async fn empty_pool() -> AnyPool {
    db::connect("sqlite::memory:").await.unwrap()
}

/// In-memory pool loaded from the bundled seed files.
pub async fn seeded_pool() -> AnyPool {
    let pool = empty_pool().await;
    let report = bootstrap(&pool, Dialect::Sqlite, &seed_options(false))
        .await
        .unwrap();
    assert!(matches!(report, BootstrapReport::Seeded(_)));
    pool
}

pub async fn seeded_db() -> Db {
    Db::new(seeded_pool().await)
}

pub fn test_config(debug: bool) -> Config {
    let mut config = Config::from_json(
        r#"{
            "db_dialect": "sqlite3",
            "db_dsn": "sqlite::memory:",
            "jwt_secret": "integration-secret",
            "allowed_origins": ["http://localhost:3000"],
            "bcrypt_cost": 4
        }"#,
    )
    .unwrap();
    config.debug = debug;
    config.validate().unwrap();
    config
}

pub async fn test_state(debug: bool) -> AppState {
    AppState::new(test_config(debug), seeded_db().await)
}

/// A seeded SQLite database in a temporary file, so the pool can hand out
/// several connections at once. The file is removed on drop.
pub struct FileStore {
    pub db: Db,
    path: PathBuf,
}

impl FileStore {
    pub async fn seeded(name: &str) -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "recipe-box-{name}-{}-{}.db",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_file(&path);

        let pool = db::connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        bootstrap(&pool, Dialect::Sqlite, &seed_options(false))
            .await
            .unwrap();

        Self {
            db: Db::new(pool),
            path,
        }
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        for suffix in ["", "-journal", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
