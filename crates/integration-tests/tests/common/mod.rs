//! Shared fixtures: a fully wired SQLite stack

#![allow(dead_code)]

use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use waitline_core::application::{EnqueueRequest, QueueService};
use waitline_core::domain::{EntryId, NewService, NewUser, Position, ServiceId, UserId};
use waitline_core::port::time_provider::FixedTimeProvider;
use waitline_core::port::{QueueRepository, ServiceCatalog, UserDirectory};
use waitline_infra_sqlite::{
    create_pool, run_migrations, SqliteQueueRepository, SqliteServiceCatalog,
    SqliteUserDirectory,
};

/// 2026-03-10 08:00 UTC
pub const NOW: i64 = 1_773_129_600_000;

pub struct Stack {
    pub pool: SqlitePool,
    pub repo: Arc<SqliteQueueRepository>,
    pub queue: Arc<QueueService>,
    pub directory: Arc<SqliteUserDirectory>,
    pub catalog: Arc<SqliteServiceCatalog>,
    pub clock: Arc<FixedTimeProvider>,
    /// Removed with its WAL side files on drop
    db_file: Option<PathBuf>,
}

impl Drop for Stack {
    fn drop(&mut self) {
        if let Some(path) = &self.db_file {
            for suffix in ["", "-wal", "-shm"] {
                let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
            }
        }
    }
}

impl Stack {
    /// Single-process store shared by the pool's connections
    pub async fn in_memory() -> Stack {
        Self::connect("sqlite::memory:", None).await
    }

    /// On-disk store, needed when several connections must write concurrently
    pub async fn on_disk() -> Stack {
        let path =
            std::env::temp_dir().join(format!("waitline-test-{}.db", uuid::Uuid::new_v4()));
        let url = path.to_string_lossy().into_owned();
        Self::connect(&url, Some(path)).await
    }

    async fn connect(url: &str, db_file: Option<PathBuf>) -> Stack {
        let pool = create_pool(url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let clock = Arc::new(FixedTimeProvider(NOW));
        let repo = Arc::new(SqliteQueueRepository::new(pool.clone()));
        let queue = Arc::new(QueueService::new(
            repo.clone(),
            repo.clone(),
            clock.clone(),
        ));

        Stack {
            directory: Arc::new(SqliteUserDirectory::new(pool.clone(), clock.clone())),
            catalog: Arc::new(SqliteServiceCatalog::new(pool.clone(), clock.clone())),
            pool,
            repo,
            queue,
            clock,
            db_file,
        }
    }

    /// Path of the on-disk database, if any
    pub fn db_url(&self) -> Option<String> {
        self.db_file
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
    }

    pub async fn user(&self, external_id: i64, full_name: &str) -> UserId {
        self.directory
            .register(&NewUser {
                external_id,
                username: None,
                full_name: full_name.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn service(&self, name: &str) -> ServiceId {
        self.catalog
            .create(&NewService {
                name: name.to_string(),
                duration_minutes: 30,
                price_cents: 2500,
            })
            .await
            .unwrap()
    }

    pub async fn enqueue(&self, user_id: UserId, service_id: ServiceId) -> EntryId {
        self.queue
            .enqueue(EnqueueRequest {
                user_id,
                service_id,
                scheduled_time: NOW + 3_600_000,
            })
            .await
            .unwrap()
    }

    pub async fn position_of(&self, entry_id: EntryId) -> Position {
        self.repo
            .find_by_id(entry_id)
            .await
            .unwrap()
            .unwrap()
            .position
    }

    /// Entry ids of every waiting entry, in serve order
    pub async fn serve_order(&self) -> Vec<EntryId> {
        self.queue
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.entry.id)
            .collect()
    }

    pub async fn assert_contiguous(&self) {
        let positions = self.repo.waiting_positions().await.unwrap();
        let expected: Vec<Position> = (1..=positions.len() as Position).collect();
        assert_eq!(positions, expected, "waiting positions must be exactly 1..N");
    }
}
