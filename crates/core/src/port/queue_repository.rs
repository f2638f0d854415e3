// Queue Repository Port (read side)

use crate::domain::{EntryId, EntryStatus, Position, QueueEntry, QueueItem, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to queue entries.
///
/// Mutations go through [`crate::port::TransactionalQueueRepository`]; nothing
/// here writes `position`.
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Find entry by ID regardless of status
    async fn find_by_id(&self, id: EntryId) -> Result<Option<QueueEntry>>;

    /// Waiting entries of one user, ordered by position, with service data
    async fn list_waiting_for_user(&self, user_id: UserId) -> Result<Vec<QueueItem>>;

    /// All waiting entries, ordered by position, with service and client data
    async fn list_waiting(&self) -> Result<Vec<QueueItem>>;

    /// Positions of all waiting entries, ascending
    async fn waiting_positions(&self) -> Result<Vec<Position>>;

    /// Count entries by status
    async fn count_by_status(&self, status: EntryStatus) -> Result<i64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{
        ClientInfo, NewQueueEntry, PositionAssignment, Service, ServiceId, User,
    };
    use crate::error::AppError;
    use crate::port::transaction::{QueueTransaction, Transaction, TransactionalQueueRepository};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::{Mutex, OwnedMutexGuard};

    #[derive(Debug, Clone, Default)]
    struct StoreState {
        entries: Vec<QueueEntry>,
        next_id: EntryId,
    }

    impl StoreState {
        fn waiting_sorted(&self) -> Vec<&QueueEntry> {
            let mut waiting: Vec<&QueueEntry> =
                self.entries.iter().filter(|e| e.is_waiting()).collect();
            waiting.sort_by_key(|e| e.position);
            waiting
        }

        /// Mirrors the store's unique index on waiting positions
        fn check_unique_positions(&self) -> Result<()> {
            let mut seen = HashSet::new();
            for entry in self.entries.iter().filter(|e| e.is_waiting()) {
                if !seen.insert(entry.position) {
                    return Err(AppError::Database(format!(
                        "Unique constraint violation: waiting position {}",
                        entry.position
                    )));
                }
            }
            Ok(())
        }
    }

    /// In-memory transactional queue store.
    ///
    /// A transaction holds the store lock from `begin_transaction` until commit
    /// or drop, so writers serialize the same way they do on a real database
    /// write lock. Changes are made on a working copy and published on commit.
    pub struct InMemoryQueueStore {
        state: Arc<Mutex<StoreState>>,
        services: HashMap<ServiceId, Service>,
        users: HashMap<UserId, User>,
        unavailable: Arc<AtomicBool>,
        fail_commits: Arc<AtomicBool>,
    }

    impl Default for InMemoryQueueStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl InMemoryQueueStore {
        pub fn new() -> Self {
            Self {
                state: Arc::new(Mutex::new(StoreState {
                    entries: Vec::new(),
                    next_id: 1,
                })),
                services: HashMap::new(),
                users: HashMap::new(),
                unavailable: Arc::new(AtomicBool::new(false)),
                fail_commits: Arc::new(AtomicBool::new(false)),
            }
        }

        /// Register a service for display joins
        pub fn with_service(mut self, service: Service) -> Self {
            self.services.insert(service.id, service);
            self
        }

        /// Register a user for board display joins
        pub fn with_user(mut self, user: User) -> Self {
            self.users.insert(user.id, user);
            self
        }

        /// Simulate connectivity loss: every call fails with a database error
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Simulate a crash at commit time: commits fail and nothing is published
        pub fn set_fail_commits(&self, fail: bool) {
            self.fail_commits.store(fail, Ordering::SeqCst);
        }

        /// Snapshot of every entry, including terminal ones
        pub async fn entries(&self) -> Vec<QueueEntry> {
            self.state.lock().await.entries.clone()
        }

        fn check_available(&self) -> Result<()> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(AppError::Database("Store unavailable".to_string()));
            }
            Ok(())
        }

        fn to_item(&self, entry: &QueueEntry, with_client: bool) -> QueueItem {
            let (service_name, duration_minutes, price_cents) =
                match self.services.get(&entry.service_id) {
                    Some(s) => (s.name.clone(), s.duration_minutes, s.price_cents),
                    None => (format!("service-{}", entry.service_id), 0, 0),
                };
            let client = with_client.then(|| match self.users.get(&entry.user_id) {
                Some(u) => ClientInfo {
                    full_name: u.full_name.clone(),
                    username: u.username.clone(),
                },
                None => ClientInfo {
                    full_name: format!("user-{}", entry.user_id),
                    username: None,
                },
            });
            QueueItem {
                entry: entry.clone(),
                service_name,
                duration_minutes,
                price_cents,
                client,
            }
        }
    }

    #[async_trait]
    impl QueueRepository for InMemoryQueueStore {
        async fn find_by_id(&self, id: EntryId) -> Result<Option<QueueEntry>> {
            self.check_available()?;
            let state = self.state.lock().await;
            Ok(state.entries.iter().find(|e| e.id == id).cloned())
        }

        async fn list_waiting_for_user(&self, user_id: UserId) -> Result<Vec<QueueItem>> {
            self.check_available()?;
            let state = self.state.lock().await;
            Ok(state
                .waiting_sorted()
                .into_iter()
                .filter(|e| e.user_id == user_id)
                .map(|e| self.to_item(e, false))
                .collect())
        }

        async fn list_waiting(&self) -> Result<Vec<QueueItem>> {
            self.check_available()?;
            let state = self.state.lock().await;
            Ok(state
                .waiting_sorted()
                .into_iter()
                .map(|e| self.to_item(e, true))
                .collect())
        }

        async fn waiting_positions(&self) -> Result<Vec<Position>> {
            self.check_available()?;
            let state = self.state.lock().await;
            Ok(state.waiting_sorted().iter().map(|e| e.position).collect())
        }

        async fn count_by_status(&self, status: EntryStatus) -> Result<i64> {
            self.check_available()?;
            let state = self.state.lock().await;
            Ok(state.entries.iter().filter(|e| e.status == status).count() as i64)
        }
    }

    #[async_trait]
    impl TransactionalQueueRepository for InMemoryQueueStore {
        async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>> {
            self.check_available()?;
            let guard = Arc::clone(&self.state).lock_owned().await;
            let working = guard.clone();
            Ok(Box::new(InMemoryTransaction {
                guard,
                working,
                fail_commits: Arc::clone(&self.fail_commits),
            }))
        }
    }

    struct InMemoryTransaction {
        guard: OwnedMutexGuard<StoreState>,
        working: StoreState,
        fail_commits: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Transaction for InMemoryTransaction {
        async fn commit(self: Box<Self>) -> Result<()> {
            if self.fail_commits.load(Ordering::SeqCst) {
                return Err(AppError::Database("Commit failed".to_string()));
            }
            let InMemoryTransaction {
                mut guard, working, ..
            } = *self;
            *guard = working;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl QueueTransaction for InMemoryTransaction {
        async fn max_waiting_position(&mut self) -> Result<Option<Position>> {
            Ok(self
                .working
                .entries
                .iter()
                .filter(|e| e.is_waiting())
                .map(|e| e.position)
                .max())
        }

        async fn insert(&mut self, entry: &NewQueueEntry) -> Result<EntryId> {
            let id = self.working.next_id;
            self.working.next_id += 1;
            self.working.entries.push(QueueEntry {
                id,
                user_id: entry.user_id,
                service_id: entry.service_id,
                scheduled_time: entry.scheduled_time,
                status: EntryStatus::Waiting,
                position: entry.position,
                created_at: entry.created_at,
            });
            self.working.check_unique_positions()?;
            Ok(id)
        }

        async fn find_by_id(&mut self, id: EntryId) -> Result<Option<QueueEntry>> {
            Ok(self.working.entries.iter().find(|e| e.id == id).cloned())
        }

        async fn find_waiting_at(&mut self, position: Position) -> Result<Option<EntryId>> {
            Ok(self
                .working
                .entries
                .iter()
                .find(|e| e.is_waiting() && e.position == position)
                .map(|e| e.id))
        }

        async fn update_status(
            &mut self,
            id: EntryId,
            from: EntryStatus,
            to: EntryStatus,
        ) -> Result<bool> {
            match self
                .working
                .entries
                .iter_mut()
                .find(|e| e.id == id && e.status == from)
            {
                Some(entry) => {
                    entry.status = to;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn waiting_positions(&mut self) -> Result<Vec<(EntryId, Position)>> {
            Ok(self
                .working
                .waiting_sorted()
                .iter()
                .map(|e| (e.id, e.position))
                .collect())
        }

        async fn assign_positions(&mut self, assignments: &[PositionAssignment]) -> Result<()> {
            for a in assignments {
                if let Some(entry) = self
                    .working
                    .entries
                    .iter_mut()
                    .find(|e| e.id == a.entry_id && e.is_waiting())
                {
                    entry.position = a.position;
                }
            }
            self.working.check_unique_positions()
        }
    }
}
