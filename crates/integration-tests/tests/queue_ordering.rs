//! Queue ordering against the SQLite store
//!
//! Each test drives `QueueService` end to end and checks positions as
//! persisted, not as computed.

mod common;

use common::Stack;
use waitline_core::application::EnqueueRequest;
use waitline_core::domain::{Direction, EntryStatus, Outcome, Rejection, Termination};
use waitline_core::port::QueueRepository;

#[tokio::test]
async fn test_enqueue_appends_at_end() {
    let stack = Stack::in_memory().await;
    let user = stack.user(1, "Anna").await;
    let haircut = stack.service("Haircut").await;

    let first = stack.enqueue(user, haircut).await;
    let second = stack.enqueue(user, haircut).await;
    let third = stack.enqueue(user, haircut).await;

    assert_eq!(stack.position_of(first).await, 1);
    assert_eq!(stack.position_of(second).await, 2);
    assert_eq!(stack.position_of(third).await, 3);
    stack.assert_contiguous().await;
}

#[tokio::test]
async fn test_complete_compacts_following_entries() {
    let stack = Stack::in_memory().await;
    let user = stack.user(1, "Anna").await;
    let haircut = stack.service("Haircut").await;
    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(stack.enqueue(user, haircut).await);
    }

    let outcome = stack
        .queue
        .set_status(ids[1], Termination::Completed)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);

    assert_eq!(stack.position_of(ids[0]).await, 1);
    assert_eq!(stack.position_of(ids[2]).await, 2);
    assert_eq!(stack.position_of(ids[3]).await, 3);
    let done = stack.repo.find_by_id(ids[1]).await.unwrap().unwrap();
    assert_eq!(done.status, EntryStatus::Completed);
    stack.assert_contiguous().await;
}

#[tokio::test]
async fn test_enqueue_after_termination_continues_from_n() {
    let stack = Stack::in_memory().await;
    let user = stack.user(1, "Anna").await;
    let haircut = stack.service("Haircut").await;
    let first = stack.enqueue(user, haircut).await;
    stack.enqueue(user, haircut).await;

    stack
        .queue
        .set_status(first, Termination::Cancelled)
        .await
        .unwrap();
    let late = stack.enqueue(user, haircut).await;

    assert_eq!(stack.position_of(late).await, 2);
    stack.assert_contiguous().await;
}

#[tokio::test]
async fn test_move_swaps_neighbours() {
    let stack = Stack::in_memory().await;
    let user = stack.user(1, "Anna").await;
    let haircut = stack.service("Haircut").await;
    let a = stack.enqueue(user, haircut).await;
    let b = stack.enqueue(user, haircut).await;
    let c = stack.enqueue(user, haircut).await;

    let outcome = stack.queue.move_entry(b, Direction::Up).await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(stack.serve_order().await, vec![b, a, c]);

    let outcome = stack.queue.move_entry(b, Direction::Down).await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(stack.serve_order().await, vec![a, b, c]);
    stack.assert_contiguous().await;
}

#[tokio::test]
async fn test_move_past_either_end_is_rejected() {
    let stack = Stack::in_memory().await;
    let user = stack.user(1, "Anna").await;
    let haircut = stack.service("Haircut").await;
    let a = stack.enqueue(user, haircut).await;
    let b = stack.enqueue(user, haircut).await;

    assert_eq!(
        stack.queue.move_entry(a, Direction::Up).await.unwrap(),
        Outcome::Rejected(Rejection::AlreadyFirst)
    );
    assert_eq!(
        stack.queue.move_entry(b, Direction::Down).await.unwrap(),
        Outcome::Rejected(Rejection::AlreadyLast)
    );
    assert_eq!(stack.serve_order().await, vec![a, b]);
}

#[tokio::test]
async fn test_cancel_by_owner_checks_ownership() {
    let stack = Stack::in_memory().await;
    let anna = stack.user(1, "Anna").await;
    let boris = stack.user(2, "Boris").await;
    let haircut = stack.service("Haircut").await;
    let entry = stack.enqueue(anna, haircut).await;

    assert_eq!(
        stack.queue.cancel_by_owner(entry, boris).await.unwrap(),
        Outcome::Rejected(Rejection::NotOwner)
    );
    let untouched = stack.repo.find_by_id(entry).await.unwrap().unwrap();
    assert_eq!(untouched.status, EntryStatus::Waiting);
    assert_eq!(untouched.position, 1);

    assert!(stack
        .queue
        .cancel_by_owner(entry, anna)
        .await
        .unwrap()
        .is_applied());
    assert_eq!(
        stack.queue.cancel_by_owner(entry, anna).await.unwrap(),
        Outcome::Rejected(Rejection::NotWaiting)
    );
}

#[tokio::test]
async fn test_terminal_status_rules() {
    let stack = Stack::in_memory().await;
    let user = stack.user(1, "Anna").await;
    let haircut = stack.service("Haircut").await;
    let entry = stack.enqueue(user, haircut).await;

    assert!(stack
        .queue
        .set_status(entry, Termination::Completed)
        .await
        .unwrap()
        .is_applied());
    // Repeating the same terminal status is a no-op, switching is not allowed
    assert!(stack
        .queue
        .set_status(entry, Termination::Completed)
        .await
        .unwrap()
        .is_applied());
    assert_eq!(
        stack
            .queue
            .set_status(entry, Termination::Cancelled)
            .await
            .unwrap(),
        Outcome::Rejected(Rejection::NotWaiting)
    );
    assert_eq!(
        stack
            .queue
            .set_status(9999, Termination::Completed)
            .await
            .unwrap(),
        Outcome::Rejected(Rejection::EntryNotFound)
    );
}

#[tokio::test]
async fn test_listings_are_ordered_and_scoped() {
    let stack = Stack::in_memory().await;
    let anna = stack.user(1, "Anna").await;
    let boris = stack.user(2, "Boris").await;
    let haircut = stack.service("Haircut").await;
    let a1 = stack.enqueue(anna, haircut).await;
    let b1 = stack.enqueue(boris, haircut).await;
    let a2 = stack.enqueue(anna, haircut).await;

    stack.queue.move_entry(a2, Direction::Up).await.unwrap();

    let mine: Vec<_> = stack
        .queue
        .list_for_user(anna)
        .await
        .unwrap()
        .into_iter()
        .map(|item| (item.entry.id, item.entry.position))
        .collect();
    assert_eq!(mine, vec![(a1, 1), (a2, 2)]);

    let board = stack.queue.list_all().await.unwrap();
    let names: Vec<_> = board
        .iter()
        .map(|item| item.client.as_ref().unwrap().full_name.as_str())
        .collect();
    assert_eq!(names, vec!["Anna", "Anna", "Boris"]);
    assert_eq!(board[2].entry.id, b1);
}

#[tokio::test]
async fn test_verify_integrity_reports_counts_and_faults() {
    let stack = Stack::in_memory().await;
    let user = stack.user(1, "Anna").await;
    let haircut = stack.service("Haircut").await;
    let a = stack.enqueue(user, haircut).await;
    let b = stack.enqueue(user, haircut).await;
    stack.enqueue(user, haircut).await;
    stack.queue.set_status(a, Termination::Completed).await.unwrap();
    stack.queue.set_status(b, Termination::Cancelled).await.unwrap();

    let report = stack.queue.verify_integrity().await.unwrap();
    assert_eq!(report.waiting, 1);
    assert_eq!(report.completed, 1);
    assert_eq!(report.cancelled, 1);

    // Corrupt the store behind the service's back
    sqlx::query("UPDATE queue_entries SET position = 5 WHERE status = 'waiting'")
        .execute(&stack.pool)
        .await
        .unwrap();
    let err = stack.queue.verify_integrity().await.unwrap_err();
    assert!(err.is_integrity_fault());
}

#[tokio::test]
async fn test_enqueue_with_unknown_service_fails_without_gap() {
    let stack = Stack::in_memory().await;
    let user = stack.user(1, "Anna").await;
    let haircut = stack.service("Haircut").await;
    stack.enqueue(user, haircut).await;

    let err = stack
        .queue
        .enqueue(EnqueueRequest {
            user_id: user,
            service_id: 404,
            scheduled_time: common::NOW,
        })
        .await
        .unwrap_err();
    assert!(err.is_store_failure());

    let next = stack.enqueue(user, haircut).await;
    assert_eq!(stack.position_of(next).await, 2);
}

#[tokio::test]
async fn test_queue_survives_reopen() {
    let stack = Stack::on_disk().await;
    let user = stack.user(1, "Anna").await;
    let haircut = stack.service("Haircut").await;
    let a = stack.enqueue(user, haircut).await;
    let b = stack.enqueue(user, haircut).await;
    stack.queue.move_entry(b, Direction::Up).await.unwrap();

    // A second pool on the same file sees the committed order
    let url = stack.db_url().unwrap();
    let reopened = waitline_infra_sqlite::create_pool(&url).await.unwrap();
    let order: Vec<i64> = sqlx::query_scalar(
        "SELECT id FROM queue_entries WHERE status = 'waiting' ORDER BY position",
    )
    .fetch_all(&reopened)
    .await
    .unwrap();
    assert_eq!(order, vec![b, a]);
}
