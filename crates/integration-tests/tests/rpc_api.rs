//! JSON-RPC handlers and server over the SQLite stack

mod common;

use common::Stack;
use jsonrpsee::core::client::{ClientT, Error as ClientError};
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::HttpClientBuilder;
use serde_json::Value;
use waitline_api_rpc::error::code;
use waitline_api_rpc::types::{
    ActorRequest, CancelRequest, EmptyRequest, EnqueueRequest, MoveRequest, PromoteRequest,
    RegisterRequest, ServiceCreateRequest, SetStatusRequest,
};
use waitline_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use waitline_core::domain::{Direction, Rejection, Termination};

const STAFF: i64 = 42;
const CLIENT: i64 = 7;

fn handler(stack: &Stack) -> RpcHandler {
    RpcHandler::new(
        stack.queue.clone(),
        stack.directory.clone(),
        stack.catalog.clone(),
        stack.clock.clone(),
        [STAFF],
    )
}

async fn register(h: &RpcHandler, external_id: i64, full_name: &str) {
    h.register(RegisterRequest {
        external_id,
        username: None,
        full_name: full_name.to_string(),
    })
    .await
    .unwrap();
}

async fn create_service(h: &RpcHandler) -> i64 {
    h.create_service(ServiceCreateRequest {
        actor: STAFF,
        name: "Haircut".to_string(),
        duration_minutes: 30,
        price_cents: 2500,
    })
    .await
    .unwrap()
    .service_id
}

async fn enqueue(h: &RpcHandler, actor: i64, service_id: i64) -> i64 {
    h.enqueue(EnqueueRequest {
        actor,
        service_id,
        scheduled_time: common::NOW,
    })
    .await
    .unwrap()
    .entry_id
}

#[tokio::test]
async fn test_bootstrap_staff_promoted_on_register() {
    let stack = Stack::in_memory().await;
    let h = handler(&stack);

    let staff = h
        .register(RegisterRequest {
            external_id: STAFF,
            username: Some("boss".to_string()),
            full_name: "Boss".to_string(),
        })
        .await
        .unwrap();
    assert!(staff.is_staff);

    let client = h
        .register(RegisterRequest {
            external_id: CLIENT,
            username: None,
            full_name: "Client".to_string(),
        })
        .await
        .unwrap();
    assert!(!client.is_staff);
}

#[tokio::test]
async fn test_staff_methods_reject_clients() {
    let stack = Stack::in_memory().await;
    let h = handler(&stack);
    register(&h, CLIENT, "Client").await;

    let err = h
        .board(ActorRequest { actor: CLIENT })
        .await
        .unwrap_err();
    assert_eq!(err.code(), code::FORBIDDEN);

    let err = h
        .promote(PromoteRequest {
            actor: CLIENT,
            external_id: CLIENT,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), code::FORBIDDEN);
}

#[tokio::test]
async fn test_unregistered_actor_is_not_found() {
    let stack = Stack::in_memory().await;
    let h = handler(&stack);

    let err = h.my_entries(ActorRequest { actor: 555 }).await.unwrap_err();
    assert_eq!(err.code(), code::NOT_FOUND);
}

#[tokio::test]
async fn test_enqueue_unknown_service_is_not_found() {
    let stack = Stack::in_memory().await;
    let h = handler(&stack);
    register(&h, CLIENT, "Client").await;

    let err = h
        .enqueue(EnqueueRequest {
            actor: CLIENT,
            service_id: 404,
            scheduled_time: common::NOW,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), code::NOT_FOUND);
}

#[tokio::test]
async fn test_queue_flow_reports_reasons() {
    let stack = Stack::in_memory().await;
    let h = handler(&stack);
    register(&h, STAFF, "Boss").await;
    register(&h, CLIENT, "Client").await;
    let service_id = create_service(&h).await;

    let first = h
        .enqueue(EnqueueRequest {
            actor: CLIENT,
            service_id,
            scheduled_time: common::NOW,
        })
        .await
        .unwrap();
    assert_eq!(first.position, 1);
    let second = enqueue(&h, STAFF, service_id).await;

    let moved = h
        .move_entry(MoveRequest {
            actor: STAFF,
            entry_id: first.entry_id,
            direction: Direction::Up,
        })
        .await
        .unwrap();
    assert!(!moved.applied);
    assert_eq!(moved.reason, Some(Rejection::AlreadyFirst));

    // Client cannot cancel somebody else's entry
    let cancel = h
        .cancel(CancelRequest {
            actor: CLIENT,
            entry_id: second,
        })
        .await
        .unwrap();
    assert_eq!(cancel.reason, Some(Rejection::NotOwner));

    let done = h
        .set_status(SetStatusRequest {
            actor: STAFF,
            entry_id: first.entry_id,
            status: Termination::Completed,
        })
        .await
        .unwrap();
    assert!(done.applied);
    assert!(done.reason.is_none());

    let board = h.board(ActorRequest { actor: STAFF }).await.unwrap();
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].entry.id, second);
    assert_eq!(board.entries[0].entry.position, 1);

    let report = h.verify(ActorRequest { actor: STAFF }).await.unwrap();
    assert_eq!(report.waiting, 1);
    assert_eq!(report.completed, 1);
}

#[tokio::test]
async fn test_slots_come_from_clock() {
    let stack = Stack::in_memory().await;
    let h = handler(&stack);

    let slots = h.list_slots(EmptyRequest::default()).await.unwrap().slots;
    assert_eq!(slots.len(), 14);
    // Clock reads 08:00; the first slot is 09:00 the same day
    assert_eq!(slots[0], common::NOW + 3_600_000);
}

#[tokio::test]
async fn test_store_failure_is_generic() {
    let stack = Stack::in_memory().await;
    let h = handler(&stack);
    register(&h, CLIENT, "Client").await;
    stack.pool.close().await;

    let err = h.my_entries(ActorRequest { actor: CLIENT }).await.unwrap_err();
    assert_eq!(err.code(), code::OPERATION_FAILED);
    assert_eq!(err.message(), "operation failed");
}

#[tokio::test]
async fn test_server_round_trip() {
    let stack = Stack::in_memory().await;
    let config = RpcServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let (addr, server) = RpcServer::new(config, handler(&stack)).start().await.unwrap();
    let client = HttpClientBuilder::default()
        .build(format!("http://{}", addr))
        .unwrap();

    let mut params = ObjectParams::new();
    params.insert("external_id", STAFF).unwrap();
    params.insert("full_name", "Boss").unwrap();
    let user: Value = client.request("user.register.v1", params).await.unwrap();
    assert_eq!(user["is_staff"], true);

    let mut params = ObjectParams::new();
    params.insert("actor", STAFF).unwrap();
    params.insert("name", "Shave").unwrap();
    params.insert("duration_minutes", 20).unwrap();
    params.insert("price_cents", 1500).unwrap();
    let created: Value = client.request("service.create.v1", params).await.unwrap();
    let service_id = created["service_id"].as_i64().unwrap();

    let mut params = ObjectParams::new();
    params.insert("actor", STAFF).unwrap();
    params.insert("service_id", service_id).unwrap();
    params.insert("scheduled_time", common::NOW).unwrap();
    let entry: Value = client.request("queue.enqueue.v1", params).await.unwrap();
    assert_eq!(entry["position"], 1);
    assert_eq!(entry["status"], "waiting");

    let mut params = ObjectParams::new();
    params.insert("actor", STAFF).unwrap();
    params.insert("entry_id", entry["entry_id"].clone()).unwrap();
    params.insert("direction", "down").unwrap();
    let moved: Value = client.request("queue.move.v1", params).await.unwrap();
    assert_eq!(moved["applied"], false);
    assert_eq!(moved["reason"], "already_last");

    let mut params = ObjectParams::new();
    params.insert("actor", STAFF).unwrap();
    params.insert("entry_id", entry["entry_id"].clone()).unwrap();
    params.insert("status", "waiting").unwrap();
    let err = client
        .request::<Value, _>("queue.set_status.v1", params)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Call(_)));

    server.stop().unwrap();
}

#[tokio::test]
async fn test_service_list_is_public() {
    let stack = Stack::in_memory().await;
    let h = handler(&stack);
    register(&h, STAFF, "Boss").await;
    create_service(&h).await;

    let services = h.list_services(EmptyRequest::default()).await.unwrap();
    assert_eq!(services.services.len(), 1);
    assert_eq!(services.services[0].name, "Haircut");
}
