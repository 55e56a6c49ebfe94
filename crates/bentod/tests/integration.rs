//! Integration tests for bentod
//!
//! These tests run the real IPC server and command handler on a temporary
//! socket and drive them through `RemoteStore`, the same way the terminal
//! front end does.

use bento_api::{Command, ErrorCode, ResponsePayload, ResponseResult};
use bento_core::{Dashboard, DashboardOptions, DashboardView, PlannerError, TodoChange};
use bento_ipc::{IpcClient, IpcServer, RemoteStore};
use bento_store::{JournalRepository, Repositories, SqliteStore, StoreError};
use bento_util::DateKey;
use bentod::{handle_message, CommandHandler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn day(d: u32) -> DateKey {
    DateKey::from_ymd(2024, 1, d).unwrap()
}

/// Start a bentod instance on a socket inside a fresh temp dir
async fn start_service() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("bento.sock");
    let db_path = dir.path().join("bento.db");

    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    let handler = CommandHandler::new(Repositories::from_backend(store));

    let mut ipc = IpcServer::new(&socket_path);
    ipc.start().await.unwrap();
    let mut messages = ipc.take_message_receiver().await.unwrap();
    let ipc = Arc::new(ipc);

    let accept = ipc.clone();
    tokio::spawn(async move {
        let _ = accept.run().await;
    });

    tokio::spawn(async move {
        while let Some(msg) = messages.recv().await {
            handle_message(&handler, &ipc, msg).await;
        }
    });

    (dir, socket_path)
}

async fn remote_dashboard(socket_path: &Path) -> (Arc<RemoteStore>, Dashboard) {
    let remote = Arc::new(RemoteStore::connect(socket_path).await.unwrap());
    let dashboard = Dashboard::new(
        Repositories::from_backend(remote.clone()),
        DashboardOptions::default(),
    )
    .with_today(day(1));
    (remote, dashboard)
}

#[tokio::test]
async fn test_ping() {
    let (_dir, socket_path) = start_service().await;
    let remote = RemoteStore::connect(&socket_path).await.unwrap();
    remote.ping().await.unwrap();
}

#[tokio::test]
async fn test_task_scenario_over_ipc() {
    let (_dir, socket_path) = start_service().await;
    let (_remote, mut dash) = remote_dashboard(&socket_path).await;

    dash.register("u1@example.com", "password").await.unwrap();

    let TodoChange::Created(todo) = dash.add_todo("Buy milk").await.unwrap() else {
        panic!("expected a created todo");
    };
    assert_eq!(dash.visible_todos().len(), 1);
    assert!(!dash.visible_todos()[0].completed);

    assert!(dash.toggle_todo(&todo.id).await.unwrap().completed);

    dash.begin_edit(&todo.id).unwrap();
    dash.add_todo("Buy oat milk").await.unwrap();
    assert_eq!(dash.visible_todos()[0].text, "Buy oat milk");
    assert_eq!(dash.visible_todos()[0].id, todo.id);

    dash.delete_todo(&todo.id).await.unwrap();
    assert!(dash.visible_todos().is_empty());
    assert!(dash.take_notices().is_empty());
}

#[tokio::test]
async fn test_journal_scenario_over_ipc() {
    let (_dir, socket_path) = start_service().await;
    let (remote, mut dash) = remote_dashboard(&socket_path).await;

    dash.register("u1@example.com", "password").await.unwrap();
    dash.set_journal_draft("Good day");
    dash.save_journal().await.unwrap();
    dash.set_journal_draft("Great day");
    dash.save_journal().await.unwrap();

    let owner = dash.session().owner().cloned().unwrap();
    let journal: &dyn JournalRepository = remote.as_ref();
    let entries = journal.list_by_owner(&owner).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].content, "Great day");
}

#[tokio::test]
async fn test_session_restores_on_new_connection() {
    let (_dir, socket_path) = start_service().await;

    let token = {
        let (_remote, mut dash) = remote_dashboard(&socket_path).await;
        dash.register("u1@example.com", "password").await.unwrap();
        dash.add_todo("survives reconnect").await.unwrap();
        dash.session().token().cloned().unwrap()
    };

    let (_remote, mut dash) = remote_dashboard(&socket_path).await;
    dash.restore(token).await.unwrap();
    assert_eq!(dash.visible_todos().len(), 1);

    match dash.view() {
        DashboardView::SignedIn(snapshot) => {
            assert_eq!(snapshot.identity.email, "u1@example.com");
            assert!(snapshot.grid.cell(day(1)).unwrap().decoration.has_todos);
        }
        DashboardView::SignedOut { .. } => panic!("expected signed-in view"),
    }

    dash.sign_out().await.unwrap();
    assert!(matches!(dash.view(), DashboardView::SignedOut { .. }));
}

#[tokio::test]
async fn test_signed_out_token_is_rejected() {
    let (_dir, socket_path) = start_service().await;
    let (_remote, mut dash) = remote_dashboard(&socket_path).await;

    dash.register("u1@example.com", "password").await.unwrap();
    let token = dash.session().token().cloned().unwrap();
    dash.sign_out().await.unwrap();

    let (_remote, mut again) = remote_dashboard(&socket_path).await;
    let result = again.restore(token).await;
    assert!(matches!(
        result,
        Err(PlannerError::Store(StoreError::Unauthenticated))
    ));
    assert_eq!(again.take_notices().len(), 1);
}

#[tokio::test]
async fn test_raw_data_command_without_token() {
    let (_dir, socket_path) = start_service().await;
    let mut client = IpcClient::connect(&socket_path).await.unwrap();

    let response = client.send(Command::ListTodos).await.unwrap();
    match response.result {
        ResponseResult::Err(e) => assert_eq!(e.code, ErrorCode::Unauthenticated),
        ResponseResult::Ok(payload) => panic!("expected rejection, got {:?}", payload),
    }

    let response = client.send(Command::Ping).await.unwrap();
    assert!(matches!(response.result, ResponseResult::Ok(ResponsePayload::Pong)));
}

#[tokio::test]
async fn test_users_do_not_see_each_other() {
    let (_dir, socket_path) = start_service().await;

    let (_remote, mut alice) = remote_dashboard(&socket_path).await;
    alice.register("alice@example.com", "password").await.unwrap();
    let TodoChange::Created(todo) = alice.add_todo("alice's task").await.unwrap() else {
        panic!("expected a created todo");
    };
    alice.set_journal_draft("alice's day");
    alice.save_journal().await.unwrap();

    let (_remote, mut bob) = remote_dashboard(&socket_path).await;
    bob.register("bob@example.com", "password").await.unwrap();
    assert!(bob.visible_todos().is_empty());
    assert_eq!(bob.journal_content(), "");

    // Bob's client has never seen the id, so the dashboard refuses locally
    assert!(matches!(
        bob.toggle_todo(&todo.id).await,
        Err(PlannerError::UnknownTodo(_))
    ));
}

#[tokio::test]
async fn test_wrong_password_over_ipc() {
    let (_dir, socket_path) = start_service().await;
    let (_remote, mut dash) = remote_dashboard(&socket_path).await;
    dash.register("u1@example.com", "password").await.unwrap();
    dash.sign_out().await.unwrap();

    let result = dash.sign_in("u1@example.com", "not-the-password").await;
    assert!(matches!(
        result,
        Err(PlannerError::Store(StoreError::InvalidCredentials))
    ));
    assert!(!dash.is_authenticated());

    dash.sign_in("U1@example.com", "password").await.unwrap();
    assert!(dash.is_authenticated());
}
