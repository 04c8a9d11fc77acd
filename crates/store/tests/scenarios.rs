//! End-to-end behaviour of the managers against a scripted server.

use hrdesk_client::mock::ScriptedTransport;
use hrdesk_client::{ApiClient, ClientConfig, EmployeeApi, StatusCode};
use hrdesk_core::{EmployeeState, EmployeeUpdate, Session};
use hrdesk_store::{AuthSession, EmployeeCollection, FileTokenStorage, RefreshOutcome, TokenStorage};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn client(t: &Arc<ScriptedTransport>) -> ApiClient {
    ApiClient::with_transport(ClientConfig::new("http://hr.test/api/v1").unwrap(), t.clone())
}

#[tokio::test]
async fn refresh_loads_the_list() {
    let t = ScriptedTransport::new();
    t.push_json(StatusCode::OK, json!([{ "id": "A" }, { "id": "B" }]));
    let employees = EmployeeCollection::new(EmployeeApi::new(client(&t)));
    assert_eq!(employees.state().get(), EmployeeState::default());

    assert_eq!(employees.refresh().await, RefreshOutcome::Applied);

    let state = employees.state().get();
    let ids: Vec<&str> = state.items.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B"]);
    assert!(!state.loading);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn refresh_surfaces_server_message() {
    let t = ScriptedTransport::new();
    t.push_json(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "db down" }));
    let employees = EmployeeCollection::new(EmployeeApi::new(client(&t)));

    assert_eq!(employees.refresh().await, RefreshOutcome::Failed);

    assert_eq!(
        employees.state().get(),
        EmployeeState {
            items: vec![],
            loading: false,
            error: Some("db down".into()),
        }
    );
}

#[tokio::test]
async fn login_then_logout_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileTokenStorage::new(dir.path().join("token")));
    let t = ScriptedTransport::new();
    t.push_json(StatusCode::OK, json!({ "token": "T1" }));

    let session = AuthSession::new(client(&t), storage.clone());
    session.login("a@b.com", "pw").await.unwrap();
    assert_eq!(session.state().get(), Session { token: Some("T1".into()), user: None });
    assert_eq!(storage.load().unwrap().as_deref(), Some("T1"));

    // A fresh process picks the token back up.
    let restored = AuthSession::new(client(&t), storage.clone());
    assert_eq!(restored.token().as_deref(), Some("T1"));

    session.logout();
    assert_eq!(session.state().get(), Session::default());
    assert_eq!(storage.load().unwrap(), None);
}

#[tokio::test]
async fn mutation_then_full_reload_uses_the_session_token() {
    let t = ScriptedTransport::new();
    t.push_json(StatusCode::OK, json!({ "token": "T9" }));
    t.push_json(StatusCode::OK, json!({ "id": "A", "first_name": "Ann" }));
    t.push_json(StatusCode::OK, json!([{ "id": "A", "first_name": "Ann" }]));

    let storage: Arc<dyn TokenStorage> = Arc::new(hrdesk_store::MemoryTokenStorage::new());
    let session = AuthSession::new(client(&t), storage);
    session.login("a@b.com", "pw").await.unwrap();

    let api = EmployeeApi::new(session.client());
    let employees = EmployeeCollection::new(api.clone());

    let seen: Arc<Mutex<Vec<bool>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let sub = employees
        .state()
        .subscribe(move |s: &EmployeeState| sink.lock().unwrap().push(s.loading));

    let changes = EmployeeUpdate {
        first_name: Some("Ann".into()),
        ..Default::default()
    };
    api.update("A", &changes).await.unwrap();
    employees.refresh().await;
    sub.unsubscribe();

    assert_eq!(*seen.lock().unwrap(), vec![false, true, false]);
    assert_eq!(employees.state().get().items[0].first_name.as_deref(), Some("Ann"));

    let sent = t.requests();
    assert_eq!(sent.len(), 3);
    assert!(sent[0].headers.get("authorization").is_none());
    assert_eq!(sent[1].headers["authorization"], "Bearer T9");
    assert_eq!(sent[2].url, "http://hr.test/api/v1/employees");
    assert_eq!(t.pending_replies(), 0);
}
