//! Sync backend calls and the dashboard's batch runner.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use common::mock_api::{self, MockApi};
use evo_core::models::SyncType;
use evo_core::pages::SyncDashboard;
use evo_core::SyncApi;
use serde_json::json;

fn backend() -> MockApi {
    mock_api::start(|req| match (req.method.as_str(), req.route()) {
        ("GET", "/api/sync/accounts") => (
            200,
            json!({ "accounts": [
                { "id": 1, "subdomain": "matriz", "is_master": true },
                { "id": 2, "subdomain": "filial-a", "is_master": false },
                { "id": 3, "subdomain": "filial-b", "is_master": false }
            ] }),
        ),
        ("GET", "/api/groups/") => (200, json!({ "groups": [{ "id": 7, "name": "Rede" }] })),
        ("GET", "/api/groups/overview") => (
            200,
            json!({ "success": true, "groups": [{
                "id": 7,
                "name": "Rede",
                "master_account": { "id": 1, "subdomain": "matriz" },
                "slave_accounts": [
                    { "id": 2, "subdomain": "filial-a", "contact_count": 40 },
                    { "id": 3, "subdomain": "filial-b", "contact_count": 2 }
                ]
            }] }),
        ),
        ("POST", "/api/sync/account/3") => (500, json!({ "error": "crm offline" })),
        ("POST", _) => (200, json!({ "success": true, "message": "ok" })),
        _ => (404, json!({})),
    })
}

fn sync_api(server: &MockApi) -> SyncApi {
    SyncApi::new(
        &format!("{}/api", server.base_url),
        Duration::from_secs(5),
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn lists_unwrap_their_wrapper_keys() {
    let server = backend();
    let api = sync_api(&server);

    let accounts = api.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 3);
    assert!(accounts[0].is_master);

    let groups = api.list_groups().await.unwrap();
    assert_eq!(groups[0].name, "Rede");

    // No session configured: no credentials sent.
    assert!(server.requests().iter().all(|r| r.header("authorization").is_none()));
}

#[tokio::test]
async fn group_trigger_sends_the_sync_type() {
    let server = backend();
    let api = sync_api(&server);

    api.trigger_group_sync(7, SyncType::CustomFields).await.unwrap();

    let calls = server.calls("POST", "/api/sync/groups/7/trigger");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].json(), json!({ "sync_type": "custom_fields" }));
}

#[tokio::test]
async fn sequential_sync_honours_stop_between_accounts() {
    let server = backend();
    let api = sync_api(&server);
    let stop = AtomicBool::new(false);
    let mut seen = Vec::new();

    let attempted = api
        .sync_accounts_sequentially(&[1, 2, 3], Duration::ZERO, &stop, |id, result| {
            assert!(result.is_ok());
            seen.push(id);
            stop.store(true, Ordering::SeqCst);
        })
        .await;

    assert_eq!(attempted, 1);
    assert_eq!(seen, vec![1]);
    assert_eq!(server.calls("POST", "/api/sync/account/1").len(), 1);
    assert!(server.calls("POST", "/api/sync/account/2").is_empty());
}

#[tokio::test]
async fn sequential_sync_continues_past_failures() {
    let server = backend();
    let api = sync_api(&server);
    let stop = AtomicBool::new(false);
    let mut failures = Vec::new();

    let attempted = api
        .sync_accounts_sequentially(&[3, 2], Duration::from_millis(10), &stop, |id, result| {
            if result.is_err() {
                failures.push(id);
            }
        })
        .await;

    assert_eq!(attempted, 2);
    assert_eq!(failures, vec![3]);
}

#[tokio::test]
async fn sequential_sync_pauses_after_every_account() {
    let server = backend();
    let api = sync_api(&server);
    let stop = AtomicBool::new(false);
    let delay = Duration::from_millis(40);

    let start = Instant::now();
    let attempted = api
        .sync_accounts_sequentially(&[1, 2], delay, &stop, |_, _| {})
        .await;

    assert_eq!(attempted, 2);
    assert!(start.elapsed() >= delay * 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn dashboard_batch_reports_through_tick() {
    let server = backend();
    let mut dashboard = SyncDashboard::new(sync_api(&server), Duration::ZERO);

    dashboard.load().await.unwrap();
    assert_eq!(dashboard.groups.len(), 1);
    assert_eq!(dashboard.stats().total_contacts, 42);
    assert_eq!(dashboard.stats().masters, 1);

    dashboard.sync_all();
    assert!(dashboard.is_syncing());
    assert_eq!(dashboard.batch_progress(), Some((0, 3)));

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut reload = false;
    while dashboard.batch_progress().is_some() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
        reload |= dashboard.tick(Instant::now());
    }

    assert!(reload);
    assert!(!dashboard.is_syncing());
    assert_eq!(dashboard.operation, "Concluído");
    for id in 1..=3 {
        assert_eq!(server.calls("POST", &format!("/api/sync/account/{id}")).len(), 1);
    }
    assert!(dashboard
        .logs()
        .iter()
        .any(|l| l.message.starts_with("Erro na sincronização da conta 3")));
}

#[tokio::test]
async fn group_trigger_runs_the_estimate_to_completion() {
    let server = backend();
    let mut dashboard = SyncDashboard::new(sync_api(&server), Duration::ZERO);
    dashboard.load().await.unwrap();

    let start = Instant::now();
    dashboard.trigger_group_sync(start).await.unwrap();
    assert!(dashboard.notice.as_ref().is_some_and(|n| n.is_error()));
    assert!(!dashboard.is_syncing());

    dashboard.notice = None;
    dashboard.select_sync_group(Some(7));
    dashboard.trigger_group_sync(start).await.unwrap();
    assert!(dashboard.progress.is_running());
    assert_eq!(dashboard.operation, "Sincronizando grupo Rede");

    assert!(!dashboard.tick(start + Duration::from_secs(5)));
    assert_eq!(dashboard.progress.percent(), 50);
    assert!(dashboard.tick(start + Duration::from_secs(10)));
    assert_eq!(dashboard.operation, "Concluído");
}

#[tokio::test]
async fn stop_resets_progress() {
    let server = backend();
    let mut dashboard = SyncDashboard::new(sync_api(&server), Duration::ZERO);
    dashboard.load().await.unwrap();
    dashboard.select_sync_group(Some(7));

    let start = Instant::now();
    dashboard.trigger_group_sync(start).await.unwrap();
    dashboard.stop_sync();

    assert!(!dashboard.is_syncing());
    assert_eq!(dashboard.progress.percent(), 0);
    assert_eq!(dashboard.operation, "Interrompido");
}
