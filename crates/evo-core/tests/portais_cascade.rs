//! Portais dialogs: client drives the funnel list, funnel drives the status list.

mod common;

use std::time::Duration;

use common::mock_api;
use evo_core::pages::portais::{AddPortal, PortalDialog};
use evo_core::pages::PortaisPage;
use evo_core::{ApiError, ClientesApi, Session};
use serde_json::json;

fn backend() -> mock_api::MockApi {
    mock_api::start(|req| match (req.method.as_str(), req.route()) {
        ("GET", "/cliente/listar") => (
            200,
            json!({ "data": [
                { "id": 1, "nome": "LojaA", "token": "ta" },
                { "id": 2, "nome": "LojaB", "token": "tb" }
            ] }),
        ),
        ("GET", "/cliente/1") => (200, json!({ "data": [{ "id": 1, "nome": "LojaA", "token": "ta" }] })),
        ("GET", "/cliente/2") => (200, json!({ "data": [{ "id": 2, "nome": "LojaB", "token": "tb" }] })),
        ("GET", "/cliente/9") => (403, json!({ "message": "forbidden" })),
        ("GET", "/pipelines/1") => (
            200,
            json!({ "data": [
                { "id": 100, "nome": "Vendas", "status": [
                    { "id": 1001, "nome": "Novo", "type": 0 },
                    { "id": 1002, "nome": "Ganho", "type": 1 }
                ] },
                { "id": 101, "nome": "Locação", "status": [
                    { "id": 1011, "nome": "Contato", "type": 0 }
                ] }
            ] }),
        ),
        ("GET", "/pipelines/2") => (
            200,
            json!({ "data": [
                { "id": 200, "nome": "Revenda", "status": [
                    { "id": 2001, "nome": "Perdido", "type": 2 }
                ] }
            ] }),
        ),
        ("GET", "/portais/listar") => (
            200,
            json!({ "data": [{
                "id": 7, "nome": "LojaA", "pipeline": "Vendas", "status_pipeline": "Novo",
                "pipeline_id": 100, "status_id": 1001, "id_cliente": 1
            }] }),
        ),
        ("POST", "/portais/cadastrar") => (200, json!({ "success": true })),
        ("PUT", "/portais/editar/7") => (200, json!({ "success": true })),
        _ => (404, json!({})),
    })
}

fn page_for(server: &mock_api::MockApi) -> PortaisPage {
    let session = Session::with_token(Some("tok".to_string()));
    let api = ClientesApi::new(&server.base_url, Duration::from_secs(5), session).unwrap();
    PortaisPage::new(api, 20)
}

fn add_state(page: &PortaisPage) -> &AddPortal {
    match &page.dialog {
        Some(PortalDialog::Add(add)) => add,
        other => panic!("unexpected dialog: {other:?}"),
    }
}

#[tokio::test]
async fn switching_client_clears_funnel_and_refetches() {
    let server = backend();
    let mut page = page_for(&server);
    page.load().await.unwrap();
    page.open_add();

    page.select_cliente(Some(1)).await.unwrap();
    let add = add_state(&page);
    assert!(!add.loading_pipelines);
    assert_eq!(add.funnel.pipelines.len(), 2);

    page.select_pipeline(Some(100));
    assert!(page.select_status(Some(1002)));
    assert_eq!(add_state(&page).funnel.status_id, Some(1002));

    page.select_cliente(Some(2)).await.unwrap();
    let add = add_state(&page);
    assert_eq!(add.funnel.pipeline_id, None);
    assert_eq!(add.funnel.status_id, None);
    assert!(add.funnel.statuses.is_empty());
    assert_eq!(add.funnel.pipelines.len(), 1);
    assert_eq!(add.funnel.pipelines[0].nome, "Revenda");

    assert_eq!(server.calls("GET", "/pipelines/1").len(), 1);
    assert_eq!(server.calls("GET", "/pipelines/2").len(), 1);
}

#[tokio::test]
async fn switching_funnel_clears_status() {
    let server = backend();
    let mut page = page_for(&server);
    page.open_add();
    page.select_cliente(Some(1)).await.unwrap();

    page.select_pipeline(Some(100));
    assert!(page.select_status(Some(1001)));
    assert!(!page.select_status(Some(1011)));

    page.select_pipeline(Some(101));
    let funnel = &add_state(&page).funnel;
    assert_eq!(funnel.status_id, None);
    assert_eq!(funnel.statuses.len(), 1);
    assert_eq!(funnel.statuses[0].id, 1011);
}

#[tokio::test]
async fn create_body_carries_status_type() {
    let server = backend();
    let mut page = page_for(&server);
    page.load().await.unwrap();
    page.open_add();
    page.select_cliente(Some(1)).await.unwrap();
    page.select_pipeline(Some(100));

    page.submit_add().await.unwrap();
    assert_eq!(page.form_error.as_deref(), Some("Selecione um status válido."));
    assert!(server.calls("POST", "/portais/cadastrar").is_empty());

    assert!(page.select_status(Some(1002)));
    page.submit_add().await.unwrap();

    assert!(page.dialog.is_none());
    let created = server.calls("POST", "/portais/cadastrar");
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].json(),
        json!({ "cliente_id": 1, "pipeline_id": 100, "status_id": 1002, "nome": "LojaA", "type": 1 })
    );
}

#[tokio::test]
async fn edit_waits_for_a_changed_pair() {
    let server = backend();
    let mut page = page_for(&server);
    page.load().await.unwrap();

    page.open_edit().await.unwrap();
    let Some(PortalDialog::Edit(edit)) = &page.dialog else {
        panic!("unexpected dialog: {:?}", page.dialog);
    };
    assert_eq!(edit.funnel.pipeline_id, Some(100));
    assert_eq!(edit.funnel.status_id, Some(1001));
    assert!(!page.can_submit_edit());

    page.submit_edit().await.unwrap();
    assert!(server.calls("PUT", "/portais/editar/7").is_empty());

    page.select_pipeline(Some(101));
    assert!(!page.can_submit_edit());
    assert!(page.select_status(Some(1011)));
    assert!(page.can_submit_edit());

    page.submit_edit().await.unwrap();
    let updates = server.calls("PUT", "/portais/editar/7");
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0].json(),
        json!({ "pipeline_id": 101, "status_id": 1011, "type": 0 })
    );
    assert!(page.dialog.is_none());
}

#[tokio::test]
async fn forbidden_client_lookup_stops_loading() {
    let server = backend();
    let mut page = page_for(&server);
    page.open_add();

    let result = page.select_cliente(Some(9)).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
    let add = add_state(&page);
    assert!(!add.loading_pipelines);
    assert!(add.funnel.pipelines.is_empty());
}
