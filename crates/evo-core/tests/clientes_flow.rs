//! Client list flows against a mock clientes backend.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::mock_api::{self, MockApi};
use evo_core::pages::{ClientesPage, PageState};
use evo_core::{ApiError, Cell, ClientesApi, Session};
use serde_json::{json, Value};

/// Backend holding an in-memory client list behind list and create.
fn clientes_backend(initial: Vec<Value>) -> MockApi {
    let store = Arc::new(Mutex::new(initial));
    mock_api::start(move |req| {
        let mut clientes = store.lock().unwrap();
        match (req.method.as_str(), req.route()) {
            ("GET", "/cliente/listar") => (200, json!({ "success": true, "data": *clientes })),
            ("POST", "/cliente/cadastrar") => {
                let mut body = req.json();
                body["id"] = json!(clientes.len() + 1);
                clientes.push(body);
                (201, json!({ "success": true, "message": "ok" }))
            }
            _ => (404, json!({ "message": "not found" })),
        }
    })
}

fn api(server: &MockApi, session: &Session) -> ClientesApi {
    ClientesApi::new(&server.base_url, Duration::from_secs(5), session.clone()).unwrap()
}

#[tokio::test]
async fn created_client_appears_once_after_refetch() {
    let server = clientes_backend(vec![json!({
        "id": 1, "nome": "Loja Antiga", "token": "t0", "automotivo": false
    })]);
    let session = Session::with_token(Some("tok".to_string()));
    let mut page = ClientesPage::new(api(&server, &session), 20);

    page.load().await.unwrap();
    assert_eq!(page.clientes().len(), 1);

    page.open_create();
    let form = page.dialog.as_mut().and_then(|d| d.form_mut()).unwrap();
    form.nome = "Auto Center".to_string();
    form.token = "crm-token".to_string();
    form.automotivo = true;
    page.submit().await.unwrap();

    assert!(page.dialog.is_none());
    assert!(page.form_error.is_none());
    assert_eq!(page.state, PageState::Loaded);
    assert_eq!(
        page.notice.as_ref().map(|n| n.text()),
        Some("Cliente cadastrado com sucesso!")
    );

    let matching: Vec<_> = page
        .clientes()
        .iter()
        .filter(|c| c.nome == "Auto Center")
        .collect();
    assert_eq!(matching.len(), 1);
    assert!(matching[0].automotivo);

    // Automotivo is the third column, rendered as an icon.
    let flags: Vec<Cell> = page
        .table
        .page_cells()
        .into_iter()
        .map(|row| row[2].clone())
        .collect();
    assert!(flags.contains(&Cell::Flag(true)));
    assert!(flags.contains(&Cell::Flag(false)));
    assert_eq!(Cell::Flag(true).lines(), vec!["✔".to_string()]);
    assert_eq!(Cell::Flag(false).lines(), vec!["✘".to_string()]);

    let created = server.calls("POST", "/cliente/cadastrar");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].header("authorization"), Some("Bearer tok"));
    assert_eq!(
        created[0].json(),
        json!({ "nome": "Auto Center", "token": "crm-token", "automotivo": true })
    );
}

#[tokio::test]
async fn invalid_form_never_reaches_the_backend() {
    let server = clientes_backend(Vec::new());
    let session = Session::with_token(Some("tok".to_string()));
    let mut page = ClientesPage::new(api(&server, &session), 20);

    page.open_create();
    page.submit().await.unwrap();

    assert!(page.form_error.is_some());
    assert!(page.dialog.is_some());
    assert!(server.calls("POST", "/cliente/cadastrar").is_empty());
}

#[tokio::test]
async fn rejected_create_keeps_dialog_open_with_backend_message() {
    let server = mock_api::start(|req| match req.method.as_str() {
        "POST" => (
            400,
            json!({ "success": false, "message": "Cliente já cadastrado" }),
        ),
        _ => (200, json!({ "data": [] })),
    });
    let session = Session::with_token(Some("tok".to_string()));
    let mut page = ClientesPage::new(api(&server, &session), 20);

    page.open_create();
    let form = page.dialog.as_mut().and_then(|d| d.form_mut()).unwrap();
    form.nome = "Dup".to_string();
    form.token = "t".to_string();
    page.submit().await.unwrap();

    assert_eq!(page.form_error.as_deref(), Some("Cliente já cadastrado"));
    assert!(page.dialog.is_some());
}

#[tokio::test]
async fn forbidden_clears_session_and_propagates() {
    let server = mock_api::start(|_| (403, json!({ "message": "forbidden" })));
    let session = Session::with_token(Some("stale".to_string()));
    let mut page = ClientesPage::new(api(&server, &session), 20);

    let err = page.load().await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn failed_list_degrades_to_empty_table() {
    let server = mock_api::start(|_| (500, json!({ "message": "boom" })));
    let session = Session::with_token(Some("tok".to_string()));
    let mut page = ClientesPage::new(api(&server, &session), 20);

    page.load().await.unwrap();
    assert!(page.clientes().is_empty());
    assert!(page.table.is_empty());
    assert_eq!(page.state, PageState::Loaded);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn raw_array_and_null_data_are_accepted() {
    let server = mock_api::start(|req| match req.route() {
        "/cliente/listar" => (200, json!([{ "id": "3", "nome": "Texto", "token": "x" }])),
        _ => (200, json!({ "success": true, "data": null })),
    });
    let session = Session::new();
    let api = api(&server, &session);

    let clientes = api.list_clientes().await.unwrap();
    assert_eq!(clientes.len(), 1);
    assert_eq!(clientes[0].id, 3);
    assert!(api.list_tintim().await.unwrap().is_empty());
}
