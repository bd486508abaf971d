//! Client for the clientes backend (clients, pipelines, TinTim, Portais).

use std::time::Duration;

use reqwest::Method;

use super::http::HttpClient;
use crate::error::ApiResult;
use crate::models::{
    Ack, Cliente, ClientePipeline, NewCliente, NewClientePipeline, NewPortal, NewTintim, Pipeline,
    Portal, PortalLead, PortalUpdate, TintimLead, TintimRecord, TintimUpdate, Unidade,
};
use crate::session::Session;

/// Typed access to the clientes backend. Authenticated with the session's
/// bearer token.
#[derive(Debug, Clone)]
pub struct ClientesApi {
    http: HttpClient,
}

impl ClientesApi {
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> ApiResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url, timeout, Some(session))?,
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    // Clients

    pub async fn list_clientes(&self) -> ApiResult<Vec<Cliente>> {
        self.http.get_list(&["cliente", "listar"], &[], None).await
    }

    pub async fn create_cliente(&self, cliente: &NewCliente) -> ApiResult<Ack> {
        self.http
            .mutate(Method::POST, &["cliente", "cadastrar"], Some(cliente))
            .await
    }

    pub async fn update_cliente(&self, id: i64, cliente: &NewCliente) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate(Method::PUT, &["cliente", "editar", &id], Some(cliente))
            .await
    }

    pub async fn delete_cliente(&self, id: i64) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate::<()>(Method::DELETE, &["cliente", "excluir", &id], None)
            .await
    }

    /// Lookup by id. The backend answers with an array; the first match wins.
    pub async fn get_cliente(&self, id: i64) -> ApiResult<Option<Cliente>> {
        let id = id.to_string();
        let found: Vec<Cliente> = self.http.get_list(&["cliente", &id], &[], None).await?;
        Ok(found.into_iter().next())
    }

    pub async fn find_clientes_by_nome(&self, nome: &str) -> ApiResult<Vec<Cliente>> {
        self.http.get_list(&["cliente", "nome", nome], &[], None).await
    }

    // CRM lookups

    /// Units of the client's CRM account, keyed by its name and credential.
    pub async fn unidades(&self, nome: &str, token: &str) -> ApiResult<Vec<Unidade>> {
        self.http
            .get_list(&["unidades"], &[("nome", nome), ("token", token)], None)
            .await
    }

    /// CRM pipelines (with their statuses) of a client.
    pub async fn crm_pipelines(&self, cliente_id: i64) -> ApiResult<Vec<Pipeline>> {
        let id = cliente_id.to_string();
        self.http.get_list(&["pipelines", &id], &[], None).await
    }

    // Client pipelines

    pub async fn cliente_pipelines(&self, cliente_id: i64) -> ApiResult<Vec<ClientePipeline>> {
        let id = cliente_id.to_string();
        self.http.get_list(&["clientePipeline", &id], &[], None).await
    }

    pub async fn associate_pipeline(&self, association: &NewClientePipeline) -> ApiResult<Ack> {
        self.http
            .mutate(Method::POST, &["clientePipeline", "cadastrar"], Some(association))
            .await
    }

    pub async fn remove_pipeline(&self, id: i64) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate::<()>(Method::DELETE, &["clientePipeline", "excluir", &id], None)
            .await
    }

    // TinTim

    pub async fn list_tintim(&self) -> ApiResult<Vec<TintimRecord>> {
        self.http.get_list(&["tintim", "listar"], &[], None).await
    }

    pub async fn create_tintim(&self, tintim: &NewTintim) -> ApiResult<Ack> {
        self.http
            .mutate(Method::POST, &["tintim", "cadastrar"], Some(tintim))
            .await
    }

    pub async fn update_tintim(&self, id: i64, update: &TintimUpdate) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate(Method::PUT, &["tintim", "editar", &id], Some(update))
            .await
    }

    pub async fn delete_tintim(&self, id: i64) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate::<()>(Method::DELETE, &["tintim", "excluir", &id], None)
            .await
    }

    pub async fn tintim_leads(&self) -> ApiResult<Vec<TintimLead>> {
        self.http.get_list(&["tintim", "monitoramento"], &[], None).await
    }

    // Portais

    pub async fn list_portais(&self) -> ApiResult<Vec<Portal>> {
        self.http.get_list(&["portais", "listar"], &[], None).await
    }

    pub async fn create_portal(&self, portal: &NewPortal) -> ApiResult<Ack> {
        self.http
            .mutate(Method::POST, &["portais", "cadastrar"], Some(portal))
            .await
    }

    pub async fn update_portal(&self, id: i64, update: &PortalUpdate) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate(Method::PUT, &["portais", "editar", &id], Some(update))
            .await
    }

    pub async fn delete_portal(&self, id: i64) -> ApiResult<Ack> {
        let id = id.to_string();
        self.http
            .mutate::<()>(Method::DELETE, &["portais", "excluir", &id], None)
            .await
    }

    pub async fn portal_leads(&self) -> ApiResult<Vec<PortalLead>> {
        self.http.get_list(&["portais", "monitoramento"], &[], None).await
    }
}
