//! `/dashboard/clientes/:id/pipelines`: CRM pipelines associated with a client.

use crate::api::ClientesApi;
use crate::error::ApiResult;
use crate::models::{Cliente, ClientePipeline, NewClientePipeline, Pipeline};
use crate::table::{Cell, Column, DataTable};

use super::{degrade, settle, Notice, PageState};

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineDialog {
    /// Pick one of the client's CRM pipelines.
    Add { selected: Option<i64> },
    ConfirmDelete { id: i64, nome: String },
}

pub struct PipelinesPage {
    api: ClientesApi,
    cliente_id: i64,
    pub state: PageState,
    pub cliente: Option<Cliente>,
    pub table: DataTable<ClientePipeline>,
    /// CRM pipelines offered by the add dialog.
    pub available: Vec<Pipeline>,
    pub dialog: Option<PipelineDialog>,
    pub form_error: Option<String>,
    pub notice: Option<Notice>,
}

impl PipelinesPage {
    pub fn new(api: ClientesApi, cliente_id: i64, page_size: usize) -> Self {
        Self {
            api,
            cliente_id,
            state: PageState::Loading,
            cliente: None,
            table: DataTable::new(
                vec![Column::new("Nome", |p: &ClientePipeline| Cell::text(p.nome.clone()))],
                page_size,
            ),
            available: Vec::new(),
            dialog: None,
            form_error: None,
            notice: None,
        }
    }

    pub fn cliente_id(&self) -> i64 {
        self.cliente_id
    }

    /// Heading, e.g. `Lista de Pipelines de Loja Centro`.
    pub fn title(&self) -> String {
        match &self.cliente {
            Some(cliente) => format!("Lista de Pipelines de {}", cliente.nome),
            None => "Lista de Pipelines".to_string(),
        }
    }

    pub async fn load(&mut self) -> ApiResult<()> {
        self.state = PageState::Loading;

        let clientes = degrade(self.api.list_clientes().await, "clientes")?;
        self.cliente = clientes.into_iter().find(|c| c.id == self.cliente_id);

        let associated = degrade(
            self.api.cliente_pipelines(self.cliente_id).await,
            "pipelines do cliente",
        )?;
        self.table.set_rows(associated);

        self.available = degrade(self.api.crm_pipelines(self.cliente_id).await, "pipelines do CRM")?;
        self.state = PageState::Loaded;
        Ok(())
    }

    pub fn open_add(&mut self) {
        self.form_error = None;
        self.dialog = Some(PipelineDialog::Add { selected: None });
    }

    pub fn select_pipeline(&mut self, pipeline_id: Option<i64>) {
        if let Some(PipelineDialog::Add { selected }) = &mut self.dialog {
            *selected = pipeline_id;
            self.form_error = None;
        }
    }

    pub fn open_delete(&mut self) {
        if let Some(p) = self.table.selected_row() {
            self.dialog = Some(PipelineDialog::ConfirmDelete {
                id: p.id,
                nome: p.nome.clone(),
            });
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
        self.form_error = None;
    }

    pub async fn submit(&mut self) -> ApiResult<()> {
        let Some(PipelineDialog::Add { selected }) = &self.dialog else {
            return Ok(());
        };
        let Some(pipeline) = selected.and_then(|id| self.available.iter().find(|p| p.id == id)) else {
            self.form_error = Some("Selecione um pipeline.".to_string());
            return Ok(());
        };

        let body = NewClientePipeline {
            cliente_id: self.cliente_id,
            pipeline_id: pipeline.id,
            nome: pipeline.nome.clone(),
        };

        self.state = PageState::Submitting;
        match settle(self.api.associate_pipeline(&body).await, "Erro ao cadastrar pipeline.")? {
            Ok(_) => {
                let associated = degrade(
                    self.api.cliente_pipelines(self.cliente_id).await,
                    "pipelines do cliente",
                )?;
                self.table.set_rows(associated);
                self.notice = Some(Notice::Success("Pipeline cadastrada com sucesso!".to_string()));
                self.close_dialog();
            }
            Err(message) => self.form_error = Some(message),
        }
        self.state = PageState::Loaded;
        Ok(())
    }

    pub async fn confirm_delete(&mut self) -> ApiResult<()> {
        let Some(PipelineDialog::ConfirmDelete { id, .. }) = self.dialog.clone() else {
            return Ok(());
        };
        self.dialog = None;

        match settle(self.api.remove_pipeline(id).await, "Erro ao excluir pipeline.")? {
            Ok(_) => {
                let remaining: Vec<ClientePipeline> =
                    self.table.rows().iter().filter(|p| p.id != id).cloned().collect();
                self.table.set_rows(remaining);
                self.notice = Some(Notice::Success("Pipeline excluida com sucesso!".to_string()));
            }
            Err(_) => self.notice = Some(Notice::Error("Erro ao excluir pipeline.".to_string())),
        }
        Ok(())
    }
}
