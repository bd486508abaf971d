//! `/dashboard/portais`: Portais lead bindings (client → CRM funnel → status).
//!
//! The add and edit dialogs cascade: a new client refetches its funnels and
//! clears funnel and status; a new funnel swaps the status list and clears
//! the status.

use crate::api::ClientesApi;
use crate::dates;
use crate::error::ApiResult;
use crate::models::{Cliente, NewPortal, Pipeline, PipelineStatus, Portal, PortalUpdate};
use crate::table::{Cell, Column, ColumnHeader, DataTable, SortType};

use super::{degrade, settle, Notice, PageState};

/// Funnel and status choice shared by the add and edit dialogs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunnelChoice {
    pub pipelines: Vec<Pipeline>,
    pub pipeline_id: Option<i64>,
    pub statuses: Vec<PipelineStatus>,
    pub status_id: Option<i64>,
}

impl FunnelChoice {
    fn with_pipelines(pipelines: Vec<Pipeline>) -> Self {
        Self {
            pipelines,
            ..Self::default()
        }
    }

    /// Select a funnel; the status list follows it and the status is cleared.
    pub fn select_pipeline(&mut self, pipeline_id: Option<i64>) {
        self.pipeline_id = pipeline_id;
        self.status_id = None;
        self.statuses = pipeline_id
            .and_then(|id| self.pipelines.iter().find(|p| p.id == id))
            .map(|p| p.status.clone())
            .unwrap_or_default();
    }

    pub fn select_status(&mut self, status_id: Option<i64>) -> bool {
        let known = status_id.map_or(true, |id| self.statuses.iter().any(|s| s.id == id));
        if known {
            self.status_id = status_id;
        }
        known
    }

    pub fn status(&self) -> Option<&PipelineStatus> {
        let id = self.status_id?;
        self.statuses.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddPortal {
    pub cliente_id: Option<i64>,
    pub loading_pipelines: bool,
    pub funnel: FunnelChoice,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditPortal {
    pub id: i64,
    pub nome: String,
    pub original_pipeline_id: i64,
    pub original_status_id: i64,
    pub funnel: FunnelChoice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortalDialog {
    Add(AddPortal),
    Edit(EditPortal),
    ConfirmDelete { id: i64, nome: String },
}

impl PortalDialog {
    pub fn funnel_mut(&mut self) -> Option<&mut FunnelChoice> {
        match self {
            PortalDialog::Add(add) => Some(&mut add.funnel),
            PortalDialog::Edit(edit) => Some(&mut edit.funnel),
            PortalDialog::ConfirmDelete { .. } => None,
        }
    }
}

pub struct PortaisPage {
    api: ClientesApi,
    pub state: PageState,
    pub table: DataTable<Portal>,
    pub clientes: Vec<Cliente>,
    pub dialog: Option<PortalDialog>,
    pub form_error: Option<String>,
    pub notice: Option<Notice>,
}

impl PortaisPage {
    pub fn new(api: ClientesApi, page_size: usize) -> Self {
        Self {
            api,
            state: PageState::Loading,
            table: DataTable::new(columns(), page_size),
            clientes: Vec::new(),
            dialog: None,
            form_error: None,
            notice: None,
        }
    }

    pub async fn load(&mut self) -> ApiResult<()> {
        self.state = PageState::Loading;
        self.reload_portais().await?;
        self.clientes = degrade(self.api.list_clientes().await, "clientes")?;
        self.state = PageState::Loaded;
        Ok(())
    }

    async fn reload_portais(&mut self) -> ApiResult<()> {
        let portais = degrade(self.api.list_portais().await, "portais")?;
        self.table.set_rows(portais);
        Ok(())
    }

    pub fn open_add(&mut self) {
        self.form_error = None;
        self.dialog = Some(PortalDialog::Add(AddPortal::default()));
    }

    /// Choose the client in the add dialog: funnel and status are cleared and
    /// the client's funnels refetched.
    pub async fn select_cliente(&mut self, cliente_id: Option<i64>) -> ApiResult<()> {
        let Some(PortalDialog::Add(add)) = &mut self.dialog else {
            return Ok(());
        };
        add.cliente_id = cliente_id;
        add.funnel = FunnelChoice::default();
        self.form_error = None;

        let Some(id) = cliente_id else {
            return Ok(());
        };
        add.loading_pipelines = true;

        let fetched = self.pipelines_for(id).await;

        // The dialog may have been replaced while the funnels were loading.
        match (fetched, &mut self.dialog) {
            (fetched, Some(PortalDialog::Add(add))) if add.cliente_id == Some(id) => {
                add.loading_pipelines = false;
                add.funnel = FunnelChoice::with_pipelines(fetched?);
                Ok(())
            }
            (fetched, _) => fetched.map(drop),
        }
    }

    async fn pipelines_for(&self, cliente_id: i64) -> ApiResult<Vec<Pipeline>> {
        match self.api.get_cliente(cliente_id).await {
            Ok(Some(cliente)) => degrade(self.api.crm_pipelines(cliente.id).await, "pipelines"),
            Ok(None) => Ok(Vec::new()),
            Err(e) if e.is_forbidden() => Err(e),
            Err(e) => {
                tracing::warn!(cliente_id, "failed to look up cliente: {e}");
                Ok(Vec::new())
            }
        }
    }

    pub fn select_pipeline(&mut self, pipeline_id: Option<i64>) {
        if let Some(funnel) = self.dialog.as_mut().and_then(PortalDialog::funnel_mut) {
            funnel.select_pipeline(pipeline_id);
            self.form_error = None;
        }
    }

    pub fn select_status(&mut self, status_id: Option<i64>) -> bool {
        match self.dialog.as_mut().and_then(PortalDialog::funnel_mut) {
            Some(funnel) => funnel.select_status(status_id),
            None => false,
        }
    }

    pub async fn submit_add(&mut self) -> ApiResult<()> {
        let Some(PortalDialog::Add(add)) = &self.dialog else {
            return Ok(());
        };
        let (Some(cliente_id), Some(pipeline_id)) = (add.cliente_id, add.funnel.pipeline_id) else {
            self.form_error = Some("Selecione o cliente e o funil.".to_string());
            return Ok(());
        };
        let Some(status) = add.funnel.status() else {
            self.form_error = Some("Selecione um status válido.".to_string());
            return Ok(());
        };
        let nome = self
            .clientes
            .iter()
            .find(|c| c.id == cliente_id)
            .map(|c| c.nome.clone())
            .unwrap_or_default();

        let body = NewPortal {
            cliente_id,
            pipeline_id,
            status_id: status.id,
            nome,
            kind: status.kind,
        };

        self.state = PageState::Submitting;
        match settle(self.api.create_portal(&body).await, "Erro ao cadastrar portal.")? {
            Ok(ack) => {
                let message = ack
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Portal cadastrado com sucesso!".to_string());
                self.notice = Some(Notice::Success(message));
                self.close_dialog();
                self.reload_portais().await?;
            }
            Err(message) => self.form_error = Some(message),
        }
        self.state = PageState::Loaded;
        Ok(())
    }

    /// Open the edit dialog for the selected row with its funnel and status
    /// preselected.
    pub async fn open_edit(&mut self) -> ApiResult<()> {
        let Some(portal) = self.table.selected_row().cloned() else {
            return Ok(());
        };
        self.form_error = None;
        self.dialog = Some(PortalDialog::Edit(EditPortal {
            id: portal.id,
            nome: portal.nome.clone(),
            original_pipeline_id: portal.pipeline_id,
            original_status_id: portal.status_id,
            funnel: FunnelChoice::default(),
        }));

        let pipelines = degrade(self.api.crm_pipelines(portal.id_cliente).await, "pipelines")?;
        if let Some(PortalDialog::Edit(edit)) = &mut self.dialog {
            if edit.id == portal.id {
                let mut funnel = FunnelChoice::with_pipelines(pipelines);
                funnel.select_pipeline(Some(portal.pipeline_id));
                funnel.status_id = Some(portal.status_id);
                edit.funnel = funnel;
            }
        }
        Ok(())
    }

    /// Editing needs a funnel and a status that differ from the stored pair.
    pub fn can_submit_edit(&self) -> bool {
        let Some(PortalDialog::Edit(edit)) = &self.dialog else {
            return false;
        };
        match (edit.funnel.pipeline_id, edit.funnel.status_id) {
            (Some(pipeline_id), Some(status_id)) => {
                (pipeline_id, status_id) != (edit.original_pipeline_id, edit.original_status_id)
            }
            _ => false,
        }
    }

    pub async fn submit_edit(&mut self) -> ApiResult<()> {
        if !self.can_submit_edit() {
            return Ok(());
        }
        let Some(PortalDialog::Edit(edit)) = &self.dialog else {
            return Ok(());
        };
        let Some(status) = edit.funnel.status() else {
            self.form_error = Some("Selecione um status válido.".to_string());
            return Ok(());
        };
        let id = edit.id;
        let update = PortalUpdate {
            pipeline_id: edit.funnel.pipeline_id.unwrap_or_default(),
            status_id: status.id,
            kind: status.kind,
        };

        self.state = PageState::Submitting;
        match settle(self.api.update_portal(id, &update).await, "Erro ao editar portal.")? {
            Ok(_) => {
                self.notice = Some(Notice::Success("Portal editado com sucesso!".to_string()));
                self.close_dialog();
                self.reload_portais().await?;
            }
            Err(message) => self.form_error = Some(message),
        }
        self.state = PageState::Loaded;
        Ok(())
    }

    pub fn open_delete(&mut self) {
        if let Some(portal) = self.table.selected_row() {
            self.dialog = Some(PortalDialog::ConfirmDelete {
                id: portal.id,
                nome: portal.nome.clone(),
            });
        }
    }

    pub async fn confirm_delete(&mut self) -> ApiResult<()> {
        let Some(PortalDialog::ConfirmDelete { id, .. }) = self.dialog.clone() else {
            return Ok(());
        };
        self.dialog = None;

        match settle(self.api.delete_portal(id).await, "Erro ao excluir portal.")? {
            Ok(_) => {
                let remaining: Vec<Portal> =
                    self.table.rows().iter().filter(|p| p.id != id).cloned().collect();
                self.table.set_rows(remaining);
                self.notice = Some(Notice::Success("Portal excluido com sucesso!".to_string()));
            }
            Err(message) => self.notice = Some(Notice::Error(message)),
        }
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
        self.form_error = None;
    }
}

fn columns() -> Vec<Column<Portal>> {
    vec![
        Column::new("Cliente", |p: &Portal| Cell::text(p.nome.clone())),
        Column::new("Funil", |p: &Portal| Cell::text(p.pipeline.clone())),
        Column::new("Status", |p: &Portal| Cell::text(p.status_pipeline.clone())),
        Column::new(
            ColumnHeader::configured("Último Lead", SortType::Datetime),
            |p: &Portal| Cell::text(dates::display_or_na(p.data_ultimo_lead.as_deref())),
        ),
    ]
}
