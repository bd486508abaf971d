//! `/dashboard/clientes`: client list with create, edit and delete.

use crate::api::ClientesApi;
use crate::error::ApiResult;
use crate::filter::{FieldKind, FilterForm, FilterInput, FilterSpec, SelectOption};
use crate::forms::{self, ClienteForm};
use crate::models::{Cliente, NewCliente};
use crate::table::{Cell, Column, ColumnHeader, DataTable, SortType};

use super::{degrade, settle, Notice, PageState};

/// Open dialog on the clients page.
#[derive(Debug, Clone, PartialEq)]
pub enum ClienteDialog {
    Create(ClienteForm),
    Edit { id: i64, form: ClienteForm },
    ConfirmDelete { id: i64, nome: String },
}

impl ClienteDialog {
    pub fn form_mut(&mut self) -> Option<&mut ClienteForm> {
        match self {
            ClienteDialog::Create(form) | ClienteDialog::Edit { form, .. } => Some(form),
            ClienteDialog::ConfirmDelete { .. } => None,
        }
    }
}

pub struct ClientesPage {
    api: ClientesApi,
    pub state: PageState,
    clientes: Vec<Cliente>,
    pub table: DataTable<Cliente>,
    pub filter: FilterForm,
    spec: FilterSpec<Cliente>,
    pub dialog: Option<ClienteDialog>,
    pub form_error: Option<String>,
    pub notice: Option<Notice>,
}

impl ClientesPage {
    pub fn new(api: ClientesApi, page_size: usize) -> Self {
        Self {
            api,
            state: PageState::Loading,
            clientes: Vec::new(),
            table: DataTable::new(columns(), page_size),
            filter: FilterForm::new(vec![
                FilterInput::new("Nome", "Nome", FieldKind::Text)
                    .with_placeholder("Buscar cliente..."),
                FilterInput::new(
                    "Automotivo",
                    "Automotivo",
                    FieldKind::Radio(vec![
                        SelectOption::new("Sim", "true"),
                        SelectOption::new("Não", "false"),
                    ]),
                ),
            ]),
            spec: FilterSpec::new()
                .text_contains("Nome", |c: &Cliente| Some(c.nome.clone()))
                .flag("Automotivo", |c: &Cliente| c.automotivo),
            dialog: None,
            form_error: None,
            notice: None,
        }
    }

    pub fn clientes(&self) -> &[Cliente] {
        &self.clientes
    }

    /// Fetch the list and re-apply the current filter.
    pub async fn load(&mut self) -> ApiResult<()> {
        self.state = PageState::Loading;
        self.clientes = degrade(self.api.list_clientes().await, "clientes")?;
        tracing::debug!(count = self.clientes.len(), "clientes loaded");
        self.apply_filter();
        self.state = PageState::Loaded;
        Ok(())
    }

    pub fn apply_filter(&mut self) {
        let rows = self.spec.apply(&self.filter.payload(), &self.clientes);
        self.table.set_rows(rows);
    }

    /// Clear the filter and show every client.
    pub fn reset_filter(&mut self) {
        let mut payload = None;
        self.filter.reset(|p| payload = Some(p.clone()));
        if let Some(payload) = payload {
            let rows = self.spec.apply(&payload, &self.clientes);
            self.table.set_rows(rows);
        }
    }

    pub fn open_create(&mut self) {
        self.form_error = None;
        self.dialog = Some(ClienteDialog::Create(ClienteForm::default()));
    }

    pub fn open_edit(&mut self) {
        let Some(cliente) = self.table.selected_row() else {
            return;
        };
        self.form_error = None;
        self.dialog = Some(ClienteDialog::Edit {
            id: cliente.id,
            form: ClienteForm {
                nome: cliente.nome.clone(),
                token: cliente.token.clone(),
                automotivo: cliente.automotivo,
            },
        });
    }

    pub fn open_delete(&mut self) {
        if let Some(cliente) = self.table.selected_row() {
            self.dialog = Some(ClienteDialog::ConfirmDelete {
                id: cliente.id,
                nome: cliente.nome.clone(),
            });
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
        self.form_error = None;
    }

    /// Submit the open create/edit dialog. On success the list is refetched
    /// and the dialog closes; on failure the dialog stays open with an error.
    pub async fn submit(&mut self) -> ApiResult<()> {
        let (id, form) = match &self.dialog {
            Some(ClienteDialog::Create(form)) => (None, form.clone()),
            Some(ClienteDialog::Edit { id, form }) => (Some(*id), form.clone()),
            _ => return Ok(()),
        };

        if let Err(message) = forms::check(&form) {
            self.form_error = Some(message);
            return Ok(());
        }

        let body = NewCliente {
            nome: form.nome.trim().to_string(),
            token: form.token.trim().to_string(),
            automotivo: form.automotivo,
        };

        self.state = PageState::Submitting;
        let (result, failure, success) = match id {
            None => (
                self.api.create_cliente(&body).await,
                "Erro ao cadastrar cliente.",
                "Cliente cadastrado com sucesso!",
            ),
            Some(id) => (
                self.api.update_cliente(id, &body).await,
                "Erro ao editar cliente.",
                "Cliente editado com sucesso!",
            ),
        };

        match settle(result, failure)? {
            Ok(_) => {
                tracing::info!(nome = %body.nome, "cliente saved");
                self.notice = Some(Notice::Success(success.to_string()));
                self.close_dialog();
                self.load().await?;
            }
            Err(message) => {
                self.form_error = Some(message);
                self.state = PageState::Loaded;
            }
        }
        Ok(())
    }

    /// Run the confirmed delete.
    pub async fn confirm_delete(&mut self) -> ApiResult<()> {
        let Some(ClienteDialog::ConfirmDelete { id, .. }) = self.dialog.clone() else {
            return Ok(());
        };
        self.dialog = None;

        match settle(self.api.delete_cliente(id).await, "Erro ao excluir cliente.")? {
            Ok(_) => {
                self.clientes.retain(|c| c.id != id);
                self.apply_filter();
                self.notice = Some(Notice::Success("Cliente excluído com sucesso!".to_string()));
            }
            Err(message) => self.notice = Some(Notice::Error(message)),
        }
        Ok(())
    }
}

fn columns() -> Vec<Column<Cliente>> {
    vec![
        Column::new(ColumnHeader::configured("ID", SortType::Number), |c: &Cliente| {
            Cell::text(c.id.to_string())
        }),
        Column::new("Nome", |c: &Cliente| Cell::text(c.nome.clone())),
        Column::new(
            ColumnHeader::configured("Automotivo", SortType::Boolean),
            |c: &Cliente| Cell::Flag(c.automotivo),
        ),
    ]
}
