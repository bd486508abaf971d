//! `/dashboard/tintim`: TinTim webhook integrations per client unit.
//!
//! Adding an integration is a two-step cascade: choosing a client fetches the
//! CRM units of that client (keyed on its stored credential), and choosing
//! another client discards the previous unit choice.

use crate::api::ClientesApi;
use crate::dates;
use crate::error::ApiResult;
use crate::models::{Cliente, NewTintim, TintimRecord, TintimUpdate, Unidade};
use crate::table::{Cell, Column, ColumnHeader, DataTable, SortType};

use super::{degrade, settle, Notice, PageState};

/// Select value meaning "every unit".
pub const TODAS: &str = "todas";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddTintim {
    pub cliente_id: Option<i64>,
    pub unidades: Vec<Unidade>,
    pub loading_unidades: bool,
    /// Selected unit value; empty means "todas".
    pub unidade: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditTintim {
    pub id: i64,
    pub cliente: String,
    /// Unit the integration currently points at.
    pub original: String,
    pub unidades: Vec<Unidade>,
    pub unidade: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TintimDialog {
    Add(AddTintim),
    Edit(EditTintim),
    ConfirmDelete { id: i64, label: String },
}

pub struct TintimPage {
    api: ClientesApi,
    webhook_base: String,
    pub state: PageState,
    pub table: DataTable<TintimRecord>,
    pub clientes: Vec<Cliente>,
    pub dialog: Option<TintimDialog>,
    pub form_error: Option<String>,
    pub notice: Option<Notice>,
}

impl TintimPage {
    pub fn new(api: ClientesApi, webhook_base: impl Into<String>, page_size: usize) -> Self {
        Self {
            api,
            webhook_base: webhook_base.into(),
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
        self.reload_records().await?;
        self.clientes = degrade(self.api.list_clientes().await, "clientes")?;
        self.state = PageState::Loaded;
        Ok(())
    }

    async fn reload_records(&mut self) -> ApiResult<()> {
        let records = degrade(self.api.list_tintim().await, "tintim")?;
        self.table.set_rows(records);
        Ok(())
    }

    /// Webhook link for an integration, `<base>/<unidade_formatada>`.
    pub fn webhook_link(&self, record: &TintimRecord) -> String {
        format!(
            "{}/{}",
            self.webhook_base.trim_end_matches('/'),
            record.unidade_formatada
        )
    }

    /// Show the selected row's webhook link as a notice.
    pub fn copy_link(&mut self) -> Option<String> {
        let link = self.table.selected_row().map(|r| self.webhook_link(r))?;
        self.notice = Some(Notice::Success(format!("Link do webhook: {link}")));
        Some(link)
    }

    pub fn open_add(&mut self) {
        self.form_error = None;
        self.dialog = Some(TintimDialog::Add(AddTintim::default()));
    }

    /// Choose the client in the add dialog and refetch its units. The unit
    /// choice is always cleared.
    pub async fn select_cliente(&mut self, cliente_id: Option<i64>) -> ApiResult<()> {
        let Some(TintimDialog::Add(add)) = &mut self.dialog else {
            return Ok(());
        };
        add.cliente_id = cliente_id;
        add.unidade.clear();
        add.unidades.clear();
        self.form_error = None;

        let Some(id) = cliente_id else {
            return Ok(());
        };
        add.loading_unidades = true;

        let fetched = self.unidades_for(id).await;

        // The dialog may have been replaced while the units were loading.
        match (fetched, &mut self.dialog) {
            (fetched, Some(TintimDialog::Add(add))) if add.cliente_id == Some(id) => {
                add.loading_unidades = false;
                add.unidades = fetched?;
                Ok(())
            }
            (fetched, _) => fetched.map(drop),
        }
    }

    async fn unidades_for(&self, cliente_id: i64) -> ApiResult<Vec<Unidade>> {
        let cliente = match self.api.get_cliente(cliente_id).await {
            Ok(found) => found,
            Err(e) if e.is_forbidden() => return Err(e),
            Err(e) => {
                tracing::warn!(cliente_id, "failed to look up cliente: {e}");
                None
            }
        };
        match cliente {
            Some(c) => degrade(self.api.unidades(&c.nome, &c.token).await, "unidades"),
            None => Ok(Vec::new()),
        }
    }

    /// Pick a unit value in the open add/edit dialog. Only `todas`, a listed
    /// unit or empty are accepted.
    pub fn select_unidade(&mut self, value: &str) -> bool {
        let (unidades, target) = match &mut self.dialog {
            Some(TintimDialog::Add(add)) => (&add.unidades, &mut add.unidade),
            Some(TintimDialog::Edit(edit)) => (&edit.unidades, &mut edit.unidade),
            _ => return false,
        };
        let known = value.is_empty() || value == TODAS || unidades.iter().any(|u| u.value == value);
        if known {
            *target = value.to_string();
            self.form_error = None;
        }
        known
    }

    pub async fn submit_add(&mut self) -> ApiResult<()> {
        let Some(TintimDialog::Add(add)) = &self.dialog else {
            return Ok(());
        };
        let Some(empresa_id) = add.cliente_id else {
            self.form_error = Some("Selecione um cliente.".to_string());
            return Ok(());
        };
        let nome = if add.unidade.is_empty() {
            TODAS.to_string()
        } else {
            add.unidade.clone()
        };
        let body = NewTintim {
            empresa_id,
            todas_unidades: nome == TODAS,
            nome,
        };

        self.state = PageState::Submitting;
        match settle(self.api.create_tintim(&body).await, "Erro ao cadastrar Tintim.")? {
            Ok(_) => {
                self.notice = Some(Notice::Success("Tintim cadastrado com sucesso!".to_string()));
                self.close_dialog();
                self.reload_records().await?;
            }
            Err(message) => self.form_error = Some(message),
        }
        self.state = PageState::Loaded;
        Ok(())
    }

    /// Open the edit dialog for the selected row and fetch its client's units.
    pub async fn open_edit(&mut self) -> ApiResult<()> {
        let Some(record) = self.table.selected_row().cloned() else {
            return Ok(());
        };
        let Some(cliente) = self.clientes.iter().find(|c| c.nome == record.cliente).cloned() else {
            self.notice = Some(Notice::Error("Tintim não encontrado.".to_string()));
            return Ok(());
        };

        self.form_error = None;
        self.dialog = Some(TintimDialog::Edit(EditTintim {
            id: record.id,
            cliente: record.cliente.clone(),
            original: record.unidade_formatada.clone(),
            unidades: Vec::new(),
            unidade: record.unidade_formatada.clone(),
        }));

        let unidades = degrade(self.api.unidades(&cliente.nome, &cliente.token).await, "unidades")?;
        if let Some(TintimDialog::Edit(edit)) = &mut self.dialog {
            if edit.id == record.id {
                edit.unidades = unidades;
            }
        }
        Ok(())
    }

    /// Saving is pointless while the unit is unchanged.
    pub fn can_submit_edit(&self) -> bool {
        match &self.dialog {
            Some(TintimDialog::Edit(edit)) => edit.unidade != edit.original,
            _ => false,
        }
    }

    pub async fn submit_edit(&mut self) -> ApiResult<()> {
        if !self.can_submit_edit() {
            return Ok(());
        }
        let Some(TintimDialog::Edit(edit)) = &self.dialog else {
            return Ok(());
        };
        let id = edit.id;
        let nome = if edit.unidade.is_empty() {
            TODAS.to_string()
        } else {
            edit.unidade.clone()
        };
        let update = TintimUpdate {
            todas_unidades: nome == TODAS,
            nome,
        };

        self.state = PageState::Submitting;
        match settle(self.api.update_tintim(id, &update).await, "Erro ao editar Tintim.")? {
            Ok(_) => {
                self.notice = Some(Notice::Success("Tintim editado com sucesso!".to_string()));
                self.close_dialog();
                self.reload_records().await?;
            }
            Err(message) => self.form_error = Some(message),
        }
        self.state = PageState::Loaded;
        Ok(())
    }

    pub fn open_delete(&mut self) {
        if let Some(record) = self.table.selected_row() {
            self.dialog = Some(TintimDialog::ConfirmDelete {
                id: record.id,
                label: format!("{} / {}", record.cliente, record.unidade_label()),
            });
        }
    }

    pub async fn confirm_delete(&mut self) -> ApiResult<()> {
        let Some(TintimDialog::ConfirmDelete { id, .. }) = self.dialog.clone() else {
            return Ok(());
        };
        self.dialog = None;

        match settle(self.api.delete_tintim(id).await, "Erro ao excluir Tintim.")? {
            Ok(_) => {
                let remaining: Vec<TintimRecord> =
                    self.table.rows().iter().filter(|r| r.id != id).cloned().collect();
                self.table.set_rows(remaining);
                self.notice = Some(Notice::Success("Tintim excluído com sucesso!".to_string()));
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

fn columns() -> Vec<Column<TintimRecord>> {
    vec![
        Column::new("Cliente", |r: &TintimRecord| Cell::text(r.cliente.clone())),
        Column::new("Unidade", |r: &TintimRecord| Cell::text(r.unidade_label())),
        Column::new(
            ColumnHeader::configured("Última atividade", SortType::Datetime),
            |r: &TintimRecord| Cell::text(dates::display_or_na(r.data_ultima_atividade.as_deref())),
        ),
    ]
}
