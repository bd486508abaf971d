//! `/dashboard/contas`: master/slave account groups of the sync backend.
//!
//! Progress shown after a group trigger is [`SyncProgress::Simulated`]: a
//! local estimate advanced 10% per elapsed second by the frontend tick. The
//! backend reports no progress, so the bar never claims to be real.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};

use crate::api::SyncApi;
use crate::error::ApiResult;
use crate::forms::{self, AccountForm, GroupForm};
use crate::models::{Account, AccountGroup, GroupPayload, NewAccount, SlaveAccount, SyncType};

use super::{degrade, settle, Notice, PageState};

const STEP: Duration = Duration::from_secs(1);
const STEP_PERCENT: u8 = 10;
const MAX_LOG_LINES: usize = 500;

/// Estimated progress of a group sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncProgress {
    Idle,
    /// Client-side estimate, not reported by the backend.
    Simulated {
        percent: u8,
        last_step: Instant,
        label: String,
    },
}

impl SyncProgress {
    pub fn start(label: impl Into<String>, now: Instant) -> Self {
        SyncProgress::Simulated {
            percent: 0,
            last_step: now,
            label: label.into(),
        }
    }

    pub fn percent(&self) -> u8 {
        match self {
            SyncProgress::Idle => 0,
            SyncProgress::Simulated { percent, .. } => *percent,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, SyncProgress::Simulated { percent, .. } if *percent < 100)
    }

    /// Advance one step per elapsed second. Returns true on the tick that
    /// reaches 100%.
    pub fn tick(&mut self, now: Instant) -> bool {
        let SyncProgress::Simulated {
            percent, last_step, ..
        } = self
        else {
            return false;
        };
        if *percent >= 100 {
            return false;
        }
        while *percent < 100 && now.saturating_duration_since(*last_step) >= STEP {
            *percent = (*percent + STEP_PERCENT).min(100);
            *last_step += STEP;
        }
        *percent >= 100
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Compact,
    Expanded,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Compact => "compacto",
            ViewMode::Expanded => "expandido",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub accounts: usize,
    pub groups: usize,
    pub total_contacts: i64,
    pub masters: usize,
    pub slaves: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub time: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncDialog {
    AddAccount(AccountForm),
    /// New slave account created straight into a group.
    AddSlave {
        group_id: i64,
        group_name: String,
        form: AccountForm,
    },
    /// Attach an existing account to a group.
    AssociateSlave {
        group_id: i64,
        account_id: Option<i64>,
    },
    CreateGroup(GroupForm),
    EditGroup {
        id: i64,
        form: GroupForm,
    },
    ConfirmDeleteGroup {
        id: i64,
        name: String,
    },
    ConfirmRemoveSlave {
        account_id: i64,
        subdomain: String,
    },
    ViewAccounts {
        group_id: i64,
    },
}

/// Message from a running batch sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Synced { account_id: i64, error: Option<String> },
    Finished { attempted: usize },
}

struct BatchRun {
    stop: Arc<AtomicBool>,
    events: UnboundedReceiver<BatchEvent>,
    total: usize,
    done: usize,
}

pub struct SyncDashboard {
    api: SyncApi,
    batch_delay: Duration,
    pub state: PageState,
    /// Every account known to the sync backend.
    pub accounts: Vec<Account>,
    /// Groups with their master and slaves.
    pub groups: Vec<AccountGroup>,
    /// Cursor over `groups`.
    pub cursor: usize,
    /// Group targeted by the trigger action.
    pub sync_group: Option<i64>,
    pub sync_type: SyncType,
    pub selected_accounts: BTreeSet<i64>,
    pub view_mode: ViewMode,
    pub progress: SyncProgress,
    pub operation: String,
    pub dialog: Option<SyncDialog>,
    pub form_error: Option<String>,
    pub notice: Option<Notice>,
    logs: Vec<LogEntry>,
    batch: Option<BatchRun>,
}

impl SyncDashboard {
    pub fn new(api: SyncApi, batch_delay: Duration) -> Self {
        Self {
            api,
            batch_delay,
            state: PageState::Loading,
            accounts: Vec::new(),
            groups: Vec::new(),
            cursor: 0,
            sync_group: None,
            sync_type: SyncType::Full,
            selected_accounts: BTreeSet::new(),
            view_mode: ViewMode::default(),
            progress: SyncProgress::Idle,
            operation: "Aguardando".to_string(),
            dialog: None,
            form_error: None,
            notice: None,
            logs: Vec::new(),
            batch: None,
        }
    }

    // Logging

    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.logs.push(LogEntry {
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
            message,
        });
        if self.logs.len() > MAX_LOG_LINES {
            let excess = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(..excess);
        }
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    fn fail(&mut self, title: &str, message: String) {
        self.log(format!("ERRO: {title} - {message}"));
        self.notice = Some(Notice::Error(format!("{title}: {message}")));
    }

    // Loading

    pub async fn load(&mut self) -> ApiResult<()> {
        self.state = PageState::Loading;
        self.load_groups().await?;
        self.load_accounts().await?;
        self.state = PageState::Loaded;
        Ok(())
    }

    pub async fn load_groups(&mut self) -> ApiResult<()> {
        match self.api.groups_overview().await {
            Ok(groups) => {
                self.groups = groups;
                self.cursor = self.cursor.min(self.groups.len().saturating_sub(1));
                if self
                    .sync_group
                    .is_some_and(|id| !self.groups.iter().any(|g| g.id == id))
                {
                    self.sync_group = None;
                }
                self.log(format!(
                    "{} grupos carregados com detalhes e contas escravas",
                    self.groups.len()
                ));
            }
            Err(e) if e.is_forbidden() => return Err(e),
            Err(e) => {
                self.groups.clear();
                self.cursor = 0;
                self.fail(
                    "Erro ao Carregar Grupos",
                    e.user_message("Falha ao carregar grupos da API"),
                );
            }
        }
        Ok(())
    }

    pub async fn load_accounts(&mut self) -> ApiResult<()> {
        self.accounts = degrade(self.api.list_accounts().await, "contas")?;
        self.selected_accounts
            .retain(|id| self.accounts.iter().any(|a| a.id == *id));
        self.log(format!("{} contas carregadas", self.accounts.len()));
        Ok(())
    }

    // Derived views

    pub fn slave_accounts(&self) -> Vec<&SlaveAccount> {
        self.groups.iter().flat_map(|g| g.slave_accounts.iter()).collect()
    }

    pub fn master_accounts(&self) -> Vec<&Account> {
        self.accounts.iter().filter(|a| a.is_master).collect()
    }

    pub fn stats(&self) -> SyncStats {
        SyncStats {
            accounts: self.accounts.len(),
            groups: self.groups.len(),
            total_contacts: self
                .groups
                .iter()
                .map(|g| {
                    g.total_contacts.unwrap_or_else(|| {
                        g.slave_accounts
                            .iter()
                            .filter_map(|s| s.contact_count)
                            .sum()
                    })
                })
                .sum(),
            masters: self.accounts.iter().filter(|a| a.is_master).count(),
            slaves: self.accounts.iter().filter(|a| !a.is_master).count(),
        }
    }

    pub fn current_group(&self) -> Option<&AccountGroup> {
        self.groups.get(self.cursor)
    }

    pub fn next_group(&mut self) {
        if self.cursor + 1 < self.groups.len() {
            self.cursor += 1;
        }
    }

    pub fn prev_group(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Compact => ViewMode::Expanded,
            ViewMode::Expanded => ViewMode::Compact,
        };
        self.log(format!(
            "Modo de visualização alterado para {}",
            self.view_mode.label()
        ));
    }

    pub fn toggle_account_selection(&mut self, account_id: i64) {
        if !self.selected_accounts.remove(&account_id) {
            self.selected_accounts.insert(account_id);
        }
    }

    pub fn select_sync_group(&mut self, group_id: Option<i64>) {
        self.sync_group = group_id.filter(|id| self.groups.iter().any(|g| g.id == *id));
        if let Some(group) = self
            .sync_group
            .and_then(|id| self.groups.iter().find(|g| g.id == id))
        {
            let name = group.name.clone();
            self.log(format!("Grupo selecionado: {name}"));
        }
    }

    pub fn cycle_sync_type(&mut self) {
        let index = SyncType::ALL
            .iter()
            .position(|t| *t == self.sync_type)
            .unwrap_or(0);
        self.sync_type = SyncType::ALL[(index + 1) % SyncType::ALL.len()];
    }

    // Sync actions

    /// Whether a group sync estimate or a batch is in progress.
    pub fn is_syncing(&self) -> bool {
        self.progress.is_running() || self.batch.is_some()
    }

    pub async fn sync_account(&mut self, account_id: i64) -> ApiResult<()> {
        match settle(self.api.sync_account(account_id).await, "Erro na sincronização")? {
            Ok(_) => self.log(format!("Sincronização da conta {account_id} concluída")),
            Err(_) => self.log(format!("Erro na sincronização da conta {account_id}")),
        }
        Ok(())
    }

    /// Trigger a sync of the selected group and start the progress estimate.
    pub async fn trigger_group_sync(&mut self, now: Instant) -> ApiResult<()> {
        if self.is_syncing() {
            return Ok(());
        }
        let Some(group) = self
            .sync_group
            .and_then(|id| self.groups.iter().find(|g| g.id == id))
        else {
            self.notice = Some(Notice::Error("Selecione um grupo para sincronizar.".to_string()));
            return Ok(());
        };
        let (group_id, name) = (group.id, group.name.clone());
        let sync_type = self.sync_type;

        self.operation = format!("Sincronizando grupo {name}");
        self.log(format!("Sincronizando grupo ID: {group_id} - {name}"));

        let failure = format!("Erro na Sincronização: {}", sync_type.as_str());
        match settle(self.api.trigger_group_sync(group_id, sync_type).await, &failure)? {
            Ok(_) => {
                self.log(format!("Sincronização {} iniciada com sucesso", sync_type.as_str()));
                self.progress = SyncProgress::start(format!("Sincronizando grupo: {name}"), now);
            }
            Err(message) => {
                self.fail(&failure, message);
                self.operation = "Erro".to_string();
                self.progress = SyncProgress::Idle;
            }
        }
        Ok(())
    }

    /// Advance the estimate and drain batch events. Returns true when the
    /// data should be reloaded.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut reload = false;

        if self.progress.tick(now) {
            self.operation = "Concluído".to_string();
            if let Some(name) = self
                .sync_group
                .and_then(|id| self.groups.iter().find(|g| g.id == id))
                .map(|g| g.name.clone())
            {
                self.log(format!("Sincronização do grupo {name} concluída"));
            }
            reload = true;
        }

        let mut events = Vec::new();
        let mut disconnected = false;
        if let Some(batch) = &mut self.batch {
            loop {
                match batch.events.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        for event in events {
            match event {
                BatchEvent::Synced { account_id, error } => {
                    if let Some(batch) = &mut self.batch {
                        batch.done += 1;
                    }
                    match error {
                        None => self.log(format!("Sincronização da conta {account_id} concluída")),
                        Some(e) => self.log(format!("Erro na sincronização da conta {account_id}: {e}")),
                    }
                }
                BatchEvent::Finished { attempted } => {
                    self.log(format!("Sincronização em lote concluída ({attempted} contas)"));
                    self.batch = None;
                    self.operation = "Concluído".to_string();
                    reload = true;
                }
            }
        }
        if disconnected && self.batch.is_some() {
            self.batch = None;
        }

        reload
    }

    /// Batch progress as (done, total).
    pub fn batch_progress(&self) -> Option<(usize, usize)> {
        self.batch.as_ref().map(|b| (b.done, b.total))
    }

    pub fn sync_all(&mut self) {
        let ids: Vec<i64> = self.accounts.iter().map(|a| a.id).collect();
        self.log("Iniciando sincronização em lote...");
        self.start_batch(ids);
    }

    pub fn sync_selected(&mut self) {
        let ids: Vec<i64> = self
            .accounts
            .iter()
            .map(|a| a.id)
            .filter(|id| self.selected_accounts.contains(id))
            .collect();
        if ids.is_empty() {
            self.notice = Some(Notice::Error("Nenhuma conta selecionada.".to_string()));
            return;
        }
        self.log("Iniciando sincronização das contas selecionadas...");
        self.start_batch(ids);
    }

    /// Spawn the sequential sync on the current tokio runtime.
    fn start_batch(&mut self, ids: Vec<i64>) {
        if self.is_syncing() || ids.is_empty() {
            return;
        }
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::unbounded_channel();
        let api = self.api.clone();
        let delay = self.batch_delay;
        let task_stop = Arc::clone(&stop);

        self.batch = Some(BatchRun {
            stop,
            events: rx,
            total: ids.len(),
            done: 0,
        });
        self.operation = format!("Sincronizando {} contas", ids.len());

        tokio::spawn(async move {
            let attempted = api
                .sync_accounts_sequentially(&ids, delay, &task_stop, |account_id, result| {
                    let error = result.as_ref().err().map(|e| e.to_string());
                    let _ = tx.send(BatchEvent::Synced { account_id, error });
                })
                .await;
            let _ = tx.send(BatchEvent::Finished { attempted });
        });
    }

    /// Stop the batch between accounts and reset the progress display. A
    /// request already sent is not cancelled.
    pub fn stop_sync(&mut self) {
        if let Some(batch) = self.batch.take() {
            batch.stop.store(true, Ordering::SeqCst);
        }
        self.progress = SyncProgress::Idle;
        self.operation = "Interrompido".to_string();
        self.log("Sincronização interrompida pelo usuário");
    }

    // Dialogs

    pub fn open_add_account(&mut self) {
        self.open(SyncDialog::AddAccount(AccountForm::default()));
        self.log("Abrindo modal de adição de conta");
    }

    pub fn open_add_slave(&mut self) {
        if let Some(group) = self.current_group() {
            let dialog = SyncDialog::AddSlave {
                group_id: group.id,
                group_name: group.name.clone(),
                form: AccountForm::default(),
            };
            self.open(dialog);
        }
    }

    pub fn open_associate_slave(&mut self) {
        if let Some(group) = self.current_group() {
            let dialog = SyncDialog::AssociateSlave {
                group_id: group.id,
                account_id: None,
            };
            self.open(dialog);
        }
    }

    /// Accounts that may still be attached to the group as slaves.
    pub fn associable_accounts(&self, group_id: i64) -> Vec<&Account> {
        let group = self.groups.iter().find(|g| g.id == group_id);
        self.accounts
            .iter()
            .filter(|a| !a.is_master)
            .filter(|a| {
                group.map_or(true, |g| !g.slave_accounts.iter().any(|s| s.id == a.id))
            })
            .collect()
    }

    pub fn open_create_group(&mut self) {
        self.open(SyncDialog::CreateGroup(GroupForm::default()));
        self.log("Abrindo modal para criar novo grupo...");
    }

    pub fn open_edit_group(&mut self) {
        if let Some(group) = self.current_group() {
            let dialog = SyncDialog::EditGroup {
                id: group.id,
                form: GroupForm {
                    name: group.name.clone(),
                    description: group.description.clone(),
                    master_account_id: group.master_account.as_ref().map_or(0, |m| m.id),
                },
            };
            let name = group.name.clone();
            self.open(dialog);
            self.log(format!("Editando grupo: {name}"));
        }
    }

    pub fn open_delete_group(&mut self) {
        if let Some(group) = self.current_group() {
            let dialog = SyncDialog::ConfirmDeleteGroup {
                id: group.id,
                name: group.name.clone(),
            };
            let name = group.name.clone();
            self.open(dialog);
            self.log(format!("Solicitando exclusão do grupo: {name}"));
        }
    }

    pub fn open_remove_slave(&mut self, account_id: i64) {
        let subdomain = self
            .slave_accounts()
            .into_iter()
            .find(|s| s.id == account_id)
            .map(|s| s.subdomain.clone());
        if let Some(subdomain) = subdomain {
            self.open(SyncDialog::ConfirmRemoveSlave {
                account_id,
                subdomain,
            });
        }
    }

    pub fn open_view_accounts(&mut self) {
        if let Some(group) = self.current_group() {
            let dialog = SyncDialog::ViewAccounts { group_id: group.id };
            self.open(dialog);
        }
    }

    fn open(&mut self, dialog: SyncDialog) {
        self.form_error = None;
        self.dialog = Some(dialog);
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
        self.form_error = None;
    }

    /// Submit the open form dialog.
    pub async fn submit(&mut self) -> ApiResult<()> {
        let Some(dialog) = self.dialog.clone() else {
            return Ok(());
        };

        let validation = match &dialog {
            SyncDialog::AddAccount(form) | SyncDialog::AddSlave { form, .. } => forms::check(form),
            SyncDialog::CreateGroup(form) | SyncDialog::EditGroup { form, .. } => forms::check(form),
            SyncDialog::AssociateSlave { account_id: None, .. } => {
                Err("Selecione uma conta.".to_string())
            }
            _ => Ok(()),
        };
        if let Err(message) = validation {
            self.form_error = Some(message);
            return Ok(());
        }

        self.state = PageState::Submitting;
        let outcome = match &dialog {
            SyncDialog::AddAccount(form) => {
                self.log(format!("Adicionando conta: {}", form.subdomain));
                let body = new_account(form, form.is_master, None);
                settle(self.api.create_account(&body).await, "Erro ao adicionar conta")?
                    .map(|_| format!("Conta {} adicionada com sucesso", body.subdomain))
            }
            SyncDialog::AddSlave {
                group_id,
                group_name,
                form,
            } => {
                self.log(format!("Adicionando conta escrava: {}", form.subdomain));
                let body = new_account(form, false, Some(*group_id));
                settle(self.api.create_account(&body).await, "Erro ao adicionar conta")?.map(|_| {
                    format!(
                        "Conta escrava {} adicionada com sucesso ao grupo {group_name}",
                        body.subdomain
                    )
                })
            }
            SyncDialog::AssociateSlave {
                group_id,
                account_id: Some(account_id),
            } => settle(
                self.api.add_slave(*group_id, *account_id).await,
                "Erro ao associar conta escrava",
            )?
            .map(|_| format!("Conta {account_id} associada ao grupo {group_id}")),
            SyncDialog::CreateGroup(form) => {
                self.log(format!("Criando grupo: {}", form.name));
                settle(self.api.create_group(&group_payload(form)).await, "Erro ao criar grupo")?
                    .map(|_| format!("Grupo \"{}\" criado com sucesso", form.name.trim()))
            }
            SyncDialog::EditGroup { id, form } => {
                self.log(format!("Salvando alterações do grupo: {}", form.name));
                settle(self.api.update_group(*id, &group_payload(form)).await, "Erro ao editar grupo")?
                    .map(|_| format!("Grupo \"{}\" atualizado com sucesso", form.name.trim()))
            }
            _ => {
                self.state = PageState::Loaded;
                return Ok(());
            }
        };

        match outcome {
            Ok(message) => {
                self.log(message.clone());
                self.notice = Some(Notice::Success(message));
                self.close_dialog();
                self.load_groups().await?;
                self.load_accounts().await?;
            }
            Err(message) => {
                self.log(format!("ERRO: {message}"));
                self.form_error = Some(message);
            }
        }
        self.state = PageState::Loaded;
        Ok(())
    }

    /// Run the open confirmation dialog.
    pub async fn confirm(&mut self) -> ApiResult<()> {
        let Some(dialog) = self.dialog.clone() else {
            return Ok(());
        };

        let outcome = match dialog {
            SyncDialog::ConfirmDeleteGroup { id, name } => {
                self.log(format!("Iniciando exclusão do grupo: {name}"));
                settle(self.api.delete_group(id).await, "Erro ao excluir grupo")?
                    .map(|_| format!("Grupo \"{name}\" e todas as suas contas foram excluídos com sucesso"))
            }
            SyncDialog::ConfirmRemoveSlave {
                account_id,
                subdomain,
            } => {
                self.log(format!("Removendo conta escrava ID: {account_id}"));
                settle(self.api.delete_account(account_id).await, "Erro ao remover conta escrava")?
                    .map(|_| format!("Conta escrava {subdomain} removida com sucesso"))
            }
            _ => return Ok(()),
        };
        self.dialog = None;

        match outcome {
            Ok(message) => {
                self.log(message.clone());
                self.notice = Some(Notice::Success(message));
                self.load_groups().await?;
                self.load_accounts().await?;
            }
            Err(message) => self.fail("Erro", message),
        }
        Ok(())
    }
}

fn new_account(form: &AccountForm, is_master: bool, group_id: Option<i64>) -> NewAccount {
    NewAccount {
        subdomain: form.subdomain.trim().to_string(),
        refresh_token: form.refresh_token.trim().to_string(),
        is_master,
        group_id,
    }
}

fn group_payload(form: &GroupForm) -> GroupPayload {
    GroupPayload {
        name: form.name.trim().to_string(),
        description: form.description.trim().to_string(),
        master_account_id: form.master_account_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_progress_steps_ten_percent_per_second() {
        let start = Instant::now();
        let mut progress = SyncProgress::start("grupo", start);
        assert_eq!(progress.percent(), 0);

        assert!(!progress.tick(start + Duration::from_millis(900)));
        assert_eq!(progress.percent(), 0);

        assert!(!progress.tick(start + Duration::from_millis(1000)));
        assert_eq!(progress.percent(), 10);

        assert!(!progress.tick(start + Duration::from_millis(3500)));
        assert_eq!(progress.percent(), 30);
        assert!(progress.is_running());

        assert!(progress.tick(start + Duration::from_secs(10)));
        assert_eq!(progress.percent(), 100);
        assert!(!progress.is_running());
        assert!(!progress.tick(start + Duration::from_secs(11)));
    }

    #[test]
    fn idle_progress_never_completes() {
        let mut progress = SyncProgress::Idle;
        assert!(!progress.tick(Instant::now() + Duration::from_secs(60)));
        assert_eq!(progress.percent(), 0);
    }
}
