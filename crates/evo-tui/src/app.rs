//! Application state management.

use std::time::{Duration, Instant};

use anyhow::Result;
use evo_core::filter::{FieldKind, FilterForm, SelectOption};
use evo_core::forms::{self, LoginForm};
use evo_core::pages::clientes::ClienteDialog;
use evo_core::pages::pipelines::PipelineDialog;
use evo_core::pages::portais::{FunnelChoice, PortalDialog};
use evo_core::pages::sync_dashboard::SyncDialog;
use evo_core::pages::tintim::{TintimDialog, TODAS};
use evo_core::pages::{
    ClientesPage, Notice, PipelinesPage, PortaisMonitoringPage, PortaisPage, SyncDashboard,
    TintimMonitoringPage, TintimPage,
};
use evo_core::table::{Cell, DataTable, ResolvedHeader, SortDirection};
use evo_core::theme::{FileStore, MemoryStore, PreferenceStore};
use evo_core::{
    ApiError, ApiResult, ClientesApi, Config, Picker, Route, Session, SyncApi, Theme, ThemeState,
};
use tokio::runtime::Handle;

use crate::form::{Field, FieldAction, PickTarget, TextTarget, ToggleTarget};

/// How long a toast stays on screen.
const TOAST_TTL: Duration = Duration::from_secs(4);

/// Application state.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Running,
    /// Application should quit.
    Quit,
}

/// Input mode for the application.
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Typing into a text field.
    Editing,
    /// Choosing from the fuzzy picker.
    Picking,
}

/// Focus area within a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    /// The page's table (or group list on the sync dashboard).
    Main,
    /// The filter panel.
    Filter,
    /// The account list on the sync dashboard.
    Accounts,
}

/// Controller of the current route.
pub enum Page {
    Login,
    Home,
    Clientes(ClientesPage),
    Pipelines(PipelinesPage),
    Tintim(TintimPage),
    TintimMonitoring(TintimMonitoringPage),
    Portais(PortaisPage),
    PortaisMonitoring(PortaisMonitoringPage),
    Contas(SyncDashboard),
}

/// Text being typed into a field.
#[derive(Debug, Clone)]
pub struct Editor {
    pub target: TextTarget,
    pub label: String,
    pub buffer: String,
    pub masked: bool,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    pub shown_at: Instant,
}

/// Theme preference storage: the preferences file, or memory when there is
/// no usable config directory.
pub enum Prefs {
    File(FileStore),
    Memory(MemoryStore),
}

impl Prefs {
    pub fn open() -> Self {
        match FileStore::default_path().and_then(FileStore::open) {
            Ok(store) => Prefs::File(store),
            Err(e) => {
                tracing::warn!("Preferences unavailable, theme will not persist: {e:#}");
                Prefs::Memory(MemoryStore::default())
            }
        }
    }
}

impl PreferenceStore for Prefs {
    fn read(&self, key: &str) -> Option<String> {
        match self {
            Prefs::File(store) => store.read(key),
            Prefs::Memory(store) => store.read(key),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        match self {
            Prefs::File(store) => store.write(key, value),
            Prefs::Memory(store) => store.write(key, value),
        }
    }
}

/// Object-safe view over any page table, for rendering and key handling.
pub trait TableView {
    fn headers(&self) -> Vec<&ResolvedHeader>;
    fn sort_indicator(&self, column: usize) -> Option<SortDirection>;
    fn toggle_sort(&mut self, column: usize);
    fn page_cells(&self) -> Vec<Vec<Cell>>;
    fn selected_index(&self) -> usize;
    fn select_next(&mut self);
    fn select_prev(&mut self);
    fn next_page(&mut self);
    fn prev_page(&mut self);
    fn page(&self) -> usize;
    fn page_count(&self) -> usize;
    fn len(&self) -> usize;
}

impl<R> TableView for DataTable<R> {
    fn headers(&self) -> Vec<&ResolvedHeader> {
        self.columns().iter().map(|c| c.header()).collect()
    }

    fn sort_indicator(&self, column: usize) -> Option<SortDirection> {
        DataTable::sort_indicator(self, column)
    }

    fn toggle_sort(&mut self, column: usize) {
        DataTable::toggle_sort(self, column);
    }

    fn page_cells(&self) -> Vec<Vec<Cell>> {
        DataTable::page_cells(self)
    }

    fn selected_index(&self) -> usize {
        DataTable::selected_index(self)
    }

    fn select_next(&mut self) {
        DataTable::select_next(self)
    }

    fn select_prev(&mut self) {
        DataTable::select_prev(self)
    }

    fn next_page(&mut self) {
        DataTable::next_page(self)
    }

    fn prev_page(&mut self) {
        DataTable::prev_page(self)
    }

    fn page(&self) -> usize {
        DataTable::page(self)
    }

    fn page_count(&self) -> usize {
        DataTable::page_count(self)
    }

    fn len(&self) -> usize {
        DataTable::len(self)
    }
}

/// Main application model.
pub struct App {
    pub state: AppState,
    pub input_mode: InputMode,
    pub focus: Focus,
    pub route: Route,
    pub page: Page,
    pub theme: ThemeState<Prefs>,
    pub toast: Option<Toast>,

    // Login state
    pub login: LoginForm,
    pub login_error: Option<String>,

    /// Field under the cursor in the login form, open dialog or filter panel.
    pub field_cursor: usize,
    pub editor: Option<Editor>,
    pub picker: Option<(PickTarget, Picker)>,

    /// Selected entry on the home menu.
    pub menu_cursor: usize,
    /// Selected account on the sync dashboard.
    pub account_cursor: usize,
    /// Selected slave in the group accounts dialog.
    pub dialog_cursor: usize,

    config: Config,
    session: Session,
    clientes_api: ClientesApi,
    sync_api: SyncApi,
    runtime: Handle,
}

impl App {
    /// Create the application and open `initial` (or the login route when
    /// there is no session).
    pub fn new(config: Config, session: Session, runtime: Handle, initial: Route) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let clientes_api = ClientesApi::new(&config.api_url, timeout, session.clone())?;
        let sync_session = config.sync_api_auth.then(|| session.clone());
        let sync_api = SyncApi::new(&config.sync_api_url, timeout, sync_session)?;

        let mut app = Self {
            state: AppState::Running,
            input_mode: InputMode::Normal,
            focus: Focus::Main,
            route: Route::Login,
            page: Page::Login,
            theme: ThemeState::load(Prefs::open()),
            toast: None,
            login: LoginForm::default(),
            login_error: None,
            field_cursor: 0,
            editor: None,
            picker: None,
            menu_cursor: 0,
            account_cursor: 0,
            dialog_cursor: 0,
            config,
            session,
            clientes_api,
            sync_api,
            runtime,
        };
        app.navigate(initial);
        Ok(app)
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // Navigation

    /// Switch route, building and loading the new page. Protected routes
    /// fall back to login without a session.
    pub fn navigate(&mut self, route: Route) {
        let route = if route.requires_auth() && !self.session.is_authenticated() {
            Route::Login
        } else {
            route
        };
        tracing::info!(route = %route, "navigate");

        self.page = self.build_page(&route);
        self.route = route;
        self.input_mode = InputMode::Normal;
        self.focus = Focus::Main;
        self.field_cursor = 0;
        self.editor = None;
        self.picker = None;
        self.account_cursor = 0;
        self.dialog_cursor = 0;
        self.reload();
    }

    fn build_page(&self, route: &Route) -> Page {
        let api = self.clientes_api.clone();
        let size = self.config.page_size;
        match route {
            Route::Login => Page::Login,
            Route::Dashboard => Page::Home,
            Route::Clientes => Page::Clientes(ClientesPage::new(api, size)),
            Route::Pipelines { cliente_id } => {
                Page::Pipelines(PipelinesPage::new(api, *cliente_id, size))
            }
            Route::Tintim => Page::Tintim(TintimPage::new(
                api,
                self.config.tintim_webhook_base.clone(),
                size,
            )),
            Route::TintimMonitoring { id } => {
                Page::TintimMonitoring(TintimMonitoringPage::new(api, *id, size))
            }
            Route::Portais => Page::Portais(PortaisPage::new(api, size)),
            Route::PortaisMonitoring { id } => {
                Page::PortaisMonitoring(PortaisMonitoringPage::new(api, *id, size))
            }
            Route::Contas => Page::Contas(SyncDashboard::new(
                self.sync_api.clone(),
                Duration::from_millis(self.config.sync_batch_delay_ms),
            )),
        }
    }

    /// One level up: pipelines and monitoring go back to their list page,
    /// everything else to the dashboard.
    pub fn back(&mut self) {
        let target = match self.route {
            Route::Login | Route::Dashboard => return,
            Route::Pipelines { .. } => Route::Clientes,
            Route::TintimMonitoring { .. } => Route::Tintim,
            Route::PortaisMonitoring { .. } => Route::Portais,
            _ => Route::Dashboard,
        };
        self.navigate(target);
    }

    /// Open the route under the home menu cursor.
    pub fn open_menu_entry(&mut self) {
        if let Some(route) = Route::menu().get(self.menu_cursor).cloned() {
            self.navigate(route);
        }
    }

    pub fn logout(&mut self) {
        tracing::info!("logout");
        self.session.clear();
        self.navigate(Route::Login);
    }

    // Data

    /// Refetch the current page's data.
    pub fn reload(&mut self) {
        let result = match &mut self.page {
            Page::Login | Page::Home => Ok(()),
            Page::Clientes(p) => self.runtime.block_on(p.load()),
            Page::Pipelines(p) => self.runtime.block_on(p.load()),
            Page::Tintim(p) => self.runtime.block_on(p.load()),
            Page::TintimMonitoring(p) => self.runtime.block_on(p.load()),
            Page::Portais(p) => self.runtime.block_on(p.load()),
            Page::PortaisMonitoring(p) => self.runtime.block_on(p.load()),
            Page::Contas(d) => self.runtime.block_on(d.load()),
        };
        self.finish(result);
    }

    /// Settle the outcome of a page action: forbidden ends the session,
    /// anything else surfaces the page's notice.
    fn finish(&mut self, result: ApiResult<()>) {
        match result {
            Ok(()) => self.collect_notice(),
            Err(ApiError::Forbidden) => {
                tracing::warn!("Session rejected by the backend, back to login");
                let message = ApiError::Forbidden.user_message("");
                self.session.clear();
                self.navigate(Route::Login);
                self.show(Notice::Error(message));
            }
            Err(e) => {
                tracing::error!("Unexpected page error: {e}");
                self.show(Notice::Error(e.user_message("Erro inesperado.")));
            }
        }
    }

    fn collect_notice(&mut self) {
        let notice = match &mut self.page {
            Page::Clientes(p) => p.notice.take(),
            Page::Pipelines(p) => p.notice.take(),
            Page::Tintim(p) => p.notice.take(),
            Page::Portais(p) => p.notice.take(),
            Page::Contas(d) => d.notice.take(),
            _ => None,
        };
        if let Some(notice) = notice {
            self.show(notice);
        }
    }

    pub fn show(&mut self, notice: Notice) {
        self.toast = Some(Toast {
            notice,
            shown_at: Instant::now(),
        });
    }

    /// Periodic work between key events: expire the toast and advance the
    /// sync dashboard.
    pub fn tick(&mut self, now: Instant) {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| now.duration_since(t.shown_at) >= TOAST_TTL)
        {
            self.toast = None;
        }

        let Page::Contas(dashboard) = &mut self.page else {
            return;
        };
        if dashboard.tick(now) {
            let result = self.runtime.block_on(dashboard.load());
            self.finish(result);
        } else {
            self.collect_notice();
        }
    }

    pub fn toggle_theme(&mut self) {
        match self.theme.toggle() {
            Ok(theme) => tracing::info!(theme = theme.as_str(), "theme changed"),
            Err(e) => {
                tracing::warn!("Failed to persist theme: {e:#}");
                self.show(Notice::Error("Não foi possível salvar o tema.".to_string()));
            }
        }
    }

    // Tables and filters

    pub fn table(&self) -> Option<&dyn TableView> {
        match &self.page {
            Page::Clientes(p) => Some(&p.table),
            Page::Pipelines(p) => Some(&p.table),
            Page::Tintim(p) => Some(&p.table),
            Page::TintimMonitoring(p) => Some(&p.table),
            Page::Portais(p) => Some(&p.table),
            Page::PortaisMonitoring(p) => Some(&p.table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self) -> Option<&mut dyn TableView> {
        match &mut self.page {
            Page::Clientes(p) => Some(&mut p.table),
            Page::Pipelines(p) => Some(&mut p.table),
            Page::Tintim(p) => Some(&mut p.table),
            Page::TintimMonitoring(p) => Some(&mut p.table),
            Page::Portais(p) => Some(&mut p.table),
            Page::PortaisMonitoring(p) => Some(&mut p.table),
            _ => None,
        }
    }

    pub fn filter(&self) -> Option<&FilterForm> {
        match &self.page {
            Page::Clientes(p) => Some(&p.filter),
            Page::TintimMonitoring(p) => Some(&p.filter),
            Page::PortaisMonitoring(p) => Some(&p.filter),
            _ => None,
        }
    }

    fn filter_mut(&mut self) -> Option<&mut FilterForm> {
        match &mut self.page {
            Page::Clientes(p) => Some(&mut p.filter),
            Page::TintimMonitoring(p) => Some(&mut p.filter),
            Page::PortaisMonitoring(p) => Some(&mut p.filter),
            _ => None,
        }
    }

    pub fn focus_filter(&mut self) {
        if self.filter().is_some() {
            self.focus = Focus::Filter;
            self.field_cursor = 0;
        }
    }

    pub fn apply_filter(&mut self) {
        match &mut self.page {
            Page::Clientes(p) => p.apply_filter(),
            Page::TintimMonitoring(p) => p.apply_filter(),
            Page::PortaisMonitoring(p) => p.apply_filter(),
            _ => {}
        }
        self.focus = Focus::Main;
    }

    pub fn reset_filter(&mut self) {
        match &mut self.page {
            Page::Clientes(p) => p.reset_filter(),
            Page::TintimMonitoring(p) => p.reset_filter(),
            Page::PortaisMonitoring(p) => p.reset_filter(),
            _ => {}
        }
    }

    /// Filter panel fields, whether or not the panel has focus.
    pub fn filter_fields(&self) -> Vec<Field> {
        let Some(filter) = self.filter() else {
            return Vec::new();
        };
        let mut fields: Vec<Field> = filter
            .inputs()
            .iter()
            .map(|input| {
                let name = input.name.clone();
                let shown = filter.display_value(&name);
                match &input.kind {
                    FieldKind::Select(options) => {
                        let label = option_label(options, &shown)
                            .or_else(|| input.placeholder.clone())
                            .unwrap_or_default();
                        Field::pick(&input.label, label, PickTarget::FilterSelect(name))
                    }
                    FieldKind::Radio(options) => Field {
                        label: input.label.clone(),
                        value: option_label(options, &shown).unwrap_or_else(|| "Todos".to_string()),
                        action: FieldAction::Cycle(name),
                        masked: false,
                    },
                    _ => Field::text(&input.label, shown, TextTarget::Filter(name)),
                }
            })
            .collect();
        fields.push(Field::submit("Filtrar", true));
        fields
    }

    // Forms

    /// Fields of whatever form currently has the keyboard: the login form,
    /// the open dialog, or the filter panel.
    pub fn active_fields(&self) -> Vec<Field> {
        if matches!(self.page, Page::Login) {
            return vec![
                Field::text("Email", self.login.email.clone(), TextTarget::LoginEmail),
                Field::secret("Senha", self.login.password.clone(), TextTarget::LoginPassword),
                Field::submit("Entrar", true),
            ];
        }
        if self.dialog_open() {
            return self.dialog_fields();
        }
        if self.focus == Focus::Filter {
            return self.filter_fields();
        }
        Vec::new()
    }

    pub fn dialog_open(&self) -> bool {
        match &self.page {
            Page::Clientes(p) => p.dialog.is_some(),
            Page::Pipelines(p) => p.dialog.is_some(),
            Page::Tintim(p) => p.dialog.is_some(),
            Page::Portais(p) => p.dialog.is_some(),
            Page::Contas(d) => d.dialog.is_some(),
            _ => false,
        }
    }

    pub fn dialog_title(&self) -> &'static str {
        match &self.page {
            Page::Clientes(p) => match &p.dialog {
                Some(ClienteDialog::Create(_)) => "Cadastrar Cliente",
                Some(ClienteDialog::Edit { .. }) => "Editar Cliente",
                _ => "Excluir Cliente",
            },
            Page::Pipelines(p) => match &p.dialog {
                Some(PipelineDialog::Add { .. }) => "Associar Pipeline",
                _ => "Remover Pipeline",
            },
            Page::Tintim(p) => match &p.dialog {
                Some(TintimDialog::Add(_)) => "Cadastrar Tintim",
                Some(TintimDialog::Edit(_)) => "Editar Tintim",
                _ => "Excluir Tintim",
            },
            Page::Portais(p) => match &p.dialog {
                Some(PortalDialog::Add(_)) => "Cadastrar Portal",
                Some(PortalDialog::Edit(_)) => "Editar Portal",
                _ => "Excluir Portal",
            },
            Page::Contas(d) => match &d.dialog {
                Some(SyncDialog::AddAccount(_)) => "Adicionar Conta",
                Some(SyncDialog::AddSlave { .. }) => "Adicionar Conta Escrava",
                Some(SyncDialog::AssociateSlave { .. }) => "Associar Conta Escrava",
                Some(SyncDialog::CreateGroup(_)) => "Criar Grupo",
                Some(SyncDialog::EditGroup { .. }) => "Editar Grupo",
                Some(SyncDialog::ViewAccounts { .. }) => "Contas do Grupo",
                _ => "Confirmar",
            },
            _ => "",
        }
    }

    pub fn form_error(&self) -> Option<&str> {
        match &self.page {
            Page::Login => self.login_error.as_deref(),
            Page::Clientes(p) => p.form_error.as_deref(),
            Page::Pipelines(p) => p.form_error.as_deref(),
            Page::Tintim(p) => p.form_error.as_deref(),
            Page::Portais(p) => p.form_error.as_deref(),
            Page::Contas(d) => d.form_error.as_deref(),
            _ => None,
        }
    }

    /// Question of the open confirmation dialog, if one is open.
    pub fn confirm_prompt(&self) -> Option<String> {
        match &self.page {
            Page::Clientes(p) => match &p.dialog {
                Some(ClienteDialog::ConfirmDelete { nome, .. }) => {
                    Some(format!("Excluir o cliente \"{nome}\"?"))
                }
                _ => None,
            },
            Page::Pipelines(p) => match &p.dialog {
                Some(PipelineDialog::ConfirmDelete { nome, .. }) => {
                    Some(format!("Remover a pipeline \"{nome}\"?"))
                }
                _ => None,
            },
            Page::Tintim(p) => match &p.dialog {
                Some(TintimDialog::ConfirmDelete { label, .. }) => {
                    Some(format!("Excluir o Tintim \"{label}\"?"))
                }
                _ => None,
            },
            Page::Portais(p) => match &p.dialog {
                Some(PortalDialog::ConfirmDelete { nome, .. }) => {
                    Some(format!("Excluir o portal \"{nome}\"?"))
                }
                _ => None,
            },
            Page::Contas(d) => match &d.dialog {
                Some(SyncDialog::ConfirmDeleteGroup { name, .. }) => Some(format!(
                    "Excluir o grupo \"{name}\" e todas as suas contas?"
                )),
                Some(SyncDialog::ConfirmRemoveSlave { subdomain, .. }) => {
                    Some(format!("Remover a conta escrava \"{subdomain}\"?"))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Group whose accounts dialog is open.
    pub fn viewing_accounts(&self) -> Option<i64> {
        match &self.page {
            Page::Contas(d) => match &d.dialog {
                Some(SyncDialog::ViewAccounts { group_id }) => Some(*group_id),
                _ => None,
            },
            _ => None,
        }
    }

    fn dialog_fields(&self) -> Vec<Field> {
        match &self.page {
            Page::Clientes(p) => match &p.dialog {
                Some(ClienteDialog::Create(form)) | Some(ClienteDialog::Edit { form, .. }) => vec![
                    Field::text("Nome", form.nome.clone(), TextTarget::ClienteNome),
                    Field::text("Token", form.token.clone(), TextTarget::ClienteToken),
                    Field::toggle("Automotivo", form.automotivo, ToggleTarget::ClienteAutomotivo),
                    Field::submit("Salvar", true),
                ],
                _ => Vec::new(),
            },
            Page::Pipelines(p) => match &p.dialog {
                Some(PipelineDialog::Add { selected }) => {
                    let nome = selected
                        .and_then(|id| p.available.iter().find(|a| a.id == id))
                        .map(|a| a.nome.clone())
                        .unwrap_or_else(|| "Selecione a pipeline...".to_string());
                    vec![
                        Field::pick("Pipeline", nome, PickTarget::PipelineAdd),
                        Field::submit("Associar", selected.is_some()),
                    ]
                }
                _ => Vec::new(),
            },
            Page::Tintim(p) => match &p.dialog {
                Some(TintimDialog::Add(add)) => {
                    let cliente = add
                        .cliente_id
                        .and_then(|id| p.clientes.iter().find(|c| c.id == id))
                        .map(|c| c.nome.clone())
                        .unwrap_or_else(|| "Selecione o cliente...".to_string());
                    let unidade = if add.loading_unidades {
                        "Carregando...".to_string()
                    } else {
                        unidade_label(&add.unidade)
                    };
                    vec![
                        Field::pick("Cliente", cliente, PickTarget::TintimCliente),
                        Field::pick("Unidade", unidade, PickTarget::TintimUnidade),
                        Field::submit("Cadastrar", add.cliente_id.is_some()),
                    ]
                }
                Some(TintimDialog::Edit(edit)) => vec![
                    Field::fixed("Cliente", edit.cliente.clone()),
                    Field::pick("Unidade", unidade_label(&edit.unidade), PickTarget::TintimUnidade),
                    Field::submit("Salvar", p.can_submit_edit()),
                ],
                _ => Vec::new(),
            },
            Page::Portais(p) => match &p.dialog {
                Some(PortalDialog::Add(add)) => {
                    let cliente = add
                        .cliente_id
                        .and_then(|id| p.clientes.iter().find(|c| c.id == id))
                        .map(|c| c.nome.clone())
                        .unwrap_or_else(|| "Selecione o cliente...".to_string());
                    let mut fields = vec![Field::pick("Cliente", cliente, PickTarget::PortalCliente)];
                    if add.loading_pipelines {
                        fields.push(Field::fixed("Funil", "Carregando..."));
                    } else {
                        fields.extend(funnel_fields(&add.funnel));
                    }
                    fields.push(Field::submit("Cadastrar", add.funnel.status().is_some()));
                    fields
                }
                Some(PortalDialog::Edit(edit)) => {
                    let mut fields = vec![Field::fixed("Portal", edit.nome.clone())];
                    fields.extend(funnel_fields(&edit.funnel));
                    fields.push(Field::submit("Salvar", p.can_submit_edit()));
                    fields
                }
                _ => Vec::new(),
            },
            Page::Contas(d) => match &d.dialog {
                Some(SyncDialog::AddAccount(form)) => vec![
                    Field::text("Subdomínio", form.subdomain.clone(), TextTarget::AccountSubdomain),
                    Field::secret(
                        "Refresh token",
                        form.refresh_token.clone(),
                        TextTarget::AccountRefreshToken,
                    ),
                    Field::toggle("Conta master", form.is_master, ToggleTarget::AccountMaster),
                    Field::submit("Adicionar", true),
                ],
                Some(SyncDialog::AddSlave {
                    group_name, form, ..
                }) => vec![
                    Field::fixed("Grupo", group_name.clone()),
                    Field::text("Subdomínio", form.subdomain.clone(), TextTarget::AccountSubdomain),
                    Field::secret(
                        "Refresh token",
                        form.refresh_token.clone(),
                        TextTarget::AccountRefreshToken,
                    ),
                    Field::submit("Adicionar", true),
                ],
                Some(SyncDialog::AssociateSlave {
                    group_id,
                    account_id,
                }) => {
                    let conta = account_id
                        .and_then(|id| d.accounts.iter().find(|a| a.id == id))
                        .map(|a| a.subdomain.clone())
                        .unwrap_or_else(|| "Selecione a conta...".to_string());
                    let grupo = d
                        .groups
                        .iter()
                        .find(|g| g.id == *group_id)
                        .map(|g| g.name.clone())
                        .unwrap_or_default();
                    vec![
                        Field::fixed("Grupo", grupo),
                        Field::pick("Conta", conta, PickTarget::AssociateAccount),
                        Field::submit("Associar", account_id.is_some()),
                    ]
                }
                Some(SyncDialog::CreateGroup(form)) | Some(SyncDialog::EditGroup { form, .. }) => {
                    let master = d
                        .accounts
                        .iter()
                        .find(|a| a.id == form.master_account_id)
                        .map(|a| a.subdomain.clone())
                        .unwrap_or_else(|| "Selecione a conta master...".to_string());
                    vec![
                        Field::text("Nome", form.name.clone(), TextTarget::GroupName),
                        Field::text("Descrição", form.description.clone(), TextTarget::GroupDescription),
                        Field::pick("Conta master", master, PickTarget::GroupMaster),
                        Field::submit("Salvar", true),
                    ]
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Move the field cursor, skipping read-only lines.
    pub fn move_field(&mut self, forward: bool) {
        let fields = self.active_fields();
        if fields.is_empty() {
            return;
        }
        let len = fields.len();
        let mut index = self.field_cursor.min(len - 1);
        for _ in 0..len {
            index = if forward {
                (index + 1) % len
            } else {
                (index + len - 1) % len
            };
            if fields[index].is_interactive() {
                break;
            }
        }
        self.field_cursor = index;
    }

    /// Put the cursor on the first interactive field of the active form.
    fn reset_field_cursor(&mut self) {
        self.field_cursor = 0;
        if self
            .active_fields()
            .first()
            .is_some_and(|f| !f.is_interactive())
        {
            self.move_field(true);
        }
    }

    /// Act on the field under the cursor.
    pub fn activate_field(&mut self) {
        let fields = self.active_fields();
        let Some(field) = fields.get(self.field_cursor).cloned() else {
            return;
        };
        match field.action {
            FieldAction::Text(target) => {
                self.editor = Some(Editor {
                    target,
                    label: field.label,
                    buffer: field.value,
                    masked: field.masked,
                });
                self.input_mode = InputMode::Editing;
            }
            FieldAction::Pick(target) => self.open_picker(target, &field.label),
            FieldAction::Toggle(target) => self.toggle(target),
            FieldAction::Cycle(name) => self.cycle_radio(&name),
            FieldAction::Static => {}
            FieldAction::Submit(_) => self.submit(),
        }
    }

    pub fn commit_editor(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(Editor {
            target,
            label,
            buffer: value,
            ..
        }) = self.editor.take()
        else {
            return;
        };

        match target {
            TextTarget::LoginEmail => self.login.email = value.trim().to_string(),
            TextTarget::LoginPassword => self.login.password = value,
            TextTarget::ClienteNome | TextTarget::ClienteToken => {
                if let Page::Clientes(p) = &mut self.page {
                    if let Some(form) = p.dialog.as_mut().and_then(|d| d.form_mut()) {
                        if target == TextTarget::ClienteNome {
                            form.nome = value;
                        } else {
                            form.token = value;
                        }
                    }
                }
            }
            TextTarget::AccountSubdomain | TextTarget::AccountRefreshToken => {
                if let Page::Contas(d) = &mut self.page {
                    if let Some(SyncDialog::AddAccount(form) | SyncDialog::AddSlave { form, .. }) =
                        &mut d.dialog
                    {
                        if target == TextTarget::AccountSubdomain {
                            form.subdomain = value;
                        } else {
                            form.refresh_token = value;
                        }
                    }
                }
            }
            TextTarget::GroupName | TextTarget::GroupDescription => {
                if let Page::Contas(d) = &mut self.page {
                    if let Some(SyncDialog::CreateGroup(form) | SyncDialog::EditGroup { form, .. }) =
                        &mut d.dialog
                    {
                        if target == TextTarget::GroupName {
                            form.name = value;
                        } else {
                            form.description = value;
                        }
                    }
                }
            }
            TextTarget::Filter(name) => {
                let accepted = self
                    .filter_mut()
                    .is_some_and(|f| f.set_from_input(&name, &value));
                if !accepted {
                    self.show(Notice::Error(format!("Valor inválido para {label}.")));
                }
            }
        }
    }

    pub fn cancel_editor(&mut self) {
        self.editor = None;
        self.input_mode = InputMode::Normal;
    }

    fn toggle(&mut self, target: ToggleTarget) {
        match (target, &mut self.page) {
            (ToggleTarget::ClienteAutomotivo, Page::Clientes(p)) => {
                if let Some(form) = p.dialog.as_mut().and_then(|d| d.form_mut()) {
                    form.automotivo = !form.automotivo;
                }
            }
            (ToggleTarget::AccountMaster, Page::Contas(d)) => {
                if let Some(SyncDialog::AddAccount(form)) = &mut d.dialog {
                    form.is_master = !form.is_master;
                }
            }
            _ => {}
        }
    }

    /// Radio filters cycle through "all" and then each option.
    fn cycle_radio(&mut self, name: &str) {
        let Some(filter) = self.filter_mut() else {
            return;
        };
        let mut values = vec![String::new()];
        if let Some(input) = filter.input(name) {
            values.extend(input.kind.options().iter().map(|o| o.value.clone()));
        }
        let current = filter.display_value(name);
        let index = values.iter().position(|v| *v == current).unwrap_or(0);
        let next = values[(index + 1) % values.len()].clone();
        filter.set_text(name, next);
    }

    // Pickers

    pub fn open_palette(&mut self) {
        if self.session.is_authenticated() {
            self.open_picker(PickTarget::Route, "Ir para");
        }
    }

    pub fn open_sync_group_picker(&mut self) {
        self.open_picker(PickTarget::SyncGroup, "Grupo para sincronizar");
    }

    fn open_picker(&mut self, target: PickTarget, title: &str) {
        let options = self.picker_options(&target);
        if options.is_empty() {
            self.show(Notice::Error("Nenhuma opção disponível.".to_string()));
            return;
        }
        self.picker = Some((target, Picker::new(title, options)));
        self.input_mode = InputMode::Picking;
    }

    fn picker_options(&self, target: &PickTarget) -> Vec<SelectOption> {
        match (target, &self.page) {
            (PickTarget::Route, _) => std::iter::once(Route::Dashboard)
                .chain(Route::menu())
                .map(|r| SelectOption::new(r.title(), r.path()))
                .collect(),
            (PickTarget::FilterSelect(name), _) => self
                .filter()
                .and_then(|f| f.input(name))
                .map(|i| i.kind.options().to_vec())
                .unwrap_or_default(),
            (PickTarget::TintimCliente, Page::Tintim(p)) => p
                .clientes
                .iter()
                .map(|c| SelectOption::new(c.nome.clone(), c.id.to_string()))
                .collect(),
            (PickTarget::PortalCliente, Page::Portais(p)) => p
                .clientes
                .iter()
                .map(|c| SelectOption::new(c.nome.clone(), c.id.to_string()))
                .collect(),
            (PickTarget::TintimUnidade, Page::Tintim(p)) => {
                let unidades = match &p.dialog {
                    Some(TintimDialog::Add(add)) => add.unidades.as_slice(),
                    Some(TintimDialog::Edit(edit)) => edit.unidades.as_slice(),
                    _ => &[],
                };
                std::iter::once(SelectOption::new("Todas", TODAS))
                    .chain(
                        unidades
                            .iter()
                            .map(|u| SelectOption::new(u.value.clone(), u.value.clone())),
                    )
                    .collect()
            }
            (PickTarget::PortalPipeline, Page::Portais(p)) => portal_funnel(&p.dialog)
                .map(|f| {
                    f.pipelines
                        .iter()
                        .map(|pl| SelectOption::new(pl.nome.clone(), pl.id.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
            (PickTarget::PortalStatus, Page::Portais(p)) => portal_funnel(&p.dialog)
                .map(|f| {
                    f.statuses
                        .iter()
                        .map(|s| SelectOption::new(s.nome.clone(), s.id.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
            (PickTarget::PipelineAdd, Page::Pipelines(p)) => p
                .available
                .iter()
                .map(|pl| SelectOption::new(pl.nome.clone(), pl.id.to_string()))
                .collect(),
            (PickTarget::GroupMaster, Page::Contas(d)) => d
                .master_accounts()
                .into_iter()
                .map(|a| SelectOption::new(a.subdomain.clone(), a.id.to_string()))
                .collect(),
            (PickTarget::AssociateAccount, Page::Contas(d)) => match &d.dialog {
                Some(SyncDialog::AssociateSlave { group_id, .. }) => d
                    .associable_accounts(*group_id)
                    .into_iter()
                    .map(|a| SelectOption::new(a.subdomain.clone(), a.id.to_string()))
                    .collect(),
                _ => Vec::new(),
            },
            (PickTarget::SyncGroup, Page::Contas(d)) => d
                .groups
                .iter()
                .map(|g| SelectOption::new(g.name.clone(), g.id.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn cancel_picker(&mut self) {
        self.picker = None;
        self.input_mode = InputMode::Normal;
    }

    /// Apply the option under the picker cursor.
    pub fn commit_picker(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some((target, picker)) = self.picker.take() else {
            return;
        };
        let Some(value) = picker.selected().map(|o| o.value.clone()) else {
            return;
        };
        let id = value.parse::<i64>().ok();

        match &target {
            PickTarget::Route => {
                if let Some(route) = Route::parse(&value) {
                    self.navigate(route);
                }
                return;
            }
            PickTarget::FilterSelect(name) => {
                if let Some(filter) = self.filter_mut() {
                    filter.set_text(name, value);
                }
                return;
            }
            _ => {}
        }

        let result = match (&target, &mut self.page) {
            (PickTarget::TintimCliente, Page::Tintim(p)) => {
                self.runtime.block_on(p.select_cliente(id))
            }
            (PickTarget::TintimUnidade, Page::Tintim(p)) => {
                p.select_unidade(&value);
                Ok(())
            }
            (PickTarget::PortalCliente, Page::Portais(p)) => {
                self.runtime.block_on(p.select_cliente(id))
            }
            (PickTarget::PortalPipeline, Page::Portais(p)) => {
                p.select_pipeline(id);
                Ok(())
            }
            (PickTarget::PortalStatus, Page::Portais(p)) => {
                p.select_status(id);
                Ok(())
            }
            (PickTarget::PipelineAdd, Page::Pipelines(p)) => {
                p.select_pipeline(id);
                Ok(())
            }
            (PickTarget::GroupMaster, Page::Contas(d)) => {
                if let Some(SyncDialog::CreateGroup(form) | SyncDialog::EditGroup { form, .. }) =
                    &mut d.dialog
                {
                    form.master_account_id = id.unwrap_or_default();
                }
                Ok(())
            }
            (PickTarget::AssociateAccount, Page::Contas(d)) => {
                if let Some(SyncDialog::AssociateSlave { account_id, .. }) = &mut d.dialog {
                    *account_id = id;
                }
                Ok(())
            }
            (PickTarget::SyncGroup, Page::Contas(d)) => {
                d.select_sync_group(id);
                Ok(())
            }
            _ => Ok(()),
        };
        self.finish(result);
    }

    // Page actions

    /// Submit the login form, the open dialog or the filter panel.
    pub fn submit(&mut self) {
        if matches!(self.page, Page::Login) {
            self.submit_login();
            return;
        }
        if !self.dialog_open() {
            if self.focus == Focus::Filter {
                self.apply_filter();
            }
            return;
        }

        let result = match &mut self.page {
            Page::Clientes(p) => self.runtime.block_on(p.submit()),
            Page::Pipelines(p) => self.runtime.block_on(p.submit()),
            Page::Tintim(p) => {
                if matches!(p.dialog, Some(TintimDialog::Add(_))) {
                    self.runtime.block_on(p.submit_add())
                } else {
                    self.runtime.block_on(p.submit_edit())
                }
            }
            Page::Portais(p) => {
                if matches!(p.dialog, Some(PortalDialog::Add(_))) {
                    self.runtime.block_on(p.submit_add())
                } else {
                    self.runtime.block_on(p.submit_edit())
                }
            }
            Page::Contas(d) => self.runtime.block_on(d.submit()),
            _ => Ok(()),
        };
        if !self.dialog_open() {
            self.field_cursor = 0;
        }
        self.finish(result);
    }

    fn submit_login(&mut self) {
        if let Err(message) = forms::check(&self.login) {
            self.login_error = Some(message);
            return;
        }
        let Some(token) = self
            .config
            .auth_token
            .clone()
            .filter(|t| !t.trim().is_empty())
        else {
            self.login_error =
                Some("Nenhum token de acesso configurado (--token ou EVO_AUTH_TOKEN).".to_string());
            return;
        };

        tracing::info!(email = %self.login.email, "login");
        self.session.set_token(token);
        self.login = LoginForm::default();
        self.login_error = None;
        self.navigate(Route::Dashboard);
    }

    /// Answer "yes" to the open confirmation dialog.
    pub fn confirm(&mut self) {
        let result = match &mut self.page {
            Page::Clientes(p) => self.runtime.block_on(p.confirm_delete()),
            Page::Pipelines(p) => self.runtime.block_on(p.confirm_delete()),
            Page::Tintim(p) => self.runtime.block_on(p.confirm_delete()),
            Page::Portais(p) => self.runtime.block_on(p.confirm_delete()),
            Page::Contas(d) => self.runtime.block_on(d.confirm()),
            _ => Ok(()),
        };
        self.finish(result);
    }

    pub fn close_dialog(&mut self) {
        match &mut self.page {
            Page::Clientes(p) => p.close_dialog(),
            Page::Pipelines(p) => p.close_dialog(),
            Page::Tintim(p) => p.close_dialog(),
            Page::Portais(p) => p.close_dialog(),
            Page::Contas(d) => d.close_dialog(),
            _ => {}
        }
        self.field_cursor = 0;
        self.dialog_cursor = 0;
    }

    /// Open a dialog on the current page and put the cursor on its first
    /// field.
    pub fn open_dialog(&mut self, open: impl FnOnce(&mut Page)) {
        open(&mut self.page);
        self.reset_field_cursor();
    }

    /// Open the edit dialog for the selected row (or group).
    pub fn open_edit(&mut self) {
        let result = match &mut self.page {
            Page::Clientes(p) => {
                p.open_edit();
                Ok(())
            }
            Page::Tintim(p) => self.runtime.block_on(p.open_edit()),
            Page::Portais(p) => self.runtime.block_on(p.open_edit()),
            Page::Contas(d) => {
                d.open_edit_group();
                Ok(())
            }
            _ => Ok(()),
        };
        self.reset_field_cursor();
        self.finish(result);
    }

    /// Show the webhook link of the selected Tintim row.
    pub fn copy_webhook_link(&mut self) {
        if let Page::Tintim(p) = &mut self.page {
            if let Some(link) = p.copy_link() {
                tracing::info!(link = %link, "webhook link");
            }
        }
        self.collect_notice();
    }

    /// Client of the selected row on the clients page.
    pub fn selected_cliente(&self) -> Option<i64> {
        match &self.page {
            Page::Clientes(p) => p.table.selected_row().map(|c| c.id),
            _ => None,
        }
    }

    // Sync dashboard

    pub fn dashboard(&self) -> Option<&SyncDashboard> {
        match &self.page {
            Page::Contas(d) => Some(d),
            _ => None,
        }
    }

    /// Run a synchronous dashboard action and surface its notice.
    pub fn with_dashboard(&mut self, action: impl FnOnce(&mut SyncDashboard)) {
        if let Page::Contas(dashboard) = &mut self.page {
            action(dashboard);
            self.collect_notice();
        }
    }

    pub fn trigger_group_sync(&mut self) {
        let result = match &mut self.page {
            Page::Contas(d) => self.runtime.block_on(d.trigger_group_sync(Instant::now())),
            _ => Ok(()),
        };
        self.finish(result);
    }

    pub fn sync_account(&mut self, account_id: i64) {
        let result = match &mut self.page {
            Page::Contas(d) => self.runtime.block_on(d.sync_account(account_id)),
            _ => Ok(()),
        };
        self.finish(result);
    }

    /// Account under the account-list cursor.
    pub fn cursor_account(&self) -> Option<i64> {
        self.dashboard()
            .and_then(|d| d.accounts.get(self.account_cursor))
            .map(|a| a.id)
    }

    /// Slave under the cursor of the group accounts dialog.
    pub fn cursor_slave(&self) -> Option<i64> {
        let group_id = self.viewing_accounts()?;
        self.dashboard()?
            .groups
            .iter()
            .find(|g| g.id == group_id)?
            .slave_accounts
            .get(self.dialog_cursor)
            .map(|s| s.id)
    }

    pub fn move_account_cursor(&mut self, forward: bool) {
        let len = self.dashboard().map_or(0, |d| d.accounts.len());
        self.account_cursor = step(self.account_cursor, len, forward);
    }

    pub fn move_dialog_cursor(&mut self, forward: bool) {
        let len = self
            .viewing_accounts()
            .and_then(|id| self.dashboard()?.groups.iter().find(|g| g.id == id))
            .map_or(0, |g| g.slave_accounts.len());
        self.dialog_cursor = step(self.dialog_cursor, len, forward);
    }
}

/// Move a list cursor one step, clamped to `[0, len)`.
fn step(cursor: usize, len: usize, forward: bool) -> usize {
    if forward {
        if cursor + 1 < len {
            cursor + 1
        } else {
            cursor
        }
    } else {
        cursor.saturating_sub(1)
    }
}

fn option_label(options: &[SelectOption], value: &str) -> Option<String> {
    options
        .iter()
        .find(|o| o.value == value && !value.is_empty())
        .map(|o| o.label.clone())
}

fn unidade_label(value: &str) -> String {
    if value.is_empty() || value == TODAS {
        "Todas".to_string()
    } else {
        value.to_string()
    }
}

fn portal_funnel(dialog: &Option<PortalDialog>) -> Option<&FunnelChoice> {
    match dialog {
        Some(PortalDialog::Add(add)) => Some(&add.funnel),
        Some(PortalDialog::Edit(edit)) => Some(&edit.funnel),
        _ => None,
    }
}

fn funnel_fields(funnel: &FunnelChoice) -> Vec<Field> {
    let pipeline = funnel
        .pipeline_id
        .and_then(|id| funnel.pipelines.iter().find(|p| p.id == id))
        .map(|p| p.nome.clone())
        .unwrap_or_else(|| "Selecione o funil...".to_string());
    let status = funnel
        .status()
        .map(|s| s.nome.clone())
        .unwrap_or_else(|| "Selecione o status...".to_string());
    vec![
        Field::pick("Funil", pipeline, PickTarget::PortalPipeline),
        Field::pick("Status", status, PickTarget::PortalStatus),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_core::table::Column;

    #[test]
    fn option_label_ignores_empty_value() {
        let options = vec![SelectOption::new("Sim", "true"), SelectOption::new("Não", "false")];
        assert_eq!(option_label(&options, "false").as_deref(), Some("Não"));
        assert_eq!(option_label(&options, ""), None);
    }

    #[test]
    fn empty_unit_reads_as_every_unit() {
        assert_eq!(unidade_label(""), "Todas");
        assert_eq!(unidade_label(TODAS), "Todas");
        assert_eq!(unidade_label("centro"), "centro");
    }

    #[test]
    fn cursor_steps_stay_in_bounds() {
        assert_eq!(step(0, 3, true), 1);
        assert_eq!(step(2, 3, true), 2);
        assert_eq!(step(0, 3, false), 0);
        assert_eq!(step(0, 0, true), 0);
    }

    #[test]
    fn table_view_delegates_to_the_table() {
        let mut table: DataTable<i64> = DataTable::new(
            vec![Column::new("N", |n: &i64| Cell::text(n.to_string()))],
            2,
        );
        table.set_rows(vec![3, 1, 2]);

        let view: &mut dyn TableView = &mut table;
        assert_eq!(view.page_count(), 2);
        view.toggle_sort(0);
        assert_eq!(view.sort_indicator(0), Some(SortDirection::Ascending));
        assert_eq!(view.page_cells()[0][0], Cell::text("1"));
        view.next_page();
        assert_eq!(view.page(), 2);
        assert_eq!(view.headers()[0].name, "N");
    }
}
