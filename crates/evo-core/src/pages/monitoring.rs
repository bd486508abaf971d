//! Lead monitoring pages for TinTim and Portais.
//!
//! Both pages fetch every lead once, keep the unfiltered list, and re-derive
//! the table from it whenever the filter is submitted or reset. An optional
//! route id narrows the list to a single lead id.

use crate::api::ClientesApi;
use crate::dates;
use crate::error::ApiResult;
use crate::filter::{FieldKind, FilterForm, FilterInput, FilterPayload, FilterSpec, SelectOption};
use crate::models::{PortalLead, TintimLead};
use crate::phone;
use crate::table::{Cell, Column, ColumnHeader, DataTable, SortType};

use super::{degrade, PageState};

pub struct MonitoringPage<L> {
    api: ClientesApi,
    restrict_to: Option<i64>,
    pub state: PageState,
    leads: Vec<L>,
    pub table: DataTable<L>,
    pub filter: FilterForm,
    spec: FilterSpec<L>,
}

pub type TintimMonitoringPage = MonitoringPage<TintimLead>;
pub type PortaisMonitoringPage = MonitoringPage<PortalLead>;

impl<L: Clone> MonitoringPage<L> {
    pub fn restrict_to(&self) -> Option<i64> {
        self.restrict_to
    }

    pub fn leads(&self) -> &[L] {
        &self.leads
    }

    pub fn apply_filter(&mut self) {
        let payload = self.filter.payload();
        self.show(&payload);
    }

    /// Clear every field; the table goes back to the full list.
    pub fn reset_filter(&mut self) {
        let mut cleared = FilterPayload::new();
        self.filter.reset(|payload| cleared = payload.clone());
        self.show(&cleared);
    }

    fn show(&mut self, payload: &FilterPayload) {
        let rows = self.spec.apply(payload, &self.leads);
        self.table.set_rows(rows);
    }

    fn set_leads(&mut self, leads: Vec<L>, id_of: impl Fn(&L) -> Option<i64>) {
        self.leads = match self.restrict_to {
            Some(id) => leads.into_iter().filter(|l| id_of(l) == Some(id)).collect(),
            None => leads,
        };
        self.apply_filter();
        self.state = PageState::Loaded;
    }
}

fn integrado_input() -> FilterInput {
    FilterInput::new(
        "Integrado",
        "Integrado",
        FieldKind::Radio(vec![
            SelectOption::new("Integrado", "true"),
            SelectOption::new("Não integrado", "false"),
        ]),
    )
}

fn created(raw: &Option<String>) -> Option<chrono::NaiveDateTime> {
    raw.as_deref().and_then(dates::parse_datetime)
}

fn phone_cell(raw: &Option<String>) -> Cell {
    match raw.as_deref().map(phone::format_phone) {
        Some(formatted) if !formatted.is_empty() => Cell::Text(formatted),
        _ => Cell::text("N/A"),
    }
}

impl MonitoringPage<TintimLead> {
    pub fn new(api: ClientesApi, restrict_to: Option<i64>, page_size: usize) -> Self {
        Self {
            api,
            restrict_to,
            state: PageState::Loading,
            leads: Vec::new(),
            table: DataTable::new(tintim_columns(), page_size),
            filter: FilterForm::new(vec![
                FilterInput::new("Empresa", "Empresa", FieldKind::Text),
                FilterInput::new("Nome", "Nome", FieldKind::Text),
                FilterInput::new("Telefone", "Telefone", FieldKind::Number),
                FilterInput::new("Data de criação", "data_criacao", FieldKind::Date),
                integrado_input(),
            ]),
            spec: FilterSpec::new()
                .text_contains("Empresa", |l: &TintimLead| l.nome_empresa.clone())
                .text_contains("Nome", |l: &TintimLead| l.nome_lead.clone())
                .numeric_contains("Telefone", |l: &TintimLead| l.telefone.clone())
                .same_day("data_criacao", |l: &TintimLead| created(&l.data_criacao))
                .flag("Integrado", |l: &TintimLead| l.integrado),
        }
    }

    pub async fn load(&mut self) -> ApiResult<()> {
        self.state = PageState::Loading;
        let leads = degrade(self.api.tintim_leads().await, "leads tintim")?;
        tracing::debug!(count = leads.len(), "tintim leads loaded");
        self.set_leads(leads, |l| l.id);
        Ok(())
    }
}

fn tintim_columns() -> Vec<Column<TintimLead>> {
    vec![
        Column::new("Empresa", |l: &TintimLead| Cell::text_or_na(l.nome_empresa.as_deref())),
        Column::new("Nome", |l: &TintimLead| Cell::text_or_na(l.nome_lead.as_deref())),
        Column::new("Telefone", |l: &TintimLead| phone_cell(&l.telefone)),
        Column::new("Anúncio", |l: &TintimLead| Cell::text_or_na(l.nome_anuncio.as_deref())),
        Column::new("Campanha", |l: &TintimLead| Cell::text_or_na(l.nome_campanha.as_deref())),
        Column::new("Conjunto", |l: &TintimLead| Cell::text_or_na(l.nome_conjunto.as_deref())),
        Column::new("Origem", |l: &TintimLead| Cell::text_or_na(l.source.as_deref())),
        Column::new("Mídia", |l: &TintimLead| Cell::text_or_na(l.midia.as_deref())),
        Column::new(
            ColumnHeader::configured("Data Criação", SortType::Datetime),
            |l: &TintimLead| Cell::text(dates::display_or_na(l.data_criacao.as_deref())),
        ),
        Column::new(
            ColumnHeader::configured("Integrado", SortType::Boolean),
            |l: &TintimLead| Cell::Flag(l.integrado),
        ),
        Column::new("Causa", |l: &TintimLead| Cell::text_or_na(l.causa.as_deref())),
    ]
}

impl MonitoringPage<PortalLead> {
    pub fn new(api: ClientesApi, restrict_to: Option<i64>, page_size: usize) -> Self {
        Self {
            api,
            restrict_to,
            state: PageState::Loading,
            leads: Vec::new(),
            table: DataTable::new(portal_columns(), page_size),
            filter: FilterForm::new(vec![
                FilterInput::new("Empresa", "Empresa", FieldKind::Select(Vec::new()))
                    .with_placeholder("Selecione a Empresa..."),
                FilterInput::new("Nome", "Nome", FieldKind::Text),
                FilterInput::new("Telefone", "Telefone", FieldKind::Number),
                FilterInput::new("Data de criação", "data_criacao", FieldKind::Date),
                FilterInput::new("Mídia", "Midia", FieldKind::Text),
                FilterInput::new("Origem", "Origem", FieldKind::Text),
                integrado_input(),
            ]),
            spec: FilterSpec::new()
                .text_contains("Empresa", |l: &PortalLead| l.nome.clone())
                .text_contains("Nome", |l: &PortalLead| l.nome_lead.clone())
                .numeric_contains("Telefone", |l: &PortalLead| l.telefone.clone())
                .same_day("data_criacao", |l: &PortalLead| created(&l.data_criada))
                .text_contains("Midia", |l: &PortalLead| l.midia.clone())
                .text_contains("Origem", |l: &PortalLead| l.origem.clone())
                .flag("Integrado", |l: &PortalLead| l.integrado),
        }
    }

    /// Fetch the leads plus the Portais names offered by the Empresa select.
    pub async fn load(&mut self) -> ApiResult<()> {
        self.state = PageState::Loading;
        let leads = degrade(self.api.portal_leads().await, "leads portais")?;

        let mut empresas: Vec<String> = degrade(self.api.list_portais().await, "portais")?
            .into_iter()
            .map(|p| p.nome)
            .filter(|nome| !nome.trim().is_empty())
            .collect();
        empresas.sort();
        empresas.dedup();
        self.filter.set_options(
            "Empresa",
            empresas
                .into_iter()
                .map(|nome| SelectOption::new(nome.clone(), nome))
                .collect(),
        );

        tracing::debug!(count = leads.len(), "portal leads loaded");
        self.set_leads(leads, |l| l.id);
        Ok(())
    }
}

fn valor_cell(valor: Option<f64>) -> Cell {
    match valor {
        Some(v) if v != 0.0 => Cell::Text(format!("R$ {v}")),
        _ => Cell::text("N/A"),
    }
}

fn portal_columns() -> Vec<Column<PortalLead>> {
    vec![
        Column::new("Empresa", |l: &PortalLead| Cell::text_or_na(l.nome.as_deref())),
        Column::new("Nome", |l: &PortalLead| Cell::text_or_na(l.nome_lead.as_deref())),
        Column::new("Telefone", |l: &PortalLead| phone_cell(&l.telefone)),
        Column::new("Origem", |l: &PortalLead| Cell::text_or_na(l.origem.as_deref())),
        Column::new("Mídia", |l: &PortalLead| Cell::text_or_na(l.midia.as_deref())),
        Column::new(
            ColumnHeader::configured("Valor", SortType::Number),
            |l: &PortalLead| valor_cell(l.valor),
        )
        .sorted_by(|l: &PortalLead| Cell::text(l.valor.unwrap_or_default().to_string())),
        Column::new(
            ColumnHeader::configured("Data Criação", SortType::Datetime),
            |l: &PortalLead| Cell::text(dates::display_or_na(l.data_criada.as_deref())),
        ),
        Column::new(
            ColumnHeader::configured("Integrado", SortType::Boolean),
            |l: &PortalLead| Cell::Flag(l.integrado),
        ),
        Column::new("Causa", |l: &PortalLead| Cell::text_or_na(l.causa.as_deref())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valor_renders_currency_or_na() {
        assert_eq!(valor_cell(Some(1500.5)), Cell::text("R$ 1500.5"));
        assert_eq!(valor_cell(None), Cell::text("N/A"));
        assert_eq!(valor_cell(Some(0.0)), Cell::text("N/A"));
    }

    #[test]
    fn valor_sorts_by_amount() {
        let lead = |valor: Option<f64>| PortalLead { valor, ..PortalLead::default() };
        let mut table = DataTable::new(portal_columns(), 10);
        table.set_rows(vec![lead(Some(900.0)), lead(None), lead(Some(85.5))]);
        table.toggle_sort(5);
        let order: Vec<Option<f64>> = table.page_rows().iter().map(|l| l.valor).collect();
        assert_eq!(order, vec![None, Some(85.5), Some(900.0)]);
    }

    #[test]
    fn phone_cell_masks_digits() {
        assert_eq!(phone_cell(&Some("5511987654321".into())), Cell::text("+55 (11) 9 87654321"));
        assert_eq!(phone_cell(&None), Cell::text("N/A"));
    }
}
