//! Declarative filter forms and the predicates they drive.
//!
//! A page declares its inputs as [`FilterInput`]s and its matching rules as a
//! [`FilterSpec`]. The form produces a [`FilterPayload`] (field name to value)
//! on submit; a `FilterSpec` turns that payload into a row predicate.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

use crate::dates;
use crate::phone;

/// One choice of a select or radio input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    DateRange,
    Select(Vec<SelectOption>),
    Radio(Vec<SelectOption>),
}

impl FieldKind {
    pub fn is_date(&self) -> bool {
        matches!(self, FieldKind::Date | FieldKind::DateRange)
    }

    pub fn options(&self) -> &[SelectOption] {
        match self {
            FieldKind::Select(options) | FieldKind::Radio(options) => options,
            _ => &[],
        }
    }
}

/// Descriptor for one input of a filter form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInput {
    pub label: String,
    pub name: String,
    pub kind: FieldKind,
    pub placeholder: Option<String>,
}

impl FilterInput {
    pub fn new(label: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            kind,
            placeholder: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    fn empty_value(&self) -> FilterValue {
        match self.kind {
            FieldKind::Date => FilterValue::Date(None),
            FieldKind::DateRange => FilterValue::Range(None),
            _ => FilterValue::Text(String::new()),
        }
    }
}

/// Both ends of a date range; either may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Inclusive on both ends, compared by calendar day.
    pub fn contains(&self, value: &NaiveDateTime) -> bool {
        let day = value.date();
        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Serialized as `[start|null, end|null]`.
impl Serialize for DateRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.start)?;
        tuple.serialize_element(&self.end)?;
        tuple.end()
    }
}

/// Value held by one filter field. Cleared date fields are `null`, cleared
/// text-like fields are `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Date(Option<NaiveDate>),
    Range(Option<DateRange>),
}

impl FilterValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.trim().is_empty(),
            FilterValue::Date(d) => d.is_none(),
            FilterValue::Range(r) => r.map_or(true, |r| r.is_open()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Field name to value, as handed to the submit handler.
pub type FilterPayload = BTreeMap<String, FilterValue>;

/// State of a filter form.
#[derive(Debug, Clone)]
pub struct FilterForm {
    inputs: Vec<FilterInput>,
    values: FilterPayload,
}

impl FilterForm {
    pub fn new(inputs: Vec<FilterInput>) -> Self {
        let values = inputs
            .iter()
            .map(|input| (input.name.clone(), input.empty_value()))
            .collect();
        Self { inputs, values }
    }

    pub fn inputs(&self) -> &[FilterInput] {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&FilterInput> {
        self.inputs.iter().find(|i| i.name == name)
    }

    /// Replace the options of a select/radio input (e.g. once they are fetched).
    pub fn set_options(&mut self, name: &str, options: Vec<SelectOption>) {
        if let Some(input) = self.inputs.iter_mut().find(|i| i.name == name) {
            match &mut input.kind {
                FieldKind::Select(current) | FieldKind::Radio(current) => *current = options,
                _ => {}
            }
        }
    }

    pub fn value(&self, name: &str) -> Option<&FilterValue> {
        self.values.get(name)
    }

    /// Set a text, number, select or radio field. Select and radio values
    /// must be one of the declared options (or empty).
    pub fn set_text(&mut self, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let Some(input) = self.input(name) else {
            return false;
        };
        let accepted = match &input.kind {
            FieldKind::Date | FieldKind::DateRange => false,
            FieldKind::Select(options) | FieldKind::Radio(options) => {
                value.is_empty() || options.iter().any(|o| o.value == value)
            }
            FieldKind::Text | FieldKind::Number => true,
        };
        if accepted {
            self.values.insert(name.to_string(), FilterValue::Text(value));
        }
        accepted
    }

    pub fn set_date(&mut self, name: &str, date: Option<NaiveDate>) -> bool {
        if !matches!(self.input(name).map(|i| &i.kind), Some(FieldKind::Date)) {
            return false;
        }
        self.values.insert(name.to_string(), FilterValue::Date(date));
        true
    }

    pub fn set_range(&mut self, name: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        if !matches!(self.input(name).map(|i| &i.kind), Some(FieldKind::DateRange)) {
            return false;
        }
        let range = DateRange::new(start, end);
        let value = if range.is_open() { None } else { Some(range) };
        self.values.insert(name.to_string(), FilterValue::Range(value));
        true
    }

    /// Set a field from free text typed by the user: dates accept
    /// `dd/mm/yyyy` or ISO, ranges `<start> - <end>` or `<start> a <end>`.
    pub fn set_from_input(&mut self, name: &str, raw: &str) -> bool {
        let Some(kind) = self.input(name).map(|i| i.kind.clone()) else {
            return false;
        };
        let raw = raw.trim();
        match kind {
            FieldKind::Date => {
                if raw.is_empty() {
                    return self.set_date(name, None);
                }
                match dates::parse_date(raw) {
                    Some(date) => self.set_date(name, Some(date)),
                    None => false,
                }
            }
            FieldKind::DateRange => {
                let (start, end) = split_range(raw);
                let start_date = parse_optional_date(start);
                let end_date = parse_optional_date(end);
                match (start_date, end_date) {
                    (Some(s), Some(e)) => self.set_range(name, s, e),
                    _ => false,
                }
            }
            _ => self.set_text(name, raw),
        }
    }

    /// Text to show in the input box for a field.
    pub fn display_value(&self, name: &str) -> String {
        match self.values.get(name) {
            Some(FilterValue::Text(s)) => s.clone(),
            Some(FilterValue::Date(Some(d))) => dates::format_br_date(d),
            Some(FilterValue::Range(Some(r))) => format!(
                "{} - {}",
                r.start.map(|d| dates::format_br_date(&d)).unwrap_or_default(),
                r.end.map(|d| dates::format_br_date(&d)).unwrap_or_default()
            ),
            _ => String::new(),
        }
    }

    pub fn payload(&self) -> FilterPayload {
        self.values.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(FilterValue::is_empty)
    }

    /// Invoke the submit handler with the current values.
    pub fn submit<F: FnOnce(&FilterPayload)>(&self, on_submit: F) {
        on_submit(&self.values);
    }

    /// Clear every field and immediately submit the cleared payload, so a
    /// reset also means "show everything".
    pub fn reset<F: FnOnce(&FilterPayload)>(&mut self, on_submit: F) {
        self.values = self
            .inputs
            .iter()
            .map(|input| (input.name.clone(), input.empty_value()))
            .collect();
        tracing::debug!(fields = self.values.len(), "filter reset");
        on_submit(&self.values);
    }
}

fn split_range(raw: &str) -> (&str, &str) {
    for separator in [" - ", " a ", " até ", ".."] {
        if let Some((start, end)) = raw.split_once(separator) {
            return (start.trim(), end.trim());
        }
    }
    if let Some(start) = raw.strip_suffix(" -") {
        return (start.trim(), "");
    }
    if let Some(end) = raw.strip_prefix("- ") {
        return ("", end.trim());
    }
    (raw, "")
}

/// `Some(None)` for an empty side, `None` for an unparseable one.
fn parse_optional_date(raw: &str) -> Option<Option<NaiveDate>> {
    if raw.is_empty() {
        Some(None)
    } else {
        dates::parse_date(raw).map(Some)
    }
}

/// How a field's payload value is matched against a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Case-insensitive substring.
    TextContains,
    /// Exact string equality (selects).
    Exact,
    /// Digits of the query contained in the digits of the row value.
    NumericContains,
    /// Row date within an inclusive day range.
    DateRange,
    /// Row date on the same calendar day.
    SameDay,
    /// `"true"` / `"false"` against a row flag.
    Bool,
}

enum Extract<R> {
    Text(Box<dyn Fn(&R) -> Option<String> + Send + Sync>),
    Time(Box<dyn Fn(&R) -> Option<NaiveDateTime> + Send + Sync>),
    Flag(Box<dyn Fn(&R) -> bool + Send + Sync>),
}

struct FieldPredicate<R> {
    name: String,
    kind: PredicateKind,
    extract: Extract<R>,
}

/// The matching rules of one page, keyed by filter field name.
pub struct FilterSpec<R> {
    fields: Vec<FieldPredicate<R>>,
}

impl<R> Default for FilterSpec<R> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<R> FilterSpec<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_contains(
        self,
        name: &str,
        get: impl Fn(&R) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.with_text(name, PredicateKind::TextContains, get)
    }

    pub fn exact(self, name: &str, get: impl Fn(&R) -> Option<String> + Send + Sync + 'static) -> Self {
        self.with_text(name, PredicateKind::Exact, get)
    }

    pub fn numeric_contains(
        self,
        name: &str,
        get: impl Fn(&R) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.with_text(name, PredicateKind::NumericContains, get)
    }

    pub fn date_range(
        self,
        name: &str,
        get: impl Fn(&R) -> Option<NaiveDateTime> + Send + Sync + 'static,
    ) -> Self {
        self.with_time(name, PredicateKind::DateRange, get)
    }

    pub fn same_day(
        self,
        name: &str,
        get: impl Fn(&R) -> Option<NaiveDateTime> + Send + Sync + 'static,
    ) -> Self {
        self.with_time(name, PredicateKind::SameDay, get)
    }

    pub fn flag(mut self, name: &str, get: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        self.fields.push(FieldPredicate {
            name: name.to_string(),
            kind: PredicateKind::Bool,
            extract: Extract::Flag(Box::new(get)),
        });
        self
    }

    fn with_text(
        mut self,
        name: &str,
        kind: PredicateKind,
        get: impl Fn(&R) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(FieldPredicate {
            name: name.to_string(),
            kind,
            extract: Extract::Text(Box::new(get)),
        });
        self
    }

    fn with_time(
        mut self,
        name: &str,
        kind: PredicateKind,
        get: impl Fn(&R) -> Option<NaiveDateTime> + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(FieldPredicate {
            name: name.to_string(),
            kind,
            extract: Extract::Time(Box::new(get)),
        });
        self
    }

    /// A row passes when every non-empty payload field matches it. Fields
    /// absent from the payload, or holding the wrong kind of value, do not
    /// constrain anything.
    pub fn matches(&self, payload: &FilterPayload, row: &R) -> bool {
        self.fields.iter().all(|field| {
            let Some(value) = payload.get(&field.name) else {
                return true;
            };
            if value.is_empty() {
                return true;
            }
            field_matches(field, value, row)
        })
    }

    /// Rows passing `matches`, in their original order.
    pub fn apply(&self, payload: &FilterPayload, rows: &[R]) -> Vec<R>
    where
        R: Clone,
    {
        rows.iter()
            .filter(|row| self.matches(payload, row))
            .cloned()
            .collect()
    }
}

fn field_matches<R>(field: &FieldPredicate<R>, value: &FilterValue, row: &R) -> bool {
    match (&field.extract, value) {
        (Extract::Text(get), FilterValue::Text(query)) => {
            let Some(candidate) = get(row) else {
                return false;
            };
            match field.kind {
                PredicateKind::Exact => candidate == *query,
                PredicateKind::NumericContains => {
                    let query = phone::digits_only(query);
                    query.is_empty() || phone::digits_only(&candidate).contains(&query)
                }
                _ => candidate
                    .to_lowercase()
                    .contains(&query.trim().to_lowercase()),
            }
        }
        (Extract::Time(get), FilterValue::Date(Some(day))) => {
            get(row).is_some_and(|dt| dt.date() == *day)
        }
        (Extract::Time(get), FilterValue::Range(Some(range))) => {
            get(row).is_some_and(|dt| range.contains(&dt))
        }
        (Extract::Flag(get), FilterValue::Text(choice)) => match choice.as_str() {
            "true" => get(row),
            "false" => !get(row),
            _ => true,
        },
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Lead {
        empresa: &'static str,
        telefone: &'static str,
        criado: &'static str,
        integrado: bool,
    }

    fn lead(empresa: &'static str, telefone: &'static str, criado: &'static str, integrado: bool) -> Lead {
        Lead {
            empresa,
            telefone,
            criado,
            integrado,
        }
    }

    fn spec() -> FilterSpec<Lead> {
        FilterSpec::new()
            .text_contains("Empresa", |l: &Lead| Some(l.empresa.to_string()))
            .numeric_contains("Telefone", |l: &Lead| Some(l.telefone.to_string()))
            .date_range("periodo", |l: &Lead| dates::parse_datetime(l.criado))
            .same_day("data_criacao", |l: &Lead| dates::parse_datetime(l.criado))
            .flag("Integrado", |l: &Lead| l.integrado)
    }

    fn form() -> FilterForm {
        FilterForm::new(vec![
            FilterInput::new("Empresa", "Empresa", FieldKind::Text),
            FilterInput::new("Telefone", "Telefone", FieldKind::Number),
            FilterInput::new("Período", "periodo", FieldKind::DateRange),
            FilterInput::new("Data", "data_criacao", FieldKind::Date),
            FilterInput::new(
                "Integrado",
                "Integrado",
                FieldKind::Radio(vec![
                    SelectOption::new("Integrado", "true"),
                    SelectOption::new("Não integrado", "false"),
                ]),
            ),
        ])
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reset_clears_to_typed_empties_and_submits() {
        let mut f = form();
        f.set_text("Empresa", "loja");
        f.set_date("data_criacao", Some(ymd(2023, 1, 1)));
        f.set_range("periodo", Some(ymd(2023, 1, 1)), None);
        f.set_text("Integrado", "true");

        let mut submitted = None;
        f.reset(|payload| submitted = Some(payload.clone()));
        let payload = submitted.expect("reset must submit");

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "Empresa": "",
                "Integrado": "",
                "Telefone": "",
                "data_criacao": null,
                "periodo": null,
            })
        );
        assert!(f.is_empty());
    }

    #[test]
    fn range_serializes_as_pair() {
        let mut f = form();
        f.set_range("periodo", Some(ymd(2023, 1, 1)), None);
        assert_eq!(
            serde_json::to_value(f.value("periodo").unwrap()).unwrap(),
            json!(["2023-01-01", null])
        );
    }

    #[test]
    fn date_range_includes_whole_end_day_only() {
        let rows = vec![
            lead("A", "", "2023-01-15T14:30", true),
            lead("B", "", "2023-02-01T00:00", true),
        ];
        let mut f = form();
        f.set_range("periodo", Some(ymd(2023, 1, 1)), Some(ymd(2023, 1, 31)));
        let kept = spec().apply(&f.payload(), &rows);
        assert_eq!(kept, vec![rows[0].clone()]);
    }

    #[test]
    fn text_numeric_and_flag_predicates_combine() {
        let rows = vec![
            lead("Loja Centro", "+55 (11) 9 8765-4321", "2023-01-15T14:30", true),
            lead("Loja Norte", "(21) 3333-4444", "2023-01-15T09:00", false),
            lead("Oficina", "11987654321", "2023-01-16T09:00", true),
        ];
        let mut f = form();
        f.set_text("Empresa", "LOJA");
        assert_eq!(spec().apply(&f.payload(), &rows).len(), 2);

        f.set_text("Telefone", "98765");
        let kept = spec().apply(&f.payload(), &rows);
        assert_eq!(kept, vec![rows[0].clone()]);

        f.set_text("Telefone", "");
        f.set_text("Integrado", "false");
        assert_eq!(spec().apply(&f.payload(), &rows), vec![rows[1].clone()]);
    }

    #[test]
    fn same_day_ignores_time() {
        let rows = vec![
            lead("A", "", "2023-01-15T23:59", true),
            lead("B", "", "2023-01-16T00:00", true),
        ];
        let mut f = form();
        assert!(f.set_from_input("data_criacao", "15/01/2023"));
        assert_eq!(spec().apply(&f.payload(), &rows), vec![rows[0].clone()]);
    }

    #[test]
    fn missing_row_value_fails_active_filter() {
        let spec = FilterSpec::new().text_contains("Nome", |v: &Option<String>| v.clone());
        let mut payload = FilterPayload::new();
        payload.insert("Nome".into(), FilterValue::Text("ana".into()));
        assert!(!spec.matches(&payload, &None));
        assert!(spec.matches(&payload, &Some("Ana Paula".into())));
        payload.insert("Nome".into(), FilterValue::Text(String::new()));
        assert!(spec.matches(&payload, &None));
    }

    #[test]
    fn select_rejects_unknown_option() {
        let mut f = FilterForm::new(vec![FilterInput::new(
            "Empresa",
            "Empresa",
            FieldKind::Select(vec![SelectOption::new("Loja", "Loja")]),
        )]);
        assert!(!f.set_text("Empresa", "Outra"));
        assert!(f.set_text("Empresa", "Loja"));
        f.set_options("Empresa", vec![SelectOption::new("Outra", "Outra")]);
        assert!(f.set_text("Empresa", "Outra"));
    }

    #[test]
    fn typed_range_input() {
        let mut f = form();
        assert!(f.set_from_input("periodo", "01/01/2023 - 31/01/2023"));
        assert_eq!(f.display_value("periodo"), "01/01/2023 - 31/01/2023");
        assert!(f.set_from_input("periodo", "2023-01-01 - "));
        assert!(!f.set_from_input("periodo", "ontem - hoje"));
        assert!(f.set_from_input("periodo", ""));
        assert_eq!(f.value("periodo"), Some(&FilterValue::Range(None)));
    }
}
