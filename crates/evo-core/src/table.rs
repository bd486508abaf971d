//! Generic sortable, paginated table.
//!
//! A table is a list of typed columns over rows of any type `R`. Each column
//! pulls its [`Cell`] out of a row through an accessor closure; sorting and
//! pagination happen entirely in memory on the rows handed to
//! [`DataTable::set_rows`].

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dates;

/// Rows per page unless a page overrides it.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// How a column's cells are coerced before comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    #[default]
    String,
    Number,
    Date,
    Datetime,
    Boolean,
}

/// Column descriptor as declared by a page.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnHeader {
    /// Bare display name: sortable, string-typed.
    Named(String),
    /// Display name with explicit sort configuration.
    Configured {
        name: String,
        sort_type: Option<SortType>,
        sortable: Option<bool>,
    },
}

impl ColumnHeader {
    pub fn configured(name: impl Into<String>, sort_type: SortType) -> Self {
        ColumnHeader::Configured {
            name: name.into(),
            sort_type: Some(sort_type),
            sortable: None,
        }
    }

    pub fn unsortable(name: impl Into<String>) -> Self {
        ColumnHeader::Configured {
            name: name.into(),
            sort_type: None,
            sortable: Some(false),
        }
    }

    /// Normalize either variant into the single shape used by both the
    /// header renderer and the comparator.
    pub fn resolve(&self) -> ResolvedHeader {
        match self {
            ColumnHeader::Named(name) => ResolvedHeader {
                key: row_key(name),
                name: name.clone(),
                sort_type: SortType::String,
                sortable: true,
            },
            ColumnHeader::Configured {
                name,
                sort_type,
                sortable,
            } => ResolvedHeader {
                key: row_key(name),
                name: name.clone(),
                sort_type: sort_type.unwrap_or_default(),
                sortable: sortable.unwrap_or(true),
            },
        }
    }
}

impl From<&str> for ColumnHeader {
    fn from(name: &str) -> Self {
        ColumnHeader::Named(name.to_string())
    }
}

impl From<String> for ColumnHeader {
    fn from(name: String) -> Self {
        ColumnHeader::Named(name)
    }
}

/// Normalized column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHeader {
    pub name: String,
    /// Stable identifier derived from the display name.
    pub key: String,
    pub sort_type: SortType,
    pub sortable: bool,
}

/// Identifier for a display name: lowercase, diacritics stripped, `ç` to
/// `c`, whitespace removed. "Data Criação" becomes "datacriacao".
pub fn row_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .map(strip_diacritic)
        .collect()
}

fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// A renderable cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    /// Rendered as a check or cross icon; sorted as a boolean.
    Flag(bool),
    /// Rendered as a vertical stack of its elements.
    List(Vec<String>),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Text cell, or `N/A` when the value is missing or blank.
    pub fn text_or_na(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Cell::Text(v.to_string()),
            _ => Cell::text("N/A"),
        }
    }

    /// Number of terminal lines the cell occupies.
    pub fn height(&self) -> usize {
        match self {
            Cell::List(items) => items.len().max(1),
            _ => 1,
        }
    }

    /// Lines of text to draw, icons excluded.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Cell::Empty => vec![String::new()],
            Cell::Text(s) => vec![s.clone()],
            Cell::Flag(b) => vec![if *b { "✔" } else { "✘" }.to_string()],
            Cell::List(items) => items.clone(),
        }
    }

    fn sort_key(&self, sort_type: SortType) -> SortKey {
        match sort_type {
            SortType::Number => SortKey::Number(self.as_number()),
            SortType::String => SortKey::Text(self.as_text().to_lowercase()),
            SortType::Boolean => SortKey::Flag(self.as_flag()),
            SortType::Date => SortKey::Time(self.as_time(true)),
            SortType::Datetime => SortKey::Time(self.as_time(false)),
        }
    }

    fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Flag(b) => b.to_string(),
            Cell::List(items) => items.join(" "),
        }
    }

    fn as_number(&self) -> f64 {
        match self {
            Cell::Flag(b) => f64::from(u8::from(*b)),
            other => parse_float_prefix(&other.as_text()),
        }
    }

    fn as_flag(&self) -> bool {
        match self {
            Cell::Flag(b) => *b,
            Cell::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "sim" | "yes" | "1"
            ),
            _ => false,
        }
    }

    fn as_time(&self, date_only: bool) -> NaiveDateTime {
        let parsed = match self {
            Cell::Text(s) => dates::parse_datetime(s),
            Cell::List(items) => items.first().and_then(|s| dates::parse_datetime(s)),
            _ => None,
        };
        let value = parsed.unwrap_or_else(dates::epoch);
        if date_only {
            value.date().and_hms_opt(0, 0, 0).unwrap_or(value)
        } else {
            value
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

/// Leading-float parse: "12.5kg" is 12.5, anything unparseable is 0.
fn parse_float_prefix(raw: &str) -> f64 {
    let raw = raw.trim();
    let mut end = 0;
    for (i, c) in raw.char_indices() {
        let accepted = c.is_ascii_digit()
            || c == '.'
            || ((c == '-' || c == '+') && i == 0)
            || ((c == 'e' || c == 'E') && i > 0);
        if !accepted {
            break;
        }
        end = i + c.len_utf8();
    }
    // Shrink until the prefix parses ("1e" or "1.2." are not valid floats).
    while end > 0 {
        if let Ok(value) = raw[..end].parse::<f64>() {
            return if value.is_nan() { 0.0 } else { value };
        }
        end -= 1;
    }
    0.0
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Flag(bool),
    Time(NaiveDateTime),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Flag(a), SortKey::Flag(b)) => a.cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

type Accessor<R> = Box<dyn Fn(&R) -> Cell + Send + Sync>;

/// A column: normalized header plus the accessor producing its cells.
pub struct Column<R> {
    header: ResolvedHeader,
    accessor: Accessor<R>,
    sort_accessor: Option<Accessor<R>>,
}

impl<R> Column<R> {
    pub fn new(
        header: impl Into<ColumnHeader>,
        accessor: impl Fn(&R) -> Cell + Send + Sync + 'static,
    ) -> Self {
        Self {
            header: header.into().resolve(),
            accessor: Box::new(accessor),
            sort_accessor: None,
        }
    }

    /// Sort on `accessor` instead of the displayed cell.
    pub fn sorted_by(mut self, accessor: impl Fn(&R) -> Cell + Send + Sync + 'static) -> Self {
        self.sort_accessor = Some(Box::new(accessor));
        self
    }

    pub fn header(&self) -> &ResolvedHeader {
        &self.header
    }

    pub fn cell(&self, row: &R) -> Cell {
        (self.accessor)(row)
    }

    fn sort_cell(&self, row: &R) -> Cell {
        match &self.sort_accessor {
            Some(accessor) => accessor(row),
            None => self.cell(row),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column").field("header", &self.header).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Active sort: column index and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

/// Table state: rows, the sorted view over them, the current page and the
/// selected row within that page.
#[derive(Debug)]
pub struct DataTable<R> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    /// Row indices in display order.
    order: Vec<usize>,
    sort: Option<SortState>,
    /// 1-based.
    page: usize,
    page_size: usize,
    selected: usize,
}

impl<R> DataTable<R> {
    pub fn new(columns: Vec<Column<R>>, page_size: usize) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            order: Vec::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
            selected: 0,
        }
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace the data. The current sort is re-applied and the page goes
    /// back to 1.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.page = 1;
        self.selected = 0;
        self.apply_sort();
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    /// Direction indicator for a header, if that column is the sorted one.
    pub fn sort_indicator(&self, column: usize) -> Option<SortDirection> {
        self.sort
            .filter(|s| s.column == column)
            .map(|s| s.direction)
    }

    /// Header click: unsorted, ascending, descending, unsorted. Clicking a
    /// different column starts it at ascending. Unsortable or unknown
    /// columns are ignored.
    pub fn toggle_sort(&mut self, column: usize) -> Option<SortState> {
        let sortable = self
            .columns
            .get(column)
            .is_some_and(|c| c.header.sortable);
        if !sortable {
            return self.sort;
        }

        self.sort = match self.sort {
            Some(SortState {
                column: current,
                direction: SortDirection::Ascending,
            }) if current == column => Some(SortState {
                column,
                direction: SortDirection::Descending,
            }),
            Some(SortState {
                column: current,
                direction: SortDirection::Descending,
            }) if current == column => None,
            _ => Some(SortState {
                column,
                direction: SortDirection::Ascending,
            }),
        };

        self.page = 1;
        self.selected = 0;
        self.apply_sort();
        self.sort
    }

    fn apply_sort(&mut self) {
        self.order = (0..self.rows.len()).collect();
        let Some(sort) = self.sort else {
            return;
        };
        let Some(column) = self.columns.get(sort.column) else {
            return;
        };

        let sort_type = column.header.sort_type;
        let keys: Vec<SortKey> = self
            .rows
            .iter()
            .map(|row| column.sort_cell(row).sort_key(sort_type))
            .collect();

        // `sort_by` is stable: equal keys keep their source order in both
        // directions.
        self.order.sort_by(|&a, &b| {
            let ordering = keys[a].compare(&keys[b]);
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    /// All rows in display order.
    pub fn sorted_rows(&self) -> impl Iterator<Item = &R> {
        self.order.iter().map(|&i| &self.rows[i])
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages; an empty table still has one (empty) page.
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
        self.selected = 0;
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    /// Rows of the current page, in display order.
    pub fn page_rows(&self) -> Vec<&R> {
        let start = (self.page - 1) * self.page_size;
        self.order
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&i| &self.rows[i])
            .collect()
    }

    /// Cells of the current page, one `Vec` per row.
    pub fn page_cells(&self) -> Vec<Vec<Cell>> {
        self.page_rows()
            .into_iter()
            .map(|row| self.columns.iter().map(|c| c.cell(row)).collect())
            .collect()
    }

    /// Index of the selected row within the current page.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&R> {
        self.page_rows().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let visible = self.page_rows().len();
        if self.selected + 1 < visible {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        amount: &'static str,
        when: Option<&'static str>,
        active: bool,
    }

    fn row(name: &'static str, amount: &'static str, when: Option<&'static str>, active: bool) -> Row {
        Row {
            name,
            amount,
            when,
            active,
        }
    }

    fn table(page_size: usize) -> DataTable<Row> {
        DataTable::new(
            vec![
                Column::new("Nome", |r: &Row| Cell::text(r.name)),
                Column::new(ColumnHeader::configured("Valor", SortType::Number), |r: &Row| {
                    Cell::text(r.amount)
                }),
                Column::new(ColumnHeader::configured("Data", SortType::Date), |r: &Row| {
                    r.when.map(Cell::text).unwrap_or(Cell::Empty)
                }),
                Column::new(ColumnHeader::configured("Ativo", SortType::Boolean), |r: &Row| {
                    Cell::Flag(r.active)
                }),
                Column::new(ColumnHeader::unsortable("Ações"), |_: &Row| Cell::Empty),
            ],
            page_size,
        )
    }

    fn names(t: &DataTable<Row>) -> Vec<&'static str> {
        t.sorted_rows().map(|r| r.name).collect()
    }

    #[test]
    fn header_variants_normalize() {
        let named = ColumnHeader::from("Data Criação").resolve();
        assert_eq!(named.key, "datacriacao");
        assert_eq!(named.sort_type, SortType::String);
        assert!(named.sortable);

        let configured = ColumnHeader::Configured {
            name: "Idade".into(),
            sort_type: Some(SortType::Number),
            sortable: None,
        }
        .resolve();
        assert_eq!(configured.sort_type, SortType::Number);
        assert!(configured.sortable);
        assert!(!ColumnHeader::unsortable("Ações").resolve().sortable);
    }

    #[test]
    fn row_key_strips_accents_and_spaces() {
        assert_eq!(row_key("Anúncio"), "anuncio");
        assert_eq!(row_key("Data Criação"), "datacriacao");
        assert_eq!(row_key("Último Lead"), "ultimolead");
        assert_eq!(row_key(&row_key("Mídia")), row_key("Mídia"));

        let names = [
            "Empresa", "Nome", "Telefone", "Anúncio", "Campanha", "Conjunto", "Origem", "Mídia",
            "Valor", "Data Criação", "Integrado", "Causa", "Cliente", "Unidade", "Funil", "Status",
            "Último Lead", "Ações", "Automotivo", "ID",
        ];
        let mut keys: Vec<String> = names.iter().map(|n| row_key(n)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), names.len());
    }

    #[test]
    fn click_cycles_asc_desc_none() {
        let mut t = table(20);
        t.set_rows(vec![
            row("b", "1", None, true),
            row("a", "2", None, false),
            row("c", "3", None, true),
        ]);
        assert_eq!(names(&t), ["b", "a", "c"]);

        t.toggle_sort(0);
        assert_eq!(t.sort_indicator(0), Some(SortDirection::Ascending));
        assert_eq!(names(&t), ["a", "b", "c"]);

        t.toggle_sort(0);
        assert_eq!(names(&t), ["c", "b", "a"]);

        assert_eq!(t.toggle_sort(0), None);
        assert_eq!(names(&t), ["b", "a", "c"]);
    }

    #[test]
    fn other_column_starts_ascending() {
        let mut t = table(20);
        t.set_rows(vec![row("a", "2", None, true), row("b", "1", None, true)]);
        t.toggle_sort(0);
        t.toggle_sort(0);
        t.toggle_sort(1);
        assert_eq!(
            t.sort_state(),
            Some(SortState {
                column: 1,
                direction: SortDirection::Ascending
            })
        );
        assert_eq!(names(&t), ["b", "a"]);
    }

    #[test]
    fn unsortable_column_is_ignored() {
        let mut t = table(20);
        t.set_rows(vec![row("a", "1", None, true)]);
        assert_eq!(t.toggle_sort(4), None);
        assert_eq!(t.toggle_sort(99), None);
    }

    #[test]
    fn numeric_sort_reverses_cleanly() {
        let mut t = table(20);
        t.set_rows(vec![
            row("ten", "10", None, true),
            row("two", "2", None, true),
            row("neg", "-3.5", None, true),
            row("bad", "abc", None, true),
            row("unit", "7kg", None, true),
        ]);
        t.toggle_sort(1);
        let asc = names(&t);
        assert_eq!(asc, ["neg", "bad", "two", "unit", "ten"]);
        t.toggle_sort(1);
        let mut desc = names(&t);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn empty_dates_sort_first() {
        let mut t = table(20);
        t.set_rows(vec![
            row("late", "0", Some("2024-05-01T10:00:00"), true),
            row("none", "0", None, true),
            row("blank", "0", Some(""), true),
            row("early", "0", Some("01/02/2020"), true),
        ]);
        t.toggle_sort(2);
        assert_eq!(names(&t), ["none", "blank", "early", "late"]);
    }

    #[test]
    fn date_sort_ignores_time_but_datetime_does_not() {
        let mut t: DataTable<(&str, &str)> = DataTable::new(
            vec![
                Column::new(ColumnHeader::configured("Dia", SortType::Date), |r: &(&str, &str)| {
                    Cell::text(r.1)
                }),
                Column::new(
                    ColumnHeader::configured("Momento", SortType::Datetime),
                    |r: &(&str, &str)| Cell::text(r.1),
                ),
            ],
            20,
        );
        t.set_rows(vec![("evening", "2023-01-15T20:00"), ("morning", "2023-01-15T08:00")]);

        t.toggle_sort(0);
        let by_day: Vec<_> = t.sorted_rows().map(|r| r.0).collect();
        assert_eq!(by_day, ["evening", "morning"]);

        t.toggle_sort(1);
        let by_time: Vec<_> = t.sorted_rows().map(|r| r.0).collect();
        assert_eq!(by_time, ["morning", "evening"]);
    }

    #[test]
    fn boolean_sort_uses_flags_and_words() {
        let mut t: DataTable<Cell> = DataTable::new(
            vec![Column::new(
                ColumnHeader::configured("Ativo", SortType::Boolean),
                |c: &Cell| c.clone(),
            )],
            20,
        );
        t.set_rows(vec![
            Cell::text("Sim"),
            Cell::Flag(false),
            Cell::text("não"),
            Cell::Flag(true),
        ]);
        t.toggle_sort(0);
        let order: Vec<_> = t.sorted_rows().cloned().collect();
        assert_eq!(
            order,
            [Cell::Flag(false), Cell::text("não"), Cell::text("Sim"), Cell::Flag(true)]
        );
    }

    #[test]
    fn pagination_and_reset_on_new_data() {
        let mut t: DataTable<usize> =
            DataTable::new(vec![Column::new("N", |n: &usize| Cell::text(n.to_string()))], 20);
        t.set_rows((0..45).collect());
        assert_eq!(t.page_count(), 3);

        t.set_page(3);
        assert_eq!(t.page_rows().len(), 5);
        assert_eq!(*t.page_rows()[0], 40);

        t.set_rows((0..45).collect());
        assert_eq!(t.page(), 1);
    }

    #[test]
    fn sorting_resets_page() {
        let mut t: DataTable<usize> =
            DataTable::new(vec![Column::new("N", |n: &usize| Cell::text(n.to_string()))], 20);
        t.set_rows((0..45).collect());
        t.next_page();
        assert_eq!(t.page(), 2);
        t.toggle_sort(0);
        assert_eq!(t.page(), 1);
    }

    #[test]
    fn page_bounds_are_clamped() {
        let mut t: DataTable<usize> =
            DataTable::new(vec![Column::new("N", |n: &usize| Cell::text(n.to_string()))], 7);
        assert_eq!(t.page_count(), 1);
        t.prev_page();
        assert_eq!(t.page(), 1);
        t.set_rows((0..8).collect());
        t.set_page(10);
        assert_eq!(t.page(), 2);
        assert_eq!(t.page_rows().len(), 1);
    }

    #[test]
    fn selection_stays_within_page() {
        let mut t: DataTable<usize> =
            DataTable::new(vec![Column::new("N", |n: &usize| Cell::text(n.to_string()))], 2);
        t.set_rows(vec![5, 6, 7]);
        t.select_next();
        t.select_next();
        assert_eq!(t.selected_row(), Some(&6));
        t.next_page();
        assert_eq!(t.selected_row(), Some(&7));
    }

    #[test]
    fn list_cells_stack() {
        let cell = Cell::List(vec!["a".into(), "b".into()]);
        assert_eq!(cell.height(), 2);
        assert_eq!(cell.to_string(), "a\nb");
        assert_eq!(Cell::text_or_na(Some(" ")), Cell::text("N/A"));
    }

    #[test]
    fn sort_value_can_differ_from_display() {
        let column = Column::new(
            ColumnHeader::configured("Valor", SortType::Number),
            |n: &f64| Cell::text(format!("R$ {n}")),
        )
        .sorted_by(|n: &f64| Cell::text(n.to_string()));
        let mut t = DataTable::new(vec![column], 10);
        t.set_rows(vec![30.0, 4.5, 120.0]);
        t.toggle_sort(0);
        assert_eq!(t.page_rows(), vec![&4.5, &30.0, &120.0]);
    }

    #[test]
    fn float_prefix_parsing() {
        assert_eq!(parse_float_prefix("12.5kg"), 12.5);
        assert_eq!(parse_float_prefix("-3"), -3.0);
        assert_eq!(parse_float_prefix("1e3x"), 1000.0);
        assert_eq!(parse_float_prefix("1e"), 1.0);
        assert_eq!(parse_float_prefix("R$ 10"), 0.0);
        assert_eq!(parse_float_prefix("N/A"), 0.0);
        assert_eq!(parse_float_prefix(""), 0.0);
    }
}
