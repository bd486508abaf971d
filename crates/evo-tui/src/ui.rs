//! UI rendering with Ratatui.

use crate::app::{App, Focus, InputMode, Page, TableView};
use crate::form::{Field, FieldAction};
use evo_core::pages::sync_dashboard::ViewMode;
use evo_core::pages::{Notice, PageState, SyncDashboard};
use evo_core::table::{Cell as DataCell, SortDirection};
use evo_core::{Route, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};

/// Colors of the active theme.
struct Palette {
    fg: Color,
    muted: Color,
    accent: Color,
    selection: Color,
}

impl Palette {
    fn of(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                fg: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                selection: Color::Rgb(60, 60, 80),
            },
            Theme::Dark => Palette {
                fg: Color::Gray,
                muted: Color::DarkGray,
                accent: Color::Magenta,
                selection: Color::Rgb(60, 40, 80),
            },
        }
    }

    fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }
}

/// Main render function.
pub fn render(frame: &mut Frame, app: &App) {
    let palette = Palette::of(app.theme());

    if matches!(app.page, Page::Login) {
        render_login(frame, app, &palette);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        render_header(frame, app, &palette, chunks[0]);
        match &app.page {
            Page::Home => render_home(frame, app, &palette, chunks[1]),
            Page::Contas(dashboard) => render_dashboard(frame, app, dashboard, &palette, chunks[1]),
            _ => render_table_page(frame, app, &palette, chunks[1]),
        }
        render_help(frame, app, &palette, chunks[2]);

        if let Some(question) = app.confirm_prompt() {
            render_confirm(frame, app, &question, &palette);
        } else if let Some(group_id) = app.viewing_accounts() {
            if let Page::Contas(dashboard) = &app.page {
                render_group_accounts(frame, app, dashboard, group_id, &palette);
            }
        } else if app.dialog_open() {
            render_dialog(frame, app, &palette);
        }
    }

    match app.input_mode {
        InputMode::Editing => render_editor(frame, app, &palette),
        InputMode::Picking => render_picker(frame, app, &palette),
        InputMode::Normal => {}
    }
    render_toast(frame, app);
}

fn render_header(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let title = match &app.page {
        Page::Pipelines(p) => p.title(),
        _ => app.route.title().to_string(),
    };
    let line = Line::from(vec![
        Span::styled(
            " Evo Admin ",
            Style::default()
                .fg(Color::Black)
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {title} "), Style::default().fg(palette.fg)),
        Span::styled(app.route.path(), Style::default().fg(palette.muted)),
        Span::styled(
            format!("  [{}]", app.theme().as_str()),
            Style::default().fg(palette.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let help = if app.input_mode == InputMode::Editing {
        "Enter: confirmar | Esc: cancelar"
    } else if app.input_mode == InputMode::Picking {
        "Digite para filtrar | ↑↓: navegar | Enter: escolher | Esc: cancelar"
    } else if app.confirm_prompt().is_some() {
        "y: confirmar | n: cancelar"
    } else if app.viewing_accounts().is_some() {
        "↑↓: navegar | y: sincronizar | d: remover | Esc: fechar"
    } else if app.dialog_open() {
        "↑↓: campo | Enter: editar | Ctrl+S: salvar | Esc: cancelar"
    } else if app.focus == Focus::Filter {
        "↑↓: campo | Enter: editar | r: limpar | Esc: voltar"
    } else {
        match &app.page {
            Page::Home => "↑↓: navegar | Enter: abrir | Ctrl+P: ir para | t: tema | L: sair | q: fechar",
            Page::Clientes(_) => {
                "a: novo | e: editar | d: excluir | p: pipelines | f: filtro | 1-9: ordenar | h/l: página | Esc: voltar"
            }
            Page::Pipelines(_) => "a: associar | d: remover | 1-9: ordenar | Esc: voltar",
            Page::Tintim(_) => {
                "a: novo | e: editar | d: excluir | c: link | m: monitoramento | 1-9: ordenar | Esc: voltar"
            }
            Page::Portais(_) => {
                "a: novo | e: editar | d: excluir | m: monitoramento | 1-9: ordenar | Esc: voltar"
            }
            Page::TintimMonitoring(_) | Page::PortaisMonitoring(_) => {
                "f: filtro | r: limpar | 1-9: ordenar | h/l: página | Esc: voltar"
            }
            Page::Contas(_) => {
                "Tab: grupos/contas | n/e/d/w: grupo | a/s/o: conta | g/T/x: sincronizar grupo | A/S/z: lote | v: visão"
            }
            Page::Login => "",
        }
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(palette.muted)),
        area,
    );
}

/// Render the login screen.
fn render_login(frame: &mut Frame, app: &App, palette: &Palette) {
    let area = frame.area();
    let dialog_area = centered_rect(50, 9, area);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Evo Admin - Entrar ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let fields = app.active_fields();
    let mut lines = field_lines(&fields, app.field_cursor, palette);
    lines.push(Line::default());
    if let Some(error) = app.form_error() {
        lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_home(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .title(" Painel ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let items: Vec<ListItem> = Route::menu()
        .iter()
        .enumerate()
        .map(|(i, route)| {
            let style = if i == app.menu_cursor {
                palette.selected()
            } else {
                Style::default().fg(palette.fg)
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("  {} ", route.title())),
                Span::styled(route.path(), Style::default().fg(palette.muted)),
            ]))
            .style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Table pages: optional filter panel above the data table.
fn render_table_page(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let filter_fields = app.filter_fields();
    let table_area = if filter_fields.is_empty() {
        area
    } else {
        let height = filter_fields.len() as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(height), Constraint::Min(3)])
            .split(area);

        let focused = app.focus == Focus::Filter;
        let block = Block::default()
            .title(" Filtros ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                palette.accent
            } else {
                palette.muted
            }));
        let cursor = if focused { app.field_cursor } else { usize::MAX };
        frame.render_widget(
            Paragraph::new(field_lines(&filter_fields, cursor, palette)).block(block),
            chunks[0],
        );
        chunks[1]
    };

    if let Some(table) = app.table() {
        render_data_table(frame, app, table, palette, table_area);
    }
}

fn render_data_table(
    frame: &mut Frame,
    app: &App,
    table: &dyn TableView,
    palette: &Palette,
    area: Rect,
) {
    let focused = app.focus == Focus::Main && !app.dialog_open();
    let loading = page_state(app).is_some_and(|s| *s == PageState::Loading);
    let title = if loading {
        format!(" {} (carregando...) ", app.route.title())
    } else {
        format!(" {} ", app.route.title())
    };
    let block = Block::default()
        .title(title)
        .title_bottom(format!(
            " Página {} de {} · {} registros ",
            table.page(),
            table.page_count(),
            table.len()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            palette.accent
        } else {
            palette.muted
        }));

    let headers = table.headers();
    let header = Row::new(headers.iter().enumerate().map(|(i, h)| {
        let arrow = match table.sort_indicator(i) {
            Some(SortDirection::Ascending) => " ▲",
            Some(SortDirection::Descending) => " ▼",
            None => "",
        };
        Cell::from(format!("{}{arrow}", h.name))
    }))
    .style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD));

    let selected = table.selected_index();
    let rows = table.page_cells().into_iter().enumerate().map(|(i, cells)| {
        let height = cells.iter().map(DataCell::height).max().unwrap_or(1).max(1);
        let row = Row::new(cells.iter().map(table_cell)).height(height as u16);
        if i == selected && focused {
            row.style(palette.selected())
        } else {
            row.style(Style::default().fg(palette.fg))
        }
    });

    let count = headers.len().max(1) as u32;
    let widths = vec![Constraint::Ratio(1, count); headers.len()];
    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

fn table_cell(cell: &DataCell) -> Cell<'static> {
    match cell {
        DataCell::Flag(true) => Cell::from("✔").style(Style::default().fg(Color::Green)),
        DataCell::Flag(false) => Cell::from("✘").style(Style::default().fg(Color::Red)),
        other => Cell::from(other.lines().join("\n")),
    }
}

fn page_state(app: &App) -> Option<&PageState> {
    match &app.page {
        Page::Clientes(p) => Some(&p.state),
        Page::Pipelines(p) => Some(&p.state),
        Page::Tintim(p) => Some(&p.state),
        Page::TintimMonitoring(p) => Some(&p.state),
        Page::Portais(p) => Some(&p.state),
        Page::PortaisMonitoring(p) => Some(&p.state),
        Page::Contas(d) => Some(&d.state),
        _ => None,
    }
}

/// Sync dashboard: stats, groups and accounts side by side, progress and log.
fn render_dashboard(
    frame: &mut Frame,
    app: &App,
    dashboard: &SyncDashboard,
    palette: &Palette,
    area: Rect,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(4),
            Constraint::Length(8),
        ])
        .split(area);

    let stats = dashboard.stats();
    let stats_line = Line::from(vec![
        Span::styled(format!(" Contas: {} ", stats.accounts), Style::default().fg(palette.fg)),
        Span::styled(format!("| Grupos: {} ", stats.groups), Style::default().fg(palette.fg)),
        Span::styled(format!("| Masters: {} ", stats.masters), Style::default().fg(palette.fg)),
        Span::styled(format!("| Escravas: {} ", stats.slaves), Style::default().fg(palette.fg)),
        Span::styled(
            format!("| Contatos: {} ", stats.total_contacts),
            Style::default().fg(palette.accent),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(stats_line).block(Block::default().borders(Borders::ALL).title(" Resumo ")),
        rows[0],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    render_groups(frame, app, dashboard, palette, columns[0]);
    render_accounts(frame, app, dashboard, palette, columns[1]);
    render_progress(frame, dashboard, palette, rows[2]);
    render_logs(frame, dashboard, palette, rows[3]);
}

fn render_groups(
    frame: &mut Frame,
    app: &App,
    dashboard: &SyncDashboard,
    palette: &Palette,
    area: Rect,
) {
    let focused = app.focus == Focus::Main;
    let block = Block::default()
        .title(format!(" Grupos ({}) ", dashboard.view_mode.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            palette.accent
        } else {
            palette.muted
        }));

    let mut items = Vec::new();
    for (i, group) in dashboard.groups.iter().enumerate() {
        let master = group
            .master_account
            .as_ref()
            .map(|m| m.subdomain.as_str())
            .unwrap_or("sem master");
        let marker = if dashboard.sync_group == Some(group.id) {
            "● "
        } else {
            "  "
        };
        let style = if i == dashboard.cursor && focused {
            palette.selected()
        } else {
            Style::default().fg(palette.fg)
        };
        items.push(
            ListItem::new(format!(
                "{marker}{} · master {master} · {} escravas",
                group.name, group.slave_count
            ))
            .style(style),
        );

        if dashboard.view_mode == ViewMode::Expanded {
            for slave in &group.slave_accounts {
                let contacts = slave
                    .contact_count
                    .map(|c| format!(" · {c} contatos"))
                    .unwrap_or_default();
                items.push(
                    ListItem::new(format!("      ↳ {}{contacts}", slave.subdomain))
                        .style(Style::default().fg(palette.muted)),
                );
            }
        }
    }
    if items.is_empty() {
        items.push(ListItem::new("Nenhum grupo cadastrado").style(Style::default().fg(palette.muted)));
    }

    frame.render_widget(List::new(items).block(block), area);
}

fn render_accounts(
    frame: &mut Frame,
    app: &App,
    dashboard: &SyncDashboard,
    palette: &Palette,
    area: Rect,
) {
    let focused = app.focus == Focus::Accounts;
    let block = Block::default()
        .title(format!(
            " Contas ({} selecionadas) ",
            dashboard.selected_accounts.len()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            palette.accent
        } else {
            palette.muted
        }));

    let items: Vec<ListItem> = dashboard
        .accounts
        .iter()
        .enumerate()
        .map(|(i, account)| {
            let check = if dashboard.selected_accounts.contains(&account.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let role = if account.is_master { "master" } else { "escrava" };
            let status = account.status.as_deref().unwrap_or("-");
            let style = if i == app.account_cursor && focused {
                palette.selected()
            } else {
                Style::default().fg(palette.fg)
            };
            ListItem::new(format!("{check} {} ({role}) {status}", account.subdomain)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_progress(frame: &mut Frame, dashboard: &SyncDashboard, palette: &Palette, area: Rect) {
    let group = dashboard
        .sync_group
        .and_then(|id| dashboard.groups.iter().find(|g| g.id == id))
        .map(|g| g.name.as_str())
        .unwrap_or("nenhum grupo");
    let block = Block::default()
        .title(format!(
            " Sincronização · {group} · {} ",
            dashboard.sync_type.label()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted));

    let (ratio, label) = match dashboard.batch_progress() {
        Some((done, total)) => (
            done as f64 / total.max(1) as f64,
            format!("{done}/{total} contas"),
        ),
        None => {
            let percent = dashboard.progress.percent();
            (f64::from(percent) / 100.0, format!("{percent}% (estimado)"))
        }
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(palette.accent))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(label),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(dashboard.operation.as_str()).style(Style::default().fg(palette.fg)),
        chunks[1],
    );
}

fn render_logs(frame: &mut Frame, dashboard: &SyncDashboard, palette: &Palette, area: Rect) {
    let block = Block::default()
        .title(" Log ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted));

    let visible = area.height.saturating_sub(2) as usize;
    let logs = dashboard.logs();
    let lines: Vec<Line> = logs
        .iter()
        .skip(logs.len().saturating_sub(visible))
        .map(|entry| {
            Line::from(vec![
                Span::styled(format!("[{}] ", entry.time), Style::default().fg(palette.muted)),
                Span::styled(entry.message.as_str(), Style::default().fg(palette.fg)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the open form dialog.
fn render_dialog(frame: &mut Frame, app: &App, palette: &Palette) {
    let fields = app.active_fields();
    let height = fields.len() as u16 + 5;
    let dialog_area = centered_rect(64, height, frame.area());

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" {} ", app.dialog_title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let mut lines = field_lines(&fields, app.field_cursor, palette);
    lines.push(Line::default());
    if let Some(error) = app.form_error() {
        lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        dialog_area,
    );
}

fn render_confirm(frame: &mut Frame, app: &App, question: &str, palette: &Palette) {
    let dialog_area = centered_rect(60, 6, frame.area());
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" {} ", app.dialog_title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let mut lines = vec![
        Line::styled(question.to_string(), Style::default().fg(palette.fg)),
        Line::styled("[y] Sim   [n] Não", Style::default().fg(palette.muted)),
    ];
    if let Some(error) = app.form_error() {
        lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
    }
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        dialog_area,
    );
}

fn render_group_accounts(
    frame: &mut Frame,
    app: &App,
    dashboard: &SyncDashboard,
    group_id: i64,
    palette: &Palette,
) {
    let Some(group) = dashboard.groups.iter().find(|g| g.id == group_id) else {
        return;
    };
    let dialog_area = centered_rect(70, 16, frame.area());
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" Contas do grupo {} ", group.name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let mut items = Vec::new();
    if let Some(master) = &group.master_account {
        items.push(
            ListItem::new(format!("★ {} (master)", master.subdomain))
                .style(Style::default().fg(palette.accent)),
        );
    }
    for (i, slave) in group.slave_accounts.iter().enumerate() {
        let last_sync = slave.last_sync.as_deref().unwrap_or("nunca");
        let style = if i == app.dialog_cursor {
            palette.selected()
        } else {
            Style::default().fg(palette.fg)
        };
        items.push(
            ListItem::new(format!("  {} · última sincronização {last_sync}", slave.subdomain))
                .style(style),
        );
    }
    if group.slave_accounts.is_empty() {
        items.push(
            ListItem::new("  Nenhuma conta escrava").style(Style::default().fg(palette.muted)),
        );
    }

    frame.render_widget(List::new(items).block(block), dialog_area);
}

/// Render the text editor overlay.
fn render_editor(frame: &mut Frame, app: &App, palette: &Palette) {
    let Some(editor) = &app.editor else {
        return;
    };
    let dialog_area = centered_rect(60, 3, frame.area());
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" {} ", editor.label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let shown = if editor.masked {
        "•".repeat(editor.buffer.chars().count())
    } else {
        editor.buffer.clone()
    };
    let input = Line::from(vec![
        Span::styled("▸ ", Style::default().fg(Color::Yellow)),
        Span::styled(shown, Style::default().fg(palette.fg)),
        Span::styled(
            "_",
            Style::default()
                .fg(palette.fg)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);
    frame.render_widget(Paragraph::new(input).block(block), dialog_area);
}

/// Render the picker overlay.
fn render_picker(frame: &mut Frame, app: &App, palette: &Palette) {
    let Some((_, picker)) = &app.picker else {
        return;
    };
    let area = frame.area();
    let dialog_width = 60.min(area.width.saturating_sub(4));
    let dialog_height = 15.min(area.height.saturating_sub(4));
    let dialog_area = centered_rect(dialog_width, dialog_height, area);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" {} ", picker.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let input_line = Line::from(vec![
        Span::styled("▸ ", Style::default().fg(Color::Magenta)),
        Span::styled(picker.query(), Style::default().fg(palette.fg)),
        Span::styled(
            "_",
            Style::default()
                .fg(palette.fg)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);
    frame.render_widget(Paragraph::new(input_line), chunks[0]);

    let items: Vec<ListItem> = picker
        .visible()
        .enumerate()
        .map(|(i, option)| {
            let style = if i == picker.cursor() {
                palette.selected()
            } else {
                Style::default().fg(palette.fg)
            };
            ListItem::new(option.label.clone()).style(style)
        })
        .collect();

    if items.is_empty() {
        frame.render_widget(
            Paragraph::new("Nenhum resultado")
                .style(Style::default().fg(palette.muted))
                .alignment(ratatui::layout::Alignment::Center),
            chunks[1],
        );
    } else {
        frame.render_widget(List::new(items), chunks[1]);
    }
}

fn render_toast(frame: &mut Frame, app: &App) {
    let Some(toast) = &app.toast else {
        return;
    };
    let area = frame.area();
    let text = toast.notice.text();
    let width = (text.chars().count() as u16 + 4).min(area.width);
    let toast_area = Rect::new(
        area.x + area.width.saturating_sub(width),
        area.y + 1,
        width,
        3.min(area.height),
    );
    let color = match toast.notice {
        Notice::Success(_) => Color::Green,
        Notice::Error(_) => Color::Red,
    };

    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        ),
        toast_area,
    );
}

/// One line per field, the cursor line highlighted.
fn field_lines(fields: &[Field], cursor: usize, palette: &Palette) -> Vec<Line<'static>> {
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = i == cursor;
            let line = match &field.action {
                FieldAction::Submit(enabled) => {
                    let color = if *enabled { palette.accent } else { palette.muted };
                    Line::from(Span::styled(
                        format!("[ {} ]", field.label),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ))
                }
                FieldAction::Static => Line::from(vec![
                    Span::styled(format!("{}: ", field.label), Style::default().fg(palette.muted)),
                    Span::styled(field.display(), Style::default().fg(palette.muted)),
                ]),
                action => {
                    let suffix = match action {
                        FieldAction::Pick(_) => " ▾",
                        FieldAction::Cycle(_) => " ⟳",
                        _ => "",
                    };
                    Line::from(vec![
                        Span::styled(format!("{}: ", field.label), Style::default().fg(palette.muted)),
                        Span::styled(
                            format!("{}{suffix}", field.display()),
                            Style::default().fg(palette.fg),
                        ),
                    ])
                }
            };
            if selected {
                line.style(palette.selected())
            } else {
                line
            }
        })
        .collect()
}

/// Helper to create a centered rectangle.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
