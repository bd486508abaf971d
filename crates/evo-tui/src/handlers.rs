//! Keyboard event handling.

use crate::app::{App, AppState, Focus, InputMode, Page};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle a key event. Returns true if the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    // Ctrl+C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.state = AppState::Quit;
        return true;
    }

    match app.input_mode {
        InputMode::Editing => handle_editing_key(app, key),
        InputMode::Picking => handle_picker_key(app, key),
        InputMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_editing_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => app.commit_editor(),
        KeyCode::Esc => app.cancel_editor(),
        KeyCode::Backspace => {
            if let Some(editor) = app.editor.as_mut() {
                editor.buffer.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(editor) = app.editor.as_mut() {
                editor.buffer.push(c);
            }
        }
        _ => {}
    }
    false
}

fn handle_picker_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => app.commit_picker(),
        KeyCode::Esc => app.cancel_picker(),
        KeyCode::Down => {
            if let Some((_, picker)) = app.picker.as_mut() {
                picker.next();
            }
        }
        KeyCode::Up => {
            if let Some((_, picker)) = app.picker.as_mut() {
                picker.prev();
            }
        }
        KeyCode::Backspace => {
            if let Some((_, picker)) = app.picker.as_mut() {
                picker.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some((_, picker)) = app.picker.as_mut() {
                picker.push(c);
            }
        }
        _ => {}
    }
    false
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> bool {
    if matches!(app.page, Page::Login) {
        return handle_login_key(app, key);
    }
    if app.confirm_prompt().is_some() {
        handle_confirm_key(app, key);
        return false;
    }
    if app.viewing_accounts().is_some() {
        handle_accounts_dialog_key(app, key);
        return false;
    }
    if app.dialog_open() {
        handle_form_key(app, key, true);
        return false;
    }
    if app.focus == Focus::Filter {
        handle_form_key(app, key, false);
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('p') {
            app.open_palette();
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quit;
            return true;
        }
        KeyCode::Char('t') => {
            app.toggle_theme();
            return false;
        }
        KeyCode::F(5) | KeyCode::Char('R') => {
            app.reload();
            return false;
        }
        KeyCode::Char('L') => {
            app.logout();
            return false;
        }
        KeyCode::Esc => {
            app.back();
            return false;
        }
        _ => {}
    }

    if matches!(app.page, Page::Contas(_)) {
        handle_dashboard_key(app, key);
        return false;
    }
    if matches!(app.page, Page::Home) {
        handle_home_key(app, key);
        return false;
    }
    if handle_table_key(app, key) {
        return false;
    }
    handle_page_key(app, key);
    false
}

fn handle_login_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Down | KeyCode::Tab => app.move_field(true),
        KeyCode::Up | KeyCode::BackTab => app.move_field(false),
        KeyCode::Enter => app.activate_field(),
        KeyCode::Char('q') | KeyCode::Esc => {
            app.state = AppState::Quit;
            return true;
        }
        _ => {}
    }
    false
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('s') | KeyCode::Enter => app.confirm(),
        KeyCode::Char('n') | KeyCode::Esc => app.close_dialog(),
        _ => {}
    }
}

fn handle_accounts_dialog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.move_dialog_cursor(true),
        KeyCode::Up | KeyCode::Char('k') => app.move_dialog_cursor(false),
        KeyCode::Char('d') => {
            if let Some(id) = app.cursor_slave() {
                app.with_dashboard(|d| d.open_remove_slave(id));
            }
        }
        KeyCode::Char('y') => {
            if let Some(id) = app.cursor_slave() {
                app.sync_account(id);
            }
        }
        KeyCode::Esc | KeyCode::Char('q') => app.close_dialog(),
        _ => {}
    }
}

/// Keys of a field list: an open dialog, or the filter panel.
fn handle_form_key(app: &mut App, key: KeyEvent, dialog: bool) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.submit();
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Tab => app.move_field(true),
        KeyCode::Up | KeyCode::BackTab => app.move_field(false),
        KeyCode::Enter => app.activate_field(),
        KeyCode::Char('r') if !dialog => app.reset_filter(),
        KeyCode::Esc => {
            if dialog {
                app.close_dialog();
            } else {
                app.focus = Focus::Main;
            }
        }
        _ => {}
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    let entries = evo_core::Route::menu().len();
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if app.menu_cursor + 1 < entries {
                app.menu_cursor += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.menu_cursor = app.menu_cursor.saturating_sub(1);
        }
        KeyCode::Enter => app.open_menu_entry(),
        _ => {}
    }
}

/// Navigation shared by every page with a table. Returns true when the key
/// was consumed.
fn handle_table_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('f') {
        app.focus_filter();
        return true;
    }
    let Some(table) = app.table_mut() else {
        return false;
    };
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => table.select_next(),
        KeyCode::Up | KeyCode::Char('k') => table.select_prev(),
        KeyCode::Right | KeyCode::Char('l') => table.next_page(),
        KeyCode::Left | KeyCode::Char('h') => table.prev_page(),
        KeyCode::Char(c @ '1'..='9') => {
            let column = c as usize - '1' as usize;
            if column < table.headers().len() {
                table.toggle_sort(column);
            }
        }
        _ => return false,
    }
    true
}

fn handle_page_key(app: &mut App, key: KeyEvent) {
    let KeyCode::Char(c) = key.code else {
        return;
    };
    match (&app.page, c) {
        (Page::Clientes(_), 'a') => app.open_dialog(|page| {
            if let Page::Clientes(p) = page {
                p.open_create();
            }
        }),
        (Page::Clientes(_), 'p') => {
            if let Some(cliente_id) = app.selected_cliente() {
                app.navigate(evo_core::Route::Pipelines { cliente_id });
            }
        }
        (Page::Clientes(_) | Page::Tintim(_) | Page::Portais(_), 'e') => app.open_edit(),
        (Page::Clientes(_), 'd') => app.open_dialog(|page| {
            if let Page::Clientes(p) = page {
                p.open_delete();
            }
        }),
        (Page::Pipelines(_), 'a') => app.open_dialog(|page| {
            if let Page::Pipelines(p) = page {
                p.open_add();
            }
        }),
        (Page::Pipelines(_), 'd') => app.open_dialog(|page| {
            if let Page::Pipelines(p) = page {
                p.open_delete();
            }
        }),
        (Page::Tintim(_), 'a') => app.open_dialog(|page| {
            if let Page::Tintim(p) = page {
                p.open_add();
            }
        }),
        (Page::Tintim(_), 'd') => app.open_dialog(|page| {
            if let Page::Tintim(p) = page {
                p.open_delete();
            }
        }),
        (Page::Tintim(_), 'c') => app.copy_webhook_link(),
        (Page::Tintim(_), 'm') => {
            app.navigate(evo_core::Route::TintimMonitoring { id: None });
        }
        (Page::Portais(_), 'a') => app.open_dialog(|page| {
            if let Page::Portais(p) = page {
                p.open_add();
            }
        }),
        (Page::Portais(_), 'd') => app.open_dialog(|page| {
            if let Page::Portais(p) = page {
                p.open_delete();
            }
        }),
        (Page::Portais(_), 'm') => {
            app.navigate(evo_core::Route::PortaisMonitoring { id: None });
        }
        (Page::TintimMonitoring(_) | Page::PortaisMonitoring(_), 'r') => app.reset_filter(),
        _ => {}
    }
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Tab {
        app.focus = match app.focus {
            Focus::Accounts => Focus::Main,
            _ => Focus::Accounts,
        };
        return;
    }

    let accounts = app.focus == Focus::Accounts;
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if accounts {
                app.move_account_cursor(true);
            } else {
                app.with_dashboard(|d| d.next_group());
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if accounts {
                app.move_account_cursor(false);
            } else {
                app.with_dashboard(|d| d.prev_group());
            }
        }
        KeyCode::Char(' ') => {
            if let Some(id) = app.cursor_account() {
                app.with_dashboard(|d| d.toggle_account_selection(id));
            }
        }
        KeyCode::Char('y') => {
            if let Some(id) = app.cursor_account() {
                app.sync_account(id);
            }
        }
        KeyCode::Char('v') => app.with_dashboard(|d| d.toggle_view_mode()),
        KeyCode::Char('n') => app.open_dialog(|page| {
            if let Page::Contas(d) = page {
                d.open_create_group();
            }
        }),
        KeyCode::Char('e') => app.open_edit(),
        KeyCode::Char('d') => app.with_dashboard(|d| d.open_delete_group()),
        KeyCode::Char('w') => {
            app.dialog_cursor = 0;
            app.with_dashboard(|d| d.open_view_accounts());
        }
        KeyCode::Char('a') => app.open_dialog(|page| {
            if let Page::Contas(d) = page {
                d.open_add_account();
            }
        }),
        KeyCode::Char('s') => app.open_dialog(|page| {
            if let Page::Contas(d) = page {
                d.open_add_slave();
            }
        }),
        KeyCode::Char('o') => app.open_dialog(|page| {
            if let Page::Contas(d) = page {
                d.open_associate_slave();
            }
        }),
        KeyCode::Char('g') => app.open_sync_group_picker(),
        KeyCode::Char('T') => app.with_dashboard(|d| d.cycle_sync_type()),
        KeyCode::Char('x') => app.trigger_group_sync(),
        KeyCode::Char('A') => app.with_dashboard(|d| d.sync_all()),
        KeyCode::Char('S') => app.with_dashboard(|d| d.sync_selected()),
        KeyCode::Char('z') => app.with_dashboard(|d| d.stop_sync()),
        KeyCode::Char('c') => app.with_dashboard(|d| d.clear_logs()),
        _ => {}
    }
}
