use anyhow::Context;
use boksl_shell::app::coordinator::OperationCoordinator;
use boksl_shell::app::session::{SessionOptions, ShellSession};
use boksl_shell::app::transfer::TransferEngine;
use boksl_shell::app::App;
use boksl_shell::config::Settings;
use boksl_shell::core::actions::{find_action, generate_command_bar_items};
use boksl_shell::logging;
use boksl_shell::system::{ArchiveFs, FileSystem, PackageInstaller};
use boksl_shell::ui::layout::too_small_message;
use boksl_shell::ui::{
    CommandBar, ContextMenuView, Dialog, DialogKind, LayoutAreas, Panel, StatusBar, Theme,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Frame, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    // 설정과 로그는 터미널을 잡기 전에 준비한다
    let settings = Settings::load()?;
    let _log_guard = logging::init(&settings)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let mut app = build_app(&settings);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::default();
    let res = run_app(&mut terminal, &mut app, &theme);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // 종료 전에 실행 중인 작업을 마무리한다
    app.coordinator.wait(&mut app.session);
    tracing::info!("exiting");

    res.context("terminal loop failed")
}

fn build_app(settings: &Settings) -> App {
    let fs = Arc::new(FileSystem::new());
    let archives = Arc::new(ArchiveFs::new());
    let installer = Arc::new(PackageInstaller::new(settings.install_dir.clone()));

    let options = SessionOptions {
        sort: settings.sort,
        visible_rows: settings.visible_rows,
        package_extensions: settings.package_extensions.clone(),
    };
    let session = ShellSession::new(
        fs.clone(),
        archives.clone(),
        settings.mount_points(),
        options,
    );
    let coordinator = OperationCoordinator::new(TransferEngine::new(fs, archives, installer));
    App::new(session, coordinator)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    theme: &Theme,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app, theme))?;

        // 작업 진행 중에는 짧은 타임아웃으로 진행률을 갱신한다
        let poll_timeout = if app.is_operation_running() {
            Duration::from_millis(1)
        } else {
            Duration::from_millis(100)
        };

        if event::poll(poll_timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if app.is_dialog_active() {
                        handle_dialog_keys(app, key.modifiers, key.code);
                    } else if app.is_menu_active() {
                        handle_menu_keys(app, key.code);
                    } else {
                        handle_normal_keys(app, key.modifiers, key.code);
                    }
                }
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn render(f: &mut Frame, app: &mut App, theme: &Theme) {
    let size = f.area();
    let Some(areas) = LayoutAreas::compute(size) else {
        f.render_widget(Paragraph::new(too_small_message(size)), size);
        return;
    };
    app.fit_rows(areas.panel_rows());

    let session = &app.session;
    let title = session.location().display();
    let pending = session.selection.pending();
    let panel = Panel::new(session.entries.as_slice())
        .title(&title)
        .cursor(session.nav.cursor)
        .marked(&session.selection.marked)
        .pending((!pending.is_empty()).then_some(pending))
        .package_extensions(session.package_extensions())
        .theme(theme);
    f.render_widget(panel, areas.panel);

    let dirs = session
        .entries
        .iter()
        .filter(|e| e.is_folder && !e.is_parent_marker())
        .count();
    let files = session.entries.iter().filter(|e| !e.is_folder).count();
    let status = StatusBar::new()
        .counts(files, dirs)
        .marked_count(session.selection.marked.len())
        .pending(app.pending_status())
        .archive(session.archive.handle().map(|h| h.format().display_name()))
        .toast(app.toast())
        .theme(theme);
    f.render_widget(status, areas.status_bar);

    let commands = generate_command_bar_items(|action| app.is_action_enabled(action));
    f.render_widget(CommandBar::new(commands).theme(theme), areas.command_bar);

    if let Some(menu) = &app.context_menu {
        let anchor_y = areas.panel.y + 1 + session.nav.cursor.rel as u16;
        f.render_widget(
            ContextMenuView::new(menu).anchor_y(anchor_y).theme(theme),
            areas.panel,
        );
    }

    let progress = app.progress_dialog();
    if let Some(kind) = app.dialog.as_ref().or(progress.as_ref()) {
        f.render_widget(Dialog::new(kind).theme(theme), size);
    }
}

/// 일반 모드 키 처리 (액션 레지스트리 기반)
fn handle_normal_keys(app: &mut App, modifiers: KeyModifiers, code: KeyCode) {
    if let Some(action) = find_action(modifiers, code) {
        app.execute_action(action);
    }
}

/// 항목 메뉴 키 처리
fn handle_menu_keys(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => app.context_menu_up(),
        KeyCode::Down | KeyCode::Char('j') => app.context_menu_down(),
        KeyCode::Enter => app.context_menu_select(),
        KeyCode::Esc | KeyCode::Char('m') | KeyCode::Tab => app.close_context_menu(),
        _ => {}
    }
}

/// 대화상자 키 처리
fn handle_dialog_keys(app: &mut App, modifiers: KeyModifiers, code: KeyCode) {
    // 진행 중에는 취소만 받는다
    if app.dialog.is_none() {
        if code == KeyCode::Esc {
            app.cancel_operation();
        }
        return;
    }

    let (is_input, is_confirm) = match &app.dialog {
        Some(DialogKind::Input { .. }) => (true, false),
        Some(DialogKind::Confirm { .. }) => (false, true),
        _ => (false, false),
    };

    if is_input {
        handle_input_dialog_keys(app, modifiers, code);
    } else if is_confirm {
        match code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                app.dialog_toggle_button()
            }
            KeyCode::Enter => app.confirm_dialog(),
            KeyCode::Char('y') => {
                if app.dialog.as_ref().and_then(DialogKind::selected_button) == Some(1) {
                    app.dialog_toggle_button();
                }
                app.confirm_dialog();
            }
            KeyCode::Esc | KeyCode::Char('n') => app.close_dialog(),
            _ => {}
        }
    } else if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        // 결과/오류 메시지
        app.confirm_dialog();
    }
}

/// 입력 대화상자 키 처리
fn handle_input_dialog_keys(app: &mut App, modifiers: KeyModifiers, code: KeyCode) {
    match (modifiers, code) {
        (_, KeyCode::Enter) => app.confirm_dialog(),
        (_, KeyCode::Esc) => app.close_dialog(),
        (KeyModifiers::NONE, KeyCode::Tab) | (KeyModifiers::SHIFT, KeyCode::BackTab) => {
            app.dialog_toggle_button()
        }
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            app.dialog_input(|input| input.insert_char(c))
        }
        (_, KeyCode::Backspace) => app.dialog_input(|input| input.backspace()),
        (_, KeyCode::Delete) => app.dialog_input(|input| input.delete()),
        (_, KeyCode::Left) => app.dialog_input(|input| input.left()),
        (_, KeyCode::Right) => app.dialog_input(|input| input.right()),
        (_, KeyCode::Home) => app.dialog_input(|input| input.home()),
        (_, KeyCode::End) => app.dialog_input(|input| input.end()),
        _ => {}
    }
}
