//! 앱 상태: 세션, 작업 조정기, 화면 상태(대화상자, 항목 메뉴, 토스트)
//!
//! 키 입력은 `main`에서 액션으로 바뀐 뒤 여기로 온다. 실제 상태 변경은 모두
//! `ShellSession`과 `OperationCoordinator`가 한다.

pub mod coordinator;
pub mod session;
pub mod text_edit;
pub mod transfer;


use crate::core::actions::Action;
use crate::models::context_menu::{ContextMenu, MenuAction, MenuContext};
use crate::models::operation::{TransferMode, TransferStatus, TransferSummary};
use crate::ui::components::dialog::{DialogKind, InputPurpose};
use crate::utils::error::{ErrorKind, ShellError};
use crate::utils::formatter::clipboard_message;
use coordinator::{OperationCoordinator, OperationStep};
use session::{EnterOutcome, ShellSession};
use std::path::Path;
use std::time::{Duration, Instant};

/// 토스트 표시 시간
const TOAST_DURATION: Duration = Duration::from_secs(3);
/// 결과 대화상자에 나열할 최대 오류 수
const MAX_REPORTED_ERRORS: usize = 5;

pub struct App {
    pub should_quit: bool,
    pub session: ShellSession,
    pub coordinator: OperationCoordinator,
    /// 입력/확인/결과 대화상자 (진행률은 `progress_dialog`가 매 프레임 만든다)
    pub dialog: Option<DialogKind>,
    pub context_menu: Option<ContextMenu>,
    pub toast_message: Option<(String, Instant)>,
    /// 설정의 `visible_rows` (화면이 더 작으면 줄어든다)
    max_rows: usize,
}

impl App {
    pub fn new(session: ShellSession, coordinator: OperationCoordinator) -> Self {
        let max_rows = session.nav.window();
        Self {
            should_quit: false,
            session,
            coordinator,
            dialog: None,
            context_menu: None,
            toast_message: None,
            max_rows,
        }
    }

    pub fn quit(&mut self) {
        if self.is_operation_running() {
            self.set_toast("Wait for the running operation or press Esc to cancel");
            return;
        }
        self.should_quit = true;
    }

    pub fn is_operation_running(&self) -> bool {
        matches!(self.coordinator.step(), OperationStep::Running(_))
    }

    pub fn is_dialog_active(&self) -> bool {
        self.dialog.is_some() || self.is_operation_running()
    }

    pub fn is_menu_active(&self) -> bool {
        self.context_menu.is_some()
    }

    /// 패널 높이에 맞춰 커서 창 크기 조정
    pub fn fit_rows(&mut self, panel_rows: usize) {
        let rows = panel_rows.min(self.max_rows).max(1);
        if rows != self.session.nav.window() {
            self.session.set_visible_rows(rows);
        }
    }

    /// 매 프레임 호출: 작업 완료 확인, 토스트 만료
    pub fn tick(&mut self) {
        if self.coordinator.poll(&mut self.session) {
            if let OperationStep::Finished(summary) = self.coordinator.step() {
                self.dialog = Some(summary_dialog(summary));
            }
        }
        if self
            .toast_message
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() >= TOAST_DURATION)
        {
            self.toast_message = None;
        }
    }

    pub fn set_toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some((message.into(), Instant::now()));
    }

    pub fn toast(&self) -> Option<&str> {
        self.toast_message.as_ref().map(|(m, _)| m.as_str())
    }

    /// 오류 분류에 따라 토스트 또는 오류 대화상자
    fn show_error(&mut self, error: ShellError) {
        tracing::debug!(error = %error, "action rejected");
        match error.kind() {
            ErrorKind::Busy => self.set_toast(error.to_string()),
            ErrorKind::NotFound => {
                // 사라진 항목: 목록과 선택을 다시 맞춘다
                if let Err(e) = self.session.refresh() {
                    tracing::warn!(error = %e, "refresh after missing entry failed");
                }
                self.set_toast(error.to_string());
            }
            ErrorKind::PermissionDenied | ErrorKind::IoFailure => {
                self.dialog = Some(DialogKind::error("Error", error.to_string()));
            }
        }
    }

    // === 액션 ===

    pub fn execute_action(&mut self, action: Action) {
        match action {
            Action::MoveUp => self.session.move_up(),
            Action::MoveDown => self.session.move_down(),
            Action::PageUp => self.session.page_up(),
            Action::PageDown => self.session.page_down(),
            Action::GoToParent => self.go_parent(),
            Action::EnterSelected => self.enter_selected(),
            Action::GoHome => self.session.go_home(),
            Action::ToggleMark => {
                self.session.toggle_mark();
                self.session.move_down();
            }
            Action::ToggleMarkAll => self.session.toggle_mark_all(),
            Action::Copy => self.commit(false),
            Action::Cut => self.commit(true),
            Action::Paste => self.paste(),
            Action::Delete => self.delete(),
            Action::Rename => self.start_rename(),
            Action::NewFolder => self.start_new_folder(),
            Action::OpenMenu => self.open_context_menu(),
            Action::Refresh => self.refresh(),
            Action::Quit => self.quit(),
        }
    }

    /// 지금 상태에서 실행 가능한지 (커맨드바 표시용)
    pub fn is_action_enabled(&self, action: Action) -> bool {
        let writable = !self.session.in_archive() && self.session.current_dir().is_some();
        let on_entry = self
            .session
            .highlighted()
            .is_some_and(|e| !e.is_parent_marker())
            && self.session.current_dir().is_some();
        match action {
            Action::Paste => writable && !self.session.selection.pending().is_empty(),
            Action::Cut | Action::Delete | Action::Rename => writable && on_entry,
            Action::Copy | Action::ToggleMark => on_entry,
            Action::ToggleMarkAll => self.session.current_dir().is_some(),
            Action::NewFolder => writable,
            _ => true,
        }
    }

    fn go_parent(&mut self) {
        if let Err(e) = self.session.ascend() {
            self.set_toast(e.to_string());
        }
    }

    fn enter_selected(&mut self) {
        match self.session.enter_selected() {
            Ok(EnterOutcome::InstallRequested(package)) => self.request_install(&package),
            Ok(EnterOutcome::Unsupported(name)) => {
                self.set_toast(format!("Cannot open '{}'", name))
            }
            Ok(EnterOutcome::Nothing | EnterOutcome::Navigated | EnterOutcome::OpenedArchive) => {}
            Err(e) => self.show_error(e),
        }
    }

    fn refresh(&mut self) {
        if let Err(e) = self.session.refresh() {
            self.set_toast(e.to_string());
        }
    }

    fn commit(&mut self, move_requested: bool) {
        match self.session.commit(move_requested) {
            Ok(report) => {
                let verb = match report.mode {
                    TransferMode::Move => "Cut",
                    _ => "Copied",
                };
                let names: Vec<&str> = report.names.iter().map(String::as_str).collect();
                let message = clipboard_message(verb, &names, report.single_is_folder);
                self.set_toast(message);
            }
            Err(e) => self.show_error(e),
        }
    }

    fn paste(&mut self) {
        let result = self.coordinator.request_paste(&mut self.session);
        self.after_request(result);
    }

    fn delete(&mut self) {
        let result = self.coordinator.request_delete(&mut self.session);
        self.after_request(result);
    }

    fn request_install(&mut self, package: &Path) {
        let result = self.coordinator.request_install(&self.session, package);
        self.after_request(result);
    }

    /// 요청 결과에 따라 확인 대화상자를 띄우거나 오류를 보여준다.
    fn after_request(&mut self, result: crate::utils::error::Result<()>) {
        if let Err(e) = result {
            self.show_error(e);
            return;
        }
        if let OperationStep::Confirming(snapshot) = self.coordinator.step() {
            let title = snapshot.mode.name();
            let message = self.coordinator.prompt().unwrap_or_default();
            self.dialog = Some(DialogKind::confirm(title, message));
        }
    }

    fn start_rename(&mut self) {
        let Some(entry) = self
            .session
            .highlighted()
            .filter(|e| !e.is_parent_marker())
        else {
            return;
        };
        if self.session.in_archive() || self.session.current_dir().is_none() {
            self.set_toast("Cannot rename here");
            return;
        }
        self.dialog = Some(DialogKind::input(InputPurpose::Rename, entry.name.clone()));
    }

    fn start_new_folder(&mut self) {
        let Some(dir) = self.session.current_dir().map(Path::to_path_buf) else {
            self.set_toast("Cannot create a folder here");
            return;
        };
        if self.session.in_archive() {
            self.set_toast("Cannot create a folder here");
            return;
        }
        let name = self.session.next_new_folder_name(&dir);
        self.dialog = Some(DialogKind::input(InputPurpose::NewFolder, name));
    }

    // === 항목 메뉴 ===

    pub fn open_context_menu(&mut self) {
        if self.session.current_dir().is_none() {
            return;
        }
        let on_parent_entry = self
            .session
            .highlighted()
            .map_or(true, |e| e.is_parent_marker());
        let menu = ContextMenu::build(MenuContext {
            on_parent_entry,
            pending_empty: self.session.selection.pending().is_empty(),
            in_archive: self.session.in_archive(),
            mark_label: self.session.mark_all_label(),
        });
        if !menu.items().is_empty() {
            self.context_menu = Some(menu);
        }
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    pub fn context_menu_up(&mut self) {
        if let Some(menu) = &mut self.context_menu {
            menu.move_up();
        }
    }

    pub fn context_menu_down(&mut self) {
        if let Some(menu) = &mut self.context_menu {
            menu.move_down();
        }
    }

    pub fn context_menu_select(&mut self) {
        let Some(action) = self.context_menu.take().and_then(|m| m.current()) else {
            return;
        };
        match action {
            MenuAction::MarkAll | MenuAction::UnmarkAll => self.session.toggle_mark_all(),
            MenuAction::Move => self.commit(true),
            MenuAction::Copy => self.commit(false),
            MenuAction::Paste => self.paste(),
            MenuAction::Delete => self.delete(),
            MenuAction::Rename => self.start_rename(),
            MenuAction::NewFolder => self.start_new_folder(),
        }
    }

    // === 대화상자 ===

    pub fn dialog_toggle_button(&mut self) {
        if let Some(dialog) = &mut self.dialog {
            dialog.toggle_button();
        }
    }

    /// 입력 대화상자의 필드 편집
    pub fn dialog_input(&mut self, edit: impl FnOnce(&mut text_edit::TextInput)) {
        if let Some(input) = self.dialog.as_mut().and_then(DialogKind::input_mut) {
            edit(input);
        }
    }

    /// Enter: 선택된 버튼 실행
    pub fn confirm_dialog(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        match dialog {
            DialogKind::Input {
                purpose,
                input,
                selected_button,
            } => {
                if selected_button != 0 {
                    return;
                }
                let result = match purpose {
                    InputPurpose::NewFolder => self
                        .session
                        .create_folder(Some(input.value()))
                        .map(|name| format!("Created folder '{}'", name)),
                    InputPurpose::Rename => self
                        .session
                        .rename_highlighted(input.value())
                        .map(|()| format!("Renamed to '{}'", input.value().trim())),
                };
                match result {
                    Ok(message) => self.set_toast(message),
                    Err(e) => self.show_error(e),
                }
            }
            DialogKind::Confirm {
                selected_button, ..
            } => {
                if let Err(e) = self.coordinator.confirm(selected_button == 0) {
                    self.show_error(e);
                }
            }
            DialogKind::Progress { .. } => {}
            DialogKind::Message { .. } | DialogKind::Error { .. } => {
                self.coordinator.acknowledge();
            }
        }
    }

    /// Esc: 대화상자 닫기 (확인 대화상자는 거절로 처리)
    pub fn close_dialog(&mut self) {
        match self.dialog.take() {
            Some(DialogKind::Confirm { .. }) => {
                let _ = self.coordinator.confirm(false);
            }
            Some(DialogKind::Message { .. } | DialogKind::Error { .. }) => {
                self.coordinator.acknowledge();
            }
            Some(DialogKind::Input { .. } | DialogKind::Progress { .. }) | None => {}
        }
    }

    /// 실행 중인 작업 취소 요청 (다음 항목부터 멈춘다)
    pub fn cancel_operation(&mut self) {
        self.coordinator.cancel();
    }

    /// 실행 중이면 진행률 대화상자
    pub fn progress_dialog(&self) -> Option<DialogKind> {
        let OperationStep::Running(mode) = self.coordinator.step() else {
            return None;
        };
        Some(DialogKind::progress(
            mode.verb_ing(),
            self.coordinator.progress().cloned().unwrap_or_default(),
            self.coordinator.is_cancel_requested(),
        ))
    }

    /// 상태바용: 붙여넣기 대기 요약
    pub fn pending_status(&self) -> Option<String> {
        let pending = self.session.selection.pending();
        if pending.is_empty() {
            return None;
        }
        let verb = match self.session.selection.pending_mode() {
            TransferMode::Move => "move",
            TransferMode::Extract => "extract",
            _ => "copy",
        };
        Some(format!("{} to {}", pending.len(), verb))
    }
}

/// 작업 결과 대화상자
fn summary_dialog(summary: &TransferSummary) -> DialogKind {
    let mut lines = vec![summary.headline()];
    if summary.skipped > 0 {
        lines.push(format!("{} skipped", summary.skipped));
    }
    for error in summary.errors.iter().take(MAX_REPORTED_ERRORS) {
        lines.push(error.clone());
    }
    if summary.errors.len() > MAX_REPORTED_ERRORS {
        lines.push(format!(
            "... and {} more",
            summary.errors.len() - MAX_REPORTED_ERRORS
        ));
    }

    let title = summary.mode.name();
    match summary.status {
        TransferStatus::Succeeded | TransferStatus::Cancelled => {
            DialogKind::message(title, lines.join("\n"))
        }
        TransferStatus::SucceededWithErrors | TransferStatus::Failed => {
            DialogKind::error(title, lines.join("\n"))
        }
    }
}
