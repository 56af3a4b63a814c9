//! 작업 단계 관리: Idle → Confirming → Running → Finished → Idle
//!
//! Idle이 아닐 때 들어온 요청은 `Busy`로 거절한다.

use crate::app::session::ShellSession;
use crate::app::transfer::{TransferEngine, WorkerSlot};
use crate::models::operation::{
    TransferMode, TransferProgress, TransferSnapshot, TransferStatus, TransferSummary,
};
use crate::utils::error::{Result, ShellError};
use crate::utils::formatter::pluralize;
use std::path::Path;

/// 현재 단계
#[derive(Debug)]
pub enum OperationStep {
    Idle,
    /// 사용자 확인 대기 (스냅샷은 요청 시점에 고정)
    Confirming(TransferSnapshot),
    Running(TransferMode),
    /// 결과 표시 중 (확인하면 Idle)
    Finished(TransferSummary),
}

pub struct OperationCoordinator {
    step: OperationStep,
    slot: WorkerSlot,
}

impl OperationCoordinator {
    pub fn new(engine: TransferEngine) -> Self {
        Self {
            step: OperationStep::Idle,
            slot: WorkerSlot::new(engine),
        }
    }

    pub fn step(&self) -> &OperationStep {
        &self.step
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.step, OperationStep::Idle)
    }

    pub fn progress(&self) -> Option<&TransferProgress> {
        self.slot.progress()
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.slot.is_cancel_requested()
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(ShellError::Busy)
        }
    }

    /// 붙여넣기. 복사/추출은 바로 시작하고, 이동은 확인을 받는다.
    pub fn request_paste(&mut self, session: &mut ShellSession) -> Result<()> {
        self.ensure_idle()?;
        let snapshot = session.paste_snapshot()?;
        if snapshot.mode == TransferMode::Move {
            self.step = OperationStep::Confirming(snapshot);
            Ok(())
        } else {
            self.start(snapshot)
        }
    }

    pub fn request_delete(&mut self, session: &mut ShellSession) -> Result<()> {
        self.ensure_idle()?;
        let snapshot = session.delete_snapshot()?;
        self.step = OperationStep::Confirming(snapshot);
        Ok(())
    }

    pub fn request_install(&mut self, session: &ShellSession, package: &Path) -> Result<()> {
        self.ensure_idle()?;
        let snapshot = session.install_snapshot(package)?;
        self.step = OperationStep::Confirming(snapshot);
        Ok(())
    }

    /// 확인 대화상자 응답. Confirming이 아니면 무시한다.
    pub fn confirm(&mut self, accepted: bool) -> Result<()> {
        let step = std::mem::replace(&mut self.step, OperationStep::Idle);
        let OperationStep::Confirming(snapshot) = step else {
            self.step = step;
            return Ok(());
        };
        if accepted {
            self.start(snapshot)
        } else {
            tracing::debug!(mode = snapshot.mode.name(), "operation declined");
            Ok(())
        }
    }

    fn start(&mut self, snapshot: TransferSnapshot) -> Result<()> {
        let mode = snapshot.mode;
        self.slot.submit(snapshot)?;
        self.step = OperationStep::Running(mode);
        Ok(())
    }

    pub fn cancel(&mut self) {
        if matches!(self.step, OperationStep::Running(_)) {
            tracing::info!("cancel requested");
            self.slot.cancel();
        }
    }

    /// 매 프레임 호출. 작업이 끝나면 목록을 새로 고치고 선택 목록을 대조한다.
    ///
    /// 이동이 완전히 성공했을 때만 붙여넣기 대기 목록을 비운다.
    pub fn poll(&mut self, session: &mut ShellSession) -> bool {
        if !matches!(self.step, OperationStep::Running(_)) {
            return false;
        }
        let Some(summary) = self.slot.poll() else {
            return false;
        };
        self.finish(session, summary);
        true
    }

    /// 실행 중인 작업이 끝날 때까지 기다렸다가 마무리한다.
    pub fn wait(&mut self, session: &mut ShellSession) {
        if !matches!(self.step, OperationStep::Running(_)) {
            return;
        }
        if let Some(summary) = self.slot.wait() {
            self.finish(session, summary);
        }
    }

    fn finish(&mut self, session: &mut ShellSession, summary: TransferSummary) {
        if let Err(e) = session.refresh_with_fallback() {
            tracing::warn!(error = %e, "current directory changed during transfer");
        }
        if summary.mode == TransferMode::Move && summary.status == TransferStatus::Succeeded {
            session.selection.clear_pending();
        }
        session.reconcile_selections();
        self.step = OperationStep::Finished(summary);
    }

    /// 결과 대화상자를 닫음
    pub fn acknowledge(&mut self) {
        if matches!(self.step, OperationStep::Finished(_)) {
            self.step = OperationStep::Idle;
        }
    }

    /// 확인 대화상자 문구
    pub fn prompt(&self) -> Option<String> {
        let OperationStep::Confirming(snapshot) = &self.step else {
            return None;
        };
        let target = match snapshot.entries.as_slice() {
            [only] => format!("'{}'", only.name),
            entries => pluralize(entries.len(), "item", "items"),
        };
        Some(match snapshot.mode {
            TransferMode::Move => format!("Move {} here?", target),
            TransferMode::Delete => format!("Delete {}?", target),
            TransferMode::Install => format!("Install {}?", target),
            TransferMode::NormalCopy | TransferMode::Extract => format!("Copy {} here?", target),
        })
    }
}
