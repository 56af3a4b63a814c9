// Layout - 목록 패널 + 상태바 + 커맨드바
//
// 너무 작은 터미널에서는 경고만 표시한다.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const MIN_WIDTH: u16 = 30;
pub const MIN_HEIGHT: u16 = 8;

/// 화면 영역
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutAreas {
    pub panel: Rect,
    pub status_bar: Rect,
    pub command_bar: Rect,
}

impl LayoutAreas {
    /// 터미널 크기로부터 영역 계산. 너무 작으면 `None`.
    pub fn compute(size: Rect) -> Option<Self> {
        if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
            return None;
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(size);
        Some(Self {
            panel: chunks[0],
            status_bar: chunks[1],
            command_bar: chunks[2],
        })
    }

    /// 패널 안에 보이는 행 수 (테두리 제외)
    pub fn panel_rows(&self) -> usize {
        self.panel.height.saturating_sub(2) as usize
    }
}

/// 너무 작을 때 보여줄 문구
pub fn too_small_message(size: Rect) -> String {
    format!(
        "Terminal too small: {}x{} (need {}x{})",
        size.width, size.height, MIN_WIDTH, MIN_HEIGHT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_areas() {
        let areas = LayoutAreas::compute(Rect::new(0, 0, 80, 24)).unwrap();
        assert_eq!(areas.panel.height, 22);
        assert_eq!(areas.panel_rows(), 20);
        assert_eq!(areas.status_bar.y, 22);
        assert_eq!(areas.command_bar.y, 23);
    }

    #[test]
    fn test_too_small() {
        assert!(LayoutAreas::compute(Rect::new(0, 0, 20, 24)).is_none());
        assert!(LayoutAreas::compute(Rect::new(0, 0, 80, 5)).is_none());
    }
}
