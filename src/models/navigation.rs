/// 커서 위치: 화면 첫 행 인덱스(scroll) + 창 안의 강조 행(rel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub scroll: usize,
    pub rel: usize,
}

impl Cursor {
    pub fn index(&self) -> usize {
        self.scroll + self.rel
    }
}

/// 커서와 디렉토리 깊이 스택
///
/// 하위로 들어갈 때 현재 커서를 push하고, 상위로 나올 때 pop해서 복원한다.
/// 깊이는 항상 스택 길이와 같다.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub cursor: Cursor,
    stack: Vec<Cursor>,
    window: usize,
}

impl NavigationState {
    pub fn new(window: usize) -> Self {
        Self {
            cursor: Cursor::default(),
            stack: Vec::new(),
            window: window.max(1),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn set_window(&mut self, window: usize) {
        self.window = window.max(1);
        if self.cursor.rel >= self.window {
            let index = self.cursor.index();
            self.cursor.rel = self.window - 1;
            self.cursor.scroll = index - self.cursor.rel;
        }
    }

    pub fn descend(&mut self) {
        self.stack.push(self.cursor);
        self.cursor = Cursor::default();
    }

    /// 한 단계 위로. 깊이 0에서는 아무것도 하지 않고 false를 반환한다.
    pub fn ascend(&mut self) -> bool {
        match self.stack.pop() {
            Some(saved) => {
                self.cursor = saved;
                true
            }
            None => false,
        }
    }

    /// 깊이 0으로 돌아가며 깊이 0에서 저장했던 커서를 복원한다.
    pub fn reset_home(&mut self) {
        if let Some(first) = self.stack.first().copied() {
            self.cursor = first;
        }
        self.stack.clear();
    }

    pub fn move_up(&mut self) {
        if self.cursor.rel > 0 {
            self.cursor.rel -= 1;
        } else if self.cursor.scroll > 0 {
            self.cursor.scroll -= 1;
        }
    }

    /// 창의 마지막 행까지는 강조가 내려가고, 그 뒤로는 창이 스크롤된다.
    pub fn move_down(&mut self, len: usize) {
        if self.cursor.index() + 1 >= len {
            return;
        }
        if self.cursor.rel + 1 < self.window {
            self.cursor.rel += 1;
        } else {
            self.cursor.scroll += 1;
        }
    }

    pub fn page_down(&mut self, len: usize) {
        for _ in 0..self.window {
            self.move_down(len);
        }
    }

    pub fn page_up(&mut self) {
        for _ in 0..self.window {
            self.move_up();
        }
    }

    /// 지정 인덱스가 보이도록 커서를 옮긴다.
    pub fn select(&mut self, index: usize) {
        if index >= self.cursor.scroll && index < self.cursor.scroll + self.window {
            self.cursor.rel = index - self.cursor.scroll;
        } else if index < self.cursor.scroll {
            self.cursor = Cursor { scroll: index, rel: 0 };
        } else {
            self.cursor.rel = self.window - 1;
            self.cursor.scroll = index - self.cursor.rel;
        }
    }

    /// 목록 길이에 맞게 커서를 아래쪽에서만 보정한다. (위로는 움직이지 않음)
    pub fn clamp(&mut self, len: usize) {
        while self.cursor.index() >= len {
            if self.cursor.rel > 0 {
                self.cursor.rel -= 1;
            } else if self.cursor.scroll > 0 {
                self.cursor.scroll -= 1;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descend_then_ascend_restores_cursor() {
        let mut nav = NavigationState::new(10);
        nav.cursor = Cursor { scroll: 2, rel: 3 };
        nav.descend();
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.cursor, Cursor::default());

        nav.move_down(5);
        assert!(nav.ascend());
        assert_eq!(nav.cursor, Cursor { scroll: 2, rel: 3 });
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_ascend_at_root_never_goes_negative() {
        let mut nav = NavigationState::new(10);
        assert!(!nav.ascend());
        assert!(!nav.ascend());
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_reset_home_restores_first_saved_cursor() {
        let mut nav = NavigationState::new(10);
        nav.cursor = Cursor { scroll: 0, rel: 4 };
        nav.descend();
        nav.cursor = Cursor { scroll: 0, rel: 1 };
        nav.descend();
        nav.descend();

        nav.reset_home();
        assert_eq!(nav.depth(), 0);
        assert_eq!(nav.cursor, Cursor { scroll: 0, rel: 4 });
    }

    #[test]
    fn test_move_down_scrolls_at_window_edge() {
        let mut nav = NavigationState::new(3);
        for _ in 0..4 {
            nav.move_down(10);
        }
        assert_eq!(nav.cursor, Cursor { scroll: 2, rel: 2 });
        assert_eq!(nav.cursor.index(), 4);

        nav.move_down(5);
        assert_eq!(nav.cursor.index(), 4);

        for _ in 0..3 {
            nav.move_up();
        }
        assert_eq!(nav.cursor, Cursor { scroll: 1, rel: 0 });
    }

    #[test]
    fn test_clamp_moves_down_only() {
        let mut nav = NavigationState::new(5);
        nav.cursor = Cursor { scroll: 3, rel: 4 };
        nav.clamp(5);
        assert!(nav.cursor.index() < 5);
        assert_eq!(nav.cursor, Cursor { scroll: 3, rel: 1 });

        nav.clamp(10);
        assert_eq!(nav.cursor, Cursor { scroll: 3, rel: 1 });

        nav.clamp(0);
        assert_eq!(nav.cursor, Cursor::default());
    }

    #[test]
    fn test_select_keeps_index_visible() {
        let mut nav = NavigationState::new(4);
        nav.select(9);
        assert_eq!(nav.cursor.index(), 9);
        assert_eq!(nav.cursor.rel, 3);
        nav.select(1);
        assert_eq!(nav.cursor, Cursor { scroll: 1, rel: 0 });
    }
}
