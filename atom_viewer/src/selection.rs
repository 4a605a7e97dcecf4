//! Element selection state machine
//!
//! Input handlers turn key presses into [`SelectionIntent`]s. Applying an
//! intent only moves the index; the frame loop calls
//! [`ElementSelection::take_change`] once per frame to find out whether the
//! selection differs from what the previous frame showed.

use winit::keyboard::KeyCode;

/// A discrete selection action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionIntent {
    Next,
    Previous,
}

/// Right/N and Left/P step the selection, once per physical press
pub fn intent_for_key(key: KeyCode, pressed: bool, repeat: bool) -> Option<SelectionIntent> {
    if !pressed || repeat {
        return None;
    }
    match key {
        KeyCode::ArrowRight | KeyCode::KeyN => Some(SelectionIntent::Next),
        KeyCode::ArrowLeft | KeyCode::KeyP => Some(SelectionIntent::Previous),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ElementSelection {
    current: usize,
    observed: usize,
    count: usize,
}

impl ElementSelection {
    /// `count` is clamped to at least one slot
    pub fn new(initial: usize, count: usize) -> Self {
        let count = count.max(1);
        let initial = initial % count;
        Self {
            current: initial,
            observed: initial,
            count,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn apply(&mut self, intent: SelectionIntent) {
        self.current = match intent {
            SelectionIntent::Next => (self.current + 1) % self.count,
            SelectionIntent::Previous => (self.current + self.count - 1) % self.count,
        };
    }

    /// Jump straight to an index, wrapping out-of-range values
    pub fn select(&mut self, index: usize) {
        self.current = index % self.count;
    }

    /// The new index if it changed since the last call
    pub fn take_change(&mut self) -> Option<usize> {
        if self.current == self.observed {
            return None;
        }
        self.observed = self.current;
        Some(self.current)
    }
}
