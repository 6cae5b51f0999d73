//! Incremental window over a filtered view

use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Cursor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorState {
    /// Nothing shown yet
    Empty,
    /// More pages can be pulled
    LoadingMore,
    /// Every item of the view is shown
    Exhausted,
}

/// Grows a prefix of a fixed view one page at a time.
///
/// The view is captured on [`reset`](Self::reset) and re-sliced by index, so
/// items are never skipped or repeated until the next reset.
#[derive(Debug, Clone)]
pub struct PaginationCursor {
    page_size: usize,
    page_index: usize,
    view: Vec<Transaction>,
    shown: Vec<Transaction>,
    state: CursorState,
}

impl PaginationCursor {
    /// A zero page size is treated as one
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page_index: 0,
            view: Vec::new(),
            shown: Vec::new(),
            state: CursorState::Empty,
        }
    }

    /// Start over on `view` and pull the first page
    pub fn reset(&mut self, view: Vec<Transaction>) {
        self.view = view;
        self.shown.clear();
        self.page_index = 0;
        self.state = CursorState::Empty;
        self.load_next();
    }

    /// Append the next page; a no-op once exhausted
    pub fn load_next(&mut self) -> &[Transaction] {
        if self.state == CursorState::Exhausted {
            return &[];
        }

        let start = self.page_index * self.page_size;
        let end = start + self.page_size;
        let before = self.shown.len();

        if start < self.view.len() {
            let stop = end.min(self.view.len());
            self.shown.extend_from_slice(&self.view[start..stop]);
        }
        self.page_index += 1;

        self.state = if end >= self.view.len() {
            CursorState::Exhausted
        } else {
            CursorState::LoadingMore
        };

        &self.shown[before..]
    }

    pub fn shown(&self) -> &[Transaction] {
        &self.shown
    }

    /// Length of the captured view
    pub fn total(&self) -> usize {
        self.view.len()
    }

    pub fn remaining(&self) -> usize {
        self.view.len() - self.shown.len()
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
