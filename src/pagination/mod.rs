//! Pagination window
//!
//! Computes which page numbers are shown as controls around the current page.
//! The window is centered on the current page; odd sizes are symmetric and
//! even sizes put the extra page after the current one. Near either end the
//! window shifts inward so it always holds `min(window_size, total_pages)` pages.

use serde::Serialize;

/// Visible page numbers plus boundary flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationWindow {
    /// Contiguous, ascending page numbers within `[1, total_pages]`
    pub visible_pages: Vec<u32>,
    pub is_first_page: bool,
    pub is_last_page: bool,
}

impl PaginationWindow {
    /// Whether a "previous" control should be drawn
    pub fn has_previous(&self) -> bool {
        !self.is_first_page
    }

    /// Whether a "next" control should be drawn
    pub fn has_next(&self) -> bool {
        !self.is_last_page
    }
}

/// Compute the window for `current_page` out of `total_pages`
///
/// Zero `total_pages` or `window_size` are treated as 1, and `current_page`
/// is clamped into range, so the window is never empty.
pub fn compute_window(current_page: u32, total_pages: u32, window_size: u32) -> PaginationWindow {
    let total = total_pages.max(1);
    let current = current_page.clamp(1, total);
    let size = window_size.max(1).min(total);

    let start = current
        .saturating_sub((size - 1) / 2)
        .clamp(1, total - size + 1);

    PaginationWindow {
        visible_pages: (start..=start + (size - 1)).collect(),
        is_first_page: current == 1,
        is_last_page: current == total,
    }
}
