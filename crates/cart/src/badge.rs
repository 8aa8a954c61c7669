//! Cart badge rendering seam.
//!
//! The synchronizer decides what count the badge should show; how that count
//! becomes pixels is behind [`BadgeRenderer`] so the cart logic can be
//! exercised without any UI attached. [`BadgeView`] carries the display
//! policy: hidden at zero, capped at "99+".

use std::sync::{Arc, PoisonError, RwLock};

/// Counts above this render as `"99+"`.
const BADGE_DISPLAY_CAP: u64 = 99;

/// What the cart badge should currently show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BadgeView {
    /// No items: the indicator is not shown at all.
    #[default]
    Hidden,
    /// The indicator shows this label.
    Visible(String),
}

impl BadgeView {
    /// Compute the badge state for an item count.
    #[must_use]
    pub fn from_count(count: u64) -> Self {
        if count == 0 {
            Self::Hidden
        } else if count > BADGE_DISPLAY_CAP {
            Self::Visible("99+".to_owned())
        } else {
            Self::Visible(count.to_string())
        }
    }

    /// The displayed label, or `None` when hidden.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Hidden => None,
            Self::Visible(label) => Some(label),
        }
    }
}

/// Renders the cart badge.
///
/// Implementations must be idempotent: repeated renders with the same count
/// leave the same visible state without duplicating anything.
pub trait BadgeRenderer: Send + Sync {
    /// Reflect `count` in the badge.
    fn render(&self, count: u64);
}

/// Badge state shared behind a lock for a UI layer to read.
///
/// Nothing is displayed until the first non-zero render, mirroring an
/// indicator that is only mounted once there is something to show.
#[derive(Clone, Default)]
pub struct SharedBadge {
    view: Arc<RwLock<BadgeView>>,
}

impl SharedBadge {
    /// Create a badge in the hidden state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current badge state.
    #[must_use]
    pub fn view(&self) -> BadgeView {
        self.view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BadgeRenderer for SharedBadge {
    fn render(&self, count: u64) {
        let next = BadgeView::from_count(count);
        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);
        if *view != next {
            *view = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_hidden_at_zero() {
        assert_eq!(BadgeView::from_count(0), BadgeView::Hidden);
        assert_eq!(BadgeView::from_count(0).label(), None);
    }

    #[test]
    fn test_badge_shows_exact_count_up_to_cap() {
        assert_eq!(BadgeView::from_count(1).label(), Some("1"));
        assert_eq!(BadgeView::from_count(99).label(), Some("99"));
    }

    #[test]
    fn test_badge_caps_above_ninety_nine() {
        assert_eq!(BadgeView::from_count(100).label(), Some("99+"));
        assert_eq!(BadgeView::from_count(1000).label(), Some("99+"));
    }

    #[test]
    fn test_shared_badge_render_is_idempotent() {
        let badge = SharedBadge::new();
        assert_eq!(badge.view(), BadgeView::Hidden);

        badge.render(3);
        badge.render(3);
        assert_eq!(badge.view().label(), Some("3"));

        badge.render(0);
        assert_eq!(badge.view(), BadgeView::Hidden);
    }
}
