//! Placement arithmetic for dropdown menus anchored to a trigger element.
//!
//! All coordinates are viewport pixels with the origin at the top-left.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (e.g. a trigger's bounding box).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Below,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropdownPosition {
    pub top: f64,
    pub left: f64,
    pub max_height: f64,
    pub placement: Placement,
}

/// Compute where a menu of `menu` size should be drawn next to `trigger`.
///
/// The menu opens below the trigger unless it does not fit there and there is
/// more room above. `max_height` is the room on the chosen side (never more
/// than the menu itself); `left` keeps the menu inside the viewport with
/// `margin` pixels to spare on both sides.
pub fn compute_dropdown_position(
    trigger: Rect,
    menu: Size,
    viewport: Size,
    gap: f64,
    margin: f64,
) -> DropdownPosition {
    let space_below = (viewport.height - trigger.bottom() - gap - margin).max(0.0);
    let space_above = (trigger.y - gap - margin).max(0.0);

    let placement = if menu.height > space_below && space_above > space_below {
        Placement::Above
    } else {
        Placement::Below
    };

    let (available, top) = match placement {
        Placement::Below => (space_below, trigger.bottom() + gap),
        Placement::Above => {
            let height = menu.height.min(space_above);
            (space_above, trigger.y - gap - height)
        }
    };
    let max_height = menu.height.min(available).max(0.0);

    let right_limit = viewport.width - margin;
    let mut left = trigger.x;
    if left + menu.width > right_limit {
        left = right_limit - menu.width;
    }
    let left = left.max(margin);

    DropdownPosition {
        top,
        left,
        max_height,
        placement,
    }
}
