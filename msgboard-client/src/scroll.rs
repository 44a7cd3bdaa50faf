//! Infinite-scroll trigger.

/// How close to the bottom, in CSS pixels, counts as the bottom
pub const SCROLL_SLACK_PX: f64 = 2.0;

/// Whether the viewport reaches the end of the document
pub fn is_at_bottom(scroll_position: f64, viewport_height: f64, document_height: f64) -> bool {
    scroll_position + viewport_height >= document_height - SCROLL_SLACK_PX
}
