//! Pure formatting of the daily wellness snapshot: the status line, the
//! emoji bucket for the current body battery level, and the push-alert
//! message with its once-per-day state.

mod alert;
mod emoji;
mod status;

pub use alert::{
    AlertState, HIGH_STRESS_THRESHOLD, LOW_BODY_BATTERY_THRESHOLD, MEDIUM_STRESS_THRESHOLD,
};
pub use emoji::EmojiPalette;
pub use status::format_status;
