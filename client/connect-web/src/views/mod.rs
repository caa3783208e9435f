//! View-models for the terminal front-end
//!
//! Pure functions of store state. Each one implements `Display` so the binary
//! can print it directly.

pub mod compose;
pub mod flags;
pub mod post_sheet;
pub mod region_alert;
pub mod toast;

pub use compose::{ComposeSheet, CountryBadge};
pub use flags::{flag_url, DEFAULT_FLAG_CDN};
pub use post_sheet::{CommentView, PostSheet, SecondTab};
pub use region_alert::RegionAlert;
pub use toast::ToastLine;

/// Title shown in the navigation bar.
pub const APP_TITLE: &str = "connect two";
