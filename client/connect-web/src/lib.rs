//! connect two
//!
//! Map client for students living abroad. Users pin the country they came
//! from and the one they live in now, publish a story along that route, and
//! connect with language mentors through comments.
//!
//! # Modules
//!
//! - `config`: environment configuration
//! - `home`: the home screen controller tying everything together
//! - `session`: sign-in state
//! - `stores`: posts and comments
//! - `mentor`: mentor matching
//! - `notify`: transient notifications
//! - `views`: view-models rendered by the terminal front-end

pub mod commands;
pub mod config;
pub mod home;
pub mod mentor;
pub mod notify;
pub mod sequence;
pub mod session;
pub mod stores;
pub mod surface;
pub mod views;

pub use config::Config;
pub use home::{ClickReport, HomeController, HomeOptions, MapClick, PlacementReport};
pub use notify::{NotificationCenter, Toast, ToastVariant};
