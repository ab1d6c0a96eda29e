//! Dataset status dashboard
//!
//! - [`controller`]: view-mode state machine over the loaded feed
//! - [`render`]: renderer trait and the Bootstrap HTML implementation

pub mod controller;
pub mod error;
pub mod render;

pub use controller::{
    DashboardController, DashboardPage, DashboardState, DashboardViewState, NavItem, ViewMode,
};
pub use error::{DashboardError, DashboardResult};
pub use render::{format_time, render_page, HtmlRenderer, Renderer};
