pub mod app;
pub mod config;
pub mod coordinator;
pub mod data;
pub mod error;
pub mod events;
pub mod panels;
pub mod processing;
pub mod render;
pub mod state;
pub mod ui;

pub use config::DashboardConfig;
pub use coordinator::{DashboardCoordinator, PanelSurfaces};
pub use error::{DashboardError, SelectionError};
pub use events::DashboardEvent;
