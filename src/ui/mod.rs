pub mod controls;
pub mod panel_view;
