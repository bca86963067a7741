pub mod filtered_view;
pub mod selection;
pub mod theme;
