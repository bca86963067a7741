pub mod join;
pub mod layout;
pub mod nearest;
