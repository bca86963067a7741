pub mod element;
pub mod shape;
pub mod surface;
pub mod transition;
