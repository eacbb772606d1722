pub mod dome;
pub mod matrix;
pub mod perez;
pub mod solar;
