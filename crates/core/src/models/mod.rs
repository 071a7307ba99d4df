pub mod change;
pub mod position;
pub mod settings;
pub mod trade;
