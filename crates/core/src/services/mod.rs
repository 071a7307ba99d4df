pub mod change_log;
pub mod position_service;
