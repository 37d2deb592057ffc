pub mod config;
pub mod exec_info;
pub mod outcome;
pub mod record;
