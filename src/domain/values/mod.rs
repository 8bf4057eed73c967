pub mod config;
pub mod record_id;
pub mod similarity;
