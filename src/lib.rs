pub mod ai_provider;
pub mod alert;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod pipeline;
