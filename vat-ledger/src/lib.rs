pub mod app;
pub mod cli;
pub mod form;
pub mod logging;
pub mod report;
pub mod settings;
