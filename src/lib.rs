pub mod app;
pub mod cli;
pub mod config;
pub mod export;
pub mod fetch;
pub mod format;
pub mod html;
pub mod logging;
pub mod mask;
pub mod notify;
pub mod page;
pub mod service;
pub mod sort;
pub mod table;
pub mod validate;

#[cfg(test)]
mod tests;
