pub mod config;
pub mod error;
pub mod github;
pub mod local_file;
pub mod logging;
pub mod release_client;
pub mod ui;
pub mod updater;
pub mod version;

#[cfg(test)]
pub mod test_helpers;
