pub mod card;
pub mod clipboard;
pub mod config;
pub mod content;
pub mod content_client;
pub mod content_feed;
pub mod drawer;
pub mod fake_content;
pub mod flash;
pub mod phase;
pub mod run_sheet;
pub mod state;
pub mod taxonomy;
pub mod timeline;
