pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::WpClient;
pub use config::WpConfig;
pub use error::WpError;
pub use models::{WpEmbedded, WpMedia, WpPost, WpRendered};
