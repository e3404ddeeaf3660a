use std::sync::Arc;

use sea_orm::DatabaseConnection;
use wp::WpClient;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub wp: Arc<WpClient>,
    pub config: AppConfig,
}
