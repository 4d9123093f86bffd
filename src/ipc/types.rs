use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::store::Dataset;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// `data` is the whole in-memory dataset, loaded when a workspace is
/// selected and written back through the persistence gateway after every
/// mutation.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub data: Dataset,
}
