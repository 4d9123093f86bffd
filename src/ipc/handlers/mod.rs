pub mod attendance;
pub mod core;
pub mod reports;
pub mod students;

use rusqlite::Connection;

use crate::ipc::error::err;
use crate::ipc::types::AppState;
use crate::store::Dataset;

pub(crate) struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        HandlerErr {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

pub(crate) fn get_required_str(
    params: &serde_json::Value,
    key: &str,
) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

pub(crate) fn get_required_bool(
    params: &serde_json::Value,
    key: &str,
) -> Result<bool, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

/// Splits the state into the open storage connection and the live dataset.
/// Every mutating handler needs both: the dataset to change, the connection
/// to persist through.
pub(crate) fn open_workspace(
    state: &mut AppState,
) -> Result<(&Connection, &mut Dataset), HandlerErr> {
    let db = state
        .db
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))?;
    Ok((db, &mut state.data))
}
