use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Metadata, DEFAULT_DATA_HEADER, DEFAULT_DATA_QUERY};

/// Initial page state embedded in every rendered document
///
/// The client router hydrates from this without a data request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapPayload {
    pub pathname: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub props: Value,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub not_found: bool,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub theme: Option<String>,
}

/// One client-side route: the canonical pattern plus its code chunk
///
/// The client recompiles `pattern` with the shared compiler rather than
/// receiving a regular expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRouteEntry {
    pub pattern: String,
    pub chunk: String,
}

/// Route table handed to the client router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterData {
    /// Routes in server matching order
    pub routes: Vec<ClientRouteEntry>,
    #[serde(default)]
    pub not_found_chunk: Option<String>,
    #[serde(default)]
    pub error_chunk: Option<String>,
    #[serde(default = "default_data_query")]
    pub data_query: String,
    #[serde(default = "default_data_header")]
    pub data_header: String,
}

fn default_data_query() -> String {
    DEFAULT_DATA_QUERY.to_string()
}

fn default_data_header() -> String {
    DEFAULT_DATA_HEADER.to_string()
}

impl Default for RouterData {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            not_found_chunk: None,
            error_chunk: None,
            data_query: default_data_query(),
            data_header: default_data_header(),
        }
    }
}
