//! Discovery DTOs

use serde::{Deserialize, Serialize};

/// Response of the same-origin `GET /whoami`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhoAmI {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}
