use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One captured receiver line with its capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    pub timestamp: DateTime<Utc>,
    pub value: String,
}
