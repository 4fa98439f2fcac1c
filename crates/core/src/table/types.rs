use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An administrative block on a table.
///
/// A block never evicts existing occupants; it only prevents new
/// unprivileged assignments to the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    pub table_number: u32,
    /// Free text shown to guests (e.g. "VIP", "Reserved").
    pub reason: String,
    pub blocked_at: DateTime<Utc>,
}
