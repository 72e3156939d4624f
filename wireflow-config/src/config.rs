use crate::capacity::Capacity;
use serde::{Deserialize, Serialize};

/// Graph-wide wiring defaults.
///
/// `buffer_size` is the channel capacity used by every connection that does
/// not request an explicit one. It is read once per connect call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Default channel capacity.
    #[serde(default)]
    pub buffer_size: Capacity,
}
