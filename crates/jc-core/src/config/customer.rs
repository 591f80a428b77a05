//! Customer provisioning and worker configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_millis;

/// How customer accounts map onto gateway groups and users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerConfig {
    /// Appended to the username to form the group ID
    pub group_suffix: String,

    /// Appended to the username to form the user ID
    pub user_suffix: String,

    /// Pause between creating the group and creating the user, giving the
    /// console time to register the new group
    #[serde(rename = "settle_delay_ms", with = "duration_millis")]
    pub settle_delay: Duration,
}

impl Default for CustomerConfig {
    fn default() -> Self {
        Self {
            group_suffix: "_group".to_string(),
            user_suffix: "_user".to_string(),
            settle_delay: Duration::from_millis(1000),
        }
    }
}

/// Background command worker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Commands that may wait in the queue before submitters block
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { queue_capacity: 32 }
    }
}
