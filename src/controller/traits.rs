//! Collaborators the pipeline controller talks to

use crate::types::Record;
use std::collections::HashMap;
use std::sync::RwLock;

/// Preference key for the minimum magnitude filter
pub const PREF_MIN_MAGNITUDE: &str = "min_magnitude";

/// Preference key for the sort order
pub const PREF_ORDER_BY: &str = "order_by";

/// Read-only access to user settings
///
/// Values are opaque strings; the pipeline passes them to the server as-is.
pub trait PreferenceStore: Send + Sync {
    /// The stored value for `key`, or `None` if unset
    fn get_string(&self, key: &str) -> Option<String>;
}

/// Reports whether the device currently has network access
pub trait ConnectivityProbe: Send + Sync {
    /// `true` when a request could plausibly succeed
    fn is_connected(&self) -> bool;
}

/// Display layer that receives load results
///
/// Only the controller calls these, always from the task that owns it.
pub trait Presenter: Send {
    /// Replace the visible list, in order
    fn set_list(&mut self, records: &[Record]);

    /// Text shown when the list is empty
    fn set_empty_message(&mut self, message: &str);

    /// Show or hide the loading indicator
    fn set_loading_visible(&mut self, visible: bool);
}

/// [`PreferenceStore`] held in memory
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryPreferences {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`
    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.into());
    }

    /// Remove `key`, falling back to the configured default on the next read
    pub fn remove(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}
