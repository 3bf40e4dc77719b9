//! Device display-name lookup

use std::collections::HashMap;

/// Name shown for devices the directory does not know
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown";

/// Resolves a device id to a human-readable name
pub trait DeviceDirectory: Send + Sync {
    /// Display name for `device_id`, if known
    fn device_name(&self, device_id: &str) -> Option<String>;
}

/// Directory backed by a fixed map, usually loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceDirectory {
    names: HashMap<String, String>,
}

impl StaticDeviceDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a device name
    pub fn with_device(mut self, device_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(device_id.into(), name.into());
        self
    }

    /// Parse `id=Name,id2=Other Name`. Malformed or empty entries are skipped.
    pub fn parse(pairs: &str) -> Self {
        let names = pairs
            .split(',')
            .filter_map(|entry| {
                let (id, name) = entry.split_once('=')?;
                let (id, name) = (id.trim(), name.trim());
                if id.is_empty() || name.is_empty() {
                    tracing::warn!("Ignoring malformed device name entry: '{}'", entry);
                    return None;
                }
                Some((id.to_string(), name.to_string()))
            })
            .collect();
        Self { names }
    }

    /// Number of known devices
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no devices are known
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl DeviceDirectory for StaticDeviceDirectory {
    fn device_name(&self, device_id: &str) -> Option<String> {
        self.names.get(device_id).cloned()
    }
}
