//! Configuration for the sync engine.

use msgsync_types::ClientId;

/// Default number of events requested per catch-up page.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Default capacity of the local event bus.
///
/// Kept a power of two so the configured value equals the bus's effective
/// capacity (the bus normalizes other values up).
pub const DEFAULT_LOCAL_BUS_CAPACITY: usize = 64;

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Identifies this client instance to the catch-up endpoint.
    pub client_id: ClientId,
    /// Events requested per catch-up page.
    pub page_size: usize,
    /// Capacity of the local event bus buffer.
    pub local_bus_capacity: usize,
}

impl SyncConfig {
    /// Create a configuration with defaults for the given client.
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            page_size: DEFAULT_PAGE_SIZE,
            local_bus_capacity: DEFAULT_LOCAL_BUS_CAPACITY,
        }
    }

    /// Set the catch-up page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the local event bus capacity.
    pub fn with_local_bus_capacity(mut self, capacity: usize) -> Self {
        self.local_bus_capacity = capacity;
        self
    }
}
