//! In-memory cache of the last completed dashboard load.
//!
//! Each load takes a ticket with a generation number. Only the completion
//! whose ticket matches the latest generation is stored; a slower, older
//! load finishing afterwards is dropped instead of overwriting newer data.

use std::sync::Arc;

use crate::analytics::DashboardSummary;
use crate::dashboard::DashboardData;

/// A completed load with its derived summary.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDashboard {
    pub generation: u64,
    pub data: DashboardData,
    pub summary: DashboardSummary,
}

impl LoadedDashboard {
    pub fn module_id(&self) -> u32 {
        self.data.module_id
    }
}

/// Handle for one in-progress load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub module_id: u32,
}

#[derive(Debug, Default)]
pub struct ViewCache {
    latest: u64,
    current: Option<Arc<LoadedDashboard>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load; supersedes every earlier ticket.
    pub fn begin(&mut self, module_id: u32) -> LoadTicket {
        self.latest += 1;
        LoadTicket { generation: self.latest, module_id }
    }

    /// Store a finished load if its ticket is still the latest.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        data: DashboardData,
        summary: DashboardSummary,
    ) -> bool {
        if ticket.generation != self.latest {
            return false;
        }
        self.current = Some(Arc::new(LoadedDashboard {
            generation: ticket.generation,
            data,
            summary,
        }));
        true
    }

    pub fn current(&self) -> Option<&Arc<LoadedDashboard>> {
        self.current.as_ref()
    }

    /// Cached load for `module_id`, if that is what is held.
    pub fn for_module(&self, module_id: u32) -> Option<Arc<LoadedDashboard>> {
        self.current
            .as_ref()
            .filter(|loaded| loaded.module_id() == module_id)
            .cloned()
    }

    /// Drop cached data and invalidate every outstanding ticket.
    pub fn clear(&mut self) {
        self.latest += 1;
        self.current = None;
    }
}
