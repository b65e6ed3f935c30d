//! Ordered list of intermediate stops between start and destination.
//!
//! Waypoints live in a keyed map with a separate order vector, so a
//! waypoint keeps its identity (and its marker) however often the list is
//! reordered.

use crate::core::geo::{LatLng, NamedLocation};
use crate::prelude::HashMap;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable waypoint identity; never reused within one list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaypointId(pub u64);

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wp-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub location: NamedLocation,
    /// Position in the ordered sequence
    pub index: usize,
}

impl Waypoint {
    pub fn point(&self) -> LatLng {
        self.location.point
    }
}

/// Change notification consumed by the directions orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum WaypointChange {
    Added(WaypointId),
    Removed(WaypointId),
    Reordered { id: WaypointId, from: usize, to: usize },
    Cleared { removed: usize },
}

#[derive(Debug, Default)]
pub struct WaypointList {
    entries: HashMap<WaypointId, NamedLocation>,
    order: Vec<WaypointId>,
    next_id: u64,
    revision: u64,
    changes: Vec<WaypointChange>,
}

impl WaypointList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stop at the end of the list
    pub fn add(&mut self, location: NamedLocation) -> Result<Waypoint> {
        location.point.validate()?;

        self.next_id += 1;
        let id = WaypointId(self.next_id);
        self.entries.insert(id, location.clone());
        self.order.push(id);
        self.revision += 1;
        self.changes.push(WaypointChange::Added(id));

        log::debug!("waypoint {} added at {}", id, self.order.len() - 1);
        Ok(Waypoint {
            id,
            location,
            index: self.order.len() - 1,
        })
    }

    /// Delete by identity; later waypoints shift down by one
    pub fn remove(&mut self, id: WaypointId) -> Result<Waypoint> {
        let index = self.position(id)?;
        self.order.remove(index);
        let location = self
            .entries
            .remove(&id)
            .ok_or(MapError::UnknownWaypoint(id))?;
        self.revision += 1;
        self.changes.push(WaypointChange::Removed(id));

        log::debug!("waypoint {} removed from {}", id, index);
        Ok(Waypoint {
            id,
            location,
            index,
        })
    }

    /// Move one waypoint; the others keep their relative order.
    /// `new_index` past the end moves the waypoint last.
    pub fn reorder(&mut self, id: WaypointId, new_index: usize) -> Result<()> {
        let from = self.position(id)?;
        let to = new_index.min(self.order.len() - 1);

        if from != to {
            self.order.remove(from);
            self.order.insert(to, id);
            self.revision += 1;
            self.changes.push(WaypointChange::Reordered { id, from, to });
        }
        Ok(())
    }

    /// Empty the list; reports whether anything was removed
    pub fn clear(&mut self) -> bool {
        let removed = self.order.len();
        self.order.clear();
        self.entries.clear();
        if removed > 0 {
            self.revision += 1;
            self.changes.push(WaypointChange::Cleared { removed });
        }
        removed > 0
    }

    /// Take the change notifications recorded since the last call
    pub fn drain_changes(&mut self) -> Vec<WaypointChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn get(&self, id: WaypointId) -> Option<Waypoint> {
        let index = self.order.iter().position(|candidate| *candidate == id)?;
        self.entries.get(&id).map(|location| Waypoint {
            id,
            location: location.clone(),
            index,
        })
    }

    /// Waypoints in route order
    pub fn iter(&self) -> impl Iterator<Item = Waypoint> + '_ {
        self.order.iter().enumerate().filter_map(|(index, id)| {
            self.entries.get(id).map(|location| Waypoint {
                id: *id,
                location: location.clone(),
                index,
            })
        })
    }

    pub fn ids(&self) -> &[WaypointId] {
        &self.order
    }

    /// Coordinates in route order
    pub fn points(&self) -> Vec<LatLng> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|location| location.point))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bumped by every mutation that changed the list
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn position(&self, id: WaypointId) -> Result<usize> {
        self.order
            .iter()
            .position(|candidate| *candidate == id)
            .ok_or(MapError::UnknownWaypoint(id))
    }
}
