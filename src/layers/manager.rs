use crate::layers::marker::{Marker, MarkerKey};
use crate::prelude::{HashMap, HashSet};

/// Changes needed to bring the rendered markers in line with a desired set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerDiff {
    pub added: Vec<Marker>,
    pub updated: Vec<Marker>,
    pub removed: Vec<MarkerKey>,
}

impl MarkerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

/// Markers currently on the map, keyed by identity
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: HashMap<MarkerKey, Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; `None` when an identical marker is already present
    pub fn upsert(&mut self, marker: Marker) -> Option<MarkerChange> {
        match self.markers.get(&marker.key) {
            Some(existing) if *existing == marker => None,
            Some(_) => {
                self.markers.insert(marker.key, marker.clone());
                Some(MarkerChange::Updated(marker))
            }
            None => {
                self.markers.insert(marker.key, marker.clone());
                Some(MarkerChange::Added(marker))
            }
        }
    }

    pub fn remove(&mut self, key: &MarkerKey) -> Option<Marker> {
        self.markers.remove(key)
    }

    pub fn get(&self, key: &MarkerKey) -> Option<&Marker> {
        self.markers.get(key)
    }

    pub fn contains(&self, key: &MarkerKey) -> bool {
        self.markers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers sorted by key so hosts see a stable order
    pub fn sorted(&self) -> Vec<&Marker> {
        let mut markers: Vec<_> = self.markers.values().collect();
        markers.sort_by_key(|marker| marker.key);
        markers
    }

    /// Diff against `desired` without applying it
    pub fn reconcile(&self, desired: &[Marker]) -> MarkerDiff {
        let mut diff = MarkerDiff::default();
        let mut wanted = HashSet::default();

        for marker in desired {
            if !wanted.insert(marker.key) {
                log::warn!("duplicate marker key {} in desired set", marker.key);
                continue;
            }
            match self.markers.get(&marker.key) {
                Some(existing) if existing == marker => {}
                Some(_) => diff.updated.push(marker.clone()),
                None => diff.added.push(marker.clone()),
            }
        }

        diff.removed = self
            .markers
            .keys()
            .filter(|key| !wanted.contains(*key))
            .copied()
            .collect();
        diff.removed.sort();
        diff
    }

    pub fn apply(&mut self, diff: &MarkerDiff) {
        for key in &diff.removed {
            self.markers.remove(key);
        }
        for marker in diff.added.iter().chain(diff.updated.iter()) {
            self.markers.insert(marker.key, marker.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerChange {
    Added(Marker),
    Updated(Marker),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, NamedLocation};
    use crate::waypoints::WaypointId;

    fn destination(lat: f64) -> Marker {
        Marker::destination(&NamedLocation::new("Sajek Valley", LatLng::new(lat, 92.29)))
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut set = MarkerSet::new();
        assert!(matches!(set.upsert(destination(23.38)), Some(MarkerChange::Added(_))));
        assert_eq!(set.upsert(destination(23.38)), None);
        assert!(matches!(set.upsert(destination(23.40)), Some(MarkerChange::Updated(_))));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_reconcile_unchanged_set_is_empty() {
        let mut set = MarkerSet::new();
        let desired = vec![destination(23.38), Marker::user_location(LatLng::new(23.8, 90.4))];
        let diff = set.reconcile(&desired);
        assert_eq!(diff.added.len(), 2);
        set.apply(&diff);

        assert!(set.reconcile(&desired).is_empty());
    }

    #[test]
    fn test_reconcile_reports_each_kind_of_change() {
        let mut set = MarkerSet::new();
        set.upsert(destination(23.38));
        set.upsert(Marker::user_location(LatLng::new(23.8, 90.4)));

        let waypoint = crate::waypoints::Waypoint {
            id: WaypointId(1),
            location: NamedLocation::new("Rangamati", LatLng::new(22.65, 92.17)),
            index: 0,
        };
        let desired = vec![destination(23.5), Marker::waypoint(&waypoint)];
        let diff = set.reconcile(&desired);

        assert_eq!(diff.updated.len(), 1);
        assert_eq!(diff.added[0].key, MarkerKey::Waypoint(WaypointId(1)));
        assert_eq!(diff.removed, vec![MarkerKey::UserLocation]);

        set.apply(&diff);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&MarkerKey::UserLocation));
        assert_eq!(set.get(&MarkerKey::Destination).unwrap().position.lat, 23.5);
    }
}
