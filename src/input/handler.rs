use crate::{
    core::geo::LatLng,
    input::events::MapEvent,
    prelude::{HashMap, VecDeque},
    routing::service::RouteResult,
};
use std::sync::Arc;

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Queues widget events and hands them to registered listeners
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event type
    listeners: HashMap<String, Vec<EventCallback>>,
    /// Event queue for processing
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    pub fn on_map_ready<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on("mapready", move |_| callback());
    }

    pub fn on_route_calculated<F>(&mut self, callback: F)
    where
        F: Fn(&Arc<RouteResult>) + Send + Sync + 'static,
    {
        self.on("routecalculated", move |event| {
            if let MapEvent::RouteCalculated(route) = event {
                callback(route);
            }
        });
    }

    pub fn on_location_selected<F>(&mut self, callback: F)
    where
        F: Fn(LatLng, &str) + Send + Sync + 'static,
    {
        self.on("locationselected", move |event| {
            if let MapEvent::LocationSelected { point, name } = event {
                callback(*point, name);
            }
        });
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Process all queued events
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.event_type()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    /// Clear all events from the queue
    pub fn clear_events(&mut self) {
        self.event_queue.clear();
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners.get(event_type).map_or(0, Vec::len)
    }
}
