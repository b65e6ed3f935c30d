pub mod nominatim;
pub mod service;
pub mod session;

pub use nominatim::NominatimGeocoder;
pub use service::{GeocodingService, SearchError};
pub use session::{SearchSession, SearchState, SearchStatus, SearchTicket};
