use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// WGS-84 equatorial radius, as used by web-mercator maps
const EARTH_RADIUS: f64 = 6378137.0;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate without validation
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate, rejecting out-of-range or non-finite values
    pub fn checked(lat: f64, lng: f64) -> Result<Self> {
        let point = Self::new(lat, lng);
        point.validate()?;
        Ok(point)
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Same as [`LatLng::is_valid`] but reported as an error
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(MapError::InvalidCoordinates(format!(
                "({}, {}) is outside lat [-90, 90] / lng [-180, 180]",
                self.lat, self.lng
            )))
        }
    }

    /// Calculates the distance to another LatLng using the Haversine formula
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<LatLng> for geo_types::Point<f64> {
    fn from(point: LatLng) -> Self {
        geo_types::Point::new(point.lng, point.lat)
    }
}

impl From<geo_types::Point<f64>> for LatLng {
    fn from(point: geo_types::Point<f64>) -> Self {
        LatLng::new(point.y(), point.x())
    }
}

/// A coordinate with a human readable name, as returned by search or
/// supplied by the host for destinations and the user's position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    pub point: LatLng,
    pub name: String,
}

impl NamedLocation {
    pub fn new(name: impl Into<String>, point: LatLng) -> Self {
        Self {
            point,
            name: name.into(),
        }
    }

    pub fn checked(name: impl Into<String>, lat: f64, lng: f64) -> Result<Self> {
        Ok(Self::new(name, LatLng::checked(lat, lng)?))
    }

    pub fn lat(&self) -> f64 {
        self.point.lat
    }

    pub fn lng(&self) -> f64 {
        self.point.lng
    }
}

/// Represents a bounding box of geographical coordinates.
///
/// A box that crosses the antimeridian has `south_west.lng > north_east.lng`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Smallest bounds containing every point, `None` for an empty slice.
    /// Crosses the antimeridian when that is the shorter way round.
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for point in rest {
            bounds.extend(point);
        }

        let mut lngs: Vec<f64> = points.iter().map(|point| point.lng).collect();
        lngs.sort_by(f64::total_cmp);
        // the widest empty stretch of longitude is left outside the box
        let mut widest = 360.0 - (bounds.north_east.lng - bounds.south_west.lng);
        let mut west_east = None;
        for pair in lngs.windows(2) {
            let gap = pair[1] - pair[0];
            if gap > widest {
                widest = gap;
                west_east = Some((pair[1], pair[0]));
            }
        }
        if let Some((west, east)) = west_east {
            bounds.south_west.lng = west;
            bounds.north_east.lng = east;
        }
        Some(bounds)
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.south_west.lng > self.north_east.lng
    }

    /// Longitude covered, in degrees
    pub fn lng_span(&self) -> f64 {
        if self.crosses_antimeridian() {
            self.north_east.lng + 360.0 - self.south_west.lng
        } else {
            self.north_east.lng - self.south_west.lng
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        let lng_inside = if self.crosses_antimeridian() {
            point.lng >= self.south_west.lng || point.lng <= self.north_east.lng
        } else {
            point.lng >= self.south_west.lng && point.lng <= self.north_east.lng
        };
        point.lat >= self.south_west.lat && point.lat <= self.north_east.lat && lng_inside
    }

    /// Extends the bounds to include a point, without wrapping
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            LatLng::wrap_lng(self.south_west.lng + self.lng_span() / 2.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(40.7128, -74.0060);
        assert_eq!(coord.lat, 40.7128);
        assert_eq!(coord.lng, -74.0060);
        assert!(coord.is_valid());
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        assert!(LatLng::checked(90.0, 180.0).is_ok());
        assert!(matches!(
            LatLng::checked(90.5, 0.0),
            Err(MapError::InvalidCoordinates(_))
        ));
        assert!(LatLng::checked(0.0, -180.1).is_err());
        assert!(LatLng::checked(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_lat_lng_distance() {
        let nyc = LatLng::new(40.7128, -74.0060);
        let la = LatLng::new(34.0522, -118.2437);
        let distance = nyc.distance_to(&la);

        // Distance should be approximately 3944 km
        assert!((distance - 3944000.0).abs() < 10000.0);
    }

    #[test]
    fn test_wrap_lng() {
        assert_eq!(LatLng::wrap_lng(181.0), -179.0);
        assert_eq!(LatLng::wrap_lng(-181.0), 179.0);
        assert_eq!(LatLng::wrap_lng(45.0), 45.0);
    }

    #[test]
    fn test_geo_types_conversion() {
        let dhaka = LatLng::new(23.8103, 90.4125);
        let point: geo_types::Point<f64> = dhaka.into();
        assert_eq!(point.x(), 90.4125);
        assert_eq!(LatLng::from(point), dhaka);
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = LatLngBounds::from_points(&[
            LatLng::new(0.0, 0.0),
            LatLng::new(10.0, -5.0),
            LatLng::new(4.0, 12.0),
        ])
        .unwrap();
        assert_eq!(bounds.south_west, LatLng::new(0.0, -5.0));
        assert_eq!(bounds.north_east, LatLng::new(10.0, 12.0));
        assert!(bounds.contains(&LatLng::new(5.0, 5.0)));
        assert_eq!(bounds.center(), LatLng::new(5.0, 3.5));
        assert!(!bounds.crosses_antimeridian());
        assert!(LatLngBounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_take_short_way_over_antimeridian() {
        // Fiji to Samoa
        let bounds = LatLngBounds::from_points(&[
            LatLng::new(-18.1, 178.4),
            LatLng::new(-16.0, -179.9),
            LatLng::new(-13.8, -171.8),
        ])
        .unwrap();
        assert!(bounds.crosses_antimeridian());
        assert_eq!(bounds.south_west.lng, 178.4);
        assert_eq!(bounds.north_east.lng, -171.8);
        assert!((bounds.lng_span() - 9.8).abs() < 1e-9);
        assert!((bounds.center().lng - (-176.7)).abs() < 1e-9);
        assert!(bounds.contains(&LatLng::new(-15.0, 180.0)));
        assert!(!bounds.contains(&LatLng::new(-15.0, 0.0)));
    }
}
