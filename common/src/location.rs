use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("malformed coordinate: lat {lat}, lng {lng}")]
    Malformed { lat: f64, lng: f64 },
}

impl GeoLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within |lat| <= 90, |lng| <= 180.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }

    pub fn validate(&self) -> Result<(), LocationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(LocationError::Malformed {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }

    /// Haversine distance in kilometers between two points.
    pub fn distance_km(&self, other: &GeoLocation) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        // Rounding can push `a` just past 1.0 near antipodes.
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Like [`distance_km`](Self::distance_km), but rejects malformed endpoints.
    pub fn checked_distance_km(&self, other: &GeoLocation) -> Result<f64, LocationError> {
        self.validate()?;
        other.validate()?;
        Ok(self.distance_km(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_same_point() {
        let p = GeoLocation::new(23.8103, 90.3563);
        assert_eq!(p.distance_km(&p), 0.0);
    }

    #[test]
    fn test_distance_nyc_to_la() {
        let nyc = GeoLocation::new(40.7128, -74.0060);
        let la = GeoLocation::new(34.0522, -118.2437);
        let dist = nyc.distance_km(&la);
        // NYC to LA is ~3944 km
        assert!((dist - 3944.0).abs() < 50.0);
    }

    #[test]
    fn test_distance_across_dhaka() {
        let mirpur = GeoLocation::new(23.8103, 90.3563);
        let mirpur_14 = GeoLocation::new(23.7808, 90.4125);
        let dhanmondi = GeoLocation::new(23.7461, 90.3742);

        let to_14 = mirpur.distance_km(&mirpur_14);
        let to_dhanmondi = mirpur.distance_km(&dhanmondi);
        assert!((to_14 - 6.6).abs() < 0.5, "got {to_14}");
        assert!((to_dhanmondi - 7.3).abs() < 0.5, "got {to_dhanmondi}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoLocation::new(-33.87, 151.21);
        let b = GeoLocation::new(51.5074, -0.1278);
        assert_eq!(a.distance_km(&b), b.distance_km(&a));
    }

    #[test]
    fn test_antipodes_are_half_circumference() {
        let a = GeoLocation::new(0.0, 0.0);
        let b = GeoLocation::new(0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((a.distance_km(&b) - half).abs() < 1e-6);
    }

    #[test]
    fn test_near_antipodes_stay_finite() {
        let south = GeoLocation::new(-87.5, 0.0);
        let north = GeoLocation::new(87.5, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        let d = south.distance_km(&north);
        assert!(d.is_finite(), "got {d}");
        assert!((d - half).abs() < 1.0);

        for step in -900..=900 {
            let lat = f64::from(step) / 10.0;
            let a = GeoLocation::new(lat, 0.0);
            let b = GeoLocation::new(-lat, 180.0);
            let d = a.distance_km(&b);
            assert!(d.is_finite() && d <= half + 1e-6, "lat {lat}: {d}");
        }
    }

    #[test]
    fn test_validation() {
        assert!(GeoLocation::new(90.0, -180.0).is_valid());
        assert!(!GeoLocation::new(90.5, 0.0).is_valid());
        assert!(!GeoLocation::new(0.0, 181.0).is_valid());
        assert!(!GeoLocation::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoLocation::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_checked_distance_rejects_malformed() {
        let good = GeoLocation::new(23.8, 90.3);
        let bad = GeoLocation::new(f64::NAN, 90.3);
        assert!(matches!(
            good.checked_distance_km(&bad),
            Err(LocationError::Malformed { .. })
        ));
        assert!(good.checked_distance_km(&good).is_ok());
    }
}
