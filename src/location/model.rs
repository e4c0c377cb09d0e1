use serde::Serialize;

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Outcome of asking the host for the user's position.
///
/// `lat`/`lon` stay `None` when the position is unknown (denied, timed out or unsupported).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocation {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub permission_denied: bool,
}

impl UserLocation {
    pub fn resolved(coordinates: Coordinates) -> Self {
        Self {
            lat: Some(coordinates.latitude),
            lon: Some(coordinates.longitude),
            permission_denied: false,
        }
    }

    pub fn denied() -> Self {
        Self {
            lat: None,
            lon: None,
            permission_denied: true,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        if self.permission_denied {
            return None;
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}
