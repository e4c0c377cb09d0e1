use crate::events_portal::model::Event;
use crate::feed::filter::sort_chronologically;
use crate::location::model::Coordinates;
use tracing::debug;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers; unbounded when the inputs aren't usable.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let distance = EARTH_RADIUS_KM * c;

    if distance.is_finite() {
        distance
    } else {
        f64::INFINITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    Near,
    Far,
}

/// The threshold itself counts as near.
pub fn classify(distance: f64, threshold_km: f64) -> Proximity {
    if distance <= threshold_km {
        Proximity::Near
    } else {
        Proximity::Far
    }
}

pub fn annotate_distances(events: &mut [Event], origin: Coordinates) {
    for event in events.iter_mut() {
        event.distance = Some(
            event
                .coordinates()
                .map(|coordinates| haversine_km(origin, coordinates))
                .unwrap_or(f64::INFINITY),
        );
    }
}

/// Near events first, then far ones, each tier by ascending start.
pub fn order_by_proximity(events: Vec<Event>, threshold_km: f64) -> Vec<Event> {
    let (mut near, mut far): (Vec<Event>, Vec<Event>) =
        events.into_iter().partition(|event| {
            classify(event.distance.unwrap_or(f64::INFINITY), threshold_km) == Proximity::Near
        });

    debug!("{} near events, {} far events", near.len(), far.len());

    sort_chronologically(&mut near);
    sort_chronologically(&mut far);

    near.append(&mut far);
    near
}
