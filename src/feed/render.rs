use crate::events_portal::model::Event;
use crate::feed::distance::{classify, Proximity};
use crate::feed::tickets::{event_date_label, purchase_actions, PurchaseAction};
use crate::location::model::UserLocation;

/// One event card with everything the markup needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEvent {
    pub event: Event,
    pub date_label: String,
    pub near_you: bool,
    pub actions: Vec<PurchaseAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedView {
    pub events: Vec<PreparedEvent>,
    pub user_location: Option<UserLocation>,
}

/// Owns the markup; each call replaces whatever was rendered before.
pub trait Renderer {
    fn render(&mut self, feed: &FeedView);
}

pub fn prepare_feed(
    events: &[Event],
    user_location: Option<&UserLocation>,
    near_you_threshold: f64,
) -> FeedView {
    let located = user_location.and_then(|location| location.coordinates()).is_some();

    FeedView {
        events: events
            .iter()
            .map(|event| PreparedEvent {
                event: event.clone(),
                date_label: event_date_label(event),
                near_you: located
                    && event.distance.is_some_and(|distance| {
                        classify(distance, near_you_threshold) == Proximity::Near
                    }),
                actions: purchase_actions(event),
            })
            .collect(),
        user_location: user_location.copied(),
    }
}
