use crate::config::model::Config;
use crate::events_portal::model::Event;
use crate::feed::distance::{annotate_distances, order_by_proximity};
use crate::feed::filter::{chronological_feed, eligible_events};
use crate::feed::render::{prepare_feed, Renderer};
use crate::location::model::UserLocation;
use crate::location::resolver::{GeoResolver, GeolocationProvider};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

const READY_CHANNEL_CAPACITY: usize = 16;

/// Where the raw events come from. Failures must come back as an empty list.
pub trait FeedSource {
    fn fetch_events(&self) -> BoxFuture<'_, Vec<Event>>;
}

/// Sent after each location pass, even when there's no location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedReady {
    pub user_location: Option<UserLocation>,
    /// Only the events still listed; concluded ones are already dropped.
    pub events: Vec<Event>,
}

/// Fetches, filters and orders the feed, rendering it before and after the location is known.
pub struct EventFeed<S, P, R> {
    config: Config,
    source: S,
    resolver: GeoResolver<P>,
    renderer: R,
    ready: broadcast::Sender<FeedReady>,
    clock: fn() -> DateTime<Utc>,
}

impl<S, P, R> EventFeed<S, P, R>
where
    S: FeedSource,
    P: GeolocationProvider,
    R: Renderer,
{
    pub fn new(config: Config, source: S, provider: P, renderer: R) -> Self {
        let (ready, _) = broadcast::channel(READY_CHANNEL_CAPACITY);

        Self {
            config,
            source,
            resolver: GeoResolver::new(provider),
            renderer,
            ready,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedReady> {
        self.ready.subscribe()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The session's location, once resolved.
    pub fn user_location(&self) -> Option<UserLocation> {
        self.resolver.location()
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&mut self) {
        let events = self.source.fetch_events().await;

        info!("Fetched {} events", events.len());

        let chronological = chronological_feed(events.clone(), (self.clock)());

        self.renderer.render(&prepare_feed(
            &chronological,
            None,
            self.config.near_you_threshold,
        ));

        self.locate(events, chronological).await;
    }

    async fn locate(&mut self, events: Vec<Event>, chronological: Vec<Event>) {
        let user_location = match self.resolver.resolve().await {
            Some(location) => location,
            None => match self.resolver.location() {
                Some(location) => {
                    debug!("Reusing the session location");
                    location
                }
                None => {
                    debug!("Location is still being resolved");
                    return;
                }
            },
        };

        let ready = match user_location.coordinates() {
            Some(origin) => {
                let mut annotated = events;
                annotate_distances(&mut annotated, origin);

                let ordered = order_by_proximity(annotated, self.config.near_you_threshold);
                let visible = eligible_events(ordered, (self.clock)());

                self.renderer.render(&prepare_feed(
                    &visible,
                    Some(&user_location),
                    self.config.near_you_threshold,
                ));

                FeedReady {
                    user_location: Some(user_location),
                    events: visible,
                }
            }
            None => {
                info!("No user location, keeping chronological order");

                FeedReady {
                    user_location: None,
                    events: chronological,
                }
            }
        };

        if self.ready.send(ready).is_err() {
            trace!("Nobody listening for the feed");
        }
    }
}
