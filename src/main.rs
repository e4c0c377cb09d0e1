use showfeed::config::env_loader::{load_config, load_user_position};
use showfeed::config::model::{Config, DisplayConfig};
use showfeed::events_portal::api::EventsPortalAPI;
use showfeed::feed::pipeline::EventFeed;
use showfeed::feed::render::{FeedView, Renderer};
use showfeed::location::resolver::{FixedPosition, GeolocationProvider, NoGeolocation};
use showfeed::tracing::setup_tracing;
use tracing::{debug, info, warn};

/// Writes each render pass to the log.
struct LogRenderer {
    style: DisplayConfig,
}

impl Renderer for LogRenderer {
    fn render(&mut self, feed: &FeedView) {
        info!("Rendering {} events ({})", feed.events.len(), self.style);

        feed.events.iter().for_each(|card| {
            info!(
                "{}{} | {} | {} | {} ticket buttons",
                card.date_label,
                if card.near_you { " [NEAR YOU]" } else { "" },
                card.event.display_location(),
                card.event.display_venue,
                card.actions.len()
            );

            card.actions.iter().for_each(|action| match action.external_link() {
                Some(link) => debug!(
                    "'{}' -> {} (target={}, rel={})",
                    action.button_text, link.href, link.target, link.rel
                ),
                None => debug!("'{}' -> {:?} form", action.button_text, action.action),
            });
        });
    }
}

#[tokio::main]
async fn main() {
    let _loki = setup_tracing().await;

    let config = load_config();
    let api = EventsPortalAPI::new(&config);

    match load_user_position() {
        Some(position) => run(config, api, FixedPosition(position)).await,
        None => run(config, api, NoGeolocation).await,
    }
}

async fn run<P: GeolocationProvider>(config: Config, api: EventsPortalAPI, provider: P) {
    let renderer = LogRenderer {
        style: config.display.clone(),
    };
    let mut feed = EventFeed::new(config, api, provider, renderer);
    let mut ready = feed.subscribe();

    feed.load().await;

    match ready.try_recv() {
        Ok(ready) => match ready.user_location {
            Some(_) => {
                let nearby = ready
                    .events
                    .iter()
                    .filter(|event| {
                        event
                            .distance
                            .is_some_and(|d| d <= feed.config().near_you_threshold)
                    })
                    .count();

                info!("Feed ready with {} events, {} nearby", ready.events.len(), nearby)
            }
            None => info!("Feed ready with {} events, no location", ready.events.len()),
        },
        Err(err) => warn!("Feed was not announced: {}", err),
    }
}
