use super::{dto::FeedResponse, model::Event};
use crate::config::model::Config;
use crate::feed::pipeline::FeedSource;
use futures::future::BoxFuture;
use lazy_static::lazy_static;
use reqwest::header::ACCEPT;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use tracing::{error, info};

const MAX_RETRIES: u32 = 3;

lazy_static! {
    static ref REST_CLIENT: ClientWithMiddleware = build_client(MAX_RETRIES);
}

fn build_client(max_retries: u32) -> ClientWithMiddleware {
    ClientBuilder::new(Client::new())
        .with(RetryTransientMiddleware::new_with_policy(
            ExponentialBackoff::builder().build_with_max_retries(max_retries),
        ))
        .build()
}

pub struct EventsPortalAPI {
    client: ClientWithMiddleware,
    base_url: String,
    location_id: String,
    token: String,
}

impl EventsPortalAPI {
    pub fn new(config: &Config) -> Self {
        Self::with_client(config, REST_CLIENT.clone())
    }

    pub fn with_max_retries(config: &Config, max_retries: u32) -> Self {
        Self::with_client(config, build_client(max_retries))
    }

    fn with_client(config: &Config, client: ClientWithMiddleware) -> Self {
        Self {
            client,
            base_url: config.portal_url.trim_end_matches('/').to_string(),
            location_id: config.location_id.to_string(),
            token: config.event_portal_token.to_string(),
        }
    }

    /**
    Returns the events exactly as the portal lists them (no filtering or ordering)
    */
    #[tracing::instrument(skip(self), fields(location_id = %self.location_id))]
    pub async fn get_events(&self) -> Result<Vec<Event>, APIError> {
        info!("Getting events");

        let json_response = self
            .client
            .get(format!("{}/{}", self.base_url, self.location_id))
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()
            .map_err(APIError::Status)?
            .text()
            .await
            .map_err(APIError::Status)?;

        match serde_json::from_str::<FeedResponse>(&json_response) {
            Ok(parsed_response) => {
                let events: Vec<Event> = parsed_response
                    .into_events()
                    .iter()
                    .map(|response| response.to_model())
                    .collect();

                info!("Got {} events", events.len());

                Ok(events)
            }
            Err(e) => {
                error!("Response parse failed: {:?}", e);
                Err(APIError::InvalidResponse(e))
            }
        }
    }
}

impl FeedSource for EventsPortalAPI {
    fn fetch_events(&self) -> BoxFuture<'_, Vec<Event>> {
        Box::pin(async move {
            self.get_events().await.unwrap_or_else(|err| {
                error!("Event fetch failed: {}", err);
                Vec::new()
            })
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum APIError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
    #[error("bad response: {0}")]
    Status(reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(serde_json::Error),
}
