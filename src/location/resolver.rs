use super::model::{Coordinates, UserLocation};
use futures::future::BoxFuture;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Hints handed to the platform's "current position" request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// How old a cached fix may be; zero asks for a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: LOCATION_TIMEOUT,
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported")]
    Unsupported,
    #[error("permission denied")]
    PermissionDenied,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("position unavailable: {0}")]
    Unavailable(String),
}

pub trait GeolocationProvider {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> BoxFuture<'_, Result<Coordinates, GeolocationError>>;
}

/// Host without any location capability.
pub struct NoGeolocation;

impl GeolocationProvider for NoGeolocation {
    fn current_position(
        &self,
        _options: PositionOptions,
    ) -> BoxFuture<'_, Result<Coordinates, GeolocationError>> {
        Box::pin(async { Err(GeolocationError::Unsupported) })
    }
}

/// Always answers with the same position.
pub struct FixedPosition(pub Coordinates);

impl GeolocationProvider for FixedPosition {
    fn current_position(
        &self,
        _options: PositionOptions,
    ) -> BoxFuture<'_, Result<Coordinates, GeolocationError>> {
        Box::pin(async move { Ok(self.0) })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved(UserLocation),
}

/// Asks for the user's position once per session and keeps the answer.
pub struct GeoResolver<P> {
    provider: P,
    options: PositionOptions,
    state: Mutex<ResolutionState>,
}

impl<P: GeolocationProvider> GeoResolver<P> {
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, PositionOptions::default())
    }

    pub fn with_options(provider: P, options: PositionOptions) -> Self {
        Self {
            provider,
            options,
            state: Mutex::new(ResolutionState::Unresolved),
        }
    }

    pub fn state(&self) -> ResolutionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn location(&self) -> Option<UserLocation> {
        match self.state() {
            ResolutionState::Resolved(location) => Some(location),
            _ => None,
        }
    }

    /**
    Requests the position, at most once.
    Returns `None` when a previous call already started the request.
    Failures resolve to a denied location, they're never returned as errors.
    */
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self) -> Option<UserLocation> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

            if *state != ResolutionState::Unresolved {
                debug!("Location already processed ({:?})", *state);
                return None;
            }

            *state = ResolutionState::Resolving;
        }

        let request = self.provider.current_position(self.options);
        let location = match tokio::time::timeout(self.options.timeout, request).await {
            Ok(Ok(coordinates)) => {
                info!(
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "Location resolved"
                );
                UserLocation::resolved(coordinates)
            }
            Ok(Err(err)) => {
                warn!("Location failed: {}", err);
                UserLocation::denied()
            }
            Err(_) => {
                warn!(
                    "Location failed: {}",
                    GeolocationError::Timeout(self.options.timeout)
                );
                UserLocation::denied()
            }
        };

        *self.state.lock().unwrap_or_else(PoisonError::into_inner) =
            ResolutionState::Resolved(location);

        Some(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Notify;

    struct Denying;

    impl GeolocationProvider for Denying {
        fn current_position(
            &self,
            _options: PositionOptions,
        ) -> BoxFuture<'_, Result<Coordinates, GeolocationError>> {
            Box::pin(async { Err(GeolocationError::PermissionDenied) })
        }
    }

    struct Hanging;

    impl GeolocationProvider for Hanging {
        fn current_position(
            &self,
            _options: PositionOptions,
        ) -> BoxFuture<'_, Result<Coordinates, GeolocationError>> {
            Box::pin(futures::future::pending())
        }
    }

    struct Gated {
        gate: Arc<Notify>,
        coordinates: Coordinates,
    }

    impl GeolocationProvider for Gated {
        fn current_position(
            &self,
            _options: PositionOptions,
        ) -> BoxFuture<'_, Result<Coordinates, GeolocationError>> {
            Box::pin(async move {
                self.gate.notified().await;
                Ok(self.coordinates)
            })
        }
    }

    fn porto() -> Coordinates {
        Coordinates::new(41.1579, -8.6291)
    }

    #[test_log::test(tokio::test)]
    async fn should_resolve_the_position() {
        let resolver = GeoResolver::new(FixedPosition(porto()));

        let location = resolver.resolve().await;

        assert_eq!(location, Some(UserLocation::resolved(porto())));
        assert_eq!(resolver.location().unwrap().coordinates(), Some(porto()));
    }

    #[test_log::test(tokio::test)]
    async fn when_already_resolved_should_not_ask_again() {
        let resolver = GeoResolver::new(FixedPosition(porto()));

        resolver.resolve().await;

        assert_eq!(resolver.resolve().await, None);
        assert_eq!(
            resolver.state(),
            ResolutionState::Resolved(UserLocation::resolved(porto()))
        );
    }

    #[test_log::test(tokio::test)]
    async fn when_unsupported_or_denied_should_resolve_as_denied() {
        let unsupported = GeoResolver::new(NoGeolocation).resolve().await.unwrap();
        let denied = GeoResolver::new(Denying).resolve().await.unwrap();

        assert_eq!(unsupported, UserLocation::denied());
        assert_eq!(denied, UserLocation::denied());
        assert_eq!(denied.coordinates(), None);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn when_the_request_hangs_should_give_up_after_ten_seconds() {
        let resolver = GeoResolver::new(Hanging);
        let started = tokio::time::Instant::now();

        let location = resolver.resolve().await;

        assert_eq!(location, Some(UserLocation::denied()));
        assert!(started.elapsed() >= LOCATION_TIMEOUT);
    }

    #[test_log::test(tokio::test)]
    async fn when_resolving_should_ignore_other_requests() {
        let gate = Arc::new(Notify::new());
        let resolver = GeoResolver::new(Gated {
            gate: gate.clone(),
            coordinates: porto(),
        });

        let (first, (state_meanwhile, second)) = tokio::join!(resolver.resolve(), async {
            tokio::task::yield_now().await;
            let state = resolver.state();
            let second = resolver.resolve().await;
            gate.notify_one();
            (state, second)
        });

        assert_eq!(state_meanwhile, ResolutionState::Resolving);
        assert_eq!(second, None);
        assert_eq!(first, Some(UserLocation::resolved(porto())));
    }
}
