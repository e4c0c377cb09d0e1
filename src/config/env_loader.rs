use crate::config::model::{
    Config, DisplayConfig, DEFAULT_NEAR_YOU_THRESHOLD_KM, DEFAULT_PORTAL_URL, DEFAULT_TEXT_COLOR,
};
use crate::location::model::Coordinates;
use std::env;

pub fn load_config() -> Config {
    let near_you_threshold = load_f64_config("NEAR_YOU_THRESHOLD_KM")
        .unwrap_or(DEFAULT_NEAR_YOU_THRESHOLD_KM);

    if near_you_threshold < 0.0 {
        panic!("Invalid config 'NEAR_YOU_THRESHOLD_KM'. Expected a non-negative number.");
    }

    Config {
        portal_url: load_string_config("EVENTS_PORTAL_URL", DEFAULT_PORTAL_URL),
        location_id: load_string_config("EVENTS_LOCATION_ID", ""),
        event_portal_token: load_string_config("EVENTS_PORTAL_TOKEN", ""),
        waitlist_form_id: load_string_config("WAITLIST_FORM_ID", ""),
        sold_out_form_id: load_string_config("SOLD_OUT_FORM_ID", ""),
        near_you_threshold,
        display: DisplayConfig {
            text_color: load_string_config("EVENTS_TEXT_COLOR", DEFAULT_TEXT_COLOR),
        },
    }
}

/// Fixed user position for hosts without a location service.
/// Both `USER_LATITUDE` and `USER_LONGITUDE` must be set, otherwise there's none.
pub fn load_user_position() -> Option<Coordinates> {
    let latitude = load_f64_config("USER_LATITUDE")?;
    let longitude = load_f64_config("USER_LONGITUDE")?;

    Some(Coordinates::new(latitude, longitude))
}

fn load_string_config(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn load_f64_config(name: &str) -> Option<f64> {
    match env::var(name) {
        Ok(value) => {
            let parsed: f64 = value.trim().parse().unwrap_or_else(|_| {
                panic!("Invalid config '{}'. Expected a decimal number.", name)
            });

            if !parsed.is_finite() {
                panic!("Invalid config '{}'. Expected a finite number.", name);
            }

            Some(parsed)
        }
        Err(_) => None,
    }
}
