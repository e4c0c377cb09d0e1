use std::fmt::Display;

pub const DEFAULT_PORTAL_URL: &str = "https://events-portal-sage.vercel.app/api/events";
pub const DEFAULT_NEAR_YOU_THRESHOLD_KM: f64 = 100.0;
pub const DEFAULT_TEXT_COLOR: &str = "#605858";

/// Options supplied once when the feed starts; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub portal_url: String,
    pub location_id: String,
    pub event_portal_token: String,
    pub waitlist_form_id: String,
    pub sold_out_form_id: String,
    /// Events at or under this distance (km) from the user are "near".
    pub near_you_threshold: f64,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            location_id: String::new(),
            event_portal_token: String::new(),
            waitlist_form_id: String::new(),
            sold_out_form_id: String::new(),
            near_you_threshold: DEFAULT_NEAR_YOU_THRESHOLD_KM,
            display: DisplayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub text_color: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            text_color: DEFAULT_TEXT_COLOR.to_string(),
        }
    }
}

impl Display for DisplayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "--events-text-color: {}", self.text_color)
    }
}
