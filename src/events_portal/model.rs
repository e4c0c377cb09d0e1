use crate::location::model::Coordinates;
use serde::{Serialize, Serializer};
use std::str::FromStr;

const LIVE_STATUS: &str = "live";
/// `ticketLink` value that asks for a lead-capture form instead of navigation.
pub const POPUP_SENTINEL: &str = "popup";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub status: String,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub display_venue: String,
    pub display_city: String,
    pub display_state: String,
    pub additional_info: String,
    pub showtimes: Vec<Showtime>,
    pub ticket_link_groups: Vec<TicketLinkGroup>,
    /// Kilometers from the user, only set once a location was resolved.
    pub distance: Option<f64>,
}

impl Event {
    pub fn is_live(&self) -> bool {
        self.status == LIVE_STATUS
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinates::new(lat, lon))
            }
            _ => None,
        }
    }

    /// "City, State", or just the city when there's no state.
    pub fn display_location(&self) -> String {
        if self.display_state.is_empty() {
            self.display_city.clone()
        } else {
            format!("{}, {}", self.display_city, self.display_state)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Showtime {
    pub id: String,
    pub date: String,
    pub ticket_links: Vec<TicketLink>,
}

/// One purchase link standing in for several showtimes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLinkGroup {
    pub showtime_ids: Vec<String>,
    pub showtime_dates: Vec<String>,
    pub ticket_link: Option<TicketLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLink {
    pub link_type: LinkType,
    pub ticket_link: String,
    pub button_color: Option<String>,
    pub button_text: Option<String>,
}

impl TicketLink {
    pub fn action(&self) -> TicketAction {
        let is_popup = self.ticket_link == POPUP_SENTINEL;

        match &self.link_type {
            LinkType::JoinWaitlist if is_popup => TicketAction::WaitlistPopup,
            LinkType::SoldOut if is_popup => TicketAction::SoldOutPopup,
            _ => TicketAction::DirectLink(self.ticket_link.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, strum::EnumString)]
pub enum LinkType {
    #[strum(serialize = "Join Waitlist")]
    JoinWaitlist,
    #[strum(serialize = "Sold Out")]
    SoldOut,
    #[strum(default)]
    Purchase(String),
}

impl LinkType {
    pub fn parse(value: &str) -> Self {
        LinkType::from_str(value).unwrap_or_else(|_| LinkType::Purchase(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            LinkType::JoinWaitlist => "Join Waitlist",
            LinkType::SoldOut => "Sold Out",
            LinkType::Purchase(label) => label,
        }
    }
}

impl Serialize for LinkType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// What pressing a ticket button does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketAction {
    /// Opens the URL in a new context, without opener or referrer.
    DirectLink(String),
    WaitlistPopup,
    SoldOutPopup,
}
