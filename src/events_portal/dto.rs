use super::model::{Event, LinkType, Showtime, TicketLink, TicketLinkGroup};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub data: Option<FeedData>,
}

impl FeedResponse {
    pub fn into_events(self) -> Vec<EventResponse> {
        self.data.map(|data| data.events).unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedData {
    #[serde(default, deserialize_with = "deserialize_vec")]
    pub events: Vec<EventResponse>,
}

// Note: every field is optional on the wire, a bad field must not drop the whole feed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(default, deserialize_with = "deserialize_str")]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_opt_str")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_str")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_str")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_coordinate")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_str")]
    pub display_venue: String,
    #[serde(default, deserialize_with = "deserialize_str")]
    pub display_city: String,
    #[serde(default, deserialize_with = "deserialize_str")]
    pub display_state: String,
    #[serde(default, deserialize_with = "deserialize_str")]
    pub additional_info: String,
    #[serde(default, deserialize_with = "deserialize_vec")]
    pub showtimes: Vec<ShowtimeResponse>,
    #[serde(default, deserialize_with = "deserialize_vec")]
    pub ticket_link_groups: Vec<TicketLinkGroupResponse>,
}

impl EventResponse {
    pub fn to_model(&self) -> Event {
        Event {
            status: self.status.to_string(),
            start_date: self.start_date.clone(),
            start_time: self.start_time.clone(),
            end_date: self.end_date.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            display_venue: self.display_venue.to_string(),
            display_city: self.display_city.to_string(),
            display_state: self.display_state.to_string(),
            additional_info: self.additional_info.to_string(),
            showtimes: self.showtimes.iter().map(|s| s.to_model()).collect(),
            ticket_link_groups: self
                .ticket_link_groups
                .iter()
                .map(|g| g.to_model())
                .collect(),
            distance: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimeResponse {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_str")]
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_vec")]
    pub ticket_links: Vec<TicketLinkResponse>,
}

impl ShowtimeResponse {
    fn to_model(&self) -> Showtime {
        Showtime {
            id: self.id.to_string(),
            date: self.date.to_string(),
            ticket_links: self.ticket_links.iter().map(|t| t.to_model()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLinkGroupResponse {
    #[serde(default, deserialize_with = "deserialize_ids")]
    pub showtime_ids: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_ids")]
    pub showtime_dates: Vec<String>,
    #[serde(default)]
    pub ticket_link: Option<TicketLinkResponse>,
}

impl TicketLinkGroupResponse {
    fn to_model(&self) -> TicketLinkGroup {
        TicketLinkGroup {
            showtime_ids: self.showtime_ids.clone(),
            showtime_dates: self.showtime_dates.clone(),
            ticket_link: self.ticket_link.as_ref().map(|t| t.to_model()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLinkResponse {
    #[serde(default, deserialize_with = "deserialize_str")]
    pub link_type: String,
    #[serde(default, deserialize_with = "deserialize_str")]
    pub ticket_link: String,
    #[serde(default, deserialize_with = "deserialize_opt_str")]
    pub button_color: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_str")]
    pub button_text: Option<String>,
}

impl TicketLinkResponse {
    fn to_model(&self) -> TicketLink {
        TicketLink {
            link_type: LinkType::parse(&self.link_type),
            ticket_link: self.ticket_link.to_string(),
            button_color: self.button_color.clone(),
            button_text: self.button_text.clone(),
        }
    }
}

fn deserialize_str<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Empty strings count as absent, same as a missing field.
fn deserialize_opt_str<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn deserialize_coordinate<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let coordinate = match Value::deserialize(d)? {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    Ok(coordinate.filter(|c| c.is_finite()))
}

fn deserialize_id<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_id(Value::deserialize(d)?).unwrap_or_default())
}

fn deserialize_ids<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(values) => values.into_iter().filter_map(value_to_id).collect(),
        _ => Vec::new(),
    })
}

fn value_to_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Keeps the entries that deserialize and skips the rest.
fn deserialize_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> Deserialize<'a>,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|value| {
                T::deserialize(value)
                    .inspect_err(|err| warn!("Skipping malformed entry: {err}"))
                    .ok()
            })
            .collect(),
        _ => Vec::new(),
    })
}
