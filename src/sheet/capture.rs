use crate::config::model::Config;
use crate::events_portal::model::TicketAction;
use crate::location::model::UserLocation;
use reqwest::Url;
use tracing::{debug, warn};

const FORM_BASE_URL: &str = "https://api.leadconnectorhq.com/widget/form/";

/// Lead-capture forms shown in the sheet. The name doubles as the query parameter.
#[derive(strum::IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum CaptureForm {
    Waitlist,
    SoldOut,
}

impl CaptureForm {
    pub fn form_id<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            CaptureForm::Waitlist => &config.waitlist_form_id,
            CaptureForm::SoldOut => &config.sold_out_form_id,
        }
    }
}

impl TicketAction {
    /// The form a popup button opens; direct links have none.
    pub fn capture_form(&self) -> Option<CaptureForm> {
        match self {
            TicketAction::WaitlistPopup => Some(CaptureForm::Waitlist),
            TicketAction::SoldOutPopup => Some(CaptureForm::SoldOut),
            TicketAction::DirectLink(_) => None,
        }
    }
}

/// Builds the embedded form URL, or `None` when the form isn't configured.
pub fn capture_form_url(
    form: CaptureForm,
    config: &Config,
    venue: &str,
    date: &str,
    user_location: Option<&UserLocation>,
) -> Option<Url> {
    let form_id = form.form_id(config).trim();

    if form_id.is_empty() {
        debug!(?form, "No form configured");
        return None;
    }

    let mut url = Url::parse(&format!("{}{}", FORM_BASE_URL, form_id))
        .inspect_err(|err| warn!("Invalid form id '{}': {}", form_id, err))
        .ok()?;

    {
        let mut query = url.query_pairs_mut();

        if !venue.is_empty() || !date.is_empty() {
            let param: &'static str = form.into();
            query.append_pair(param, format!("{} {}", venue, date).trim());
        }

        if let Some(coordinates) = user_location.and_then(|location| location.coordinates()) {
            query.append_pair("latitude", &coordinates.latitude.to_string());
            query.append_pair("longitude", &coordinates.longitude.to_string());
        }
    }

    // an empty pair list still leaves a bare '?'
    if url.query() == Some("") {
        url.set_query(None);
    }

    Some(url)
}
