use crate::events_portal::model::{Event, TicketAction, TicketLink};
use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::warn;

pub const DEFAULT_BUTTON_COLOR: &str = "#000";
const EXTERNAL_LINK_TARGET: &str = "_blank";
const EXTERNAL_LINK_REL: &str = "noopener noreferrer";

/// Anchor attributes of a direct purchase link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalLink<'a> {
    pub href: &'a str,
    pub target: &'static str,
    pub rel: &'static str,
}

/// A ticket button, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseAction {
    pub venue: String,
    pub date_label: String,
    pub button_text: String,
    pub button_color: String,
    pub action: TicketAction,
}

impl PurchaseAction {
    fn new(ticket_link: &TicketLink, venue: &str, date_label: String) -> Self {
        Self {
            venue: venue.to_string(),
            date_label,
            button_text: ticket_link.button_text.clone().unwrap_or_default(),
            button_color: ticket_link
                .button_color
                .clone()
                .unwrap_or_else(|| DEFAULT_BUTTON_COLOR.to_string()),
            action: ticket_link.action(),
        }
    }

    /// `None` for the actions that open the capture sheet instead.
    pub fn external_link(&self) -> Option<ExternalLink<'_>> {
        match &self.action {
            TicketAction::DirectLink(href) => Some(ExternalLink {
                href,
                target: EXTERNAL_LINK_TARGET,
                rel: EXTERNAL_LINK_REL,
            }),
            TicketAction::WaitlistPopup | TicketAction::SoldOutPopup => None,
        }
    }
}

/// Grouped links first, then one action per link of every showtime no group covers.
pub fn purchase_actions(event: &Event) -> Vec<PurchaseAction> {
    let venue = event.display_venue.as_str();
    let mut grouped_ids: HashSet<&str> = HashSet::new();
    let mut actions = Vec::new();

    for group in &event.ticket_link_groups {
        grouped_ids.extend(group.showtime_ids.iter().map(String::as_str));

        match &group.ticket_link {
            Some(ticket_link) => actions.push(PurchaseAction::new(
                ticket_link,
                venue,
                format_range(&group.showtime_dates),
            )),
            None => warn!(
                showtimes = ?group.showtime_ids,
                "Ticket link group has no link, its showtimes get no button"
            ),
        }
    }

    for showtime in event
        .showtimes
        .iter()
        .filter(|showtime| !grouped_ids.contains(showtime.id.as_str()))
    {
        for ticket_link in &showtime.ticket_links {
            actions.push(PurchaseAction::new(
                ticket_link,
                venue,
                format_short(&showtime.date),
            ));
        }
    }

    actions
}

/// "May 1, 2024" for a single day, "May 1 - May 3, 2024" for a span.
pub fn format_range(dates: &[String]) -> String {
    let unique: Vec<&str> = dates
        .iter()
        .map(String::as_str)
        .filter(|date| !date.is_empty())
        .sorted()
        .dedup()
        .collect();

    match unique.as_slice() {
        [] => String::new(),
        [single] => format_long(single),
        [start, .., end] => format!("{} - {}", format_short(start), format_long(end)),
    }
}

/// Card heading: the run's span, or its only day.
pub fn event_date_label(event: &Event) -> String {
    let start = event.start_date.as_deref().unwrap_or_default();

    match event.end_date.as_deref() {
        Some(end) => format!("{} - {}", format_short(start), format_long(end)),
        None => format_long(start),
    }
}

pub fn format_long(date: &str) -> String {
    format_date(date, "%b %-d, %Y")
}

pub fn format_short(date: &str) -> String {
    format_date(date, "%b %-d")
}

fn format_date(date: &str, format: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format(format).to_string(),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events_portal::model::{LinkType, Showtime, TicketLinkGroup};
    use crate::feed::filter::tests::event;

    fn link(link_type: &str, url: &str, text: &str) -> TicketLink {
        TicketLink {
            link_type: LinkType::parse(link_type),
            ticket_link: url.to_string(),
            button_color: Some("#ff0000".to_string()),
            button_text: Some(text.to_string()),
        }
    }

    fn showtime(id: &str, date: &str, links: Vec<TicketLink>) -> Showtime {
        Showtime {
            id: id.to_string(),
            date: date.to_string(),
            ticket_links: links,
        }
    }

    fn dates(values: &[&str]) -> Vec<String> {
        values.iter().map(|d| d.to_string()).collect()
    }

    #[test_log::test]
    fn when_a_range_has_a_single_day_should_show_the_long_date() {
        assert_eq!(format_range(&dates(&["2024-05-01", "2024-05-01"])), "May 1, 2024");
    }

    #[test_log::test]
    fn when_a_range_spans_days_should_show_short_start_and_long_end() {
        assert_eq!(
            format_range(&dates(&["2024-05-03", "2024-05-01", "2024-05-02"])),
            "May 1 - May 3, 2024"
        );
    }

    #[test_log::test]
    fn when_a_range_is_empty_should_have_no_label() {
        assert_eq!(format_range(&[]), "");
    }

    #[test_log::test]
    fn when_a_date_is_malformed_should_show_it_verbatim() {
        assert_eq!(format_long("next friday"), "next friday");
    }

    #[test_log::test]
    fn should_label_the_card_with_the_run() {
        assert_eq!(
            event_date_label(&event("2024-12-30", None, Some("2025-01-02"))),
            "Dec 30 - Jan 2, 2025"
        );
        assert_eq!(event_date_label(&event("2024-12-30", None, None)), "Dec 30, 2024");
    }

    #[test_log::test]
    fn grouped_showtimes_should_never_get_their_own_button() {
        let mut grouped = event("2024-05-01", None, Some("2024-05-03"));
        grouped.showtimes = vec![
            showtime("a", "2024-05-01", vec![link("Buy", "https://t.example/a", "A")]),
            showtime("b", "2024-05-02", vec![link("Buy", "https://t.example/b", "B")]),
            showtime(
                "c",
                "2024-05-03",
                vec![
                    link("Buy", "https://t.example/c", "C"),
                    link("Sold Out", "popup", "C sold out"),
                ],
            ),
        ];
        grouped.ticket_link_groups = vec![TicketLinkGroup {
            showtime_ids: vec!["a".to_string(), "b".to_string()],
            showtime_dates: dates(&["2024-05-02", "2024-05-01"]),
            ticket_link: Some(link("Join Waitlist", "popup", "Waitlist")),
        }];

        let actions = purchase_actions(&grouped);

        let labels: Vec<_> = actions
            .iter()
            .map(|a| (a.button_text.as_str(), a.date_label.as_str()))
            .collect();

        assert_eq!(
            labels,
            vec![
                ("Waitlist", "May 1 - May 2, 2024"),
                ("C", "May 3"),
                ("C sold out", "May 3"),
            ]
        );
        assert_eq!(actions[0].action, TicketAction::WaitlistPopup);
        assert_eq!(
            actions[1].action,
            TicketAction::DirectLink("https://t.example/c".to_string())
        );
        assert_eq!(actions[2].action, TicketAction::SoldOutPopup);
        assert!(actions.iter().all(|a| a.venue == "Venue 2024-05-01"));
    }

    #[test_log::test]
    fn direct_links_should_open_in_a_new_context_without_opener_or_referrer() {
        let mut linked = event("2024-05-01", None, None);
        linked.showtimes = vec![showtime(
            "a",
            "2024-05-01",
            vec![
                link("Buy", "https://t.example/a", "A"),
                link("Join Waitlist", "popup", "Waitlist"),
            ],
        )];

        let actions = purchase_actions(&linked);

        assert_eq!(
            actions[0].external_link(),
            Some(ExternalLink {
                href: "https://t.example/a",
                target: "_blank",
                rel: "noopener noreferrer",
            })
        );
        assert_eq!(actions[1].external_link(), None);
    }

    #[test_log::test]
    fn when_a_group_has_no_link_should_still_cover_its_showtimes() {
        let mut grouped = event("2024-05-01", None, None);
        grouped.showtimes = vec![showtime(
            "a",
            "2024-05-01",
            vec![link("Buy", "https://t.example/a", "A")],
        )];
        grouped.ticket_link_groups = vec![TicketLinkGroup {
            showtime_ids: vec!["a".to_string()],
            showtime_dates: dates(&["2024-05-01"]),
            ticket_link: None,
        }];

        assert!(purchase_actions(&grouped).is_empty());
    }

    #[test_log::test]
    fn when_button_styling_is_missing_should_use_defaults() {
        let mut bare = event("2024-05-01", None, None);
        bare.showtimes = vec![showtime(
            "a",
            "2024-05-01",
            vec![TicketLink {
                link_type: LinkType::parse("Buy"),
                ticket_link: "https://t.example/a".to_string(),
                button_color: None,
                button_text: None,
            }],
        )];

        let actions = purchase_actions(&bare);

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].button_text, "");
        assert_eq!(actions[0].button_color, DEFAULT_BUTTON_COLOR);
    }
}
