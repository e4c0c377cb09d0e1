use super::capture::{capture_form_url, CaptureForm};
use super::gesture::{GestureConfig, GestureController, GestureInput, Release, SheetSurface};
use crate::config::model::Config;
use crate::feed::tickets::PurchaseAction;
use crate::location::model::UserLocation;
use reqwest::Url;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, instrument, trace};

#[derive(Debug, Clone, PartialEq)]
pub enum SheetCommand {
    Open(Url),
    BackdropClick,
    CloseButton,
    Gesture(GestureInput),
}

/// Bottom sheet hosting the capture forms.
///
/// Without a surface every call is a silent no-op.
pub struct OverlaySheet<S> {
    surface: Option<S>,
    gesture: GestureController,
    open: bool,
}

impl<S: SheetSurface> OverlaySheet<S> {
    pub fn new(surface: Option<S>, config: GestureConfig) -> Self {
        Self {
            surface,
            gesture: GestureController::new(config),
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn gesture(&self) -> &GestureController {
        &self.gesture
    }

    #[instrument(skip(self))]
    pub fn open(&mut self, url: Url) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            debug!("No sheet to open");
            return false;
        };

        self.gesture.reset(surface);
        surface.load_form(&url);
        surface.set_active(true);
        self.open = true;

        info!("Sheet opened");
        true
    }

    /// Opens the waitlist or sold-out form for a venue and date.
    pub fn open_capture(
        &mut self,
        form: CaptureForm,
        config: &Config,
        venue: &str,
        date: &str,
        user_location: Option<&UserLocation>,
    ) -> bool {
        if self.surface.is_none() {
            return false;
        }

        match capture_form_url(form, config, venue, date, user_location) {
            Some(url) => self.open(url),
            None => false,
        }
    }

    /// Opens the form behind a popup ticket button. Direct links are left to the host.
    pub fn trigger(
        &mut self,
        action: &PurchaseAction,
        config: &Config,
        user_location: Option<&UserLocation>,
    ) -> bool {
        match action.action.capture_form() {
            Some(form) => self.open_capture(
                form,
                config,
                &action.venue,
                &action.date_label,
                user_location,
            ),
            None => false,
        }
    }

    /// Safe to call any number of times; only the first closes.
    pub fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }

        if let Some(surface) = self.surface.as_mut() {
            surface.set_active(false);
        }
        self.open = false;

        info!("Sheet closed");
        true
    }

    /// Applies one command and returns how a drag ended, if this command ended one.
    pub fn handle(&mut self, command: SheetCommand) -> Option<Release> {
        match command {
            SheetCommand::Open(url) => {
                self.open(url);
                None
            }
            SheetCommand::BackdropClick | SheetCommand::CloseButton => {
                self.close();
                None
            }
            SheetCommand::Gesture(input) => {
                let surface = self.surface.as_mut()?;
                let release = self.gesture.handle(input, surface);

                if release == Some(Release::Dismissed) {
                    self.close();
                }

                release
            }
        }
    }

    pub fn finish_settling(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            self.gesture.finish_settling(surface);
        }
    }
}

/**
Feeds commands to the sheet until the sender is dropped,
clearing the settle animation once it has played.
*/
pub async fn run_sheet<S: SheetSurface>(
    mut sheet: OverlaySheet<S>,
    mut commands: mpsc::Receiver<SheetCommand>,
) -> OverlaySheet<S> {
    let settle_duration = sheet.gesture().config().settle_duration;
    let mut settle_at: Option<Instant> = None;

    loop {
        let deadline = settle_at.unwrap_or_else(Instant::now);

        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => {
                    trace!(?command, "Sheet command");

                    if sheet.handle(command).is_some() {
                        settle_at = Some(Instant::now() + settle_duration);
                    }
                }
                None => break,
            },
            _ = sleep_until(deadline), if settle_at.is_some() => {
                sheet.finish_settling();
                settle_at = None;
            }
        }
    }

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events_portal::model::TicketAction;
    use crate::location::model::Coordinates;
    use crate::sheet::gesture::tests::FakeSurface;
    use crate::sheet::gesture::{GestureState, SheetTransform, Transition};
    use std::time::Duration;

    fn config() -> Config {
        Config {
            waitlist_form_id: "wait123".to_string(),
            sold_out_form_id: "sold456".to_string(),
            ..Config::default()
        }
    }

    fn purchase_action(action: TicketAction) -> PurchaseAction {
        PurchaseAction {
            venue: "Beacon Theatre".to_string(),
            date_label: "May 1, 2024".to_string(),
            button_text: "Tickets".to_string(),
            button_color: "#000".to_string(),
            action,
        }
    }

    fn form_url() -> Url {
        Url::parse("https://api.leadconnectorhq.com/widget/form/wait123").unwrap()
    }

    fn open_sheet() -> OverlaySheet<FakeSurface> {
        let mut sheet = OverlaySheet::new(Some(FakeSurface::new(400.0, 300.0)), GestureConfig::default());
        sheet.open(form_url());
        sheet
    }

    #[test_log::test]
    fn opening_should_load_the_form_and_activate_the_sheet() {
        let sheet = open_sheet();
        let surface = sheet.surface().unwrap();

        assert!(sheet.is_open());
        assert!(surface.active);
        assert_eq!(surface.form_url, Some(form_url()));
    }

    #[test_log::test]
    fn when_reopened_after_a_drag_dismiss_should_start_at_rest() {
        let mut sheet = OverlaySheet::new(Some(FakeSurface::new(400.0, 300.0)), GestureConfig::default());
        assert!(sheet.open_capture(CaptureForm::Waitlist, &config(), "Coliseu", "May 1", None));

        sheet.handle(SheetCommand::Gesture(GestureInput::TouchStart { y: 0.0 }));
        sheet.handle(SheetCommand::Gesture(GestureInput::TouchMove { y: 200.0 }));
        assert_eq!(
            sheet.handle(SheetCommand::Gesture(GestureInput::TouchEnd)),
            Some(Release::Dismissed)
        );
        sheet.finish_settling();
        assert!(!sheet.is_open());

        assert!(sheet.open_capture(CaptureForm::SoldOut, &config(), "Coliseu", "May 2", None));
        let surface = sheet.surface().unwrap();

        assert!(surface.active);
        assert_eq!(surface.transform, Some(SheetTransform::Vertical { offset_y: 0.0 }));
        assert_eq!(surface.backdrop_opacity, 1.0);
        assert_eq!(sheet.gesture().state(), GestureState::Idle);
    }

    #[test_log::test]
    fn a_waitlist_button_should_open_its_form_with_venue_date_and_position() {
        let mut sheet = OverlaySheet::new(Some(FakeSurface::new(400.0, 300.0)), GestureConfig::default());
        let location = UserLocation::resolved(Coordinates::new(40.5, -74.25));

        let waitlist = purchase_action(TicketAction::WaitlistPopup);

        assert!(sheet.trigger(&waitlist, &config(), Some(&location)));

        let surface = sheet.surface().unwrap();
        let url = surface.form_url.as_ref().unwrap();

        assert!(sheet.is_open());
        assert!(surface.active);
        assert_eq!(url.path(), "/widget/form/wait123");
        assert_eq!(
            url.query(),
            Some("waitlist=Beacon+Theatre+May+1%2C+2024&latitude=40.5&longitude=-74.25")
        );
    }

    #[test_log::test]
    fn a_sold_out_button_should_open_the_sold_out_form() {
        let mut sheet = OverlaySheet::new(Some(FakeSurface::new(400.0, 300.0)), GestureConfig::default());

        assert!(sheet.trigger(&purchase_action(TicketAction::SoldOutPopup), &config(), None));

        let url = sheet.surface().unwrap().form_url.clone().unwrap();
        assert_eq!(url.path(), "/widget/form/sold456");
        assert_eq!(url.query(), Some("soldout=Beacon+Theatre+May+1%2C+2024"));
    }

    #[test_log::test]
    fn a_direct_link_should_not_open_the_sheet() {
        let mut sheet = OverlaySheet::new(Some(FakeSurface::new(400.0, 300.0)), GestureConfig::default());
        let direct = purchase_action(TicketAction::DirectLink("https://t.example/a".to_string()));

        assert!(!sheet.trigger(&direct, &config(), None));
        assert!(!sheet.is_open());
        assert_eq!(sheet.surface().unwrap().form_url, None);
    }

    #[test_log::test]
    fn closing_should_happen_once() {
        let mut sheet = open_sheet();

        assert!(sheet.close());
        assert!(!sheet.close());
        assert!(!sheet.surface().unwrap().active);
    }

    #[test_log::test]
    fn backdrop_and_close_button_should_close() {
        let mut sheet = open_sheet();
        sheet.handle(SheetCommand::BackdropClick);
        assert!(!sheet.is_open());

        let mut sheet = open_sheet();
        sheet.handle(SheetCommand::CloseButton);
        assert!(!sheet.is_open());
    }

    #[test_log::test]
    fn dragging_far_enough_should_close() {
        let mut sheet = open_sheet();

        sheet.handle(SheetCommand::Gesture(GestureInput::PointerDown { y: 10.0 }));
        sheet.handle(SheetCommand::Gesture(GestureInput::PointerMove { y: 130.0 }));

        assert_eq!(
            sheet.handle(SheetCommand::Gesture(GestureInput::PointerUp)),
            Some(Release::Dismissed)
        );
        assert!(!sheet.is_open());
        assert!(!sheet.gesture().is_tracking_pointer());
    }

    #[test_log::test]
    fn without_a_surface_should_do_nothing() {
        let mut sheet: OverlaySheet<FakeSurface> = OverlaySheet::new(None, GestureConfig::default());
        let config = Config {
            waitlist_form_id: "wait123".to_string(),
            ..Config::default()
        };

        assert!(!sheet.open_capture(CaptureForm::Waitlist, &config, "Coliseu", "May 1", None));
        assert_eq!(
            sheet.handle(SheetCommand::Gesture(GestureInput::TouchStart { y: 0.0 })),
            None
        );
        assert!(!sheet.close());
    }

    #[test_log::test]
    fn when_the_form_is_not_configured_should_stay_closed() {
        let mut sheet = OverlaySheet::new(Some(FakeSurface::new(400.0, 300.0)), GestureConfig::default());

        assert!(!sheet.open_capture(CaptureForm::SoldOut, &Config::default(), "Coliseu", "May 1", None));
        assert!(!sheet.surface().unwrap().active);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn should_clear_the_settle_animation_after_300ms() {
        let (sender, receiver) = mpsc::channel(8);
        let driver = tokio::spawn(run_sheet(open_sheet(), receiver));

        for input in [
            GestureInput::TouchStart { y: 0.0 },
            GestureInput::TouchMove { y: 40.0 },
            GestureInput::TouchEnd,
            GestureInput::TouchCancel,
        ] {
            sender.send(SheetCommand::Gesture(input)).await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(350)).await;
        drop(sender);

        let sheet = driver.await.unwrap();
        let surface = sheet.surface().unwrap();

        assert!(sheet.is_open());
        assert_eq!(sheet.gesture().state(), GestureState::Idle);
        assert_eq!(
            surface.transitions,
            vec![Transition::Disabled, Transition::Animated, Transition::Cleared]
        );
    }
}
