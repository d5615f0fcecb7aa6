//! Entry points for application code updating the screen content
//!
//! The UI object tree is owned by the caller and reached only through the
//! [`UiSurface`] capability. [`DisplayFrontend`] serializes all access to it with
//! an async lock and turns significant transitions into forced full refreshes. Holding
//! the lock also holds the frame, so no snapshot is taken in the middle of an update.
use core::cell::Cell;
use core::fmt::Write;
use core::ops::{Deref, DerefMut};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use heapless::String;
use log::{debug, warn};

use crate::refresh::{FrameHold, PowerRequest, RefreshChannel};

/// Mount point of the icon images
pub const ICONS_PATH: &str = "S:/icons/";
/// Icon shown for unknown emotions
pub const NEUTRAL_EMOTION: &str = "neutral";
/// Forecast days the weather scene has room for
pub const MAX_FORECAST_DAYS: usize = 7;
/// Role whose chat messages trigger a full refresh
pub const SYSTEM_ROLE: &str = "system";

/// Path of an icon image
pub type IconPath = String<48>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Status,
    ChatMessage,
    WeatherNow,
    Location,
    Date,
    ForecastHigh(u8),
    ForecastLow(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageField {
    Emotion,
    WeatherNow,
    Forecast(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// Status bar, emotion and chat
    Chat,
    /// Current weather and forecast
    Weather,
}

/// What the display core may do with the UI object tree
pub trait UiSurface {
    fn set_text(&mut self, field: TextField, value: &str);
    fn set_image(&mut self, field: ImageField, path: &str);
    fn switch_scene(&mut self, scene: Scene);
}

#[derive(Debug, Clone, Copy)]
pub struct DailyForecast<'a> {
    pub icon_day: &'a str,
    pub temp_max: &'a str,
    pub temp_min: &'a str,
}

/// Weather as delivered by the weather service
#[derive(Debug, Clone, Copy)]
pub struct WeatherReport<'a> {
    pub temperature: &'a str,
    pub feels_like: &'a str,
    pub text: &'a str,
    pub icon_code: &'a str,
    pub aqi_category: &'a str,
    pub location: &'a str,
    pub date: &'a str,
    pub daily: &'a [DailyForecast<'a>],
}

/// `S:/icons/<name>.bin`, `None` if the name does not fit
pub fn icon_path(name: &str) -> Option<IconPath> {
    let mut path = IconPath::new();
    write!(path, "{ICONS_PATH}{name}.bin").ok()?;
    Some(path)
}

/// Exclusive access to the UI objects, released when dropped
pub struct UiGuard<'a, M: RawMutex, U> {
    ui: MutexGuard<'a, M, U>,
    _hold: FrameHold<'a, M>,
}

impl<M: RawMutex, U> Deref for UiGuard<'_, M, U> {
    type Target = U;

    fn deref(&self) -> &U {
        &self.ui
    }
}

impl<M: RawMutex, U> DerefMut for UiGuard<'_, M, U> {
    fn deref_mut(&mut self) -> &mut U {
        &mut self.ui
    }
}

/// Serialized access to the UI plus refresh requests
pub struct DisplayFrontend<'a, M: RawMutex, U> {
    channel: &'a RefreshChannel<M>,
    ui: Mutex<M, U>,
    scene: BlockingMutex<M, Cell<Option<Scene>>>,
}

impl<'a, M: RawMutex, U: UiSurface> DisplayFrontend<'a, M, U> {
    pub fn new(channel: &'a RefreshChannel<M>, ui: U) -> Self {
        DisplayFrontend {
            channel,
            ui: Mutex::new(ui),
            scene: BlockingMutex::new(Cell::new(None)),
        }
    }

    /// Scoped UI lock, released when the guard is dropped
    ///
    /// Hold it while mutating UI objects outside of the entry points below. The
    /// scheduler defers its snapshots until the guard is gone.
    pub async fn lock(&self) -> UiGuard<'_, M, U> {
        let ui = self.ui.lock().await;
        UiGuard {
            ui,
            _hold: self.channel.hold(),
        }
    }

    /// Returns `None` while the lock is held, also from the holder itself
    pub fn try_lock(&self) -> Option<UiGuard<'_, M, U>> {
        let ui = self.ui.try_lock().ok()?;
        Some(UiGuard {
            ui,
            _hold: self.channel.hold(),
        })
    }

    pub async fn set_status(&self, status: &str) {
        self.lock().await.set_text(TextField::Status, status);
    }

    /// Shows the icon for `emotion`, falling back to the neutral one
    pub async fn set_emotion(&self, emotion: &str) {
        let Some(path) = icon_path(emotion).or_else(|| icon_path(NEUTRAL_EMOTION)) else {
            return;
        };
        self.lock().await.set_image(ImageField::Emotion, &path);
    }

    /// Shows a chat line, system messages are redrawn with a full refresh
    pub async fn set_chat_message(&self, role: &str, content: &str) {
        self.lock().await.set_text(TextField::ChatMessage, content);
        if role == SYSTEM_ROLE {
            self.channel.request_full_refresh();
        }
    }

    pub async fn set_weather(&self, report: &WeatherReport<'_>) {
        // truncated if it does not fit
        let mut now = String::<128>::new();
        let _ = write!(
            now,
            "{} {}°C / feels {}°C / AQI {}",
            report.text, report.temperature, report.feels_like, report.aqi_category
        );

        let mut ui = self.lock().await;
        ui.set_text(TextField::WeatherNow, &now);
        if let Some(path) = icon_path(report.icon_code) {
            ui.set_image(ImageField::WeatherNow, &path);
        }
        ui.set_text(TextField::Location, report.location);
        ui.set_text(TextField::Date, report.date);

        if report.daily.len() > MAX_FORECAST_DAYS {
            warn!("{} forecast days, showing {}", report.daily.len(), MAX_FORECAST_DAYS);
        }
        for (day, forecast) in report.daily.iter().take(MAX_FORECAST_DAYS).enumerate() {
            let day = day as u8;
            if let Some(path) = icon_path(forecast.icon_day) {
                ui.set_image(ImageField::Forecast(day), &path);
            }
            ui.set_text(TextField::ForecastHigh(day), forecast.temp_max);
            ui.set_text(TextField::ForecastLow(day), forecast.temp_min);
        }
    }

    /// Loads `scene`, a scene change is redrawn with a full refresh
    pub async fn switch_scene(&self, scene: Scene) {
        let mut ui = self.lock().await;
        let previous = self.scene.lock(|current| current.replace(Some(scene)));
        ui.switch_scene(scene);
        drop(ui);

        if previous != Some(scene) {
            debug!("scene {:?} -> {:?}", previous, scene);
            self.channel.request_full_refresh();
        }
    }

    /// Notifies a significant content change, redrawn with a full refresh
    pub fn content_changed(&self) {
        self.channel.request_full_refresh();
    }

    pub fn set_power_save(&self, enabled: bool) {
        self.channel.request_power(if enabled {
            PowerRequest::Sleep
        } else {
            PowerRequest::Wake
        });
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::RefreshConfig;
    use crate::framebuffer::Area;
    use crate::refresh::{RefreshCommand, RefreshScheduler, TickOutcome};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_time::Instant;
    use std::string::{String as StdString, ToString};
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Update {
        Text(TextField, StdString),
        Image(ImageField, StdString),
        Scene(Scene),
    }

    #[derive(Default)]
    struct RecordingSurface {
        updates: Vec<Update>,
    }

    impl UiSurface for RecordingSurface {
        fn set_text(&mut self, field: TextField, value: &str) {
            self.updates.push(Update::Text(field, value.to_string()));
        }

        fn set_image(&mut self, field: ImageField, path: &str) {
            self.updates.push(Update::Image(field, path.to_string()));
        }

        fn switch_scene(&mut self, scene: Scene) {
            self.updates.push(Update::Scene(scene));
        }
    }

    fn forced(channel: &RefreshChannel<NoopRawMutex>, now: u64) -> bool {
        let scheduler = RefreshScheduler::new(channel, RefreshConfig::default());
        scheduler.tick(Instant::from_millis(now))
            == TickOutcome::Posted(RefreshCommand {
                force_full_refresh: true,
            })
    }

    #[test]
    fn icon_paths() {
        assert_eq!(icon_path("happy").as_deref(), Some("S:/icons/happy.bin"));
        assert_eq!(icon_path("100").as_deref(), Some("S:/icons/100.bin"));
        assert_eq!(icon_path(&"x".repeat(60)), None);
    }

    #[test]
    fn status_and_emotion() {
        let channel = RefreshChannel::<NoopRawMutex>::new();
        let frontend = DisplayFrontend::new(&channel, RecordingSurface::default());

        block_on(async {
            frontend.set_status("listening").await;
            frontend.set_emotion("happy").await;
            frontend.set_emotion(&"x".repeat(60)).await;

            let ui = frontend.lock().await;
            assert_eq!(
                ui.updates,
                [
                    Update::Text(TextField::Status, "listening".to_string()),
                    Update::Image(ImageField::Emotion, "S:/icons/happy.bin".to_string()),
                    Update::Image(ImageField::Emotion, "S:/icons/neutral.bin".to_string()),
                ]
            );
        });
        assert!(!channel.is_dirty());
    }

    #[test]
    fn system_chat_message_forces_full_refresh() {
        let channel = RefreshChannel::<NoopRawMutex>::new();
        let frontend = DisplayFrontend::new(&channel, RecordingSurface::default());

        block_on(frontend.set_chat_message("assistant", "hello"));
        assert!(!forced(&channel, 0));

        block_on(frontend.set_chat_message(SYSTEM_ROLE, "connected"));
        assert!(forced(&channel, 100));
    }

    #[test]
    fn scene_change_forces_full_refresh_once() {
        let channel = RefreshChannel::<NoopRawMutex>::new();
        let frontend = DisplayFrontend::new(&channel, RecordingSurface::default());

        block_on(frontend.switch_scene(Scene::Weather));
        assert!(forced(&channel, 0));

        block_on(frontend.switch_scene(Scene::Weather));
        assert!(!channel.is_dirty());

        block_on(frontend.switch_scene(Scene::Chat));
        assert!(forced(&channel, 100));
    }

    #[test]
    fn weather_report_fills_forecast() {
        let channel = RefreshChannel::<NoopRawMutex>::new();
        let frontend = DisplayFrontend::new(&channel, RecordingSurface::default());

        let day = DailyForecast {
            icon_day: "101",
            temp_max: "25",
            temp_min: "17",
        };
        let daily = [day; 9];
        let report = WeatherReport {
            temperature: "23",
            feels_like: "24",
            text: "Cloudy",
            icon_code: "101",
            aqi_category: "Good",
            location: "Beijing",
            date: "2024-05-01",
            daily: &daily,
        };

        block_on(async {
            frontend.set_weather(&report).await;

            let ui = frontend.lock().await;
            assert_eq!(
                ui.updates[0],
                Update::Text(
                    TextField::WeatherNow,
                    "Cloudy 23°C / feels 24°C / AQI Good".to_string()
                )
            );
            assert_eq!(
                ui.updates[1],
                Update::Image(ImageField::WeatherNow, "S:/icons/101.bin".to_string())
            );
            let forecast_icons = ui
                .updates
                .iter()
                .filter(|u| matches!(u, Update::Image(ImageField::Forecast(_), _)))
                .count();
            assert_eq!(forecast_icons, MAX_FORECAST_DAYS);
            assert!(ui
                .updates
                .contains(&Update::Text(TextField::ForecastLow(6), "17".to_string())));
        });
    }

    #[test]
    fn lock_is_exclusive() {
        let channel = RefreshChannel::<NoopRawMutex>::new();
        let frontend = DisplayFrontend::new(&channel, RecordingSurface::default());

        block_on(async {
            let guard = frontend.lock().await;
            assert!(frontend.try_lock().is_none());
            drop(guard);
            assert!(frontend.try_lock().is_some());
        });
    }

    #[test]
    fn snapshots_wait_for_the_ui_lock() {
        let channel = RefreshChannel::<NoopRawMutex>::new();
        let frontend = DisplayFrontend::new(&channel, RecordingSurface::default());
        let scheduler = RefreshScheduler::new(&channel, RefreshConfig::default());

        block_on(async {
            let mut ui = frontend.lock().await;
            ui.set_text(TextField::Status, "speaking");
            channel.flush_rgb565(Area::new(0, 0, 7, 0), &[0; 8]);

            assert_eq!(scheduler.tick(Instant::from_millis(0)), TickOutcome::Held);
            assert_eq!(channel.try_take_command(), None);
            drop(ui);
        });

        assert!(matches!(
            scheduler.tick(Instant::from_millis(200)),
            TickOutcome::Posted(_)
        ));
    }

    #[test]
    fn power_save_posts_requests() {
        let channel = RefreshChannel::<NoopRawMutex>::new();
        let frontend = DisplayFrontend::new(&channel, RecordingSurface::default());

        frontend.set_power_save(true);
        assert_eq!(channel.try_take_power(), Some(PowerRequest::Sleep));
        frontend.set_power_save(false);
        assert_eq!(channel.try_take_power(), Some(PowerRequest::Wake));
    }
}
