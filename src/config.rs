//! Board and refresh policy configuration
use embassy_time::Duration;

/// Logic level of a gpio line
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite level
    pub const fn inverse(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

#[derive(Copy, Clone, Debug)]
/// Panel wiring and timing
pub struct PanelConfig {
    /// Level of the busy line while the controller is working.
    ///
    /// The GDEW042T2 pulls BUSY_N low while busy.
    pub busy_active_level: Level,
    /// Level that holds the controller in reset
    pub reset_active_level: Level,
    /// Upper bound for a single busy wait during commands and LUT loading
    pub busy_timeout: Duration,
    /// Upper bound for the busy wait after a display refresh
    pub refresh_timeout: Duration,
    /// Interval the busy line gets sampled with
    pub busy_poll_interval: Duration,
    /// How long the reset line is held active
    pub reset_hold: Duration,
    /// Settle time after releasing reset
    pub reset_settle: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            busy_active_level: Level::Low,
            reset_active_level: Level::Low,
            busy_timeout: Duration::from_millis(5_000),
            refresh_timeout: Duration::from_millis(20_000),
            busy_poll_interval: Duration::from_millis(10),
            reset_hold: Duration::from_millis(20),
            reset_settle: Duration::from_millis(200),
        }
    }
}

#[derive(Copy, Clone, Debug)]
/// Refresh cadence
pub struct RefreshConfig {
    /// Number of partial refreshes after which a full refresh is forced
    pub full_refresh_every: u32,
    /// Period of the scheduler tick
    pub tick_period: Duration,
    /// Minimum time between two accepted, non-forced refreshes
    pub min_refresh_interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            full_refresh_every: 10,
            tick_period: Duration::from_millis(200),
            min_refresh_interval: Duration::from_millis(1_500),
        }
    }
}
