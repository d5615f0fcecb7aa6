//! The single consumer performing panel transactions
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{debug, error, info};

use crate::config::RefreshConfig;
use crate::il0398::BUFFER_LEN;
use crate::refresh::{PowerRequest, RefreshChannel, RefreshCommand};
use crate::traits::{RefreshMode, RefreshPanel};

/// Size of the worker's private frame copy, a power of two above one frame
pub const SNAPSHOT_LEN: usize = 16 * 1024;

/// Counts partial refreshes and picks the waveform for the next one
///
/// The count only moves once a refresh went through. After a failed one the next
/// refresh is full, since the panel content is unknown.
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    full_refresh_every: u32,
    partial_count: u32,
    full_pending: bool,
}

impl RefreshPolicy {
    pub fn new(full_refresh_every: u32) -> Self {
        RefreshPolicy {
            full_refresh_every,
            partial_count: 0,
            full_pending: false,
        }
    }

    /// Full if forced, after a failure or after `full_refresh_every` partial refreshes
    pub fn next_mode(&self, force_full: bool) -> RefreshMode {
        if force_full || self.full_pending || self.partial_count >= self.full_refresh_every {
            RefreshMode::Full
        } else {
            RefreshMode::Partial
        }
    }

    /// Records a refresh shown with `mode`
    pub fn completed(&mut self, mode: RefreshMode) {
        match mode {
            RefreshMode::Full => {
                self.partial_count = 0;
                self.full_pending = false;
            }
            RefreshMode::Partial => self.partial_count += 1,
        }
    }

    /// Records a refresh that did not make it to the panel
    pub fn failed(&mut self) {
        self.full_pending = true;
    }

    /// Partial refreshes since the last full one
    pub fn partial_count(&self) -> u32 {
        self.partial_count
    }
}

/// Owns the panel and its bus, and executes the posted commands one at a time
pub struct RefreshWorker<'a, M: RawMutex, SPI, P> {
    channel: &'a RefreshChannel<M>,
    spi: SPI,
    panel: P,
    policy: RefreshPolicy,
    snapshot: [u8; SNAPSHOT_LEN],
    asleep: bool,
}

impl<'a, M, SPI, P> RefreshWorker<'a, M, SPI, P>
where
    M: RawMutex,
    P: RefreshPanel<SPI>,
{
    /// Takes over the panel, an uninitialized one is brought up on the first refresh
    pub fn new(channel: &'a RefreshChannel<M>, spi: SPI, panel: P, config: &RefreshConfig) -> Self {
        RefreshWorker {
            channel,
            spi,
            panel,
            policy: RefreshPolicy::new(config.full_refresh_every),
            snapshot: [0xFF; SNAPSHOT_LEN],
            asleep: false,
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Gives back the panel and the bus
    pub fn release(self) -> (SPI, P) {
        (self.spi, self.panel)
    }

    /// Shows the latest handed off frame
    ///
    /// The waveform is only reloaded when it differs from the one loaded on the panel.
    pub async fn refresh(&mut self, command: RefreshCommand) -> Result<RefreshMode, P::Error> {
        self.channel.copy_handoff(&mut self.snapshot[..BUFFER_LEN]);
        self.show_snapshot(command.force_full_refresh).await
    }

    /// Executes a power transition
    pub async fn power(&mut self, request: PowerRequest) -> Result<(), P::Error> {
        match request {
            PowerRequest::Sleep => {
                if self.asleep {
                    return Ok(());
                }
                self.channel.copy_shadow(&mut self.snapshot[..BUFFER_LEN]);
                self.show_snapshot(true).await?;
                let result = self.panel.sleep(&mut self.spi).await;
                // powered off even if the deep sleep command failed
                self.asleep = result.is_ok() || self.panel.mode().is_none();
                result?;
                info!("display asleep");
            }
            PowerRequest::Wake => {
                if !self.asleep && self.panel.mode().is_some() {
                    return Ok(());
                }
                self.panel.wake_up(&mut self.spi).await?;
                self.asleep = false;
                self.channel.request_full_refresh();
                info!("display awake");
            }
        }
        Ok(())
    }

    /// Handles one command, logging failures
    pub async fn handle(&mut self, command: RefreshCommand) {
        if self.asleep {
            debug!("display asleep, refresh dropped");
            return;
        }
        match self.refresh(command).await {
            Ok(mode) => {
                debug!("{:?} refresh done", mode);
                self.channel.notify_refreshed(mode);
            }
            Err(e) => error!("refresh failed: {:?}", e),
        }
    }

    pub async fn handle_power(&mut self, request: PowerRequest) {
        if let Err(e) = self.power(request).await {
            error!("{:?} failed: {:?}", request, e);
        }
    }

    /// Handles pending requests without waiting. Returns false if there were none.
    pub async fn poll(&mut self) -> bool {
        let mut handled = false;
        if let Some(request) = self.channel.try_take_power() {
            self.handle_power(request).await;
            handled = true;
        }
        if let Some(command) = self.channel.try_take_command() {
            self.handle(command).await;
            handled = true;
        }
        handled
    }

    /// Serves the channel forever
    pub async fn run(&mut self) -> ! {
        let channel = self.channel;
        loop {
            let event = select(channel.wait_power(), channel.wait_command()).await;
            match event {
                Either::First(request) => self.handle_power(request).await,
                Either::Second(command) => self.handle(command).await,
            }
        }
    }

    async fn show_snapshot(&mut self, force_full: bool) -> Result<RefreshMode, P::Error> {
        let mode = self.policy.next_mode(force_full);
        match self.transact(mode).await {
            Ok(()) => {
                self.policy.completed(mode);
                Ok(mode)
            }
            Err(e) => {
                self.policy.failed();
                Err(e)
            }
        }
    }

    async fn transact(&mut self, mode: RefreshMode) -> Result<(), P::Error> {
        if self.panel.mode().is_none() {
            info!("panel not ready, bringing it up");
            self.panel.wake_up(&mut self.spi).await?;
        }
        if self.panel.mode() != Some(mode) {
            self.panel.set_mode(&mut self.spi, mode).await?;
        }
        self.panel
            .draw_full(&mut self.spi, &self.snapshot[..BUFFER_LEN])
            .await
    }
}
