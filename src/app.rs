//! Application controller exposed to the frontend.
//!
//! Holds the active [`Config`], starts capture sessions and stops them on
//! request. Captured requests are announced through [`App::subscribe`].

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::capture::{
    run_capture, stop_channel, BrowserSession, CaptureEvent, CaptureListener, CaptureStore,
    LaunchOptions, RequestInfo, StopHandle, StopSignal,
};
use crate::config::Config;

const EVENT_CAPACITY: usize = 1024;

/// Backend state shared with the frontend.
pub struct App {
    config: RwLock<Config>,
    control: Mutex<Option<(StopHandle, StopSignal)>>,
    events: broadcast::Sender<CaptureEvent>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config: RwLock::new(config),
            control: Mutex::new(None),
            events,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    /// Replaces the configuration. Running sessions keep the one they
    /// started with.
    pub fn set_config(&self, config: Config) {
        debug!(?config, "configuration replaced");
        *self.config.write() = config;
    }

    /// Launch options for the next browser, from the current config.
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions::from_config(&self.config.read())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events.subscribe()
    }

    /// Starts a capture session on `session` with a fresh store.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open_browser<S>(&self, session: S) -> JoinHandle<anyhow::Result<Vec<RequestInfo>>>
    where
        S: BrowserSession + 'static,
    {
        let signal = {
            let mut control = self.control.lock();
            let (_, signal) = control.get_or_insert_with(stop_channel);
            signal.clone()
        };

        let listener = CaptureListener::new(CaptureStore::new(), self.events.clone());
        let config = self.config();

        info!("Opening browser on {}", config.effective_url());
        tokio::spawn(run_capture(session, config, signal, listener))
    }

    /// Asks one running session to stop. Returns false if no session was
    /// ever opened or a stop request is already pending.
    pub fn close_browser(&self) -> bool {
        match *self.control.lock() {
            Some((ref handle, _)) => handle.signal(),
            None => false,
        }
    }

    /// Stops every running session. The next [`App::open_browser`] starts a
    /// new stop channel.
    pub fn close_all_browsers(&self) {
        if self.control.lock().take().is_some() {
            info!("Closing all browser sessions");
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
