//! Browser session abstraction and the capture loop.
//!
//! A [`BrowserSession`] is one running browser that reports network events.
//! [`run_capture`] drives a session from navigation until it is told to stop,
//! then finalizes the captured requests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::listener::{CaptureEvent, CaptureListener};
use super::model::RequestInfo;
use super::network::{cookie_header, Cookie, NetworkEvent};
use crate::config::Config;

/// Browser launch options derived from a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Browser executable. If None, the system default is used.
    pub executable_path: Option<String>,

    /// Window dimensions as (width, height) in pixels.
    pub window_size: (u32, u32),

    pub no_sandbox: bool,
    pub no_default_browser_check: bool,
    pub no_first_run: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            executable_path: None,
            window_size: (1920, 1080),
            no_sandbox: true,
            no_default_browser_check: true,
            no_first_run: true,
        }
    }
}

impl LaunchOptions {
    /// Options for the browser named by `config.browser_path`. An empty path
    /// counts as unset.
    pub fn from_config(config: &Config) -> Self {
        Self {
            executable_path: config.browser_path.clone().filter(|p| !p.is_empty()),
            ..Default::default()
        }
    }

    /// Command line switches for a Chromium-family browser.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.no_sandbox {
            args.push("--no-sandbox".to_string());
        }
        if self.no_default_browser_check {
            args.push("--no-default-browser-check".to_string());
        }
        if self.no_first_run {
            args.push("--no-first-run".to_string());
        }
        args.push(format!(
            "--window-size={},{}",
            self.window_size.0, self.window_size.1
        ));
        args
    }
}

/// One running browser instance.
#[async_trait]
pub trait BrowserSession: Send {
    /// Starts network event reporting.
    async fn enable_network(&mut self) -> Result<()>;

    /// Navigates the session's page to `url`.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Waits for the next network event. `None` once the browser stops
    /// reporting.
    async fn next_event(&mut self) -> Option<NetworkEvent>;

    /// Cookies currently visible to the page.
    async fn cookies(&mut self) -> Result<Vec<Cookie>>;

    /// Body of the response to the request with browser id `request_id`.
    async fn response_body(&mut self, request_id: &str) -> Result<Vec<u8>>;

    /// Shuts the browser down.
    async fn close(&mut self) -> Result<()>;
}

/// Sending side of a stop channel.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: mpsc::Sender<()>,
}

impl StopHandle {
    /// Queues one stop request. Returns false if one is already pending or
    /// the channel is closed.
    pub fn signal(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }
}

/// Receiving side of a stop channel, shared by every session opened on it.
///
/// Each queued stop request ends exactly one waiting session. Dropping every
/// [`StopHandle`] ends all of them.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: Arc<Mutex<mpsc::Receiver<()>>>,
}

impl StopSignal {
    /// Resolves on a stop request or when the channel closes.
    pub async fn wait(&self) {
        let mut rx = self.rx.lock().await;
        let _ = rx.recv().await;
    }

    /// Discards a pending stop request, if any.
    fn drain(&self) {
        if let Ok(mut rx) = self.rx.try_lock() {
            let _ = rx.try_recv();
        }
    }
}

/// Creates a stop channel holding at most one pending request.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = mpsc::channel(1);
    (
        StopHandle { tx },
        StopSignal {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Runs a capture session to completion.
///
/// Navigates to the configured URL, records network events until `stop`
/// fires, then drops unanswered requests and attaches cookies and response
/// bodies to the rest. On failure the error is logged, a pending stop request
/// is discarded so it cannot end another session, and the error is returned.
pub async fn run_capture<S>(
    mut session: S,
    config: Config,
    stop: StopSignal,
    listener: CaptureListener,
) -> Result<Vec<RequestInfo>>
where
    S: BrowserSession,
{
    match drive(&mut session, &config, &stop, &listener).await {
        Ok(captured) => {
            if let Err(e) = session.close().await {
                warn!("Failed to close browser session: {}", e);
            }
            listener.emit(CaptureEvent::SessionFinished {
                captured: captured.len(),
            });
            Ok(captured)
        }
        Err(e) => {
            warn!("Capture session failed: {}", e);
            stop.drain();
            if let Err(close_err) = session.close().await {
                debug!("Failed to close browser session: {}", close_err);
            }
            Err(e)
        }
    }
}

async fn drive<S>(
    session: &mut S,
    config: &Config,
    stop: &StopSignal,
    listener: &CaptureListener,
) -> Result<Vec<RequestInfo>>
where
    S: BrowserSession,
{
    let url = config.effective_url();

    session.enable_network().await?;
    session.navigate(url).await?;
    info!("Capture session started on {}", url);
    listener.emit(CaptureEvent::SessionStarted {
        url: url.to_string(),
    });

    let mut events_open = true;
    loop {
        tokio::select! {
            biased;
            _ = stop.wait() => break,
            event = session.next_event(), if events_open => match event {
                Some(event) => listener.handle(&event),
                None => {
                    debug!("Browser stopped reporting network events");
                    events_open = false;
                }
            },
        }
    }

    finalize(session, listener).await
}

async fn finalize<S>(session: &mut S, listener: &CaptureListener) -> Result<Vec<RequestInfo>>
where
    S: BrowserSession,
{
    let cookies = match session.cookies().await {
        Ok(cookies) => cookie_header(&cookies),
        Err(e) => {
            warn!("Failed to read cookies: {}", e);
            String::new()
        }
    };

    let store = listener.store();
    store.retain(|_, info| info.is_answered());

    let mut captured = Vec::with_capacity(store.len());
    for (key, mut info) in store.snapshot() {
        info.header.cookies = cookies.clone();

        match session.response_body(&info.request_id).await {
            Ok(body) => info.response_body = body,
            Err(e) => warn!("Failed to fetch response body for {}: {}", info.url, e),
        }

        store.insert(key, info.clone());
        captured.push(info);
    }

    info!("Capture session finished with {} requests", captured.len());
    Ok(captured)
}

/// Scripted browser session for tests and offline runs.
///
/// Replays queued network events, then reports that the event stream ended.
#[derive(Debug, Default)]
pub struct MockBrowserSession {
    events: VecDeque<NetworkEvent>,
    cookies: Vec<Cookie>,
    bodies: HashMap<String, Vec<u8>>,
    fail_navigation: bool,
    visited: Arc<SyncMutex<Vec<String>>>,
    closed: Arc<SyncMutex<bool>>,
}

impl MockBrowserSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(mut self, event: NetworkEvent) -> Self {
        self.events.push_back(event);
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn with_body(mut self, request_id: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(request_id.into(), body.into());
        self
    }

    /// Makes `navigate` fail.
    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    /// Shared list of URLs navigated to, readable after the session moves.
    pub fn visited(&self) -> Arc<SyncMutex<Vec<String>>> {
        Arc::clone(&self.visited)
    }

    /// Shared flag set once the session is closed.
    pub fn closed(&self) -> Arc<SyncMutex<bool>> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl BrowserSession for MockBrowserSession {
    async fn enable_network(&mut self) -> Result<()> {
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        if self.fail_navigation {
            return Err(anyhow!("Navigation failed: {}", url));
        }
        self.visited.lock().push(url.to_string());
        Ok(())
    }

    async fn next_event(&mut self) -> Option<NetworkEvent> {
        self.events.pop_front()
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>> {
        Ok(self.cookies.clone())
    }

    async fn response_body(&mut self, request_id: &str) -> Result<Vec<u8>> {
        self.bodies
            .get(request_id)
            .cloned()
            .ok_or_else(|| anyhow!("No resource with given identifier found: {}", request_id))
    }

    async fn close(&mut self) -> Result<()> {
        *self.closed.lock() = true;
        Ok(())
    }
}
