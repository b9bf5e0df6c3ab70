//! Chromium-backed browser session.
//!
//! Controls Chrome/Chromium over the Chrome DevTools Protocol using
//! chromiumoxide. Network events of the session's page are translated into
//! [`NetworkEvent`]s for the capture loop.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventRequestWillBeSent, EventResponseReceived, GetRequestPostDataParams,
    GetResponseBodyParams, Headers as CdpHeaders, RequestId,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::network::{
    Cookie, Headers, NetworkEvent, NetworkRequest, NetworkResponse, METHOD_POST,
};
use super::session::{BrowserSession, LaunchOptions};

enum RawEvent {
    Request(Arc<EventRequestWillBeSent>),
    Response(Arc<EventResponseReceived>),
}

/// A visible Chrome/Chromium window with one page under capture.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    events: BoxStream<'static, RawEvent>,
    _handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    /// Launches the browser described by `options` and opens a blank page
    /// whose network traffic is observed.
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        info!("Launching browser...");

        let mut builder = BrowserConfig::builder().with_head().args(options.args());

        if let Some(ref path) = options.executable_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow!("Invalid browser configuration: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
            debug!("Browser handler stream ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open page")?;

        let requests = page.event_listener::<EventRequestWillBeSent>().await?;
        let responses = page.event_listener::<EventResponseReceived>().await?;
        let events = stream::select(
            requests.map(RawEvent::Request),
            responses.map(RawEvent::Response),
        )
        .boxed();

        info!("Browser launched successfully");

        Ok(Self {
            browser,
            page,
            events,
            _handler_task: handler_task,
        })
    }
}

async fn request_post_data(page: &Page, request_id: &RequestId) -> Option<String> {
    match page
        .execute(GetRequestPostDataParams::new(request_id.clone()))
        .await
    {
        Ok(resp) => Some(resp.post_data.clone()),
        Err(e) => {
            debug!("Failed to read post data: {}", e);
            None
        }
    }
}

fn header_map(headers: &CdpHeaders) -> Headers {
    headers.inner().as_object().cloned().unwrap_or_default()
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn enable_network(&mut self) -> Result<()> {
        self.page.execute(EnableParams::default()).await?;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<NetworkEvent> {
        let event = match self.events.next().await? {
            RawEvent::Request(ev) => {
                let post_data =
                    if ev.request.method == METHOD_POST && ev.request.has_post_data == Some(true) {
                        request_post_data(&self.page, &ev.request_id).await
                    } else {
                        None
                    };

                NetworkEvent::RequestWillBeSent {
                    request_id: ev.request_id.inner().clone(),
                    request: NetworkRequest {
                        url: ev.request.url.clone(),
                        method: ev.request.method.clone(),
                        headers: header_map(&ev.request.headers),
                        post_data,
                    },
                }
            }
            RawEvent::Response(ev) => NetworkEvent::ResponseReceived {
                request_id: ev.request_id.inner().clone(),
                response: NetworkResponse {
                    url: ev.response.url.clone(),
                    status: ev.response.status,
                    headers: header_map(&ev.response.headers),
                },
            },
        };

        Some(event)
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>> {
        let cookies = self.page.get_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|c| Cookie::new(c.name, c.value))
            .collect())
    }

    async fn response_body(&mut self, request_id: &str) -> Result<Vec<u8>> {
        let resp = self
            .page
            .execute(GetResponseBodyParams::new(RequestId::new(request_id)))
            .await?;

        if resp.base64_encoded {
            Ok(general_purpose::STANDARD.decode(&resp.body)?)
        } else {
            Ok(resp.body.clone().into_bytes())
        }
    }

    async fn close(&mut self) -> Result<()> {
        info!("Shutting down browser...");
        self.browser.close().await?;
        self.browser.wait().await?;
        info!("Browser shut down");
        Ok(())
    }
}
