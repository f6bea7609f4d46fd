//! Captive-portal landing server.
//!
//! Accepts TCP connections and answers every HTTP request with a static
//! setup page. The configuration handlers themselves live elsewhere.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jetclock_common::PortalError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::hotspot::HotspotConfig;
use crate::{PortalServer, PortalService};

const MAX_REQUEST_HEAD: usize = 8 * 1024;
const READ_TIMEOUT: Duration = Duration::from_secs(10);
const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(50);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(2);

/// Delay between failed `accept` calls, doubling up to a cap so a
/// persistent error such as EMFILE does not spin the loop.
#[derive(Debug)]
struct AcceptBackoff {
    next: Duration,
}

impl AcceptBackoff {
    fn new() -> Self {
        Self {
            next: ACCEPT_BACKOFF_MIN,
        }
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(ACCEPT_BACKOFF_MAX);
        delay
    }

    fn reset(&mut self) {
        self.next = ACCEPT_BACKOFF_MIN;
    }
}

/// Builds [`PortalListener`]s bound to a configurable address.
pub struct HttpPortal {
    bind_ip: IpAddr,
}

impl HttpPortal {
    pub fn new() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }

    pub fn with_bind_ip(bind_ip: IpAddr) -> Self {
        Self { bind_ip }
    }

    /// Bind the listener. Failing here is fatal for the updater.
    pub async fn bind(&self, config: &HotspotConfig) -> Result<PortalListener, PortalError> {
        let addr = SocketAddr::new(self.bind_ip, config.port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| PortalError::Create(format!("bind {addr}: {e}")))?;
        Ok(PortalListener {
            listener,
            page: Arc::from(landing_page(config)),
        })
    }
}

impl Default for HttpPortal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PortalService for HttpPortal {
    async fn create(&self, config: &HotspotConfig) -> Result<Box<dyn PortalServer>, PortalError> {
        Ok(Box::new(self.bind(config).await?))
    }
}

/// A bound portal server.
pub struct PortalListener {
    listener: TcpListener,
    page: Arc<str>,
}

impl PortalListener {
    pub fn local_addr(&self) -> Result<SocketAddr, PortalError> {
        self.listener
            .local_addr()
            .map_err(|e| PortalError::Serve(e.to_string()))
    }
}

#[async_trait]
impl PortalServer for PortalListener {
    async fn serve(&mut self) -> Result<(), PortalError> {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!("portal listening on {}", addr);
        }

        let mut backoff = AcceptBackoff::new();
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    backoff.reset();
                    let page = Arc::clone(&self.page);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &page).await {
                            tracing::debug!(peer = %peer, error = %e, "portal connection failed");
                        }
                    });
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(error = %e, ?delay, "TCP accept error");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream, page: &str) -> std::io::Result<()> {
    let mut head = Vec::with_capacity(1024);
    let mut buf = [0u8; 1024];
    loop {
        let n = tokio::time::timeout(READ_TIMEOUT, stream.read(&mut buf))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "request timed out"))??;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
        if head.windows(4).any(|w| w == b"\r\n\r\n") || head.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n{}",
        page.len(),
        page
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn landing_page(config: &HotspotConfig) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>JetClock setup</title></head>\
         <body><h1>JetClock setup</h1><p>Connected to <strong>{}</strong>.</p>\
         <p>Choose a Wi-Fi network to bring your clock online.</p></body></html>",
        escape_html(&config.ssid)
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
