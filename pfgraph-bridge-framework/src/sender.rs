//! Metric delivery to Carbon over TCP.

use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, lookup_host};

use pfgraph_common::{CarbonConfig, Format, MetricPoint, encode_message};

use crate::error::{BridgeError, Result};

/// Sender for one Carbon endpoint.
///
/// Each [`send`](Self::send) opens its own connection, writes one message and
/// closes the socket again. There is no pooling, retry or timeout.
#[derive(Clone, Debug)]
pub struct CarbonSender {
    host: String,
    port: u16,
    format: Format,
}

impl CarbonSender {
    /// Create a new sender.
    pub fn new(host: impl Into<String>, port: u16, format: Format) -> Self {
        Self {
            host: host.into(),
            port,
            format,
        }
    }

    /// Create a sender using the format from a Carbon config section.
    pub fn from_config(host: impl Into<String>, port: u16, config: &CarbonConfig) -> Self {
        Self::new(host, port, config.format)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the serialization format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// `host:port` as given.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the target host to every address the resolver offers.
    ///
    /// A resolution failure yields no candidates.
    pub async fn resolve(&self) -> Vec<SocketAddr> {
        match lookup_host((self.host.as_str(), self.port)).await {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                tracing::warn!(host = %self.host, error = %e, "Failed to resolve Carbon host");
                Vec::new()
            }
        }
    }

    /// Connect to the first resolved address that accepts.
    ///
    /// Candidates are tried in resolver order; the first successful
    /// connection wins and the rest are never tried.
    pub async fn connect(&self) -> Result<TcpStream> {
        let candidates = self.resolve().await;

        for addr in &candidates {
            match TcpStream::connect(*addr).await {
                Ok(stream) => {
                    tracing::debug!(%addr, "Connected to Carbon");
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "Connection attempt failed");
                }
            }
        }

        tracing::error!(
            target_addr = %self.target(),
            candidates = candidates.len(),
            "No address accepted the connection"
        );

        Err(BridgeError::Connection {
            host: self.host.clone(),
            port: self.port,
        })
    }

    /// Send all points as one message.
    ///
    /// Returns the number of bytes written. The socket is closed on every
    /// exit path when it goes out of scope.
    pub async fn send(&self, points: &[MetricPoint]) -> Result<usize> {
        let mut stream = self.connect().await?;
        let message = encode_message(points, self.format)?;

        let transmit = |source: std::io::Error| BridgeError::Transmit {
            target: self.target(),
            source,
        };

        stream.write_all(&message).await.map_err(transmit)?;
        stream.flush().await.map_err(transmit)?;
        stream.shutdown().await.map_err(transmit)?;

        tracing::info!(
            target_addr = %self.target(),
            format = self.format.as_str(),
            metrics = points.len(),
            bytes = message.len(),
            "Sent metrics to Carbon"
        );

        Ok(message.len())
    }
}
