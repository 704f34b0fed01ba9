//! Node Runtime
//!
//! Wires one institution together: loads its records, binds the datagram listener on
//! its UDP port, and serves the client gateway on its HTTP port.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::types::FederationConfig;
use crate::coordinator::service::Coordinator;
use crate::directory::service::PeerDirectory;
use crate::gateway;
use crate::ledger::service::Ledger;
use crate::protocol::codec::MessageCodec;
use crate::transport::client::UdpTransport;
use crate::transport::listener::DatagramListener;


pub struct LibraryNode {
    coordinator: Arc<Coordinator<UdpTransport>>,
    listener: DatagramListener,
    http_addr: SocketAddr,
}

impl LibraryNode {
    /// Loads the records of `institution` and binds its UDP endpoint.
    pub async fn bind(config: &FederationConfig, institution: &str) -> Result<Self> {
        let settings = config.institution(institution)?;

        let ledger = Ledger::from_files(
            institution,
            &settings.students_file,
            &settings.books_file,
        )
        .with_context(|| format!("failed to load records of {}", institution))?;

        let udp_addr = config.udp_endpoint(institution)?;
        let listener = DatagramListener::bind(udp_addr)
            .await
            .with_context(|| format!("failed to bind UDP endpoint {}", udp_addr))?;

        Self::with_listener(config, institution, ledger, listener)
    }

    /// Builds a node around an already loaded ledger and an already bound listener.
    pub fn with_listener(
        config: &FederationConfig,
        institution: &str,
        ledger: Ledger,
        listener: DatagramListener,
    ) -> Result<Self> {
        let directory = PeerDirectory::from_config(config, institution)?;
        let coordinator = Coordinator::new(
            Arc::new(ledger),
            Arc::new(directory),
            MessageCodec::new(config.delimiter()),
            UdpTransport::new(config.probe_timeout()),
        );

        Ok(Self {
            coordinator: Arc::new(coordinator),
            listener,
            http_addr: config.http_endpoint(institution)?,
        })
    }

    /// Loads, binds and serves until the HTTP server stops.
    pub async fn start(config: &FederationConfig, institution: &str) -> Result<()> {
        Self::bind(config, institution).await?.run().await
    }

    pub fn coordinator(&self) -> &Arc<Coordinator<UdpTransport>> {
        &self.coordinator
    }

    pub fn udp_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub async fn run(self) -> Result<()> {
        let institution = self.coordinator.institution().to_string();
        let udp_addr = self.listener.local_addr()?;

        self.listener.spawn(self.coordinator.clone());
        tracing::info!("{} answering peers on {}", institution, udp_addr);

        let app = gateway::router(self.coordinator.clone());
        let listener = tokio::net::TcpListener::bind(self.http_addr)
            .await
            .with_context(|| format!("failed to bind HTTP endpoint {}", self.http_addr))?;

        tracing::info!("HTTP server listening on {}", self.http_addr);
        tracing::info!("Press Ctrl+C to shutdown");

        axum::serve(listener, app).await?;

        Ok(())
    }
}
