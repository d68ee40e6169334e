//! Modbus TCP transport.
//!
//! Wraps a `tokio-modbus` client context. Every request is bounded by the
//! configured timeout; a transport-class failure drops the context so the
//! next `connect()` starts from a fresh socket.

use std::time::Duration;
use tokio::time::timeout;
use tokio_modbus::Slave;
use tokio_modbus::client::{self, Client, Reader, Writer, tcp};
use tracing::{debug, info};
use vfd_common::config::ConnectionConfig;
use vfd_common::drive::transport::{LinkError, RegisterTransport};

/// Modbus TCP transport to one unit id behind one host/port.
pub struct ModbusTcpTransport {
    host: String,
    port: u16,
    unit_id: u8,
    timeout: Duration,
    ctx: Option<client::Context>,
}

impl ModbusTcpTransport {
    /// Create an unconnected transport from connection parameters.
    pub fn new(config: &ConnectionConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            unit_id: config.unit_id,
            timeout: config.timeout(),
            ctx: None,
        }
    }

    fn map_response<T>(
        &mut self,
        response: Result<tokio_modbus::Result<T>, tokio::time::error::Elapsed>,
    ) -> Result<T, LinkError> {
        let result = match response {
            Err(_) => Err(LinkError::Timeout(self.timeout)),
            Ok(Err(e)) => Err(LinkError::Transport(e.to_string())),
            Ok(Ok(Err(code))) => Err(LinkError::Exception(format!("{code:?}"))),
            Ok(Ok(Ok(value))) => Ok(value),
        };
        if let Err(e) = &result {
            if e.is_transport() {
                debug!("Dropping Modbus context after transport failure: {}", e);
                self.ctx = None;
            }
        }
        result
    }
}

impl RegisterTransport for ModbusTcpTransport {
    fn name(&self) -> &'static str {
        "modbus-tcp"
    }

    async fn connect(&mut self) -> Result<(), LinkError> {
        self.ctx = None;

        let mut addrs = timeout(
            self.timeout,
            tokio::net::lookup_host((self.host.as_str(), self.port)),
        )
        .await
        .map_err(|_| LinkError::Timeout(self.timeout))?
        .map_err(|e| LinkError::Transport(format!("resolve {}: {}", self.host, e)))?;

        let addr = addrs.next().ok_or_else(|| {
            LinkError::Transport(format!("no address for {}:{}", self.host, self.port))
        })?;

        let ctx = timeout(self.timeout, tcp::connect_slave(addr, Slave(self.unit_id)))
            .await
            .map_err(|_| LinkError::Timeout(self.timeout))?
            .map_err(|e| LinkError::Transport(format!("connect {addr}: {e}")))?;

        info!("Modbus TCP session open to {} (unit {})", addr, self.unit_id);
        self.ctx = Some(ctx);
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            let _ = ctx.disconnect().await;
            debug!("Modbus TCP session closed");
        }
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, LinkError> {
        let limit = self.timeout;
        let ctx = self.ctx.as_mut().ok_or(LinkError::NotConnected)?;
        let response = timeout(limit, ctx.read_holding_registers(address, count)).await;
        self.map_response(response)
    }

    async fn write_single_register(&mut self, address: u16, value: u16) -> Result<(), LinkError> {
        let limit = self.timeout;
        let ctx = self.ctx.as_mut().ok_or(LinkError::NotConnected)?;
        let response = timeout(limit, ctx.write_single_register(address, value)).await;
        self.map_response(response)
    }
}
