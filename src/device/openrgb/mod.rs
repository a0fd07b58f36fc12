//! OpenRGB SDK client.
//!
//! Connects to an OpenRGB server over TCP, discovers its controllers, switches
//! each one into custom (direct) mode and then paints every LED with the current
//! color on each [`DeviceSink::synchronize`].
//!
//! Startup reads use a timeout so a silent server fails fast. Once the device list
//! is known no further replies are expected, and pushes block until the kernel
//! accepts the bytes.

pub mod protocol;

use anyhow::{Context, Result};
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::color::Color;
use crate::constants::SOCKET_TIMEOUT_MS;
use crate::device::DeviceSink;
use crate::error::ForwardError;
use crate::logger::Log;
use protocol::ControllerInfo;

/// A connected OpenRGB server and the controllers it exposes.
pub struct OpenRgbDevice {
    stream: TcpStream,
    controllers: Vec<ControllerInfo>,
    color: Color,
    log: Log,
}

impl OpenRgbDevice {
    /// Connect, announce `client_name` and load every controller description.
    ///
    /// # Errors
    /// Fails if the server cannot be reached, answers with malformed packets, or
    /// reports no controllers.
    pub fn connect(address: &str, client_name: &str, log: Log) -> Result<Self> {
        let addr = address
            .to_socket_addrs()
            .with_context(|| format!("Failed to resolve OpenRGB server address {}", address))?
            .next()
            .with_context(|| format!("No addresses found for {}", address))?;

        let timeout = Duration::from_millis(SOCKET_TIMEOUT_MS);
        let stream = TcpStream::connect_timeout(&addr, timeout)
            .with_context(|| format!("Failed to connect to OpenRGB server at {}", address))?;
        stream
            .set_read_timeout(Some(timeout))
            .context("Failed to set socket read timeout")?;
        stream.set_nodelay(true).ok();

        log.log_debug(&format!("Connected to OpenRGB server at {}", addr));

        let mut device = Self {
            stream,
            controllers: Vec::new(),
            color: Color::black(),
            log,
        };

        device
            .send(0, protocol::SET_CLIENT_NAME, &protocol::encode_client_name(client_name))
            .context("Failed to announce client name")?;

        let payload = device
            .request(0, protocol::REQUEST_CONTROLLER_COUNT, &[])
            .context("Failed to query controller count")?;
        let count = protocol::decode_controller_count(&payload)?;
        device.log.log_debug(&format!("Server reports {} controller(s)", count));

        if count == 0 {
            anyhow::bail!(
                "OpenRGB server at {} reports no controllers. Check that OpenRGB detects your devices.",
                address
            );
        }

        for index in 0..count {
            let payload = device
                .request(index, protocol::REQUEST_CONTROLLER_DATA, &[])
                .with_context(|| format!("Failed to read data for controller {}", index))?;
            let info = protocol::decode_controller_data(&payload)
                .with_context(|| format!("Malformed data for controller {}", index))?;

            device.log.log_debug(&format!(
                "Controller {}: {} ({} LEDs in {} zone(s))",
                index,
                info.name,
                info.led_count,
                info.zones.len()
            ));
            for zone in &info.zones {
                device
                    .log
                    .log_trace(&format!("  zone {} with {} LEDs", zone.name, zone.led_count));
            }

            device
                .send(index, protocol::RGBCONTROLLER_SETCUSTOMMODE, &[])
                .with_context(|| format!("Failed to set custom mode on {}", info.name))?;
            device.controllers.push(info);
        }

        device
            .stream
            .set_read_timeout(None)
            .context("Failed to clear socket read timeout")?;

        Ok(device)
    }

    pub fn controllers(&self) -> &[ControllerInfo] {
        &self.controllers
    }

    pub fn led_count(&self) -> usize {
        self.controllers.iter().map(|c| c.led_count).sum()
    }

    fn send(&mut self, device: u32, id: u32, payload: &[u8]) -> io::Result<()> {
        self.log.log_trace(&format!(
            "-> packet {} for device {} ({} bytes)",
            id,
            device,
            payload.len()
        ));
        protocol::write_packet(&mut self.stream, device, id, payload)
    }

    /// Send a request and wait for the reply with the same packet id.
    fn request(&mut self, device: u32, id: u32, payload: &[u8]) -> io::Result<Vec<u8>> {
        self.send(device, id, payload)?;

        loop {
            let (header, reply) = protocol::read_packet(&mut self.stream)?;
            self.log.log_trace(&format!(
                "<- packet {} for device {} ({} bytes)",
                header.id, header.device, header.size
            ));

            if header.id == id {
                return Ok(reply);
            }
            if header.id == protocol::DEVICE_LIST_UPDATED {
                self.log
                    .log_debug("Server announced a device list change during startup");
                continue;
            }
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected reply to packet {}, got packet {}", id, header.id),
            ));
        }
    }
}

impl DeviceSink for OpenRgbDevice {
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn synchronize(&mut self) -> Result<(), ForwardError> {
        if self.controllers.is_empty() {
            return Err(ForwardError::NoDevices);
        }

        let rgb = self.color.to_rgb8();
        for index in 0..self.controllers.len() {
            let leds = vec![rgb; self.controllers[index].led_count];
            let payload = protocol::encode_update_leds(&leds)?;
            self.send(index as u32, protocol::RGBCONTROLLER_UPDATELEDS, &payload)?;
        }
        Ok(())
    }
}
