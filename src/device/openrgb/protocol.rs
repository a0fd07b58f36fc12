//! OpenRGB SDK wire format.
//!
//! Every packet starts with a 16-byte header:
//!
//! ```text
//! "ORGB" | device index: u32 | packet id: u32 | payload size: u32
//! ```
//!
//! All integers are little-endian. Strings inside payloads carry a `u16` length that
//! includes the trailing NUL. Only the packets needed to discover controllers and
//! push colors are implemented, at protocol version 0.

use std::io::{self, Read, Write};

use crate::constants::MAX_PACKET_SIZE;

pub const MAGIC: &[u8; 4] = b"ORGB";
pub const HEADER_SIZE: usize = 16;

pub const REQUEST_CONTROLLER_COUNT: u32 = 0;
pub const REQUEST_CONTROLLER_DATA: u32 = 1;
pub const SET_CLIENT_NAME: u32 = 50;
pub const DEVICE_LIST_UPDATED: u32 = 100;
pub const RGBCONTROLLER_UPDATELEDS: u32 = 1050;
pub const RGBCONTROLLER_SETCUSTOMMODE: u32 = 1100;

/// Packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub device: u32,
    pub id: u32,
    pub size: u32,
}

impl Header {
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(MAGIC);
        bytes[4..8].copy_from_slice(&self.device.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.id.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.size.to_le_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8; HEADER_SIZE]) -> io::Result<Self> {
        if &bytes[0..4] != MAGIC {
            return Err(invalid(format!(
                "bad packet magic {:02x?}, expected \"ORGB\"",
                &bytes[0..4]
            )));
        }

        let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        Ok(Self {
            device: word(4),
            id: word(8),
            size: word(12),
        })
    }
}

/// Write one packet: header followed by payload.
pub fn write_packet<W: Write>(writer: &mut W, device: u32, id: u32, payload: &[u8]) -> io::Result<()> {
    let size = u32::try_from(payload.len())
        .map_err(|_| invalid(format!("payload of {} bytes is too large", payload.len())))?;
    let header = Header { device, id, size };

    let mut packet = Vec::with_capacity(HEADER_SIZE + payload.len());
    packet.extend_from_slice(&header.encode());
    packet.extend_from_slice(payload);
    writer.write_all(&packet)?;
    writer.flush()
}

/// Read one packet and return its header and payload.
pub fn read_packet<R: Read>(reader: &mut R) -> io::Result<(Header, Vec<u8>)> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_bytes)?;
    let header = Header::decode(&header_bytes)?;

    if header.size > MAX_PACKET_SIZE {
        return Err(invalid(format!(
            "packet {} announces {} bytes, limit is {}",
            header.id, header.size, MAX_PACKET_SIZE
        )));
    }

    let mut payload = vec![0u8; header.size as usize];
    reader.read_exact(&mut payload)?;
    Ok((header, payload))
}

/// Payload for `SET_CLIENT_NAME`: the name as a NUL-terminated string.
pub fn encode_client_name(name: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(name.len() + 1);
    payload.extend_from_slice(name.as_bytes());
    payload.push(0);
    payload
}

/// Payload for `RGBCONTROLLER_UPDATELEDS`.
///
/// Layout: total size (u32, counting itself), color count (u16), then one
/// `r, g, b, 0` quad per LED.
pub fn encode_update_leds(colors: &[[u8; 3]]) -> io::Result<Vec<u8>> {
    let count = u16::try_from(colors.len())
        .map_err(|_| invalid(format!("{} LEDs exceed the protocol limit", colors.len())))?;
    let size = 4 + 2 + 4 * colors.len();

    let mut payload = Vec::with_capacity(size);
    payload.extend_from_slice(&(size as u32).to_le_bytes());
    payload.extend_from_slice(&count.to_le_bytes());
    for [red, green, blue] in colors {
        payload.extend_from_slice(&[*red, *green, *blue, 0]);
    }
    Ok(payload)
}

/// The parts of a controller description rgbshift uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    pub name: String,
    pub location: String,
    pub zones: Vec<ZoneInfo>,
    pub led_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfo {
    pub name: String,
    pub led_count: u32,
}

/// Parse a `REQUEST_CONTROLLER_DATA` reply (protocol version 0).
pub fn decode_controller_data(payload: &[u8]) -> io::Result<ControllerInfo> {
    let mut r = Cursor::new(payload);

    let data_size = r.u32()? as usize;
    if data_size != payload.len() {
        return Err(invalid(format!(
            "controller data claims {} bytes but packet holds {}",
            data_size,
            payload.len()
        )));
    }

    let _device_type = r.i32()?;
    let name = r.string()?;
    let _description = r.string()?;
    let _version = r.string()?;
    let _serial = r.string()?;
    let location = r.string()?;

    let num_modes = r.u16()?;
    let _active_mode = r.i32()?;
    for _ in 0..num_modes {
        r.string()?; // mode name
        // value, flags, speed min/max, colors min/max, speed, direction, color mode
        r.skip(9 * 4)?;
        let mode_colors = r.u16()? as usize;
        r.skip(mode_colors * 4)?;
    }

    let num_zones = r.u16()?;
    let mut zones = Vec::with_capacity(num_zones as usize);
    for _ in 0..num_zones {
        let zone_name = r.string()?;
        let _zone_type = r.i32()?;
        let _leds_min = r.u32()?;
        let _leds_max = r.u32()?;
        let led_count = r.u32()?;
        let matrix_len = r.u16()? as usize;
        r.skip(matrix_len)?;
        zones.push(ZoneInfo {
            name: zone_name,
            led_count,
        });
    }

    let num_leds = r.u16()?;
    for _ in 0..num_leds {
        r.string()?; // led name
        r.u32()?; // led value
    }

    let num_colors = r.u16()? as usize;
    r.skip(num_colors * 4)?;

    Ok(ControllerInfo {
        name,
        location,
        zones,
        led_count: num_leds as usize,
    })
}

/// Parse a `REQUEST_CONTROLLER_COUNT` reply.
pub fn decode_controller_count(payload: &[u8]) -> io::Result<u32> {
    Cursor::new(payload).u32()
}

/// Bounds-checked little-endian reader over a payload.
struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, len: usize) -> io::Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "payload truncated: wanted {} bytes at offset {}, have {}",
                        len,
                        self.position,
                        self.bytes.len()
                    ),
                )
            })?;
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> io::Result<()> {
        self.take(len).map(|_| ())
    }

    fn u16(&mut self) -> io::Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> io::Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> io::Result<i32> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn string(&mut self) -> io::Result<String> {
        let len = self.u16()? as usize;
        let raw = self.take(len)?;
        let text = raw.strip_suffix(&[0]).unwrap_or(raw);
        Ok(String::from_utf8_lossy(text).into_owned())
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Encoder for controller descriptions, used to stand in for a server in tests.
#[cfg(test)]
pub(crate) mod fixtures {
    fn string(out: &mut Vec<u8>, text: &str) {
        out.extend_from_slice(&((text.len() + 1) as u16).to_le_bytes());
        out.extend_from_slice(text.as_bytes());
        out.push(0);
    }

    /// Controller with one mode and one zone holding `leds` LEDs.
    pub fn controller_data(name: &str, leds: u16) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&0i32.to_le_bytes()); // type
        string(&mut body, name);
        string(&mut body, "test controller");
        string(&mut body, "1.0");
        string(&mut body, "0000");
        string(&mut body, "/dev/test");

        body.extend_from_slice(&1u16.to_le_bytes()); // modes
        body.extend_from_slice(&0i32.to_le_bytes()); // active mode
        string(&mut body, "Direct");
        for _ in 0..9 {
            body.extend_from_slice(&0u32.to_le_bytes());
        }
        body.extend_from_slice(&1u16.to_le_bytes()); // mode colors
        body.extend_from_slice(&[1, 2, 3, 0]);

        body.extend_from_slice(&1u16.to_le_bytes()); // zones
        string(&mut body, "Strip");
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes());
        body.extend_from_slice(&u32::from(leds).to_le_bytes());
        body.extend_from_slice(&u32::from(leds).to_le_bytes());
        // 1x1 matrix: height, width, one entry
        body.extend_from_slice(&12u16.to_le_bytes());
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes());

        body.extend_from_slice(&leds.to_le_bytes());
        for index in 0..leds {
            string(&mut body, &format!("LED {}", index));
            body.extend_from_slice(&u32::from(index).to_le_bytes());
        }

        body.extend_from_slice(&leds.to_le_bytes());
        for _ in 0..leds {
            body.extend_from_slice(&[0, 0, 0, 0]);
        }

        let mut payload = ((body.len() + 4) as u32).to_le_bytes().to_vec();
        payload.extend_from_slice(&body);
        payload
    }
}
