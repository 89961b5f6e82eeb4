use std::{
    net::{SocketAddr, UdpSocket},
    str::FromStr,
};

use palette::Srgb;
use rosc::{encoder, OscMessage, OscPacket, OscType};

use crate::pixels::{scale, PixelOutput};

const UNIVERSE_SIZE: usize = 512;

/// Sends the pixel row to an OLA daemon as one DMX universe, three channels per pixel.
pub struct OlaOutput {
    sock: UdpSocket,
    target_addr: SocketAddr,
    universe_addr: String,
    pixel_count: usize,
    brightness: f32,
    buffer: Vec<u8>,
}

impl OlaOutput {
    pub fn new(
        target_addr: SocketAddr,
        universe: u16,
        pixel_count: usize,
        brightness: f32,
    ) -> Result<Self, String> {
        if pixel_count * 3 > UNIVERSE_SIZE {
            return Err(format!(
                "{} pixels need {} channels, a DMX universe has {}",
                pixel_count,
                pixel_count * 3,
                UNIVERSE_SIZE
            ));
        }

        let our_addr = if target_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let our_addr = match SocketAddr::from_str(our_addr) {
            Ok(addr) => addr,
            Err(error) => return Err(error.to_string()),
        };
        let sock = match UdpSocket::bind(our_addr) {
            Ok(sock) => sock,
            Err(error) => return Err(error.to_string()),
        };

        Ok(OlaOutput {
            sock,
            target_addr,
            universe_addr: format!("/dmx/universe/{}", universe),
            pixel_count,
            brightness,
            buffer: vec![0; UNIVERSE_SIZE],
        })
    }

    fn packet(&self) -> Result<Vec<u8>, String> {
        let packet = OscPacket::Message(OscMessage {
            addr: self.universe_addr.clone(),
            args: vec![OscType::Blob(Vec::clone(&self.buffer))],
        });
        match encoder::encode(&packet) {
            Ok(msg_buf) => Ok(msg_buf),
            Err(err) => Err(format!("{:?}", err)),
        }
    }
}

impl PixelOutput for OlaOutput {
    fn len(&self) -> usize {
        self.pixel_count
    }

    fn set(&mut self, index: usize, color: Srgb<u8>) {
        assert!(index < self.pixel_count);
        let (r, g, b) = scale(color, self.brightness).into_components();
        let start_channel = index * 3;
        self.buffer[start_channel..start_channel + 3].copy_from_slice(&[r, g, b]);
    }

    fn flush(&mut self) {
        let msg_buf = match self.packet() {
            Ok(msg_buf) => msg_buf,
            Err(err) => {
                log::warn!("Failed to encode {}: {}", self.universe_addr, err);
                return;
            }
        };

        if let Err(err) = self.sock.send_to(&msg_buf, self.target_addr) {
            log::warn!("Failed to send frame to {}: {}", self.target_addr, err);
        }
    }
}
