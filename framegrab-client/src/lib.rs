//! # Framegrab Client
//!
//! A client library for connecting to framegrab camera servers and
//! retrieving frames from FPGA capture hardware over the network.
//!
//! ## Overview
//!
//! This crate provides a high-level client interface to frame servers. It
//! handles command serialization and reads the exact response byte counts
//! the negotiated frame format implies.
//!
//! ## Basic Usage
//!
//! ### Connecting to a Server
//!
//! ```ignore
//! use framegrab_client::FrameClient;
//! use framegrab_protocol::pixel::FrameFormat;
//!
//! let mut client = FrameClient::connect("127.0.0.1:36000", FrameFormat::default())?;
//! ```
//!
//! ### Capturing Frames
//!
//! ```ignore
//! // One raw frame in the server's pixel layout
//! let frame = client.capture_frame()?;
//!
//! // Only the planes
//! let rgb = client.get_color()?;
//! let gray = client.get_gray()?;
//!
//! client.quit()?;
//! ```
//!
//! ## Failure Signaling
//!
//! The protocol has no error channel: a server whose capture fails sends
//! nothing. Set a read timeout ([`FrameClient::set_read_timeout`]) so a
//! failed capture surfaces as a timeout error instead of blocking forever.
//!
//! ## Related Crates
//!
//! - `framegrab-server` - Server implementation
//! - `framegrab-protocol` - Protocol encoding/decoding and frame layout
//! - `framegrab-bridge` - Hardware capture backends

use std::{
    io::{self, Read},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use framegrab_protocol::{Request, pixel::FrameFormat};

/// Client for retrieving frames from a framegrab server.
///
/// The frame format is agreed out of band: the server never announces the
/// size of a frame, so the client must be constructed with the same format
/// the server was started with.
pub struct FrameClient {
    tcp: TcpStream,
    format: FrameFormat,
}

impl FrameClient {
    pub fn connect(addr: impl ToSocketAddrs, format: FrameFormat) -> io::Result<FrameClient> {
        Ok(FrameClient {
            tcp: TcpStream::connect(addr)?,
            format,
        })
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Bounds every response read. Without a timeout a failed capture on
    /// the server side blocks this client forever.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.tcp.set_read_timeout(timeout)
    }

    /// Capture one frame and return its raw bytes
    /// (`width * height * bytes_per_pixel`, row-major).
    pub fn capture_frame(&mut self) -> io::Result<Box<[u8]>> {
        self.request(Request::CaptureFrame, self.format.frame_bytes())
    }

    /// Capture one frame and return the RGB plane (three bytes per pixel).
    pub fn get_color(&mut self) -> io::Result<Box<[u8]>> {
        self.request(Request::GetColor, self.format.color_bytes())
    }

    /// Capture one frame and return the grayscale plane (one byte per
    /// pixel).
    pub fn get_gray(&mut self) -> io::Result<Box<[u8]>> {
        self.request(Request::GetGray, self.format.gray_bytes())
    }

    /// Closes the connection after the server's `bye` handshake.
    pub fn quit(mut self) -> io::Result<()> {
        Request::Quit.write_to(&mut self.tcp)?;
        let mut reply = [0u8; 4];
        self.tcp.read_exact(&mut reply)?;
        if &reply != b"bye\n" {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "unexpected quit reply",
            ));
        }
        Ok(())
    }

    fn request(&mut self, request: Request, response_len: usize) -> io::Result<Box<[u8]>> {
        request.write_to(&mut self.tcp)?;
        let mut buf = vec![0; response_len];
        self.tcp.read_exact(&mut buf)?;
        Ok(buf.into_boxed_slice())
    }
}
