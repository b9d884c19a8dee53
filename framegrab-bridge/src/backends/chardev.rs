//! # Character Device Backend
//!
//! For boards where the kernel driver owns the capture hardware and exposes
//! it as a character device whose `read` returns exactly one frame. The
//! driver is configured through its own sysfs attributes; this backend only
//! needs to agree with it on the frame format.
//!
//! ## Example Usage
//!
//! ```ignore
//! use framegrab_bridge::backends::chardev::CharDevBackend;
//! use framegrab_protocol::pixel::FrameFormat;
//! use framegrab_server::server::{Server, Config};
//!
//! let backend = CharDevBackend::new("/dev/fpga_camera", FrameFormat::default())?;
//! let mut server = Server::new(backend, Config::default());
//! server.listen("127.0.0.1:36000")?;
//! ```
use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use framegrab_protocol::pixel::FrameFormat;
use framegrab_server::FrameSource;

/// Capture backend reading whole frames from the kernel driver's device
/// node.
pub struct CharDevBackend {
    device: File,
    format: FrameFormat,
}

impl CharDevBackend {
    pub fn new(path: impl AsRef<Path>, format: FrameFormat) -> io::Result<CharDevBackend> {
        let device_path = path.as_ref();
        log::debug!("Opening camera device: {}", device_path.display());
        let device = File::open(device_path)?;
        log::debug!("Camera device opened successfully");
        Ok(CharDevBackend { device, format })
    }

    fn read_frame(&mut self) -> io::Result<Box<[u8]>> {
        let frame_bytes = self.format.frame_bytes();
        log::debug!("Reading {} byte frame from device", frame_bytes);
        let mut frame = vec![0u8; frame_bytes];
        self.device.read_exact(&mut frame)?;
        Ok(frame.into_boxed_slice())
    }
}

impl FrameSource for CharDevBackend {
    fn capture_frame(&mut self) -> io::Result<Box<[u8]>> {
        self.read_frame()
    }

    fn capture_color(&mut self) -> io::Result<Box<[u8]>> {
        let frame = self.read_frame()?;
        Ok(self.format.color_plane(&frame))
    }

    fn capture_gray(&mut self) -> io::Result<Box<[u8]>> {
        let frame = self.read_frame()?;
        Ok(self.format.gray_plane(&frame))
    }
}
