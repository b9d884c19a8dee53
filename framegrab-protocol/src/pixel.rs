//! Pixel and frame byte-layout contract.
//!
//! Frames cross the wire as untagged byte streams, so both ends must agree
//! on geometry and pixel layout ahead of time. [`FrameFormat`] is that
//! agreement, and also knows how to carve the color and grayscale planes out
//! of a raw capture.

/// A captured pixel as the capture hardware writes it: four 8-bit components
/// packed into one 32-bit word.
#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub gray: u8,
}

impl Pixel {
    pub fn from_bytes(bytes: [u8; 4]) -> Pixel {
        Pixel {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
            gray: bytes[3],
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.gray]
    }
}

/// Byte layout of one pixel in a raw frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    /// Four bytes per pixel: R, G, B and a hardware-computed gray component.
    Rgbg,
    /// One byte per pixel, the gray component only.
    Gray,
    /// One byte per pixel, 0 or 255, produced by the binarization pipeline.
    Binary,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgbg => 4,
            PixelFormat::Gray | PixelFormat::Binary => 1,
        }
    }
}

/// Geometry and pixel layout of the frames a server produces.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FrameFormat {
    pub width: u16,
    pub height: u16,
    pub pixel: PixelFormat,
}

impl FrameFormat {
    pub fn new(width: u16, height: u16, pixel: PixelFormat) -> FrameFormat {
        FrameFormat {
            width,
            height,
            pixel,
        }
    }

    /// Number of pixels in one frame.
    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Exact byte count of one raw frame as returned by `capture_frame`.
    pub fn frame_bytes(&self) -> usize {
        self.pixels() * self.pixel.bytes_per_pixel()
    }

    /// Exact byte count of a `get_color` response (RGB, three bytes per
    /// pixel).
    pub fn color_bytes(&self) -> usize {
        self.pixels() * 3
    }

    /// Exact byte count of a `get_gray` response (one byte per pixel).
    pub fn gray_bytes(&self) -> usize {
        self.pixels()
    }

    /// Extracts the RGB plane from a raw frame in this format.
    ///
    /// For RGBG input the gray component is dropped; for single-component
    /// input the one component is replicated into R, G and B.
    pub fn color_plane(&self, raw: &[u8]) -> Box<[u8]> {
        assert_eq!(raw.len(), self.frame_bytes(), "raw frame has wrong size");
        let mut out = Vec::with_capacity(self.color_bytes());
        match self.pixel {
            PixelFormat::Rgbg => {
                for chunk in raw.chunks_exact(4) {
                    let pixel = Pixel::from_bytes(chunk.try_into().expect("chunks are 4 bytes"));
                    out.extend_from_slice(&[pixel.r, pixel.g, pixel.b]);
                }
            }
            PixelFormat::Gray | PixelFormat::Binary => {
                for component in raw {
                    out.extend_from_slice(&[*component; 3]);
                }
            }
        }
        out.into_boxed_slice()
    }

    /// Extracts the grayscale plane from a raw frame in this format.
    pub fn gray_plane(&self, raw: &[u8]) -> Box<[u8]> {
        assert_eq!(raw.len(), self.frame_bytes(), "raw frame has wrong size");
        match self.pixel {
            PixelFormat::Rgbg => raw.iter().skip(3).step_by(4).copied().collect(),
            PixelFormat::Gray | PixelFormat::Binary => raw.into(),
        }
    }
}

impl Default for FrameFormat {
    fn default() -> FrameFormat {
        FrameFormat {
            width: 640,
            height: 480,
            pixel: PixelFormat::Rgbg,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{FrameFormat, Pixel, PixelFormat};

    #[test]
    fn pixel_is_one_packed_word() {
        assert_eq!(std::mem::size_of::<Pixel>(), 4);
        let pixel = Pixel::from_bytes([1, 2, 3, 4]);
        assert_eq!(pixel.gray, 4);
        assert_eq!(pixel.to_bytes(), [1, 2, 3, 4]);
    }

    #[test]
    fn byte_counts() {
        let format = FrameFormat::default();
        assert_eq!(format.frame_bytes(), 640 * 480 * 4);
        assert_eq!(format.color_bytes(), 640 * 480 * 3);
        assert_eq!(format.gray_bytes(), 640 * 480);

        let gray = FrameFormat::new(320, 240, PixelFormat::Gray);
        assert_eq!(gray.frame_bytes(), 320 * 240);
    }

    #[test]
    fn planes_from_rgbg() {
        let format = FrameFormat::new(2, 1, PixelFormat::Rgbg);
        let raw = [10, 20, 30, 40, 50, 60, 70, 80];
        assert_eq!(&*format.color_plane(&raw), &[10, 20, 30, 50, 60, 70]);
        assert_eq!(&*format.gray_plane(&raw), &[40, 80]);
    }

    #[test]
    fn planes_from_gray() {
        let format = FrameFormat::new(2, 1, PixelFormat::Gray);
        let raw = [7, 200];
        assert_eq!(&*format.color_plane(&raw), &[7, 7, 7, 200, 200, 200]);
        assert_eq!(&*format.gray_plane(&raw), &raw);
    }
}
