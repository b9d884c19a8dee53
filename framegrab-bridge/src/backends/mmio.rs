//! # Memory-Mapped Backend
//!
//! Drives the capture hardware directly through `/dev/mem`: the camera
//! register window behind the HPS-to-FPGA bridge, and the HPS on-chip RAM
//! that holds the line buffers shared with the capture component.
//!
//! ## Example Usage
//!
//! ```ignore
//! use framegrab_bridge::backends::mmio::{MmioBackend, MmioConfig};
//! use framegrab_server::server::{Server, Config};
//!
//! let backend = MmioBackend::new(MmioConfig::default())?;
//! let mut server = Server::new(backend, Config::default());
//! server.listen("127.0.0.1:36000")?;
//! ```
use std::{
    ffi::c_void,
    fs::{File, OpenOptions},
    io,
    num::NonZero,
    ptr::{NonNull, read_volatile, write_volatile},
    time::Duration,
};

use nix::sys::mman::{MapFlags, ProtFlags, mmap, munmap};

use framegrab_capture::{
    binarizer::{Binarizer, BinarizerDefaults},
    bus::RegisterBus,
    camera::{Camera, ConfigDefaults},
    capture::{CaptureController, CaptureGeometry, LineBuffers},
    regs::{BinarizerMap, RegisterMap},
};
use framegrab_protocol::pixel::FrameFormat;
use framegrab_server::FrameSource;

/// Physical base of the HPS-to-FPGA bridge window on Cyclone V parts.
pub const DEFAULT_BRIDGE_BASE: u64 = 0xC000_0000;
/// Size of the bridge window mapping.
pub const BRIDGE_SPAN: usize = 0x0400_0000;
/// Physical base of the HPS on-chip RAM used for the line buffers. It is
/// the only physically contiguous memory the capture component can reach
/// without a DMA allocator.
pub const DEFAULT_OCR_BASE: u64 = 0xFFFF_0000;
/// Size of the on-chip RAM, 64 KiB.
pub const OCR_SPAN: usize = 64 * 1024;

/// Volatile 32-bit view over a mapped register window.
#[derive(Copy, Clone, Debug)]
struct MmioBus {
    base: *mut u32,
}

impl RegisterBus for MmioBus {
    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: the window stays mapped for the backend's lifetime and
        // offsets come from the register maps, which fit the window.
        unsafe { read_volatile(self.base.add(offset / 4)) }
    }

    fn write32(&self, offset: usize, value: u32) {
        // SAFETY: see read32.
        unsafe { write_volatile(self.base.add(offset / 4), value) }
    }
}

/// Everything revision-specific about the hardware, with the reference
/// revision as `Default`.
#[derive(Clone, Debug)]
pub struct MmioConfig {
    /// Physical base of the bridge window to map.
    pub bridge_base: u64,
    /// Offset of the camera register window within the bridge window.
    pub camera_offset: u64,
    /// Offset of the binarizer threshold window, when the bitstream has one.
    pub binarizer_offset: Option<u64>,
    /// Physical base of the RAM holding the line buffers.
    pub ocr_base: u64,
    pub format: FrameFormat,
    pub lines_per_buffer: u16,
    pub poll_timeout: Duration,
    pub map: RegisterMap,
    pub binarizer_map: BinarizerMap,
    pub defaults: ConfigDefaults,
}

impl Default for MmioConfig {
    fn default() -> MmioConfig {
        MmioConfig {
            bridge_base: DEFAULT_BRIDGE_BASE,
            camera_offset: 0,
            binarizer_offset: None,
            ocr_base: DEFAULT_OCR_BASE,
            format: FrameFormat::default(),
            lines_per_buffer: 8,
            poll_timeout: Duration::from_millis(250),
            map: RegisterMap::default(),
            binarizer_map: BinarizerMap::default(),
            defaults: ConfigDefaults::default(),
        }
    }
}

/// Capture backend that owns the two `/dev/mem` mappings and the capture
/// state machine.
pub struct MmioBackend {
    bridge: NonNull<c_void>,
    ocr: NonNull<c_void>,
    controller: CaptureController<MmioBus>,
    format: FrameFormat,
}

fn map_window(file: &File, base: u64, span: usize) -> io::Result<NonNull<c_void>> {
    log::debug!("Mapping physical window 0x{:x} (size=0x{:x})", base, span);
    // SAFETY: MAP_SHARED mapping of /dev/mem; the kernel validates the
    // physical range, and the pointer is only released in Drop.
    let ptr = unsafe {
        mmap(
            None,
            NonZero::new(span).expect("window spans are nonzero constants"),
            ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
            MapFlags::MAP_SHARED,
            file,
            base as i64,
        )?
    };
    Ok(ptr)
}

impl MmioBackend {
    pub fn new(config: MmioConfig) -> io::Result<MmioBackend> {
        if config.format.height % config.lines_per_buffer != 0 {
            return Err(io::Error::other(format!(
                "frame height {} is not a multiple of {} lines per buffer",
                config.format.height, config.lines_per_buffer
            )));
        }

        let file = OpenOptions::new().read(true).write(true).open("/dev/mem")?;
        let bridge = map_window(&file, config.bridge_base, BRIDGE_SPAN)?;
        let ocr = map_window(&file, config.ocr_base, OCR_SPAN)?;
        log::info!("Register and line-buffer windows mapped successfully");

        let geometry = CaptureGeometry::new(
            config.format.width,
            config.format.height,
            config.lines_per_buffer,
            config.format.pixel.bytes_per_pixel(),
        );
        let needed = 2 * geometry.transfer_bytes();
        if needed > OCR_SPAN {
            return Err(io::Error::other(format!(
                "line buffers need {} bytes, on-chip RAM has {}",
                needed, OCR_SPAN
            )));
        }

        // SAFETY: camera_offset stays within the mapped bridge window.
        let bus = MmioBus {
            base: unsafe {
                bridge
                    .as_ptr()
                    .cast::<u8>()
                    .add(config.camera_offset as usize)
                    .cast::<u32>()
            },
        };

        // Load the sensor configuration and commit it with a stream reset.
        let camera = Camera::new(bus, config.map.clone());
        camera.apply_defaults(&config.defaults);
        camera.update_config();

        if let Some(offset) = config.binarizer_offset {
            // SAFETY: see bus above.
            let binarizer_bus = MmioBus {
                base: unsafe {
                    bridge.as_ptr().cast::<u8>().add(offset as usize).cast::<u32>()
                },
            };
            let binarizer = Binarizer::new(binarizer_bus, config.binarizer_map.clone());
            binarizer.apply_defaults(&BinarizerDefaults::default());
            log::info!("Binarizer thresholds configured at offset 0x{:x}", offset);
        }

        let mut controller =
            CaptureController::new(bus, config.map.clone(), geometry, config.poll_timeout);
        controller.set_buffers(LineBuffers::contiguous(
            config.ocr_base as u32,
            ocr.cast::<u8>(),
            geometry.transfer_bytes(),
        ));

        Ok(MmioBackend {
            bridge,
            ocr,
            controller,
            format: config.format,
        })
    }
}

impl Drop for MmioBackend {
    fn drop(&mut self) {
        // SAFETY: both pointers came from mmap with these spans and are not
        // used after this point.
        unsafe {
            let _ = munmap(self.bridge, BRIDGE_SPAN);
            let _ = munmap(self.ocr, OCR_SPAN);
        }
    }
}

impl FrameSource for MmioBackend {
    fn capture_frame(&mut self) -> io::Result<Box<[u8]>> {
        let mut frame = vec![0u8; self.controller.geometry().frame_bytes()];
        self.controller
            .get_frame(&mut frame)
            .map_err(io::Error::other)?;
        Ok(frame.into_boxed_slice())
    }

    fn capture_color(&mut self) -> io::Result<Box<[u8]>> {
        let frame = self.capture_frame()?;
        Ok(self.format.color_plane(&frame))
    }

    fn capture_gray(&mut self) -> io::Result<Box<[u8]>> {
        let frame = self.capture_frame()?;
        Ok(self.format.gray_plane(&frame))
    }
}
