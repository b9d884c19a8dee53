//! Double-buffered scanline capture.
//!
//! The capture component streams the sensor's video into two line buffers in
//! processor memory, alternating between them and latching a full flag each
//! time one completes. Software drains the completed buffer while the
//! hardware fills the other; ownership of each buffer strictly alternates on
//! every completed transfer. The handshake is protocol discipline only —
//! check the flag before reading, clear it after — with no interrupt line
//! and no lock, so completion is observed by polling under a wall-clock
//! deadline.

use std::ptr::NonNull;
use std::time::{Duration, Instant};

use crate::bus::RegisterBus;
use crate::error::CaptureError;
use crate::regs::RegisterMap;

/// Geometry of one capture: frame dimensions, how many scanlines the
/// hardware packs into each buffer transfer, and the pixel width.
///
/// `height` must be a multiple of `lines_per_buffer`; the constructor
/// panics otherwise.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CaptureGeometry {
    width: u16,
    height: u16,
    lines_per_buffer: u16,
    bytes_per_pixel: usize,
}

impl CaptureGeometry {
    pub fn new(
        width: u16,
        height: u16,
        lines_per_buffer: u16,
        bytes_per_pixel: usize,
    ) -> CaptureGeometry {
        assert!(lines_per_buffer > 0, "lines_per_buffer must be nonzero");
        assert!(
            height % lines_per_buffer == 0,
            "frame height must be a multiple of lines_per_buffer"
        );
        CaptureGeometry {
            width,
            height,
            lines_per_buffer,
            bytes_per_pixel,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn lines_per_buffer(&self) -> u16 {
        self.lines_per_buffer
    }

    /// Size in bytes of one buffer transfer (`lines_per_buffer` scanlines).
    pub fn transfer_bytes(&self) -> usize {
        self.width as usize * self.lines_per_buffer as usize * self.bytes_per_pixel
    }

    /// Number of buffer transfers needed for one full frame.
    pub fn transfers(&self) -> usize {
        (self.height / self.lines_per_buffer) as usize
    }

    /// Size in bytes of one assembled frame.
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel
    }
}

/// The line-buffer pair shared between software and the capture hardware.
///
/// Both buffers live in one physically contiguous allocation: buffer 0 at
/// the start, buffer 1 one transfer further. The physical addresses are
/// handed to the hardware; the virtual window is what software reads
/// completed transfers through.
#[derive(Copy, Clone, Debug)]
pub struct LineBuffers {
    buff0_phys: u32,
    buff1_phys: u32,
    window: NonNull<u8>,
}

impl LineBuffers {
    /// Describes a buffer pair for the controller.
    ///
    /// The caller guarantees that `window` maps the same memory the physical
    /// addresses name, that it covers two transfers, and that the mapping
    /// outlives the controller. The hardware writes this memory while a
    /// capture is in flight; software must only touch the half it currently
    /// owns, which the controller enforces by construction.
    pub fn new(buff0_phys: u32, buff1_phys: u32, window: NonNull<u8>) -> LineBuffers {
        LineBuffers {
            buff0_phys,
            buff1_phys,
            window,
        }
    }

    /// Buffer pair carved out of a single contiguous region: buffer 1
    /// starts `transfer_bytes` past `phys`.
    pub fn contiguous(phys: u32, window: NonNull<u8>, transfer_bytes: usize) -> LineBuffers {
        LineBuffers::new(phys, phys + transfer_bytes as u32, window)
    }
}

/// Which buffer the hardware is filling next.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Target {
    Buff0,
    Buff1,
}

impl Target {
    fn flipped(self) -> Target {
        match self {
            Target::Buff0 => Target::Buff1,
            Target::Buff1 => Target::Buff0,
        }
    }
}

/// Drives the capture component's state machine over a register window.
///
/// One instance per physical camera. The controller tracks which buffer the
/// hardware is filling; the component has no current-buffer register, so
/// calling any capture operation from two threads at once would desynchronize
/// that tracking — the API takes `&mut self` to rule it out.
#[derive(Debug)]
pub struct CaptureController<B> {
    bus: B,
    map: RegisterMap,
    geometry: CaptureGeometry,
    buffers: Option<LineBuffers>,
    target: Target,
    poll_timeout: Duration,
}

impl<B: RegisterBus> CaptureController<B> {
    /// Creates a controller for the capture component behind `bus`.
    ///
    /// `poll_timeout` bounds every standby and line wait. The component has
    /// no interrupt line, so waits burn CPU until the flag rises or the
    /// deadline expires.
    pub fn new(
        bus: B,
        map: RegisterMap,
        geometry: CaptureGeometry,
        poll_timeout: Duration,
    ) -> CaptureController<B> {
        CaptureController {
            bus,
            map,
            geometry,
            buffers: None,
            target: Target::Buff0,
            poll_timeout,
        }
    }

    pub fn geometry(&self) -> CaptureGeometry {
        self.geometry
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Records the buffer pair used for subsequent captures. Pure
    /// assignment; nothing is written to hardware until `start_capture`.
    pub fn set_buffers(&mut self, buffers: LineBuffers) {
        self.buffers = Some(buffers);
    }

    /// Arms the capture component and starts acquiring a new frame.
    ///
    /// Writes the transfer geometry and both buffer addresses, waits for the
    /// component to reach standby, clears any latched buffer-full flags and
    /// pulses the start register.
    ///
    /// Safe to call again without waiting for a previous capture to finish:
    /// the standby wait resynchronizes with the hardware regardless of how
    /// the previous acquisition ended. Fails with
    /// [`CaptureError::NoReply`] when standby is never observed, which means
    /// the component is held in reset or not connected to the bus.
    pub fn start_capture(&mut self) -> Result<(), CaptureError> {
        let buffers = self.buffers.ok_or(CaptureError::BuffersNotSet)?;

        log::debug!(
            "starting capture: {}x{}, {} lines per buffer, buffers 0x{:08x}/0x{:08x}",
            self.geometry.width(),
            self.geometry.height(),
            self.geometry.lines_per_buffer(),
            buffers.buff0_phys,
            buffers.buff1_phys,
        );

        self.bus.write32(self.map.buff0, buffers.buff0_phys);
        self.bus.write32(self.map.buff1, buffers.buff1_phys);
        // The component counts in transfers, not scanlines: each "row" it
        // sees is lines_per_buffer real rows wide.
        self.bus.write32(
            self.map.capture_width,
            self.geometry.width() as u32 * self.geometry.lines_per_buffer() as u32,
        );
        self.bus
            .write32(self.map.capture_height, self.geometry.transfers() as u32);

        if !self.poll_until_set(self.map.standby) {
            return Err(CaptureError::NoReply);
        }

        // In standby the component has reset its own counters; clear the
        // latched full flags in case the previous capture ended badly.
        self.bus.write32(self.map.buff0_full, 0);
        self.bus.write32(self.map.buff1_full, 0);
        self.target = Target::Buff0;

        // Rising edge starts the acquisition.
        self.bus.write32(self.map.start_capture, 1);
        self.bus.write32(self.map.start_capture, 0);

        Ok(())
    }

    /// Waits for the next buffer transfer and returns its contents.
    ///
    /// Each call advances exactly one transfer: it waits on the buffer the
    /// hardware is currently filling, acknowledges it by clearing its full
    /// flag and flips the internal target so the next call waits on the
    /// other buffer. The returned slice must be consumed before the next
    /// call, when the hardware gets the buffer back.
    ///
    /// Fails with [`CaptureError::BufferFullNoWait`] when the flag was
    /// already set on entry (this caller is running slower than the pixel
    /// clock and data was lost) and with [`CaptureError::Timeout`] when the
    /// flag never rises (the stream is stalled). Neither failure clears a
    /// flag or flips the target.
    pub fn get_line(&mut self) -> Result<&[u8], CaptureError> {
        let buffers = self.buffers.ok_or(CaptureError::BuffersNotSet)?;
        let transfer_bytes = self.geometry.transfer_bytes();
        let (full_flag, window_offset) = match self.target {
            Target::Buff0 => (self.map.buff0_full, 0),
            Target::Buff1 => (self.map.buff1_full, transfer_bytes),
        };

        if self.bus.read32(full_flag) != 0 {
            return Err(CaptureError::BufferFullNoWait);
        }
        if !self.poll_until_set(full_flag) {
            return Err(CaptureError::Timeout);
        }

        // Acknowledge the transfer; the hardware may reuse this buffer after
        // the other one fills.
        self.bus.write32(full_flag, 0);
        self.target = self.target.flipped();

        // SAFETY: LineBuffers::new requires the window to cover both
        // transfers and to stay mapped. The hardware is now filling the
        // other buffer, so this half is stable until the next call, which
        // reborrows self mutably and ends this borrow.
        let line = unsafe {
            std::slice::from_raw_parts(buffers.window.as_ptr().add(window_offset), transfer_bytes)
        };
        Ok(line)
    }

    /// Captures a whole frame into `frame`, row-major.
    ///
    /// Starts a capture and performs exactly `height / lines_per_buffer`
    /// line waits, copying transfer `i` into
    /// `frame[i * transfer_bytes ..]`. Aborts on the first error,
    /// propagating its kind; whatever was copied before the failure is left
    /// in place, so a failed result invalidates the whole buffer.
    pub fn get_frame(&mut self, frame: &mut [u8]) -> Result<(), CaptureError> {
        let expected = self.geometry.frame_bytes();
        if frame.len() != expected {
            return Err(CaptureError::SizeMismatch {
                expected,
                got: frame.len(),
            });
        }

        self.start_capture()?;

        let transfer_bytes = self.geometry.transfer_bytes();
        for index in 0..self.geometry.transfers() {
            let line = match self.get_line() {
                Ok(line) => line,
                Err(e) => {
                    log::error!("capture failed at transfer {}: {}", index, e);
                    return Err(e);
                }
            };
            frame[index * transfer_bytes..(index + 1) * transfer_bytes].copy_from_slice(line);
            log::trace!("transfer {} of {} assembled", index + 1, self.geometry.transfers());
        }
        Ok(())
    }

    /// Polls `offset` until it reads nonzero. Returns false once the
    /// wall-clock deadline expires without seeing the flag.
    fn poll_until_set(&self, offset: usize) -> bool {
        let deadline = Instant::now() + self.poll_timeout;
        loop {
            if self.bus.read32(offset) != 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
        }
    }
}
