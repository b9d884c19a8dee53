//! # Framegrab Capture Library
//!
//! Register-level driver for an FPGA camera capture pipeline reached through
//! a memory-mapped register window (an Avalon slave behind the HPS-to-FPGA
//! bridge on SoC parts).
//!
//! ## Architecture
//!
//! The crate is built around three pieces:
//!
//! - **[`bus::RegisterBus`] Trait**: raw 32-bit read/write at byte offsets
//!   into a hardware register window. Backends provide the mapping (volatile
//!   MMIO in production, an in-memory bank in tests).
//! - **[`camera::Camera`]**: typed accessors over the camera configuration
//!   registers (geometry, exposure, blanking, gains) plus the soft-reset
//!   pulse that commits a staged configuration.
//! - **[`capture::CaptureController`]**: the double-buffered scanline
//!   handshake with the capture component. Software and hardware alternate
//!   ownership of two physically contiguous line buffers; the controller
//!   polls the buffer-full flags, acknowledges each completed transfer and
//!   assembles full frames in processor memory.
//!
//! Register offsets and configuration defaults vary between bitstream
//! revisions, so both are plain data: [`regs::RegisterMap`] and
//! [`camera::ConfigDefaults`] carry the canonical layout via `Default` and
//! can be overridden per device.
//!
//! ## How a Frame Is Captured
//!
//! 1. The caller hands the controller a [`capture::LineBuffers`] pair —
//!    physical addresses for the hardware, one virtual window for software.
//! 2. `start_capture` writes geometry and buffer addresses, waits for the
//!    component's standby flag, clears stale buffer-full flags and pulses
//!    the start register.
//! 3. Each `get_line` call waits for the current target buffer to fill,
//!    acknowledges it and returns its contents while the hardware writes
//!    the other buffer.
//! 4. `get_frame` repeats this `height / lines_per_buffer` times, copying
//!    each transfer into its row-major slot of the output frame.
//!
//! There are no interrupts on this interface: completion is observed by
//! polling under a wall-clock deadline. The three hardware-visible failure
//! modes are surfaced as [`error::CaptureError`] variants and never retried
//! internally.
//!
//! ## Simulation
//!
//! The [`mock`] module contains an in-memory register bank and a scripted
//! capture-component simulation, so the full handshake can be exercised
//! without hardware.
//!
//! ## Logging
//!
//! This crate uses the `log` crate for diagnostics. Enable a logger
//! implementation such as `env_logger` to see capture progress and error
//! conditions.

pub mod binarizer;
pub mod bus;
pub mod camera;
pub mod capture;
pub mod error;
pub mod mock;
pub mod regs;
