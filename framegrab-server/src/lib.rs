//! # Framegrab Server Library
//!
//! This crate provides a foundation for implementing camera frame servers
//! that expose FPGA frame capture over network connections.
//!
//! ## Overview
//!
//! The capture hardware sits on an FPGA board; clients elsewhere on the
//! network want frames from it. This library abstracts the protocol handling
//! and provides a server implementation that can work with different capture
//! backends.
//!
//! ## Architecture
//!
//! The crate is built around two main components:
//!
//! - **[`FrameSource`] Trait**: Defines the interface that capture backends
//!   must implement to produce frames (raw, color plane, gray plane)
//! - **[`server::Server`]**: A generic server that handles protocol
//!   communication, request parsing, and client connections
//!
//! ## How It Works
//!
//! 1. A capture backend (memory-mapped registers, character device, or a
//!    simulation) implements the [`FrameSource`] trait
//! 2. The backend is wrapped in a [`server::Server`] instance
//! 3. The server listens for TCP connections and processes protocol requests
//! 4. Each request is dispatched to the backend for the actual capture
//! 5. Frame bytes are sent back to the client
//!
//! ## Protocol Support
//!
//! The newline-terminated command protocol with the following requests:
//!
//! - **capture_frame**: Capture one frame, return its raw bytes
//! - **get_color**: Capture one frame, return the RGB plane
//! - **get_gray**: Capture one frame, return the grayscale plane
//! - **quit**: Close the connection (answered with `bye\n`)
//!
//! Unrecognized command lines are answered with `unknown command\n` and the
//! connection stays open. For wire details, see the `framegrab-protocol`
//! crate.
//!
//! ## Error Handling
//!
//! The protocol has no error channel for captures. If a capture fails, the
//! server logs the failure and sends nothing; the client's read timeout is
//! the only signal. Socket-level errors close the connection.
//!
//! ## Configuration
//!
//! Server behavior can be customized via [`server::Config`]:
//!
//! - **read_write_timeout**: Socket I/O timeout duration (default: 30 seconds)
//!
//! ## Logging
//!
//! This crate uses the `log` crate for diagnostics. Enable logging to see
//! client connections, requests being processed and capture failures.
//! Configure logging with an implementation like `env_logger`.
//!
//! ## Thread Model
//!
//! The server processes each client connection sequentially in a single
//! thread, which matches the hardware: there is one capture pipeline, and a
//! second in-flight capture would corrupt the buffer handshake.

pub mod server;

use std::io;

/// Trait that capture backends must implement to provide frames.
///
/// This trait is the seam between the protocol server and the actual
/// capture hardware. Implementors are responsible for producing one
/// complete frame per call, in the byte layouts the protocol fixes.
///
/// Methods take `&mut self` because real backends mutate capture state (the
/// double-buffer handshake tracks which buffer the hardware owns).
pub trait FrameSource {
    /// Captures one frame and returns its raw bytes in the backend's
    /// configured pixel layout, row-major, exactly
    /// `width * height * bytes_per_pixel` long.
    fn capture_frame(&mut self) -> io::Result<Box<[u8]>>;

    /// Captures one frame and returns the RGB color plane, three bytes per
    /// pixel.
    fn capture_color(&mut self) -> io::Result<Box<[u8]>>;

    /// Captures one frame and returns the grayscale plane, one byte per
    /// pixel.
    fn capture_gray(&mut self) -> io::Result<Box<[u8]>>;
}
