//! # Framegrab Protocol Library
//!
//! This crate implements the control protocol spoken between camera frame
//! servers and their clients, together with the byte-layout contract of the
//! frames that travel over the same connection.
//!
//! ## Overview
//!
//! The capture hardware lives behind a TCP server on the FPGA board. Clients
//! drive it with a small set of newline-terminated ASCII commands and read
//! raw frame data back. This library implements both directions, allowing
//! you to:
//!
//! - Parse and serialize control requests
//! - Describe frame geometry and pixel layout ([`pixel::FrameFormat`])
//! - Extract color and grayscale planes from captured RGBG frames
//!
//! ## Protocol Features
//!
//! - **Commands**:
//!   - `capture_frame`: capture one frame and return its raw bytes
//!   - `get_color`: capture one frame and return the RGB plane
//!   - `get_gray`: capture one frame and return the grayscale plane
//!   - `quit`: close the connection
//!
//! ## Basic Usage
//!
//! ### Reading Requests from a Client
//!
//! ```
//! use framegrab_protocol::Request;
//! use std::io::Cursor;
//!
//! let mut reader = Cursor::new(b"capture_frame\n");
//! let request = Request::from_reader(&mut reader).expect("Request should parse");
//! assert_eq!(request, Request::CaptureFrame);
//! ```
//!
//! ### Writing Requests to a Server
//!
//! ```
//! use framegrab_protocol::Request;
//!
//! let mut buffer = Vec::new();
//! Request::GetGray.write_to(&mut buffer).expect("Writing to vector shouldn't fail");
//! // Send buffer to server...
//! assert_eq!(buffer, b"get_gray\n");
//! ```
//!
//! ### Sizing the Response
//!
//! ```
//! use framegrab_protocol::pixel::{FrameFormat, PixelFormat};
//!
//! let format = FrameFormat::new(640, 480, PixelFormat::Rgbg);
//! assert_eq!(format.frame_bytes(), 640 * 480 * 4);
//! assert_eq!(format.gray_bytes(), 640 * 480);
//! ```
//!
//! ## Message Format
//!
//! Every command is a single ASCII line terminated by `\n` (a trailing `\r`
//! is tolerated). Responses are untagged:
//!
//! - `capture_frame`/`get_color`/`get_gray`: exactly the number of bytes
//!   implied by the out-of-band [`pixel::FrameFormat`], row-major
//! - an unrecognized command: the literal line `unknown command\n`
//! - `quit`: the literal line `bye\n`, after which the server drops the
//!   connection
//!
//! The protocol carries no error channel: a server that fails to capture
//! sends nothing, and clients must rely on their read timeout.
//!
//! ## Error Handling
//!
//! This library uses the [`error::ReadError`] type for protocol parsing
//! errors.
//!
//! ## Thread Safety
//!
//! The types in this library are thread-safe and can be safely shared across
//! threads. However, I/O operations (reading/writing) are not synchronized
//! and require external coordination.

pub mod protocol;
pub use protocol::*;
pub mod codec;
pub mod error;
#[cfg(feature = "tokio")]
pub mod framed;
pub mod pixel;
