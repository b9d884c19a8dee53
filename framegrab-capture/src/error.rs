use std::{error::Error, fmt::Display};

/// Errors that may occur while capturing a frame.
///
/// The first three variants are hardware outcomes of the capture handshake
/// and are surfaced as distinct values so the caller can decide between
/// retry, reset and abort; the controller itself never retries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CaptureError {
    /// The capture component never reported standby before the poll
    /// deadline. It is held in reset or not connected to the bus. Calling
    /// `start_capture` again is safe and resynchronizes.
    NoReply,
    /// The target buffer already reported full on entry to `get_line`: the
    /// consumer ran slower than the pixel clock and line data was (or is
    /// about to be) overwritten. Reduce the frame rate and restart the
    /// capture.
    BufferFullNoWait,
    /// The buffer-full flag never rose before the poll deadline. The video
    /// stream is not progressing, most likely because the stream side of the
    /// component is in reset.
    Timeout,
    /// No line buffers were configured before starting a capture.
    BuffersNotSet,
    /// The output slice does not match the configured frame size.
    SizeMismatch { expected: usize, got: usize },
}

impl Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::NoReply => {
                write!(f, "capture component did not reach standby (reset or disconnected)")
            }
            CaptureError::BufferFullNoWait => {
                write!(f, "line buffer already full on entry, line data lost")
            }
            CaptureError::Timeout => write!(f, "timed out waiting for a line, stream stalled"),
            CaptureError::BuffersNotSet => write!(f, "no line buffers configured"),
            CaptureError::SizeMismatch { expected, got } => {
                write!(f, "frame buffer has {} bytes, expected {}", got, expected)
            }
        }
    }
}

impl Error for CaptureError {}
