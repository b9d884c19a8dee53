use std::fmt::Display;

/// A Request is transferred from the client to the server.
/// For each request, the client is expected to send the command line and wait
/// for the complete response before issuing the next one. The server
/// processes requests strictly in the order received; only one connection at
/// a time is assumed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Request {
    /// Capture one frame and return its raw bytes in the pixel layout the
    /// server was configured with.
    CaptureFrame,
    /// Capture one frame and return only the RGB color plane, three bytes
    /// per pixel.
    GetColor,
    /// Capture one frame and return only the grayscale plane, one byte per
    /// pixel.
    GetGray,
    /// Ask the server to close the connection. Answered with `bye\n`.
    Quit,
}

impl Request {
    /// The ASCII command word for this request, without the terminating
    /// newline.
    pub fn command(&self) -> &'static str {
        match self {
            Request::CaptureFrame => "capture_frame",
            Request::GetColor => "get_color",
            Request::GetGray => "get_gray",
            Request::Quit => "quit",
        }
    }
}

impl Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Response sent by the server once a request has been processed.
///
/// Frame payloads are untagged byte streams; the other two variants are the
/// literal lines the protocol fixes for unknown commands and for `quit`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    /// Raw frame data. The length is implied by the out-of-band
    /// [`crate::pixel::FrameFormat`], never announced on the wire.
    Frame(Box<[u8]>),
    /// Reply to a line that parsed as no known command.
    Unknown,
    /// Reply to `quit`, sent immediately before the connection is dropped.
    Bye,
}

/// The literal reply to an unrecognized command.
pub const UNKNOWN_COMMAND_RESPONSE: &[u8] = b"unknown command\n";
/// The literal reply to `quit`.
pub const BYE_RESPONSE: &[u8] = b"bye\n";
