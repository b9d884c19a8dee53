/// Read and write implementations for the protocol messages
use std::io::{self, BufRead, Read, Write};

use crate::{
    error::ReadError,
    protocol::{BYE_RESPONSE, Request, Response, UNKNOWN_COMMAND_RESPONSE},
};

/// Longest command line (including the newline) the parser accepts. Every
/// defined command fits comfortably; anything longer is garbage or an attempt
/// to exhaust the server.
pub const MAX_COMMAND_LEN: usize = 32;

impl Request {
    /// Parses a command word with line terminators already stripped.
    /// Returns `None` when the word matches no known command.
    pub fn parse(command: &[u8]) -> Option<Request> {
        match command {
            b"capture_frame" => Some(Request::CaptureFrame),
            b"get_color" => Some(Request::GetColor),
            b"get_gray" => Some(Request::GetGray),
            b"quit" => Some(Request::Quit),
            _ => None,
        }
    }

    /// Reads one newline-terminated command from `reader`.
    ///
    /// The reader must be buffered so that no bytes past the newline are
    /// consumed; the server keeps one [`io::BufReader`] per connection for
    /// exactly this reason.
    pub fn from_reader(reader: &mut impl BufRead) -> Result<Request, ReadError> {
        let mut line = Vec::with_capacity(MAX_COMMAND_LEN);
        let n = reader
            .take(MAX_COMMAND_LEN as u64)
            .read_until(b'\n', &mut line)?;
        if n == 0 {
            return Err(ReadError::Disconnected);
        }
        if !line.ends_with(b"\n") {
            if n == MAX_COMMAND_LEN {
                return Err(ReadError::CommandTooLong(n));
            }
            // EOF in the middle of a command line
            return Err(ReadError::Disconnected);
        }

        // Remove the newline and a tolerated trailing '\r'
        let command = line.trim_ascii_end();
        Request::parse(command)
            .ok_or_else(|| ReadError::UnknownCommand(String::from_utf8_lossy(command).to_string()))
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writer.write_all(self.command().as_bytes())?;
        writer.write_all(b"\n")
    }
}

impl Response {
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        match self {
            Response::Frame(data) => writer.write_all(data),
            Response::Unknown => writer.write_all(UNKNOWN_COMMAND_RESPONSE),
            Response::Bye => writer.write_all(BYE_RESPONSE),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::error::ReadError;
    use crate::protocol::{Request, Response};
    use std::io::Cursor;

    #[test]
    fn read_capture_frame() {
        let mut cursor = Cursor::new(b"capture_frame\n".to_vec());
        assert_eq!(
            Request::from_reader(&mut cursor).unwrap(),
            Request::CaptureFrame
        );
    }

    #[test]
    fn read_tolerates_crlf() {
        let mut cursor = Cursor::new(b"get_color\r\n".to_vec());
        assert_eq!(Request::from_reader(&mut cursor).unwrap(), Request::GetColor);
    }

    #[test]
    fn read_consumes_exactly_one_line() {
        let mut cursor = Cursor::new(b"get_gray\nquit\n".to_vec());
        assert_eq!(Request::from_reader(&mut cursor).unwrap(), Request::GetGray);
        assert_eq!(Request::from_reader(&mut cursor).unwrap(), Request::Quit);
    }

    #[test]
    fn write_requests() {
        for (request, expected) in [
            (Request::CaptureFrame, b"capture_frame\n".to_vec()),
            (Request::GetColor, b"get_color\n".to_vec()),
            (Request::GetGray, b"get_gray\n".to_vec()),
            (Request::Quit, b"quit\n".to_vec()),
        ] {
            let mut out = Vec::new();
            request.write_to(&mut out).unwrap();
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn unknown_command() {
        let mut cursor = Cursor::new(b"reboot\n".to_vec());
        match Request::from_reader(&mut cursor) {
            Err(ReadError::UnknownCommand(cmd)) => assert_eq!(cmd, "reboot"),
            other => panic!("expected UnknownCommand, got {:?}", other),
        }
    }

    #[test]
    fn command_without_newline_is_rejected() {
        let mut cursor = Cursor::new(vec![b'x'; 100]);
        match Request::from_reader(&mut cursor) {
            Err(ReadError::CommandTooLong(got)) => assert_eq!(got, crate::codec::MAX_COMMAND_LEN),
            other => panic!("expected CommandTooLong, got {:?}", other),
        }
    }

    #[test]
    fn disconnect_at_boundary() {
        let mut cursor = Cursor::new(Vec::new());
        match Request::from_reader(&mut cursor) {
            Err(ReadError::Disconnected) => {}
            other => panic!("expected Disconnected, got {:?}", other),
        }
    }

    #[test]
    fn write_fixed_responses() {
        let mut out = Vec::new();
        Response::Unknown.write_to(&mut out).unwrap();
        assert_eq!(out, b"unknown command\n".to_vec());

        out.clear();
        Response::Bye.write_to(&mut out).unwrap();
        assert_eq!(out, b"bye\n".to_vec());
    }

    #[test]
    fn write_frame_response_is_raw() {
        let payload = vec![0u8, 1, 2, 255];
        let mut out = Vec::new();
        Response::Frame(payload.clone().into_boxed_slice())
            .write_to(&mut out)
            .unwrap();
        assert_eq!(out, payload);
    }
}
