//! `tokio_util` codec for the command stream, for async transports.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{codec::MAX_COMMAND_LEN, error::ReadError, protocol::Request};

/// Frames the newline-terminated command stream.
///
/// Decoding yields one [`Request`] per complete line; encoding appends the
/// command word plus newline.
#[derive(Copy, Clone, Debug, Default)]
pub struct RequestCodec;

impl Decoder for RequestCodec {
    type Item = Request;
    type Error = ReadError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Request>, ReadError> {
        let Some(newline) = src.iter().position(|byte| *byte == b'\n') else {
            if src.len() >= MAX_COMMAND_LEN {
                return Err(ReadError::CommandTooLong(src.len()));
            }
            return Ok(None);
        };
        let line = src.split_to(newline + 1);
        let command = line.trim_ascii_end();
        Request::parse(command)
            .ok_or_else(|| ReadError::UnknownCommand(String::from_utf8_lossy(command).to_string()))
            .map(Some)
    }
}

impl Encoder<Request> for RequestCodec {
    type Error = ReadError;

    fn encode(&mut self, item: Request, dst: &mut BytesMut) -> Result<(), ReadError> {
        dst.put_slice(item.command().as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::RequestCodec;
    use crate::{error::ReadError, protocol::Request};
    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    #[test]
    fn decode_incomplete_line() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::from(&b"capture_"[..]);
        assert!(matches!(codec.decode(&mut buf), Ok(None)));
    }

    #[test]
    fn decode_two_commands() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::from(&b"capture_frame\nquit\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Request::CaptureFrame));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Request::Quit));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn decode_oversized_garbage() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::from(&[b'x'; 64][..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ReadError::CommandTooLong(_))
        ));
    }

    #[test]
    fn encode_round_trip() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::new();
        codec.encode(Request::GetGray, &mut buf).unwrap();
        assert_eq!(&buf[..], b"get_gray\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Request::GetGray));
    }
}
