use std::{
    io::{self, BufReader, ErrorKind},
    net::{TcpListener, TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::FrameSource;
use framegrab_protocol::error::ReadError;
use framegrab_protocol::{Request, Response};

#[derive(Debug, Clone)]
pub struct Config {
    pub read_write_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_write_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
pub struct Server<T: FrameSource> {
    source: T,
    config: Config,
}

/// Builder to create a [Server] instance and modify configuration options
///
/// # Example
///
/// ```ignore
/// use framegrab_server::server::Builder;
/// use std::time::Duration;
///
/// let server = Builder::new()
///     .rw_timeout(Duration::from_secs(20))
///     .build(my_source);
/// ```
#[derive(Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Set the TCP read and write timeout
    pub fn rw_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_write_timeout = timeout;
        self
    }

    /// Build and return the server
    pub fn build<T: FrameSource>(self, source: T) -> Server<T> {
        Server::new(source, self.config)
    }
}

impl<T: FrameSource> Server<T> {
    pub fn new(source: T, config: Config) -> Server<T> {
        Server { source, config }
    }

    /// Binds `addr` and serves connections forever.
    pub fn listen(&mut self, addr: impl ToSocketAddrs) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr)?;
        self.serve(listener)
    }

    /// Serves connections from an already bound listener. Useful when the
    /// caller needs the local address, e.g. after binding port 0.
    pub fn serve(&mut self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Server listening for connections");

        for stream in listener.incoming() {
            match stream {
                Ok(tcp) => {
                    let peer_addr = tcp.peer_addr().ok();
                    if let Some(addr) = peer_addr {
                        log::info!("New client connection from {}", addr);
                    }
                    if let Err(e) = self.handle_client(tcp) {
                        log::error!("Client error: {}", e);
                    }
                }
                Err(e) => log::error!("Connection error: {}", e),
            }
        }
        Ok(())
    }

    fn handle_client(&mut self, mut tcp: TcpStream) -> Result<(), ReadError> {
        tcp.set_read_timeout(Some(self.config.read_write_timeout))?;
        tcp.set_write_timeout(Some(self.config.read_write_timeout))?;

        // Requests are parsed through one buffered reader per connection so
        // no bytes past a newline are lost; responses go out the raw stream.
        let mut reader = BufReader::new(tcp.try_clone()?);

        loop {
            match Request::from_reader(&mut reader) {
                Ok(request) => {
                    if !self.process_request(request, &mut tcp)? {
                        break;
                    }
                }
                Err(ReadError::UnknownCommand(cmd)) => {
                    log::warn!("Received unknown command {:?}", cmd);
                    Response::Unknown.write_to(&mut tcp)?;
                }
                Err(ReadError::Disconnected) => break, // Client disconnected
                Err(ReadError::IoError(err))
                    if err.kind() == ErrorKind::TimedOut || err.kind() == ErrorKind::WouldBlock =>
                {
                    log::error!("Client read timeout, closing connection");
                    break;
                }
                Err(ReadError::IoError(err))
                    if err.kind() == ErrorKind::ConnectionAborted
                        || err.kind() == ErrorKind::ConnectionReset =>
                {
                    break;
                }
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    /// Process one request, forwarding captures to the frame source.
    /// Returns false when the connection should close.
    fn process_request(&mut self, request: Request, tcp: &mut TcpStream) -> Result<bool, ReadError> {
        match request {
            Request::CaptureFrame => {
                log::debug!("Received capture_frame request");
                let result = self.source.capture_frame();
                send_frame(result, request, tcp)?;
            }
            Request::GetColor => {
                log::debug!("Received get_color request");
                let result = self.source.capture_color();
                send_frame(result, request, tcp)?;
            }
            Request::GetGray => {
                log::debug!("Received get_gray request");
                let result = self.source.capture_gray();
                send_frame(result, request, tcp)?;
            }
            Request::Quit => {
                log::info!("Client requested quit");
                Response::Bye.write_to(tcp)?;
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn send_frame(
    result: io::Result<Box<[u8]>>,
    request: Request,
    tcp: &mut TcpStream,
) -> Result<(), ReadError> {
    match result {
        Ok(data) => {
            log::debug!("Sending {} bytes for {}", data.len(), request);
            Response::Frame(data).write_to(tcp)?;
        }
        Err(e) => {
            // The protocol has no error channel; the client's read timeout
            // is the only failure signal.
            log::error!("{} failed: {}", request, e);
        }
    }
    Ok(())
}
