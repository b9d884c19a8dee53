//! End-to-end tests: simulated capture hardware behind a real server and a
//! real client over localhost.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use framegrab_capture::capture::{CaptureController, CaptureGeometry, LineBuffers};
use framegrab_capture::mock::CaptureSim;
use framegrab_capture::regs::RegisterMap;
use framegrab_client::FrameClient;
use framegrab_protocol::pixel::{FrameFormat, PixelFormat};
use framegrab_server::FrameSource;
use framegrab_server::server::{Config, Server};

const WIDTH: u16 = 4;
const HEIGHT: u16 = 4;

fn format() -> FrameFormat {
    FrameFormat::new(WIDTH, HEIGHT, PixelFormat::Rgbg)
}

fn test_line(frame: u32, index: usize, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (frame as usize * 97 + index * 31 + i) as u8)
        .collect()
}

fn expected_frame(frame: u32) -> Vec<u8> {
    let geometry = geometry();
    (0..geometry.transfers())
        .flat_map(|index| test_line(frame, index, geometry.transfer_bytes()))
        .collect()
}

fn geometry() -> CaptureGeometry {
    let format = format();
    CaptureGeometry::new(
        format.width,
        format.height,
        1,
        format.pixel.bytes_per_pixel(),
    )
}

/// Frame source backed by the simulated capture component. Every capture
/// queues a fresh set of distinct line payloads, so successive frames
/// differ and ordering bugs show up in the assertions.
struct SimulatedCamera {
    controller: CaptureController<CaptureSim>,
    frames_served: u32,
}

impl SimulatedCamera {
    fn new() -> SimulatedCamera {
        let geometry = geometry();
        let sim = CaptureSim::new(RegisterMap::default(), geometry.transfer_bytes());
        let window = sim.window_ptr();
        let mut controller = CaptureController::new(
            sim,
            RegisterMap::default(),
            geometry,
            Duration::from_millis(50),
        );
        controller.set_buffers(LineBuffers::contiguous(
            0x3800_0000,
            window,
            geometry.transfer_bytes(),
        ));
        SimulatedCamera {
            controller,
            frames_served: 0,
        }
    }

    fn capture(&mut self) -> io::Result<Box<[u8]>> {
        let geometry = self.controller.geometry();
        for index in 0..geometry.transfers() {
            self.controller.bus().push_line(test_line(
                self.frames_served,
                index,
                geometry.transfer_bytes(),
            ));
        }
        let mut frame = vec![0u8; geometry.frame_bytes()];
        self.controller
            .get_frame(&mut frame)
            .map_err(io::Error::other)?;
        self.frames_served += 1;
        Ok(frame.into_boxed_slice())
    }
}

impl FrameSource for SimulatedCamera {
    fn capture_frame(&mut self) -> io::Result<Box<[u8]>> {
        self.capture()
    }

    fn capture_color(&mut self) -> io::Result<Box<[u8]>> {
        let frame = self.capture()?;
        Ok(format().color_plane(&frame))
    }

    fn capture_gray(&mut self) -> io::Result<Box<[u8]>> {
        let frame = self.capture()?;
        Ok(format().gray_plane(&frame))
    }
}

fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("binding an ephemeral port works");
    let addr = listener.local_addr().expect("bound listener has an address");
    thread::spawn(move || {
        let mut server = Server::new(SimulatedCamera::new(), Config::default());
        server.serve(listener).expect("server terminated with error");
    });
    addr
}

#[test]
fn capture_frame_round_trip() {
    let addr = spawn_server();
    let mut client = FrameClient::connect(addr, format()).unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let frame = client.capture_frame().unwrap();
    assert_eq!(&*frame, expected_frame(0));

    // each capture streams a fresh frame
    let frame = client.capture_frame().unwrap();
    assert_eq!(&*frame, expected_frame(1));

    client.quit().unwrap();
}

#[test]
fn color_and_gray_planes() {
    let addr = spawn_server();
    let mut client = FrameClient::connect(addr, format()).unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let rgb = client.get_color().unwrap();
    assert_eq!(rgb.len(), format().color_bytes());
    assert_eq!(&*rgb, &*format().color_plane(&expected_frame(0)));

    let gray = client.get_gray().unwrap();
    assert_eq!(gray.len(), format().gray_bytes());
    assert_eq!(&*gray, &*format().gray_plane(&expected_frame(1)));

    client.quit().unwrap();
}

#[test]
fn unknown_command_keeps_connection_open() {
    let addr = spawn_server();
    let mut tcp = TcpStream::connect(addr).unwrap();
    tcp.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut reader = BufReader::new(tcp.try_clone().unwrap());

    tcp.write_all(b"reboot\n").unwrap();
    let mut reply = String::new();
    reader.read_line(&mut reply).unwrap();
    assert_eq!(reply, "unknown command\n");

    // the connection survives and still serves frames
    tcp.write_all(b"get_gray\n").unwrap();
    let mut gray = vec![0u8; format().gray_bytes()];
    reader.read_exact(&mut gray).unwrap();
    assert_eq!(&gray, &*format().gray_plane(&expected_frame(0)));

    tcp.write_all(b"quit\n").unwrap();
    let mut reply = String::new();
    reader.read_line(&mut reply).unwrap();
    assert_eq!(reply, "bye\n");

    // server closes after bye
    let mut rest = Vec::new();
    assert_eq!(reader.read_to_end(&mut rest).unwrap(), 0);
}
