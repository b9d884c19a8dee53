//! # Framegrab Server for HPS-to-FPGA Capture Hardware
//!
//! Deployable frame server for FPGA-attached cameras on SoC boards,
//! providing backends for the two ways the capture hardware is reachable:
//! directly through memory-mapped registers, or through the kernel driver's
//! character device.
pub mod backends;

use std::error::Error;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use clap_num::maybe_hex;
use env_logger::Env;
use framegrab_protocol::pixel::{FrameFormat, PixelFormat};
use framegrab_server::server::{Config, Server};

use crate::backends::chardev::CharDevBackend;
use crate::backends::mmio::{DEFAULT_BRIDGE_BASE, DEFAULT_OCR_BASE, MmioBackend, MmioConfig};

#[derive(Copy, Clone, Eq, PartialEq, ValueEnum)]
enum ImageType {
    /// Four bytes per pixel: R, G, B, gray
    Rgbg,
    /// One byte per pixel, gray component only
    Grayscale,
    /// One byte per pixel, binarized by the threshold pipeline
    Binary,
}

impl ImageType {
    fn pixel(self) -> PixelFormat {
        match self {
            ImageType::Rgbg => PixelFormat::Rgbg,
            ImageType::Grayscale => PixelFormat::Gray,
            ImageType::Binary => PixelFormat::Binary,
        }
    }
}

#[derive(Subcommand, Eq, PartialEq, Clone)]
enum DeviceImpl {
    /// Read frames from the kernel driver's character device
    CharDev {
        path: Option<PathBuf>,
    },
    /// Drive the capture registers directly through /dev/mem
    Mmio {
        #[arg(
            long,
            value_parser = maybe_hex::<u64>,
            default_value_t = DEFAULT_BRIDGE_BASE,
            help = "Physical base of the HPS-to-FPGA bridge window"
        )]
        bridge_base: u64,
        #[arg(
            long,
            value_parser = maybe_hex::<u64>,
            default_value_t = 0,
            help = "Camera register window offset within the bridge"
        )]
        camera_offset: u64,
        #[arg(
            long,
            value_parser = maybe_hex::<u64>,
            help = "Binarizer register window offset within the bridge"
        )]
        binarizer_offset: Option<u64>,
        #[arg(
            long,
            value_parser = maybe_hex::<u64>,
            default_value_t = DEFAULT_OCR_BASE,
            help = "Physical base of the on-chip RAM holding the line buffers"
        )]
        ocr_base: u64,
        #[arg(long, default_value_t = 8, help = "Scanlines per buffer transfer")]
        lines_per_buffer: u16,
        #[arg(
            long,
            help = "The poll timeout in milliseconds",
            default_value = "250"
        )]
        poll_timeout_ms: u64,
    },
}

#[derive(Parser)]
#[command(about = "TCP frame server for FPGA-attached cameras", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "36000")]
    port: u16,

    #[arg(short, long, default_value = "127.0.0.1")]
    ip: IpAddr,

    #[arg(long, value_enum, default_value_t = ImageType::Rgbg)]
    image_type: ImageType,

    #[arg(long, default_value_t = 640)]
    width: u16,

    #[arg(long, default_value_t = 480)]
    height: u16,

    #[clap(subcommand)]
    device: Option<DeviceImpl>,
}

/// Attempts to automatically find the device node created by the camera
/// kernel driver
fn chardev_path() -> Option<PathBuf> {
    let p = PathBuf::from("/dev/fpga_camera");
    if p.exists() { Some(p) } else { None }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    log::info!("Starting framegrab server");

    let args = Args::parse();
    log::debug!("Parsed arguments: ip={}, port={}", args.ip, args.port);

    let format = FrameFormat::new(args.width, args.height, args.image_type.pixel());
    log::debug!(
        "Frame format: {}x{}, {} bytes per pixel",
        format.width,
        format.height,
        format.pixel.bytes_per_pixel()
    );

    let config = Config::default();
    let addr = SocketAddr::new(args.ip, args.port);
    log::info!("Binding to address: {}", addr);

    let device_impl = args.device.or_else(|| {
        chardev_path().map(|path| {
            log::info!("Auto-detected camera device at {}", path.display());
            DeviceImpl::CharDev { path: Some(path) }
        })
    });

    match device_impl {
        Some(DeviceImpl::CharDev { path }) => {
            let device_path = match path.or_else(chardev_path) {
                None => {
                    println!(
                        "No camera device could be detected. Explicitly specify a path using camera-bridge char-dev <path>."
                    );
                    return Ok(());
                }
                Some(path) => path,
            };

            log::info!(
                "Initializing character device server from {}",
                device_path.display()
            );
            let mut server = Server::new(CharDevBackend::new(device_path, format)?, config);
            server.listen(addr)?
        }
        Some(DeviceImpl::Mmio {
            bridge_base,
            camera_offset,
            binarizer_offset,
            ocr_base,
            lines_per_buffer,
            poll_timeout_ms,
        }) => {
            let mmio_config = MmioConfig {
                bridge_base,
                camera_offset,
                binarizer_offset,
                ocr_base,
                format,
                lines_per_buffer,
                poll_timeout: Duration::from_millis(poll_timeout_ms),
                ..MmioConfig::default()
            };
            log::info!(
                "Initializing memory-mapped server at bridge base 0x{:x}",
                bridge_base
            );
            let mut server = Server::new(MmioBackend::new(mmio_config)?, config);
            server.listen(addr)?;
        }
        None => {
            log::info!("No camera device node found, using the memory-mapped backend");
            let mmio_config = MmioConfig {
                format,
                ..MmioConfig::default()
            };
            let mut server = Server::new(MmioBackend::new(mmio_config)?, config);
            server.listen(addr)?;
        }
    }
    Ok(())
}
