pub mod chardev;
pub mod mmio;
