//! Register maps of the camera and binarizer windows.
//!
//! The maps are defined by the FPGA bitstream, not by software, and have
//! shifted between bitstream revisions. They are therefore plain data with
//! the canonical layout supplied by `Default`; a deployment running an older
//! bitstream substitutes its own offsets.

/// Byte offsets of the camera register window: the image-capture control
/// block, the sensor configuration block and the soft-reset register.
#[derive(Clone, Debug)]
pub struct RegisterMap {
    // image capture component
    pub start_capture: usize,
    pub capture_width: usize,
    pub capture_height: usize,
    pub buff0: usize,
    pub buff1: usize,
    pub buff0_full: usize,
    pub buff1_full: usize,
    pub standby: usize,
    // sensor configuration component
    pub width: usize,
    pub height: usize,
    pub start_row: usize,
    pub start_column: usize,
    pub row_size: usize,
    pub column_size: usize,
    pub row_mode: usize,
    pub column_mode: usize,
    pub exposure: usize,
    pub h_blanking: usize,
    pub v_blanking: usize,
    pub red_gain: usize,
    pub blue_gain: usize,
    pub green1_gain: usize,
    pub green2_gain: usize,
    // soft_reset signal, active low
    pub soft_reset: usize,
}

impl Default for RegisterMap {
    fn default() -> RegisterMap {
        RegisterMap {
            start_capture: 0x00,
            capture_width: 0x04,
            capture_height: 0x08,
            buff0: 0x0C,
            buff1: 0x10,
            buff0_full: 0x14,
            buff1_full: 0x18,
            standby: 0x1C,
            width: 0x20,
            height: 0x24,
            start_row: 0x28,
            start_column: 0x2C,
            row_size: 0x30,
            column_size: 0x34,
            row_mode: 0x38,
            column_mode: 0x3C,
            exposure: 0x40,
            h_blanking: 0x44,
            v_blanking: 0x48,
            red_gain: 0x4C,
            blue_gain: 0x50,
            green1_gain: 0x54,
            green2_gain: 0x58,
            soft_reset: 0x7C,
        }
    }
}

/// Byte offsets of the binarization threshold window (HSV-to-binary
/// conversion stage).
#[derive(Clone, Debug)]
pub struct BinarizerMap {
    pub hue_low: usize,
    pub hue_high: usize,
    pub brightness_low: usize,
    pub brightness_high: usize,
    pub saturation_low: usize,
    pub saturation_high: usize,
}

impl Default for BinarizerMap {
    fn default() -> BinarizerMap {
        BinarizerMap {
            hue_low: 0x00,
            hue_high: 0x04,
            brightness_low: 0x08,
            brightness_high: 0x0C,
            saturation_low: 0x10,
            saturation_high: 0x14,
        }
    }
}
