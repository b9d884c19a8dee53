//! Binarization threshold registers.
//!
//! A pipeline stage in the fabric converts the RGBG stream to HSV and then
//! to a binary image by windowing hue, brightness and saturation. The six
//! thresholds live in their own register window.

use crate::bus::RegisterBus;
use crate::regs::BinarizerMap;

/// Default threshold window: red-ish hues, dark and desaturated pixels cut
/// away. High limits default to wide open.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BinarizerDefaults {
    pub hue_low: u8,
    pub hue_high: u8,
    pub brightness_low: u8,
    pub brightness_high: u8,
    pub saturation_low: u8,
    pub saturation_high: u8,
}

impl Default for BinarizerDefaults {
    fn default() -> BinarizerDefaults {
        BinarizerDefaults {
            hue_low: 220,
            hue_high: 30,
            brightness_low: 60,
            brightness_high: 255,
            saturation_low: 60,
            saturation_high: 255,
        }
    }
}

macro_rules! threshold_field {
    ($get:ident / $set:ident => $reg:ident) => {
        pub fn $get(&self) -> u8 {
            self.bus.read32(self.map.$reg) as u8
        }

        pub fn $set(&self, value: u8) {
            self.bus.write32(self.map.$reg, value as u32);
        }
    };
}

/// Typed view over the binarization threshold window.
#[derive(Debug)]
pub struct Binarizer<B> {
    bus: B,
    map: BinarizerMap,
}

impl<B: RegisterBus> Binarizer<B> {
    pub fn new(bus: B, map: BinarizerMap) -> Binarizer<B> {
        Binarizer { bus, map }
    }

    threshold_field!(hue_low / set_hue_low => hue_low);
    threshold_field!(hue_high / set_hue_high => hue_high);
    threshold_field!(brightness_low / set_brightness_low => brightness_low);
    threshold_field!(brightness_high / set_brightness_high => brightness_high);
    threshold_field!(saturation_low / set_saturation_low => saturation_low);
    threshold_field!(saturation_high / set_saturation_high => saturation_high);

    pub fn apply_defaults(&self, defaults: &BinarizerDefaults) {
        self.set_hue_low(defaults.hue_low);
        self.set_hue_high(defaults.hue_high);
        self.set_brightness_low(defaults.brightness_low);
        self.set_brightness_high(defaults.brightness_high);
        self.set_saturation_low(defaults.saturation_low);
        self.set_saturation_high(defaults.saturation_high);
    }
}

#[cfg(test)]
mod tests {
    use super::{Binarizer, BinarizerDefaults};
    use crate::mock::MockBank;
    use crate::regs::BinarizerMap;

    #[test]
    fn thresholds_round_trip() {
        let bank = MockBank::new();
        let binarizer = Binarizer::new(&bank, BinarizerMap::default());

        binarizer.set_hue_low(200);
        binarizer.set_saturation_high(128);
        assert_eq!(binarizer.hue_low(), 200);
        assert_eq!(binarizer.saturation_high(), 128);
    }

    #[test]
    fn defaults_land_in_registers() {
        let bank = MockBank::new();
        let binarizer = Binarizer::new(&bank, BinarizerMap::default());

        binarizer.apply_defaults(&BinarizerDefaults::default());

        assert_eq!(binarizer.hue_low(), 220);
        assert_eq!(binarizer.hue_high(), 30);
        assert_eq!(binarizer.brightness_low(), 60);
        assert_eq!(binarizer.brightness_high(), 255);
        assert_eq!(binarizer.saturation_low(), 60);
        assert_eq!(binarizer.saturation_high(), 255);
    }
}
