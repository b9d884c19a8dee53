//! Sensor configuration registers.
//!
//! The configuration lives in hardware: setters stage values in the config
//! registers, and the sensor only adopts them on the next reset pulse
//! ([`Camera::update_config`]). Software mirrors nothing — getters round-trip
//! through the registers.

use crate::bus::RegisterBus;
use crate::regs::RegisterMap;

/// Power-on values for the configuration registers.
///
/// The right values differ between sensor and bitstream revisions (exposure
/// and the decimation modes in particular have shifted), so they are data,
/// not constants: `Default` carries the values for the reference revision
/// and deployments substitute their own.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ConfigDefaults {
    pub width: u16,
    pub height: u16,
    pub start_row: u16,
    pub start_column: u16,
    pub row_size: u16,
    pub column_size: u16,
    pub row_mode: u16,
    pub column_mode: u16,
    pub exposure: u16,
    pub h_blanking: u16,
    pub v_blanking: u16,
    pub red_gain: u16,
    pub blue_gain: u16,
    pub green1_gain: u16,
    pub green2_gain: u16,
}

impl Default for ConfigDefaults {
    fn default() -> ConfigDefaults {
        ConfigDefaults {
            width: 640,
            height: 480,
            start_row: 0,
            start_column: 0,
            row_size: 1919,
            column_size: 2559,
            row_mode: 17,
            column_mode: 17,
            exposure: 1023,
            h_blanking: 0,
            v_blanking: 25,
            red_gain: 156,
            blue_gain: 154,
            green1_gain: 19,
            green2_gain: 19,
        }
    }
}

macro_rules! config_field {
    ($(#[$doc:meta])* $get:ident / $set:ident => $reg:ident) => {
        $(#[$doc])*
        pub fn $get(&self) -> u16 {
            self.bus.read32(self.map.$reg) as u16
        }

        pub fn $set(&self, value: u16) {
            self.bus.write32(self.map.$reg, value as u32);
        }
    };
}

/// Typed view over the camera configuration window. One instance per
/// physical camera.
#[derive(Debug)]
pub struct Camera<B> {
    bus: B,
    map: RegisterMap,
}

impl<B: RegisterBus> Camera<B> {
    pub fn new(bus: B, map: RegisterMap) -> Camera<B> {
        Camera { bus, map }
    }

    config_field!(
        /// Output image width in pixels.
        width / set_width => width
    );
    config_field!(
        /// Output image height in pixels.
        height / set_height => height
    );
    config_field!(start_row / set_start_row => start_row);
    config_field!(start_column / set_start_column => start_column);
    config_field!(
        /// Number of sensor rows read out, minus one.
        row_size / set_row_size => row_size
    );
    config_field!(
        /// Number of sensor columns read out, minus one.
        column_size / set_column_size => column_size
    );
    config_field!(
        /// Row skip/bin decimation mode.
        row_mode / set_row_mode => row_mode
    );
    config_field!(
        /// Column skip/bin decimation mode.
        column_mode / set_column_mode => column_mode
    );
    config_field!(
        /// Exposure time in row intervals.
        exposure / set_exposure => exposure
    );
    config_field!(h_blanking / set_h_blanking => h_blanking);
    config_field!(v_blanking / set_v_blanking => v_blanking);
    config_field!(red_gain / set_red_gain => red_gain);
    config_field!(blue_gain / set_blue_gain => blue_gain);
    config_field!(green1_gain / set_green1_gain => green1_gain);
    config_field!(green2_gain / set_green2_gain => green2_gain);

    /// Stages every configuration register from `defaults`. Call
    /// [`Camera::update_config`] afterwards to make the sensor adopt them.
    pub fn apply_defaults(&self, defaults: &ConfigDefaults) {
        self.set_width(defaults.width);
        self.set_height(defaults.height);
        self.set_start_row(defaults.start_row);
        self.set_start_column(defaults.start_column);
        self.set_row_size(defaults.row_size);
        self.set_column_size(defaults.column_size);
        self.set_row_mode(defaults.row_mode);
        self.set_column_mode(defaults.column_mode);
        self.set_exposure(defaults.exposure);
        self.set_h_blanking(defaults.h_blanking);
        self.set_v_blanking(defaults.v_blanking);
        self.set_red_gain(defaults.red_gain);
        self.set_blue_gain(defaults.blue_gain);
        self.set_green1_gain(defaults.green1_gain);
        self.set_green2_gain(defaults.green2_gain);
    }

    /// Commits the staged configuration by resetting the video stream.
    /// Today this is exactly a soft reset; kept separate so config commit
    /// can change independently of reset semantics.
    pub fn update_config(&self) {
        self.soft_reset();
    }

    /// Pulses the soft-reset line (active low: drive 0, then release to 1).
    ///
    /// Resets the video stream and every capture component behind it; any
    /// capture in flight is invalidated and must be restarted.
    pub fn soft_reset(&self) {
        log::debug!("soft-resetting video stream");
        self.bus.write32(self.map.soft_reset, 0);
        self.bus.write32(self.map.soft_reset, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, ConfigDefaults};
    use crate::mock::MockBank;
    use crate::regs::RegisterMap;

    #[test]
    fn set_then_get_round_trips() {
        let bank = MockBank::new();
        let camera = Camera::new(&bank, RegisterMap::default());

        camera.set_width(800);
        camera.set_exposure(1984);
        assert_eq!(camera.width(), 800);
        assert_eq!(camera.exposure(), 1984);
    }

    #[test]
    fn defaults_land_in_registers() {
        let bank = MockBank::new();
        let camera = Camera::new(&bank, RegisterMap::default());
        let defaults = ConfigDefaults::default();

        camera.apply_defaults(&defaults);

        assert_eq!(camera.width(), 640);
        assert_eq!(camera.height(), 480);
        assert_eq!(camera.row_size(), 1919);
        assert_eq!(camera.column_size(), 2559);
        assert_eq!(camera.row_mode(), 17);
        assert_eq!(camera.exposure(), 1023);
        assert_eq!(camera.v_blanking(), 25);
        assert_eq!(camera.red_gain(), 156);
        assert_eq!(camera.green2_gain(), 19);
    }

    #[test]
    fn custom_defaults_are_honored() {
        let bank = MockBank::new();
        let camera = Camera::new(&bank, RegisterMap::default());
        let defaults = ConfigDefaults {
            exposure: 1984,
            row_mode: 1,
            ..ConfigDefaults::default()
        };

        camera.apply_defaults(&defaults);

        assert_eq!(camera.exposure(), 1984);
        assert_eq!(camera.row_mode(), 1);
    }

    #[test]
    fn soft_reset_pulses_active_low() {
        let bank = MockBank::new();
        let map = RegisterMap::default();
        let camera = Camera::new(&bank, map.clone());

        camera.soft_reset();

        assert_eq!(bank.writes_to(map.soft_reset), vec![0, 1]);
    }
}
