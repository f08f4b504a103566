//! Panel configuration: geometry plus driver tuning knobs.
//!
//! The same struct is filled from command-line flags (`clap::Args`) or from
//! a JSON file (`serde`), validated once at startup, and then handed to the
//! driver adapter. Nothing mutates it afterwards.

use crate::Error;
use clap::{ArgAction, Args};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest display surface accepted, in pixels. Far beyond any real chain
/// of panels, small enough that a frame buffer always fits in memory.
pub const MAX_SURFACE_PIXELS: u64 = 1 << 24;

/// Configuration for the LED panel and the native driver.
///
/// Defaults follow a single 16x64 panel on a plain GPIO hookup. Every flag
/// is global so it may follow the subcommand.
#[derive(Args, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Display rows. 16 for 16x32, 32 for 32x32
    #[arg(long = "led-rows", global = true, default_value_t = 16)]
    pub rows: u32,

    /// Panel columns, typically 32 or 64
    #[arg(long = "led-cols", global = true, default_value_t = 64)]
    pub cols: u32,

    /// Number of daisy-chained panels
    #[arg(long = "led-chain", global = true, default_value_t = 1)]
    pub chain: u32,

    /// Parallel chains (1..=3)
    #[arg(long = "led-parallel", global = true, default_value_t = 1)]
    pub parallel: u32,

    /// Bits used for PWM (1..=11)
    #[arg(long = "led-pwm-bits", global = true, default_value_t = 11)]
    pub pwm_bits: u8,

    /// Brightness level (1..=100)
    #[arg(long = "led-brightness", global = true, default_value_t = 100)]
    pub brightness: u8,

    /// Hardware mapping: regular, adafruit-hat, adafruit-hat-pwm, ...
    #[arg(long = "led-gpio-mapping", global = true)]
    pub gpio_mapping: Option<String>,

    /// 0 = progressive, 1 = interlaced
    #[arg(long = "led-scan-mode", global = true, default_value_t = 1)]
    pub scan_mode: u32,

    /// On-time of the least significant PWM bit, in nanoseconds
    #[arg(long = "led-pwm-lsb-nanoseconds", global = true, default_value_t = 130)]
    pub pwm_lsb_nanoseconds: u32,

    /// Show the refresh rate on the terminal
    #[arg(long = "led-show-refresh", global = true)]
    pub show_refresh: bool,

    /// Slow down writing to GPIO (0..=4)
    #[arg(long = "led-slowdown-gpio", global = true, default_value_t = 1)]
    pub slowdown_gpio: u32,

    /// Use hardware pin-pulse generation
    #[arg(long = "led-hardware-pulse", global = true)]
    pub hardware_pulse_enabled: bool,

    /// Channel order of the panel, e.g. RBG if red and blue look swapped
    #[arg(long = "led-rgb-sequence", global = true, default_value = "RGB")]
    pub rgb_sequence: String,

    /// Pixel mapper chain, e.g. "Rotate:90"
    #[arg(long = "led-pixel-mapper", global = true, default_value = "")]
    pub pixel_mapper: String,

    /// 0 = default, 1 = AB, 2 = direct row select, 3 = ABC, 4 = ABC shift + DE direct
    #[arg(long = "led-row-addr-type", global = true, default_value_t = 0)]
    pub row_addr_type: u32,

    /// Multiplexing type: 0 = direct, 1 = strip, 2 = checker, 3 = spiral, ...
    #[arg(long = "led-multiplexing", global = true, default_value_t = 0)]
    pub led_multiplexing: u32,

    /// Panel chip needing special init, e.g. FM6126A
    #[arg(long = "led-panel-type", global = true, default_value = "")]
    pub panel_type: String,

    /// Keep root privileges after the hardware is initialized
    #[arg(long = "led-no-drop-privs", global = true, action = ArgAction::SetFalse)]
    pub drop_privileges: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            rows: 16,
            cols: 64,
            chain: 1,
            parallel: 1,
            pwm_bits: 11,
            brightness: 100,
            gpio_mapping: None,
            scan_mode: 1,
            pwm_lsb_nanoseconds: 130,
            show_refresh: false,
            slowdown_gpio: 1,
            hardware_pulse_enabled: false,
            rgb_sequence: "RGB".to_string(),
            pixel_mapper: String::new(),
            row_addr_type: 0,
            led_multiplexing: 0,
            panel_type: String::new(),
            drop_privileges: true,
        }
    }
}

impl PanelConfig {
    /// Default tuning with the given geometry.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Read a JSON panel description. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Width of the whole display surface: panels chained side by side.
    ///
    /// Saturates on configs that `validate` would reject.
    pub fn width(&self) -> u32 {
        self.cols.saturating_mul(self.chain)
    }

    /// Height of the whole display surface: parallel chains stacked.
    pub fn height(&self) -> u32 {
        self.rows.saturating_mul(self.parallel)
    }

    /// Total number of pixels on the display surface.
    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Number of bytes needed for a raw RGB frame (3 bytes per pixel).
    pub fn frame_byte_count(&self) -> usize {
        self.pixel_count() * 3
    }

    /// Check every field against the range the driver accepts.
    ///
    /// Values the driver itself interprets (GPIO mapping name, panel type,
    /// pixel mapper) are left to the driver and surface as `DriverInit`.
    pub fn validate(&self) -> Result<(), Error> {
        check_range("rows", self.rows, 1, u32::MAX)?;
        check_range("cols", self.cols, 1, u32::MAX)?;
        check_range("chain", self.chain, 1, u32::MAX)?;
        check_range("parallel", self.parallel, 1, 3)?;
        check_range("pwm_bits", self.pwm_bits.into(), 1, 11)?;
        check_range("brightness", self.brightness.into(), 1, 100)?;
        check_range("scan_mode", self.scan_mode, 0, 1)?;
        check_range("slowdown_gpio", self.slowdown_gpio, 0, 4)?;
        check_range("row_addr_type", self.row_addr_type, 0, 4)?;
        self.check_surface()?;

        if !is_rgb_permutation(&self.rgb_sequence) {
            return Err(Error::Config {
                field: "rgb_sequence",
                value: self.rgb_sequence.clone(),
                reason: "must be a permutation of R, G and B",
            });
        }

        Ok(())
    }

    fn check_surface(&self) -> Result<(), Error> {
        let too_large = |field, value: u32| Error::Config {
            field,
            value: value.to_string(),
            reason: "display surface too large",
        };
        let width = self
            .cols
            .checked_mul(self.chain)
            .ok_or_else(|| too_large("cols", self.cols))?;
        let height = self
            .rows
            .checked_mul(self.parallel)
            .ok_or_else(|| too_large("rows", self.rows))?;
        if u64::from(width) * u64::from(height) > MAX_SURFACE_PIXELS {
            let field = if width >= height { "cols" } else { "rows" };
            let value = if width >= height { self.cols } else { self.rows };
            return Err(too_large(field, value));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), Error> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    let reason = match field {
        "parallel" => "must be 1..=3",
        "pwm_bits" => "must be 1..=11",
        "brightness" => "must be 1..=100",
        "scan_mode" => "must be 0 or 1",
        "slowdown_gpio" => "must be 0..=4",
        "row_addr_type" => "must be 0..=4",
        _ => "must be at least 1",
    };
    Err(Error::Config {
        field,
        value: value.to_string(),
        reason,
    })
}

fn is_rgb_permutation(sequence: &str) -> bool {
    let mut letters: Vec<char> = sequence.chars().map(|c| c.to_ascii_uppercase()).collect();
    letters.sort_unstable();
    letters == ['B', 'G', 'R']
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn default_is_valid() {
        assert!(PanelConfig::default().validate().is_ok());
    }

    #[test]
    fn default_matches_single_16x64_panel() {
        let panel = PanelConfig::default();
        assert_eq!((panel.rows, panel.cols), (16, 64));
        assert_eq!(panel.rgb_sequence, "RGB");
        assert!(panel.drop_privileges);
        assert!(!panel.hardware_pulse_enabled);
    }

    #[test]
    fn rows_32_cols_64_brightness_50_is_valid() {
        let panel = PanelConfig {
            brightness: 50,
            ..PanelConfig::new(32, 64)
        };
        assert!(panel.validate().is_ok());
    }

    #[rstest]
    #[case(32, 64, 1, 1, 64, 32)]
    #[case(32, 64, 2, 1, 128, 32)]
    #[case(32, 32, 1, 3, 32, 96)]
    #[case(16, 32, 4, 2, 128, 32)]
    fn test_surface_size(
        #[case] rows: u32,
        #[case] cols: u32,
        #[case] chain: u32,
        #[case] parallel: u32,
        #[case] width: u32,
        #[case] height: u32,
    ) {
        let panel = PanelConfig {
            chain,
            parallel,
            ..PanelConfig::new(rows, cols)
        };
        assert_eq!((panel.width(), panel.height()), (width, height));
    }

    #[rstest]
    #[case(64, 64, 12288)]
    #[case(32, 64, 6144)]
    #[case(16, 32, 1536)]
    fn test_frame_byte_count(#[case] rows: u32, #[case] cols: u32, #[case] expected: usize) {
        assert_eq!(PanelConfig::new(rows, cols).frame_byte_count(), expected);
    }

    #[rstest]
    #[case::zero_rows(PanelConfig { rows: 0, ..PanelConfig::default() }, "rows")]
    #[case::zero_chain(PanelConfig { chain: 0, ..PanelConfig::default() }, "chain")]
    #[case::parallel_4(PanelConfig { parallel: 4, ..PanelConfig::default() }, "parallel")]
    #[case::pwm_bits_12(PanelConfig { pwm_bits: 12, ..PanelConfig::default() }, "pwm_bits")]
    #[case::pwm_bits_0(PanelConfig { pwm_bits: 0, ..PanelConfig::default() }, "pwm_bits")]
    #[case::brightness_0(PanelConfig { brightness: 0, ..PanelConfig::default() }, "brightness")]
    #[case::brightness_101(PanelConfig { brightness: 101, ..PanelConfig::default() }, "brightness")]
    #[case::scan_mode_2(PanelConfig { scan_mode: 2, ..PanelConfig::default() }, "scan_mode")]
    #[case::slowdown_5(PanelConfig { slowdown_gpio: 5, ..PanelConfig::default() }, "slowdown_gpio")]
    #[case::row_addr_5(PanelConfig { row_addr_type: 5, ..PanelConfig::default() }, "row_addr_type")]
    #[case::huge_square(PanelConfig::new(65536, 65536), "cols")]
    #[case::tall(PanelConfig::new(1 << 20, 64), "rows")]
    #[case::chain_overflow(PanelConfig { chain: u32::MAX, ..PanelConfig::new(32, 64) }, "cols")]
    #[case::parallel_overflow(PanelConfig { parallel: 3, ..PanelConfig::new(u32::MAX, 1) }, "rows")]
    fn test_out_of_range_rejected(#[case] panel: PanelConfig, #[case] expected_field: &str) {
        match panel.validate() {
            Err(Error::Config { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected config error for {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn largest_surface_is_accepted() {
        // 4096 x 4096 is exactly the limit.
        let panel = PanelConfig {
            chain: 2,
            ..PanelConfig::new(4096, 2048)
        };
        assert!(panel.validate().is_ok());
        assert_eq!(panel.pixel_count() as u64, MAX_SURFACE_PIXELS);
    }

    #[test]
    fn size_helpers_saturate_instead_of_overflowing() {
        let panel = PanelConfig {
            chain: u32::MAX,
            ..PanelConfig::new(u32::MAX, 64)
        };
        assert_eq!(panel.width(), u32::MAX);
        assert_eq!(panel.height(), u32::MAX);
    }

    #[rstest]
    #[case("RGB")]
    #[case("bgr")]
    #[case("GRB")]
    #[case("rBg")]
    fn test_rgb_sequence_permutations_accepted(#[case] sequence: &str) {
        let panel = PanelConfig {
            rgb_sequence: sequence.to_string(),
            ..PanelConfig::default()
        };
        assert!(panel.validate().is_ok());
    }

    #[rstest]
    #[case("RRB")]
    #[case("RGBG")]
    #[case("")]
    fn test_rgb_sequence_non_permutations_rejected(#[case] sequence: &str) {
        let panel = PanelConfig {
            rgb_sequence: sequence.to_string(),
            ..PanelConfig::default()
        };
        assert!(matches!(
            panel.validate(),
            Err(Error::Config { field: "rgb_sequence", .. })
        ));
    }

    #[test]
    fn json_file_fills_missing_fields_with_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("panel.json");
        std::fs::write(
            &path,
            r#"{ "rows": 32, "cols": 64, "brightness": 50, "gpio_mapping": "adafruit-hat" }"#,
        )
        .unwrap();

        let panel = PanelConfig::from_json_file(&path).unwrap();
        assert_eq!(
            panel,
            PanelConfig {
                brightness: 50,
                gpio_mapping: Some("adafruit-hat".to_string()),
                ..PanelConfig::new(32, 64)
            }
        );
    }

    #[test]
    fn json_file_with_bad_value_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("panel.json");
        std::fs::write(&path, r#"{ "parallel": 7 }"#).unwrap();

        assert!(matches!(
            PanelConfig::from_json_file(&path),
            Err(Error::Config { field: "parallel", .. })
        ));
    }

    #[test]
    fn json_file_that_is_not_json_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("panel.json");
        std::fs::write(&path, "rows = 32").unwrap();

        assert!(matches!(
            PanelConfig::from_json_file(&path),
            Err(Error::Json(_))
        ));
    }
}
