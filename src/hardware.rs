//! Hardware backend: `rpi-led-matrix` on a Raspberry Pi.
//!
//! Pure glue. Every `PanelConfig` field is passed through to the native
//! driver, which does its own PWM timing and refresh on a background thread.
//! Initialization usually needs root; the driver drops privileges afterwards
//! unless told not to.

use crate::driver::Panel;
use crate::{Color, Error, PanelConfig};
use image::RgbImage;
use rpi_led_matrix::{LedCanvas, LedMatrix, LedMatrixOptions, LedRuntimeOptions};

/// A live panel handle.
pub struct RpiPanel {
    matrix: LedMatrix,
    width: u32,
    height: u32,
}

impl RpiPanel {
    /// Translate `config` into driver options and start the matrix.
    ///
    /// No retries: a rejected option or missing GPIO access is fatal.
    pub fn configure(config: &PanelConfig) -> Result<Self, Error> {
        config.validate()?;
        let (options, rt_options) = driver_options(config)?;

        let matrix = LedMatrix::new(Some(options), Some(rt_options))
            .map_err(|e| Error::DriverInit(e.to_string()))?;

        tracing::info!(
            "LED matrix ready: {}x{} (chain {}, parallel {})",
            config.cols,
            config.rows,
            config.chain,
            config.parallel
        );

        Ok(Self {
            matrix,
            width: config.width(),
            height: config.height(),
        })
    }
}

fn driver_options(config: &PanelConfig) -> Result<(LedMatrixOptions, LedRuntimeOptions), Error> {
    let mut options = LedMatrixOptions::new();
    if let Some(mapping) = &config.gpio_mapping {
        options.set_hardware_mapping(mapping);
    }
    options.set_rows(config.rows);
    options.set_cols(config.cols);
    options.set_chain_length(config.chain);
    options.set_parallel(config.parallel);
    options.set_row_addr_type(config.row_addr_type);
    options.set_multiplexing(config.led_multiplexing);
    options
        .set_pwm_bits(config.pwm_bits)
        .map_err(|e| Error::DriverInit(e.to_string()))?;
    options
        .set_brightness(config.brightness)
        .map_err(|e| Error::DriverInit(e.to_string()))?;
    options.set_pwm_lsb_nanoseconds(config.pwm_lsb_nanoseconds);
    options.set_scan_mode(config.scan_mode);
    options.set_led_rgb_sequence(&config.rgb_sequence);
    options.set_pixel_mapper_config(&config.pixel_mapper);
    options.set_panel_type(&config.panel_type);
    options.set_refresh_rate(config.show_refresh);
    options.set_hardware_pulsing(config.hardware_pulse_enabled);

    let mut rt_options = LedRuntimeOptions::new();
    rt_options.set_gpio_slowdown(config.slowdown_gpio);
    rt_options.set_drop_privileges(config.drop_privileges);

    Ok((options, rt_options))
}

impl Panel for RpiPanel {
    type Buffer = LedCanvas;

    fn create_frame_buffer(&mut self) -> Result<LedCanvas, Error> {
        Ok(self.matrix.offscreen_canvas())
    }

    fn fill_solid(&self, buffer: &mut LedCanvas, color: Color) {
        buffer.fill(&color.into());
    }

    fn set_image(&self, buffer: &mut LedCanvas, image: &RgbImage) {
        buffer.clear();
        for (x, y, pixel) in image.enumerate_pixels() {
            if x < self.width && y < self.height {
                let c: Color = (*pixel).into();
                buffer.set(x as i32, y as i32, &c.into());
            }
        }
    }

    fn swap_on_sync(&mut self, buffer: LedCanvas) -> LedCanvas {
        self.matrix.swap(buffer)
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
