//! Display adapters for the 128x64 OLED.
//!
//! Screen content is composed into a [`Frame`] of positioned text items
//! first, then drawn by whichever backend is available:
//!
//! - [`OledDisplay`] draws frames with `embedded-graphics` onto any
//!   binary-colour draw target (the SSD1306 on the device).
//! - [`ConsoleDisplay`] logs frames; used on the host and as the fallback
//!   when the OLED does not answer at boot.
//!
//! Display failures never reach the control loop: a frame that fails to
//! draw is logged and dropped.

use core::fmt::Write as _;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use log::{debug, warn};

use crate::app::events::{DisplayView, StatusScreen};
use crate::app::ports::DisplayPort;

/// Longest SSID prefix shown on the connecting screen.
const SSID_VISIBLE_CHARS: usize = 16;

/// One line of text at a pixel position (top-left).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub x: i32,
    pub y: i32,
    pub text: heapless::String<24>,
}

pub type Frame = heapless::Vec<TextItem, 10>;

fn push(frame: &mut Frame, x: i32, y: i32, args: core::fmt::Arguments<'_>) {
    let mut text = heapless::String::new();
    // Overlong text is cut at capacity.
    let _ = text.write_fmt(args);
    let _ = frame.push(TextItem { x, y, text });
}

/// Operational screen: climate, gas block, dust block, WiFi flag.
pub fn compose_view(view: &DisplayView<'_>) -> Frame {
    let r = view.reading;
    let mut f = Frame::new();

    let label = if r.climate.is_present() { "T/H:" } else { "T/H*" };
    push(&mut f, 0, 0, format_args!("{label}"));
    match r.climate.value() {
        Some(c) => push(
            &mut f,
            30,
            0,
            format_args!("{:.1}C/{:.1}%", c.temperature_c, c.humidity_pct),
        ),
        None => push(&mut f, 30, 0, format_args!("--.-C/--.-%")),
    }
    push(&mut f, 100, 0, format_args!("W:{}", view.connectivity));

    push(&mut f, 0, 15, format_args!("GAS (MQ135):"));
    push(&mut f, 0, 30, format_args!("{} PPM", r.gas_ppm().max(0.0) as u64));
    push(&mut f, 70, 30, format_args!("({})", view.gas_quality));

    push(&mut f, 0, 45, format_args!("DUST/SMOKE:"));
    push(&mut f, 0, 55, format_args!("{:.2} mg/m^3", r.dust_density()));
    push(&mut f, 70, 55, format_args!("({})", view.dust_quality));
    f
}

/// Full-screen status message.
pub fn compose_status(status: StatusScreen<'_>) -> Frame {
    let mut f = Frame::new();
    match status {
        StatusScreen::ConnectingWifi { ssid } => {
            push(&mut f, 0, 25, format_args!("Connecting WiFi..."));
            let visible = ssid
                .char_indices()
                .nth(SSID_VISIBLE_CHARS)
                .map_or(ssid, |(i, _)| &ssid[..i]);
            push(&mut f, 0, 40, format_args!("{visible}"));
        }
        StatusScreen::SendingReport => {
            push(&mut f, 0, 25, format_args!("Sending Email..."));
        }
    }
    f
}

/// Clear `target` and draw every item of `frame`.
pub fn draw_frame<D>(frame: &Frame, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    target.clear(BinaryColor::Off)?;
    for item in frame {
        Text::with_baseline(&item.text, Point::new(item.x, item.y), style, Baseline::Top)
            .draw(target)?;
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// OLED backend
// ───────────────────────────────────────────────────────────────

/// Pushes a finished frame buffer to the panel.
pub trait Flush {
    fn flush_frame(&mut self) -> bool;
}

/// Draws frames onto a buffered binary-colour target.
pub struct OledDisplay<D> {
    target: D,
}

impl<D> OledDisplay<D>
where
    D: DrawTarget<Color = BinaryColor> + Flush,
{
    pub fn new(target: D) -> Self {
        Self { target }
    }

    fn show(&mut self, frame: &Frame) {
        if draw_frame(frame, &mut self.target).is_err() || !self.target.flush_frame() {
            warn!("OLED: frame dropped");
        }
    }
}

impl<D> DisplayPort for OledDisplay<D>
where
    D: DrawTarget<Color = BinaryColor> + Flush,
{
    fn render(&mut self, view: &DisplayView<'_>) {
        self.show(&compose_view(view));
    }

    fn show_status(&mut self, status: StatusScreen<'_>) {
        self.show(&compose_status(status));
    }
}

#[cfg(target_os = "espidf")]
pub mod ssd1306_panel {
    //! SSD1306 over I²C in buffered graphics mode.

    use ssd1306::mode::BufferedGraphicsMode;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use super::Flush;

    pub type Panel<I2C> =
        Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

    /// Initialise the panel; `None` when it does not acknowledge.
    pub fn open<I2C>(i2c: I2C) -> Option<Panel<I2C>>
    where
        I2C: embedded_hal::i2c::I2c,
    {
        let interface = I2CDisplayInterface::new_custom_address(i2c, crate::pins::OLED_I2C_ADDR);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        panel.init().ok()?;
        Some(panel)
    }

    impl<I2C> Flush for Panel<I2C>
    where
        I2C: embedded_hal::i2c::I2c,
    {
        fn flush_frame(&mut self) -> bool {
            self.flush().is_ok()
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Console backend
// ───────────────────────────────────────────────────────────────

/// Logs each frame instead of drawing it.  Keeps the last frame.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    last: Frame,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> &Frame {
        &self.last
    }

    fn show(&mut self, frame: Frame) {
        for item in &frame {
            debug!("OLED ({:>3},{:>2}) {}", item.x, item.y, item.text);
        }
        self.last = frame;
    }
}

impl DisplayPort for ConsoleDisplay {
    fn render(&mut self, view: &DisplayView<'_>) {
        self.show(compose_view(view));
    }

    fn show_status(&mut self, status: StatusScreen<'_>) {
        self.show(compose_status(status));
    }
}
