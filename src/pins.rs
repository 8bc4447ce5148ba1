//! GPIO / peripheral pin assignments for the AirMonitor board (ESP32-WROOM).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 OLED)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// 7-bit address of the 128x64 OLED.
pub const OLED_I2C_ADDR: u8 = 0x3C;

// ---------------------------------------------------------------------------
// Climate sensor (DHT11 single-wire)
// ---------------------------------------------------------------------------

/// Open-drain data line with external pull-up.
pub const DHT_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1, 12-bit, 11 dB attenuation → 0 – 3.3 V)
// ---------------------------------------------------------------------------

/// MQ-135 gas sensor load-resistor tap.  GPIO 36 = ADC1 channel 0.
pub const GAS_ADC_GPIO: i32 = 36;
pub const GAS_ADC_CHANNEL: u32 = 0;

/// GP2Y1010AU0F analog output (Vo).  GPIO 34 = ADC1 channel 6.
pub const DUST_ADC_GPIO: i32 = 34;
pub const DUST_ADC_CHANNEL: u32 = 6;

// ---------------------------------------------------------------------------
// Particulate sensor IR emitter
// ---------------------------------------------------------------------------

/// Digital output driving the GP2Y1010AU0F LED through a 150 Ω resistor.
/// Active LOW: LOW = emitter on, HIGH = emitter off.
pub const DUST_LED_GPIO: i32 = 2;
pub const DUST_LED_ACTIVE_LOW: bool = true;
