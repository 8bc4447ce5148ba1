//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements         | Connects to                |
//! |---------------|--------------------|----------------------------|
//! | `display`     | DisplayPort        | SSD1306 OLED / serial log  |
//! | `hardware`    | AdcChannel         | ESP32 ADC1 oneshot         |
//! |               | OutputPin/InputPin | ESP32 GPIO                 |
//! | `http_notify` | NotifyPort         | HTTPS form endpoint        |
//! | `log_sink`    | EventSink          | Serial log output          |
//! | `time`        | MonotonicClock     | ESP32 system timer         |
//! | `wifi`        | ConnectivityPort   | ESP-IDF WiFi STA           |

pub mod device_id;
pub mod display;
pub mod hardware;
pub mod http_notify;
pub mod log_sink;
pub mod time;
pub mod wifi;
