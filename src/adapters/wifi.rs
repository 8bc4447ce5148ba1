//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary the control
//! loop reads once per tick to decide whether a report may be sent.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! The first association is blocking and bounded by the configured
//! connect timeout.  After that the adapter never blocks: on disconnect
//! it waits an exponential backoff (2 s → 4 s → 8 s … capped at 60 s)
//! between association attempts, driven by [`WifiAdapter::poll`].

use core::fmt;
use log::{info, warn};

use crate::app::ports::ConnectivityPort;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    /// The driver rejected the configuration or the connect request.
    DriverFailed,
    /// No association within the connect timeout.
    Timeout,
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::DriverFailed => write!(f, "WiFi driver error"),
            Self::Timeout => write!(f, "WiFi association timed out"),
        }
    }
}

impl core::error::Error for WifiError {}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), WifiError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(WifiError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), WifiError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(WifiError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    connect_timeout_secs: u32,
    backoff_secs: u32,
    next_attempt_secs: u64,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    /// Simulation: whether an access point is in range.
    #[cfg(not(target_os = "espidf"))]
    sim_reachable: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: EspWifi<'static>, connect_timeout_secs: u32) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            connect_timeout_secs,
            backoff_secs: INITIAL_BACKOFF_SECS,
            next_attempt_secs: 0,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(connect_timeout_secs: u32) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            connect_timeout_secs,
            backoff_secs: INITIAL_BACKOFF_SECS,
            next_attempt_secs: 0,
            sim_reachable: true,
            sim_associated: false,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Current reconnect delay.
    pub fn backoff_secs(&self) -> u32 {
        self.backoff_secs
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), WifiError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| WifiError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| WifiError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Blocking first association, bounded by the connect timeout.
    ///
    /// On failure the adapter is left in `Reconnecting` so that
    /// [`poll`](Self::poll) keeps trying in the background.
    pub fn connect(&mut self, now_secs: u64) -> Result<(), WifiError> {
        if self.ssid.is_empty() {
            return Err(WifiError::NoCredentials);
        }
        info!("WiFi: connecting to '{}' ({}s timeout)", self.ssid, self.connect_timeout_secs);

        let result = self.platform_begin_connect().and_then(|()| {
            if self.platform_wait_link() { Ok(()) } else { Err(WifiError::Timeout) }
        });

        match result {
            Ok(()) => {
                self.mark_connected();
                Ok(())
            }
            Err(e) => {
                warn!("WiFi: connection failed: {}", e);
                self.state = WifiState::Reconnecting { attempt: 0 };
                self.next_attempt_secs = now_secs + u64::from(self.backoff_secs);
                Err(e)
            }
        }
    }

    /// Non-blocking link supervision; call once per loop iteration.
    pub fn poll(&mut self, now_secs: u64) {
        match self.state {
            WifiState::Connected => {
                if !self.platform_link_up() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.backoff_secs = INITIAL_BACKOFF_SECS;
                    self.state = WifiState::Reconnecting { attempt: 0 };
                    self.next_attempt_secs = now_secs + u64::from(self.backoff_secs);
                }
            }
            WifiState::Reconnecting { attempt } => {
                if self.platform_link_up() {
                    self.mark_connected();
                    return;
                }
                if now_secs < self.next_attempt_secs {
                    return;
                }
                info!("WiFi: reconnect attempt {} (backoff {}s)", attempt + 1, self.backoff_secs);
                if let Err(e) = self.platform_begin_connect() {
                    warn!("WiFi: reconnect request failed: {}", e);
                }
                self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                self.next_attempt_secs = now_secs + u64::from(self.backoff_secs);
                self.state = WifiState::Reconnecting { attempt: attempt + 1 };
            }
            WifiState::Disconnected => {}
        }
    }

    fn mark_connected(&mut self) {
        self.state = WifiState::Connected;
        self.backoff_secs = INITIAL_BACKOFF_SECS;
        info!("WiFi: connected to '{}'", self.ssid);
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin_connect(&mut self) -> Result<(), WifiError> {
        let config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| WifiError::InvalidSsid)?,
            password: self.password.as_str().try_into().map_err(|_| WifiError::InvalidPassword)?,
            auth_method: if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        });
        self.wifi.set_configuration(&config).map_err(|_| WifiError::DriverFailed)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(|_| WifiError::DriverFailed)?;
        }
        self.wifi.connect().map_err(|_| WifiError::DriverFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin_connect(&mut self) -> Result<(), WifiError> {
        self.sim_associated = self.sim_reachable;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_wait_link(&mut self) -> bool {
        const POLL_MS: u64 = 500;
        let polls = u64::from(self.connect_timeout_secs) * 1000 / POLL_MS;
        for _ in 0..polls {
            if self.platform_link_up() {
                return true;
            }
            std::thread::sleep(std::time::Duration::from_millis(POLL_MS));
        }
        self.platform_link_up()
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_wait_link(&mut self) -> bool {
        self.platform_link_up()
    }

    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false) && self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> bool {
        self.sim_associated
    }

    /// Simulation: bring the access point in or out of range.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_reachable(&mut self, reachable: bool) {
        self.sim_reachable = reachable;
        if !reachable {
            self.sim_associated = false;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_link_up()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
