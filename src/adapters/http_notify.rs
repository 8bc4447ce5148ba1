//! HTTP form-endpoint notifier.
//!
//! Implements [`NotifyPort`] by POSTing the report as a JSON form body
//! (`{email, subject, message, report}`) to the configured endpoint.
//! A 2xx answer is the only delivery confirmation; anything else,
//! including a transport timeout, is a failed attempt that the policy
//! retries on a later tick.
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` over TLS with the
//!   built-in certificate bundle.
//! - **all other targets**: an in-memory outbox for host-side tests.

use log::{debug, warn};

use crate::app::ports::NotifyPort;
use crate::config::SystemConfig;
use crate::error::CommsError;
use crate::report::StructuredReport;

#[cfg(target_os = "espidf")]
use esp_idf_svc::http::Method;
#[cfg(target_os = "espidf")]
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub struct HttpNotifier {
    url: heapless::String<128>,
    sender_email: heapless::String<64>,
    timeout_ms: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_outbox: Vec<String>,
    #[cfg(not(target_os = "espidf"))]
    sim_status: Result<u16, CommsError>,
}

impl HttpNotifier {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            url: config.notify_url.clone(),
            sender_email: config.sender_email.clone(),
            timeout_ms: config.notify_timeout_ms,
            #[cfg(not(target_os = "espidf"))]
            sim_outbox: Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_status: Ok(200),
        }
    }

    fn payload(&self, report: &StructuredReport) -> Result<String, CommsError> {
        report.to_form_json(&self.sender_email).map_err(|_| CommsError::Encode)
    }

    #[cfg(target_os = "espidf")]
    fn post(&mut self, body: &str) -> Result<u16, CommsError> {
        fn map_esp(e: esp_idf_svc::sys::EspError) -> CommsError {
            let code = e.code();
            if code == esp_idf_svc::sys::ESP_ERR_TIMEOUT as i32
                || code == esp_idf_svc::sys::ESP_ERR_HTTP_EAGAIN as i32
            {
                CommsError::Timeout
            } else {
                CommsError::RequestFailed
            }
        }

        let mut conn = EspHttpConnection::new(&HttpConfiguration {
            timeout: Some(core::time::Duration::from_millis(u64::from(self.timeout_ms))),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(map_esp)?;

        let len = body.len().to_string();
        let headers = [
            ("Content-Type", "application/json"),
            ("Accept", "application/json"),
            ("Content-Length", len.as_str()),
        ];
        conn.initiate_request(Method::Post, &self.url, &headers).map_err(map_esp)?;

        let mut remaining = body.as_bytes();
        while !remaining.is_empty() {
            let n = conn.write(remaining).map_err(map_esp)?;
            if n == 0 {
                return Err(CommsError::RequestFailed);
            }
            remaining = &remaining[n..];
        }

        conn.initiate_response().map_err(map_esp)?;
        Ok(conn.status())
    }

    #[cfg(not(target_os = "espidf"))]
    fn post(&mut self, body: &str) -> Result<u16, CommsError> {
        let status = self.sim_status?;
        self.sim_outbox.push(body.to_string());
        Ok(status)
    }

    /// Simulation: what the endpoint answers (`Err` = transport failure).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_respond_with(&mut self, status: Result<u16, CommsError>) {
        self.sim_status = status;
    }

    /// Simulation: every body that reached the endpoint.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_outbox(&self) -> &[String] {
        &self.sim_outbox
    }
}

impl NotifyPort for HttpNotifier {
    fn send(&mut self, report: &StructuredReport) -> Result<(), CommsError> {
        let body = self.payload(report)?;
        debug!("POST {} ({} bytes, {} ms timeout)", self.url, body.len(), self.timeout_ms);
        let status = self.post(&body)?;
        if is_success(status) {
            Ok(())
        } else {
            warn!("Notify endpoint answered {}", status);
            Err(CommsError::HttpStatus(status))
        }
    }
}
