//! Persisted device settings
//!
//! The key/value schema for everything the device keeps across reboots:
//! Wi-Fi station and soft-AP credentials plus the last reported person
//! count. Key names and size limits match the settings-store layout the
//! provisioning tools write.

use hal_abstractions::kv::{KeyValueStorage, KvError};
use heapless::String;

const WIFI_STA_SSID_KEY: &str = "wifi_ssid";
const WIFI_STA_PASS_KEY: &str = "wifi_pass";
const WIFI_AP_SSID_KEY: &str = "softap_ssid";
const WIFI_AP_PASS_KEY: &str = "softap_pass";
const COUNTER_KEY: &str = "pers_count";

/// Maximum SSID length the radio accepts.
pub const SSID_LEN: usize = 32;
/// Maximum passphrase length the radio accepts.
pub const PASS_LEN: usize = 64;

/// Wi-Fi credentials for station and soft-AP operation.
///
/// Missing records load as empty strings; an empty SSID means the
/// corresponding mode is unconfigured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WifiSettings {
    /// Station SSID.
    pub sta_ssid: String<SSID_LEN>,
    /// Station passphrase.
    pub sta_pass: String<PASS_LEN>,
    /// Soft-AP SSID.
    pub ap_ssid: String<SSID_LEN>,
    /// Soft-AP passphrase.
    pub ap_pass: String<PASS_LEN>,
}

impl WifiSettings {
    /// Load stored credentials. Absent or oversized records yield empty
    /// fields rather than an error; the caller checks [`has_sta`] before
    /// attempting to associate.
    ///
    /// [`has_sta`]: WifiSettings::has_sta
    pub fn load<K: KeyValueStorage>(kv: &K) -> Self {
        Self {
            sta_ssid: load_str(kv, WIFI_STA_SSID_KEY),
            sta_pass: load_str(kv, WIFI_STA_PASS_KEY),
            ap_ssid: load_str(kv, WIFI_AP_SSID_KEY),
            ap_pass: load_str(kv, WIFI_AP_PASS_KEY),
        }
    }

    /// Whether station credentials are present.
    pub fn has_sta(&self) -> bool {
        !self.sta_ssid.is_empty()
    }

    /// Whether a soft-AP is configured.
    pub fn has_ap(&self) -> bool {
        !self.ap_ssid.is_empty()
    }

    /// Persist the station credentials.
    pub fn store_sta<K: KeyValueStorage>(&self, kv: &mut K) -> Result<(), KvError> {
        kv.set_str(WIFI_STA_SSID_KEY, &self.sta_ssid)?;
        kv.set_str(WIFI_STA_PASS_KEY, &self.sta_pass)?;
        kv.commit()
    }

    /// Persist the soft-AP credentials.
    pub fn store_ap<K: KeyValueStorage>(&self, kv: &mut K) -> Result<(), KvError> {
        kv.set_str(WIFI_AP_SSID_KEY, &self.ap_ssid)?;
        kv.set_str(WIFI_AP_PASS_KEY, &self.ap_pass)?;
        kv.commit()
    }
}

/// Load the persisted person counter; zero when never stored.
pub fn load_counter<K: KeyValueStorage>(kv: &K) -> u16 {
    kv.get_u16(COUNTER_KEY).unwrap_or(0)
}

/// Persist the person counter.
pub fn store_counter<K: KeyValueStorage>(kv: &mut K, count: u16) -> Result<(), KvError> {
    kv.set_u16(COUNTER_KEY, count)?;
    kv.commit()
}

fn load_str<K: KeyValueStorage, const N: usize>(kv: &K, key: &str) -> String<N> {
    let mut buf = [0u8; N];
    let mut out = String::new();
    if let Ok(len) = kv.get_str(key, &mut buf) {
        if let Ok(value) = core::str::from_utf8(&buf[..len]) {
            // Capacity equals the buffer size, so this cannot overflow.
            let _ = out.push_str(value);
        }
    }
    out
}
