//! Telemetry payload and topic formatting
//!
//! Pure formatting for the MQTT reporting path: the count report payload,
//! the device-scoped publish topic, and the broker identity derived from
//! the station MAC. No protocol machinery lives here; the board's
//! network stack owns connections and publishing.

use core::fmt::Write;

use heapless::String;

/// Rendered payload buffer size.
pub const PAYLOAD_LEN: usize = 128;
/// Rendered topic buffer size.
pub const TOPIC_LEN: usize = 128;
/// Hex MAC length: 6 bytes, two chars each.
pub const CLIENT_NAME_LEN: usize = 12;

/// JSON count report published every reporting interval.
pub fn count_payload(count: u8) -> String<PAYLOAD_LEN> {
    let mut out = String::new();
    // At most 34 rendered chars for a u8; capacity is 128.
    let _ = write!(out, "{{ \"type\": \"count\", \"value\": {} }}", count);
    out
}

/// Device-scoped publish topic: `<prefix>/<device-id>`. `None` when the
/// parts do not fit the topic buffer.
pub fn device_topic(prefix: &str, device_id: &str) -> Option<String<TOPIC_LEN>> {
    let mut out = String::new();
    out.push_str(prefix).ok()?;
    out.push('/').ok()?;
    out.push_str(device_id).ok()?;
    Some(out)
}

/// Broker user name derived from the station MAC, as lowercase hex.
pub fn client_name(mac: &[u8; 6]) -> String<CLIENT_NAME_LEN> {
    let mut out = String::new();
    for byte in mac {
        // Two chars per byte, capacity is exactly 12.
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_payload_matches_report_shape() {
        assert_eq!(
            count_payload(42).as_str(),
            "{ \"type\": \"count\", \"value\": 42 }"
        );
        assert_eq!(
            count_payload(255).as_str(),
            "{ \"type\": \"count\", \"value\": 255 }"
        );
    }

    #[test]
    fn device_topic_joins_prefix_and_id() {
        let topic = device_topic("site/entrance", "a0b1c2d3e4f5").unwrap();
        assert_eq!(topic.as_str(), "site/entrance/a0b1c2d3e4f5");
    }

    #[test]
    fn oversized_topic_is_refused() {
        let long = "x".repeat(TOPIC_LEN);
        assert!(device_topic(&long, "id").is_none());
    }

    #[test]
    fn client_name_is_lowercase_zero_padded_hex() {
        let mac = [0xA0, 0x0B, 0xC2, 0xD3, 0x04, 0xF5];
        assert_eq!(client_name(&mac).as_str(), "a00bc2d304f5");
    }
}
