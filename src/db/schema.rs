use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

pub const DEVICES: &str = "devices";
pub const READINGS: &str = "readings";

/// Device columns plus the nested readings of that device.
pub const DEVICE_WITH_READINGS: &str = "*, readings(*)";

#[derive(Serialize, Debug)]
pub struct NewDevice<'a> {
    pub name: &'a str,
    pub location: &'a str,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Serialize, Debug)]
pub struct NewReading<'a> {
    // kept as returned by the backend, which may be an integer or a uuid
    pub device_id: &'a Value,
    pub co_level: f64,
    pub timestamp: DateTime<Utc>,
}

impl NewDevice<'_> {
    pub fn new<'a>(name: &'a str, location: &'a str, lat: f64, lng: f64) -> NewDevice<'a> {
        NewDevice {
            name,
            location,
            lat,
            lng,
        }
    }
}

impl NewReading<'_> {
    pub fn new(device_id: &Value, co_level: f64, timestamp: DateTime<Utc>) -> NewReading<'_> {
        NewReading {
            device_id,
            co_level,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn reading_payload_carries_device_id_and_iso_timestamp() {
        let id = json!(42);
        let timestamp = Utc.with_ymd_and_hms(2024, 7, 29, 10, 0, 0).unwrap();
        let payload = serde_json::to_value(NewReading::new(&id, 55.5, timestamp)).unwrap();
        assert_eq!(
            payload,
            json!({
                "device_id": 42,
                "co_level": 55.5,
                "timestamp": "2024-07-29T10:00:00Z"
            })
        );
    }

    #[test]
    fn device_payload_has_no_id() {
        let payload =
            serde_json::to_value(NewDevice::new("Sensor", "Lab", 40.7128, -74.006)).unwrap();
        assert!(payload.get("id").is_none());
        assert_eq!(payload["name"], "Sensor");
        assert_eq!(payload["lng"], -74.006);
    }
}
