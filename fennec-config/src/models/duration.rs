//! Human readable durations (`"500ms"`, `"1m 30s"`) for config files.
//!
//! Bare integers are read as milliseconds.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;
use std::time::Duration;

pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_duration(*value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    deserializer.deserialize_any(DurationVisitor)
}

struct DurationVisitor;

impl<'de> Visitor<'de> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration such as \"500ms\" or a number of milliseconds")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Duration, E> {
        humantime::parse_duration(value.trim()).map_err(|err| E::custom(format!("invalid duration {value:?}: {err}")))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Duration, E> {
        Ok(Duration::from_millis(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Duration, E> {
        u64::try_from(value)
            .map(Duration::from_millis)
            .map_err(|_| E::custom(format!("duration cannot be negative: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super")]
        window: Duration,
    }

    #[test]
    fn accepts_strings_and_milliseconds() {
        let parsed: Holder = serde_json::from_str(r#"{"window":"1s 250ms"}"#).unwrap();
        assert_eq!(parsed.window, Duration::from_millis(1_250));

        let parsed: Holder = serde_json::from_str(r#"{"window":750}"#).unwrap();
        assert_eq!(parsed.window, Duration::from_millis(750));

        assert!(serde_json::from_str::<Holder>(r#"{"window":-5}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"window":"soon"}"#).is_err());
    }

    #[test]
    fn writes_human_readable_form() {
        let json = serde_json::to_string(&Holder {
            window: Duration::from_millis(500),
        })
        .unwrap();
        assert_eq!(json, r#"{"window":"500ms"}"#);
    }
}
