//! Millisecond-precision timestamps.
//!
//! Timestamps travel over the wire and into the database as Unix epoch
//! milliseconds, so anything finer is dropped at creation time to keep values
//! equal after a round trip.

use time::UtcDateTime;
use time::error::ComponentRange;

/// Current time, truncated to whole milliseconds.
pub fn now() -> UtcDateTime {
    let now = UtcDateTime::now();
    now.replace_nanosecond(u32::from(now.millisecond()) * 1_000_000).unwrap_or(now)
}

pub fn to_millis(datetime: UtcDateTime) -> i64 {
    i64::try_from(datetime.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

pub fn from_millis(millis: i64) -> Result<UtcDateTime, ComponentRange> {
    UtcDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}

/// `#[serde(with = "...")]` adapter for [`UtcDateTime`] as epoch milliseconds.
pub mod millis {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::UtcDateTime;

    pub fn serialize<S: Serializer>(datetime: &UtcDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(super::to_millis(*datetime))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UtcDateTime, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        super::from_millis(millis).map_err(D::Error::custom)
    }

    pub mod option {
        use serde::{Serialize, Serializer};
        use time::UtcDateTime;

        pub fn serialize<S: Serializer>(datetime: &Option<UtcDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
            datetime.map(crate::timestamp::to_millis).serialize(serializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_survives_round_trip() {
        let now = now();
        assert_eq!(from_millis(to_millis(now)).unwrap(), now);
    }

    #[test]
    fn test_from_millis() {
        let datetime = from_millis(1_700_000_000_123).unwrap();
        assert_eq!(datetime.unix_timestamp(), 1_700_000_000);
        assert_eq!(datetime.millisecond(), 123);
    }
}
