use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, fmt::Display};

/// Buffer capacity of a channel.
///
/// `Bounded(0)` is a rendezvous channel: a producer blocks until a consumer
/// is ready to take the packet over. An unbounded channel never blocks the
/// producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capacity {
    Bounded(usize),
    Unbounded,
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::Bounded(0)
    }
}

impl Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Capacity::Bounded(size) => size.fmt(f),
            Capacity::Unbounded => "unbounded".fmt(f),
        }
    }
}

impl Serialize for Capacity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Capacity::Bounded(size) => serializer.serialize_u64(size as u64),
            Capacity::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'a> Deserialize<'a> for Capacity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        deserializer.deserialize_any(CapacityVisitor)
    }
}

struct CapacityVisitor;

impl<'a> de::Visitor<'a> for CapacityVisitor {
    type Value = Capacity;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a buffer size or the string \"unbounded\"")
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Capacity::Bounded(value as usize))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        usize::try_from(value)
            .map(Capacity::Bounded)
            .map_err(|_| E::custom(format!("invalid buffer size {}", value)))
    }

    // json5 hands every number over as a float
    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64 {
            Ok(Capacity::Bounded(value as usize))
        } else {
            Err(E::custom(format!("invalid buffer size {}", value)))
        }
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match value {
            "unbounded" => Ok(Capacity::Unbounded),
            _ => Err(E::custom(format!("invalid buffer size '{}'", value))),
        }
    }
}
