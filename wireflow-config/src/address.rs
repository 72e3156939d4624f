use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, fmt::Display, str::FromStr};

/// A fully resolved port location within a network.
///
/// An address names a process, one of its ports and an optional key telling
/// keyed ports apart. Two addresses denote the same endpoint only if all
/// three parts match; the empty key is an identity of its own, distinct from
/// every concrete key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// Process name in the network.
    pub process: String,
    /// Port name of the process.
    pub port: String,
    /// Key part for keyed ports. Empty when the port text carries no key.
    pub key: String,
}

impl Address {
    /// Unfold a textual port name into its port and key parts.
    ///
    /// The accepted forms are `name` and `name[key]`. The text is scanned
    /// once: the first `[` ends the port name and starts key capture, and
    /// every later `]` overwrites the key with the substring gathered since
    /// that point, so with stray brackets the last `]` wins. Keys are kept
    /// verbatim and never interpreted numerically. There is no escaping.
    pub fn parse(process: &str, port: &str) -> Self {
        let mut split = None;
        let mut key = "";
        for (index, ch) in port.char_indices() {
            match ch {
                '[' if split.is_none() => split = Some(index),
                ']' => {
                    if let Some(start) = split {
                        key = &port[start + 1..index];
                    }
                }
                _ => {}
            }
        }
        let port = match split {
            Some(start) => &port[..start],
            None => port,
        };

        Self {
            process: process.to_owned(),
            port: port.to_owned(),
            key: key.to_owned(),
        }
    }

    /// Return true if the address carries a key part.
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}.{}", self.process, self.port)
        } else {
            write!(f, "{}.{}[{}]", self.process, self.port, self.key)
        }
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (process, port) = text
            .split_once('.')
            .ok_or_else(|| format!("invalid address {}", text))?;
        if process.is_empty() || port.is_empty() {
            return Err(format!("invalid address {}", text));
        }
        Ok(Self::parse(process, port))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'a> Deserialize<'a> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
