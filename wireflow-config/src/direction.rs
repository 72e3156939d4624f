use serde::{Deserialize, Serialize};
use std::{fmt, fmt::Display};

/// The direction a port moves data in.
///
/// The direction is fixed when the port is declared on its process type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The port emits packets into a channel.
    Send,
    /// The port drains packets from a channel.
    Receive,
    /// The port may be wired as either end.
    Both,
}

impl Direction {
    /// Return true if a port declared with this direction can serve the
    /// `required` end of a connection.
    pub fn permits(self, required: Direction) -> bool {
        match required {
            Direction::Send => matches!(self, Direction::Send | Direction::Both),
            Direction::Receive => matches!(self, Direction::Receive | Direction::Both),
            Direction::Both => matches!(self, Direction::Both),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Direction::Send => "send",
            Direction::Receive => "receive",
            Direction::Both => "both",
        };
        text.fmt(f)
    }
}
