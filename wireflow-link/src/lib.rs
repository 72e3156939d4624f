mod channel;
mod counter;
mod port;
mod tag;

pub use channel::{ChannelHandle, ChannelId};
pub use counter::SenderCounts;
pub use port::{Duplex, Inport, Outport, Slot, SlotError};
pub use tag::TypeTag;
