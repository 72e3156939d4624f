//! Dynamic connection wiring for flow-based process networks.
//!
//! A network is a set of named process *units*, each exposing named,
//! directional, typed *ports*. The [`Graph`] realizes declared connections
//! by allocating or reusing channels between port slots:
//!
//! - **Fan-out**: a connection from an already wired sender address adopts
//!   that sender's outbound channel, so several receivers share it.
//! - **Fan-in**: a connection into an already wired receiver address joins
//!   that receiver's inbound channel, and the channel's sender count grows
//!   by one.
//!
//! Callers never see channel handles while wiring; reuse is keyed purely on
//! the `(process, port, key)` address identity. Port texts are written as
//! `name` or `name[key]`.
//!
//! The sender count gates shutdown: every sender releases its channel once
//! through [`Graph::release_sender`], and only the last release closes it,
//! so a channel shared by several senders is closed exactly once.
//!
//! Scheduling is out of scope: a scheduler takes the wired units out with
//! [`Graph::remove`] and drives them over their ports. Connects are purely
//! synchronous bookkeeping; blocking happens later, in the data plane, when
//! units send and receive.
//!
//! # Example
//!
//! ```
//! use wireflow::{Capacity, Graph, Inport, Outport, PortSpec, Slot, Unit};
//!
//! /// Repeats every line it receives.
//! struct Echo {
//!     input: Inport<String>,
//!     output: Outport<String>,
//! }
//!
//! impl Unit for Echo {
//!     fn port_specs(&self) -> &'static [PortSpec] {
//!         const SPECS: &[PortSpec] = &[PortSpec::receive("in"), PortSpec::send("out")];
//!         SPECS
//!     }
//!
//!     fn port_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
//!         match name {
//!             "in" => Some(&mut self.input),
//!             "out" => Some(&mut self.output),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), wireflow::Error> {
//!     let mut graph = Graph::new();
//!     graph.add("left", Echo { input: Inport::new(), output: Outport::new() });
//!     graph.add("right", Echo { input: Inport::new(), output: Outport::new() });
//!     graph.connect_buf("left", "out", "right", "in", Capacity::Bounded(4))?;
//!
//!     let connection = &graph.connections()[0];
//!     assert_eq!(connection.to_string(), "left.out -> right.in");
//!
//!     // The scheduler collaborator would take the wired units out and run
//!     // them; moving one packet by hand shows the ports are live.
//!     let left: Box<Echo> = graph.remove("left").unwrap().downcast().unwrap();
//!     let right: Box<Echo> = graph.remove("right").unwrap().downcast().unwrap();
//!     left.output.try_send("ping".to_owned()).unwrap();
//!     assert_eq!(right.input.try_recv().unwrap(), Some("ping".to_owned()));
//!     Ok(())
//! }
//! ```

mod error;
mod graph;
mod unit;

pub use error::Error;
pub use graph::{Connection, Graph, NodeSlot};
pub use unit::{PortSpec, Unit, Wirable};
pub use wireflow_config::{Address, Capacity, Direction, GraphConfig};
pub use wireflow_link::{
    ChannelHandle, ChannelId, Duplex, Inport, Outport, SenderCounts, Slot, SlotError, TypeTag,
};
