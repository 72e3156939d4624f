use crate::{error::Error, unit::Wirable};
use indexmap::IndexMap;
use log::debug;
use std::{any::Any, fmt, fmt::Display, sync::Arc};
use wireflow_config::{Address, Capacity, Direction, GraphConfig};
use wireflow_link::{ChannelHandle, SenderCounts, Slot, SlotError};

/// A registered node: a leaf unit or a nested graph, owned or shared.
///
/// An owned node is always wirable. A shared node is wirable only while the
/// registry holds the sole strong reference to it; once an outside handle
/// aliases it, wiring fails with
/// [`ProcessNotSettable`](Error::ProcessNotSettable).
pub enum NodeSlot {
    Owned(Box<dyn Wirable>),
    Shared(Arc<dyn Wirable>),
}

impl NodeSlot {
    /// Recover the concrete node type, consuming the slot.
    ///
    /// Returns `None` for a type mismatch or a shared node. This is the
    /// hand-off point for the scheduler, which takes wired units out of the
    /// graph to run them.
    pub fn downcast<W: Wirable>(self) -> Option<Box<W>> {
        match self {
            NodeSlot::Owned(node) => {
                let node: Box<dyn Any> = node;
                node.downcast().ok()
            }
            NodeSlot::Shared(_) => None,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, NodeSlot::Shared(_))
    }
}

impl fmt::Debug for NodeSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeSlot::Owned(_) => f.write_str("Owned(..)"),
            NodeSlot::Shared(_) => f.write_str("Shared(..)"),
        }
    }
}

/// One realized edge of the network.
///
/// Connections are immutable once recorded. The graph keeps them in call
/// order, which is also the scan order for channel reuse.
#[derive(Debug, Clone)]
pub struct Connection {
    source: Address,
    target: Address,
    channel: ChannelHandle,
    capacity: Capacity,
}

impl Connection {
    pub fn source(&self) -> &Address {
        &self.source
    }

    pub fn target(&self) -> &Address {
        &self.target
    }

    pub fn channel(&self) -> &ChannelHandle {
        &self.channel
    }

    /// Capacity requested by the connect call. An adopted channel keeps the
    /// capacity it was first allocated with.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }
}

impl Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// A process network under construction: the process registry, the realized
/// connection list and the shared-channel sender counts.
///
/// Wiring takes `&mut self`, so connect calls against one graph are
/// serialized by exclusive access rather than an internal lock; only the
/// sender-count table is shared with concurrently stopping units at
/// shutdown and synchronizes internally.
#[derive(Debug)]
pub struct Graph {
    config: GraphConfig,
    nodes: IndexMap<String, NodeSlot>,
    connections: Vec<Connection>,
    counts: SenderCounts,
    inports: IndexMap<String, Address>,
    outports: IndexMap<String, Address>,
}

impl Graph {
    /// An empty graph with default wiring configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            nodes: IndexMap::new(),
            connections: Vec::new(),
            counts: SenderCounts::new(),
            inports: IndexMap::new(),
            outports: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Register a node under a name. A node is a leaf unit or a nested
    /// graph; registering the same name again replaces the earlier node.
    pub fn add<W>(&mut self, name: impl Into<String>, node: W)
    where
        W: Wirable,
    {
        self.nodes
            .insert(name.into(), NodeSlot::Owned(Box::new(node)));
    }

    /// Register a node the registry does not own. The node stays wirable
    /// only while this is the sole strong reference to it.
    pub fn add_shared(&mut self, name: impl Into<String>, node: Arc<dyn Wirable>) {
        self.nodes.insert(name.into(), NodeSlot::Shared(node));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Names of the registered nodes, in registration order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Take a node out of the registry, e.g. to hand it to the scheduler
    /// once wiring is complete.
    pub fn remove(&mut self, name: &str) -> Option<NodeSlot> {
        self.nodes.shift_remove(name)
    }

    /// The realized connections, in call order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Export an inner receiving port under a boundary name, making this
    /// graph wirable as a receiver by an enclosing graph.
    pub fn map_in_port(
        &mut self,
        name: impl Into<String>,
        process: &str,
        port: &str,
    ) -> Result<(), Error> {
        const OP: &str = "export in-port";
        if !self.nodes.contains_key(process) {
            return Err(Error::process_not_found(OP, process));
        }
        self.inports.insert(name.into(), Address::parse(process, port));
        Ok(())
    }

    /// Export an inner sending port under a boundary name, making this
    /// graph wirable as a sender by an enclosing graph.
    pub fn map_out_port(
        &mut self,
        name: impl Into<String>,
        process: &str,
        port: &str,
    ) -> Result<(), Error> {
        const OP: &str = "export out-port";
        if !self.nodes.contains_key(process) {
            return Err(Error::process_not_found(OP, process));
        }
        self.outports
            .insert(name.into(), Address::parse(process, port));
        Ok(())
    }

    /// Wire `sender.sender_port` to `receiver.receiver_port` over a channel
    /// with the graph's default buffer size.
    pub fn connect(
        &mut self,
        sender: &str,
        sender_port: &str,
        receiver: &str,
        receiver_port: &str,
    ) -> Result<(), Error> {
        let capacity = self.config.buffer_size;
        self.connect_buf(sender, sender_port, receiver, receiver_port, capacity)
    }

    /// Wire `sender.sender_port` to `receiver.receiver_port` over a channel
    /// with the given capacity.
    ///
    /// An existing channel at the sender address (fan-out) or the receiver
    /// address (fan-in) is adopted instead of allocating; the requested
    /// capacity then only goes into the connection record. On success both
    /// endpoints are wired and one connection is recorded; on failure
    /// nothing is recorded and a partially attached sender is rolled back.
    pub fn connect_buf(
        &mut self,
        sender: &str,
        sender_port: &str,
        receiver: &str,
        receiver_port: &str,
        capacity: Capacity,
    ) -> Result<(), Error> {
        const OP: &str = "connect";

        let src = Address::parse(sender, sender_port);
        let dst = Address::parse(receiver, receiver_port);

        // Resolve both endpoints before touching either slot, so a bad
        // receiver address cannot leave a half-wired sender behind.
        self.endpoint_slot(&src, Direction::Send, OP)?;
        self.endpoint_slot(&dst, Direction::Receive, OP)?;

        // Fan-out first: reuse the sender's outbound channel. Otherwise
        // fan-in: join the receiver's inbound channel, which gains one
        // sender right away.
        let mut joined_fan_in = false;
        let found = match self.find_existing(&src, Direction::Send) {
            Some(channel) => {
                debug!("fan-out: {} reuses channel {}", src, channel.id());
                Some(channel)
            }
            None => match self.find_existing(&dst, Direction::Receive) {
                Some(channel) => {
                    self.counts.increment(channel.id());
                    joined_fan_in = true;
                    debug!("fan-in: {} joins channel {}", src, channel.id());
                    Some(channel)
                }
                None => None,
            },
        };
        let fresh = found.is_none();
        let found_id = found.as_ref().map(ChannelHandle::id);

        let src_slot = self.endpoint_slot(&src, Direction::Send, OP)?;
        let src_was_bound = src_slot.bound().is_some();
        let channel = match attach(src_slot, Direction::Send, found, capacity) {
            Ok(channel) => channel,
            Err(error) => {
                if joined_fan_in {
                    if let Some(id) = found_id {
                        self.counts.decrement(id);
                    }
                }
                return Err(Error::attach(&src, error));
            }
        };

        let attached = {
            let dst_slot = self.endpoint_slot(&dst, Direction::Receive, OP)?;
            attach(dst_slot, Direction::Receive, Some(channel.clone()), capacity)
        };
        if let Err(error) = attached {
            // Undo the sender attach: a failed connect leaves no
            // half-wired edge and no stray sender count behind.
            if joined_fan_in {
                self.counts.decrement(channel.id());
            }
            if !src_was_bound {
                self.endpoint_slot(&src, Direction::Send, OP)?.detach();
            }
            return Err(Error::attach(&dst, error));
        }

        if fresh {
            self.counts.increment(channel.id());
        }

        debug!("connected {} -> {} over channel {}", src, dst, channel.id());
        self.connections.push(Connection {
            source: src,
            target: dst,
            channel,
            capacity,
        });
        Ok(())
    }

    /// Current sender count of a channel.
    pub fn sender_count(&self, channel: &ChannelHandle) -> usize {
        self.counts.count(channel.id())
    }

    /// Release one sender of a channel at shutdown.
    ///
    /// Exactly the release that drops the last sender closes the channel
    /// and returns true; every other release returns false. This keeps a
    /// channel shared by several senders from being closed twice.
    pub fn release_sender(&self, channel: &ChannelHandle) -> bool {
        let last = self.counts.decrement(channel.id());
        if last {
            channel.close();
        }
        last
    }

    /// Channel of the first recorded connection whose source (`Send`) or
    /// target (`Receive`) address equals `addr`, scanning in call order.
    fn find_existing(&self, addr: &Address, end: Direction) -> Option<ChannelHandle> {
        self.connections.iter().find_map(|conn| {
            let candidate = match end {
                Direction::Send => &conn.source,
                _ => &conn.target,
            };
            (candidate == addr).then(|| conn.channel.clone())
        })
    }

    /// Resolve the mutable port slot behind an address for one end of a
    /// connection.
    fn endpoint_slot(
        &mut self,
        addr: &Address,
        required: Direction,
        op: &'static str,
    ) -> Result<&mut dyn Slot, Error> {
        let node = self
            .nodes
            .get_mut(&addr.process)
            .ok_or_else(|| Error::process_not_found(op, addr.process.as_str()))?;
        let wirable: &mut dyn Wirable = match node {
            NodeSlot::Owned(node) => node.as_mut(),
            NodeSlot::Shared(node) => Arc::get_mut(node)
                .ok_or_else(|| Error::process_not_settable(op, addr.process.as_str()))?,
        };
        let slot = match required {
            Direction::Send => wirable.outbound_slot(&addr.port),
            _ => wirable.inbound_slot(&addr.port),
        };
        slot.ok_or_else(|| Error::port_not_found(op, addr.process.as_str(), addr.port.as_str()))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// A nested graph is wired like any other process: its exported boundary
/// ports resolve to the inner slots they were mapped to.
impl Wirable for Graph {
    fn outbound_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
        let addr = self.outports.get(name)?.clone();
        self.endpoint_slot(&addr, Direction::Send, "connect").ok()
    }

    fn inbound_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
        let addr = self.inports.get(name)?.clone();
        self.endpoint_slot(&addr, Direction::Receive, "connect").ok()
    }
}

/// Validate one end of a connection and put a channel into its slot.
///
/// The required direction must be permitted by the slot's declared one.
/// With no channel found for reuse, a fresh one is allocated against the
/// slot's element type; the receiver end always adopts whatever the sender
/// end produced.
fn attach(
    slot: &mut dyn Slot,
    required: Direction,
    found: Option<ChannelHandle>,
    capacity: Capacity,
) -> Result<ChannelHandle, SlotError> {
    let declared = slot.direction();
    if !declared.permits(required) {
        return Err(SlotError::WrongDirection { required, declared });
    }
    let channel = match found {
        Some(channel) => channel,
        None => slot.alloc(capacity),
    };
    slot.attach(&channel)?;
    Ok(channel)
}
