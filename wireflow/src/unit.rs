use std::any::Any;
use wireflow_config::Direction;
use wireflow_link::Slot;

/// Describes one port of a unit type.
///
/// Descriptor tables are declared once per unit type and gate port lookup by
/// name, so an unknown port name is caught before any slot is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    pub name: &'static str,
    pub direction: Direction,
}

impl PortSpec {
    /// A port the unit receives packets on.
    pub const fn receive(name: &'static str) -> Self {
        Self {
            name,
            direction: Direction::Receive,
        }
    }

    /// A port the unit sends packets on.
    pub const fn send(name: &'static str) -> Self {
        Self {
            name,
            direction: Direction::Send,
        }
    }

    /// A port wirable as either end.
    pub const fn duplex(name: &'static str) -> Self {
        Self {
            name,
            direction: Direction::Both,
        }
    }
}

/// A leaf process unit: a bundle of named, typed, directional ports.
///
/// Implementations list their ports in [`port_specs`](Unit::port_specs) and
/// hand out the matching slot in [`port_slot`](Unit::port_slot). The
/// execution loop of a unit belongs to the scheduler driving the network,
/// not to this trait.
pub trait Unit: Any + Send + Sync {
    /// The unit type's port descriptor table.
    fn port_specs(&self) -> &'static [PortSpec];

    /// Mutable slot of the named member port.
    fn port_slot(&mut self, name: &str) -> Option<&mut dyn Slot>;
}

/// Uniform port access over every node kind in a graph.
///
/// Leaf units get this through the blanket impl; [`Graph`](crate::Graph)
/// implements it by delegating to its exported boundary ports, which lets a
/// composite network be wired as if it were a single process, its internal
/// topology opaque to the enclosing graph. Wiring code dispatches only
/// through this trait.
///
/// Member lookup is direction-blind: a port found under the wrong end of a
/// connection is rejected later, when the channel is attached.
pub trait Wirable: Any + Send + Sync {
    /// Slot used to send out of this node through the named port.
    fn outbound_slot(&mut self, name: &str) -> Option<&mut dyn Slot>;

    /// Slot used to receive into this node through the named port.
    fn inbound_slot(&mut self, name: &str) -> Option<&mut dyn Slot>;
}

impl<U: Unit> Wirable for U {
    fn outbound_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
        if !self.port_specs().iter().any(|spec| spec.name == name) {
            return None;
        }
        self.port_slot(name)
    }

    fn inbound_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
        if !self.port_specs().iter().any(|spec| spec.name == name) {
            return None;
        }
        self.port_slot(name)
    }
}
