#![allow(dead_code)]

use wireflow::{Duplex, Inport, Outport, PortSpec, Slot, Unit};

/// Emits numbers.
pub struct NumberSource {
    pub output: Outport<i64>,
}

impl NumberSource {
    pub fn new() -> Self {
        Self {
            output: Outport::new(),
        }
    }
}

impl Unit for NumberSource {
    fn port_specs(&self) -> &'static [PortSpec] {
        const SPECS: &[PortSpec] = &[PortSpec::send("out")];
        SPECS
    }

    fn port_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
        match name {
            "out" => Some(&mut self.output),
            _ => None,
        }
    }
}

/// Collects numbers.
pub struct NumberSink {
    pub input: Inport<i64>,
}

impl NumberSink {
    pub fn new() -> Self {
        Self {
            input: Inport::new(),
        }
    }
}

impl Unit for NumberSink {
    fn port_specs(&self) -> &'static [PortSpec] {
        const SPECS: &[PortSpec] = &[PortSpec::receive("in")];
        SPECS
    }

    fn port_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
        match name {
            "in" => Some(&mut self.input),
            _ => None,
        }
    }
}

/// Forwards numbers unchanged.
pub struct NumberRelay {
    pub input: Inport<i64>,
    pub output: Outport<i64>,
}

impl NumberRelay {
    pub fn new() -> Self {
        Self {
            input: Inport::new(),
            output: Outport::new(),
        }
    }
}

impl Unit for NumberRelay {
    fn port_specs(&self) -> &'static [PortSpec] {
        const SPECS: &[PortSpec] = &[PortSpec::receive("in"), PortSpec::send("out")];
        SPECS
    }

    fn port_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
        match name {
            "in" => Some(&mut self.input),
            "out" => Some(&mut self.output),
            _ => None,
        }
    }
}

/// Collects text.
pub struct TextSink {
    pub input: Inport<String>,
}

impl TextSink {
    pub fn new() -> Self {
        Self {
            input: Inport::new(),
        }
    }
}

impl Unit for TextSink {
    fn port_specs(&self) -> &'static [PortSpec] {
        const SPECS: &[PortSpec] = &[PortSpec::receive("in")];
        SPECS
    }

    fn port_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
        match name {
            "in" => Some(&mut self.input),
            _ => None,
        }
    }
}

/// Loops numbers through one bidirectional port.
pub struct LoopUnit {
    pub port: Duplex<i64>,
}

impl LoopUnit {
    pub fn new() -> Self {
        Self {
            port: Duplex::new(),
        }
    }
}

impl Unit for LoopUnit {
    fn port_specs(&self) -> &'static [PortSpec] {
        const SPECS: &[PortSpec] = &[PortSpec::duplex("loop")];
        SPECS
    }

    fn port_slot(&mut self, name: &str) -> Option<&mut dyn Slot> {
        match name {
            "loop" => Some(&mut self.port),
            _ => None,
        }
    }
}
