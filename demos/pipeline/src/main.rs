//! A small process network driven by hand: one feed, two uppercasing
//! workers sharing the feed's channel, one printer merging their output.
//!
//! Wiring is done by the graph; this binary plays the scheduler role,
//! spawning each unit on a task and releasing shared channels through the
//! close-once protocol when its senders finish.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use wireflow::{Capacity, Graph, Inport, NodeSlot, Outport, PortSpec, Slot, Unit, Wirable};

/// Feeds a fixed list of lines into the network.
struct LineFeed {
    lines: Vec<String>,
    output: Outport<String>,
}

impl LineFeed {
    fn new<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            lines: lines.into_iter().map(str::to_owned).collect(),
            output: Outport::new(),
        }
    }

    async fn run(self) -> Result<()> {
        let Self { lines, output } = self;
        for line in lines {
            output.send(line).await?;
        }
        Ok(())
    }
}

impl Unit for LineFeed {
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

/// Uppercases every line passing through.
struct Uppercase {
    input: Inport<String>,
    output: Outport<String>,
}

impl Uppercase {
    fn new() -> Self {
        Self {
            input: Inport::new(),
            output: Outport::new(),
        }
    }

    async fn run(self) -> Result<()> {
        while let Some(line) = self.input.recv().await? {
            self.output.send(line.to_uppercase()).await?;
        }
        Ok(())
    }
}

impl Unit for Uppercase {
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

/// Prints every line it receives.
struct Printer {
    input: Inport<String>,
}

impl Printer {
    fn new() -> Self {
        Self {
            input: Inport::new(),
        }
    }

    async fn run(self) -> Result<()> {
        while let Some(line) = self.input.recv().await? {
            println!("{}", line);
        }
        Ok(())
    }
}

impl Unit for Printer {
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

/// Hand a wired unit over from the graph to the task that will run it.
fn take_unit<W: Wirable>(graph: &mut Graph, name: &str) -> Result<Box<W>> {
    graph
        .remove(name)
        .and_then(NodeSlot::downcast)
        .ok_or_else(|| anyhow!("unit `{}` is missing", name))
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut graph = Graph::new();
    graph.add(
        "feed",
        LineFeed::new(["the quick brown fox", "jumps over", "the lazy dog"]),
    );
    graph.add("upper-1", Uppercase::new());
    graph.add("upper-2", Uppercase::new());
    graph.add("print", Printer::new());

    // both workers drain the feed's channel; the printer merges theirs
    graph.connect_buf("feed", "out", "upper-1", "in", Capacity::Bounded(8))?;
    graph.connect_buf("feed", "out", "upper-2", "in", Capacity::Bounded(8))?;
    graph.connect_buf("upper-1", "out", "print", "in", Capacity::Bounded(8))?;
    graph.connect_buf("upper-2", "out", "print", "in", Capacity::Bounded(8))?;

    let feed_channel = graph.connections()[0].channel().clone();
    let merge_channel = graph.connections()[2].channel().clone();

    let feed: Box<LineFeed> = take_unit(&mut graph, "feed")?;
    let upper_1: Box<Uppercase> = take_unit(&mut graph, "upper-1")?;
    let upper_2: Box<Uppercase> = take_unit(&mut graph, "upper-2")?;
    let printer: Box<Printer> = take_unit(&mut graph, "print")?;

    let graph = Arc::new(graph);

    let feeder = {
        let graph = graph.clone();
        let channel = feed_channel.clone();
        tokio::spawn(async move {
            feed.run().await?;
            graph.release_sender(&channel);
            anyhow::Ok(())
        })
    };

    let workers: Vec<_> = [upper_1, upper_2]
        .into_iter()
        .map(|worker| {
            let graph = graph.clone();
            let channel = merge_channel.clone();
            tokio::spawn(async move {
                worker.run().await?;
                graph.release_sender(&channel);
                anyhow::Ok(())
            })
        })
        .collect();

    let printing = tokio::spawn(printer.run());

    feeder.await??;
    for worker in workers {
        worker.await??;
    }
    printing.await??;
    Ok(())
}
