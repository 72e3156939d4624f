use crate::{
    channel::{ChannelHandle, ChannelId},
    tag::TypeTag,
};
use anyhow::{anyhow, bail, Result};
use std::fmt;
use wireflow_config::{Capacity, Direction};

/// Wiring-time view of a port: the mutable slot a connect call attaches a
/// channel to.
///
/// A slot holds at most one channel for the lifetime of its port instance.
/// Re-attaching the channel it already holds is a no-op; attaching a
/// different one is refused.
pub trait Slot {
    /// Direction declared for the port.
    fn direction(&self) -> Direction;
    /// Element type the port carries.
    fn elem(&self) -> TypeTag;
    /// Identity of the channel the slot is bound to, if any.
    fn bound(&self) -> Option<ChannelId>;
    /// Adopt a channel into the slot.
    fn attach(&mut self, channel: &ChannelHandle) -> Result<(), SlotError>;
    /// Clear the slot.
    fn detach(&mut self);
    /// Allocate a fresh channel matching the slot's element type.
    fn alloc(&self, capacity: Capacity) -> ChannelHandle;
}

/// Reasons an attach step refuses a slot/channel pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("port direction {declared} does not allow {required}")]
    WrongDirection {
        required: Direction,
        declared: Direction,
    },
    #[error("port is already attached to a different channel")]
    NotAssignable,
    #[error("channel carries {found} but the port expects {expected}")]
    TypeMismatch { expected: TypeTag, found: TypeTag },
    #[error("channel is closed")]
    Closed,
}

/// Receiving port of a process unit.
pub struct Inport<T> {
    binding: Option<(ChannelId, flume::Receiver<T>)>,
}

impl<T> fmt::Debug for Inport<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Inport")
            .field("channel", &self.binding.as_ref().map(|(id, _)| *id))
            .finish()
    }
}

impl<T: Send + 'static> Inport<T> {
    pub fn new() -> Self {
        Self { binding: None }
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_some()
    }

    /// Identity of the attached channel.
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.binding.as_ref().map(|(id, _)| *id)
    }

    /// Take the next packet, waiting for one to arrive.
    ///
    /// Returns `Ok(None)` once the channel is closed and drained.
    pub async fn recv(&self) -> Result<Option<T>> {
        let (_, rx) = self
            .binding
            .as_ref()
            .ok_or_else(|| anyhow!("port is not attached"))?;
        match rx.recv_async().await {
            Ok(value) => Ok(Some(value)),
            Err(flume::RecvError::Disconnected) => Ok(None),
        }
    }

    /// Take a packet without waiting. Returns `Ok(None)` when nothing is
    /// queued right now.
    pub fn try_recv(&self) -> Result<Option<T>> {
        let (_, rx) = self
            .binding
            .as_ref()
            .ok_or_else(|| anyhow!("port is not attached"))?;
        match rx.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(flume::TryRecvError::Empty) | Err(flume::TryRecvError::Disconnected) => Ok(None),
        }
    }
}

impl<T: Send + 'static> Default for Inport<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Slot for Inport<T> {
    fn direction(&self) -> Direction {
        Direction::Receive
    }

    fn elem(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn bound(&self) -> Option<ChannelId> {
        self.channel_id()
    }

    fn attach(&mut self, channel: &ChannelHandle) -> Result<(), SlotError> {
        if let Some((id, _)) = &self.binding {
            if *id != channel.id() {
                return Err(SlotError::NotAssignable);
            }
            return Ok(());
        }
        let rx = channel.receiver::<T>()?;
        self.binding = Some((channel.id(), rx));
        Ok(())
    }

    fn detach(&mut self) {
        self.binding = None;
    }

    fn alloc(&self, capacity: Capacity) -> ChannelHandle {
        ChannelHandle::new::<T>(capacity)
    }
}

/// Sending port of a process unit.
pub struct Outport<T> {
    binding: Option<(ChannelId, flume::Sender<T>)>,
}

impl<T> fmt::Debug for Outport<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Outport")
            .field("channel", &self.binding.as_ref().map(|(id, _)| *id))
            .finish()
    }
}

impl<T: Send + 'static> Outport<T> {
    pub fn new() -> Self {
        Self { binding: None }
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_some()
    }

    /// Identity of the attached channel.
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.binding.as_ref().map(|(id, _)| *id)
    }

    /// Emit a packet, waiting for buffer room on a bounded channel.
    pub async fn send(&self, value: T) -> Result<()> {
        let (_, tx) = self
            .binding
            .as_ref()
            .ok_or_else(|| anyhow!("port is not attached"))?;
        if tx.send_async(value).await.is_err() {
            bail!("channel is closed");
        }
        Ok(())
    }

    /// Emit a packet if the channel has room for it right now.
    pub fn try_send(&self, value: T) -> Result<()> {
        let (_, tx) = self
            .binding
            .as_ref()
            .ok_or_else(|| anyhow!("port is not attached"))?;
        match tx.try_send(value) {
            Ok(()) => Ok(()),
            Err(flume::TrySendError::Full(_)) => bail!("channel is full"),
            Err(flume::TrySendError::Disconnected(_)) => bail!("channel is closed"),
        }
    }
}

impl<T: Send + 'static> Default for Outport<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Slot for Outport<T> {
    fn direction(&self) -> Direction {
        Direction::Send
    }

    fn elem(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn bound(&self) -> Option<ChannelId> {
        self.channel_id()
    }

    fn attach(&mut self, channel: &ChannelHandle) -> Result<(), SlotError> {
        if let Some((id, _)) = &self.binding {
            if *id != channel.id() {
                return Err(SlotError::NotAssignable);
            }
            return Ok(());
        }
        let tx = channel.sender::<T>()?;
        self.binding = Some((channel.id(), tx));
        Ok(())
    }

    fn detach(&mut self) {
        self.binding = None;
    }

    fn alloc(&self, capacity: Capacity) -> ChannelHandle {
        ChannelHandle::new::<T>(capacity)
    }
}

/// Port wirable as either end, for units that loop packets back to
/// themselves or pass a shared channel through.
pub struct Duplex<T> {
    binding: Option<(ChannelId, flume::Sender<T>, flume::Receiver<T>)>,
}

impl<T> fmt::Debug for Duplex<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Duplex")
            .field("channel", &self.binding.as_ref().map(|(id, _, _)| *id))
            .finish()
    }
}

impl<T: Send + 'static> Duplex<T> {
    pub fn new() -> Self {
        Self { binding: None }
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_some()
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.binding.as_ref().map(|(id, _, _)| *id)
    }

    /// Emit a packet, waiting for buffer room on a bounded channel.
    pub async fn send(&self, value: T) -> Result<()> {
        let (_, tx, _) = self
            .binding
            .as_ref()
            .ok_or_else(|| anyhow!("port is not attached"))?;
        if tx.send_async(value).await.is_err() {
            bail!("channel is closed");
        }
        Ok(())
    }

    /// Take the next packet, waiting for one to arrive.
    pub async fn recv(&self) -> Result<Option<T>> {
        let (_, _, rx) = self
            .binding
            .as_ref()
            .ok_or_else(|| anyhow!("port is not attached"))?;
        match rx.recv_async().await {
            Ok(value) => Ok(Some(value)),
            Err(flume::RecvError::Disconnected) => Ok(None),
        }
    }
}

impl<T: Send + 'static> Default for Duplex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Slot for Duplex<T> {
    fn direction(&self) -> Direction {
        Direction::Both
    }

    fn elem(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn bound(&self) -> Option<ChannelId> {
        self.channel_id()
    }

    fn attach(&mut self, channel: &ChannelHandle) -> Result<(), SlotError> {
        if let Some((id, _, _)) = &self.binding {
            if *id != channel.id() {
                return Err(SlotError::NotAssignable);
            }
            return Ok(());
        }
        let tx = channel.sender::<T>()?;
        let rx = channel.receiver::<T>()?;
        self.binding = Some((channel.id(), tx, rx));
        Ok(())
    }

    fn detach(&mut self) {
        self.binding = None;
    }

    fn alloc(&self, capacity: Capacity) -> ChannelHandle {
        ChannelHandle::new::<T>(capacity)
    }
}
