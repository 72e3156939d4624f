use crate::{port::SlotError, tag::TypeTag};
use log::debug;
use std::{
    any::Any,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};
use wireflow_config::Capacity;

/// Identity of an allocated channel.
///
/// Ids are unique for the lifetime of the process, so a channel allocated by
/// a nested graph never collides with one allocated by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

impl ChannelId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The typed flume pair behind an erased handle.
///
/// The anchor sender is what sender slots clone during wiring; taking it is
/// the one-time close signal. Receivers observe end-of-stream once the
/// anchor and every unit-held sender clone are gone.
struct ChannelCore<T> {
    rx: flume::Receiver<T>,
    tx: Mutex<Option<flume::Sender<T>>>,
}

impl<T> ChannelCore<T> {
    fn anchor(&self) -> MutexGuard<'_, Option<flume::Sender<T>>> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

trait ErasedCore: Any + Send + Sync {
    fn close(&self) -> bool;
    fn is_closed(&self) -> bool;
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Send + 'static> ErasedCore for ChannelCore<T> {
    fn close(&self) -> bool {
        self.anchor().take().is_some()
    }

    fn is_closed(&self) -> bool {
        self.anchor().is_none()
    }

    fn len(&self) -> usize {
        self.rx.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Type-erased handle to a live channel.
///
/// The handle is the single point where element types are re-specialized:
/// slots ask for a typed half with [`sender`](Self::sender) or
/// [`receiver`](Self::receiver) and a tag mismatch is reported right there.
/// Clones refer to the same channel; identity is the [`ChannelId`].
#[derive(Clone)]
pub struct ChannelHandle {
    id: ChannelId,
    elem: TypeTag,
    capacity: Capacity,
    core: Arc<dyn ErasedCore>,
}

impl ChannelHandle {
    /// Allocate a channel carrying elements of type `T`.
    pub fn new<T: Send + 'static>(capacity: Capacity) -> Self {
        let (tx, rx) = match capacity {
            Capacity::Bounded(size) => flume::bounded::<T>(size),
            Capacity::Unbounded => flume::unbounded::<T>(),
        };
        Self {
            id: ChannelId::next(),
            elem: TypeTag::of::<T>(),
            capacity,
            core: Arc::new(ChannelCore {
                rx,
                tx: Mutex::new(Some(tx)),
            }),
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Element type the channel carries.
    pub fn elem(&self) -> TypeTag {
        self.elem
    }

    /// Capacity the channel was allocated with.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Number of packets currently queued.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone a typed sender half out of the handle.
    pub fn sender<T: Send + 'static>(&self) -> Result<flume::Sender<T>, SlotError> {
        let core = self.specialized::<T>()?;
        core.anchor().as_ref().cloned().ok_or(SlotError::Closed)
    }

    /// Clone a typed receiver half out of the handle.
    pub fn receiver<T: Send + 'static>(&self) -> Result<flume::Receiver<T>, SlotError> {
        let core = self.specialized::<T>()?;
        Ok(core.rx.clone())
    }

    /// Drop the anchor sender, signalling that no further sender will be
    /// wired. Returns true if this call performed the close.
    pub fn close(&self) -> bool {
        let closed = self.core.close();
        if closed {
            debug!("channel {} closed", self.id);
        }
        closed
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    fn specialized<T: Send + 'static>(&self) -> Result<&ChannelCore<T>, SlotError> {
        self.core
            .as_any()
            .downcast_ref()
            .ok_or(SlotError::TypeMismatch {
                expected: TypeTag::of::<T>(),
                found: self.elem,
            })
    }
}

impl PartialEq for ChannelHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ChannelHandle {}

impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("id", &self.id)
            .field("elem", &self.elem.name())
            .field("capacity", &self.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}
