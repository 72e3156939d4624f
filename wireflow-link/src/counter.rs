use crate::channel::ChannelId;
use dashmap::DashMap;

/// Count of senders attached to each shared channel.
///
/// The table decides which sender closes a shared channel: every sender
/// releases once at shutdown, and only the release that brings the count to
/// zero may close. Entries update atomically per channel, so releases from
/// concurrently stopping units do not race each other.
#[derive(Debug, Default)]
pub struct SenderCounts {
    counts: DashMap<ChannelId, usize>,
}

impl SenderCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sender to the channel's count and return the new count.
    pub fn increment(&self, id: ChannelId) -> usize {
        let mut count = self.counts.entry(id).or_insert(0);
        *count += 1;
        *count
    }

    /// Drop one sender from the channel's count.
    ///
    /// Returns true when the count reached zero, meaning the caller was the
    /// last sender and may close the channel. A channel that was never
    /// counted, or already sits at zero, also reports true.
    pub fn decrement(&self, id: ChannelId) -> bool {
        let Some(mut count) = self.counts.get_mut(&id) else {
            return true;
        };
        if *count == 0 {
            return true;
        }
        *count -= 1;
        *count == 0
    }

    /// Current sender count of the channel.
    pub fn count(&self, id: ChannelId) -> usize {
        self.counts.get(&id).map(|count| *count).unwrap_or(0)
    }
}
