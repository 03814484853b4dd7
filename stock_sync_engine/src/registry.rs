//! The channel registry: N [`ChannelClient`] implementations selected by channel id.
//!
//! The engine never hard-codes a channel set; whatever the registry holds at construction time is what a
//! reconciliation batch iterates over.
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use crate::{db_types::ChannelId, traits::ChannelClient};

#[derive(Clone, Default)]
pub struct ChannelRegistry {
    clients: HashMap<ChannelId, Arc<dyn ChannelClient>>,
}

impl Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChannelRegistry({})", self.channels().iter().map(ChannelId::as_str).collect::<Vec<_>>().join(", "))
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client under its own channel id. The most recent registration for an id wins.
    pub fn register(&mut self, client: Arc<dyn ChannelClient>) -> &mut Self {
        self.clients.insert(client.channel().clone(), client);
        self
    }

    pub fn get(&self, channel: &ChannelId) -> Option<&Arc<dyn ChannelClient>> {
        self.clients.get(channel)
    }

    /// All registered channel ids in stable (sorted) order.
    pub fn channels(&self) -> Vec<ChannelId> {
        let mut channels = self.clients.keys().cloned().collect::<Vec<_>>();
        channels.sort();
        channels
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
