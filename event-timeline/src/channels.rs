//! Channel registry
//!
//! Insertion-ordered map of channel name to `Channel`. Every store owns its
//! own registry; the copies handed out by the store are fully independent.

use crate::types::{Channel, ChannelKind};
use std::collections::HashMap;

/// Insertion-ordered collection of channels keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelRegistry {
    channels: Vec<Channel>,
    index: HashMap<String, usize>,
}

impl ChannelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a channel by name
    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.index.get(name).map(|&i| &self.channels[i])
    }

    /// Check if a channel is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Kind of a registered channel
    pub fn kind_of(&self, name: &str) -> Option<ChannelKind> {
        self.get(name).map(|c| c.kind)
    }

    /// Number of registered channels
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channels in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    /// Names of the state channels in registration order
    pub fn state_channel_names(&self) -> Vec<String> {
        self.channels
            .iter()
            .filter(|c| c.is_state())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Insert a channel; returns false without change if the name is taken
    pub(crate) fn insert(&mut self, channel: Channel) -> bool {
        if self.contains(&channel.name) {
            return false;
        }
        self.index.insert(channel.name.clone(), self.channels.len());
        self.channels.push(channel);
        true
    }
}

impl<'a> IntoIterator for &'a ChannelRegistry {
    type Item = &'a Channel;
    type IntoIter = std::slice::Iter<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}
