use crate::connection::{Client, ConnectionId, Outbound};
use crate::message::TopicKey;
use std::collections::{HashMap, HashSet};

struct Membership {
    outbound: Outbound,
    topics: HashSet<TopicKey>,
}

/// Bidirectional connection <-> topic index.
///
/// Owned exclusively by the hub's command loop, so it carries no synchronization of its own.
/// The two maps mirror each other: a connection is in `topic_index[key]` exactly when `key` is
/// in that connection's own topic set, and a topic whose last subscriber leaves is dropped.
#[derive(Default)]
pub struct Registry {
    /// Primary storage: every registered connection with its outbound queue and topics.
    connections: HashMap<ConnectionId, Membership>,

    /// Secondary index: subscribers of each topic, for delivery.
    topic_index: HashMap<TopicKey, HashSet<ConnectionId>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty membership record. Registering an id twice keeps the first record.
    pub fn register(&mut self, client: Client) -> bool {
        if self.connections.contains_key(&client.id) {
            return false;
        }

        self.connections.insert(
            client.id,
            Membership {
                outbound: client.outbound,
                topics: HashSet::new(),
            },
        );
        true
    }

    /// Idempotent. Returns `false` for a connection that is not registered.
    pub fn add_subscription(&mut self, connection_id: &ConnectionId, key: &str) -> bool {
        let Some(membership) = self.connections.get_mut(connection_id) else {
            return false;
        };

        membership.topics.insert(key.to_string());
        self.topic_index
            .entry(key.to_string())
            .or_default()
            .insert(connection_id.clone());
        true
    }

    /// Idempotent. Drops the topic entry once its last subscriber is gone.
    pub fn remove_subscription(&mut self, connection_id: &ConnectionId, key: &str) -> bool {
        let Some(membership) = self.connections.get_mut(connection_id) else {
            return false;
        };

        membership.topics.remove(key);
        self.unindex(connection_id, key);
        true
    }

    /// Removes every membership the connection holds along with its own record and hands back
    /// its outbound sender. `None` when the connection was never registered or is already gone.
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Option<Outbound> {
        let membership = self.connections.remove(connection_id)?;

        for key in &membership.topics {
            self.unindex(connection_id, key);
        }

        Some(membership.outbound)
    }

    /// Snapshot of a topic's subscribers; empty when nobody listens.
    pub fn subscribers_of(&self, key: &str) -> Vec<ConnectionId> {
        self.topic_index
            .get(key)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn outbound(&self, connection_id: &ConnectionId) -> Option<&Outbound> {
        self.connections
            .get(connection_id)
            .map(|membership| &membership.outbound)
    }

    #[cfg(test)]
    pub(crate) fn topics_of(&self, connection_id: &ConnectionId) -> Option<&HashSet<TopicKey>> {
        self.connections
            .get(connection_id)
            .map(|membership| &membership.topics)
    }

    #[cfg(test)]
    pub(crate) fn is_registered(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn topic_count(&self) -> usize {
        self.topic_index.len()
    }

    fn unindex(&mut self, connection_id: &ConnectionId, key: &str) {
        if let Some(subscribers) = self.topic_index.get_mut(key) {
            subscribers.remove(connection_id);

            if subscribers.is_empty() {
                self.topic_index.remove(key);
            }
        }
    }
}
