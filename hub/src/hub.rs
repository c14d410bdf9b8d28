use crate::connection::{Client, ConnectionId};
use crate::error::{hub_unavailable, Error};
use crate::message::{Envelope, TopicKey};
use crate::registry::Registry;
use log::*;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

/// Point-in-time view of the registry, answered by the command loop itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    pub connections: usize,
    pub topics: usize,
    /// Subscribers of the topic named in the request.
    pub subscribers: usize,
}

/// Everything the hub's command loop can be asked to do. All commands travel over one FIFO
/// channel, so the commands of any single sender are applied in the order they were sent.
#[derive(Debug)]
pub enum Command {
    Register(Client),
    Unregister(ConnectionId),
    Subscribe {
        connection_id: ConnectionId,
        topics: Vec<TopicKey>,
    },
    Unsubscribe {
        connection_id: ConnectionId,
        topics: Vec<TopicKey>,
    },
    Broadcast(Envelope),
    Stats {
        topic: TopicKey,
        reply: oneshot::Sender<HubStats>,
    },
}

/// Cloneable handle to the hub's command loop. Submitting never blocks and never waits for
/// the command to be applied.
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<Command>,
}

impl Hub {
    /// Creates a handle and the actor it feeds. The actor must be driven with [`HubActor::run`].
    pub fn new() -> (Self, HubActor) {
        let (commands, inbox) = mpsc::unbounded_channel();
        (
            Self { commands },
            HubActor {
                inbox,
                registry: Registry::new(),
            },
        )
    }

    /// Creates a hub and spawns its command loop on the current tokio runtime.
    pub fn spawn() -> Self {
        let (hub, actor) = Self::new();
        tokio::spawn(actor.run());
        hub
    }

    pub fn register(&self, client: Client) -> Result<(), Error> {
        self.submit(Command::Register(client))
    }

    pub fn unregister(&self, connection_id: ConnectionId) -> Result<(), Error> {
        self.submit(Command::Unregister(connection_id))
    }

    pub fn subscribe(
        &self,
        connection_id: ConnectionId,
        topics: Vec<TopicKey>,
    ) -> Result<(), Error> {
        self.submit(Command::Subscribe {
            connection_id,
            topics,
        })
    }

    pub fn unsubscribe(
        &self,
        connection_id: ConnectionId,
        topics: Vec<TopicKey>,
    ) -> Result<(), Error> {
        self.submit(Command::Unsubscribe {
            connection_id,
            topics,
        })
    }

    /// Fire-and-forget: success means the broadcast was queued, not that anyone received it.
    pub fn broadcast(&self, envelope: Envelope) -> Result<(), Error> {
        self.submit(Command::Broadcast(envelope))
    }

    pub async fn stats(&self, topic: &str) -> Result<HubStats, Error> {
        let (reply, response) = oneshot::channel();
        self.submit(Command::Stats {
            topic: topic.to_string(),
            reply,
        })?;
        response.await.map_err(|_| hub_unavailable())
    }

    fn submit(&self, command: Command) -> Result<(), Error> {
        self.commands.send(command).map_err(|_| hub_unavailable())
    }
}

/// The single owner of the [`Registry`]. Every mutation and every delivery happens inside
/// [`HubActor::handle`], one command at a time, which is the only synchronization the
/// registry needs.
pub struct HubActor {
    pub(crate) inbox: mpsc::UnboundedReceiver<Command>,
    pub(crate) registry: Registry,
}

impl HubActor {
    /// Processes commands until every [`Hub`] handle has been dropped.
    pub async fn run(mut self) {
        info!("Hub started");

        while let Some(command) = self.inbox.recv().await {
            self.handle(command);
        }

        info!(
            "Hub stopped with {} connection(s) across {} topic(s)",
            self.registry.connection_count(),
            self.registry.topic_count()
        );
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Register(client) => {
                let connection_id = client.id.clone();
                if self.registry.register(client) {
                    info!("Registered connection {connection_id}");
                } else {
                    warn!("Connection {connection_id} is already registered");
                }
            }
            Command::Unregister(connection_id) => self.unregister(&connection_id),
            Command::Subscribe {
                connection_id,
                topics,
            } => {
                for topic in &topics {
                    if !self.registry.add_subscription(&connection_id, topic) {
                        debug!("Ignoring subscribe from unregistered connection {connection_id}");
                        return;
                    }
                }
                debug!("Connection {connection_id} subscribed to {topics:?}");
            }
            Command::Unsubscribe {
                connection_id,
                topics,
            } => {
                for topic in &topics {
                    if !self.registry.remove_subscription(&connection_id, topic) {
                        debug!(
                            "Ignoring unsubscribe from unregistered connection {connection_id}"
                        );
                        return;
                    }
                }
                debug!("Connection {connection_id} unsubscribed from {topics:?}");
            }
            Command::Broadcast(envelope) => self.broadcast(envelope),
            Command::Stats { topic, reply } => {
                let stats = HubStats {
                    connections: self.registry.connection_count(),
                    topics: self.registry.topic_count(),
                    subscribers: self.registry.subscribers_of(&topic).len(),
                };
                // The requester may have given up waiting.
                let _ = reply.send(stats);
            }
        }
    }

    /// Removing the registry record drops the hub's sender, which closes the connection's
    /// outbound queue; its writer flushes what is left and closes the socket.
    fn unregister(&mut self, connection_id: &ConnectionId) {
        if self.registry.remove_connection(connection_id).is_some() {
            info!("Unregistered connection {connection_id}");
        }
    }

    fn broadcast(&mut self, envelope: Envelope) {
        let subscribers = self.registry.subscribers_of(&envelope.event);
        if subscribers.is_empty() {
            trace!("No subscribers for topic {:?}", envelope.event);
            return;
        }

        let frame = match envelope.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize broadcast for {:?}: {e}", envelope.event);
                return;
            }
        };

        let mut unresponsive = Vec::new();
        for connection_id in subscribers {
            let Some(outbound) = self.registry.outbound(&connection_id) else {
                continue;
            };

            match outbound.try_send(frame.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!("Outbound queue full for connection {connection_id}, evicting it");
                    unresponsive.push(connection_id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Connection {connection_id} stopped reading, removing it");
                    unresponsive.push(connection_id);
                }
            }
        }

        for connection_id in unresponsive {
            self.unregister(&connection_id);
        }
    }
}
