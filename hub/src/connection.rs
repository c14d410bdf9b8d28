use crate::message::TopicKey;
use crate::pump::{read_pump, write_pump};
use crate::Hub;
use axum::extract::ws::{Message, WebSocket};
use futures::StreamExt;
use log::*;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

/// Sending half of a connection's bounded outbound queue.
pub type Outbound = mpsc::Sender<Message>;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the hub needs to know about a live connection: who it is and where to deliver.
#[derive(Debug)]
pub struct Client {
    pub id: ConnectionId,
    pub outbound: Outbound,
}

impl Client {
    pub fn new(id: ConnectionId, outbound: Outbound) -> Self {
        Self { id, outbound }
    }
}

/// Per-connection limits and liveness timing.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub queue_capacity: usize,
    pub max_message_size: usize,
    /// Time allowed to read the next pong from the peer.
    pub pong_wait: Duration,
    /// Time allowed to write a message to the peer.
    pub write_wait: Duration,
}

impl ConnectionSettings {
    /// Pings go out every 9/10 of the pong wait so a healthy peer always answers in time.
    pub fn ping_period(&self) -> Duration {
        self.pong_wait * 9 / 10
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            max_message_size: 512,
            pong_wait: Duration::from_secs(60),
            write_wait: Duration::from_secs(10),
        }
    }
}

/// Runs one upgraded subscriber socket until both pumps are done.
///
/// The connection is registered with the hub before either pump starts, so any initial
/// subscription queued here is applied after the registration. Whichever pump ends first,
/// the connection is unregistered; if the writer died the reader is aborted, otherwise
/// the writer is left to flush whatever is still queued and close the socket.
pub async fn serve(
    socket: WebSocket,
    hub: Hub,
    settings: ConnectionSettings,
    initial_topic: Option<TopicKey>,
) {
    let id = ConnectionId::new();
    let (outbound, queue) = mpsc::channel(settings.queue_capacity);
    let replies = outbound.downgrade();

    if let Err(e) = hub.register(Client::new(id.clone(), outbound)) {
        error!("Failed to register connection {id}: {e}");
        return;
    }

    if let Some(topic) = initial_topic.filter(|topic| !topic.is_empty()) {
        if let Err(e) = hub.subscribe(id.clone(), vec![topic]) {
            error!("Failed to subscribe connection {id} to its path topic: {e}");
        }
    }

    let (sink, stream) = socket.split();
    let mut writer = tokio::spawn(write_pump(sink, queue, settings.clone()));
    let mut reader = tokio::spawn(read_pump(
        stream,
        id.clone(),
        hub.clone(),
        replies,
        settings,
    ));

    let writer_finished = tokio::select! {
        _ = &mut writer => {
            reader.abort();
            true
        }
        _ = &mut reader => false,
    };

    if let Err(e) = hub.unregister(id.clone()) {
        debug!("Hub already stopped while closing connection {id}: {e}");
    }

    if !writer_finished {
        if let Err(e) = writer.await {
            warn!("Writer for connection {id} ended abnormally: {e}");
        }
    }

    debug!("Connection {id} closed");
}
