//! Topic routing for WebSocket subscribers.
//!
//! This crate owns everything between an upgraded subscriber socket and the publish
//! endpoint: the registry of who listens to what, the command loop that mutates it, and the
//! per-connection workers that move frames on and off the wire.
//!
//! # Architecture
//!
//! - **Single owner**: One `HubActor` task owns the `Registry`. Every register, subscribe,
//!   unsubscribe, unregister and broadcast is a `Command` sent over one FIFO channel, so no
//!   locks are involved and each sender's commands apply in order.
//! - **Dual-index registry**: Connections map to their topics and topics map back to their
//!   subscribers. A topic disappears with its last subscriber.
//! - **Bounded outbound queues**: Each connection gets a fixed-capacity queue. The hub never
//!   waits on one; a subscriber whose queue is full is evicted instead of slowing the others.
//! - **Two pumps per connection**: The reader applies control frames and enforces the pong
//!   deadline. The writer is the only task writing to the socket and sends periodic pings.
//!
//! # Message Flow
//!
//! 1. A client upgrades on `/{topic}`; `connection::serve` registers it and subscribes it
//!    to the path topic.
//! 2. The client may send `{"action":"subscribe","events":[...]}` frames to change topics.
//! 3. A publisher POSTs to `/publish/{topic}`; the handler calls `Hub::broadcast`.
//! 4. The actor serializes the envelope once and enqueues it for every subscriber.
//! 5. Each writer drains its queue to the socket.
//!
//! # Modules
//!
//! - `connection`: Connection identity, limits and the per-socket `serve` entry point
//! - `hub`: The `Hub` handle and the `HubActor` command loop
//! - `message`: Envelope and control-frame wire formats
//! - `pump`: Reader and writer workers
//! - `registry`: Connection <-> topic index

pub mod connection;
pub mod error;
pub mod hub;
pub mod message;
pub mod pump;
pub mod registry;

pub use connection::{serve, ConnectionId, ConnectionSettings};
pub use hub::{Hub, HubActor, HubStats};
pub use message::{Envelope, TopicKey};
