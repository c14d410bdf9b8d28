//! The two workers that bridge a subscriber socket to the hub.
//!
//! The reader turns inbound control frames into hub commands and watches the pong deadline.
//! The writer is the only task that writes to the socket: it drains the outbound queue,
//! coalescing whatever is already queued into one flush, and sends periodic pings.

use crate::connection::{ConnectionId, ConnectionSettings};
use crate::error::{transport_error, write_timeout, Error};
use crate::message::{subscription_error, Action, ControlMessage};
use crate::Hub;
use axum::body::Bytes;
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use log::*;
use std::error::Error as StdError;
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

pub async fn read_pump<R, E>(
    mut stream: R,
    connection_id: ConnectionId,
    hub: Hub,
    replies: mpsc::WeakSender<Message>,
    settings: ConnectionSettings,
) where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut deadline = Instant::now() + settings.pong_wait;

    loop {
        let next = match time::timeout_at(deadline, stream.next()).await {
            Ok(next) => next,
            Err(_) => {
                debug!("Connection {connection_id} missed its pong deadline");
                break;
            }
        };

        let message = match next {
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                warn!("ws receive error on connection {connection_id}: {e}");
                break;
            }
            None => break,
        };

        let result = match message {
            Message::Text(text) => handle_frame(
                text.as_str().as_bytes(),
                &connection_id,
                &hub,
                &replies,
                &settings,
            ),
            Message::Binary(data) => {
                handle_frame(&data, &connection_id, &hub, &replies, &settings)
            }
            Message::Pong(_) => {
                deadline = Instant::now() + settings.pong_wait;
                Ok(())
            }
            Message::Ping(_) => Ok(()),
            Message::Close(_) => break,
        };

        if let Err(e) = result {
            debug!("Reader for connection {connection_id} stopping: {e}");
            break;
        }
    }

    trace!("Reader for connection {connection_id} finished");
}

fn handle_frame(
    bytes: &[u8],
    connection_id: &ConnectionId,
    hub: &Hub,
    replies: &mpsc::WeakSender<Message>,
    settings: &ConnectionSettings,
) -> Result<(), Error> {
    if bytes.len() > settings.max_message_size {
        return Err(transport_error(format!(
            "frame of {} bytes exceeds the {} byte limit",
            bytes.len(),
            settings.max_message_size
        )));
    }

    let control = match ControlMessage::decode(bytes) {
        Ok(control) => control,
        Err(e) => {
            debug!("Malformed control frame from connection {connection_id}: {e}");
            reply(replies, subscription_error(&e));
            return Ok(());
        }
    };

    let topics = control.topics();
    match control.action {
        Some(Action::Subscribe) if !topics.is_empty() => {
            hub.subscribe(connection_id.clone(), topics)
        }
        Some(Action::Unsubscribe) if !topics.is_empty() => {
            hub.unsubscribe(connection_id.clone(), topics)
        }
        _ => {
            trace!("Ignoring control frame {control:?} from connection {connection_id}");
            Ok(())
        }
    }
}

/// Best effort: a full or closed queue drops the reply instead of blocking the reader.
fn reply(replies: &mpsc::WeakSender<Message>, message: Message) {
    match replies.upgrade() {
        Some(outbound) => {
            if let Err(e) = outbound.try_send(message) {
                debug!("Dropping error reply: {e}");
            }
        }
        None => debug!("Dropping error reply: outbound queue already closed"),
    }
}

pub async fn write_pump<W>(
    mut sink: W,
    mut queue: mpsc::Receiver<Message>,
    settings: ConnectionSettings,
) where
    W: Sink<Message> + Unpin,
    W::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let ping_period = settings.ping_period();
    let mut ticker = time::interval_at(Instant::now() + ping_period, ping_period);

    loop {
        tokio::select! {
            next = queue.recv() => {
                let Some(message) = next else {
                    // Unregistered and drained.
                    if let Err(e) = send_with_deadline(&mut sink, Message::Close(None), &settings).await {
                        debug!("Failed to send close frame: {e}");
                    }
                    break;
                };

                if let Err(e) = write_batch(&mut sink, &mut queue, message, &settings).await {
                    debug!("Writer stopping: {e}");
                    break;
                }
            }
            _ = ticker.tick() => {
                if let Err(e) = send_with_deadline(&mut sink, Message::Ping(Bytes::new()), &settings).await {
                    debug!("Writer stopping after failed ping: {e}");
                    break;
                }
            }
        }
    }

    match time::timeout(settings.write_wait, sink.close()).await {
        Ok(Ok(())) => trace!("Socket closed"),
        Ok(Err(e)) => {
            let e: Box<dyn StdError + Send + Sync> = e.into();
            trace!("Socket close reported: {e}");
        }
        Err(_) => debug!("Timed out closing socket"),
    }
}

/// Writes `first` plus whatever was already queued when it arrived, then flushes once.
async fn write_batch<W>(
    sink: &mut W,
    queue: &mut mpsc::Receiver<Message>,
    first: Message,
    settings: &ConnectionSettings,
) -> Result<(), Error>
where
    W: Sink<Message> + Unpin,
    W::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let pending = queue.len();
    let batch = async {
        sink.feed(first).await?;
        for _ in 0..pending {
            match queue.try_recv() {
                Ok(message) => sink.feed(message).await?,
                Err(_) => break,
            }
        }
        sink.flush().await
    };

    match time::timeout(settings.write_wait, batch).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(transport_error(e)),
        Err(_) => Err(write_timeout()),
    }
}

async fn send_with_deadline<W>(
    sink: &mut W,
    message: Message,
    settings: &ConnectionSettings,
) -> Result<(), Error>
where
    W: Sink<Message> + Unpin,
    W::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    match time::timeout(settings.write_wait, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(transport_error(e)),
        Err(_) => Err(write_timeout()),
    }
}
