//! # Network Channel Contexts
//!
//! One context per channel, holding the pending connect and the pending
//! receives of that channel keyed by message type.
//!
//! ```text
//! NetworkConnected ──→ connect
//! NetworkMessage   ──→ receives[message_type]
//! NetworkError     ──→ connect          (ConnectError)
//!                  └─→ every receive    (any other code, cascaded)
//! NetworkClosed    ──→ connect + every receive (cascaded), context dropped
//! ```
//!
//! A context is removed as soon as it holds nothing pending. Completions are
//! resolved after the channel table lock is released.

use crate::adapters::{malformed_success, operation_failed, route};
use crate::domain::{Completion, PendingCompletion};
use crate::error::{CascadeCause, TaskError, TaskResult};
use crate::ports::NetworkChannel;
use parking_lot::Mutex;
use shared_bus::events::{NetworkClosed, NetworkConnected, NetworkError, NetworkMessage};
use shared_bus::{SubscriptionRegistry, SubscriptionScope};
use shared_types::{ChannelId, MessageObject, MessageType};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

const CONNECT: &str = "connect";
const RECEIVE: &str = "receive";

#[derive(Default)]
struct ChannelContext {
    connect: Option<PendingCompletion<()>>,
    receives: HashMap<MessageType, PendingCompletion<MessageObject>>,
}

impl ChannelContext {
    fn is_idle(&self) -> bool {
        self.connect.is_none() && self.receives.is_empty()
    }
}

type ChannelTable = HashMap<ChannelId, ChannelContext>;

#[derive(Default)]
pub struct NetworkTasks {
    channels: Arc<Mutex<ChannelTable>>,
}

impl NetworkTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `channel` to `address`.
    ///
    /// Resolves at once if the channel is already connected, and attaches to
    /// the pending connect if one is in flight.
    pub fn connect_async(&self, channel: &dyn NetworkChannel, address: SocketAddr) -> Completion<()> {
        if channel.is_connected() {
            return Completion::ready(Ok(()));
        }

        let id = channel.id();
        let completion = {
            let mut channels = self.channels.lock();
            let context = channels.entry(id.clone()).or_default();
            if let Some(pending) = &context.connect {
                debug!(channel = %id, "Attached to pending connect");
                return pending.completion();
            }
            let pending = PendingCompletion::new(CONNECT, id.to_string());
            let completion = pending.completion();
            context.connect = Some(pending);
            completion
        };

        debug!(channel = %id, %address, "Connecting channel");
        if let Err(error) = channel.connect(address) {
            warn!(channel = %id, %address, error = %error, "Channel rejected connect");
            let pending = take_connect(&mut self.channels.lock(), &id);
            if let Some(pending) = pending {
                pending.fail(TaskError::StartFailed {
                    operation: CONNECT,
                    key: id.to_string(),
                    source: error,
                });
            }
        }

        completion
    }

    /// Wait for the next message of `message_type` on `channel`, or attach
    /// to the wait already pending for it.
    pub fn receive_untyped(&self, channel: &ChannelId, message_type: MessageType) -> Completion<MessageObject> {
        let mut channels = self.channels.lock();
        let context = channels.entry(channel.clone()).or_default();
        match context.receives.get(&message_type) {
            Some(pending) => pending.completion(),
            None => {
                debug!(channel = %channel, message = %message_type, "Waiting for message");
                let pending = PendingCompletion::new(RECEIVE, format!("{channel}/{message_type}"));
                let completion = pending.completion();
                context.receives.insert(message_type, pending);
                completion
            }
        }
    }

    /// Wait for the next message of type `M` on `channel`.
    pub fn receive_async<M: Any + Send + Sync>(
        &self,
        channel: &ChannelId,
    ) -> impl Future<Output = TaskResult<Arc<M>>> + Send + 'static {
        let message_type = MessageType::of::<M>();
        let completion = self.receive_untyped(channel, message_type);
        let key = format!("{channel}/{message_type}");
        async move {
            completion.await?.downcast::<M>().map_err(|_| {
                malformed_success(RECEIVE, &key, format!("message is not a {}", message_type.name))
            })
        }
    }

    pub fn pending_receives(&self, channel: &ChannelId) -> usize {
        self.channels
            .lock()
            .get(channel)
            .map_or(0, |context| context.receives.len())
    }

    pub fn has_pending_connect(&self, channel: &ChannelId) -> bool {
        self.channels
            .lock()
            .get(channel)
            .is_some_and(|context| context.connect.is_some())
    }

    /// Channels with anything pending.
    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    pub fn install(
        &self,
        subscriptions: &SubscriptionRegistry,
        scope: &SubscriptionScope,
    ) -> Result<(), TaskError> {
        let channels = Arc::clone(&self.channels);
        route(subscriptions, scope, move |event: &NetworkConnected| {
            let pending = take_connect(&mut channels.lock(), &event.channel);
            match pending {
                Some(pending) => {
                    debug!(channel = %event.channel, "Channel connected");
                    pending.succeed(());
                }
                None => debug!(channel = %event.channel, "No pending connect for channel"),
            }
        })?;

        let channels = Arc::clone(&self.channels);
        route(subscriptions, scope, move |event: &NetworkMessage| {
            // Keyed by the payload itself, whatever type the event was tagged with.
            let message_type = MessageType::of_object(&event.message);
            let pending = {
                let mut table = channels.lock();
                let pending = table
                    .get_mut(&event.channel)
                    .and_then(|context| context.receives.remove(&message_type));
                prune(&mut table, &event.channel);
                pending
            };
            if let Some(pending) = pending {
                debug!(channel = %event.channel, message = %event.message_type, "Message received");
                pending.succeed(Arc::clone(&event.message));
            }
        })?;

        let channels = Arc::clone(&self.channels);
        route(subscriptions, scope, move |event: &NetworkError| {
            if event.code.is_connection_phase() {
                let pending = take_connect(&mut channels.lock(), &event.channel);
                if let Some(pending) = pending {
                    warn!(channel = %event.channel, code = %event.code, "Connect failed");
                    pending.fail(operation_failed(
                        CONNECT,
                        &event.channel,
                        format!("{}: {}", event.code, event.message),
                    ));
                }
                return;
            }

            let receives = {
                let mut table = channels.lock();
                let receives = table
                    .get_mut(&event.channel)
                    .map(|context| std::mem::take(&mut context.receives))
                    .unwrap_or_default();
                prune(&mut table, &event.channel);
                receives
            };
            if receives.is_empty() {
                return;
            }

            warn!(
                channel = %event.channel,
                code = %event.code,
                failed = receives.len(),
                "Channel error, failing pending receives"
            );
            let error = TaskError::CascadedFailure {
                channel: event.channel.clone(),
                cause: CascadeCause::Error(event.code),
                message: event.message.clone(),
            };
            for pending in receives.into_values() {
                pending.fail(error.clone());
            }
        })?;

        let channels = Arc::clone(&self.channels);
        route(subscriptions, scope, move |event: &NetworkClosed| {
            let Some(context) = channels.lock().remove(&event.channel) else {
                return;
            };

            warn!(
                channel = %event.channel,
                connect = context.connect.is_some(),
                receives = context.receives.len(),
                "Channel closed, failing pending operations"
            );
            let error = TaskError::CascadedFailure {
                channel: event.channel.clone(),
                cause: CascadeCause::Closed,
                message: String::from("channel closed"),
            };
            if let Some(pending) = context.connect {
                pending.fail(error.clone());
            }
            for pending in context.receives.into_values() {
                pending.fail(error.clone());
            }
        })
    }
}

fn take_connect(channels: &mut ChannelTable, channel: &ChannelId) -> Option<PendingCompletion<()>> {
    let pending = channels.get_mut(channel)?.connect.take();
    prune(channels, channel);
    pending
}

fn prune(channels: &mut ChannelTable, channel: &ChannelId) {
    if channels.get(channel).is_some_and(ChannelContext::is_idle) {
        channels.remove(channel);
    }
}
