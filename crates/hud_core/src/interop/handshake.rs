//! Registration handshake over a broadcast message bus
//!
//! One-time discovery protocol bootstrapping the first accessor: a
//! provider announces availability on a well-known channel, a consumer
//! requests registration and retries on a queue-style fallback channel
//! until it receives either the root accessor tuple (plus an unregister
//! function) or an explicit failure. Failure is terminal: once
//! signaled, the consumer must not retry and should disable itself.
//! Everything above this module depends only on the resulting root
//! accessor.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use super::accessor::NodeAccessor;

/// Well-known channel providers listen on for registration requests
pub const REGISTRATION_CHANNEL: ChannelId = ChannelId(1);

/// Fallback queue channel consumers retry on
pub const REGISTRATION_QUEUE_CHANNEL: ChannelId = ChannelId(2);

/// Retries before a consumer gives up on an absent provider
const MAX_ATTEMPTS: u32 = 5;

/// Bus channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u32);

/// Callback handed out with a successful registration; invoking it
/// detaches the consumer's subtree on the provider side
pub type UnregisterFn = Rc<dyn Fn()>;

/// Messages exchanged during the handshake
#[derive(Clone)]
pub enum BusMessage {
    /// Provider announcement on the well-known channel
    ProviderAvailable,
    /// Consumer registration request, with its private reply channel
    RegisterRequest {
        /// Channel the provider should answer on
        reply_on: ChannelId,
    },
    /// Success payload: the API root and an unregister function
    RegisterSuccess {
        /// Root accessor tuple of the provider's tree
        root: NodeAccessor,
        /// Detach function for teardown
        unregister: UnregisterFn,
    },
    /// Explicit, terminal failure signal
    RegisterFailure,
}

/// Broadcast message bus the host supplies
///
/// Only the handshake uses it; steady-state accessor calls never touch
/// the bus.
pub trait MessageBus {
    /// Post a message to a channel
    fn send(&mut self, channel: ChannelId, message: BusMessage);

    /// Drain all pending messages on a channel
    fn poll(&mut self, channel: ChannelId) -> Vec<BusMessage>;
}

/// In-process bus for tests and single-process hosts
#[derive(Default)]
pub struct LocalBus {
    queues: HashMap<ChannelId, VecDeque<BusMessage>>,
}

impl LocalBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageBus for LocalBus {
    fn send(&mut self, channel: ChannelId, message: BusMessage) {
        self.queues.entry(channel).or_default().push_back(message);
    }

    fn poll(&mut self, channel: ChannelId) -> Vec<BusMessage> {
        self.queues
            .get_mut(&channel)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }
}

/// Handshake failure, surfaced once to the embedding module
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// The provider explicitly refused registration
    #[error("provider refused registration")]
    Refused,
    /// No provider answered within the retry budget
    #[error("no provider answered after {0} attempts")]
    Exhausted(u32),
}

enum ClientState {
    Idle,
    Pending,
    Registered {
        root: NodeAccessor,
        unregister: UnregisterFn,
    },
    Failed(RegistrationError),
}

/// Consumer side of the handshake
///
/// Drive [`RegistrationClient::poll`] once per tick until it settles.
/// Once failed it stays failed and sends nothing further.
pub struct RegistrationClient {
    reply_channel: ChannelId,
    state: ClientState,
    attempts: u32,
}

impl RegistrationClient {
    /// Create a client replying on the given private channel
    pub fn new(reply_channel: ChannelId) -> Self {
        Self {
            reply_channel,
            state: ClientState::Idle,
            attempts: 0,
        }
    }

    /// Advance the handshake by one tick
    ///
    /// Returns the root accessor once registered.
    pub fn poll(&mut self, bus: &mut dyn MessageBus) -> Option<&NodeAccessor> {
        match &self.state {
            ClientState::Idle => {
                bus.send(
                    REGISTRATION_CHANNEL,
                    BusMessage::RegisterRequest {
                        reply_on: self.reply_channel,
                    },
                );
                self.attempts = 1;
                self.state = ClientState::Pending;
            }
            ClientState::Pending => {
                for message in bus.poll(self.reply_channel) {
                    match message {
                        BusMessage::RegisterSuccess { root, unregister } => {
                            log::info!("HUD registration succeeded");
                            self.state = ClientState::Registered { root, unregister };
                            break;
                        }
                        BusMessage::RegisterFailure => {
                            log::warn!("HUD registration refused by provider");
                            self.state = ClientState::Failed(RegistrationError::Refused);
                            break;
                        }
                        _ => {}
                    }
                }
                if matches!(self.state, ClientState::Pending) {
                    if self.attempts >= MAX_ATTEMPTS {
                        log::warn!("HUD registration gave up after {} attempts", self.attempts);
                        self.state =
                            ClientState::Failed(RegistrationError::Exhausted(self.attempts));
                    } else {
                        // Queue-style fallback retry
                        self.attempts += 1;
                        bus.send(
                            REGISTRATION_QUEUE_CHANNEL,
                            BusMessage::RegisterRequest {
                                reply_on: self.reply_channel,
                            },
                        );
                    }
                }
            }
            ClientState::Registered { .. } | ClientState::Failed(_) => {}
        }
        self.root()
    }

    /// The root accessor, once registered
    pub fn root(&self) -> Option<&NodeAccessor> {
        match &self.state {
            ClientState::Registered { root, .. } => Some(root),
            _ => None,
        }
    }

    /// Terminal failure state; the module should disable itself
    pub fn is_failed(&self) -> bool {
        matches!(self.state, ClientState::Failed(_))
    }

    /// The failure, if the handshake ended in one
    pub fn failure(&self) -> Option<&RegistrationError> {
        match &self.state {
            ClientState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Invoke the provider-supplied unregister function, ending the
    /// session
    pub fn unregister(self) {
        if let ClientState::Registered { unregister, .. } = self.state {
            unregister();
        }
    }
}

/// Provider side of the handshake
pub struct RegistrationHost {
    root: NodeAccessor,
    unregister: UnregisterFn,
    accepting: bool,
}

impl RegistrationHost {
    /// Create a host serving the given root accessor
    pub fn new(root: NodeAccessor, unregister: UnregisterFn) -> Self {
        Self {
            root,
            unregister,
            accepting: true,
        }
    }

    /// Stop accepting consumers; further requests get the terminal
    /// failure signal
    pub fn set_accepting(&mut self, accepting: bool) {
        self.accepting = accepting;
    }

    /// Announce availability on the well-known channel
    pub fn announce(&self, bus: &mut dyn MessageBus) {
        bus.send(REGISTRATION_CHANNEL, BusMessage::ProviderAvailable);
    }

    /// Answer all pending registration requests
    pub fn service(&mut self, bus: &mut dyn MessageBus) {
        let mut requests = bus.poll(REGISTRATION_CHANNEL);
        requests.extend(bus.poll(REGISTRATION_QUEUE_CHANNEL));
        for message in requests {
            if let BusMessage::RegisterRequest { reply_on } = message {
                let reply = if self.accepting {
                    BusMessage::RegisterSuccess {
                        root: self.root.clone(),
                        unregister: self.unregister.clone(),
                    }
                } else {
                    BusMessage::RegisterFailure
                };
                bus.send(reply_on, reply);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::accessor::NodeToken;
    use crate::interop::value::ApiValue;
    use std::cell::Cell;

    fn stub_root(raw: u64) -> NodeAccessor {
        NodeAccessor::new(
            NodeToken::from_raw(raw),
            Rc::new(|| true),
            Rc::new(|_| {}),
            Rc::new(|_| {}),
            Rc::new(|| {}),
            Rc::new(|_, _| ApiValue::None),
        )
    }

    #[test]
    fn test_handshake_succeeds() {
        let mut bus = LocalBus::new();
        let mut host = RegistrationHost::new(stub_root(10), Rc::new(|| {}));
        let mut client = RegistrationClient::new(ChannelId(99));

        assert!(client.poll(&mut bus).is_none());
        host.service(&mut bus);
        let root = client.poll(&mut bus).unwrap();
        assert_eq!(root.identity(), NodeToken::from_raw(10));
        assert!(!client.is_failed());
    }

    #[test]
    fn test_refusal_is_terminal() {
        let mut bus = LocalBus::new();
        let mut host = RegistrationHost::new(stub_root(10), Rc::new(|| {}));
        host.set_accepting(false);
        let mut client = RegistrationClient::new(ChannelId(99));

        client.poll(&mut bus);
        host.service(&mut bus);
        assert!(client.poll(&mut bus).is_none());
        assert!(client.is_failed());
        assert!(matches!(
            client.failure(),
            Some(RegistrationError::Refused)
        ));

        // A failed client never sends again
        client.poll(&mut bus);
        assert!(bus.poll(REGISTRATION_CHANNEL).is_empty());
        assert!(bus.poll(REGISTRATION_QUEUE_CHANNEL).is_empty());
    }

    #[test]
    fn test_retries_exhaust_without_provider() {
        let mut bus = LocalBus::new();
        let mut client = RegistrationClient::new(ChannelId(99));

        for _ in 0..10 {
            client.poll(&mut bus);
        }
        assert!(client.is_failed());
        assert!(matches!(
            client.failure(),
            Some(RegistrationError::Exhausted(_))
        ));
        // Retries went through the queue-style fallback channel
        assert!(!bus.poll(REGISTRATION_QUEUE_CHANNEL).is_empty());
    }

    #[test]
    fn test_unregister_fn_runs() {
        let mut bus = LocalBus::new();
        let hits = Rc::new(Cell::new(0u32));
        let counter = hits.clone();
        let mut host = RegistrationHost::new(
            stub_root(10),
            Rc::new(move || counter.set(counter.get() + 1)),
        );
        let mut client = RegistrationClient::new(ChannelId(99));

        client.poll(&mut bus);
        host.service(&mut bus);
        client.poll(&mut bus);
        client.unregister();
        assert_eq!(hits.get(), 1);
    }
}
