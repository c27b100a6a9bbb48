//! Session state and its process-wide instance.
//!
//! A [`Session`] owns everything that lives for one world: the key store,
//! the actuation queue, our signing identity, and the ids already read from
//! the channel. It starts empty and is reset on every world reload.
//!
//! The host loop is single-threaded, so the process-wide instance is a
//! thread-local reached through [`with_session`]. Components under test take
//! an explicit `&mut Session` instead.

use std::cell::RefCell;

use tracing::{debug, info};

use courier_actuation::{
    ActuationQueue, Actuator, BatchMode, Discovery, Probe, ProposalBatch, RateLimitConfig,
    TickOutcome,
};
use courier_core::{SeenIds, Transmission, TransmissionId};
use courier_keys::{Identity, KeyStore, SignatureTransmission};

use crate::channel::ChannelAdapter;
use crate::config::CourierConfig;
use crate::courier::{Courier, Inbound};
use crate::error::{CourierError, Result};

/// Per-world state.
#[derive(Debug)]
pub struct Session {
    config: CourierConfig,
    courier: Courier,
    keys: KeyStore,
    queue: ActuationQueue,
    identity: Option<Identity>,
    seen: SeenIds,
}

impl Session {
    /// Create an empty session.
    pub fn new(config: CourierConfig) -> Self {
        Self {
            config,
            courier: Courier::new(config.codec),
            keys: KeyStore::new(),
            queue: ActuationQueue::new(config.rate_limit),
            identity: None,
            seen: SeenIds::default(),
        }
    }

    /// The session's configuration.
    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// The codec pipeline.
    pub fn courier(&self) -> &Courier {
        &self.courier
    }

    /// The key store.
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Mutable access to the key store.
    pub fn keys_mut(&mut self) -> &mut KeyStore {
        &mut self.keys
    }

    /// The actuation queue.
    pub fn queue(&self) -> &ActuationQueue {
        &self.queue
    }

    /// Mutable access to the actuation queue.
    pub fn queue_mut(&mut self) -> &mut ActuationQueue {
        &mut self.queue
    }

    /// Our signing identity, if one was set.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Set the signing identity.
    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Encode `transmission` and queue the write to the current medium.
    ///
    /// Nothing reaches the world until the queue admits the write on a later
    /// tick.
    pub fn send(
        &mut self,
        adapter: &mut dyn ChannelAdapter,
        transmission: &dyn Transmission,
        key: Option<&str>,
    ) -> Result<TransmissionId> {
        let handle = adapter
            .locate_medium()
            .ok_or(CourierError::MediumUnavailable)?;
        let text =
            self.courier
                .encode_transmission(&self.keys, transmission, key, adapter.char_budget())?;

        self.queue.enqueue(adapter.write_request(handle, text));
        debug!(id = %transmission.id(), x = handle.x, y = handle.y, "queued channel write");
        Ok(transmission.id())
    }

    /// Sign `transmission` with our identity and queue the signature.
    ///
    /// Returns `None` without touching the channel when no identity is set.
    pub fn send_signature(
        &mut self,
        adapter: &mut dyn ChannelAdapter,
        transmission: &dyn Transmission,
        timestamp_ms: u64,
    ) -> Result<Option<SignatureTransmission>> {
        let Some(identity) = &self.identity else {
            return Ok(None);
        };
        let signature = identity.sign(transmission, timestamp_ms);
        self.send(adapter, &signature, None)?;
        Ok(Some(signature))
    }

    /// Read and decode whatever the medium holds.
    pub fn receive(&mut self, adapter: &mut dyn ChannelAdapter) -> Result<Inbound> {
        let text = read_medium(adapter)?;
        self.courier.decode_text(&self.keys, &text)
    }

    /// Read the medium, returning only transmissions not seen before.
    ///
    /// A blank medium yields `None`.
    pub fn poll(&mut self, adapter: &mut dyn ChannelAdapter) -> Result<Option<Inbound>> {
        let text = read_medium(adapter)?;
        if text.is_empty() {
            return Ok(None);
        }
        self.courier.decode_new(&self.keys, &text, &mut self.seen)
    }

    /// Name of the trusted signer of `target`.
    pub fn verify(
        &self,
        signature: &SignatureTransmission,
        target: &dyn Transmission,
    ) -> Result<&str> {
        Ok(self.keys.verify_signature(signature, target)?)
    }

    /// Advance the actuation queue by one step.
    pub fn tick(&mut self, now_ms: u64, actuator: &mut dyn Actuator) -> TickOutcome {
        self.queue.tick(now_ms, actuator)
    }

    /// Start a discovery run tied to the current queue epoch.
    pub fn discovery<P: Probe>(&self, probe: P) -> (Discovery<P>, u64) {
        (
            Discovery::new(probe, self.config.discovery),
            self.queue.epoch(),
        )
    }

    /// Hand a discovery batch to the queue.
    pub fn accept_batch(&mut self, batch: ProposalBatch, mode: BatchMode) -> Result<usize> {
        Ok(self.queue.accept_batch(batch, mode)?)
    }

    /// Follow the interaction limits of the server we are connected to.
    ///
    /// Pending actuations are kept.
    pub fn set_rate_limit(&mut self, rate_limit: RateLimitConfig) {
        self.config.rate_limit = rate_limit;
        self.queue.set_rate_limit(rate_limit);
    }

    /// World reload: drop pending actuations, the limiter window, keys,
    /// trusted signers, and seen ids. The identity survives.
    pub fn reset(&mut self) {
        let discarded = self.queue.clear();
        self.queue.reset_limiter();
        self.keys.clear();
        self.seen.clear();
        info!(discarded, "session reset");
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CourierConfig::default())
    }
}

fn read_medium(adapter: &mut dyn ChannelAdapter) -> Result<String> {
    let handle = adapter
        .locate_medium()
        .ok_or(CourierError::MediumUnavailable)?;
    adapter
        .read_text(handle)
        .map_err(|e| CourierError::Channel(format!("{e:#}")))
}

thread_local! {
    static SESSION: RefCell<Session> = RefCell::new(Session::default());
}

/// Run `f` against the process-wide session.
///
/// Must not be re-entered from inside `f`.
pub fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> R {
    SESSION.with(|session| f(&mut session.borrow_mut()))
}

/// Reset the process-wide session.
pub fn reset_session() {
    with_session(Session::reset);
}

/// Replace the process-wide session with a fresh one using `config`.
pub fn init_session(config: CourierConfig) {
    with_session(|session| *session = Session::new(config));
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_actuation::{Actuation, ActuationRequest, ConfigValue};
    use courier_core::MessageTransmission;
    use courier_keys::Key;

    use crate::channel::MediumHandle;

    /// A single sign at (3, 4).
    struct Sign {
        text: Option<String>,
        budget: usize,
    }

    impl ChannelAdapter for Sign {
        fn locate_medium(&mut self) -> Option<MediumHandle> {
            self.text.as_ref().map(|_| MediumHandle::new(3, 4))
        }

        fn read_text(&mut self, _handle: MediumHandle) -> anyhow::Result<String> {
            Ok(self.text.clone().unwrap_or_default())
        }

        fn char_budget(&self) -> usize {
            self.budget
        }
    }

    impl Actuator for Sign {
        fn actuate(&mut self, request: &ActuationRequest) -> anyhow::Result<Actuation> {
            match (&mut self.text, &request.value) {
                (Some(text), ConfigValue::Text(value)) => {
                    *text = value.clone();
                    Ok(Actuation::Applied)
                }
                (None, _) => Ok(Actuation::TargetMissing),
                _ => anyhow::bail!("sign only accepts text"),
            }
        }
    }

    fn sign() -> Sign {
        Sign {
            text: Some(String::new()),
            budget: 220,
        }
    }

    #[test]
    fn test_send_goes_through_queue() {
        let mut session = Session::default();
        let mut sign = sign();

        let message = MessageTransmission::new("hello");
        session.send(&mut sign, &message, None).unwrap();
        assert_eq!(sign.text.as_deref(), Some(""));
        assert_eq!(session.queue().len(), 1);

        assert!(matches!(
            session.tick(0, &mut sign),
            TickOutcome::Executed(_)
        ));
        let inbound = session.poll(&mut sign).unwrap().unwrap();
        assert_eq!(inbound.id, message.id());
        assert_eq!(&inbound.payload[..], b"hello");

        assert!(session.poll(&mut sign).unwrap().is_none());
    }

    #[test]
    fn test_no_medium() {
        let mut session = Session::default();
        let mut gone = Sign {
            text: None,
            budget: 220,
        };

        let err = session
            .send(&mut gone, &MessageTransmission::new("x"), None)
            .unwrap_err();
        assert!(matches!(err, CourierError::MediumUnavailable));
        assert!(session.queue().is_empty());
        assert!(matches!(
            session.receive(&mut gone),
            Err(CourierError::MediumUnavailable)
        ));
    }

    #[test]
    fn test_blank_medium_polls_none() {
        let mut session = Session::default();
        assert!(session.poll(&mut sign()).unwrap().is_none());
    }

    #[test]
    fn test_reset_clears_queue_and_keys() {
        let mut session = Session::default();
        let mut sign = sign();
        session.keys_mut().add(Key::symmetric("team", [1; 32])).unwrap();
        session
            .send(&mut sign, &MessageTransmission::new("x"), Some("team"))
            .unwrap();
        session.set_identity(Identity::from_seed(&[2; 32]));

        session.reset();

        assert!(session.keys().is_empty());
        assert!(session.queue().is_empty());
        assert_eq!(session.tick(0, &mut sign), TickOutcome::Idle);
        assert!(session.identity().is_some());
    }

    fn one_per_window() -> RateLimitConfig {
        RateLimitConfig {
            window_ms: 6_000,
            capacity: 1,
        }
    }

    #[test]
    fn test_reset_reopens_rate_window() {
        let mut session = Session::new(CourierConfig {
            rate_limit: one_per_window(),
            ..CourierConfig::default()
        });
        let mut sign = sign();

        session
            .send(&mut sign, &MessageTransmission::new("before"), None)
            .unwrap();
        assert!(matches!(session.tick(0, &mut sign), TickOutcome::Executed(_)));

        session.reset();
        session
            .send(&mut sign, &MessageTransmission::new("after"), None)
            .unwrap();

        assert!(matches!(
            session.tick(100, &mut sign),
            TickOutcome::Executed(_)
        ));
    }

    #[test]
    fn test_rate_limit_follows_server() {
        let mut session = Session::new(CourierConfig {
            rate_limit: one_per_window(),
            ..CourierConfig::default()
        });
        let mut sign = sign();
        for word in ["a", "b", "c"] {
            session
                .send(&mut sign, &MessageTransmission::new(word), None)
                .unwrap();
        }
        assert!(matches!(session.tick(0, &mut sign), TickOutcome::Executed(_)));
        assert!(matches!(
            session.tick(10, &mut sign),
            TickOutcome::RateLimited { .. }
        ));

        session.set_rate_limit(RateLimitConfig {
            window_ms: 6_000,
            capacity: 10,
        });

        assert_eq!(session.config().rate_limit.capacity, 10);
        assert_eq!(session.queue().len(), 2);
        assert!(matches!(session.tick(20, &mut sign), TickOutcome::Executed(_)));
        assert!(matches!(session.tick(30, &mut sign), TickOutcome::Executed(_)));
    }

    #[test]
    fn test_signature_flow() {
        let mut session = Session::default();
        let mut sign = sign();
        let message = MessageTransmission::new("orders");

        assert!(session
            .send_signature(&mut sign, &message, 5)
            .unwrap()
            .is_none());

        let identity = Identity::from_seed(&[9; 32]);
        session.keys_mut().trust_signer("captain", identity.public_key());
        session.set_identity(identity);

        let signature = session
            .send_signature(&mut sign, &message, 5)
            .unwrap()
            .unwrap();
        assert_eq!(session.verify(&signature, &message).unwrap(), "captain");
    }

    #[test]
    fn test_thread_local_session() {
        init_session(CourierConfig::default());
        with_session(|s| s.keys_mut().add(Key::symmetric("k", [3; 32])).unwrap());
        assert_eq!(with_session(|s| s.keys().len()), 1);

        reset_session();
        assert!(with_session(|s| s.keys().is_empty()));
    }
}
