//! Test fixtures and helpers.
//!
//! An in-memory world with message blocks, an actuator that records what it
//! was asked to do, and pre-keyed parties.

use std::collections::BTreeMap;

use courier::{ChannelAdapter, CourierConfig, MediumHandle, Session};
use courier_actuation::{Actuation, ActuationRequest, Actuator, ConfigValue, TickOutcome};
use courier_keys::{
    Identity, Key, KeyMaterial, KeyRole, KeyStore, SignerKey, X25519PublicKey, X25519StaticSecret,
};

/// Character budget of a message block.
pub const MESSAGE_BLOCK_BUDGET: usize = 220;

/// Message blocks keyed by position.
///
/// Acts as both the channel adapter (reads) and the actuator (writes), the
/// way a host world would.
#[derive(Debug, Clone)]
pub struct MemoryMedium {
    blocks: BTreeMap<(i32, i32), String>,
    budget: usize,
    writes: usize,
}

impl MemoryMedium {
    /// A world with one empty block at `(x, y)`.
    pub fn with_block(x: i32, y: i32) -> Self {
        let mut medium = Self::empty();
        medium.build(x, y);
        medium
    }

    /// A world with no blocks.
    pub fn empty() -> Self {
        Self {
            blocks: BTreeMap::new(),
            budget: MESSAGE_BLOCK_BUDGET,
            writes: 0,
        }
    }

    /// Override the character budget.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Place an empty block.
    pub fn build(&mut self, x: i32, y: i32) {
        self.blocks.insert((x, y), String::new());
    }

    /// Remove a block.
    pub fn destroy(&mut self, x: i32, y: i32) {
        self.blocks.remove(&(x, y));
    }

    /// Current text of the block at `(x, y)`.
    pub fn text_at(&self, x: i32, y: i32) -> Option<&str> {
        self.blocks.get(&(x, y)).map(String::as_str)
    }

    /// Overwrite a block directly, bypassing the queue.
    pub fn set_text(&mut self, x: i32, y: i32, text: impl Into<String>) {
        self.blocks.insert((x, y), text.into());
    }

    /// Number of applied writes.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ChannelAdapter for MemoryMedium {
    fn locate_medium(&mut self) -> Option<MediumHandle> {
        self.blocks
            .keys()
            .next()
            .map(|&(x, y)| MediumHandle::new(x, y))
    }

    fn read_text(&mut self, handle: MediumHandle) -> anyhow::Result<String> {
        self.blocks
            .get(&(handle.x, handle.y))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no block at {},{}", handle.x, handle.y))
    }

    fn char_budget(&self) -> usize {
        self.budget
    }
}

impl Actuator for MemoryMedium {
    fn actuate(&mut self, request: &ActuationRequest) -> anyhow::Result<Actuation> {
        let Some(text) = self.blocks.get_mut(&(request.x, request.y)) else {
            return Ok(Actuation::TargetMissing);
        };
        match &request.value {
            ConfigValue::Text(value) => {
                *text = value.clone();
                self.writes += 1;
                Ok(Actuation::Applied)
            }
            other => anyhow::bail!("message block cannot take {other:?}"),
        }
    }
}

/// Records every request; fails the ones matching `fail_when`.
#[derive(Default)]
pub struct RecordingActuator {
    /// Requests in the order they were applied.
    pub applied: Vec<ActuationRequest>,
    fail_when: Option<Box<dyn Fn(&ActuationRequest) -> bool>>,
}

impl RecordingActuator {
    /// Record everything, fail nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail requests for which `predicate` holds.
    pub fn failing_when(predicate: impl Fn(&ActuationRequest) -> bool + 'static) -> Self {
        Self {
            applied: Vec::new(),
            fail_when: Some(Box::new(predicate)),
        }
    }
}

impl Actuator for RecordingActuator {
    fn actuate(&mut self, request: &ActuationRequest) -> anyhow::Result<Actuation> {
        if self.fail_when.as_ref().is_some_and(|fail| fail(request)) {
            anyhow::bail!("refused {},{}", request.x, request.y);
        }
        self.applied.push(request.clone());
        Ok(Actuation::Applied)
    }
}

/// A participant: a session plus the keys others use to reach it.
pub struct Party {
    /// Name others use for this party's key.
    pub name: String,
    /// The party's session.
    pub session: Session,
    /// Secret half of the party's sealing key.
    pub secret: X25519StaticSecret,
    /// Signing identity.
    pub identity: Identity,
}

impl Party {
    /// Create a party with deterministic keys derived from `seed`.
    pub fn with_seed(name: &str, seed: u8) -> Self {
        let secret = X25519StaticSecret::from_bytes([seed; 32]);
        let identity = Identity::from_seed(&[seed.wrapping_add(0x80); 32]);

        let mut session = Session::new(CourierConfig::default());
        let own = Key::new(
            format!("{name}/own"),
            KeyMaterial::Secret(secret.clone()),
            KeyRole::DecryptOnly,
        )
        .expect("secret keys accept any role");
        session.keys_mut().add(own).expect("fresh store");
        session.set_identity(identity.clone());

        Self {
            name: name.to_owned(),
            session,
            secret,
            identity,
        }
    }

    /// Add `other`'s public key and trust its signatures.
    pub fn introduce(&mut self, other: &Party) {
        self.learn(
            &other.name,
            other.secret.public_key(),
            other.identity.public_key(),
        );
    }

    fn learn(&mut self, name: &str, public: X25519PublicKey, signer: SignerKey) {
        let keys = self.session.keys_mut();
        keys.add_key(name, KeyMaterial::Public(public), KeyRole::EncryptOnly)
            .expect("public key with EncryptOnly role");
        keys.trust_signer(name, signer);
    }

    /// Tick the party's queue against `medium` until it is idle, starting at
    /// `now_ms` and stepping one window at a time when rate limited.
    pub fn drain(&mut self, medium: &mut MemoryMedium, mut now_ms: u64) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        loop {
            match self.session.tick(now_ms, medium) {
                TickOutcome::Idle => return outcomes,
                TickOutcome::RateLimited { retry_after_ms } => {
                    now_ms += retry_after_ms.max(1);
                }
                outcome => {
                    outcomes.push(outcome);
                    now_ms += 1;
                }
            }
        }
    }
}

/// Parties that all know each other, with seeds 1, 2, 3, ...
pub fn introduced_parties(names: &[&str]) -> Vec<Party> {
    let mut parties: Vec<Party> = names
        .iter()
        .enumerate()
        .map(|(i, name)| Party::with_seed(name, i as u8 + 1))
        .collect();

    let cards: Vec<_> = parties
        .iter()
        .map(|p| (p.name.clone(), p.secret.public_key(), p.identity.public_key()))
        .collect();

    for (i, party) in parties.iter_mut().enumerate() {
        for (j, (name, public, signer)) in cards.iter().enumerate() {
            if i != j {
                party.learn(name, *public, *signer);
            }
        }
    }
    parties
}

/// A store holding two symmetric keys, `A` and `B`.
pub fn two_key_store() -> KeyStore {
    let mut keys = KeyStore::new();
    keys.add(Key::symmetric("A", [0xa0; 32])).expect("fresh store");
    keys.add(Key::symmetric("B", [0xb0; 32])).expect("distinct names");
    keys
}
