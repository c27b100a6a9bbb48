//! The host's action contract.

use crate::request::ActuationRequest;

/// What happened when a request was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuation {
    /// The host applied the value.
    Applied,
    /// The target no longer exists; nothing was done.
    TargetMissing,
}

/// Applies admitted requests to the world.
///
/// Implemented by the host. Errors are opaque to the queue: they are logged
/// and the request is dropped.
pub trait Actuator {
    /// Apply one request.
    fn actuate(&mut self, request: &ActuationRequest) -> anyhow::Result<Actuation>;
}

impl<F> Actuator for F
where
    F: FnMut(&ActuationRequest) -> anyhow::Result<Actuation>,
{
    fn actuate(&mut self, request: &ActuationRequest) -> anyhow::Result<Actuation> {
        self(request)
    }
}
