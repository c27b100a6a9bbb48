//! # Courier Actuation
//!
//! Deferred, rate-limited world mutation.
//!
//! ## Overview
//!
//! Automation features never touch the world directly. They enqueue
//! [`ActuationRequest`]s; an external scheduler calls
//! [`ActuationQueue::tick`] once per step, and the queue fires at most one
//! request per tick when the [`RateLimiter`] admits it. The most recently
//! enqueued request fires first so a user's latest correction beats a long
//! backlog.
//!
//! ## Key Properties
//!
//! - **Bounded**: never more than `capacity` actuations per window
//! - **Non-blocking**: a failing request is logged and dropped, the loop goes on
//! - **No retry**: every request gets exactly one attempt
//! - **Single writer**: parallel [`Discovery`] only proposes; the queue decides
//!
//! ## Usage
//!
//! ```rust
//! use courier_actuation::{
//!     Actuation, ActuationQueue, ActuationRequest, ConfigValue, RateLimitConfig, TickOutcome,
//! };
//!
//! let mut queue = ActuationQueue::new(RateLimitConfig::default());
//! queue.enqueue(ActuationRequest::new(10, 12, ConfigValue::Int(3)));
//!
//! let mut apply = |_: &ActuationRequest| -> anyhow::Result<Actuation> { Ok(Actuation::Applied) };
//! assert!(matches!(queue.tick(0, &mut apply), TickOutcome::Executed(_)));
//! ```

pub mod actuator;
pub mod discovery;
pub mod error;
pub mod limiter;
pub mod queue;
pub mod request;

pub use actuator::{Actuation, Actuator};
pub use discovery::{CancelHandle, Discovery, DiscoveryConfig, Probe};
pub use error::{ActuationError, Result};
pub use limiter::{Admission, RateLimitConfig, RateLimiter};
pub use queue::{ActuationQueue, BatchMode, ProposalBatch, QueueStats, TickOutcome};
pub use request::{ActuationRequest, ConfigValue};
