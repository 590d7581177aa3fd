// src/ordering/mod.rs

//! Ordering engine: decides where a pipeline stands in the queue.
//!
//! Everything in here is pure and synchronous. Given a [`Snapshot`] it
//! - parses every `updated_at` into a comparable instant ([`sort`]),
//! - stable-sorts ascending so equal timestamps keep upstream order,
//! - locates the target pipeline and reports its rank ([`position`]).
//!
//! A malformed timestamp anywhere in the snapshot is an error. It is never
//! defaulted or skipped, since either would silently reorder the queue.
//!
//! [`Snapshot`]: crate::pipeline::Snapshot

pub mod position;
pub mod sort;

pub use position::{QueuePosition, is_first, locate, position_of};
pub use sort::{OrderedPipeline, order_snapshot, parse_updated_at};
