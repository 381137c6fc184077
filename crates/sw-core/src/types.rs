//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A clock time string was not of the form `HH:MM`.
    #[error("invalid clock time {value:?}, expected HH:MM")]
    InvalidClockTime { value: String },

    /// An interval bound was neither whole minutes nor `HH:MM`.
    #[error("invalid bound {value:?}, expected minutes or HH:MM")]
    InvalidBound { value: String },

    /// An interval kind was not `normal` or `cutoff`.
    #[error("invalid interval kind {value:?}, expected normal or cutoff")]
    InvalidIntervalKind { value: String },
}

/// Generates a numeric ID newtype with common trait implementations.
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw ID value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw ID value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_numeric_id!(
    /// Identifier of a head or sub channel.
    ///
    /// Assigned from a monotonically increasing counter owned by the collection,
    /// so an ID is never reused even after the channel is deleted.
    ChannelId
);

define_numeric_id!(
    /// Identifier of a builder interval.
    IntervalId
);

/// Monotonic ID allocator shared by a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct IdCounter(u64);

impl IdCounter {
    /// Returns the next raw ID, starting at 1.
    pub(crate) const fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    /// The value [`next`](Self::next) will return, without consuming it.
    pub(crate) const fn peek(self) -> u64 {
        self.0 + 1
    }
}
