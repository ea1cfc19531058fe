// Copyright 2025 Cowboy AI, LLC.

//! State machine traits for order and connection state
//!
//! Two flavours are used by the core:
//!
//! - **Ranked states**: progression is monotonic by rank. A candidate state
//!   whose rank is lower than the current one is a stale delivery and is
//!   ignored rather than rejected. Order status uses this.
//! - **Event-driven states**: the next state is a pure function of the current
//!   state and an input, with unrecognised inputs leaving the state alone.
//!   The connection tracker uses this.
//!
//! Neither machine ever fails a transition; out-of-order input is expected
//! from the stream.

use std::fmt::Debug;

/// Trait for types that can be used as states in a state machine
pub trait State: Debug + Clone + PartialEq + Eq + Send + Sync {
    /// Get the name of this state for logging/debugging
    fn name(&self) -> &'static str;

    /// Check if this is a terminal state
    fn is_terminal(&self) -> bool {
        false
    }
}

/// A state whose transitions are ordered by rank
///
/// # Examples
///
/// ```rust
/// use cim_domain_orders::state_machine::{RankedState, State};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Parcel {
///     Packed,
///     Sent,
///     Lost,
/// }
///
/// impl State for Parcel {
///     fn name(&self) -> &'static str {
///         match self {
///             Parcel::Packed => "packed",
///             Parcel::Sent => "sent",
///             Parcel::Lost => "lost",
///         }
///     }
///
///     fn is_terminal(&self) -> bool {
///         matches!(self, Parcel::Lost)
///     }
/// }
///
/// impl RankedState for Parcel {
///     fn rank(&self) -> u8 {
///         match self {
///             Parcel::Packed => 1,
///             Parcel::Sent => 2,
///             Parcel::Lost => 3,
///         }
///     }
/// }
///
/// assert!(Parcel::Packed.accepts(&Parcel::Sent));
/// assert!(!Parcel::Sent.accepts(&Parcel::Packed));
/// assert_eq!(Parcel::Lost.advance(Parcel::Packed), Parcel::Lost);
/// ```
pub trait RankedState: State + Copy {
    /// Position of this state in the progression
    fn rank(&self) -> u8;

    /// Whether moving to `candidate` is a forward (or same-rank) move
    fn accepts(&self, candidate: &Self) -> bool {
        candidate.rank() >= self.rank()
    }

    /// Apply the regression guard: move to `candidate` unless it would regress
    fn advance(self, candidate: Self) -> Self {
        if self.accepts(&candidate) {
            candidate
        } else {
            self
        }
    }
}

/// A state machine driven by inputs, total over its input type
pub trait EventDrivenState: State {
    /// The input that drives transitions
    type Input: ?Sized;

    /// Compute the next state; inputs with no transition return `self`
    fn on_input(&self, input: &Self::Input) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Off,
        Dim,
        Bright,
        Broken,
    }

    impl State for Light {
        fn name(&self) -> &'static str {
            match self {
                Light::Off => "off",
                Light::Dim => "dim",
                Light::Bright => "bright",
                Light::Broken => "broken",
            }
        }

        fn is_terminal(&self) -> bool {
            matches!(self, Light::Broken)
        }
    }

    impl RankedState for Light {
        fn rank(&self) -> u8 {
            match self {
                Light::Off => 0,
                Light::Dim => 1,
                Light::Bright => 2,
                Light::Broken => 9,
            }
        }
    }

    impl EventDrivenState for Light {
        type Input = str;

        fn on_input(&self, input: &str) -> Self {
            match input {
                "dim" => Light::Dim,
                "bright" => Light::Bright,
                _ => *self,
            }
        }
    }

    #[test]
    fn test_ranked_advance_ignores_regression() {
        assert_eq!(Light::Bright.advance(Light::Dim), Light::Bright);
        assert_eq!(Light::Dim.advance(Light::Bright), Light::Bright);
        assert_eq!(Light::Dim.advance(Light::Dim), Light::Dim);
    }

    #[test]
    fn test_terminal_outranks_progression() {
        assert_eq!(Light::Bright.advance(Light::Broken), Light::Broken);
        assert_eq!(Light::Broken.advance(Light::Off), Light::Broken);
        assert!(Light::Broken.is_terminal());
        assert!(!Light::Off.is_terminal());
    }

    #[test]
    fn test_event_driven_unknown_input_keeps_state() {
        assert_eq!(Light::Off.on_input("dim"), Light::Dim);
        assert_eq!(Light::Dim.on_input("flicker"), Light::Dim);
        assert_eq!(Light::Dim.name(), "dim");
    }
}
