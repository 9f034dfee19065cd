//! Smart-money price-action detectors
//!
//! Every detector looks only at the trailing 2-4 bars of the entry series and
//! is independent of the others.
//!
//! # Detector Groups
//!
//! - **Structure**: Break of Structure, Market Structure Shift
//! - **Imbalance**: Order Block, Fair Value Gap
//! - **Liquidity**: Liquidity Sweep

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod imbalance;
pub mod liquidity;
pub mod structure;

// Re-export all detectors for convenience
pub use helpers::*;
pub use imbalance::*;
pub use liquidity::*;
pub use structure::*;
