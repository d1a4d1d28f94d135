// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! Configuration errors. The renderer has exactly one class of error that it
//! surfaces to callers; everything else (rendering before the first relight,
//! transmittance driven negative by an overly aggressive step) is tolerated by
//! design and is not represented here.

use ordered_float::OrderedFloat;

use crate::grid::Shape3;

/// An invariant violation detected at scene construction or at a settings mutator.
///
/// The scene (or the field being set) remains in its previous valid state when one
/// of these is returned.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SceneError {
    #[error("grid shape mismatch: {what} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Shape3,
        actual: Shape3,
    },

    #[error("step length must be positive, got {0}")]
    NonPositiveStep(OrderedFloat<f64>),

    #[error("camera distance must be positive, got {0}")]
    NonPositiveDistance(OrderedFloat<f64>),

    #[error("light intensity must not be negative: {0:?}")]
    NegativeIntensity([f32; 3]),
}
