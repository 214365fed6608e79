//! Derived entry resolution
//!
//! Derived entries are invoked on every read with the store's context, so
//! their results always reflect the live raw tree. Nothing is memoized.

use connect_core::{Derived, DerivedContext, RawValue, StateError, StateResult};
use tracing::trace;

/// Whether a raw entry is computed rather than stored.
///
/// Only [`RawValue::Derived`] entries count. A [`RawValue::Function`] is a
/// callable too, but it takes explicit arguments instead of the store
/// context, so reads hand it out as an accessor without invoking it.
pub fn is_derived(value: &RawValue) -> bool {
    matches!(value, RawValue::Derived(_))
}

/// Invoke a derived entry, returning its result unchanged.
///
/// A parameterized entry yields a [`RawValue::Function`]; calling it is left
/// to whoever holds the accessor. Errors from the entry are passed through
/// as [`StateError::Callable`].
pub fn invoke(derived: &Derived, ctx: &DerivedContext) -> StateResult<RawValue> {
    let result = derived.call(ctx).map_err(StateError::Callable)?;
    trace!(kind = result.kind(), "Derived entry resolved");
    Ok(result)
}

/// Resolve a raw entry: derived entries are invoked, anything else is
/// returned as is.
pub fn resolve(value: RawValue, ctx: &DerivedContext) -> StateResult<RawValue> {
    match value {
        RawValue::Derived(derived) => invoke(&derived, ctx),
        other => Ok(other),
    }
}
