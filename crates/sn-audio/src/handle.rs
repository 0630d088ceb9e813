//! Opaque handles to live effect instances

/// Identifies one in-flight effect instance.
///
/// Handles are opaque; only equality is meaningful to callers. A handle
/// goes stale once its instance finishes or its slot is reused, after
/// which any operation targeting it is a no-op.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SoundHandle {
    pub(crate) idx: u32,
    pub(crate) gen: u32,
}

impl SoundHandle {
    /// Returned when an effect could not be started (missing asset,
    /// decode failure). Operating on it is always a no-op.
    pub const INVALID: SoundHandle = SoundHandle {
        idx: u32::MAX,
        gen: u32::MAX,
    };

    pub(crate) fn new(idx: u32, gen: u32) -> Self {
        Self { idx, gen }
    }

    /// Whether this is the invalid sentinel
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}
