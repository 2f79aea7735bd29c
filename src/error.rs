use thiserror::Error;

/// Failures raised by the core processing pass.
///
/// IO and parse failures at the edges are reported through `anyhow` with
/// path context; this enum covers the conditions the pipeline itself
/// detects. All of them abort the run — outputs written before a failure
/// are not guaranteed consistent and should be discarded.
#[derive(Debug, Error)]
pub enum ExportError {
    /// An annotation references a time slot that does not exist in the
    /// recording's time order, or exists without a time value. Defaulting
    /// such a segment to zero would corrupt every following global offset,
    /// so the run fails instead.
    #[error(
        "recording {recording}: annotation {annotation} references unknown or unaligned time slot {slot}"
    )]
    UnresolvedTimeSlot {
        recording: String,
        annotation: String,
        slot: String,
    },
}
