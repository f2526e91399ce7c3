/*!
 * Merge engine combining two subtitle tracks onto one timeline.
 *
 * The engine processes the tracks through four passes, each producing a new
 * list of cues from the previous one:
 * 1. **Split Pass**: cut both tracks on the union of their cue boundaries
 * 2. **Extension Pass**: remove flicker where one side is only briefly alone
 * 3. **Ordering Pass**: upper track lines before lower track lines
 * 4. **Coalesce Pass**: join touching cues with identical text, renumber
 *
 * Merging is pure and synchronous. A shared flag can be set from another
 * thread to abandon a long merge; a cancelled merge yields no track at all.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::subtitle_model::{Cue, Track};

pub mod coalesce_pass;
pub mod extension_pass;
pub mod ordering_pass;
pub mod split_pass;

pub use coalesce_pass::CoalescePass;
pub use extension_pass::ExtensionPass;
pub use ordering_pass::OrderingPass;
pub use split_pass::SplitPass;

/// Result of a merge that may have been cancelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// All passes ran; the merged track
    Completed(Track),
    /// The cancel flag was observed before the merge finished
    Cancelled,
}

impl MergeOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The merged track, or `None` when cancelled
    pub fn into_track(self) -> Option<Track> {
        match self {
            Self::Completed(track) => Some(track),
            Self::Cancelled => None,
        }
    }
}

/// Merge engine with a cancellation handle that can be shared with other threads
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    cancel_flag: Arc<AtomicBool>,
}

impl MergeEngine {
    /// Create an engine with its own, unset cancel flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine observing an existing cancel flag
    pub fn with_cancel_flag(cancel_flag: Arc<AtomicBool>) -> Self {
        MergeEngine { cancel_flag }
    }

    /// Handle that cancels merges run by this engine when set to `true`
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_flag)
    }

    /// Request cancellation of the running merge
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    /// Merge `upper` and `lower`, polling the cancel flag as the passes progress
    pub fn run(&self, upper: &Track, lower: &Track) -> MergeOutcome {
        merge_with_cancellation(upper, lower, &self.cancel_flag)
    }
}

/// Merge two tracks; `upper` lines are shown above `lower` lines in every cue
pub fn merge(upper: &Track, lower: &Track) -> Track {
    match merge_with_cancellation(upper, lower, &AtomicBool::new(false)) {
        MergeOutcome::Completed(track) => track,
        MergeOutcome::Cancelled => unreachable!("merge without a cancel handle was cancelled"),
    }
}

/// Merge two tracks, returning `Cancelled` as soon as `cancel` is observed set
pub fn merge_with_cancellation(upper: &Track, lower: &Track, cancel: &AtomicBool) -> MergeOutcome {
    let upper_cues = sorted_cues(upper, "upper");
    let lower_cues = sorted_cues(lower, "lower");

    debug!("Merging {} upper cues with {} lower cues", upper_cues.len(), lower_cues.len());

    let Some(slices) = SplitPass::run(&upper_cues, &lower_cues, cancel) else {
        return MergeOutcome::Cancelled;
    };
    let Some(extended) = ExtensionPass::run(&slices, cancel) else {
        return MergeOutcome::Cancelled;
    };
    let ordered = OrderingPass::run(&extended);
    let cues = CoalescePass::run(&ordered);

    if is_cancelled(cancel) {
        return MergeOutcome::Cancelled;
    }

    MergeOutcome::Completed(Track {
        cues,
        language_tags: merged_language_tags(upper, lower),
    })
}

pub(crate) fn is_cancelled(cancel: &AtomicBool) -> bool {
    cancel.load(Ordering::Relaxed)
}

/// Cues sorted by start then end time, so end times ascend as well for
/// non-overlapping input (a zero-length cue sorts before a longer one it shares a start with)
fn sorted_cues(track: &Track, side: &str) -> Vec<Cue> {
    let mut sorted = Track::new(track.cues.clone());
    sorted.cues.sort_by_key(|cue| (cue.start_time_ms, cue.end_time_ms));

    let overlaps = sorted.overlap_count();
    if overlaps > 0 {
        warn!("Found {} overlapping cues in the {} track; merge output may drop text", overlaps, side);
    }

    sorted.cues
}

/// Upper tags then lower tags, without repeating a tag
fn merged_language_tags(upper: &Track, lower: &Track) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(upper.language_tags.len() + lower.language_tags.len());
    for tag in upper.language_tags.iter().chain(&lower.language_tags) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}
