/*!
 * Flicker elimination.
 *
 * Splitting on both tracks' boundaries leaves slices where one track's text
 * is shown alone only because the other track's cue started late or ended
 * early. Such slices borrow the other track's lines from the nearest slice
 * that has them. Text that is alone for its whole lifetime (sound effects,
 * signs translated in one language only) is left untouched.
 *
 * "Only briefly alone" is a chosen threshold: a slice is extended only when
 * its run (the contiguous slices showing the same lines from its track) is
 * shown next to the other track for strictly longer, in total, than it is
 * shown alone. A lower cue nested inside a longer upper cue therefore keeps
 * its own timing, while a cue starting a few hundred milliseconds late is
 * filled in.
 */

use std::sync::atomic::AtomicBool;

use log::debug;

use crate::subtitle_model::{Cue, Line, LineSource};

use super::is_cancelled;

/// Second pass of the merge pipeline
pub struct ExtensionPass;

/// Neighbour lookup tables for one source
struct SourceIndex {
    source: LineSource,
    /// Nearest earlier slice containing this source
    previous: Vec<Option<usize>>,
    /// Nearest later slice containing this source
    next: Vec<Option<usize>>,
    /// Run each slice belongs to, keyed on this source's lines
    run_of: Vec<usize>,
    /// Per run: time shown without and with the counterpart source
    run_durations: Vec<RunDurations>,
}

#[derive(Debug, Clone, Copy, Default)]
struct RunDurations {
    alone_ms: u64,
    accompanied_ms: u64,
}

impl SourceIndex {
    fn build(slices: &[Cue], source: LineSource) -> Self {
        let count = slices.len();
        let own_lines: Vec<Vec<Line>> = slices.iter().map(|cue| cue.lines_from(source)).collect();

        let mut previous = vec![None; count];
        let mut last = None;
        for (i, cue) in slices.iter().enumerate() {
            previous[i] = last;
            if cue.has_source(source) {
                last = Some(i);
            }
        }

        let mut next = vec![None; count];
        let mut last = None;
        for (i, cue) in slices.iter().enumerate().rev() {
            next[i] = last;
            if cue.has_source(source) {
                last = Some(i);
            }
        }

        let counterpart = source.counterpart();
        let mut run_of = Vec::with_capacity(count);
        let mut run_durations: Vec<RunDurations> = Vec::new();
        for (i, cue) in slices.iter().enumerate() {
            let continues_run = i > 0
                && slices[i - 1].end_time_ms == cue.start_time_ms
                && own_lines[i - 1] == own_lines[i];
            if !continues_run {
                run_durations.push(RunDurations::default());
            }
            let run = run_durations.len() - 1;
            if cue.has_source(counterpart) {
                run_durations[run].accompanied_ms += cue.duration_ms();
            } else {
                run_durations[run].alone_ms += cue.duration_ms();
            }
            run_of.push(run);
        }

        SourceIndex {
            source,
            previous,
            next,
            run_of,
            run_durations,
        }
    }

    /// The slice's text is only transiently alone: its run shows the
    /// counterpart source for longer than it goes without it
    fn transiently_alone(&self, slice: usize) -> bool {
        let run = self.run_durations[self.run_of[slice]];
        run.accompanied_ms > run.alone_ms
    }
}

impl ExtensionPass {
    /// Fill transiently single-source slices with the other source's nearest lines.
    ///
    /// Returns `None` if `cancel` was set while the slices were being processed.
    ///
    /// # Panics
    ///
    /// Panics if a slice's run shows the other source but no slice with that
    /// source exists, which means the split pass broke its own invariants.
    pub fn run(slices: &[Cue], cancel: &AtomicBool) -> Option<Vec<Cue>> {
        let upper = SourceIndex::build(slices, LineSource::Upper);
        let lower = SourceIndex::build(slices, LineSource::Lower);

        let mut extended_count = 0;
        let mut result = Vec::with_capacity(slices.len());

        for (i, cue) in slices.iter().enumerate() {
            if is_cancelled(cancel) {
                return None;
            }

            let sources = cue.sources();
            let own = match (sources.len(), sources.iter().next()) {
                (1, Some(&source)) if source != LineSource::Single => source,
                _ => {
                    result.push(cue.clone());
                    continue;
                }
            };

            let (own_index, other_index) = if own == LineSource::Upper {
                (&upper, &lower)
            } else {
                (&lower, &upper)
            };

            if !own_index.transiently_alone(i) {
                result.push(cue.clone());
                continue;
            }

            let donor = Self::nearest_donor(slices, i, other_index);
            let mut extended = cue.clone();
            extended.lines.extend(slices[donor].lines_from(other_index.source));
            result.push(extended);
            extended_count += 1;
        }

        debug!("Extension pass: {} of {} slices borrowed lines from a neighbour", extended_count, slices.len());

        Some(result)
    }

    /// Closest slice (forward or backward) showing `index.source`; equal gaps prefer forward
    fn nearest_donor(slices: &[Cue], i: usize, index: &SourceIndex) -> usize {
        let cue = &slices[i];
        match (index.previous[i], index.next[i]) {
            (Some(back), Some(forward)) => {
                let forward_gap = slices[forward].start_time_ms.saturating_sub(cue.end_time_ms);
                let backward_gap = cue.start_time_ms.saturating_sub(slices[back].end_time_ms);
                if forward_gap <= backward_gap {
                    forward
                } else {
                    back
                }
            }
            (Some(back), None) => back,
            (None, Some(forward)) => forward,
            (None, None) => unreachable!(
                "slice {} shares its run with {:?} lines but no slice carries them",
                i, index.source
            ),
        }
    }
}
