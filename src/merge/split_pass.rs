/*!
 * Initial interval split.
 *
 * Every distinct start and end time of both tracks becomes a cut point. Each
 * pair of consecutive cut points forms an atomic interval that lies entirely
 * inside at most one cue per track; the interval is emitted with the lines of
 * whichever cues cover it, or dropped when neither track shows anything.
 */

use std::sync::atomic::AtomicBool;

use log::debug;

use crate::subtitle_model::{Cue, Line, LineSource};

use super::is_cancelled;

/// First pass of the merge pipeline
pub struct SplitPass;

impl SplitPass {
    /// Split both tracks on the union of their cue boundaries.
    ///
    /// Inputs must be sorted by start time. Returns `None` if `cancel` was set
    /// while the intervals were being processed.
    pub fn run(upper: &[Cue], lower: &[Cue], cancel: &AtomicBool) -> Option<Vec<Cue>> {
        let points = Self::time_points(upper, lower);
        let mut slices = Vec::new();

        for window in points.windows(2) {
            if is_cancelled(cancel) {
                return None;
            }

            let (from, to) = (window[0], window[1]);
            let upper_cue = Self::covering_cue(upper, from, to);
            let lower_cue = Self::covering_cue(lower, from, to);

            if upper_cue.is_none() && lower_cue.is_none() {
                continue;
            }

            let mut lines: Vec<Line> = Vec::new();
            if let Some(cue) = upper_cue {
                lines.extend(cue.lines.iter().map(|line| line.retagged(LineSource::Upper)));
            }
            if let Some(cue) = lower_cue {
                lines.extend(cue.lines.iter().map(|line| line.retagged(LineSource::Lower)));
            }

            slices.push(Cue::new(0, from, to, lines));
        }

        debug!(
            "Split pass: {} atomic intervals, {} slices with text",
            points.len().saturating_sub(1),
            slices.len()
        );

        Some(slices)
    }

    /// Sorted, deduplicated start and end times of both tracks
    pub fn time_points(upper: &[Cue], lower: &[Cue]) -> Vec<u64> {
        let mut points: Vec<u64> = upper
            .iter()
            .chain(lower)
            .flat_map(|cue| [cue.start_time_ms, cue.end_time_ms])
            .collect();
        points.sort_unstable();
        points.dedup();
        points
    }

    /// The cue whose span contains `[from, to]` entirely, if any
    fn covering_cue(cues: &[Cue], from: u64, to: u64) -> Option<&Cue> {
        // Cues do not overlap, so end times are sorted as well
        let index = cues.partition_point(|cue| cue.end_time_ms < to);
        cues.get(index)
            .filter(|cue| cue.start_time_ms <= from && cue.end_time_ms >= to)
    }
}
