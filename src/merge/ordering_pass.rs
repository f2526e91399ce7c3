use crate::subtitle_model::{Cue, LineSource};

/// Third pass of the merge pipeline: upper lines first, then lower lines
pub struct OrderingPass;

impl OrderingPass {
    pub fn run(slices: &[Cue]) -> Vec<Cue> {
        slices
            .iter()
            .map(|cue| {
                let mut ordered = cue.clone();
                // Stable sort keeps the relative order of lines from one source
                ordered.lines.sort_by_key(|line| Self::rank(line.source));
                ordered
            })
            .collect()
    }

    fn rank(source: LineSource) -> u8 {
        match source {
            LineSource::Upper => 0,
            LineSource::Lower => 1,
            LineSource::Single => 2,
        }
    }
}
