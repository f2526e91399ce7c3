use log::debug;

use crate::subtitle_model::Cue;

/// Last pass of the merge pipeline: join touching cues with identical text and renumber
pub struct CoalescePass;

impl CoalescePass {
    pub fn run(slices: &[Cue]) -> Vec<Cue> {
        let mut output: Vec<Cue> = Vec::with_capacity(slices.len());

        for cue in slices {
            match output.last_mut() {
                Some(last) if last.end_time_ms == cue.start_time_ms && last.lines == cue.lines => {
                    last.end_time_ms = cue.end_time_ms;
                }
                _ => output.push(cue.clone()),
            }
        }

        for (i, cue) in output.iter_mut().enumerate() {
            cue.seq_num = i + 1;
        }

        debug!("Coalesce pass: {} slices joined into {} cues", slices.len(), output.len());

        output
    }
}
