/*!
 * SubRip (SRT) writer.
 *
 * Produces canonical SubRip text: sequence numbers are regenerated as 1..N,
 * timestamps use `HH:MM:SS,mmm` with a comma separator, blocks are separated
 * by a single blank line and there is no trailing blank line after the last
 * block. Output read back with the parser yields the same track.
 */

use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_model::{Cue, Track};

/// Opening or closing inline markup tag such as `<i>`, `</i>` or `<font color="red">`
static MARKUP_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)(?:\s[^<>]*)?>").unwrap()
});

/// Write a track as SubRip text, optionally stripping inline markup
pub fn write(track: &Track, plain_text: bool) -> String {
    let mut output = String::new();

    for (i, cue) in track.cues.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        write_cue(&mut output, i + 1, cue, plain_text);
    }

    output
}

fn write_cue(output: &mut String, seq_num: usize, cue: &Cue, plain_text: bool) {
    // Writing into a String cannot fail
    let _ = writeln!(output, "{}", seq_num);
    let _ = writeln!(output, "{}", cue.format_time_range());
    for line in &cue.lines {
        if plain_text {
            output.push_str(&strip_markup(&line.text));
        } else {
            output.push_str(&line.text);
        }
        output.push('\n');
    }
}

/// Remove paired inline markup tags, keeping the text between them.
///
/// A closing tag pairs with the nearest unpaired opening tag of the same name
/// (case-insensitive) that precedes it. Tags without a partner and stray `<`
/// or `>` characters are left as they are. Removing a pair can splice the
/// surrounding text into a new tag (`<<i></i>i>`), so removal repeats until
/// nothing changes and stripping twice is the same as stripping once.
pub fn strip_markup(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        match strip_paired_tags(&current) {
            Some(stripped) => current = stripped,
            None => return current,
        }
    }
}

/// One round of pair removal; `None` when no pair was found
fn strip_paired_tags(text: &str) -> Option<String> {
    if !text.contains('<') {
        return None;
    }

    let tags: Vec<_> = MARKUP_TAG_REGEX.captures_iter(text).collect();
    let mut remove = vec![false; tags.len()];
    let mut unpaired_opens: Vec<(String, usize)> = Vec::new();

    for (index, caps) in tags.iter().enumerate() {
        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();

        if !closing {
            unpaired_opens.push((name, index));
        } else if let Some(pos) = unpaired_opens.iter().rposition(|(open, _)| *open == name) {
            let (_, open_index) = unpaired_opens.remove(pos);
            remove[open_index] = true;
            remove[index] = true;
        }
    }

    if !remove.contains(&true) {
        return None;
    }

    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for (caps, removed) in tags.iter().zip(remove) {
        if !removed {
            continue;
        }
        if let Some(whole) = caps.get(0) {
            result.push_str(&text[cursor..whole.start()]);
            cursor = whole.end();
        }
    }
    result.push_str(&text[cursor..]);

    Some(result)
}
