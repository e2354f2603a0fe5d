use crate::foundation::error::{SubburnError, SubburnResult};
use crate::format::timestamp::{format_timestamp, parse_timestamp};
use crate::model::segment::{Segment, SegmentId};

/// Generate SubRip text. Segments with blank text are skipped and numbering stays contiguous.
///
/// Cue text is normalized: trailing whitespace on each line and blank lines inside a segment are
/// removed, since a blank line ends an SRT block. Parsing the output gives back the normalized
/// text, so only text already in that form round-trips unchanged.
pub fn to_srt(segments: &[Segment]) -> String {
    write_cues(segments, ',', String::new())
}

/// Parse SubRip text into segments in file order.
///
/// Sequence numbers are optional and ignored; ids are assigned from cue order starting at 0.
pub fn parse_srt(input: &str) -> SubburnResult<Vec<Segment>> {
    parse_cues(input)
}

pub(crate) fn write_cues(segments: &[Segment], sep: char, mut out: String) -> String {
    let mut n = 0usize;
    for seg in segments {
        let text = cue_text(&seg.text);
        if text.is_empty() {
            continue;
        }
        n += 1;
        out.push_str(&format!(
            "{n}\n{} --> {}\n{text}\n\n",
            format_timestamp(seg.start, sep),
            format_timestamp(seg.end, sep)
        ));
    }
    out
}

/// Cue payload: trailing whitespace is trimmed per line and blank lines, which would terminate
/// the block, are dropped.
fn cue_text(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn parse_cues(input: &str) -> SubburnResult<Vec<Segment>> {
    let input = input.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut out = Vec::new();
    for (block_no, block) in split_blocks(&input).into_iter().enumerate() {
        let Some(arrow_at) = block.iter().position(|l| l.contains("-->")) else {
            continue;
        };
        let (start, end) = parse_timing(block[arrow_at]).map_err(|e| {
            SubburnError::validation(format!("cue block {}: {e}", block_no + 1))
        })?;
        let text = block[arrow_at + 1..].join("\n");
        let seg = Segment {
            id: SegmentId(out.len() as u64),
            start,
            end,
            text,
            words: None,
        };
        seg.validate()?;
        out.push(seg);
    }
    Ok(out)
}

fn split_blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut cur = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            if !cur.is_empty() {
                blocks.push(std::mem::take(&mut cur));
            }
        } else {
            cur.push(line.trim_end());
        }
    }
    if !cur.is_empty() {
        blocks.push(cur);
    }
    blocks
}

fn parse_timing(line: &str) -> SubburnResult<(f64, f64)> {
    let (a, b) = line
        .split_once("-->")
        .ok_or_else(|| SubburnError::validation("missing \"-->\""))?;
    // WebVTT cue settings may follow the end timestamp.
    let b = b.split_whitespace().next().unwrap_or("");
    Ok((parse_timestamp(a)?, parse_timestamp(b)?))
}

#[cfg(test)]
#[path = "../../tests/unit/format/srt.rs"]
mod tests;
