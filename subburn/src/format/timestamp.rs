use crate::foundation::error::{SubburnError, SubburnResult};

/// Round seconds to whole milliseconds; negatives and non-finite values clamp to 0.
pub(crate) fn to_millis(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * 1000.0).round() as u64
}

/// Format as `HH:MM:SS{sep}mmm`, zero-padded.
pub fn format_timestamp(secs: f64, sep: char) -> String {
    let ms = to_millis(secs);
    let h = ms / 3_600_000;
    let m = (ms / 60_000) % 60;
    let s = (ms / 1000) % 60;
    let frac = ms % 1000;
    format!("{h:02}:{m:02}:{s:02}{sep}{frac:03}")
}

/// Format as ASS `H:MM:SS.cc` (centiseconds).
pub fn format_ass_timestamp(secs: f64) -> String {
    let cs = (to_millis(secs) + 5) / 10;
    let h = cs / 360_000;
    let m = (cs / 6000) % 60;
    let s = (cs / 100) % 60;
    let frac = cs % 100;
    format!("{h}:{m:02}:{s:02}.{frac:02}")
}

/// Parse `HH:MM:SS,mmm`, `HH:MM:SS.mmm` or `MM:SS.mmm`.
pub fn parse_timestamp(raw: &str) -> SubburnResult<f64> {
    let bad = || SubburnError::validation(format!("malformed timestamp \"{raw}\""));
    let s = raw.trim();
    let (clock, frac) = s.rsplit_once([',', '.']).ok_or_else(bad)?;
    if frac.is_empty() || frac.len() > 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let frac_ms: u64 = frac.parse().map_err(|_| bad())?;
    let frac_ms = frac_ms * 10u64.pow(3 - frac.len() as u32);

    let parts: Vec<&str> = clock.split(':').collect();
    let nums = parts
        .iter()
        .map(|p| {
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            p.parse::<u64>().map_err(|_| bad())
        })
        .collect::<SubburnResult<Vec<u64>>>()?;
    let (h, m, sec) = match nums.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return Err(bad()),
    };
    if m >= 60 || sec >= 60 {
        return Err(bad());
    }
    let total_ms = ((h * 60 + m) * 60 + sec) * 1000 + frac_ms;
    Ok(total_ms as f64 / 1000.0)
}

#[cfg(test)]
#[path = "../../tests/unit/format/timestamp.rs"]
mod tests;
