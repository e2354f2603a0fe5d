use std::ops::Range;

/// Width measurement for a run of text in the font about to be used for drawing.
pub trait TextMeasure {
    /// Advance width of `text` in pixels.
    fn measure(&mut self, text: &str) -> f64;

    /// Advance width of `text` with the bytes in `range` drawn at `scale` times the base size.
    ///
    /// The default treats the scaled run as growing linearly with its own width.
    fn measure_scaled(&mut self, text: &str, range: Range<usize>, scale: f64) -> f64 {
        let base = self.measure(text);
        match text.get(range) {
            Some(part) => base + (scale - 1.0) * self.measure(part),
            None => base,
        }
    }
}

impl<F: FnMut(&str) -> f64> TextMeasure for F {
    fn measure(&mut self, text: &str) -> f64 {
        self(text)
    }
}

/// Greedy word wrap.
///
/// Words are whitespace-delimited and rejoined with single spaces; explicit `\n` starts a new
/// line. A word that alone exceeds `max_width` gets a line of its own rather than being broken.
/// Output stops at `max_lines` (remaining text is dropped). Non-blank input always yields at
/// least one line.
pub fn wrap(
    text: &str,
    max_width: f64,
    max_lines: usize,
    measure: &mut impl TextMeasure,
) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let mut lines: Vec<String> = Vec::new();

    'paragraphs: for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure.measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_owned()));
                if lines.len() >= max_lines {
                    break 'paragraphs;
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
            if lines.len() >= max_lines {
                break;
            }
        }
    }

    if lines.is_empty() && !text.trim().is_empty() {
        lines.push(text.trim().to_owned());
    }
    lines
}

/// Split on explicit newlines only, dropping blank lines.
pub fn hard_lines(text: &str) -> Vec<String> {
    let lines: Vec<String> = text
        .split('\n')
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty())
        .collect();
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
