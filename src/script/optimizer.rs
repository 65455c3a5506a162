//! Line optimizer
//!
//! Single streaming pass over the emitted lines that collapses each run of
//! consecutive, byte-identical lines into one. For particle commands the
//! run length is folded into the `repeat=` field; every other line simply
//! loses its duplicates. Lines separated by anything else are never merged.

use std::sync::OnceLock;

use regex::Regex;

const PARTICLE_MARKER: &str = "effect:particles{";

fn repeat_field() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"repeat=(\d+)").expect("repeat pattern is valid"))
}

/// Collapse runs of identical lines.
pub fn optimize_lines(lines: &[String]) -> Vec<String> {
    let mut optimized = Vec::with_capacity(lines.len());
    let mut iter = lines.iter();
    let Some(mut last) = iter.next() else {
        return optimized;
    };
    let mut count: u64 = 1;

    for line in iter {
        if line == last {
            count += 1;
        } else {
            optimized.push(apply_repeat(last, count));
            last = line;
            count = 1;
        }
    }
    optimized.push(apply_repeat(last, count));
    optimized
}

/// Representative line for a run of `count` copies of `line`.
pub fn apply_repeat(line: &str, count: u64) -> String {
    if count <= 1 || !line.contains(PARTICLE_MARKER) {
        return line.to_string();
    }

    let re = repeat_field();
    let Some(caps) = re.captures(line) else {
        return line.to_string();
    };
    let Ok(repeat) = caps[1].parse::<u64>() else {
        return line.to_string();
    };

    let replacement = format!("repeat={}", repeat.saturating_mul(count));
    re.replace(line, replacement.as_str()).into_owned()
}
