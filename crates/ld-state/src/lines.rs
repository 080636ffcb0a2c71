//! Multi-line list parsing for the name/prize editors

/// Split text into trimmed, non-empty lines, optionally deduplicated
/// (first occurrence wins, order preserved)
pub fn parse_lines(text: &str, unique: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if unique && out.iter().any(|existing| existing == line) {
            continue;
        }
        out.push(line.to_string());
    }
    out
}
