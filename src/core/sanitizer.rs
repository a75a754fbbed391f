use std::collections::HashSet;

const MIN_LENGTH_EXCLUSIVE: usize = 20;
const MARKERS: [&str; 3] = ["mozilla", "applewebkit", "chrome"];

/// 結構性檢查：長度超過 20 且包含任一瀏覽器標記
pub fn is_valid_user_agent(candidate: &str) -> bool {
    if candidate.chars().count() <= MIN_LENGTH_EXCLUSIVE {
        return false;
    }
    let lowered = candidate.to_lowercase();
    MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Trims, filters and case-insensitively deduplicates raw lines.
///
/// Survivors keep the order of their first occurrence. Invalid lines are
/// dropped silently; an empty or fully invalid input yields an empty vec.
pub fn sanitize<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();

    for line in lines {
        let trimmed = line.as_ref().trim();
        if trimmed.is_empty() || !is_valid_user_agent(trimmed) {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            accepted.push(trimmed.to_string());
        }
    }

    accepted
}

/// 以換行（`\n` 或 `\r\n`）切割整段文字後清洗
pub fn sanitize_text(raw: &str) -> Vec<String> {
    sanitize(raw.lines())
}
