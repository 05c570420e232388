use std::sync::LazyLock;

use regex::Regex;

static HREF_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:xlink:)?href\s*=\s*"([^"]*)""#).expect("href attribute regex")
});

/// Cards are embedded in READMEs where remote loads are blocked, so every
/// reference has to be inline.
pub fn assert_self_contained(name: &str, svg: &str) -> anyhow::Result<()> {
    for caps in HREF_ATTR.captures_iter(svg) {
        let value = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if is_disallowed_reference(value) {
            anyhow::bail!(
                "self-contained check failed: {} references {:?}",
                name,
                truncate(value, 80)
            );
        }
    }
    Ok(())
}

fn is_disallowed_reference(v: &str) -> bool {
    let s = v.trim();
    if s.is_empty() {
        return false;
    }
    let lowered = s.to_ascii_lowercase();
    !(lowered.starts_with("data:") || lowered.starts_with('#'))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
