/// Returns the complaint for a blank required text field, if any.
pub fn test_text_field(field: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("{field} must not be empty"))
    } else {
        None
    }
}

/// Trims tag names, drops blanks, and keeps the first occurrence of duplicates.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}
