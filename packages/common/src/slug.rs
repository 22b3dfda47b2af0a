/// Derive a URL-friendly slug from a human-readable name.
///
/// Lowercases the input and collapses every run of non-alphanumeric
/// characters into a single hyphen. Leading and trailing hyphens are dropped.
/// The transformation is lossy, so distinct names may share a slug.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
