/// slugify
///
/// Derives a URL-safe identifier from a title: lowercase, drop everything that is
/// not an ASCII alphanumeric, whitespace or hyphen, turn whitespace runs into a single
/// hyphen, collapse repeated hyphens and trim them from both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
    }

    slug
}
