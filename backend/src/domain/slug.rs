//! URL slugs for news articles.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and single hyphens.

/// Longest slug generated from a title, before any de-duplication suffix.
pub const SLUG_BASE_MAX: usize = 80;

/// Return `true` when `value` is a valid slug.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Derive a slug from free text.
///
/// Runs of anything other than ASCII letters and digits collapse into one
/// hyphen. Titles with no usable characters produce `article`.
///
/// # Examples
/// ```
/// use pitchside::domain::slug::slugify;
///
/// assert_eq!(slugify("Super Eagles: AFCON squad named!"), "super-eagles-afcon-squad-named");
/// assert_eq!(slugify("???"), "article");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len().min(SLUG_BASE_MAX));
    let mut pending_hyphen = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            let hyphen = pending_hyphen && !slug.is_empty();
            if slug.len() + usize::from(hyphen) + 1 > SLUG_BASE_MAX {
                break;
            }
            if hyphen {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch != '\'' {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        return "article".to_owned();
    }
    slug
}

/// Candidate slug for the `attempt`-th collision: `base`, `base-2`, `base-3`, …
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_owned()
    } else {
        format!("{base}-{attempt}")
    }
}
