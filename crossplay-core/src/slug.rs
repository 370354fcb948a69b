//! Title slug computation.
//!
//! The slug is the cross-platform merge key: the same game sold on Steam
//! and GOG carries slightly different display titles per storefront, but
//! both normalize to the same slug.

/// Compute the slug for a display title.
///
/// Lowercases the title and replaces every run of non-alphanumeric
/// characters with a single hyphen, trimming leading and trailing hyphens.
///
/// # Examples
///
/// ```
/// use crossplay_core::slugify;
///
/// assert_eq!(slugify("Divinity: Original Sin 2"), "divinity-original-sin-2");
/// assert_eq!(slugify("  ARK: Survival Evolved  "), "ark-survival-evolved");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lc in c.to_lowercase() {
                slug.push(lc);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
