/// Slug derivation for project titles
///
/// Titles are transliterated to ASCII, lowercased and joined with hyphens.
/// Collisions between distinct titles get a numeric suffix.

/// Lowercase-hyphenated slug for a title
pub fn slugify_title(title: &str) -> String {
    ::slug::slugify(title)
}

/// Pick the first free variant of `base`: `base`, `base-2`, `base-3`, …
///
/// `taken` holds the slugs already in use that start with `base`.
pub fn first_free_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken.iter().any(|s| *s == candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercase_hyphenated() {
        assert_eq!(slugify_title("My First Project"), "my-first-project");
        assert_eq!(slugify_title("Laravel & Vue: SPA"), "laravel-vue-spa");
    }

    #[test]
    fn slug_trims_and_collapses_separators() {
        assert_eq!(slugify_title("  Hello --  World  "), "hello-world");
    }

    #[test]
    fn slug_transliterates_accents() {
        assert_eq!(slugify_title("Café Crème"), "cafe-creme");
    }

    #[test]
    fn slug_is_deterministic() {
        let title = "Boolflix 2.0";
        assert_eq!(slugify_title(title), slugify_title(title));
    }

    #[test]
    fn punctuation_only_title_has_empty_slug() {
        assert_eq!(slugify_title("!!!"), "");
    }

    #[test]
    fn free_slug_when_unused() {
        assert_eq!(first_free_slug("boolflix", &[]), "boolflix");
        assert_eq!(first_free_slug("boolflix", &["boolflix-2".to_string()]), "boolflix");
    }

    #[test]
    fn colliding_slug_gets_next_suffix() {
        let taken = vec!["boolflix".to_string(), "boolflix-2".to_string()];
        assert_eq!(first_free_slug("boolflix", &taken), "boolflix-3");
    }
}
