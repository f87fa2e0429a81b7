/// German characters with no ASCII equivalent are transliterated rather
/// than dropped
const TRANSLITERATIONS: &[(char, &str)] = &[
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
    ('ß', "ss"),
];

fn transliterate(c: char) -> Option<&'static str> {
    TRANSLITERATIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Turn a title into a filesystem-safe slug: transliterate umlauts, keep
/// ASCII alphanumerics, collapse whitespace runs into a single underscore,
/// and drop everything else. "Hello, World!" becomes "Hello_World".
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.chars() {
        if let Some(replacement) = transliterate(c) {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push_str(replacement);
        } else if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() {
            pending_separator = true;
        }
        // punctuation and other symbols are dropped
    }

    slug
}
