//! Slug policy: deriving and validating the unique URL identifier of a note.
//!
//! A slug is either supplied by the author (and then checked for global
//! uniqueness before insert) or derived from the title by transliterating
//! Cyrillic to ASCII and collapsing everything else into hyphen-separated
//! lowercase words. Both paths end at the same `UNIQUE` column in the store.

use serde::Serialize;

/// Maximum slug length, in characters.
pub const SLUG_MAX_LENGTH: usize = 100;

/// Suffix appended to the offending slug in the duplicate-slug form error.
pub const WARNING: &str = " - страница с таким slug уже существует, придумайте уникальное значение!";

/// Slug used when the title transliterates to nothing.
const FALLBACK_SLUG: &str = "note";

/// A slug that is already taken by another note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{slug}{warning}", warning = WARNING)]
pub struct DuplicateSlugError {
    /// The conflicting value.
    pub slug: String,
}

impl DuplicateSlugError {
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into() }
    }
}

/// Where the slug of a note being created came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugChoice {
    /// Entered by the author; must be checked against existing notes.
    Supplied(String),
    /// Derived from the title with [`slugify`].
    Derived(String),
}

impl SlugChoice {
    /// Pick the slug to persist for a note with the given title.
    ///
    /// A blank proposal counts as absent.
    pub fn resolve(proposed: Option<&str>, title: &str) -> Self {
        match proposed.map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => Self::Supplied(slug.to_string()),
            None => Self::Derived(slugify(title)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Supplied(s) | Self::Derived(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Supplied(s) | Self::Derived(s) => s,
        }
    }

    /// Supplied slugs get an explicit lookup before insert; derived ones rely
    /// on the store constraint alone.
    pub fn needs_uniqueness_check(&self) -> bool {
        matches!(self, Self::Supplied(_))
    }
}

/// Transliteration of one lowercase character, if it has one.
fn transliterate(c: char) -> Option<&'static str> {
    let s = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "yi",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Ukrainian and Belarusian letters
        'і' => "i",
        'ї' => "yi",
        'є' => "ye",
        'ґ' => "g",
        'ў' => "u",
        // Typography
        '–' | '—' | '‒' | '−' => "-",
        '«' | '»' | '“' | '”' | '„' | '№' => "",
        _ => return None,
    };
    Some(s)
}

/// Derive a URL-safe ASCII slug from arbitrary text.
///
/// Cyrillic is transliterated, the result lowercased, characters outside
/// `[a-z0-9_-]` dropped, and runs of whitespace and hyphens collapsed into a
/// single `-`. The output never starts or ends with `-`, is at most
/// [`SLUG_MAX_LENGTH`] characters, and is never empty.
pub fn slugify(text: &str) -> String {
    let mut ascii = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if let Some(t) = transliterate(c) {
            ascii.push_str(t);
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            ascii.push(c);
        } else if c.is_whitespace() {
            ascii.push(' ');
        }
    }

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;
    for c in ascii.chars() {
        if c == ' ' || c == '-' {
            pending_separator = true;
            continue;
        }
        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;
        slug.push(c);
    }

    // Everything left is ASCII, so byte truncation is char truncation.
    slug.truncate(SLUG_MAX_LENGTH);
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Check that a user-supplied slug contains only letters, digits,
/// underscores and hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
