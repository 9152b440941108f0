// src/routing/inflect.rs

//! Singular/plural heuristics used to fill `SINGULAR` / `PLURAL` placeholders.
//!
//! Only two rules, no dictionary:
//!
//! - plural: `y` -> `ies`, otherwise append `s`
//! - singular: `ies` -> `y`, otherwise drop the last character

/// Placeholder replaced by the singular form in literal templates.
pub const SINGULAR: &str = "SINGULAR";
/// Placeholder replaced by the plural form in literal templates.
pub const PLURAL: &str = "PLURAL";

/// `"category"` -> `"categories"`, `"tab"` -> `"tabs"`.
pub fn derive_plural(singular: &str) -> String {
    match singular.strip_suffix('y') {
        Some(stem) => format!("{stem}ies"),
        None => format!("{singular}s"),
    }
}

/// `"categories"` -> `"category"`, `"tabs"` -> `"tab"`.
///
/// Any other word loses its last character, `s` or not.
pub fn derive_singular(plural: &str) -> String {
    if let Some(stem) = plural.strip_suffix("ies") {
        return format!("{stem}y");
    }
    let mut chars = plural.chars();
    chars.next_back();
    chars.as_str().to_string()
}

/// Which capture a rule exposed for the matched path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameCapture<'a> {
    Singular(&'a str),
    Plural(&'a str),
}

impl NameCapture<'_> {
    /// Returns `(singular, plural)`, deriving whichever form was not captured.
    pub fn forms(&self) -> (String, String) {
        match *self {
            NameCapture::Singular(s) => (s.to_string(), derive_plural(s)),
            NameCapture::Plural(p) => (derive_singular(p), p.to_string()),
        }
    }

    /// Substitute both placeholders in `template`.
    pub fn fill(&self, template: &str) -> String {
        let (singular, plural) = self.forms();
        template.replace(PLURAL, &plural).replace(SINGULAR, &singular)
    }
}
