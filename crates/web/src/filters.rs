//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for roster.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Uppercased first letter of a name, for avatar placeholders.
///
/// Usage in templates: `{{ user.display_name|initial }}`
#[askama::filter_fn]
pub fn initial(name: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(initial_of(&name.to_string()))
}

fn initial_of(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map_or_else(|| "?".to_owned(), |c| c.to_uppercase().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_of() {
        assert_eq!(initial_of("ada"), "A");
        assert_eq!(initial_of("  émile"), "É");
        assert_eq!(initial_of(""), "?");
    }
}
