//! Locale-aware link rewriting
//!
//! Paths use an "as-needed" prefix: the default locale is served without a
//! prefix (`/impact`), every other locale under its code (`/id/impact`).

use crate::locale::Locale;

/// Split a leading locale segment off `path`.
///
/// Returns the locale (if the first segment is a supported code) and the
/// remaining path, which always starts with `/`, `?` or `#`. Unprefixed
/// paths are returned unchanged.
pub fn split_locale(path: &str) -> (Option<Locale>, &str) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let end = trimmed
        .find(|c| matches!(c, '/' | '?' | '#'))
        .unwrap_or(trimmed.len());

    match Locale::from_code(&trimmed[..end]) {
        Some(locale) => {
            let rest = &trimmed[end..];
            (Some(locale), if rest.is_empty() { "/" } else { rest })
        }
        None => (None, path),
    }
}

/// Build the href for `path` in `locale`, replacing any locale prefix it
/// already carries. Query strings and fragments are kept.
pub fn localized_path(path: &str, locale: Locale) -> String {
    let (_, rest) = split_locale(path);
    let (pathname, suffix) = match rest.find(|c| matches!(c, '?' | '#')) {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let pathname = match pathname {
        "" | "/" => "/",
        p if p.starts_with('/') => p,
        // Relative input; anchor it at the site root
        p => return localized_path(&format!("/{}{}", p, suffix), locale),
    };

    if locale.is_default() {
        format!("{}{}", pathname, suffix)
    } else if pathname == "/" {
        format!("/{}{}", locale, suffix)
    } else {
        format!("/{}{}{}", locale, pathname, suffix)
    }
}

/// Rewrite the current page path for a switch to `target`
pub fn switch_locale(current_path: &str, target: Locale) -> String {
    let switched = localized_path(current_path, target);
    tracing::debug!(from = current_path, to = %switched, locale = %target, "locale switch");
    switched
}
