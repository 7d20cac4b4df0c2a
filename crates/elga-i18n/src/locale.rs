//! Supported locales and request locale resolution

use fluent_langneg::{accepted_languages, negotiate_languages, LanguageIdentifier, NegotiationStrategy};
use std::fmt;
use std::str::FromStr;

use crate::routing::split_locale;

/// Name of the cookie holding a visitor's explicitly chosen locale
pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

/// A supported site locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Locale {
    En,
    Id,
}

impl Locale {
    /// The locale used whenever input is missing or unsupported
    pub const DEFAULT: Locale = Locale::En;

    /// Every supported locale, default first
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Id];

    pub const fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Id => "id",
        }
    }

    /// Exact, case-sensitive match against the supported identifiers
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|locale| locale.as_str() == code)
    }

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Locale::En => 0,
            Locale::Id => 1,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| {
            let supported: Vec<&str> = Self::ALL.iter().map(|l| l.as_str()).collect();
            format!(
                "unsupported locale '{}' (supported: {})",
                s,
                supported.join(", ")
            )
        })
    }
}

/// Resolve an optional candidate to a supported locale.
///
/// Returns the candidate unchanged when it is supported, otherwise
/// [`Locale::DEFAULT`].
pub fn resolve_locale(candidate: Option<&str>) -> Locale {
    match candidate.and_then(Locale::from_code) {
        Some(locale) => locale,
        None => {
            if let Some(raw) = candidate {
                tracing::debug!(candidate = raw, default = %Locale::DEFAULT, "unsupported locale, using default");
            }
            Locale::DEFAULT
        }
    }
}

/// Pick the best supported locale from an `Accept-Language` header value.
///
/// Entries are ranked by their `q` weight (default 1, `q=0` excluded),
/// keeping header order among equal weights. Region subtags are ignored
/// (`id-ID` selects `id`). Returns `None` when nothing in the header is
/// supported.
pub fn negotiate(accept_language: &str) -> Option<Locale> {
    let requested = accepted_languages::parse(&by_weight(accept_language).join(","));
    let available: Vec<LanguageIdentifier> = Locale::ALL
        .iter()
        .filter_map(|locale| locale.as_str().parse().ok())
        .collect();

    let supported = negotiate_languages(
        &requested,
        &available,
        None,
        NegotiationStrategy::Filtering,
    );

    supported
        .first()
        .and_then(|langid| Locale::from_code(langid.language.as_str()))
}

/// Language tags of an `Accept-Language` value, highest weight first
fn by_weight(header: &str) -> Vec<&str> {
    let mut weighted: Vec<(&str, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let q = parts
                .filter_map(|param| param.trim().strip_prefix("q="))
                .find_map(|value| value.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (q > 0.0).then_some((tag, q))
        })
        .collect();

    // sort_by is stable, so equal weights keep header order
    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

/// The locale signals carried by an incoming page request
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLocale<'a> {
    /// Request path, possibly prefixed with a locale segment (`/id/impact`)
    pub path: &'a str,
    /// Value of the [`LOCALE_COOKIE`] cookie, if present
    pub cookie: Option<&'a str>,
    /// Raw `Accept-Language` header, if present
    pub accept_language: Option<&'a str>,
}

impl<'a> RequestLocale<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            path,
            cookie: None,
            accept_language: None,
        }
    }

    pub fn with_cookie(mut self, cookie: &'a str) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn with_accept_language(mut self, header: &'a str) -> Self {
        self.accept_language = Some(header);
        self
    }
}

/// Resolve the active locale for a request.
///
/// Precedence: locale path segment, stored cookie preference,
/// `Accept-Language` negotiation, then [`Locale::DEFAULT`]. An unsupported
/// value at one level falls through to the next.
pub fn resolve_request(request: &RequestLocale<'_>) -> Locale {
    split_locale(request.path)
        .0
        .or_else(|| request.cookie.and_then(Locale::from_code))
        .or_else(|| request.accept_language.and_then(negotiate))
        .unwrap_or(Locale::DEFAULT)
}
