//! Elga i18n - Locale resolution and message bundle lookup
//!
//! Resolves the active [`Locale`] for a request (route segment, stored
//! preference, `Accept-Language`), holds one statically loaded
//! [`MessageBundle`] per locale in a [`Catalog`], and serves dotted-path
//! lookups through an explicitly passed [`Translator`] handle.
//!
//! Resolution never fails: unsupported locales fall back to
//! [`Locale::DEFAULT`] and missing keys render as the key itself.

pub mod bundle;
pub mod locale;
pub mod routing;
pub mod translator;
pub mod value;

pub use bundle::{Catalog, CoverageGap, GapKind, MessageBundle};
pub use locale::{negotiate, resolve_locale, resolve_request, Locale, RequestLocale};
pub use routing::{localized_path, split_locale, switch_locale};
pub use translator::{record_text, LookupError, Translator};
pub use value::{MessageValue, Record, Shape};
