//! Message bundles and the per-locale catalog

use elga_core::{ElgaError, Result};
use std::fmt;

use crate::locale::Locale;
use crate::value::{join_path, walk, MessageValue, Record, Shape};

const EN_MESSAGES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/messages/en.json"));
const ID_MESSAGES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/messages/id.json"));

/// The full set of translated strings for one locale
#[derive(Debug, Clone)]
pub struct MessageBundle {
    locale: Locale,
    root: Record,
}

impl MessageBundle {
    /// Parse a bundle from its JSON source. The top level must be an object.
    pub fn from_json(locale: Locale, source: &str) -> Result<Self> {
        let bundle_error = |detail: String| ElgaError::BundleError {
            locale: locale.to_string(),
            detail,
        };

        let json: serde_json::Value =
            serde_json::from_str(source).map_err(|e| bundle_error(e.to_string()))?;

        match MessageValue::from_json(json, "").map_err(bundle_error)? {
            MessageValue::Group(root) => Ok(Self { locale, root }),
            other => Err(bundle_error(format!(
                "top level must be an object, found {}",
                other.shape()
            ))),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn root(&self) -> &Record {
        &self.root
    }

    /// Look up a dotted path such as `nav.home`
    pub fn lookup(&self, path: &str) -> Option<&MessageValue> {
        walk(&self.root, path)
    }

    /// Every leaf (non-group) path in the bundle with its shape, sorted
    pub fn leaf_paths(&self) -> Vec<(String, Shape)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, "", &mut out);
        out
    }
}

fn collect_leaves(record: &Record, prefix: &str, out: &mut Vec<(String, Shape)>) {
    for (key, value) in record {
        let path = join_path(prefix, key);
        match value {
            MessageValue::Group(child) => collect_leaves(child, &path, out),
            leaf => out.push((path, leaf.shape())),
        }
    }
}

/// Why a locale's bundle diverges from the default bundle at one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapKind {
    /// Present in the default bundle, absent here
    Missing,
    /// Present in both with different shapes
    ShapeMismatch { expected: Shape, found: Shape },
    /// Present here, absent from the default bundle
    Extra,
}

/// One divergence reported by [`Catalog::coverage_gaps`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub locale: Locale,
    pub path: String,
    pub kind: GapKind,
}

impl fmt::Display for CoverageGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            GapKind::Missing => write!(f, "[{}] missing: {}", self.locale, self.path),
            GapKind::ShapeMismatch { expected, found } => write!(
                f,
                "[{}] shape mismatch: {} (expected {}, found {})",
                self.locale, self.path, expected, found
            ),
            GapKind::Extra => write!(f, "[{}] not in default bundle: {}", self.locale, self.path),
        }
    }
}

/// One message bundle per supported locale, loaded up front and read-only
/// afterwards
#[derive(Debug, Clone)]
pub struct Catalog {
    // Indexed by `Locale::index`
    bundles: Vec<MessageBundle>,
}

impl Catalog {
    /// Load the bundles compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_sources(&[(Locale::En, EN_MESSAGES), (Locale::Id, ID_MESSAGES)])
    }

    /// Build a catalog from JSON sources. Every supported locale must be
    /// given exactly once.
    pub fn from_sources(sources: &[(Locale, &str)]) -> Result<Self> {
        let mut bundles = Vec::with_capacity(Locale::ALL.len());
        for locale in Locale::ALL {
            let mut matching = sources.iter().filter(|(l, _)| *l == locale);
            let (_, source) = matching.next().ok_or_else(|| ElgaError::BundleError {
                locale: locale.to_string(),
                detail: "no message source provided".to_string(),
            })?;
            if matching.next().is_some() {
                return Err(ElgaError::BundleError {
                    locale: locale.to_string(),
                    detail: "message source provided more than once".to_string(),
                });
            }
            bundles.push(MessageBundle::from_json(locale, source)?);
        }

        tracing::debug!(locales = bundles.len(), "message catalog loaded");
        Ok(Self { bundles })
    }

    /// The bundle for `locale`
    pub fn bundle(&self, locale: Locale) -> &MessageBundle {
        &self.bundles[locale.index()]
    }

    /// Compare every non-default bundle against the default one.
    ///
    /// Gaps are reported, never enforced: a missing key still renders as
    /// its literal path for that locale only.
    pub fn coverage_gaps(&self) -> Vec<CoverageGap> {
        let reference = self.bundle(Locale::DEFAULT);
        let reference_paths = reference.leaf_paths();
        let mut gaps = Vec::new();

        for locale in Locale::ALL.into_iter().filter(|l| !l.is_default()) {
            let bundle = self.bundle(locale);

            for (path, expected) in &reference_paths {
                match bundle.lookup(path).map(MessageValue::shape) {
                    None => gaps.push(CoverageGap {
                        locale,
                        path: path.clone(),
                        kind: GapKind::Missing,
                    }),
                    Some(found) if found != *expected => gaps.push(CoverageGap {
                        locale,
                        path: path.clone(),
                        kind: GapKind::ShapeMismatch {
                            expected: *expected,
                            found,
                        },
                    }),
                    Some(_) => {}
                }
            }

            for (path, _) in bundle.leaf_paths() {
                if reference.lookup(&path).is_none() {
                    gaps.push(CoverageGap {
                        locale,
                        path,
                        kind: GapKind::Extra,
                    });
                }
            }
        }

        gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EN: &str = r#"{
        "nav": { "home": "Home", "impact": "Impact" },
        "home": { "pillars": ["Collect", "Restore"] }
    }"#;

    #[test]
    fn test_embedded_catalog_loads_every_locale() {
        let catalog = Catalog::embedded().unwrap();
        for locale in Locale::ALL {
            let bundle = catalog.bundle(locale);
            assert_eq!(bundle.locale(), locale);
            assert!(bundle.lookup("nav.home").is_some());
        }
    }

    #[test]
    fn test_embedded_bundles_have_full_coverage() {
        let catalog = Catalog::embedded().unwrap();
        let gaps = catalog.coverage_gaps();
        assert!(gaps.is_empty(), "coverage gaps: {:?}", gaps);
    }

    #[test]
    fn test_lookup_dotted_path() {
        let bundle = MessageBundle::from_json(Locale::En, EN).unwrap();
        assert_eq!(
            bundle.lookup("nav.home").and_then(MessageValue::as_text),
            Some("Home")
        );
        assert!(bundle.lookup("nav.missing").is_none());
    }

    #[test]
    fn test_top_level_must_be_object() {
        let err = MessageBundle::from_json(Locale::Id, r#"["a"]"#).unwrap_err();
        assert!(err.to_string().contains("top level"));
        assert!(MessageBundle::from_json(Locale::Id, "{ not json").is_err());
    }

    #[test]
    fn test_from_sources_requires_every_locale() {
        let err = Catalog::from_sources(&[(Locale::En, EN)]).unwrap_err();
        assert!(err.to_string().contains("(id)"));

        let err = Catalog::from_sources(&[(Locale::En, EN), (Locale::En, EN), (Locale::Id, EN)])
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_coverage_gaps_reported_not_enforced() {
        let id = r#"{
            "nav": { "home": "Beranda" },
            "home": { "pillars": "Kumpulkan" },
            "extra": "Tambahan"
        }"#;
        let catalog = Catalog::from_sources(&[(Locale::En, EN), (Locale::Id, id)]).unwrap();
        let gaps = catalog.coverage_gaps();

        assert!(gaps.contains(&CoverageGap {
            locale: Locale::Id,
            path: "nav.impact".to_string(),
            kind: GapKind::Missing,
        }));
        assert!(gaps.contains(&CoverageGap {
            locale: Locale::Id,
            path: "home.pillars".to_string(),
            kind: GapKind::ShapeMismatch {
                expected: Shape::List,
                found: Shape::Text,
            },
        }));
        assert!(gaps.iter().any(|g| g.path == "extra" && g.kind == GapKind::Extra));
        assert_eq!(gaps.len(), 3);
    }

    #[test]
    fn test_leaf_paths_sorted() {
        let bundle = MessageBundle::from_json(Locale::En, EN).unwrap();
        let paths: Vec<String> = bundle.leaf_paths().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["home.pillars", "nav.home", "nav.impact"]);
    }
}
