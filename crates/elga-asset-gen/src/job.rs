//! Generation jobs and the job lists that order them
//!
//! A job list is a TOML file with a `[collection]` header, an optional
//! `[style]` guide, and an ordered `[[jobs]]` array. Two collections ship
//! with the crate; operators can point the CLI at their own file.

use elga_core::{ElgaError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::style::StyleGuide;

const PHOTO_JOBS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/jobs/photo.toml"));
const WATERCOLOR_JOBS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/jobs/watercolor.toml"));

/// Extension of every generated asset
pub const OUTPUT_EXTENSION: &str = "png";

/// Aspect ratios accepted by the image providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Square,
    Portrait3x4,
    Landscape4x3,
    Portrait9x16,
    Landscape16x9,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait3x4,
        AspectRatio::Landscape4x3,
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
        }
    }

    /// Width divided by height
    pub fn ratio(self) -> f64 {
        match self {
            AspectRatio::Square => 1.0,
            AspectRatio::Portrait3x4 => 3.0 / 4.0,
            AspectRatio::Landscape4x3 => 4.0 / 3.0,
            AspectRatio::Portrait9x16 => 9.0 / 16.0,
            AspectRatio::Landscape16x9 => 16.0 / 9.0,
        }
    }

    /// The pixel size requested from size-based providers for this ratio
    pub fn default_size(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Landscape4x3 | AspectRatio::Landscape16x9 => (1536, 1024),
            AspectRatio::Portrait3x4 | AspectRatio::Portrait9x16 => (1024, 1536),
        }
    }

    /// The supported ratio closest to `width / height`
    pub fn nearest(width: u32, height: u32) -> Self {
        let target = (width.max(1) as f64 / height.max(1) as f64).ln();
        let mut best = AspectRatio::Square;
        let mut best_distance = f64::MAX;
        for candidate in Self::ALL {
            let distance = (candidate.ratio().ln() - target).abs();
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }
        best
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = ElgaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| {
                ElgaError::InvalidJobList(format!(
                    "unsupported aspect ratio '{}' (use 1:1, 3:4, 4:3, 9:16, 16:9)",
                    s
                ))
            })
    }
}

/// Requested output dimensions, either exact or as a ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    Size { width: u32, height: u32 },
    Aspect(AspectRatio),
}

impl OutputShape {
    /// Parse `"1536x1024"`
    pub fn parse_size(s: &str) -> Result<Self> {
        let invalid = || ElgaError::InvalidJobList(format!("invalid size '{}' (expected WIDTHxHEIGHT)", s));
        let (w, h) = s.trim().split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(OutputShape::Size { width, height })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match *self {
            OutputShape::Size { width, height } => (width, height),
            OutputShape::Aspect(ratio) => ratio.default_size(),
        }
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        match *self {
            OutputShape::Size { width, height } => AspectRatio::nearest(width, height),
            OutputShape::Aspect(ratio) => ratio,
        }
    }

    /// `"WIDTHxHEIGHT"` as size-based APIs expect it
    pub fn size_string(&self) -> String {
        let (width, height) = self.dimensions();
        format!("{}x{}", width, height)
    }
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputShape::Size { .. } => f.write_str(&self.size_string()),
            OutputShape::Aspect(ratio) => write!(f, "{}", ratio),
        }
    }
}

/// One image to produce
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    /// Unique name; also the output filename stem
    pub name: String,
    /// Description of the image
    pub prompt: String,
    /// Short subject line, used by style guides with a subject template
    pub subject: Option<String>,
    pub shape: OutputShape,
}

impl GenerationJob {
    pub fn new(name: &str, prompt: &str, shape: OutputShape) -> Self {
        Self {
            name: name.to_string(),
            prompt: prompt.to_string(),
            subject: None,
            shape,
        }
    }

    /// Where this job's asset lives under `output_dir`
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", self.name, OUTPUT_EXTENSION))
    }
}

#[derive(Debug, Deserialize)]
struct JobListFile {
    collection: CollectionHeader,
    #[serde(default)]
    style: Option<StyleGuide>,
    #[serde(default)]
    jobs: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
struct CollectionHeader {
    name: String,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JobEntry {
    name: String,
    prompt: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    aspect_ratio: Option<String>,
}

/// An ordered, validated list of generation jobs
#[derive(Debug, Clone)]
pub struct JobList {
    pub collection: String,
    /// Provider the collection was written for
    pub provider: Option<String>,
    /// Throttle between provider calls
    pub delay_ms: Option<u64>,
    pub style: Option<StyleGuide>,
    pub jobs: Vec<GenerationJob>,
}

impl JobList {
    /// Names of the collections compiled into the crate
    pub fn builtin_names() -> &'static [&'static str] {
        &["photo", "watercolor"]
    }

    /// Load a collection compiled into the crate
    pub fn builtin(name: &str) -> Result<Self> {
        let source = match name {
            "photo" => PHOTO_JOBS,
            "watercolor" => WATERCOLOR_JOBS,
            _ => {
                return Err(ElgaError::InvalidJobList(format!(
                    "unknown collection '{}'. Available: {}",
                    name,
                    Self::builtin_names().join(", ")
                )))
            }
        };
        Self::from_toml(source, name)
    }

    /// Load a job list from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Parse and validate a job list. `origin` names the source in errors.
    pub fn from_toml(source: &str, origin: &str) -> Result<Self> {
        let file: JobListFile = toml::from_str(source).map_err(|e| {
            ElgaError::InvalidJobList(format!("failed to parse {}: {}", origin, e))
        })?;

        if file.jobs.is_empty() {
            return Err(ElgaError::InvalidJobList(format!("{} defines no jobs", origin)));
        }

        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(file.jobs.len());
        for entry in file.jobs {
            validate_name(&entry.name)?;
            if !seen.insert(entry.name.clone()) {
                return Err(ElgaError::InvalidJobList(format!(
                    "duplicate job name '{}' in {}",
                    entry.name, origin
                )));
            }
            if entry.prompt.trim().is_empty() {
                return Err(ElgaError::InvalidJobList(format!(
                    "job '{}' has an empty prompt",
                    entry.name
                )));
            }

            let shape = match (entry.size.as_deref(), entry.aspect_ratio.as_deref()) {
                (Some(size), None) => OutputShape::parse_size(size)?,
                (None, Some(ratio)) => OutputShape::Aspect(ratio.parse()?),
                (Some(_), Some(_)) => {
                    return Err(ElgaError::InvalidJobList(format!(
                        "job '{}' sets both size and aspect_ratio",
                        entry.name
                    )))
                }
                (None, None) => {
                    return Err(ElgaError::InvalidJobList(format!(
                        "job '{}' needs a size or an aspect_ratio",
                        entry.name
                    )))
                }
            };

            jobs.push(GenerationJob {
                name: entry.name,
                prompt: entry.prompt,
                subject: entry.subject,
                shape,
            });
        }

        Ok(Self {
            collection: file.collection.name,
            provider: file.collection.provider,
            delay_ms: file.collection.delay_ms,
            style: file.style,
            jobs,
        })
    }

    /// Keep only the named jobs, in list order
    pub fn select(&self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self.clone());
        }
        for name in names {
            if !self.jobs.iter().any(|job| &job.name == name) {
                return Err(ElgaError::InvalidJobList(format!(
                    "no job named '{}' in collection '{}'",
                    name, self.collection
                )));
            }
        }
        let mut selected = self.clone();
        selected.jobs.retain(|job| names.contains(&job.name));
        Ok(selected)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Job names become filenames: lowercase ASCII letters, digits, `-`, `_`
fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ElgaError::InvalidJobList(format!(
            "job name '{}' must be non-empty and use only a-z, 0-9, '-' or '_'",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[collection]
name = "test"

[[jobs]]
name = "hero-one"
prompt = "a river"
size = "1536x1024"

[[jobs]]
name = "square_two"
prompt = "an offering"
subject = "canang sari"
aspect_ratio = "1:1"
"#;

    #[test]
    fn test_builtin_collections_load() {
        for name in JobList::builtin_names() {
            let list = JobList::builtin(name).unwrap();
            assert_eq!(&list.collection, name);
            assert_eq!(list.len(), 15);
        }
        let watercolor = JobList::builtin("watercolor").unwrap();
        assert_eq!(watercolor.provider.as_deref(), Some("imagen"));
        assert_eq!(watercolor.delay_ms, Some(3000));
        assert!(watercolor.style.is_some());
        assert!(watercolor.jobs.iter().all(|job| job.subject.is_some()));
    }

    #[test]
    fn test_unknown_builtin() {
        let err = JobList::builtin("oil").unwrap_err();
        assert!(err.to_string().contains("photo, watercolor"));
    }

    #[test]
    fn test_parse_minimal_list_keeps_order() {
        let list = JobList::from_toml(MINIMAL, "inline").unwrap();
        let names: Vec<&str> = list.jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["hero-one", "square_two"]);
        assert_eq!(
            list.jobs[0].shape,
            OutputShape::Size {
                width: 1536,
                height: 1024
            }
        );
        assert_eq!(list.jobs[1].shape, OutputShape::Aspect(AspectRatio::Square));
        assert_eq!(list.jobs[1].subject.as_deref(), Some("canang sari"));
        assert!(list.style.is_none());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let source = r#"
[collection]
name = "dup"

[[jobs]]
name = "same"
prompt = "a"
size = "1024x1024"

[[jobs]]
name = "same"
prompt = "b"
size = "1024x1024"
"#;
        let err = JobList::from_toml(source, "dup.toml").unwrap_err();
        assert!(err.to_string().contains("duplicate job name 'same'"));
    }

    #[test]
    fn test_rejects_unsafe_names_and_bad_shapes() {
        for (name, shape) in [
            ("../escape", "size = \"1024x1024\""),
            ("Upper", "size = \"1024x1024\""),
            ("ok", "size = \"1024by1024\""),
            ("ok", "aspect_ratio = \"2:1\""),
            ("ok", "size = \"0x1024\""),
        ] {
            let source = format!(
                "[collection]\nname = \"t\"\n\n[[jobs]]\nname = \"{}\"\nprompt = \"p\"\n{}\n",
                name, shape
            );
            assert!(
                JobList::from_toml(&source, "t").is_err(),
                "accepted {} / {}",
                name,
                shape
            );
        }
    }

    #[test]
    fn test_requires_exactly_one_shape() {
        let both = "[collection]\nname = \"t\"\n[[jobs]]\nname = \"a\"\nprompt = \"p\"\nsize = \"1024x1024\"\naspect_ratio = \"1:1\"\n";
        assert!(JobList::from_toml(both, "t").is_err());
        let neither = "[collection]\nname = \"t\"\n[[jobs]]\nname = \"a\"\nprompt = \"p\"\n";
        assert!(JobList::from_toml(neither, "t").is_err());
        let empty = "[collection]\nname = \"t\"\n";
        assert!(JobList::from_toml(empty, "t").is_err());
    }

    #[test]
    fn test_select_filters_in_list_order() {
        let list = JobList::from_toml(MINIMAL, "inline").unwrap();
        let selected = list
            .select(&["square_two".to_string(), "hero-one".to_string()])
            .unwrap();
        assert_eq!(selected.jobs[0].name, "hero-one");
        assert_eq!(selected.len(), 2);

        let only = list.select(&["square_two".to_string()]).unwrap();
        assert_eq!(only.len(), 1);

        assert!(list.select(&["nope".to_string()]).is_err());
        assert_eq!(list.select(&[]).unwrap().len(), 2);
    }

    #[test]
    fn test_output_path_from_name() {
        let job = GenerationJob::new("hero-bali-coast", "coast", OutputShape::Aspect(AspectRatio::Landscape16x9));
        assert_eq!(
            job.output_path(Path::new("public/images/generated")),
            PathBuf::from("public/images/generated/hero-bali-coast.png")
        );
    }

    #[test]
    fn test_shape_conversions() {
        assert_eq!(OutputShape::Aspect(AspectRatio::Landscape16x9).size_string(), "1536x1024");
        assert_eq!(OutputShape::Aspect(AspectRatio::Portrait9x16).dimensions(), (1024, 1536));
        assert_eq!(OutputShape::Aspect(AspectRatio::Square).size_string(), "1024x1024");

        let wide = OutputShape::parse_size("1536x1024").unwrap();
        assert_eq!(wide.aspect_ratio(), AspectRatio::Landscape4x3);
        assert_eq!(OutputShape::parse_size("1920x1080").unwrap().aspect_ratio(), AspectRatio::Landscape16x9);
        assert_eq!(OutputShape::parse_size("1024x1536").unwrap().aspect_ratio(), AspectRatio::Portrait3x4);
        assert_eq!(OutputShape::parse_size("512x512").unwrap().aspect_ratio(), AspectRatio::Square);
    }

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape16x9);
        assert_eq!(" 9:16 ".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait9x16);
        assert!("21:9".parse::<AspectRatio>().is_err());
    }
}
