//! Style guides for enriching generation prompts
//!
//! A style guide gives a whole collection one visual vocabulary: a shared
//! prompt prefix, a palette, things to avoid, and a template that turns a
//! job's subject into a closing instruction.

use elga_core::{ElgaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::job::GenerationJob;

/// A style guide that enriches generation prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleGuide {
    /// Style name (e.g., "sacred_waters")
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Prepended to every prompt
    #[serde(default)]
    pub prompt_prefix: Option<String>,
    /// Appended to every prompt
    #[serde(default)]
    pub prompt_suffix: Option<String>,
    /// Colour names or hex strings
    #[serde(default)]
    pub palette: Vec<String>,
    /// Things the image must not contain
    #[serde(default)]
    pub avoid: Vec<String>,
    /// Closing line with a `{subject}` placeholder
    #[serde(default)]
    pub subject_template: Option<String>,
}

/// TOML file wrapper
#[derive(Debug, Deserialize)]
struct StyleFile {
    style: StyleGuide,
}

impl StyleGuide {
    /// Load a style guide from a TOML file with a `[style]` table
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: StyleFile = toml::from_str(&content).map_err(|e| {
            ElgaError::ConfigError(format!(
                "Failed to parse style guide {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(file.style)
    }

    /// Build the full prompt for a job
    pub fn enrich_prompt(&self, job: &GenerationJob) -> String {
        let mut parts = Vec::new();

        if let Some(ref prefix) = self.prompt_prefix {
            parts.push(prefix.trim().to_string());
        }

        parts.push(job.prompt.trim().to_string());

        if !self.palette.is_empty() {
            parts.push(format!("Color palette: {}.", self.palette.join(", ")));
        }

        if !self.avoid.is_empty() {
            parts.push(format!("Do not use: {}.", self.avoid.join(", ")));
        }

        if let (Some(template), Some(subject)) = (&self.subject_template, &job.subject) {
            parts.push(template.replace("{subject}", subject.trim()));
        }

        if let Some(ref suffix) = self.prompt_suffix {
            parts.push(suffix.trim().to_string());
        }

        parts.retain(|p| !p.is_empty());
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{AspectRatio, OutputShape};
    use std::io::Write;

    fn watercolor() -> StyleGuide {
        StyleGuide {
            name: "sacred_waters".to_string(),
            description: None,
            prompt_prefix: Some("Fine art watercolor.".to_string()),
            prompt_suffix: None,
            palette: vec!["pale teal".to_string(), "sage green".to_string()],
            avoid: vec!["yellow".to_string()],
            subject_template: Some("Generate a watercolor painting of: {subject}".to_string()),
        }
    }

    #[test]
    fn test_enrich_prompt_order() {
        let mut job = GenerationJob::new(
            "restored-river",
            "  Clear water over stones.  ",
            OutputShape::Aspect(AspectRatio::Landscape16x9),
        );
        job.subject = Some("River through jungle".to_string());

        let prompt = watercolor().enrich_prompt(&job);
        assert_eq!(
            prompt,
            "Fine art watercolor.\n\nClear water over stones.\n\nColor palette: pale teal, sage green.\n\nDo not use: yellow.\n\nGenerate a watercolor painting of: River through jungle"
        );
    }

    #[test]
    fn test_subject_template_needs_subject() {
        let job = GenerationJob::new("a", "A beach.", OutputShape::Aspect(AspectRatio::Square));
        let prompt = watercolor().enrich_prompt(&job);
        assert!(!prompt.contains("{subject}"));
        assert!(!prompt.contains("Generate a watercolor"));
    }

    #[test]
    fn test_load_style_file() {
        let dir = std::env::temp_dir().join(format!("elga_style_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bold.style.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(
            br##"
[style]
name = "bold"
prompt_suffix = "High contrast."
palette = ["#102030"]
"##,
        )
        .unwrap();

        let style = StyleGuide::load(&path).unwrap();
        assert_eq!(style.name, "bold");
        assert!(style.avoid.is_empty());

        let job = GenerationJob::new("x", "A temple.", OutputShape::Aspect(AspectRatio::Square));
        assert_eq!(
            style.enrich_prompt(&job),
            "A temple.\n\nColor palette: #102030.\n\nHigh contrast."
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
