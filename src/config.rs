// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Chart arrangement, which also selects the post-processing preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Four horizontal bar charts, 15-char labels, no outlier filter.
    #[default]
    Classic,
    /// Pie, bar, scatter and line cells, 3-char labels, z-score filter.
    Mixed,
}

/// How a respondent's language field is tested against the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Whole field equals the target.
    #[default]
    Exact,
    /// Any `;`-separated token equals the target.
    Token,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub country: String,
    pub languages: String,
    pub response_id: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            country: "Country".into(),
            languages: "LanguageHaveWorkedWith".into(),
            response_id: "ResponseId".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessConfig {
    /// Characters kept in the display label.
    pub label_length: usize,
    /// Decimal places kept after coercion.
    pub precision: u32,
    /// Keep only records with `|z| < outlier_z`; `None` disables the filter.
    pub outlier_z: Option<f64>,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self::for_layout(Layout::Classic)
    }
}

impl PostprocessConfig {
    pub fn for_layout(layout: Layout) -> Self {
        match layout {
            Layout::Classic => Self {
                label_length: 15,
                precision: 2,
                outlier_z: None,
            },
            Layout::Mixed => Self {
                label_length: 3,
                precision: 2,
                outlier_z: Some(3.0),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub layout: Layout,
    /// Size of the slice of the first chunk shown in the mixed pie.
    pub pie_top_n: usize,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Classic,
            pie_top_n: 7,
            width: 1600,
            height: 1200,
        }
    }
}

/// Everything one run needs. Every field has a default equal to the
/// behaviour of the classic survey script, so an empty YAML file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub schema_path: PathBuf,
    pub survey_path: PathBuf,
    pub output_path: PathBuf,
    /// Optional `.json` / `.parquet` dump of the final records.
    pub export_path: Option<PathBuf>,
    pub columns: ColumnNames,
    /// Cell values read as null.
    pub null_values: Vec<String>,
    pub target_language: String,
    pub match_mode: MatchMode,
    pub drop_duplicates: bool,
    pub postprocess: PostprocessConfig,
    pub render: RenderConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("RequiredData/Project1/survey_results_schema.csv"),
            survey_path: PathBuf::from("RequiredData/Project1/survey_results_public.csv"),
            output_path: PathBuf::from("Project1.png"),
            export_path: None,
            columns: ColumnNames::default(),
            null_values: ["NA", "NAN", "Na", "NaN"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            target_language: "Python".into(),
            match_mode: MatchMode::Exact,
            drop_duplicates: true,
            postprocess: PostprocessConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Defaults with the post-processing and layout preset of `layout`.
    pub fn preset(layout: Layout) -> Self {
        let mut cfg = Self::default();
        cfg.apply_layout(layout);
        cfg
    }

    /// Switch layout and the post-processing preset that goes with it.
    pub fn apply_layout(&mut self, layout: Layout) {
        self.postprocess = PostprocessConfig::for_layout(layout);
        self.render.layout = layout;
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing analysis config")
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_classic_defaults() -> Result<()> {
        let cfg = AnalysisConfig::from_yaml_str("{}")?;
        assert_eq!(cfg, AnalysisConfig::default());
        assert_eq!(cfg.target_language, "Python");
        assert_eq!(cfg.postprocess.label_length, 15);
        assert!(cfg.postprocess.outlier_z.is_none());
        Ok(())
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() -> Result<()> {
        let cfg = AnalysisConfig::from_yaml_str(
            r#"
target_language: Rust
match_mode: token
postprocess:
  label_length: 8
render:
  layout: mixed
"#,
        )?;
        assert_eq!(cfg.target_language, "Rust");
        assert_eq!(cfg.match_mode, MatchMode::Token);
        assert_eq!(cfg.postprocess.label_length, 8);
        assert_eq!(cfg.postprocess.precision, 2);
        assert_eq!(cfg.render.layout, Layout::Mixed);
        assert_eq!(cfg.render.pie_top_n, 7);
        assert_eq!(cfg.columns.country, "Country");
        Ok(())
    }

    #[test]
    fn mixed_preset() {
        let cfg = AnalysisConfig::preset(Layout::Mixed);
        assert_eq!(cfg.postprocess.label_length, 3);
        assert_eq!(cfg.postprocess.outlier_z, Some(3.0));
        assert_eq!(cfg.render.layout, Layout::Mixed);
    }

    #[test]
    fn unknown_layout_is_rejected() {
        assert!(AnalysisConfig::from_yaml_str("render:\n  layout: radar\n").is_err());
    }
}
