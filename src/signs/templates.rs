use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::PASS_THRESHOLD;
use crate::signs::shapes::{Curl, HandShape, ThumbPose};
use crate::signs::types::{Difficulty, Finger, HandPose, RawLandmark, SignInfo};
use crate::signs::validate::ValidationError;
use crate::signs::SignError;

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTemplate {
    pub info: SignInfo,
    pub pose: HandPose,
    /// Overrides [`PASS_THRESHOLD`] for this sign when set.
    pub pass_threshold: Option<f64>,
}

impl ReferenceTemplate {
    pub fn effective_threshold(&self) -> f64 {
        self.pass_threshold.unwrap_or(PASS_THRESHOLD)
    }
}

#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("template `{id}` is invalid: {source}")]
    InvalidPose {
        id: String,
        #[source]
        source: ValidationError,
    },
    #[error("template `{0}` has an out-of-range pass threshold")]
    InvalidThreshold(String),
    #[error("duplicate template id: {0}")]
    Duplicate(String),
    #[error("template file contains no signs")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct TemplateFileEntry {
    id: String,
    display_name: String,
    difficulty: Difficulty,
    #[serde(default)]
    pass_threshold: Option<f64>,
    landmarks: Vec<RawLandmark>,
}

/// Immutable set of reference poses, keyed by upper-cased sign id.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, ReferenceTemplate>,
}

impl TemplateRegistry {
    pub fn new(templates: Vec<ReferenceTemplate>) -> Result<Self, TemplateLoadError> {
        if templates.is_empty() {
            return Err(TemplateLoadError::Empty);
        }
        let mut map = BTreeMap::new();
        for tpl in templates {
            if let Some(t) = tpl.pass_threshold {
                if !(0.0..=100.0).contains(&t) {
                    return Err(TemplateLoadError::InvalidThreshold(tpl.info.id));
                }
            }
            let key = tpl.info.id.to_ascii_uppercase();
            if map.contains_key(&key) {
                return Err(TemplateLoadError::Duplicate(tpl.info.id));
            }
            map.insert(key, tpl);
        }
        Ok(Self { templates: map })
    }

    pub fn builtin() -> Self {
        let templates = builtin_signs()
            .into_iter()
            .map(|(id, display_name, difficulty, shape)| ReferenceTemplate {
                info: SignInfo {
                    id: id.to_string(),
                    display_name: display_name.to_string(),
                    difficulty,
                },
                pose: shape.build(),
                pass_threshold: None,
            })
            .collect();
        Self {
            templates: templates_by_id(templates),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TemplateLoadError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TemplateLoadError> {
        let entries: Vec<TemplateFileEntry> = serde_json::from_str(raw)?;
        let mut templates = Vec::with_capacity(entries.len());
        for entry in entries {
            let pose = HandPose::from_raw(&entry.landmarks).map_err(|source| {
                TemplateLoadError::InvalidPose {
                    id: entry.id.clone(),
                    source,
                }
            })?;
            templates.push(ReferenceTemplate {
                info: SignInfo {
                    id: entry.id,
                    display_name: entry.display_name,
                    difficulty: entry.difficulty,
                },
                pose,
                pass_threshold: entry.pass_threshold,
            });
        }
        Self::new(templates)
    }

    pub fn get(&self, id: &str) -> Result<&ReferenceTemplate, SignError> {
        self.templates
            .get(&id.trim().to_ascii_uppercase())
            .ok_or_else(|| SignError::UnknownSymbol(id.to_string()))
    }

    pub fn catalog(&self) -> Vec<SignInfo> {
        self.templates.values().map(|t| t.info.clone()).collect()
    }

    /// Sign ids in stable order.
    pub fn labels(&self) -> Vec<String> {
        self.templates.values().map(|t| t.info.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn templates_by_id(templates: Vec<ReferenceTemplate>) -> BTreeMap<String, ReferenceTemplate> {
    templates
        .into_iter()
        .map(|t| (t.info.id.to_ascii_uppercase(), t))
        .collect()
}

fn builtin_signs() -> Vec<(&'static str, &'static str, Difficulty, HandShape)> {
    use Curl::*;
    use Finger::*;

    vec![
        ("A", "Letter A", Difficulty::Easy, HandShape::fist(ThumbPose::Up)),
        (
            "B",
            "Letter B",
            Difficulty::Easy,
            HandShape::open(ThumbPose::Across).spread(0.3),
        ),
        (
            "C",
            "Letter C",
            Difficulty::Medium,
            HandShape::open(ThumbPose::Curved)
                .with(Index, Hooked)
                .with(Middle, Hooked)
                .with(Ring, Hooked)
                .with(Pinky, Hooked)
                .spread(0.4),
        ),
        (
            "D",
            "Letter D",
            Difficulty::Medium,
            HandShape::fist(ThumbPose::Across).with(Index, Straight),
        ),
        (
            "I",
            "Letter I",
            Difficulty::Easy,
            HandShape::fist(ThumbPose::Across).with(Pinky, Straight),
        ),
        (
            "L",
            "Letter L",
            Difficulty::Easy,
            HandShape::fist(ThumbPose::Out).with(Index, Straight),
        ),
        (
            "V",
            "Letter V",
            Difficulty::Easy,
            HandShape::fist(ThumbPose::Across)
                .with(Index, Straight)
                .with(Middle, Straight)
                .spread(2.0),
        ),
        (
            "W",
            "Letter W",
            Difficulty::Medium,
            HandShape::fist(ThumbPose::Across)
                .with(Index, Straight)
                .with(Middle, Straight)
                .with(Ring, Straight)
                .spread(1.8),
        ),
        (
            "Y",
            "Letter Y",
            Difficulty::Medium,
            HandShape::fist(ThumbPose::Out)
                .with(Pinky, Straight)
                .spread(1.5),
        ),
        (
            "HELLO",
            "Hello",
            Difficulty::Easy,
            HandShape::open(ThumbPose::Out).spread(1.4),
        ),
        (
            "LOVE",
            "I Love You",
            Difficulty::Hard,
            HandShape::fist(ThumbPose::Out)
                .with(Index, Straight)
                .with(Pinky, Straight)
                .spread(1.3),
        ),
    ]
}
