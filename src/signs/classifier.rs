//! Sign label classifier: a bagged ensemble of smartcore decision trees over
//! the 63 flattened landmark coordinates. Each tree is fitted on its own
//! synthetic sample set, jittered around the reference templates at startup.

use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smartcore::error::Failed;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};

use crate::signs::templates::TemplateRegistry;
use crate::signs::types::HandPose;

type Tree = DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("decision tree failure: {0}")]
    Model(#[from] Failed),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    pub trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub samples_per_sign: usize,
    /// Uniform per-coordinate noise half-width for synthetic samples.
    pub jitter: f64,
    pub seed: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            trees: 50,
            max_depth: 12,
            min_samples_split: 2,
            samples_per_sign: 40,
            jitter: 0.02,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub predicted_sign: String,
    pub confidence: f64,
    pub all_predictions: BTreeMap<String, f64>,
}

pub struct SignClassifier {
    labels: Vec<String>,
    trees: Vec<Tree>,
}

impl fmt::Debug for SignClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignClassifier")
            .field("labels", &self.labels)
            .field("trees", &self.trees.len())
            .finish()
    }
}

impl SignClassifier {
    pub fn train(
        registry: &TemplateRegistry,
        config: &ClassifierConfig,
    ) -> Result<Self, ClassifierError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let labels = registry.labels();
        let params = DecisionTreeClassifierParameters::default()
            .with_criterion(SplitCriterion::Gini)
            .with_max_depth(u16::try_from(config.max_depth).unwrap_or(u16::MAX))
            .with_min_samples_split(config.min_samples_split.max(2));

        let mut trees = Vec::with_capacity(config.trees.max(1));
        for _ in 0..config.trees.max(1) {
            let (features, classes) = synthesize(registry, config, &mut rng);
            let x = DenseMatrix::from_2d_vec(&features);
            trees.push(Tree::fit(&x, &classes, params.clone())?);
        }

        tracing::info!(
            signs = labels.len(),
            samples_per_tree = labels.len() * config.samples_per_sign.max(1),
            trees = trees.len(),
            "Sign classifier trained"
        );

        Ok(Self { labels, trees })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Vote share per label across trees; ties go to the first label in id order.
    pub fn predict(&self, pose: &HandPose) -> Result<Prediction, ClassifierError> {
        let x = DenseMatrix::from_2d_vec(&vec![pose.flatten()]);
        let mut votes = vec![0.0; self.labels.len()];
        for tree in &self.trees {
            for class in tree.predict(&x)? {
                if let Some(v) = votes.get_mut(class as usize) {
                    *v += 1.0;
                }
            }
        }
        let n = self.trees.len().max(1) as f64;
        votes.iter_mut().for_each(|v| *v /= n);

        let mut best = 0;
        for (i, v) in votes.iter().enumerate() {
            if *v > votes[best] {
                best = i;
            }
        }

        Ok(Prediction {
            predicted_sign: self.labels.get(best).cloned().unwrap_or_default(),
            confidence: votes.get(best).copied().unwrap_or(0.0),
            all_predictions: self.labels.iter().cloned().zip(votes).collect(),
        })
    }
}

fn synthesize(
    registry: &TemplateRegistry,
    config: &ClassifierConfig,
    rng: &mut StdRng,
) -> (Vec<Vec<f64>>, Vec<u32>) {
    let mut features = Vec::new();
    let mut classes = Vec::new();
    let jitter = config.jitter.abs();

    for (class, template) in (0u32..).zip(registry.iter()) {
        let base = template.pose.flatten();
        for _ in 0..config.samples_per_sign.max(1) {
            // 整体平移模拟手在画面中的位置变化，再叠加逐点噪声
            let shift = [
                rng.gen_range(-2.0 * jitter..=2.0 * jitter),
                rng.gen_range(-2.0 * jitter..=2.0 * jitter),
            ];
            let sample: Vec<f64> = base
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let offset = if i % 3 < 2 { shift[i % 3] } else { 0.0 };
                    v + offset + rng.gen_range(-jitter..=jitter)
                })
                .collect();
            features.push(sample);
            classes.push(class);
        }
    }

    (features, classes)
}
