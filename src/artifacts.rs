use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::features::{BASE_FEATURE_NAMES, FeatureVector};
use crate::gbm::GbmClassifier;

pub const ARTIFACT_VERSION: u32 = 1;
pub const DEFAULT_ARTIFACT_PATH: &str = "assets/injury_model_v1.json";
pub const MODEL_PATH_ENV: &str = "PHYSIO_MODEL_PATH";

static EMBEDDED_ARTIFACT: &str = include_str!("../assets/injury_model_v1.json");

/// Standardization transform fitted once at training time and reused
/// verbatim at inference. Never re-fit on live inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ArtifactMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub train_samples: usize,
    pub valid_samples: usize,
}

/// Versioned bundle of the three trained pieces the live app consumes:
/// ordered feature-name list, fitted scaler, boosted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryModelArtifact {
    pub version: u32,
    pub generated_at: String,
    #[serde(default)]
    pub source: Option<String>,
    pub feature_names: Vec<String>,
    pub scaler: ScalerArtifact,
    pub classifier: GbmClassifier,
    #[serde(default)]
    pub metrics: Option<ArtifactMetrics>,
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("read model artifact {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse model artifact {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("model artifact version {found} unsupported (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("model artifact has an empty feature list")]
    EmptyFeatureList,
    #[error("scaler shape mismatch: {features} features but {means} means / {stds} stds")]
    ScalerShape {
        features: usize,
        means: usize,
        stds: usize,
    },
    #[error("classifier has no trees")]
    EmptyEnsemble,
    #[error("tree {tree} is malformed for the {features}-feature schema")]
    TreeShape { tree: usize, features: usize },
    #[error("feature list is missing builder output {0:?}")]
    MissingBuilderKey(String),
}

/// Loaded, validated model bundle plus a content fingerprint for the
/// dashboard header and logs.
#[derive(Debug, Clone)]
pub struct RiskModel {
    artifact: InjuryModelArtifact,
    fingerprint: String,
}

impl RiskModel {
    /// Resolution order: env override, local assets file, embedded copy.
    /// A missing or corrupt artifact is fatal; there is no fallback
    /// scoring path.
    pub fn load() -> Result<Self, ModelLoadError> {
        if let Ok(path) = env::var(MODEL_PATH_ENV)
            && !path.trim().is_empty()
        {
            return Self::load_from_path(Path::new(path.trim()));
        }
        let default = Path::new(DEFAULT_ARTIFACT_PATH);
        if default.exists() {
            return Self::load_from_path(default);
        }
        Self::from_raw(EMBEDDED_ARTIFACT, "embedded")
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ModelLoadError> {
        let raw = fs::read_to_string(path).map_err(|source| ModelLoadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_raw(&raw, &path.display().to_string())
    }

    pub fn from_raw(raw: &str, origin: &str) -> Result<Self, ModelLoadError> {
        let artifact: InjuryModelArtifact =
            serde_json::from_str(raw).map_err(|source| ModelLoadError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        let fingerprint = fingerprint_bytes(raw.as_bytes());
        Self::from_artifact(artifact, fingerprint)
    }

    pub fn from_artifact(
        artifact: InjuryModelArtifact,
        fingerprint: String,
    ) -> Result<Self, ModelLoadError> {
        validate(&artifact)?;
        Ok(Self {
            artifact,
            fingerprint,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.artifact.feature_names
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn metrics(&self) -> Option<ArtifactMetrics> {
        self.artifact.metrics
    }

    pub fn generated_at(&self) -> &str {
        &self.artifact.generated_at
    }

    /// Positive-class probability for a feature vector built against this
    /// model's schema. Pure: standardize with the fitted parameters, then
    /// run the ensemble.
    pub fn predict_proba(&self, features: &FeatureVector) -> f64 {
        debug_assert_eq!(features.len(), self.artifact.feature_names.len());
        let standardized: Vec<f64> = features
            .values()
            .iter()
            .enumerate()
            .map(|(idx, &raw)| self.standardized(raw, idx))
            .collect();
        self.artifact.classifier.predict_proba(&standardized)
    }

    fn standardized(&self, raw: f64, idx: usize) -> f64 {
        let mean = self.artifact.scaler.means.get(idx).copied().unwrap_or(0.0);
        let std = self
            .artifact
            .scaler
            .stds
            .get(idx)
            .copied()
            .unwrap_or(1.0)
            .max(1e-6);
        (raw - mean) / std
    }
}

fn validate(artifact: &InjuryModelArtifact) -> Result<(), ModelLoadError> {
    if artifact.version != ARTIFACT_VERSION {
        return Err(ModelLoadError::Version {
            found: artifact.version,
            expected: ARTIFACT_VERSION,
        });
    }
    let n_features = artifact.feature_names.len();
    if n_features == 0 {
        return Err(ModelLoadError::EmptyFeatureList);
    }
    if artifact.scaler.means.len() != n_features || artifact.scaler.stds.len() != n_features {
        return Err(ModelLoadError::ScalerShape {
            features: n_features,
            means: artifact.scaler.means.len(),
            stds: artifact.scaler.stds.len(),
        });
    }
    if artifact.classifier.trees.is_empty() {
        return Err(ModelLoadError::EmptyEnsemble);
    }
    if let Err((tree, _issue)) = artifact.classifier.validate(n_features) {
        return Err(ModelLoadError::TreeShape {
            tree,
            features: n_features,
        });
    }
    // The builder zero-fills names it cannot produce, but a schema that
    // lacks one of the builder's own keys means the artifact was trained
    // against a different contract.
    for key in BASE_FEATURE_NAMES {
        if !artifact.feature_names.iter().any(|name| name.as_str() == key) {
            return Err(ModelLoadError::MissingBuilderKey(key.to_string()));
        }
    }
    Ok(())
}

fn fingerprint_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex.truncate(12);
    hex
}
