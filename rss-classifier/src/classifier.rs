use crate::traits::TitleClassifier;
use crate::types::{ClassifierError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Row normalization applied to the feature vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    #[default]
    L2,
}

/// Fitted text vectorizer state, as exported from the training side.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorizerArtifact {
    pub vocabulary: HashMap<String, usize>,
    /// Per-column inverse document frequency. Absent means raw term counts.
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

/// Fitted linear model: one weight row per class, or a single row when
/// there are exactly two classes.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// Word tokens: runs of alphanumerics or `_` at least two characters long.
pub fn tokenize(text: &str, lowercase: bool) -> Vec<String> {
    let text = if lowercase {
        text.to_lowercase()
    } else {
        text.to_string()
    };

    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Expand tokens into space-joined word n-grams for every n in `range`.
pub fn ngrams(tokens: &[String], (min_n, max_n): (usize, usize)) -> Vec<String> {
    let mut grams = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        grams.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    grams
}

/// Sparse TF-IDF vectorizer over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    artifact: VectorizerArtifact,
}

impl TfidfVectorizer {
    pub fn new(artifact: VectorizerArtifact) -> std::result::Result<Self, ClassifierError> {
        let size = artifact.vocabulary.len();
        if let Some((term, &column)) = artifact.vocabulary.iter().find(|(_, &c)| c >= size) {
            return Err(ClassifierError::Shape(format!(
                "vocabulary term {:?} maps to column {} but there are only {} columns",
                term, column, size
            )));
        }
        if let Some(idf) = &artifact.idf {
            if idf.len() != size {
                return Err(ClassifierError::Shape(format!(
                    "idf has {} weights for a vocabulary of {}",
                    idf.len(),
                    size
                )));
            }
        }
        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ClassifierError::Shape(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }
        Ok(Self { artifact })
    }

    pub fn dimension(&self) -> usize {
        self.artifact.vocabulary.len()
    }

    /// Sparse `(column, weight)` pairs sorted by column.
    pub fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let tokens = tokenize(text, self.artifact.lowercase);

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for gram in ngrams(&tokens, self.artifact.ngram_range) {
            if let Some(&column) = self.artifact.vocabulary.get(&gram) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut features: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, count)| {
                let tf = if self.artifact.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                let idf = self
                    .artifact
                    .idf
                    .as_ref()
                    .map_or(1.0, |weights| weights[column]);
                (column, tf * idf)
            })
            .collect();
        features.sort_by_key(|&(column, _)| column);

        let norm = match self.artifact.norm {
            Some(Norm::L2) => features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => features.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if norm > 0.0 {
            for (_, value) in features.iter_mut() {
                *value /= norm;
            }
        }

        features
    }
}

/// Linear decision function over a sparse feature vector.
#[derive(Debug, Clone)]
pub struct LinearModel {
    artifact: ModelArtifact,
}

impl LinearModel {
    pub fn new(artifact: ModelArtifact, dimension: usize) -> std::result::Result<Self, ClassifierError> {
        let classes = artifact.classes.len();
        if classes == 0 {
            return Err(ClassifierError::NoLabels);
        }

        let rows = artifact.coef.len();
        let binary = rows == 1 && classes == 2;
        if rows != classes && !binary {
            return Err(ClassifierError::Shape(format!(
                "{} coefficient rows for {} classes",
                rows, classes
            )));
        }
        if artifact.intercept.len() != rows {
            return Err(ClassifierError::Shape(format!(
                "{} intercepts for {} coefficient rows",
                artifact.intercept.len(),
                rows
            )));
        }
        if let Some(row) = artifact.coef.iter().find(|row| row.len() != dimension) {
            return Err(ClassifierError::Shape(format!(
                "coefficient row has {} weights, vectorizer produces {}",
                row.len(),
                dimension
            )));
        }

        Ok(Self { artifact })
    }

    pub fn classes(&self) -> &[String] {
        &self.artifact.classes
    }

    pub fn decision_function(&self, features: &[(usize, f64)]) -> Vec<f64> {
        self.artifact
            .coef
            .iter()
            .zip(&self.artifact.intercept)
            .map(|(row, intercept)| {
                features
                    .iter()
                    .map(|&(column, value)| row[column] * value)
                    .sum::<f64>()
                    + intercept
            })
            .collect()
    }

    pub fn predict(&self, features: &[(usize, f64)]) -> &str {
        let scores = self.decision_function(features);
        let classes = &self.artifact.classes;

        if scores.len() == 1 && classes.len() == 2 {
            let index = if scores[0] > 0.0 { 1 } else { 0 };
            return &classes[index];
        }

        // First maximum wins so ties resolve the same way every call.
        let mut best = 0;
        for (index, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = index;
            }
        }
        &classes[best]
    }
}

/// Vectorizer + linear model pair loaded once at startup.
#[derive(Debug, Clone)]
pub struct LinearTextClassifier {
    vectorizer: TfidfVectorizer,
    model: LinearModel,
}

impl LinearTextClassifier {
    pub fn from_artifacts(
        vectorizer: VectorizerArtifact,
        model: ModelArtifact,
    ) -> std::result::Result<Self, ClassifierError> {
        let vectorizer = TfidfVectorizer::new(vectorizer)?;
        let model = LinearModel::new(model, vectorizer.dimension())?;
        Ok(Self { vectorizer, model })
    }

    pub fn load(
        vectorizer_path: impl AsRef<Path>,
        model_path: impl AsRef<Path>,
    ) -> std::result::Result<Self, ClassifierError> {
        let vectorizer: VectorizerArtifact = read_artifact(vectorizer_path.as_ref())?;
        let model: ModelArtifact = read_artifact(model_path.as_ref())?;
        let classifier = Self::from_artifacts(vectorizer, model)?;

        info!(
            "Loaded classifier: {} features, labels {:?}",
            classifier.vectorizer.dimension(),
            classifier.model.classes()
        );
        Ok(classifier)
    }
}

impl TitleClassifier for LinearTextClassifier {
    fn classify(&self, title: &str) -> Result<String> {
        let features = self.vectorizer.transform(title);
        let label = self.model.predict(&features);
        debug!("Classified {:?} as {} ({} features)", title, label, features.len());
        Ok(label.to_string())
    }

    fn labels(&self) -> &[String] {
        self.model.classes()
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> std::result::Result<T, ClassifierError> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| ClassifierError::ArtifactIo {
        path: display.clone(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ClassifierError::ArtifactFormat {
        path: display,
        source,
    })
}
