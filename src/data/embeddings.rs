use crate::StsError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// # Pretrained word vectors
///
/// Maps words to dense vectors of a common dimension `N`, typically read from a
/// GloVe text file (`word v1 v2 ... vN` on each line).
#[derive(Debug, Clone)]
pub struct WordEmbeddings {
    vectors: HashMap<String, Vec<f32>>,
    dim: i64,
}

impl WordEmbeddings {
    /// Creates word embeddings from an in-memory map. All vectors must have length `dim`.
    pub fn new(vectors: HashMap<String, Vec<f32>>, dim: i64) -> Result<WordEmbeddings, StsError> {
        if let Some((word, vector)) = vectors.iter().find(|(_, v)| v.len() as i64 != dim) {
            return Err(StsError::ValueError(format!(
                "Vector for {:?} has dimension {}, expected {}",
                word,
                vector.len(),
                dim
            )));
        }
        Ok(WordEmbeddings { vectors, dim })
    }

    /// Reads a GloVe-formatted text file. The dimension is taken from the first line.
    pub fn from_glove<P: AsRef<Path>>(path: P) -> Result<WordEmbeddings, StsError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut vectors = HashMap::new();
        let mut dim: Option<usize> = None;
        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.trim_end().split(' ');
            let word = match fields.next() {
                Some(word) if !word.is_empty() => word.to_string(),
                _ => continue,
            };
            let vector = fields
                .map(|value| value.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| {
                    StsError::DatasetError(format!(
                        "Invalid vector component on line {}: {}",
                        line_number + 1,
                        e
                    ))
                })?;
            match dim {
                None => dim = Some(vector.len()),
                Some(expected) if expected != vector.len() => {
                    return Err(StsError::DatasetError(format!(
                        "Line {} has dimension {}, expected {}",
                        line_number + 1,
                        vector.len(),
                        expected
                    )));
                }
                _ => {}
            }
            vectors.insert(word, vector);
        }
        let dim = dim.ok_or_else(|| {
            StsError::DatasetError(format!(
                "No word vectors found in {}",
                path.as_ref().display()
            ))
        })?;
        tracing::info!(
            "Loaded {} word vectors of dimension {} from {}",
            vectors.len(),
            dim,
            path.as_ref().display()
        );
        Ok(WordEmbeddings {
            vectors,
            dim: dim as i64,
        })
    }

    /// Vector dimension `N`
    pub fn dim(&self) -> i64 {
        self.dim
    }

    /// Looks up a word, falling back to its lower-cased form.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors
            .get(word)
            .or_else(|| self.vectors.get(&word.to_lowercase()))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
