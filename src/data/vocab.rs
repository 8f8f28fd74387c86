use crate::common::Config;
use crate::data::embeddings::WordEmbeddings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tch::{Kind, Tensor};

pub const PAD_TOKEN: &str = "_PAD_";
pub const OOV_TOKEN: &str = "_OOV_";
pub const PAD_INDEX: i64 = 0;
pub const OOV_INDEX: i64 = 1;

/// Range of the uniform distribution used for words without a pretrained vector.
const RANDOM_INIT_RANGE: f64 = 0.25;

/// # Token vocabulary
///
/// Maps tokens to the rows of the trainable embedding matrix. Index 0 is reserved
/// for padding and index 1 for out-of-vocabulary tokens, the remaining tokens are
/// sorted alphabetically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    words: Vec<String>,
    word_idx: HashMap<String, i64>,
    icase: bool,
}

impl Config for Vocabulary {}

/// Padded token indices, fixed vectors and masks of a list of sentences.
#[derive(Debug)]
pub struct VectorizedSentences {
    /// Vocabulary indices, `[n, spad]` (`Int64`)
    pub ids: Tensor,
    /// Pretrained vectors of tokens left out of the vocabulary, `[n, spad, N]`
    pub fixed: Tensor,
    /// 1 for real tokens and 0 for padding, `[n, spad]`
    pub mask: Tensor,
}

impl Vocabulary {
    /// Builds a vocabulary from tokenized sentences.
    ///
    /// # Arguments
    ///
    /// * `sentences` - tokenized sentences to collect tokens from
    /// * `prune_n` - if set, only the `prune_n` most frequent tokens are kept (ties broken alphabetically)
    /// * `icase` - lower-case tokens before indexing
    pub fn new<'a, I, S>(sentences: I, prune_n: Option<usize>, icase: bool) -> Vocabulary
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<[String]> + 'a + ?Sized,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for sentence in sentences {
            for token in sentence.as_ref() {
                *counts.entry(normalize(token, icase)).or_insert(0) += 1;
            }
        }
        let mut by_frequency: Vec<(String, usize)> = counts.into_iter().collect();
        by_frequency.sort_by(|(word_a, count_a), (word_b, count_b)| {
            count_b.cmp(count_a).then_with(|| word_a.cmp(word_b))
        });
        if let Some(prune_n) = prune_n {
            by_frequency.truncate(prune_n);
        }
        let mut kept: Vec<String> = by_frequency.into_iter().map(|(word, _)| word).collect();
        kept.sort();

        let mut words = vec![PAD_TOKEN.to_string(), OOV_TOKEN.to_string()];
        words.extend(kept);
        let word_idx = words
            .iter()
            .enumerate()
            .map(|(index, word)| (word.clone(), index as i64))
            .collect();
        Vocabulary {
            words,
            word_idx,
            icase,
        }
    }

    /// Number of rows of the embedding matrix, including padding and OOV.
    pub fn size(&self) -> i64 {
        self.words.len() as i64
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Index of a token, [`OOV_INDEX`] for unknown tokens.
    pub fn get(&self, token: &str) -> i64 {
        *self
            .word_idx
            .get(&normalize(token, self.icase))
            .unwrap_or(&OOV_INDEX)
    }

    /// Converts sentences to padded index tensors.
    ///
    /// Sentences longer than `spad` are truncated. Tokens outside of the
    /// vocabulary map to [`OOV_INDEX`] and, when `emb` knows them, carry their
    /// pretrained vector in the `fixed` tensor (zero elsewhere).
    pub fn vectorize(
        &self,
        sentences: &[Vec<String>],
        emb: &WordEmbeddings,
        spad: usize,
    ) -> VectorizedSentences {
        let dim = emb.dim() as usize;
        let n = sentences.len();
        let mut ids = vec![PAD_INDEX; n * spad];
        let mut fixed = vec![0f32; n * spad * dim];
        let mut mask = vec![0f32; n * spad];
        for (row, sentence) in sentences.iter().enumerate() {
            for (position, token) in sentence.iter().take(spad).enumerate() {
                let offset = row * spad + position;
                let index = self.get(token);
                ids[offset] = index;
                mask[offset] = 1.0;
                if index == OOV_INDEX {
                    if let Some(vector) = emb.get(token) {
                        fixed[offset * dim..(offset + 1) * dim].copy_from_slice(vector);
                    }
                }
            }
        }
        let (n, spad, dim) = (n as i64, spad as i64, dim as i64);
        VectorizedSentences {
            ids: Tensor::of_slice(&ids).view(&[n, spad][..]),
            fixed: Tensor::of_slice(&fixed)
                .to_kind(Kind::Float)
                .view(&[n, spad, dim][..]),
            mask: Tensor::of_slice(&mask)
                .to_kind(Kind::Float)
                .view(&[n, spad][..]),
        }
    }

    /// Initial embedding matrix `[size, N]`.
    ///
    /// Rows hold the pretrained vectors where available, uniform random values in
    /// `[-0.25, 0.25)` otherwise. The padding row is zero.
    pub fn embmatrix(&self, emb: &WordEmbeddings) -> Tensor {
        let dim = emb.dim();
        let random = Tensor::zeros(&[self.size(), dim], (Kind::Float, tch::Device::Cpu))
            .uniform_(-RANDOM_INIT_RANGE, RANDOM_INIT_RANGE);
        let mut values = Vec::<f32>::from(&random.view(&[-1][..]));
        let dim = dim as usize;
        values[..dim].iter_mut().for_each(|v| *v = 0.0);
        for (index, word) in self.words.iter().enumerate().skip(OOV_INDEX as usize + 1) {
            if let Some(vector) = emb.get(word) {
                values[index * dim..(index + 1) * dim].copy_from_slice(vector);
            }
        }
        Tensor::of_slice(&values).view(&[self.size(), dim as i64][..])
    }
}

fn normalize(token: &str, icase: bool) -> String {
    if icase {
        token.to_lowercase()
    } else {
        token.to_string()
    }
}
