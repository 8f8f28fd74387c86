//! Word tokenization and per-token sentence pair flags.

use tch::{Kind, Tensor};

/// Number of per-token flags produced by [`sentence_flags`].
pub const FLAGS_DIM: i64 = 2;

const CLITICS: [&str; 7] = ["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '“' | '”' | '‘' | '’' | '…' | '–' | '—')
}

fn split_clitic(word: &str) -> (&str, Option<&str>) {
    let lowered = word.to_lowercase();
    for clitic in CLITICS.iter() {
        if lowered.len() > clitic.len()
            && lowered.ends_with(clitic)
            && lowered.len() == word.len()
        {
            let split_at = word.len() - clitic.len();
            return (&word[..split_at], Some(&word[split_at..]));
        }
    }
    (word, None)
}

/// Splits a raw sentence into word tokens.
///
/// Tokens are separated on whitespace, leading and trailing punctuation is split
/// into single-character tokens and English clitics (`n't`, `'s`, ...) are
/// detached from the word they end.
///
/// # Example
///
/// ```
/// use rust_sts::data::tokenize;
///
/// let tokens = tokenize("The cat isn't sleeping.");
/// assert_eq!(tokens, vec!["The", "cat", "is", "n't", "sleeping", "."]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        let chars: Vec<(usize, char)> = word.char_indices().collect();
        let mut start = 0;
        let mut end = chars.len();
        while start < end && is_punctuation(chars[start].1) {
            tokens.push(chars[start].1.to_string());
            start += 1;
        }
        let mut trailing = Vec::new();
        while end > start && is_punctuation(chars[end - 1].1) {
            trailing.push(chars[end - 1].1.to_string());
            end -= 1;
        }
        if start < end {
            let byte_start = chars[start].0;
            let byte_end = if end < chars.len() {
                chars[end].0
            } else {
                word.len()
            };
            let (stem, clitic) = split_clitic(&word[byte_start..byte_end]);
            tokens.push(stem.to_string());
            if let Some(clitic) = clitic {
                tokens.push(clitic.to_string());
            }
        }
        tokens.extend(trailing.into_iter().rev());
    }
    tokens
}

/// Returns true for tokens such as `42`, `3.5`, `-1` or `1,000`.
pub fn is_numeric(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
}

fn flags_for(sentence: &[String], other: &[String], pad: usize) -> Vec<f32> {
    let other: std::collections::HashSet<String> =
        other.iter().map(|token| token.to_lowercase()).collect();
    let mut flags = vec![0f32; pad * FLAGS_DIM as usize];
    for (position, token) in sentence.iter().take(pad).enumerate() {
        let offset = position * FLAGS_DIM as usize;
        if other.contains(&token.to_lowercase()) {
            flags[offset] = 1.0;
        }
        if is_numeric(token) {
            flags[offset + 1] = 1.0;
        }
    }
    flags
}

/// Builds the per-token flags for both sides of a list of sentence pairs.
///
/// Returns two float tensors of shape `[n, s0pad, FLAGS_DIM]` and
/// `[n, s1pad, FLAGS_DIM]`. Flag 0 marks a token (case-insensitive) that also
/// occurs in the other sentence of the pair, flag 1 marks numeric tokens.
pub fn sentence_flags(
    s0: &[Vec<String>],
    s1: &[Vec<String>],
    s0pad: usize,
    s1pad: usize,
) -> (Tensor, Tensor) {
    let mut f0 = Vec::with_capacity(s0.len() * s0pad * FLAGS_DIM as usize);
    let mut f1 = Vec::with_capacity(s1.len() * s1pad * FLAGS_DIM as usize);
    for (sentence_0, sentence_1) in s0.iter().zip(s1.iter()) {
        f0.extend(flags_for(sentence_0, sentence_1, s0pad));
        f1.extend(flags_for(sentence_1, sentence_0, s1pad));
    }
    let n = s0.len().min(s1.len()) as i64;
    (
        Tensor::of_slice(&f0)
            .to_kind(Kind::Float)
            .view(&[n, s0pad as i64, FLAGS_DIM][..]),
        Tensor::of_slice(&f1)
            .to_kind(Kind::Float)
            .view(&[n, s1pad as i64, FLAGS_DIM][..]),
    )
}
