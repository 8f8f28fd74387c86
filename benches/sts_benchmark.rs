#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use rust_sts::data::{StsDataset, StsInputs, Vocabulary, WordEmbeddings};
use rust_sts::models::{ModelType, StsModel};
use rust_sts::tasks::sts::SPAD;
use rust_sts::tasks::{StsConfig, StsTask};
use rust_sts::training::predict;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tch::{nn, Device};

const WORDS: [&str; 16] = [
    "a", "the", "man", "woman", "child", "dog", "is", "plays", "riding", "guitar", "horse",
    "eating", "an", "apple", "on", "beach",
];

fn create_inputs(emb: &WordEmbeddings, n: usize) -> (StsInputs, Vocabulary) {
    let sentence = |offset: usize| -> Vec<String> {
        (0..12)
            .map(|j| WORDS[(offset * 3 + j * 5) % WORDS.len()].to_string())
            .collect()
    };
    let dataset = StsDataset {
        s0: (0..n).map(sentence).collect(),
        s1: (0..n).map(|i| sentence(i + 1)).collect(),
        labels: (0..n).map(|i| (i % 6) as f64).collect(),
    };
    let vocab = Vocabulary::new(dataset.s0.iter().chain(dataset.s1.iter()), None, false);
    let inputs = StsInputs::new(&dataset, &vocab, emb, SPAD, SPAD).unwrap();
    (inputs, vocab)
}

fn create_model(model_type: ModelType) -> (StsModel, StsInputs, nn::VarStore) {
    let mut vectors = HashMap::new();
    for (index, word) in WORDS.iter().enumerate() {
        let vector = (0..300).map(|d| ((index * 31 + d) % 17) as f32 / 17.0 - 0.5);
        vectors.insert(word.to_string(), vector.collect());
    }
    let emb = WordEmbeddings::new(vectors, 300).unwrap();
    let (inputs, vocab) = create_inputs(&emb, 3000);

    let mut config = StsConfig::default();
    StsTask::new(Device::Cpu).config(&mut config);
    model_type.config(&mut config);
    let vs = nn::VarStore::new(Device::Cpu);
    let model = StsModel::new(&vs.root(), model_type, &vocab, &emb, &config);
    (model, inputs, vs)
}

fn sts_forward_pass(iters: u64, model: &StsModel, inputs: &StsInputs) -> Duration {
    let mut duration = Duration::new(0, 0);
    for _i in 0..iters {
        let start = Instant::now();
        let _ = predict(model, inputs, 3000);
        duration = duration.checked_add(start.elapsed()).unwrap();
    }
    duration
}

fn bench_sts(c: &mut Criterion) {
    let (avg_model, inputs, _avg_vs) = create_model(ModelType::Avg);
    let (dan_model, _, _dan_vs) = create_model(ModelType::Dan);

    let _ = predict(&avg_model, &inputs, 3000);
    c.bench_function("STS avg predict", |b| {
        b.iter_custom(|iters| black_box(sts_forward_pass(iters, &avg_model, &inputs)))
    });
    c.bench_function("STS dan predict", |b| {
        b.iter_custom(|iters| black_box(sts_forward_pass(iters, &dan_model, &inputs)))
    });
}

criterion_group! {
name = benches;
config = Criterion::default().sample_size(10);
targets = bench_sts
}

criterion_main!(benches);
