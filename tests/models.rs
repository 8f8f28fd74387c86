use rust_sts::blocks::{MlpSum, Pooling, PoolingMode, PtScorer, PtScorerType};
use rust_sts::data::{StsDataset, StsInputs, Vocabulary, WordEmbeddings, NUM_CLASSES};
use rust_sts::models::{AvgEncoder, ModelType, StsModel};
use rust_sts::tasks::{freeze_layers, HiddenDims, StsConfig, StsTask};
use rust_sts::common::WordDropout;
use rust_sts::training::{
    pearson_loss, EarlyStopping, Loss, OptimizerOption, OptimizerType, Trainer,
};
use std::collections::HashMap;
use tch::{nn, Device, Kind, Tensor};

fn toks(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(String::from).collect()
}

fn fixture() -> anyhow::Result<(StsDataset, Vocabulary, WordEmbeddings)> {
    let mut vectors = HashMap::new();
    for (index, word) in ["a", "cat", "dog", "sits", "runs", "the"].iter().enumerate() {
        let mut vector = vec![0f32; 4];
        vector[index % 4] = 1.0;
        vector[(index + 1) % 4] = -0.5;
        vectors.insert(word.to_string(), vector);
    }
    let emb = WordEmbeddings::new(vectors, 4)?;
    let dataset = StsDataset {
        s0: vec![toks("a cat sits"), toks("the dog runs"), toks("a dog")],
        s1: vec![toks("the cat sits"), toks("a cat sits"), toks("a dog runs")],
        labels: vec![4.0, 1.0, 3.5],
    };
    let vocab = Vocabulary::new(dataset.s0.iter().chain(dataset.s1.iter()), None, false);
    Ok((dataset, vocab, emb))
}

fn avg_config() -> StsConfig {
    let mut config = StsConfig::default();
    StsTask::new(Device::Cpu).config(&mut config);
    ModelType::Avg.config(&mut config);
    config
}

#[test]
fn mean_pooling_modes() {
    let tokens = Tensor::of_slice(&[1.0f32, 2.0, 3.0, 4.0, 0.0, 0.0]).view(&[1, 3, 2][..]);
    let mask = Tensor::of_slice(&[1.0f32, 1.0, 0.0]).view(&[1, 3][..]);

    let pooled = Pooling::new(PoolingMode::masked_mean).forward(&tokens, &mask);
    assert_eq!(pooled.size(), vec![1, 2]);
    assert_eq!(Vec::<f32>::from(&pooled.view(&[-1][..])), vec![2.0, 3.0]);

    let pooled = Pooling::new(PoolingMode::mean).forward(&tokens, &mask);
    assert_eq!(pooled.size(), vec![1, 2]);
    let values = Vec::<f32>::from(&pooled.view(&[-1][..]));
    assert!((values[0] - 4.0 / 3.0).abs() < 1e-6);
    assert!((values[1] - 2.0).abs() < 1e-6);

    let empty = Tensor::zeros(&[1, 3], (Kind::Float, Device::Cpu));
    let pooled = Pooling::new(PoolingMode::masked_mean).forward(&tokens, &empty);
    assert_eq!(Vec::<f32>::from(&pooled.view(&[-1][..])), vec![0.0, 0.0]);
}

#[test]
fn avg_encoder_pooling_follows_configuration() -> anyhow::Result<()> {
    let mut config = avg_config();
    assert_eq!(config.pooling, PoolingMode::mean);
    config.project = false;
    let embedded = Tensor::of_slice(&[2.0f32, 4.0, 0.0, 0.0]).view(&[1, 2, 2][..]);
    let mask = Tensor::of_slice(&[1.0f32, 0.0]).view(&[1, 2][..]);

    let vs = nn::VarStore::new(Device::Cpu);
    let encoder = AvgEncoder::new(&vs.root(), 2, &config);
    let padded = Vec::<f32>::from(&encoder.forward_t(&embedded, &mask, false).view(&[-1][..]));
    assert_eq!(padded, vec![1.0, 2.0]);

    config.apply_override("pooling='masked_mean'")?;
    let encoder = AvgEncoder::new(&vs.root() / "masked", 2, &config);
    let masked = Vec::<f32>::from(&encoder.forward_t(&embedded, &mask, false).view(&[-1][..]));
    assert_eq!(masked, vec![2.0, 4.0]);
    Ok(())
}

#[test]
fn scorers_produce_one_score_per_pair() {
    let e0 = Tensor::of_slice(&[1.0f32, 0.0, 2.0, 1.0, 1.0, 1.0]).view(&[2, 3][..]);
    let e1 = Tensor::of_slice(&[1.0f32, 1.0, 0.0, 1.0, 1.0, 1.0]).view(&[2, 3][..]);

    let mut config = avg_config();
    for scorer_type in &[
        PtScorerType::dot,
        PtScorerType::cos,
        PtScorerType::mlp,
        PtScorerType::cat,
        PtScorerType::answer_only,
    ] {
        config.ptscorer = *scorer_type;
        let vs = nn::VarStore::new(Device::Cpu);
        let scorer = PtScorer::new(&vs.root(), 3, &config);
        let scores = scorer.forward(&e0, &e1);
        assert_eq!(scores.size(), vec![2, 1], "{:?}", scorer_type);
    }

    let dot = Vec::<f32>::from(&PtScorer::Dot.forward(&e0, &e1).view(&[-1][..]));
    assert_eq!(dot, vec![1.0, 3.0]);
    let cos = Vec::<f32>::from(&PtScorer::Cos.forward(&e0, &e1).view(&[-1][..]));
    assert!((cos[1] - 1.0).abs() < 1e-6);
}

#[test]
fn mlp_scorer_hidden_layers_and_regularization() {
    let mut config = avg_config();
    config.ptscorer = PtScorerType::mlp;
    config.mlpsum = MlpSum::absdiff;
    config.ddim = HiddenDims::Layers(vec![2.0, 1.0]);
    let vs = nn::VarStore::new(Device::Cpu);
    let scorer = PtScorer::new(&vs.root(), 3, &config);
    // two hidden kernels and the output kernel
    assert_eq!(scorer.regularized_weights().len(), 3);
    let names: Vec<String> = vs.variables().keys().cloned().collect();
    assert!(names.iter().any(|name| name == "mlp.hidden_0.weight"));
    assert!(names.iter().any(|name| name == "mlp.hidden_1.weight"));
    assert_eq!(vs.variables()["mlp.hidden_0.weight"].size(), vec![6, 6]);

    config.ddim = HiddenDims::Single(0.0);
    let vs = nn::VarStore::new(Device::Cpu);
    let scorer = PtScorer::new(&vs.root(), 3, &config);
    assert_eq!(scorer.regularized_weights().len(), 1);
}

#[test]
fn avg_encoder_dimensions() {
    let mut config = avg_config();
    config.wproject = true;
    config.wdim = 2.0;
    config.deep = 2;
    config.pdim = 0.5;
    let vs = nn::VarStore::new(Device::Cpu);
    let encoder = AvgEncoder::new(&vs.root(), 6, &config);
    assert_eq!(encoder.output_dim(), 3);
    assert_eq!(encoder.regularized_weights().len(), 4);

    let embedded = Tensor::ones(&[2, 5, 6], (Kind::Float, Device::Cpu));
    let mask = Tensor::ones(&[2, 5], (Kind::Float, Device::Cpu));
    let encoded = encoder.forward_t(&embedded, &mask, false);
    assert_eq!(encoded.size(), vec![2, 3]);
}

#[test]
fn model_outputs_class_distributions() -> anyhow::Result<()> {
    let (dataset, vocab, emb) = fixture()?;
    for model_type in &[ModelType::Avg, ModelType::Dan] {
        let mut config = StsConfig::default();
        model_type.config(&mut config);
        let vs = nn::VarStore::new(Device::Cpu);
        let model = StsModel::new(&vs.root(), *model_type, &vocab, &emb, &config);
        let inputs = StsInputs::new(&dataset, &vocab, &emb, 5, 5)?;

        let logits = model.forward_t(&inputs, true);
        assert_eq!(logits.size(), vec![3, NUM_CLASSES]);
        let probabilities = model.predict_proba(&inputs);
        let sums = Vec::<f32>::from(&probabilities.sum_dim_intlist(&[1], false, Kind::Float));
        assert!(sums.iter().all(|s| (s - 1.0).abs() < 1e-5));

        let penalty = model.regularization_loss().double_value(&[]);
        assert!(penalty > 0.0);
    }
    Ok(())
}

#[test]
fn embeddings_are_initialized_from_pretrained_vectors() -> anyhow::Result<()> {
    let (_, vocab, emb) = fixture()?;
    let config = avg_config();
    let vs = nn::VarStore::new(Device::Cpu);
    let _model = StsModel::new(&vs.root(), ModelType::Avg, &vocab, &emb, &config);
    let weights = &vs.variables()["emb.word_embeddings.weight"];
    let cat = Vec::<f32>::from(&weights.get(vocab.get("cat")));
    assert_eq!(cat, emb.get("cat").unwrap_or(&[]).to_vec());
    Ok(())
}

#[test]
fn objectives_reward_correct_predictions() {
    let targets = rust_sts::data::sts_labels2categorical(&[0.0, 2.0, 5.0], NUM_CLASSES);
    let perfect = pearson_loss(&targets, &targets).double_value(&[]);
    assert!((perfect + 1.0).abs() < 1e-4);

    let good_logits = &targets * 20.0;
    let bad_logits = targets.flip(&[0]) * 20.0;
    for loss in &[Loss::pearson, Loss::categorical_crossentropy, Loss::mse] {
        let good = loss.compute(&good_logits, &targets).double_value(&[]);
        let bad = loss.compute(&bad_logits, &targets).double_value(&[]);
        assert!(good < bad, "{:?}: {} >= {}", loss, good, bad);
    }
}

#[test]
fn fixed_layers_do_not_require_grad() -> anyhow::Result<()> {
    let (_, vocab, emb) = fixture()?;
    let config = avg_config();
    let vs = nn::VarStore::new(Device::Cpu);
    let _model = StsModel::new(&vs.root(), ModelType::Avg, &vocab, &emb, &config);
    freeze_layers(&vs, &["emb".to_string()])?;
    let variables = vs.variables();
    assert!(!variables["emb.word_embeddings.weight"].requires_grad());
    assert!(variables["output.weight"].requires_grad());

    assert!(freeze_layers(&vs, &["nonexistent".to_string()]).is_err());
    Ok(())
}

#[test]
fn early_stopping_patience() {
    let mut early_stopping = EarlyStopping::new(2);
    assert!(!early_stopping.on_epoch_end(0.5));
    assert!(!early_stopping.on_epoch_end(0.4));
    assert!(!early_stopping.on_epoch_end(0.6));
    assert!(!early_stopping.on_epoch_end(f64::NAN));
    assert!(early_stopping.on_epoch_end(0.6));
}

#[test]
fn configuration_overrides() -> anyhow::Result<()> {
    let mut config = avg_config();
    assert_eq!(config.ptscorer, PtScorerType::mlp);
    assert_eq!(config.loss, Loss::pearson);
    assert_eq!(config.epochs, 32);

    config.apply_override("inp_w_dropout=1/3")?;
    config.apply_override("pact='relu'")?;
    config.apply_override("ptscorer=B.dot_ptscorer")?;
    config.apply_override("Ddim=[2, 1]")?;
    config.apply_override("embprune=None")?;
    config.apply_override("e_add_flags=False")?;
    config.apply_override("fix_layers=[\"emb\"]")?;
    assert!((config.inp_w_dropout - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(config.pact, rust_sts::common::Activation::relu);
    assert_eq!(config.ptscorer, PtScorerType::dot);
    assert_eq!(config.ddim, HiddenDims::Layers(vec![2.0, 1.0]));
    assert_eq!(config.embprune, None);
    assert!(!config.e_add_flags);
    assert_eq!(config.fix_layers, vec!["emb".to_string()]);

    assert!(config.apply_override("no_such_key=1").is_err());
    assert!(config.apply_override("deep=many").is_err());
    assert!(config.apply_override("missing_value").is_err());

    config.inp_e_dropout = 1.5;
    assert!(config.validate().is_err());
    Ok(())
}

#[test]
fn word_dropout_drops_whole_tokens() {
    tch::manual_seed(0);
    let input = Tensor::ones(&[4, 50, 3], (Kind::Float, Device::Cpu));
    let dropout = WordDropout::new(0.5);

    let output = input.apply_t(&dropout, true);
    assert_eq!(output.size(), vec![4, 50, 3]);
    let values = Vec::<f32>::from(&output.view(&[-1][..]));
    let (mut dropped, mut kept) = (0, 0);
    for token in values.chunks(3) {
        if token.iter().all(|v| *v == 0.0) {
            dropped += 1;
        } else {
            assert!(token.iter().all(|v| (v - 2.0).abs() < 1e-6));
            kept += 1;
        }
    }
    assert!(dropped > 0);
    assert!(kept > 0);

    let output = input.apply_t(&dropout, false);
    assert_eq!(Vec::<f32>::from(&output.view(&[-1][..])), vec![1.0; 600]);
}

#[test]
fn epoch_fraction_limits_visited_pairs() -> anyhow::Result<()> {
    let (dataset, vocab, emb) = fixture()?;
    let dir = tempfile::tempdir()?;
    let inputs = StsInputs::new(&dataset, &vocab, &emb, 5, 5)?;
    for (epoch_fract, expected) in &[(0.5, 2usize), (1.0, 3usize)] {
        let mut config = avg_config();
        config.epochs = 2;
        config.patience = 5;
        config.batch_size = 1;
        config.epoch_fract = *epoch_fract;
        let mut vs = nn::VarStore::new(Device::Cpu);
        let model = StsModel::new(&vs.root(), ModelType::Avg, &vocab, &emb, &config);
        let weights_file = dir.path().join(format!("weights-{}.ot", epoch_fract));
        let history = Trainer::new(&config).fit(&model, &mut vs, &inputs, &inputs, &weights_file)?;
        assert_eq!(history.epochs.len(), 2);
        assert!(history.epochs.iter().all(|m| m.samples == *expected));
    }
    Ok(())
}

#[test]
fn optimizers_update_variables() -> anyhow::Result<()> {
    for optimizer_type in &[OptimizerType::adam, OptimizerType::sgd, OptimizerType::rmsprop] {
        let vs = nn::VarStore::new(Device::Cpu);
        let weights = vs.root().var("weights", &[3], nn::Init::Const(1.0));
        let mut optimizer = OptimizerOption::new(*optimizer_type, &vs, 0.1)?;
        let loss = (&weights * &weights).sum(Kind::Float);
        optimizer.backward_step(&loss);
        let updated = Vec::<f32>::from(&weights.detach());
        assert!(updated.iter().all(|v| *v < 1.0), "{:?}", optimizer_type);
    }
    Ok(())
}
