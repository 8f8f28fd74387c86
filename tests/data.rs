use rust_sts::data::{
    load_set, load_sick2014, load_sts, sentence_flags, sts_categorical2labels,
    sts_labels2categorical, tokenize, StsDataset, StsInputs, Vocabulary, WordEmbeddings,
    FLAGS_DIM, NUM_CLASSES, OOV_INDEX, PAD_INDEX, UNLABELED,
};
use std::collections::HashMap;
use std::io::Write;
use tch::Kind;

fn toks(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(String::from).collect()
}

fn small_embeddings() -> anyhow::Result<WordEmbeddings> {
    let mut vectors = HashMap::new();
    vectors.insert("cat".to_string(), vec![1.0, 0.0, 0.0]);
    vectors.insert("dog".to_string(), vec![0.0, 1.0, 0.0]);
    vectors.insert("runs".to_string(), vec![0.0, 0.0, 1.0]);
    vectors.insert("the".to_string(), vec![0.5, 0.5, 0.5]);
    Ok(WordEmbeddings::new(vectors, 3)?)
}

#[test]
fn tokenizer_splits_punctuation_and_clitics() {
    assert_eq!(
        tokenize("\"Hello, world!\" she said."),
        vec!["\"", "Hello", ",", "world", "!", "\"", "she", "said", "."]
    );
    assert_eq!(tokenize("It's 3.5 km"), vec!["It", "'s", "3.5", "km"]);
    assert_eq!(tokenize("They can't   go"), vec!["They", "ca", "n't", "go"]);
    assert!(tokenize("   ").is_empty());
}

#[test]
fn sts_loader_handles_unlabeled_pairs() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "4.2\tA man is playing a guitar.\tA man plays the guitar.")?;
    writeln!(file, "\tAn unlabeled pair.\tStill unlabeled.")?;
    writeln!(file, "0\tA cat sleeps.\tThe stock market fell.")?;
    file.flush()?;

    let labeled = load_sts(file.path(), true)?;
    assert_eq!(labeled.len(), 2);
    assert_eq!(labeled.labels, vec![4.2, 0.0]);
    assert_eq!(labeled.s0[1], vec!["A", "cat", "sleeps", "."]);

    let all = load_sts(file.path(), false)?;
    assert_eq!(all.len(), 3);
    assert_eq!(all.labels[1], UNLABELED);
    Ok(())
}

#[test]
fn sts_loader_rejects_malformed_lines() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "3.0\tonly one sentence")?;
    file.flush()?;
    assert!(load_sts(file.path(), true).is_err());

    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "high\tfirst sentence\tsecond sentence")?;
    file.flush()?;
    assert!(load_sts(file.path(), true).is_err());

    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "2.0\tfirst sentence\tsecond sentence\textra field")?;
    file.flush()?;
    assert!(load_sts(file.path(), true).is_err());
    Ok(())
}

#[test]
fn sick_loader_uses_relatedness() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("SICK2014_train.txt");
    let mut file = std::fs::File::create(&path)?;
    writeln!(
        file,
        "pair_ID\tsentence_A\tsentence_B\trelatedness_score\tentailment_judgment"
    )?;
    writeln!(file, "1\tA dog runs\tA dog is running\t4.5\tENTAILMENT")?;
    writeln!(file, "2\tA woman sings\tA man cooks\t1.2\tNEUTRAL")?;
    drop(file);

    let dataset = load_sick2014(&path)?;
    assert_eq!(dataset.labels, vec![4.5, 1.2]);
    assert_eq!(dataset.s1[0], vec!["A", "dog", "is", "running"]);

    let dispatched = load_set(&path, true)?;
    assert_eq!(dispatched.labels, dataset.labels);
    Ok(())
}

#[test]
fn labels_to_sparse_targets() {
    let targets = sts_labels2categorical(&[0.0, 2.4, 5.0], NUM_CLASSES);
    assert_eq!(targets.size(), vec![3, NUM_CLASSES]);
    let values = Vec::<f32>::from(&targets.view(&[-1][..]));
    assert_eq!(&values[0..6], &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert!((values[6 + 2] - 0.6).abs() < 1e-6);
    assert!((values[6 + 3] - 0.4).abs() < 1e-6);
    assert_eq!(&values[12..18], &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

    let scores = Vec::<f64>::from(&sts_categorical2labels(&targets).to_kind(Kind::Double));
    assert!((scores[0] - 0.0).abs() < 1e-6);
    assert!((scores[1] - 2.4).abs() < 1e-6);
    assert!((scores[2] - 5.0).abs() < 1e-6);
}

#[test]
fn vocabulary_reserves_padding_and_oov() {
    let sentences = vec![toks("the cat runs"), toks("the dog"), toks("The cat")];
    let vocab = Vocabulary::new(sentences.iter(), None, false);
    assert_eq!(vocab.size(), 2 + 5);
    assert_eq!(vocab.words()[..2], ["_PAD_".to_string(), "_OOV_".to_string()]);
    assert_eq!(vocab.get("The"), 2);
    assert_eq!(vocab.get("unknown"), OOV_INDEX);

    let icase = Vocabulary::new(sentences.iter(), None, true);
    assert_eq!(icase.size(), 2 + 4);
    assert_eq!(icase.get("THE"), icase.get("the"));
}

#[test]
fn vocabulary_pruning_keeps_most_frequent() {
    let sentences = vec![toks("the cat runs"), toks("the dog runs"), toks("the cat")];
    let vocab = Vocabulary::new(sentences.iter(), Some(2), false);
    assert_eq!(vocab.size(), 4);
    assert_ne!(vocab.get("the"), OOV_INDEX);
    assert_eq!(vocab.get("dog"), OOV_INDEX);
    // "cat" and "runs" are tied, ties go alphabetically
    assert_ne!(vocab.get("cat"), OOV_INDEX);
    assert_eq!(vocab.get("runs"), OOV_INDEX);
}

#[test]
fn vectorize_pads_truncates_and_fills_fixed_vectors() -> anyhow::Result<()> {
    let emb = small_embeddings()?;
    let sentences = vec![toks("the cat"), toks("the dog runs fast")];
    let vocab = Vocabulary::new(vec![toks("the cat")].iter(), None, false);
    let vectorized = vocab.vectorize(&sentences, &emb, 3);

    assert_eq!(vectorized.ids.size(), vec![2, 3]);
    assert_eq!(vectorized.fixed.size(), vec![2, 3, 3]);
    let ids = Vec::<i64>::from(&vectorized.ids.view(&[-1][..]));
    assert_eq!(ids[2], PAD_INDEX);
    assert_eq!(ids[4], OOV_INDEX);
    assert_eq!(ids[5], OOV_INDEX);

    let mask = Vec::<f32>::from(&vectorized.mask.view(&[-1][..]));
    assert_eq!(mask, vec![1.0, 1.0, 0.0, 1.0, 1.0, 1.0]);

    // "dog" is out of the vocabulary but has a pretrained vector
    let fixed = Vec::<f32>::from(&vectorized.fixed.get(1).get(1));
    assert_eq!(fixed, vec![0.0, 1.0, 0.0]);
    let in_vocab = Vec::<f32>::from(&vectorized.fixed.get(0).get(1));
    assert_eq!(in_vocab, vec![0.0, 0.0, 0.0]);
    Ok(())
}

#[test]
fn embedding_matrix_uses_pretrained_rows() -> anyhow::Result<()> {
    let emb = small_embeddings()?;
    let vocab = Vocabulary::new(vec![toks("cat unseen")].iter(), None, false);
    let matrix = vocab.embmatrix(&emb);
    assert_eq!(matrix.size(), vec![vocab.size(), 3]);

    let pad = Vec::<f32>::from(&matrix.get(PAD_INDEX));
    assert_eq!(pad, vec![0.0, 0.0, 0.0]);
    let cat = Vec::<f32>::from(&matrix.get(vocab.get("cat")));
    assert_eq!(cat, vec![1.0, 0.0, 0.0]);
    let unseen = Vec::<f32>::from(&matrix.get(vocab.get("unseen")));
    assert!(unseen.iter().all(|v| v.abs() <= 0.25));
    Ok(())
}

#[test]
fn glove_reader() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "cat 0.1 0.2 0.3")?;
    writeln!(file, "dog -0.1 0.0 1.5")?;
    file.flush()?;
    let emb = WordEmbeddings::from_glove(file.path())?;
    assert_eq!(emb.dim(), 3);
    assert_eq!(emb.len(), 2);
    assert_eq!(emb.get("Dog"), Some(&[-0.1f32, 0.0, 1.5][..]));

    let mut bad = tempfile::NamedTempFile::new()?;
    writeln!(bad, "cat 0.1 0.2 0.3")?;
    writeln!(bad, "dog 0.1 0.2")?;
    bad.flush()?;
    assert!(WordEmbeddings::from_glove(bad.path()).is_err());
    Ok(())
}

#[test]
fn flags_mark_shared_and_numeric_tokens() {
    let s0 = vec![toks("The 3 cats")];
    let s1 = vec![toks("three cats the")];
    let (f0, f1) = sentence_flags(&s0, &s1, 4, 4);
    assert_eq!(f0.size(), vec![1, 4, FLAGS_DIM]);
    let f0 = Vec::<f32>::from(&f0.view(&[-1][..]));
    assert_eq!(f0, vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    let f1 = Vec::<f32>::from(&f1.view(&[-1][..]));
    assert_eq!(f1, vec![0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn inputs_select_batches() -> anyhow::Result<()> {
    let emb = small_embeddings()?;
    let dataset = StsDataset {
        s0: vec![toks("the cat"), toks("the dog"), toks("cat runs")],
        s1: vec![toks("a cat"), toks("the dog runs"), toks("dog")],
        labels: vec![3.0, 4.5, 1.0],
    };
    let vocab = Vocabulary::new(dataset.s0.iter().chain(dataset.s1.iter()), None, false);
    let inputs = StsInputs::new(&dataset, &vocab, &emb, 5, 6)?;
    assert_eq!(inputs.len(), 3);
    assert_eq!(inputs.si0.size(), vec![3, 5]);
    assert_eq!(inputs.se1.size(), vec![3, 6, 3]);
    assert_eq!(inputs.f1.size(), vec![3, 6, FLAGS_DIM]);
    assert_eq!(inputs.classes.size(), vec![3, NUM_CLASSES]);

    let selected = inputs.select(&[2, 0]);
    assert_eq!(selected.scores, vec![1.0, 3.0]);
    assert_eq!(selected.si0.size(), vec![2, 5]);

    let last = inputs.batch(2, 10);
    assert_eq!(last.len(), 1);
    assert_eq!(last.scores, vec![1.0]);
    Ok(())
}

#[test]
fn inputs_reject_unaligned_datasets() -> anyhow::Result<()> {
    let emb = small_embeddings()?;
    let dataset = StsDataset {
        s0: vec![toks("the cat"), toks("the dog")],
        s1: vec![toks("a cat")],
        labels: vec![3.0, 4.5],
    };
    let vocab = Vocabulary::new(dataset.s0.iter().chain(dataset.s1.iter()), None, false);
    assert!(StsInputs::new(&dataset, &vocab, &emb, 5, 5).is_err());

    let dataset = StsDataset {
        s0: vec![toks("the cat")],
        s1: vec![toks("a cat")],
        labels: vec![3.0, 4.5],
    };
    assert!(StsInputs::new(&dataset, &vocab, &emb, 5, 5).is_err());
    Ok(())
}
