// Copyright 2019-present Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_sts::data::{Vocabulary, WordEmbeddings};
use rust_sts::models::ModelType;
use rust_sts::tasks::{experiment_config, report_row, summary_row, train_runs, StsConfig, StsTask};
use rust_sts::Config;
use std::path::PathBuf;
use tch::{nn, Device};

/// Train and evaluate Semantic Textual Similarity models
#[derive(Parser, Debug)]
#[command(name = "sts-train", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a model and report its Pearson correlation on each set
    Train(TrainArgs),
    /// Evaluate previously trained weights on dataset files
    Eval(EvalArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Model name (avg, dan)
    model: String,
    /// Training set
    trainf: PathBuf,
    /// Validation set, used for checkpointing and early stopping
    valf: PathBuf,
    /// Configuration overrides, e.g. `inp_w_dropout=1/3 "pact='relu'"`
    params: Vec<String>,
    /// Test set
    #[arg(long)]
    testf: Option<PathBuf>,
    /// GloVe-formatted word vectors
    #[arg(long, default_value = "glove.6B.300d.txt")]
    embeddings: PathBuf,
    /// Directory receiving weights, vocabulary, configuration and metrics
    #[arg(long, default_value = "weights")]
    output_dir: PathBuf,
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// Model name (avg, dan)
    model: String,
    /// Trained weights (`weights-<runid>-bestval.ot`)
    weights: PathBuf,
    /// Vocabulary saved at training time
    vocab: PathBuf,
    /// Configuration saved at training time
    config: PathBuf,
    /// Dataset files to evaluate
    #[arg(required = true)]
    sets: Vec<PathBuf>,
    /// GloVe-formatted word vectors
    #[arg(long, default_value = "glove.6B.300d.txt")]
    embeddings: PathBuf,
}

fn train(args: TrainArgs) -> Result<()> {
    let model_type: ModelType = args.model.parse()?;
    let mut task = StsTask::new(Device::cuda_if_available());
    let config = experiment_config(&task, model_type, &args.params)?;
    if let Some(seed) = config.seed {
        tch::manual_seed(seed);
    }
    task.set_config(config)?;

    task.set_embeddings(WordEmbeddings::from_glove(&args.embeddings)?);
    task.load_data(&args.trainf, &args.valf, args.testf.as_ref())?;

    let reports = train_runs(&task, model_type, &args.output_dir)
        .with_context(|| format!("training into {}", args.output_dir.display()))?;
    for report in &reports {
        println!("{}", report_row(&task, report));
    }
    if let Some(row) = summary_row(model_type, &reports) {
        println!("{}", row);
    }
    Ok(())
}

fn eval(args: EvalArgs) -> Result<()> {
    let model_type: ModelType = args.model.parse()?;
    let mut task = StsTask::new(Device::cuda_if_available());
    task.set_config(StsConfig::from_file(&args.config)?)?;
    task.set_vocabulary(Vocabulary::from_file(&args.vocab)?);
    task.set_embeddings(WordEmbeddings::from_glove(&args.embeddings)?);

    let mut vs = nn::VarStore::new(task.device());
    let model = task.build_model(&vs, model_type)?;
    vs.load(&args.weights)
        .with_context(|| format!("loading weights from {}", args.weights.display()))?;

    for set in &args.sets {
        let (inputs, _) = task.load_set(set)?;
        let result = task.eval_set(&model, &inputs, &set.display().to_string())?;
        println!(
            "{}: Pearson {:.6} | Spearman {:.6} | MSE {:.6}",
            set.display(),
            result.pearson,
            result.spearman,
            result.mse
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rust_sts=info,sts_train=info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Train(args) => train(args),
        Commands::Eval(args) => eval(args),
    }
}
