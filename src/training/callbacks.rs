use crate::StsError;
use std::path::{Path, PathBuf};
use tch::nn;

fn improves(value: f64, best: f64) -> bool {
    !value.is_nan() && value > best
}

/// Saves the variable store whenever the monitored value reaches a new maximum.
#[derive(Debug)]
pub struct ModelCheckpoint {
    path: PathBuf,
    best: f64,
    saved: bool,
}

impl ModelCheckpoint {
    pub fn new<P: Into<PathBuf>>(path: P) -> ModelCheckpoint {
        ModelCheckpoint {
            path: path.into(),
            best: f64::NEG_INFINITY,
            saved: false,
        }
    }

    /// Returns true if a new checkpoint was written.
    pub fn on_epoch_end(&mut self, value: f64, vs: &nn::VarStore) -> Result<bool, StsError> {
        if !improves(value, self.best) {
            return Ok(false);
        }
        tracing::debug!(
            "Monitored value improved from {:.6} to {:.6}, saving {}",
            self.best,
            value,
            self.path.display()
        );
        self.best = value;
        vs.save(&self.path)?;
        self.saved = true;
        Ok(true)
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    /// True once at least one checkpoint has been written.
    pub fn saved(&self) -> bool {
        self.saved
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Stops training once the monitored value has not improved for `patience` epochs.
#[derive(Debug)]
pub struct EarlyStopping {
    patience: usize,
    best: f64,
    wait: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> EarlyStopping {
        EarlyStopping {
            patience,
            best: f64::NEG_INFINITY,
            wait: 0,
        }
    }

    /// Returns true when training should stop.
    pub fn on_epoch_end(&mut self, value: f64) -> bool {
        if improves(value, self.best) {
            self.best = value;
            self.wait = 0;
            return false;
        }
        self.wait += 1;
        self.wait >= self.patience
    }
}
