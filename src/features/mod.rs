//! # Feature vectors from MFCC frames
//!
//! Audio analysis yields one matrix of mel-frequency cepstral coefficients per
//! track, one row per frame. [`FeatureSummary`] collapses the frames into one
//! value per coefficient and [`FeatureRecipe`] turns that into the feature
//! vector fed to an [`Analyzer`], optionally followed by the track duration.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use ndarray::{ArrayView2, Axis};

use crate::eigen::EigenDecomposition;
use crate::pca::Analyzer;
use crate::utils::median_in_place;
use crate::ItemId;

/// Column-wise reduction of a `frames x coefficients` matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureSummary {
    #[default]
    Mean,
    /// Mean of the squared values.
    SquaredMean,
    Median,
    Minimum,
    Maximum,
}

impl FeatureSummary {
    pub const ALL: [FeatureSummary; 5] = [
        FeatureSummary::Mean,
        FeatureSummary::SquaredMean,
        FeatureSummary::Median,
        FeatureSummary::Minimum,
        FeatureSummary::Maximum,
    ];

    pub fn summarize(&self, frames: ArrayView2<f64>) -> anyhow::Result<Vec<f64>> {
        let (n_frames, n_coefficients) = frames.dim();
        if n_frames == 0 || n_coefficients == 0 {
            bail!(
                "Cannot summarize an empty frame matrix ({} x {})",
                n_frames,
                n_coefficients
            );
        }

        let summary = match self {
            FeatureSummary::Mean => frames
                .mean_axis(Axis(0))
                .ok_or_else(|| anyhow!("Failed to compute mean"))?
                .to_vec(),
            FeatureSummary::SquaredMean => frames
                .mapv(|v| v * v)
                .mean_axis(Axis(0))
                .ok_or_else(|| anyhow!("Failed to compute squared mean"))?
                .to_vec(),
            FeatureSummary::Median => frames
                .axis_iter(Axis(1))
                .map(|column| {
                    let mut values = column.to_vec();
                    median_in_place(&mut values).ok_or_else(|| anyhow!("Empty column"))
                })
                .collect::<anyhow::Result<Vec<f64>>>()?,
            FeatureSummary::Minimum => frames
                .axis_iter(Axis(1))
                .map(|column| column.iter().copied().fold(f64::INFINITY, f64::min))
                .collect(),
            FeatureSummary::Maximum => frames
                .axis_iter(Axis(1))
                .map(|column| column.iter().copied().fold(f64::NEG_INFINITY, f64::max))
                .collect(),
        };

        Ok(summary)
    }
}

impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureSummary::Mean => "mean",
            FeatureSummary::SquaredMean => "squared-mean",
            FeatureSummary::Median => "median",
            FeatureSummary::Minimum => "min",
            FeatureSummary::Maximum => "max",
        };
        f.write_str(name)
    }
}

impl FromStr for FeatureSummary {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(FeatureSummary::Mean),
            "squared-mean" | "squaredmean" => Ok(FeatureSummary::SquaredMean),
            "median" => Ok(FeatureSummary::Median),
            "min" | "minimum" => Ok(FeatureSummary::Minimum),
            "max" | "maximum" => Ok(FeatureSummary::Maximum),
            other => bail!("Unknown feature summary: {}", other),
        }
    }
}

/// How a track's feature vector is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureRecipe {
    pub summary: FeatureSummary,
    /// Append the track duration in seconds after the coefficients.
    pub use_duration: bool,
}

impl FeatureRecipe {
    pub fn new(summary: FeatureSummary, use_duration: bool) -> Self {
        FeatureRecipe {
            summary,
            use_duration,
        }
    }

    /// Number of features produced for `n_coefficients` MFCC coefficients.
    pub fn feature_len(&self, n_coefficients: usize) -> usize {
        n_coefficients + usize::from(self.use_duration)
    }

    pub fn vector(&self, frames: ArrayView2<f64>, duration_secs: f64) -> anyhow::Result<Vec<f64>> {
        let mut v = self.summary.summarize(frames)?;
        if self.use_duration {
            v.push(duration_secs);
        }
        Ok(v)
    }

    /// Summarizes `frames` and adds the result to `analyzer` under `id`.
    pub fn feed<E: EigenDecomposition>(
        &self,
        analyzer: &mut Analyzer<E>,
        id: ItemId,
        frames: ArrayView2<f64>,
        duration_secs: f64,
    ) -> anyhow::Result<()> {
        let v = self.vector(frames, duration_secs)?;
        analyzer.add_entry(id, &v)?;
        Ok(())
    }
}
