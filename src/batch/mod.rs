//! Runs independent analyses in parallel.
//!
//! Every [`Analyzer`] owns its data, so separate runs (one per library scan,
//! say) can be computed on the rayon pool without locking.

use log::info;
use rayon::prelude::*;

use crate::eigen::EigenDecomposition;
use crate::error::Result;
use crate::pca::Analyzer;

/// Calls [`Analyzer::perform_pca`] on every analyzer in parallel.
///
/// Returns one result per analyzer, in input order. Failed analyzers are
/// returned unchanged alongside their error.
pub fn perform_all<E>(analyzers: Vec<Analyzer<E>>) -> Vec<(Analyzer<E>, Result<()>)>
where
    E: EigenDecomposition,
{
    info!("Running {} analyses in parallel", analyzers.len());
    analyzers
        .into_par_iter()
        .map(|mut analyzer| {
            let result = analyzer.perform_pca();
            (analyzer, result)
        })
        .collect()
}

/// Like [`perform_all`] but on a caller-provided pool.
pub fn perform_all_in<E>(
    pool: &rayon::ThreadPool,
    analyzers: Vec<Analyzer<E>>,
) -> Vec<(Analyzer<E>, Result<()>)>
where
    E: EigenDecomposition,
{
    pool.install(|| perform_all(analyzers))
}
