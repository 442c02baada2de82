//! Independent replicate runs over one network.
//!
//! Each replicate is a full [`EvacSim`](crate::EvacSim) with its own seed, RNG,
//! occupancy, and agents; only the immutable network is shared.  With the
//! `parallel` feature replicates run on Rayon's thread pool.  Because no state
//! is shared between instances, the summaries are identical to a sequential
//! run and come back in `seeds` order either way.

use std::sync::Arc;

use evac_core::{NodeId, SimConfig};
use evac_network::{NetworkModel, Router};

use crate::snapshot::RunSummary;
use crate::{NoopObserver, SimBuilder, SimResult};

/// Run one simulation per seed from the same start nodes.
///
/// `config.seed` is replaced by each entry of `seeds`; everything else is
/// shared.
pub fn run_replicates<R: Router + Clone>(
    network:   Arc<NetworkModel>,
    starts:    &[NodeId],
    config:    &SimConfig,
    router:    &R,
    seeds:     &[u64],
    max_ticks: u64,
) -> SimResult<Vec<RunSummary>> {
    let replicate = |seed: u64| -> SimResult<RunSummary> {
        let config = SimConfig { seed, ..config.clone() };
        SimBuilder::new(config, Arc::clone(&network), router.clone())
            .agents(starts.to_vec())
            .build()?
            .run(max_ticks, &mut NoopObserver)
    };

    #[cfg(not(feature = "parallel"))]
    {
        seeds.iter().map(|&seed| replicate(seed)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        seeds.par_iter().map(|&seed| replicate(seed)).collect()
    }
}
