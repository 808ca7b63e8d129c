// RAPTOR (Round-bAsed Public Transit Optimized Router) variants over one
// shared round skeleton.

pub(crate) mod earliest_arrival;
pub(crate) mod engine;
pub(crate) mod mcraptor;
pub(crate) mod shared_mob;

pub(crate) use earliest_arrival::earliest_arrival_raptor;
pub(crate) use engine::RaptorRun;
pub(crate) use mcraptor::{mc_raptor, mc_raptor_shared_mob};
pub(crate) use shared_mob::SharedMobilityState;
