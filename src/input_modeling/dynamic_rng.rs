use std::{cell::RefCell, rc::Rc};

use rand_core::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// Any debuggable `RngCore` can drive a simulation, so tests and callers may
/// inject their own generator.
pub trait SimulationRng: std::fmt::Debug + rand_core::RngCore {}
impl<T: std::fmt::Debug + rand_core::RngCore> SimulationRng for T {}
pub type DynRng = Rc<RefCell<dyn SimulationRng>>;

pub(crate) fn default_rng() -> DynRng {
    Rc::new(RefCell::new(Pcg64Mcg::new(42)))
}

/// A fresh generator for a run with a configured seed. Equal seeds yield
/// equal variate streams.
pub fn seeded_rng(seed: u64) -> DynRng {
    dyn_rng(Pcg64Mcg::seed_from_u64(seed))
}

pub fn dyn_rng<Rng: SimulationRng + 'static>(rng: Rng) -> DynRng {
    Rc::new(RefCell::new(rng))
}
