use crate::input_modeling::dynamic_rng::DynRng;

/// The simulator provides a uniform random number generator and simulation
/// clock to the stations and routing logic during the execution of a run
#[derive(Clone)]
pub struct Services {
    global_rng: DynRng,
    global_time: f64,
}

impl Services {
    pub fn new(global_rng: DynRng) -> Self {
        Self {
            global_rng,
            global_time: 0.0,
        }
    }

    pub fn global_rng(&self) -> DynRng {
        self.global_rng.clone()
    }

    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    pub fn set_global_time(&mut self, time: f64) {
        self.global_time = time;
    }
}
