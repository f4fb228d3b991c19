//! Key streams for hit-rate benchmarks.
//!
//! All generators are seeded so runs are comparable.

use lfukit::traits::CoreCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy)]
pub enum Workload {
    /// Uniform keys in `[0, universe)`.
    Uniform,
    /// `hot_prob` of accesses go to the first `hot_fraction` of the universe.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Sequential scan in `[0, universe)`, wrapping.
    Scan,
    /// Skewed popularity; `theta` 0.0 is uniform, 0.99 is the YCSB default.
    Zipfian { theta: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct WorkloadSpec {
    pub universe: u64,
    pub workload: Workload,
    pub seed: u64,
}

impl WorkloadSpec {
    pub fn generator(self) -> WorkloadGenerator {
        WorkloadGenerator::new(self.universe, self.workload, self.seed)
    }
}

#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    universe: u64,
    workload: Workload,
    rng: StdRng,
    scan_pos: u64,
    zipfian: Option<ZipfianState>,
}

impl WorkloadGenerator {
    pub fn new(universe: u64, workload: Workload, seed: u64) -> Self {
        let universe = universe.max(1);
        let zipfian = match workload {
            Workload::Zipfian { theta } => Some(ZipfianState::new(universe, theta)),
            _ => None,
        };
        Self {
            universe,
            workload,
            rng: StdRng::seed_from_u64(seed),
            scan_pos: 0,
            zipfian,
        }
    }

    pub fn next_key(&mut self) -> u64 {
        match self.workload {
            Workload::Uniform => self.rng.gen_range(0..self.universe),
            Workload::Hotset {
                hot_fraction,
                hot_prob,
            } => {
                let hot_fraction = hot_fraction.clamp(0.0, 1.0);
                let hot_size = ((self.universe as f64) * hot_fraction).round() as u64;
                let hot_size = hot_size.clamp(1, self.universe);
                if self.rng.gen_bool(hot_prob.clamp(0.0, 1.0)) || hot_size == self.universe {
                    self.rng.gen_range(0..hot_size)
                } else {
                    self.rng.gen_range(hot_size..self.universe)
                }
            },
            Workload::Scan => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },
            Workload::Zipfian { .. } => {
                let u: f64 = self.rng.r#gen();
                match &self.zipfian {
                    Some(zipf) => zipf.sample(u),
                    None => 0,
                }
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HitRate {
    pub hits: u64,
    pub misses: u64,
}

impl HitRate {
    pub fn hit_rate(self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Drives `cache` as a read-through cache: look up, insert on miss.
pub fn run_hit_rate<C, V, F>(
    cache: &mut C,
    generator: &mut WorkloadGenerator,
    operations: usize,
    value_for_key: F,
) -> HitRate
where
    C: CoreCache<u64, V>,
    F: Fn(u64) -> V,
{
    let mut hits = 0u64;
    let mut misses = 0u64;

    for _ in 0..operations {
        let key = generator.next_key();
        if cache.get(&key).is_some() {
            hits += 1;
        } else {
            misses += 1;
            let _ = cache.insert(key, value_for_key(key));
        }
    }

    HitRate { hits, misses }
}

/// YCSB-style Zipfian sampler with precomputed zeta values.
#[derive(Debug, Clone)]
struct ZipfianState {
    n: u64,
    theta: f64,
    zeta_n: f64,
    alpha: f64,
    eta: f64,
}

impl ZipfianState {
    fn new(n: u64, theta: f64) -> Self {
        // theta = 1 divides by zero below
        let theta = theta.clamp(0.0, 0.9999);
        let zeta_2 = Self::zeta(2, theta);
        let zeta_n = Self::zeta(n, theta);
        let alpha = 1.0 / (1.0 - theta);
        let eta = (1.0 - (2.0 / n as f64).powf(1.0 - theta)) / (1.0 - zeta_2 / zeta_n);

        Self {
            n,
            theta,
            zeta_n,
            alpha,
            eta,
        }
    }

    fn zeta(n: u64, theta: f64) -> f64 {
        (1..=n).map(|i| 1.0 / (i as f64).powf(theta)).sum()
    }

    fn sample(&self, u: f64) -> u64 {
        let uz = u * self.zeta_n;
        if uz < 1.0 {
            return 0;
        }
        if uz < 1.0 + 0.5_f64.powf(self.theta) {
            return 1;
        }
        let spread = (self.n as f64) * (self.eta * u - self.eta + 1.0).powf(self.alpha);
        (spread as u64).min(self.n - 1)
    }
}
