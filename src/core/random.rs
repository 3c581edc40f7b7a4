//! The single source of randomness for the arena.
//!
//! Model pair selection, response-time jitter and fragment variation all draw from here,
//! so seeding this one value makes a whole run reproducible.

use crate::infrastructure::config::ArenaConfig;
use crate::infrastructure::entities::ModelInfo;
use di::{Ref, inject, injectable};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use std::sync::{Mutex, PoisonError};

/// Synthetic response times are drawn from this range.
const RESPONSE_TIME_MS: Range<u32> = 1000..3000;

/// Chance that a model B fragment gets a trailing space.
const VARIATION_PROBABILITY: f64 = 0.3;

pub struct ArenaRandom {
    rng: Mutex<StdRng>,
}

#[injectable]
impl ArenaRandom {
    #[inject]
    pub fn create(config: Ref<ArenaConfig>) -> ArenaRandom {
        match config.rng_seed {
            Some(seed) => {
                info!("using fixed random seed {seed}");
                ArenaRandom::seeded(seed)
            }
            None => ArenaRandom::from_entropy(),
        }
    }
}

impl ArenaRandom {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *rng)
    }

    /// Two distinct models, drawn without replacement.
    pub fn model_pair(&self, catalog: &[ModelInfo]) -> Option<(ModelInfo, ModelInfo)> {
        self.with(|rng| {
            let mut picked = catalog.choose_multiple(rng, 2);
            let model_a = picked.next()?.clone();
            let model_b = picked.next()?.clone();
            Some((model_a, model_b))
        })
    }

    pub fn response_time_ms(&self) -> u32 {
        self.with(|rng| rng.gen_range(RESPONSE_TIME_MS))
    }

    /// Returns the fragment, sometimes with a trailing space appended.
    pub fn vary_fragment(&self, fragment: &str) -> String {
        if self.with(|rng| rng.gen_bool(VARIATION_PROBABILITY)) {
            format!("{fragment} ")
        } else {
            fragment.to_owned()
        }
    }

    pub fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.with(|rng| items.choose(rng))
    }

    pub fn sample<'a, T>(&self, items: &'a [T], amount: usize) -> Vec<&'a T> {
        self.with(|rng| items.choose_multiple(rng, amount).collect())
    }

    pub fn shuffled<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let mut items = items.to_vec();
        self.with(|rng| items.shuffle(rng));
        items
    }

    pub fn range(&self, range: Range<u32>) -> u32 {
        self.with(|rng| rng.gen_range(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ModelInfo> {
        ["one", "two", "three"]
            .into_iter()
            .map(|id| ModelInfo {
                id: id.to_owned(),
                name: id.to_uppercase(),
                provider: "Test".to_owned(),
            })
            .collect()
    }

    #[test]
    fn test_model_pair_is_always_distinct() {
        let random = ArenaRandom::seeded(7);
        let catalog = catalog();

        for _ in 0..100 {
            let (a, b) = random.model_pair(&catalog).unwrap();
            assert_ne!(a.id, b.id);
        }
    }

    #[test]
    fn test_model_pair_needs_two_models() {
        let random = ArenaRandom::seeded(7);
        assert!(random.model_pair(&catalog()[..1]).is_none());
    }

    #[test]
    fn test_same_seed_gives_same_draws() {
        let first = ArenaRandom::seeded(99);
        let second = ArenaRandom::seeded(99);

        let a: Vec<u32> = (0..10).map(|_| first.response_time_ms()).collect();
        let b: Vec<u32> = (0..10).map(|_| second.response_time_ms()).collect();

        assert_eq!(a, b);
        assert!(a.iter().all(|ms| RESPONSE_TIME_MS.contains(ms)));
    }

    #[test]
    fn test_vary_fragment_only_appends_space() {
        let random = ArenaRandom::seeded(3);

        for _ in 0..50 {
            let varied = random.vary_fragment("chunk");
            assert!(varied == "chunk" || varied == "chunk ");
        }
    }
}
