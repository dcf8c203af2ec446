use crate::field::Field;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Independent uniform samples in `[0, 1)` per cell.
pub fn uniform_random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Field {
    Field::from_fn(n, |_, _| rng.random::<f64>())
}

/// Initial `(population, attractant)` pair drawn from two streams derived from `seed`.
pub fn seeded_pair(n: usize, seed: u64) -> (Field, Field) {
    let mut population_rng = ChaCha12Rng::seed_from_u64(seed);
    let mut attractant_rng = ChaCha12Rng::seed_from_u64(seed.wrapping_add(1));
    (
        uniform_random(n, &mut population_rng),
        uniform_random(n, &mut attractant_rng),
    )
}
