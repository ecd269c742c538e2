use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// The random number generator shared by every stochastic
/// step of evolution.
///
/// It is owned by the population and saved with it, so a
/// restored run continues with the same sequence of draws.
pub type EvolutionRng = Xoshiro256PlusPlus;

/// Returns a generator deterministically derived from `seed`.
///
/// # Examples
/// ```
/// use pursuit_neat::seeded_rng;
/// use rand::Rng;
///
/// let mut a = seeded_rng(10);
/// let mut b = seeded_rng(10);
/// assert_eq!(a.gen::<u64>(), b.gen::<u64>());
/// ```
pub fn seeded_rng(seed: u64) -> EvolutionRng {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}
