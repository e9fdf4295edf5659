use cozy_chess::Square;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// The single source of randomness behind every policy decision.
///
/// Seed it to replay a game exactly; tests force branches with probabilities
/// of 0.0 and 1.0.
#[derive(Clone, Debug)]
pub struct Dice {
    rng: SmallRng,
}

impl Dice {
    pub fn seeded(seed: u64) -> Self { Self { rng: SmallRng::seed_from_u64(seed) } }

    pub fn from_entropy() -> Self { Self { rng: SmallRng::from_entropy() } }

    pub fn new(seed: Option<u64>) -> Self { seed.map_or_else(Self::from_entropy, Self::seeded) }

    /// Bernoulli trial. Probabilities outside [0, 1] are clamped.
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 { return false; }
        if p >= 1.0 { return true; }
        self.rng.gen_bool(p)
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> { items.choose(&mut self.rng) }

    pub fn square(&mut self) -> Square { Square::index(self.rng.gen_range(0..64)) }

    /// Independent child stream, e.g. one per game in a batch.
    pub fn fork(&mut self) -> Dice { Dice::seeded(self.rng.gen()) }

    /// 128 random bits as lowercase hex.
    pub fn token(&mut self) -> String { format!("{:032x}", self.rng.gen::<u128>()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Dice::seeded(7);
        let mut b = Dice::seeded(7);
        let xs: Vec<Square> = (0..16).map(|_| a.square()).collect();
        let ys: Vec<Square> = (0..16).map(|_| b.square()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn degenerate_probabilities_are_certain() {
        let mut d = Dice::seeded(1);
        assert!((0..100).all(|_| d.chance(1.0)));
        assert!((0..100).all(|_| !d.chance(0.0)));
        assert!(d.chance(3.5));
        assert!(!d.chance(-1.0));
    }

    #[test]
    fn tokens_are_hex_and_distinct() {
        let mut d = Dice::seeded(3);
        let (t1, t2) = (d.token(), d.token());
        assert_eq!(t1.len(), 32);
        assert!(t1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(t1, t2);
    }
}
