use rand::Rng;
use rand::seq::SliceRandom;

use crate::words::Word;

/// Uniformly shuffle a copy of `full` and keep the first
/// `min(size, full.len())` words.
pub fn derive_practice_pool<R: Rng + ?Sized>(full: &[Word], size: usize, rng: &mut R) -> Vec<Word> {
    let mut shuffled = full.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(size.min(full.len()));
    shuffled
}
