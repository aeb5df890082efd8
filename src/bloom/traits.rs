/// Probabilistic set of byte strings.
///
/// `contains` may report items that were never added (false positives) but
/// never misses an added item.
pub trait ProbabilisticSet {
    /// Adds an item. Returns `true` if it was (probably) already present.
    fn add(&mut self, item: &[u8]) -> bool;
    fn contains(&self, item: &[u8]) -> bool;

    /// Approximate number of distinct items added. Items that collide with
    /// already-set bits are not counted.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;
    fn error_rate(&self) -> f64;
}
