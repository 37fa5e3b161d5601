//! Lexicographic permutations of `0..n`
//!
//! Each call to `next` derives the following ordering from the previous one,
//! so callers can stop early without paying for the whole `n!` set.

/// Iterator over every ordering of `0..n`, starting with the identity
#[derive(Debug, Clone)]
pub struct Permutations {
    next: Option<Vec<usize>>,
}

impl Permutations {
    pub fn new(n: usize) -> Self {
        Self {
            next: Some((0..n).collect()),
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        self.next = successor(&current);
        Some(current)
    }
}

/// Next ordering in lexicographic order, or `None` after the last
fn successor(order: &[usize]) -> Option<Vec<usize>> {
    let pivot = order.windows(2).rposition(|w| w[0] < w[1])?;

    let mut next = order.to_vec();
    let swap = next.iter().rposition(|&v| v > next[pivot])?;
    next.swap(pivot, swap);
    next[pivot + 1..].reverse();

    Some(next)
}
