// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

/// Lexicographic `k`-combinations of the positions `0..n`.
///
/// Combinations are produced from an explicit index array, in the same order a recursive
/// "take the head, recurse on the tail" generator would produce them:
/// `[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]` for `n = 4, k = 2`.
/// Callers map the positions onto an ordered base sequence, so the order of the base
/// sequence is preserved as the tie-break order of the combinations.
///
/// `k = 0` yields exactly one empty combination; `k > n` yields nothing.
///
/// # Examples
///
/// ```
/// use tank_alloc_core::iter::Combinations;
///
/// let all: Vec<Vec<usize>> = Combinations::new(3, 2).collect();
/// assert_eq!(all, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
/// ```
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    #[inline]
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }

    /// Advances to the next combination and borrows it, without allocating.
    pub fn advance(&mut self) -> Option<&[usize]> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.indices);
        }

        let k = self.indices.len();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.indices[i] < self.n - k + i {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return Some(&self.indices);
            }
        }

        self.done = true;
        None
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(<[usize]>::to_vec)
    }
}

impl std::iter::FusedIterator for Combinations {}

/// The binomial coefficient `n choose k`, saturating at `usize::MAX`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > usize::MAX as u128 {
            return usize::MAX;
        }
    }
    acc as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_lexicographic_order() {
        let all: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    fn test_combinations_zero_k_yields_single_empty() {
        let all: Vec<Vec<usize>> = Combinations::new(3, 0).collect();
        assert_eq!(all, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_combinations_k_greater_than_n_is_empty() {
        assert_eq!(Combinations::new(2, 3).count(), 0);
    }

    #[test]
    fn test_combinations_full_selection() {
        let all: Vec<Vec<usize>> = Combinations::new(3, 3).collect();
        assert_eq!(all, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_combinations_count_matches_binomial() {
        for n in 0..9 {
            for k in 0..=n {
                assert_eq!(Combinations::new(n, k).count(), binomial(n, k), "n={n} k={k}");
            }
        }
    }

    #[test]
    fn test_combinations_fused_after_exhaustion() {
        let mut it = Combinations::new(2, 1);
        assert_eq!(it.next(), Some(vec![0]));
        assert_eq!(it.next(), Some(vec![1]));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_advance_borrows_without_allocating() {
        let mut it = Combinations::new(3, 2);
        assert_eq!(it.advance(), Some(&[0usize, 1][..]));
        assert_eq!(it.advance(), Some(&[0usize, 2][..]));
    }

    #[test]
    fn test_binomial_values() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(20, 10), 184_756);
        assert_eq!(binomial(3, 5), 0);
    }
}
