//! Capacity selection and the quadratic probe sequence.
//!
//! Capacities are primes `p` with `p % 4 == 3`. For those primes the values
//! `+k²` and `-k²` (mod p) for `k` in `1..=(p-1)/2` are pairwise distinct and
//! non-zero, so the alternating sequence
//!
//! ```text
//! home, home + 1², home - 1², home + 2², home - 2², ...
//! ```
//!
//! visits every slot exactly once in its first `p` probes.

/// Smallest capacity the registry will use.
pub const MIN_CAPACITY: usize = 3;

/// Largest capacity the registry will use: `2^31 - 1`, itself a prime
/// congruent to 3 mod 4, so every request up to it rounds to a capacity
/// no larger than it.
pub const MAX_CAPACITY: usize = 2_147_483_647;

/// Round `requested` up to the next prime congruent to 3 mod 4.
///
/// Returns `None` when `requested` exceeds [`MAX_CAPACITY`].
pub fn probe_capacity(requested: usize) -> Option<usize> {
    if requested > MAX_CAPACITY {
        return None;
    }
    let mut n = requested.max(MIN_CAPACITY);
    // Jump to the next value that is 3 mod 4, then step by 4.
    n += (3 + 4 - n % 4) % 4;
    while !is_prime(n) {
        n += 4;
    }
    Some(n)
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// The slot indices probed for one key, in probe order.
///
/// Yields exactly `capacity` indices.
#[derive(Clone, Debug)]
pub struct ProbeSequence {
    home: usize,
    capacity: usize,
    step: usize,
}

impl ProbeSequence {
    /// Start a probe sequence at `home` in a table of `capacity` slots.
    pub fn new(home: usize, capacity: usize) -> Self {
        debug_assert!(capacity > 0 && home < capacity);
        Self {
            home,
            capacity,
            step: 0,
        }
    }

    /// The home index the sequence starts from.
    pub fn home(&self) -> usize {
        self.home
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.step >= self.capacity {
            return None;
        }
        let j = self.step;
        self.step += 1;

        if j == 0 {
            return Some(self.home);
        }
        let k = ((j + 1) / 2) as u128;
        let offset = ((k * k) % self.capacity as u128) as usize;
        let index = if j % 2 == 1 {
            (self.home + offset) % self.capacity
        } else {
            (self.home + self.capacity - offset) % self.capacity
        };
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.capacity - self.step;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ProbeSequence {}
