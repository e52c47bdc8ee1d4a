//! Number-theory helpers used by the puzzle generator.
//!
//! Both helpers return an empty vector for inputs below 2 instead of failing.

/// Every divisor of `n` strictly between 1 and `n`, ascending.
///
/// Returns an empty vector for primes and for `n < 2`.
#[must_use]
pub fn factors_of(n: u32) -> Vec<u32> {
    if n < 2 {
        return Vec::new();
    }
    (2..n).filter(|d| n % d == 0).collect()
}

/// Every prime `<= limit`, ascending, by trial division.
///
/// Returns an empty vector for `limit < 2`.
#[must_use]
pub fn primes_up_to(limit: u32) -> Vec<u32> {
    if limit < 2 {
        return Vec::new();
    }
    (2..=limit).filter(|&n| is_prime(n)).collect()
}

/// Trial-division primality check.
#[must_use]
pub fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2u32;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_exclude_one_and_self() {
        assert_eq!(factors_of(24), vec![2, 3, 4, 6, 8, 12]);
        assert_eq!(factors_of(36), vec![2, 3, 4, 6, 9, 12, 18]);
        assert_eq!(factors_of(15), vec![3, 5]);
    }

    #[test]
    fn factors_of_prime_is_empty() {
        assert!(factors_of(13).is_empty());
        assert!(factors_of(2).is_empty());
    }

    #[test]
    fn small_inputs_yield_empty_sequences() {
        assert!(factors_of(0).is_empty());
        assert!(factors_of(1).is_empty());
        assert!(primes_up_to(0).is_empty());
        assert!(primes_up_to(1).is_empty());
    }

    #[test]
    fn primes_up_to_thirty() {
        assert_eq!(primes_up_to(30), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert_eq!(primes_up_to(2), vec![2]);
    }

    #[test]
    fn primality_edges() {
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(!is_prime(25));
        assert!(is_prime(29));
    }
}
