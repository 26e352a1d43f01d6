use serde::{Deserialize, Serialize};

/// Single-digit Fibonacci numbers.
pub const FIBONACCI_DIGITS: [u64; 5] = [1, 2, 3, 5, 8];

pub const DEFAULT_MULTIPLIERS: [u64; 4] = [1, 2, 3, 4];

pub fn digital_root(mut n: u128) -> u64 {
    while n >= 10 {
        let mut sum = 0;
        while n > 0 {
            sum += n % 10;
            n /= 10;
        }
        n = sum;
    }
    n as u64
}

pub fn is_fibonacci_digit(d: u64) -> bool {
    FIBONACCI_DIGITS.contains(&d)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEntry {
    pub multiplier: u64,
    pub product: u128,
    pub root: u64,
    pub is_fibonacci: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibonacciProfile {
    pub name: String,
    pub q: i64,
    pub entries: Vec<RootEntry>,
    pub hits: usize,
}

/// Negative q is profiled by its magnitude.
pub fn fibonacci_profile(name: &str, q: i64, multipliers: &[u64]) -> FibonacciProfile {
    let magnitude = q.unsigned_abs();
    let entries: Vec<RootEntry> = multipliers
        .iter()
        .map(|&multiplier| {
            let product = u128::from(magnitude) * u128::from(multiplier);
            let root = digital_root(product);
            RootEntry {
                multiplier,
                product,
                root,
                is_fibonacci: is_fibonacci_digit(root),
            }
        })
        .collect();
    let hits = entries.iter().filter(|e| e.is_fibonacci).count();

    FibonacciProfile {
        name: name.to_string(),
        q,
        entries,
        hits,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibonacciAggregate {
    pub total_hits: usize,
    pub max_possible: usize,
    pub perfect: Vec<String>,
    pub near_perfect: Vec<String>,
}

impl FibonacciAggregate {
    pub fn hit_rate_pct(&self) -> f64 {
        if self.max_possible == 0 {
            0.0
        } else {
            self.total_hits as f64 / self.max_possible as f64 * 100.0
        }
    }
}

pub fn aggregate(profiles: &[FibonacciProfile]) -> FibonacciAggregate {
    let per_profile = profiles.first().map_or(0, |p| p.entries.len());
    FibonacciAggregate {
        total_hits: profiles.iter().map(|p| p.hits).sum(),
        max_possible: profiles.iter().map(|p| p.entries.len()).sum(),
        perfect: profiles
            .iter()
            .filter(|p| per_profile > 0 && p.hits == per_profile)
            .map(|p| p.name.clone())
            .collect(),
        near_perfect: profiles
            .iter()
            .filter(|p| per_profile > 1 && p.hits == per_profile - 1)
            .map(|p| p.name.clone())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digital_root() {
        assert_eq!(digital_root(0), 0);
        assert_eq!(digital_root(7), 7);
        assert_eq!(digital_root(44), 8);
        assert_eq!(digital_root(106), 7);
        assert_eq!(digital_root(999_999_999), 9);
    }

    #[test]
    fn test_profile_for_muon_q() {
        // 44, 88, 132, 176 -> 8, 7, 6, 5
        let profile = fibonacci_profile("muon", 44, &DEFAULT_MULTIPLIERS);
        let roots: Vec<u64> = profile.entries.iter().map(|e| e.root).collect();
        assert_eq!(roots, vec![8, 7, 6, 5]);
        assert_eq!(profile.hits, 2);
    }

    #[test]
    fn test_negative_q_uses_magnitude() {
        let negative = fibonacci_profile("electron_neutrino", -224, &DEFAULT_MULTIPLIERS);
        let positive = fibonacci_profile("x", 224, &DEFAULT_MULTIPLIERS);
        assert_eq!(negative.hits, positive.hits);
        assert_eq!(negative.entries[0].product, 224);
    }

    #[test]
    fn test_extreme_q_does_not_overflow() {
        let profile = fibonacci_profile("extreme", i64::MIN, &[u64::MAX]);
        let expected = u128::from(i64::MIN.unsigned_abs()) * u128::from(u64::MAX);
        assert_eq!(profile.entries[0].product, expected);
        assert!(profile.entries[0].root <= 9);
    }

    #[test]
    fn test_aggregate() {
        // 12 -> 3, 6, 9, 3 ; 65 -> 2, 4, 6, 8 ; 68 -> 5, 1, 6, 2
        let profiles = vec![
            fibonacci_profile("up_quark", 12, &DEFAULT_MULTIPLIERS),
            fibonacci_profile("charm_quark", 65, &DEFAULT_MULTIPLIERS),
            fibonacci_profile("tau", 68, &DEFAULT_MULTIPLIERS),
        ];
        let agg = aggregate(&profiles);
        assert_eq!(agg.max_possible, 12);
        assert_eq!(agg.total_hits, 2 + 2 + 3);
        assert_eq!(agg.near_perfect, vec!["tau".to_string()]);
        assert!((agg.hit_rate_pct() - 7.0 / 12.0 * 100.0).abs() < 1e-9);
        assert!(aggregate(&[]).hit_rate_pct() == 0.0);
    }

    #[test]
    fn test_perfect_profile() {
        // 1, 2, 3, 4 -> 1, 2, 3, 4 ; 4 misses
        let near = fibonacci_profile("one", 1, &DEFAULT_MULTIPLIERS);
        assert_eq!(near.hits, 3);
        let agg = aggregate(&[near]);
        assert!(agg.perfect.is_empty());
        assert_eq!(agg.near_perfect, vec!["one".to_string()]);
    }
}
