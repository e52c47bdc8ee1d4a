use anyhow::{Context, Result, bail};
use std::collections::HashSet;

/// Largest `start..end` range accepted on the command line.
const MAX_RANGE_SEEDS: u64 = 100_000;

/// Seed metadata used for logic runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    /// Token the seed was parsed from, when it was not a plain integer.
    pub source: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub fn from_numeric(seed: u64) -> Self {
        Self { seed, source: None }
    }

    #[must_use]
    pub fn from_token(seed: u64, token: &str) -> Self {
        Self {
            seed,
            source: Some(token.to_string()),
        }
    }
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports decimal integers (negative values use their magnitude), `0x`
/// hexadecimal, and half-open `start..end` ranges. Duplicates keep their first
/// position; an empty list falls back to seed 1337.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            let value = u64::from_str_radix(hex, 16)
                .with_context(|| format!("invalid hexadecimal seed: {token}"))?;
            pending.push(SeedInfo::from_token(value, token));
            continue;
        }

        if let Some((start, end)) = token.split_once("..") {
            pending.extend(expand_range(token, start, end)?);
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    let mut seen = HashSet::new();
    pending.retain(|info| seen.insert(info.seed));

    if pending.is_empty() {
        pending.push(SeedInfo::from_numeric(1337));
    }

    Ok(pending)
}

fn expand_range(token: &str, start: &str, end: &str) -> Result<Vec<SeedInfo>> {
    let start: u64 = start
        .parse()
        .with_context(|| format!("invalid range start in {token}"))?;
    let end: u64 = end
        .parse()
        .with_context(|| format!("invalid range end in {token}"))?;
    if end <= start {
        bail!("Empty seed range: {token}");
    }
    if end - start > MAX_RANGE_SEEDS {
        bail!("Seed range {token} exceeds {MAX_RANGE_SEEDS} seeds");
    }
    Ok((start..end)
        .map(|seed| SeedInfo::from_token(seed, token))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numeric_hex_and_ranges() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "0xff", "10..13"])).unwrap();
        let values: Vec<u64> = seeds.iter().map(|s| s.seed).collect();
        assert_eq!(values, vec![42, 7, 255, 10, 11, 12]);
        assert_eq!(seeds[2].source.as_deref(), Some("0xff"));
        assert!(seeds[0].source.is_none());
    }

    #[test]
    fn deduplicates_and_defaults() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "3..6"])).unwrap();
        let values: Vec<u64> = seeds.iter().map(|s| s.seed).collect();
        assert_eq!(values, vec![5, 3, 4]);
        let fallback = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(fallback, vec![SeedInfo::from_numeric(1337)]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(resolve_seed_inputs(&tokens(&["banana"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["9..2"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0xzz"])).is_err());
    }
}
