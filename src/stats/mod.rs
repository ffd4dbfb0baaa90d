//! Descriptive statistics comparing one named provider against competitors.
//!
//! All functions are pure aggregations over a [`Dataset`]. The named
//! provider ("Bookbot" by default) is always passed in by the caller.

pub mod dataset;

pub use dataset::{Dataset, Record};

use std::collections::{BTreeMap, HashMap, HashSet};

/// Count of ISBNs for which every offer comes from the named provider.
pub fn sole_provider_count(data: &Dataset, provider: &str) -> usize {
    let mut by_isbn: HashMap<&str, bool> = HashMap::new();

    for r in data.records() {
        let all_named = by_isbn.entry(r.isbn.as_str()).or_insert(true);
        *all_named &= r.provider == provider;
    }

    by_isbn.values().filter(|&&all_named| all_named).count()
}

/// Count of the named provider's offers priced outside the per-ISBN
/// interquartile bounds.
///
/// Bounds are Q1/Q3 over all offers' prices within each ISBN group the
/// provider appears in (the provider's own offers included), computed with
/// linear interpolation. An offer is an outlier when its price is strictly
/// below Q1 or strictly above Q3.
pub fn price_outlier_count(data: &Dataset, provider: &str) -> usize {
    let provider_isbns: HashSet<&str> = data
        .records()
        .iter()
        .filter(|r| r.provider == provider)
        .map(|r| r.isbn.as_str())
        .collect();

    let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in data.records() {
        if provider_isbns.contains(r.isbn.as_str()) {
            groups.entry(r.isbn.as_str()).or_default().push(r.price);
        }
    }

    let mut bounds: HashMap<&str, (f64, f64)> = HashMap::new();
    for (isbn, mut prices) in groups {
        prices.sort_by(|a, b| a.total_cmp(b));
        bounds.insert(isbn, (quantile(&prices, 0.25), quantile(&prices, 0.75)));
    }

    data.records()
        .iter()
        .filter(|r| r.provider == provider)
        .filter(|r| {
            bounds
                .get(r.isbn.as_str())
                .is_some_and(|&(q1, q3)| r.price < q1 || r.price > q3)
        })
        .count()
}

/// Providers whose mean price, over ISBNs shared with the named provider, is
/// below the named provider's mean price. Sorted alphabetically.
pub fn lower_priced_providers(data: &Dataset, provider: &str) -> Vec<String> {
    let provider_isbns: HashSet<&str> = data
        .records()
        .iter()
        .filter(|r| r.provider == provider)
        .map(|r| r.isbn.as_str())
        .collect();

    let named_prices: Vec<f64> =
        data.records().iter().filter(|r| r.provider == provider).map(|r| r.price).collect();
    if named_prices.is_empty() {
        return Vec::new();
    }
    let named_mean = named_prices.iter().sum::<f64>() / named_prices.len() as f64;

    // Mean price per provider within the shared-ISBN subset; the BTreeMap
    // keeps the result alphabetical.
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in data.records() {
        if provider_isbns.contains(r.isbn.as_str()) {
            let entry = sums.entry(r.provider.as_str()).or_insert((0.0, 0));
            entry.0 += r.price;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .filter(|(name, (sum, count))| *name != provider && sum / (*count as f64) < named_mean)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Mean of (named-provider offer price - lowest price for that offer's ISBN)
/// across all of the provider's offers. `None` when the provider has no
/// offers in the dataset.
pub fn average_deviation_from_lowest(data: &Dataset, provider: &str) -> Option<f64> {
    let mut lowest: HashMap<&str, f64> = HashMap::new();
    for r in data.records() {
        lowest
            .entry(r.isbn.as_str())
            .and_modify(|min| *min = min.min(r.price))
            .or_insert(r.price);
    }

    let deviations: Vec<f64> = data
        .records()
        .iter()
        .filter(|r| r.provider == provider)
        .map(|r| r.price - lowest[r.isbn.as_str()])
        .collect();

    if deviations.is_empty() {
        None
    } else {
        Some(deviations.iter().sum::<f64>() / deviations.len() as f64)
    }
}

/// Percentage of offers whose country differs from the home country.
/// `None` for an empty dataset.
pub fn foreign_offers_pct(data: &Dataset, home_country: &str) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    let foreign = data.records().iter().filter(|r| r.country != home_country).count();
    Some(foreign as f64 / data.len() as f64 * 100.0)
}

/// Quantile with linear interpolation over an ascending-sorted slice:
/// position `h = (n - 1) * q`, interpolating between the neighbors of `h`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }

    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
