//! Coupon tooling.
//!
//! Coupon codes arrive as several large line-oriented lists. A code is valid
//! when it is 8 to 10 characters long and appears in at least two of the
//! lists. [`valid_codes`] computes that set and [`seed`] loads it into a
//! [`CouponRegistry`].

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::PathBuf;

use common::RequestContext;
use store::{Coupon, CouponRegistry, StoreError};
use thiserror::Error;

/// Shortest valid coupon code.
pub const MIN_CODE_LEN: usize = 8;
/// Longest valid coupon code.
pub const MAX_CODE_LEN: usize = 10;
/// Distinct lists a code must appear in to be valid.
pub const MIN_SOURCES: usize = 2;
/// Coupons inserted per registry call while seeding.
pub const SEED_BATCH_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum CouponError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn is_candidate(code: &str) -> bool {
    (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len())
}

/// Returns the codes that appear in at least two of `sources`, sorted.
///
/// Each line is trimmed; lines outside the valid length are ignored. A code
/// repeated within a single source counts once for that source.
pub fn valid_codes<I, R>(sources: I) -> io::Result<Vec<String>>
where
    I: IntoIterator<Item = R>,
    R: BufRead,
{
    // code -> (index of the last source it was seen in, distinct source count)
    let mut seen: HashMap<String, (usize, usize)> = HashMap::new();

    for (index, source) in sources.into_iter().enumerate() {
        for line in source.lines() {
            let line = line?;
            let code = line.trim();
            if !is_candidate(code) {
                continue;
            }
            match seen.get_mut(code) {
                Some((last, count)) if *last != index => {
                    *last = index;
                    *count += 1;
                }
                Some(_) => {}
                None => {
                    seen.insert(code.to_string(), (index, 1));
                }
            }
        }
    }

    let mut codes: Vec<String> = seen
        .into_iter()
        .filter(|(_, (_, count))| *count >= MIN_SOURCES)
        .map(|(code, _)| code)
        .collect();
    codes.sort_unstable();
    Ok(codes)
}

/// Reads one code per line, skipping blank lines.
pub fn read_codes<R: BufRead>(source: R) -> io::Result<Vec<String>> {
    let mut codes = Vec::new();
    for line in source.lines() {
        let line = line?;
        let code = line.trim();
        if !code.is_empty() {
            codes.push(code.to_string());
        }
    }
    Ok(codes)
}

/// Inserts `codes` into `registry` in batches and returns how many were new.
#[tracing::instrument(skip(registry, ctx, codes), fields(count = codes.len()))]
pub async fn seed<R>(registry: &R, ctx: &RequestContext, codes: &[String]) -> Result<u64, CouponError>
where
    R: CouponRegistry + ?Sized,
{
    let mut inserted = 0;
    for batch in codes.chunks(SEED_BATCH_SIZE) {
        let coupons: Vec<Coupon> = batch.iter().map(Coupon::new).collect();
        inserted += registry.insert_coupons(ctx, &coupons).await?;
        tracing::debug!(inserted, "coupon batch stored");
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use store::InMemoryStore;

    use super::*;

    fn source(text: &str) -> Cursor<Vec<u8>> {
        Cursor::new(text.as_bytes().to_vec())
    }

    #[test]
    fn keeps_codes_in_two_sources() {
        let codes = valid_codes([
            source("HAPPYHRS\nFIFTYOFF\nONLYHERE1\n"),
            source("  FIFTYOFF  \nSUPER100\n"),
            source("HAPPYHRS\nSUPER100\n"),
        ])
        .unwrap();

        assert_eq!(codes, vec!["FIFTYOFF", "HAPPYHRS", "SUPER100"]);
    }

    #[test]
    fn repeats_within_one_source_do_not_count() {
        let codes = valid_codes([source("HAPPYHRS\nHAPPYHRS\n"), source("OTHERONE\n")]).unwrap();
        assert!(codes.is_empty());
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let text = "SHORT77\nEIGHT888\nTENCHARS10\nELEVENCHARS\n";
        let codes = valid_codes([source(text), source(text)]).unwrap();
        assert_eq!(codes, vec!["EIGHT888", "TENCHARS10"]);
    }

    #[test]
    fn read_codes_skips_blank_lines() {
        let codes = read_codes(source("HAPPYHRS\n\n  \nFIFTYOFF\n")).unwrap();
        assert_eq!(codes, vec!["HAPPYHRS", "FIFTYOFF"]);
    }

    #[tokio::test]
    async fn seed_inserts_in_batches_and_skips_existing() {
        let store = InMemoryStore::new();
        let ctx = RequestContext::new();
        let codes: Vec<String> = (0..2500).map(|i| format!("CODE{i:05}")).collect();

        let inserted = seed(&store, &ctx, &codes).await.unwrap();
        assert_eq!(inserted, 2500);

        let inserted = seed(&store, &ctx, &codes[..10]).await.unwrap();
        assert_eq!(inserted, 0);
        assert!(store.find_one_coupon(&ctx, "CODE02499").await.is_ok());
    }

    #[tokio::test]
    async fn seed_stops_on_cancelled_context() {
        let store = InMemoryStore::new();
        let ctx = RequestContext::new();
        ctx.cancel();

        let err = seed(&store, &ctx, &["HAPPYHRS".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, CouponError::Store(StoreError::Interrupted(_))));
    }
}
