//! Property-based tests for the digest engine and sampling invariants.

use dupeprint::hashing::{
    needs_content_digest, ContentHasher, Digest, DigestContext, FingerprintSampler, IoGate,
    SamplingPolicy,
};
use proptest::prelude::*;
use std::io::Cursor;
use std::sync::Arc;

fn gate() -> Arc<IoGate> {
    Arc::new(IoGate::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Splitting input into arbitrary chunks never changes the digest.
    #[test]
    fn prop_chunking_invariance(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        cuts in proptest::collection::vec(any::<usize>(), 0..8),
    ) {
        let mut points: Vec<usize> = cuts.iter().map(|c| c % (data.len() + 1)).collect();
        points.sort_unstable();

        let mut ctx = DigestContext::new();
        let mut start = 0;
        for point in points {
            ctx.update(&data[start..point]);
            start = point;
        }
        ctx.update(&data[start..]);

        prop_assert_eq!(ctx.finalize(), Digest::compute(&data));
    }

    /// Hex form always parses back to the same digest.
    #[test]
    fn prop_hex_parse(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let digest = Digest::compute(&data);
        let parsed: Digest = digest.to_hex().parse().unwrap();
        prop_assert_eq!(parsed, digest);
    }

    /// Read size is positive, capped and non-decreasing in file size.
    #[test]
    fn prop_read_size_bounds(size in any::<u64>(), extra in 0u64..1_000_000) {
        let policy = SamplingPolicy::default();
        let rs = policy.read_size(size);
        prop_assert!(rs >= 1);
        prop_assert!(rs <= 8192);
        prop_assert!(policy.read_size(size.saturating_add(extra)) >= rs);
    }

    /// Content digest equals MD5 of `[read_size, size)`, whatever the block size.
    #[test]
    fn prop_content_digest_covers_remainder(
        data in proptest::collection::vec(any::<u8>(), 0..20_000),
        block_size in 1usize..5000,
    ) {
        let size = data.len() as u64;
        let read_size = SamplingPolicy::default().read_size(size);
        let hasher = ContentHasher::new(gate()).with_block_size(block_size);

        let digest = hasher
            .digest_reader(&mut Cursor::new(data.clone()), size, read_size)
            .unwrap();

        if needs_content_digest(size, read_size) {
            prop_assert_eq!(digest, Digest::compute(&data[read_size as usize..]));
        }
    }

    /// Fingerprint windows match direct digests of the same byte ranges.
    #[test]
    fn prop_fingerprint_windows(
        data in proptest::collection::vec(any::<u8>(), 1..10_000),
        read_size in 1u64..2000,
    ) {
        let size = data.len() as u64;
        let sampler = FingerprintSampler::new(gate());
        let fp = sampler
            .sample_reader(&mut Cursor::new(data.clone()), size, read_size)
            .unwrap();

        let window = read_size.min(size) as usize;
        let tail_start = size.saturating_sub(read_size) as usize;
        prop_assert_eq!(fp.head, Some(Digest::compute(&data[..window])));
        prop_assert_eq!(fp.tail, Some(Digest::compute(&data[tail_start..])));

        let mid = data.len() / 2;
        let end = (mid + 8).min(data.len());
        prop_assert_eq!(&fp.middle[..end - mid], &data[mid..end]);
        prop_assert!(fp.middle[end - mid..].iter().all(|&b| b == 0));
    }

    /// Two readers with the same bytes always get the same fingerprint.
    #[test]
    fn prop_fingerprint_deterministic(data in proptest::collection::vec(any::<u8>(), 0..5000)) {
        let size = data.len() as u64;
        let read_size = SamplingPolicy::default().read_size(size);
        let sampler = FingerprintSampler::new(gate());

        let a = sampler.sample_reader(&mut Cursor::new(data.clone()), size, read_size).unwrap();
        let b = sampler.sample_reader(&mut Cursor::new(data), size, read_size).unwrap();
        prop_assert_eq!(a, b);
    }
}
