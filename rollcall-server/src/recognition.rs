//! Identity resolution: the embedding capability seam and the match policy
//!
//! The embedding engine is an external capability behind [`IdentityResolver`].
//! The shipped implementation hashes the frame with a perceptual image hash
//! and compares by normalized Hamming distance; anything that can turn an
//! image into comparable feature vectors can stand in for it.
//!
//! The match policy itself is engine-agnostic and lives in
//! [`resolve_identity`].

use crate::roster::Roster;
use image_hasher::{HashAlg, HasherConfig};
use rollcall_common::{Error, Result};
use tracing::debug;

/// Opaque feature vector produced by a resolver
///
/// Only the resolver that produced an embedding can interpret its bytes;
/// everything else treats it as an identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embedding(Vec<u8>);

impl Embedding {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// External embedding/detection capability
///
/// Treated as pure and synchronous: `encode` extracts zero or more probe
/// embeddings from raw image bytes in detection order, `distances` compares a
/// probe to every known embedding, and `matches` applies the engine's own
/// accept threshold per candidate.
pub trait IdentityResolver: Send + Sync {
    /// Extract probe embeddings from raw image bytes, in detection order.
    ///
    /// Undecodable bytes are an [`Error::Decode`]; a decodable image with
    /// nothing to embed yields an empty vector.
    fn encode(&self, image: &[u8]) -> Result<Vec<Embedding>>;

    /// Distance of `probe` to each known embedding, lower is closer.
    fn distances(&self, known: &[Embedding], probe: &Embedding) -> Vec<f64>;

    /// Per-candidate accept flag for `probe` against each known embedding.
    fn matches(&self, known: &[Embedding], probe: &Embedding, threshold: f64) -> Vec<bool> {
        self.distances(known, probe)
            .into_iter()
            .map(|d| d <= threshold)
            .collect()
    }
}

/// Outcome of running the match policy over one frame
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDecision {
    /// Accepted identity, or `None` for UNKNOWN
    pub identity: Option<String>,
    /// Distance of the accepted candidate, or the closest distance seen
    /// while scanning an unmatched frame
    pub distance: f64,
}

impl MatchDecision {
    fn unknown(distance: f64) -> Self {
        Self {
            identity: None,
            distance,
        }
    }
}

/// Match policy: first accepted identity in detection order wins.
///
/// Per probe, the single closest roster candidate is selected and accepted
/// only if the resolver's match flag for that candidate is set. A probe whose
/// closest candidate fails the flag resolves nothing, even if some farther
/// candidate would have passed; the scan then moves to the next probe.
/// Probes after the first accepted one are ignored.
pub fn resolve_identity(
    resolver: &dyn IdentityResolver,
    probes: &[Embedding],
    roster: &Roster,
    threshold: f64,
) -> MatchDecision {
    if roster.is_empty() || probes.is_empty() {
        return MatchDecision::unknown(f64::INFINITY);
    }

    let mut closest_seen = f64::INFINITY;

    for probe in probes {
        let distances = resolver.distances(roster.embeddings(), probe);
        let flags = resolver.matches(roster.embeddings(), probe, threshold);

        let Some((best, best_distance)) = distances
            .iter()
            .copied()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        closest_seen = closest_seen.min(best_distance);

        if flags.get(best).copied().unwrap_or(false) {
            let name = roster.name_at(best).to_string();
            debug!("Accepted {} at distance {:.3}", name, best_distance);
            return MatchDecision {
                identity: Some(name),
                distance: best_distance,
            };
        }
    }

    MatchDecision::unknown(closest_seen)
}

/// Perceptual-hash resolver
///
/// Hashes the whole frame with an 8x8 double-gradient hash and compares by
/// Hamming distance normalized to `[0, 1]`. One probe per frame.
pub struct HashResolver;

impl HashResolver {
    pub fn new() -> Self {
        Self
    }

    fn hash(&self, image: &[u8]) -> Result<Embedding> {
        let img = image::load_from_memory(image).map_err(|e| Error::Decode(e.to_string()))?;
        let hasher = HasherConfig::new()
            .hash_alg(HashAlg::DoubleGradient)
            .hash_size(8, 8)
            .to_hasher();
        Ok(Embedding::new(hasher.hash_image(&img).as_bytes().to_vec()))
    }
}

impl Default for HashResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityResolver for HashResolver {
    fn encode(&self, image: &[u8]) -> Result<Vec<Embedding>> {
        Ok(vec![self.hash(image)?])
    }

    fn distances(&self, known: &[Embedding], probe: &Embedding) -> Vec<f64> {
        known
            .iter()
            .map(|k| normalized_hamming(k.as_bytes(), probe.as_bytes()))
            .collect()
    }
}

/// Hamming distance over hash bytes, scaled by total bit count.
/// Length-mismatched embeddings are maximally distant.
fn normalized_hamming(a: &[u8], b: &[u8]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }
    let differing: u32 = a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum();
    f64::from(differing) / (a.len() as f64 * 8.0)
}
