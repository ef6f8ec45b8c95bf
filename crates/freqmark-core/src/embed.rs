//! The place where payload codes meet frequency coefficients.
//!
//! The chunked processor hands every chunk's transformed coefficients to a
//! [`CoefficientEmbedder`] before transforming them back. No insertion rule is
//! defined yet, so the only shipped embedder is [`IdentityEmbedder`], which
//! leaves the coefficients alone and makes the whole pipeline a scaled
//! identity. A future rule (e.g. LSB perturbation of selected coefficients or
//! spread-spectrum modulation) plugs in here.

use crate::chunk::Chunk;
use crate::result::Result;

pub trait CoefficientEmbedder: Send + Sync {
    /// Called once per chunk with the DCT-II coefficients of its channel array.
    ///
    /// `payload` is the complete code array of the framed watermark, the same
    /// slice for every chunk.
    fn embed(&self, chunk: &Chunk, coefficients: &mut [f64], payload: &[u32]) -> Result<()>;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct IdentityEmbedder;

impl CoefficientEmbedder for IdentityEmbedder {
    fn embed(&self, _chunk: &Chunk, _coefficients: &mut [f64], _payload: &[u32]) -> Result<()> {
        Ok(())
    }
}
