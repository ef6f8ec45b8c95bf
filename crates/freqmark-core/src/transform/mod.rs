//! Content agnostic frequency-domain transform.
//!
//! [`forward_transform`] and [`inverse_transform`] are one-shot helpers.
//! Code that transforms many buffers of few distinct lengths should keep a
//! [`TransformEngine`] around, it caches one [`DctPlan`] per length.

mod dct;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use dct::DctPlan;
use rustfft::FftPlanner;

use crate::result::Result;

/// DCT-II of `buffer`, in place
pub fn forward_transform(buffer: &mut [f64]) -> Result<()> {
    DctPlan::new(buffer.len())?.forward(buffer)
}

/// DCT-III of `buffer`, in place. Not normalized, see [`DctPlan`].
pub fn inverse_transform(buffer: &mut [f64]) -> Result<()> {
    DctPlan::new(buffer.len())?.inverse(buffer)
}

pub struct TransformEngine {
    planner: FftPlanner<f64>,
    plans: HashMap<usize, Arc<DctPlan>>,
}

impl TransformEngine {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            plans: HashMap::new(),
        }
    }

    /// returns the cached plan for `len` or builds it
    pub fn plan(&mut self, len: usize) -> Result<Arc<DctPlan>> {
        if let Some(plan) = self.plans.get(&len) {
            return Ok(Arc::clone(plan));
        }
        let plan = Arc::new(DctPlan::with_planner(&mut self.planner, len)?);
        self.plans.insert(len, Arc::clone(&plan));

        Ok(plan)
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransformEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformEngine")
            .field("cached_lengths", &self.plans.keys().collect::<Vec<_>>())
            .finish()
    }
}
