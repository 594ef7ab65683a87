//! Periodic time encoding.
//!
//! A timestamp is reduced to a bucket `trunc(t) mod buckets` (365 by
//! default, one per day of a year) and looked up in a learned embedding
//! table. The encoding wraps: timestamps a whole period apart share a
//! bucket, so only the phase within the cycle is visible to the model.

use candle_core::{Device, Tensor};
use candle_nn::{embedding, Embedding, Module, VarBuilder};

use cadence_core::Timestamp;

use crate::{Error, Result};

/// Default period of the encoding.
pub const DAYS_PER_YEAR: usize = 365;

/// Bucket of a timestamp; negative times wrap into `[0, buckets)` as well.
pub fn time_bucket(t: Timestamp, buckets: usize) -> u32 {
    (t.trunc() as i64).rem_euclid(buckets as i64) as u32
}

/// Learned embedding over periodic time buckets.
pub struct PeriodicTimeEncoder {
    embedding: Embedding,
    buckets: usize,
    dim: usize,
}

impl PeriodicTimeEncoder {
    /// Create an encoder with `buckets` rows of width `dim`.
    pub fn new(buckets: usize, dim: usize, vb: VarBuilder) -> Result<Self> {
        if buckets == 0 {
            return Err(Error::InvalidConfig("time buckets must be positive".into()));
        }
        let embedding = embedding(buckets, dim, vb)?;
        Ok(Self {
            embedding,
            buckets,
            dim,
        })
    }

    pub fn buckets(&self) -> usize {
        self.buckets
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Encode a run of timestamps as an `(n, dim)` tensor.
    pub fn encode(&self, times: &[Timestamp], device: &Device) -> Result<Tensor> {
        let ids: Vec<u32> = times.iter().map(|&t| time_bucket(t, self.buckets)).collect();
        let ids = Tensor::from_vec(ids, times.len(), device)?;
        Ok(self.embedding.forward(&ids)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn test_bucket_wraps() {
        assert_eq!(time_bucket(0.0, 365), 0);
        assert_eq!(time_bucket(364.9, 365), 364);
        assert_eq!(time_bucket(365.0, 365), 0);
        assert_eq!(time_bucket(10.0, 365), time_bucket(10.0 + 365.0 * 7.0, 365));
        assert_eq!(time_bucket(-1.0, 365), 364);
    }

    #[test]
    fn test_colliding_times_share_embedding() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let enc = PeriodicTimeEncoder::new(DAYS_PER_YEAR, 8, vb).unwrap();

        let out = enc.encode(&[42.0, 42.0 + 365.0, 43.0], &device).unwrap();
        assert_eq!(out.dims(), &[3, 8]);

        let rows = out.to_vec2::<f32>().unwrap();
        assert_eq!(rows[0], rows[1]);
        assert_ne!(rows[0], rows[2]);
    }

    #[test]
    fn test_zero_buckets_rejected() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        assert!(matches!(
            PeriodicTimeEncoder::new(0, 8, vb),
            Err(Error::InvalidConfig(_))
        ));
    }
}
