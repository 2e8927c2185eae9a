use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::process::{background_normalize_zfactor, ProcessedTable};
use crate::reconcile::{reconcile, ReconcileError, ReconciledTable};
use crate::threshold::{
    determine_mic, hit_table, set_membership, HitRecord, MembershipTable, MicRecord,
};

use super::Sources;

/// Identifies a memoized pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageKey {
    /// Reconciled table
    Merged,
    /// Normalized table
    Processed,
    /// Hit table for a threshold (`f64::to_bits`)
    Hits(u64),
    /// Set-membership table for a threshold (`f64::to_bits`)
    Membership(u64),
    /// MIC table
    Mic,
}

impl StageKey {
    /// Key of the hit table for `threshold`
    pub fn hits(threshold: f64) -> Self {
        StageKey::Hits(threshold.to_bits())
    }

    /// Key of the set-membership table for `threshold`
    pub fn membership(threshold: f64) -> Self {
        StageKey::Membership(threshold.to_bits())
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKey::Merged => f.write_str("merged"),
            StageKey::Processed => f.write_str("processed"),
            StageKey::Hits(bits) => write!(f, "hits({})", f64::from_bits(*bits)),
            StageKey::Membership(bits) => write!(f, "membership({})", f64::from_bits(*bits)),
            StageKey::Mic => f.write_str("mic"),
        }
    }
}

/// Stage outputs computed so far.
///
/// Every accessor takes the cached value out, computes it if absent and
/// puts it back, so a stage is computed at most once.
#[derive(Debug, Default)]
pub(super) struct StageCache {
    merged: Option<ReconciledTable>,
    processed: Option<ProcessedTable>,
    hits: BTreeMap<u64, Vec<HitRecord>>,
    membership: BTreeMap<u64, MembershipTable>,
    mic: Option<Vec<MicRecord>>,
}

impl StageCache {
    pub(super) fn keys(&self) -> Vec<StageKey> {
        let mut keys = Vec::new();
        if self.merged.is_some() {
            keys.push(StageKey::Merged);
        }
        if self.processed.is_some() {
            keys.push(StageKey::Processed);
        }
        keys.extend(self.hits.keys().map(|b| StageKey::Hits(*b)));
        keys.extend(self.membership.keys().map(|b| StageKey::Membership(*b)));
        if self.mic.is_some() {
            keys.push(StageKey::Mic);
        }
        keys
    }

    pub(super) fn merged(&mut self, sources: &Sources) -> Result<&ReconciledTable, ReconcileError> {
        let table = match self.merged.take() {
            Some(table) => table,
            None => reconcile(
                &sources.inputs,
                &sources.mp_ast,
                &sources.ast_acd,
                &sources.measurements,
            )?,
        };
        Ok(&*self.merged.insert(table))
    }

    pub(super) fn processed(
        &mut self,
        sources: &Sources,
        config: &PipelineConfig,
    ) -> Result<&ProcessedTable, ReconcileError> {
        let table = match self.processed.take() {
            Some(table) => table,
            None => {
                let merged = self.merged(sources)?;
                background_normalize_zfactor(&merged.records, config)
            }
        };
        Ok(&*self.processed.insert(table))
    }

    pub(super) fn hits(
        &mut self,
        sources: &Sources,
        config: &PipelineConfig,
        threshold: f64,
    ) -> Result<&[HitRecord], ReconcileError> {
        let bits = threshold.to_bits();
        let hits = match self.hits.remove(&bits) {
            Some(hits) => hits,
            None => {
                let processed = self.processed(sources, config)?;
                hit_table(&processed.records, config, threshold)
            }
        };
        Ok(self.hits.entry(bits).or_insert(hits).as_slice())
    }

    pub(super) fn membership(
        &mut self,
        sources: &Sources,
        config: &PipelineConfig,
        threshold: f64,
    ) -> Result<&MembershipTable, ReconcileError> {
        let bits = threshold.to_bits();
        let table = match self.membership.remove(&bits) {
            Some(table) => table,
            None => set_membership(self.hits(sources, config, threshold)?),
        };
        Ok(&*self.membership.entry(bits).or_insert(table))
    }

    pub(super) fn mic(
        &mut self,
        sources: &Sources,
        config: &PipelineConfig,
    ) -> Result<&[MicRecord], ReconcileError> {
        let mics = match self.mic.take() {
            Some(mics) => mics,
            None => {
                let processed = self.processed(sources, config)?;
                determine_mic(&processed.records, config)
            }
        };
        Ok(self.mic.insert(mics).as_slice())
    }
}
