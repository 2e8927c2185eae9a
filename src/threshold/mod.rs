//! # Threshold/Aggregation Layer
//!
//! Derives activity summaries from the processed table:
//!
//! - [`hit_table`]: substances below a relative-activity threshold,
//!   aggregated per organism.
//! - [`set_membership`]: the hits reshaped into a binary substance ×
//!   organism table for intersection plots.
//! - [`determine_mic`]: minimum inhibitory concentration per dilution
//!   series.
//!
//! Blanks, negative controls and rows of the blank-only dataset never
//! count as hits.

mod hits;
mod membership;
mod mic;


pub use hits::{hit_table, HitRecord};
pub use membership::{sanitize_column_name, set_membership, MembershipRow, MembershipTable};
pub use mic::{determine_mic, minimum_inhibitory_concentration, MicRecord};
