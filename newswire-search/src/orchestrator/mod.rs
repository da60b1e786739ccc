//! Search orchestrator: concurrent provider queries, merge, dedup, ordering.
//!
//! This module fans out a query to every enabled provider concurrently,
//! isolates per-provider failures, then merges the article lists:
//! invalid entries are dropped, duplicates removed by link and headline,
//! and the result ordered by publish time or left in provider order.

pub mod dedup;
pub mod merge;
pub mod ordering;
pub mod search;
pub mod url_normalize;
