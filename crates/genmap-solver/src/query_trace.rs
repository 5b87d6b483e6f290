//! Structured query tracing for registry and override entry points.
//!
//! Events use target `genmap::query_json` and are intended to be consumed with:
//! `GENMAP_LOG=genmap::query_json=trace GENMAP_LOG_FORMAT=json`.
//!
//! Environment:
//! - `GENMAP_QUERY_RUN_ID`: optional run identifier attached to every event.

use crate::descriptor::TypeKey;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "genmap::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| {
            std::env::var("GENMAP_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string())
        })
        .as_str()
}

#[inline]
pub(crate) fn register_start(query_id: u64, ty: TypeKey) {
    trace!(
        target: "genmap::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op = "register",
        type_key = ty.0
    );
}

#[inline]
pub(crate) fn register_end(query_id: u64, ty: TypeKey, ok: bool, cache_hit: bool) {
    trace!(
        target: "genmap::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op = "register",
        type_key = ty.0,
        ok,
        cache_hit
    );
}

#[inline]
pub(crate) fn relation_start(query_id: u64, op: &'static str, base: TypeKey, derived: TypeKey) {
    trace!(
        target: "genmap::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        base_type_key = base.0,
        derived_type_key = derived.0
    );
}

#[inline]
pub(crate) fn relation_end(query_id: u64, op: &'static str, ok: bool, result: bool) {
    trace!(
        target: "genmap::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        ok,
        result
    );
}
