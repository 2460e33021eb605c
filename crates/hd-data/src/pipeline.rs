//! Memoized filter pipeline over the loaded rows

use std::sync::Arc;

use hd_core::{FilterSpec, Row, RowSource};
use tracing::trace;

use crate::cache::{CacheStats, FilterCache};

/// Row source that memoizes each distinct filter result
pub struct FilterPipeline {
    name: String,
    rows: Arc<[Row]>,
    cache: FilterCache,
}

impl FilterPipeline {
    pub fn new(name: impl Into<String>, rows: Arc<[Row]>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            rows,
            cache: FilterCache::new(capacity),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl RowSource for FilterPipeline {
    fn active_rows(&self, spec: &FilterSpec) -> Arc<[Row]> {
        if let Some(rows) = self.cache.get(spec) {
            return rows;
        }
        let rows: Arc<[Row]> = spec.apply(&self.rows).into();
        trace!(
            range = ?spec.range,
            departments = spec.departments.len(),
            hide_anomalies = spec.hide_anomalies,
            rows = rows.len(),
            "filtered rows"
        );
        self.cache.put(spec.clone(), rows.clone());
        rows
    }

    fn all_rows(&self) -> &[Row] {
        &self.rows
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
