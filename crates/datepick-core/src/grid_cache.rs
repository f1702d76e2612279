//! Memoized month grids and month lists.
//!
//! Both maps are bounded and evict in insertion order (oldest first) once an
//! insert pushes them past capacity. Lookups never reorder entries.

use std::hash::Hash;
use std::sync::Arc;

use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::calendar_grid::{MonthGrid, build_month_grids, build_month_list};
use crate::date_util::month_key;

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GridKey {
    year: i32,
    month: u32,
    first_day_of_week: u8,
    view_count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MonthListKey {
    start: (i32, u32),
    end: (i32, u32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone)]
pub struct GridCache {
    grids: IndexMap<GridKey, Arc<[MonthGrid]>>,
    month_lists: IndexMap<MonthListKey, Arc<[NaiveDate]>>,
    capacity: usize,
    stats: CacheStats,
}

impl Default for GridCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl GridCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            grids: IndexMap::new(),
            month_lists: IndexMap::new(),
            capacity: capacity.max(1),
            stats: CacheStats::default(),
        }
    }

    /// `view_count` consecutive month grids starting at `month`'s month.
    pub fn month_grids(&mut self, month: NaiveDate, first_day_of_week: u8, view_count: u8) -> Arc<[MonthGrid]> {
        let (year, month_number) = month_key(month);
        let key = GridKey {
            year,
            month: month_number,
            first_day_of_week,
            view_count,
        };

        if let Some(grids) = self.grids.get(&key) {
            self.stats.hits += 1;
            trace!(?key, "grid cache hit");
            return Arc::clone(grids);
        }

        self.stats.misses += 1;
        let grids: Arc<[MonthGrid]> = build_month_grids(month, first_day_of_week, view_count).into();
        self.stats.inserts += 1;
        self.grids.insert(key, Arc::clone(&grids));
        self.stats.evictions += evict_oldest(&mut self.grids, self.capacity);
        grids
    }

    /// First-of-month dates from `start`'s month to `end`'s month inclusive.
    pub fn month_list(&mut self, start: NaiveDate, end: NaiveDate) -> Arc<[NaiveDate]> {
        let key = MonthListKey {
            start: month_key(start),
            end: month_key(end),
        };

        if let Some(months) = self.month_lists.get(&key) {
            self.stats.hits += 1;
            trace!(?key, "month list cache hit");
            return Arc::clone(months);
        }

        self.stats.misses += 1;
        let months: Arc<[NaiveDate]> = build_month_list(start, end).into();
        self.stats.inserts += 1;
        self.month_lists.insert(key, Arc::clone(&months));
        self.stats.evictions += evict_oldest(&mut self.month_lists, self.capacity);
        months
    }

    pub fn clear(&mut self) {
        debug!(
            grids = self.grids.len(),
            month_lists = self.month_lists.len(),
            "clearing grid cache"
        );
        self.grids.clear();
        self.month_lists.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn grid_entries(&self) -> usize {
        self.grids.len()
    }

    pub fn month_list_entries(&self) -> usize {
        self.month_lists.len()
    }
}

fn evict_oldest<K, V>(map: &mut IndexMap<K, V>, capacity: usize) -> u64
where
    K: Hash + Eq,
{
    let mut evicted = 0;
    while map.len() > capacity {
        map.shift_remove_index(0);
        evicted += 1;
    }
    if evicted > 0 {
        debug!(evicted, capacity, "evicted oldest cache entries");
    }
    evicted
}
