//! Run statistics.

use std::fmt;

/// Tallies for one indexing run.
///
/// A hit is work avoided: a `304` on a tag listing or a release already in
/// the index. A miss is work done: a fresh tag listing or a metadata fetch
/// attempt, successful or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Packages fully processed.
    pub num_packages: usize,
    /// Cache hits.
    pub cache_hits: usize,
    /// Cache misses.
    pub cache_misses: usize,
}

impl RunStats {
    /// Count a hit.
    pub const fn record_hit(&mut self) {
        self.cache_hits += 1;
    }

    /// Count a miss.
    pub const fn record_miss(&mut self) {
        self.cache_misses += 1;
    }

    /// Count a processed package.
    pub const fn record_package(&mut self) {
        self.num_packages += 1;
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics:")?;
        writeln!(f, "\tNum packages:  {}", self.num_packages)?;
        writeln!(f, "\tCache[Hits]:   {}", self.cache_hits)?;
        write!(f, "\tCache[Misses]: {}", self.cache_misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_format() {
        let mut stats = RunStats::default();
        stats.record_package();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(
            stats.to_string(),
            "Statistics:\n\tNum packages:  1\n\tCache[Hits]:   2\n\tCache[Misses]: 1"
        );
    }
}
