/// Counters of a run, threaded explicitly through every store mutation.
///
/// Recomputed from the files whenever a store is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlState {
    pub total_articles: usize,
    pub processed_articles: usize,
    pub batch_size: usize,
}

impl CrawlState {
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            total_articles: 0,
            processed_articles: 0,
            batch_size: batch_size.max(1),
        }
    }

    /// Index of the batch the next record goes to.
    #[must_use]
    pub fn current_batch(&self) -> usize {
        self.processed_articles / self.batch_size
    }

    /// Whether the next record is the first of a new batch file.
    #[must_use]
    pub fn at_batch_boundary(&self) -> bool {
        self.processed_articles % self.batch_size == 0
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total_articles.saturating_sub(self.processed_articles)
    }
}
