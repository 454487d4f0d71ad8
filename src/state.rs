use std::sync::Arc;

use chrono::{Local, NaiveDate};
use maintcal_core::MemoryStore;
use maintcal_core::config::MaintCalConfig;
use maintcal_core::ics::FeedMetadata;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<MemoryStore>,
    feed: Arc<FeedMetadata>,
    // Pinned "today" for tests; None means the local calendar date
    today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(store: MemoryStore, config: &MaintCalConfig) -> Self {
        AppState {
            store: Arc::new(store),
            feed: Arc::new(FeedMetadata {
                calendar_name: config.feed_calendar_name.clone(),
                uid_domain: config.feed_uid_domain.clone(),
            }),
            today: None,
        }
    }

    #[cfg(test)]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn feed(&self) -> &FeedMetadata {
        &self.feed
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}
