use std::sync::RwLock;

use hirecast_core::YearMonth;
use hirecast_predictions::OrganizationHistory;

use super::{
    HistoryError, HistoryOptions, HistoryProvider, JobRecord, OrganizationPattern, group_histories,
    organization_history, organization_patterns,
};

/// In-memory record store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryHistoryProvider {
    records: RwLock<Vec<JobRecord>>,
    options: HistoryOptions,
}

impl InMemoryHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<JobRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            options: HistoryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: HistoryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn insert(&self, record: JobRecord) -> Result<(), HistoryError> {
        self.records
            .write()
            .map_err(|_| poisoned())?
            .push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<JobRecord>>, HistoryError> {
        self.records
            .read()
            .map_err(|_| poisoned())
    }
}

fn poisoned() -> HistoryError {
    HistoryError::Unavailable("in-memory record store poisoned".to_string())
}

impl HistoryProvider for InMemoryHistoryProvider {
    fn histories(&self, now: YearMonth) -> Result<Vec<OrganizationHistory>, HistoryError> {
        let records = self.read()?;
        Ok(group_histories(records.iter(), self.options.since(now), &self.options))
    }

    fn organization(
        &self,
        org_name: &str,
        now: YearMonth,
    ) -> Result<Option<OrganizationHistory>, HistoryError> {
        let records = self.read()?;
        Ok(organization_history(
            &records,
            org_name,
            self.options.since(now),
            &self.options,
        ))
    }

    fn organization_patterns(
        &self,
        now: YearMonth,
        limit: usize,
    ) -> Result<Vec<OrganizationPattern>, HistoryError> {
        let records = self.read()?;
        Ok(organization_patterns(
            &records,
            self.options.since(now),
            &self.options,
            limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, org: &str, year: i32, month: u32) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            org_name: Some(org.to_string()),
            title: format!("{org} opening"),
            apply_start_at: Some(Utc.with_ymd_and_hms(year, month, 10, 0, 0, 0).unwrap()),
            duties_text: None,
            hire_type: None,
        }
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn serves_grouped_histories() {
        let provider = InMemoryHistoryProvider::new();
        assert!(provider.is_empty());
        provider.insert(record("1", "Alpha", 2024, 3)).unwrap();
        provider.insert(record("2", "Alpha", 2025, 3)).unwrap();
        provider.insert(record("3", "Beta", 2025, 4)).unwrap();
        assert_eq!(provider.len(), 3);

        let histories = provider.histories(ym(2026, 1)).unwrap();
        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0].org_name, "Alpha");
    }

    #[test]
    fn organization_lookup_resolves_partial_names() {
        let provider = InMemoryHistoryProvider::with_records(vec![
            record("1", "Alpha", 2024, 3),
            record("2", "Alpha", 2025, 3),
            record("3", "Alpha Corp", 2025, 3),
            record("4", "Beta", 2025, 4),
            record("5", "한국전력공사", 2024, 3),
            record("6", "한국전력공사", 2025, 3),
        ]);
        let now = ym(2026, 1);

        let alpha = provider.organization("alpha", now).unwrap().unwrap();
        assert_eq!(alpha.org_name, "Alpha");
        assert_eq!(alpha.postings.len(), 2);

        let kepco = provider.organization("한국전력", now).unwrap().unwrap();
        assert_eq!(kepco.org_name, "한국전력공사");
        assert_eq!(kepco.postings.len(), 2);

        assert!(provider.organization("Beta", now).unwrap().is_none());
        assert!(provider.organization("Gamma", now).unwrap().is_none());
    }

    #[test]
    fn serves_organization_patterns() {
        let provider = InMemoryHistoryProvider::with_records(vec![
            record("1", "Alpha", 2024, 3),
            record("2", "Alpha", 2025, 3),
            record("3", "Beta", 2024, 1),
            record("4", "Beta", 2024, 5),
            record("5", "Beta", 2025, 1),
        ]);
        let patterns = provider.organization_patterns(ym(2026, 1), 1).unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].org_name, "Beta");
        assert_eq!(patterns[0].typical_months, vec![1, 5]);
    }

    #[test]
    fn poisoned_store_reports_unavailable() {
        let provider = std::sync::Arc::new(InMemoryHistoryProvider::new());
        let poisoner = provider.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.records.write().unwrap();
            panic!("poison the record store");
        })
        .join();

        assert!(matches!(
            provider.insert(record("1", "Alpha", 2024, 3)),
            Err(HistoryError::Unavailable(_))
        ));
        assert!(provider.histories(ym(2026, 1)).is_err());
    }

    #[test]
    fn lookback_is_configurable() {
        let provider = InMemoryHistoryProvider::with_records(vec![
            record("1", "Alpha", 2021, 3),
            record("2", "Alpha", 2025, 3),
        ])
        .with_options(HistoryOptions {
            lookback_years: 5,
            ..HistoryOptions::default()
        });
        assert_eq!(provider.histories(ym(2026, 1)).unwrap().len(), 1);

        let provider = InMemoryHistoryProvider::with_records(vec![
            record("1", "Alpha", 2021, 3),
            record("2", "Alpha", 2025, 3),
        ]);
        assert!(provider.histories(ym(2026, 1)).unwrap().is_empty());
    }
}
