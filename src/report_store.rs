/* Community reports.

A report is created by a user, then confirmed or denied by others. It is
hard-deleted (no tombstone) when it collects `DENIAL_THRESHOLD` denials or once
it is older than the expiry window. Expiry is lazy: queries filter expired
reports out, and they are dropped from durable storage on the next write.

Every mutation writes the whole live set through the injected
`ReportPersistence` before returning. When the backend fails the store keeps
working in memory and remembers the failure until a later write succeeds.
*/
use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::report::{Report, ReportRecord, ReportType};

/// Reads and writes the whole report set at once.
pub trait ReportPersistence {
    fn load(&mut self) -> Result<Vec<ReportRecord>>;
    fn save(&mut self, records: &[ReportRecord]) -> Result<()>;
}

impl<T: ReportPersistence + ?Sized> ReportPersistence for Box<T> {
    fn load(&mut self) -> Result<Vec<ReportRecord>> {
        (**self).load()
    }

    fn save(&mut self, records: &[ReportRecord]) -> Result<()> {
        (**self).save(records)
    }
}

#[derive(Default)]
pub struct MemoryPersistence {
    records: Vec<ReportRecord>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        MemoryPersistence::default()
    }

    pub fn with_records(records: Vec<ReportRecord>) -> Self {
        MemoryPersistence { records }
    }

    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }
}

impl ReportPersistence for MemoryPersistence {
    fn load(&mut self) -> Result<Vec<ReportRecord>> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[ReportRecord]) -> Result<()> {
        self.records = records.to_vec();
        Ok(())
    }
}

/// Stands in for a backend that could not be opened at all. Every call fails
/// so the store reports itself as running in memory.
pub struct UnavailablePersistence {
    reason: String,
}

impl UnavailablePersistence {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailablePersistence {
            reason: reason.into(),
        }
    }
}

impl ReportPersistence for UnavailablePersistence {
    fn load(&mut self) -> Result<Vec<ReportRecord>> {
        bail!("{}", self.reason)
    }

    fn save(&mut self, _records: &[ReportRecord]) -> Result<()> {
        bail!("{}", self.reason)
    }
}

pub struct ReportStore<P: ReportPersistence> {
    persistence: P,
    reports: Vec<Report>,
    storage_error: Option<Error>,
}

// Stored timestamps have millisecond precision, keep the in-memory copy equal.
fn truncate_to_millis(t: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(t.timestamp_millis()).unwrap_or(t)
}

impl<P: ReportPersistence> ReportStore<P> {
    pub fn open(mut persistence: P) -> Self {
        let (reports, storage_error) = match persistence.load() {
            Ok(records) => {
                let mut reports = Vec::with_capacity(records.len());
                for record in records {
                    let id = record.id.clone();
                    match Report::of_record(record) {
                        Ok(report) => reports.push(report),
                        Err(error) => warn!("[report_store] dropping report {}: {}", id, error),
                    }
                }
                (reports, None)
            }
            Err(error) => {
                let error = Error::storage(error);
                warn!("[report_store] starting empty: {}", error);
                (Vec::new(), Some(error))
            }
        };
        debug!("[report_store] opened with {} reports", reports.len());
        ReportStore {
            persistence,
            reports,
            storage_error,
        }
    }

    pub fn storage_healthy(&self) -> bool {
        self.storage_error.is_none()
    }

    pub fn storage_error(&self) -> Option<&Error> {
        self.storage_error.as_ref()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    fn persist(&mut self, now: DateTime<Utc>) {
        // lazy purge: expired reports leave durable storage on the next write
        let before = self.reports.len();
        self.reports.retain(|r| r.is_live(now));
        if self.reports.len() != before {
            debug!(
                "[report_store] purged {} expired reports",
                before - self.reports.len()
            );
        }

        let records: Vec<ReportRecord> = self.reports.iter().map(Report::to_record).collect();
        match self.persistence.save(&records) {
            Ok(()) => {
                if self.storage_error.take().is_some() {
                    info!("[report_store] storage recovered");
                }
            }
            Err(error) => {
                let error = Error::storage(error);
                warn!(
                    "[report_store] keeping {} reports in memory only: {}",
                    records.len(),
                    error
                );
                self.storage_error = Some(error);
            }
        }
    }

    fn find_live_mut(&mut self, id: &str, now: DateTime<Utc>) -> Option<&mut Report> {
        self.reports
            .iter_mut()
            .find(|r| r.id == id && r.is_live(now))
    }

    pub fn create(
        &mut self,
        report_type: ReportType,
        coordinates: (f64, f64),
        details: Option<String>,
    ) -> Report {
        self.create_at(report_type, coordinates, details, Utc::now())
    }

    pub fn create_at(
        &mut self,
        report_type: ReportType,
        coordinates: (f64, f64),
        details: Option<String>,
        now: DateTime<Utc>,
    ) -> Report {
        let report = Report {
            id: Uuid::new_v4().as_hyphenated().to_string(),
            report_type,
            coordinates,
            timestamp: truncate_to_millis(now),
            confirmations: 0,
            denials: 0,
            details: details.filter(|d| !d.trim().is_empty()),
        };
        info!(
            "[report_store] new {} report: id={}",
            report.report_type, report.id
        );
        self.reports.push(report.clone());
        self.persist(now);
        report
    }

    pub fn confirm(&mut self, id: &str) {
        self.confirm_at(id, Utc::now())
    }

    pub fn confirm_at(&mut self, id: &str, now: DateTime<Utc>) {
        match self.find_live_mut(id, now) {
            None => debug!("[report_store] confirm: no live report with id={}", id),
            Some(report) => {
                report.confirmations += 1;
                self.persist(now);
            }
        }
    }

    pub fn deny(&mut self, id: &str) {
        self.deny_at(id, Utc::now())
    }

    pub fn deny_at(&mut self, id: &str, now: DateTime<Utc>) {
        match self.find_live_mut(id, now) {
            None => debug!("[report_store] deny: no live report with id={}", id),
            Some(report) => {
                report.denials += 1;
                if report.is_denied() {
                    info!("[report_store] report {} removed after denials", id);
                }
                // `persist` drops it together with any expired ones
                self.persist(now);
            }
        }
    }

    pub fn load_live(&self) -> Vec<Report> {
        self.load_live_at(Utc::now())
    }

    pub fn load_live_at(&self, now: DateTime<Utc>) -> Vec<Report> {
        self.reports
            .iter()
            .filter(|r| r.is_live(now))
            .cloned()
            .collect()
    }
}
