use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{CoreResult, StatusError};
use crate::status::classifier::{parse_birth_date, parse_event_date};
use crate::status::{classify, AnimalSnapshot, Classification, HerdRepository, Sex};

/// What caused a reclassification pass. Only used for logging.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusTrigger {
    Registration,
    Breeding,
    Calving,
    Login,
    Scheduled,
    Manual,
}

impl StatusTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTrigger::Registration => "registration",
            StatusTrigger::Breeding => "breeding",
            StatusTrigger::Calving => "calving",
            StatusTrigger::Login => "login",
            StatusTrigger::Scheduled => "scheduled",
            StatusTrigger::Manual => "manual",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Unchanged(Classification),
    Updated {
        previous_category: Option<String>,
        previous_status: Option<String>,
        current: Classification,
    },
    /// Data problem on this animal; nothing was written.
    Skipped(StatusError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

/// Applies the status rules to stored animals and writes back changes.
#[derive(Clone)]
pub struct StatusService<R> {
    repo: R,
}

impl<R: HerdRepository> StatusService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    async fn derive(
        &self,
        animal: &AnimalSnapshot,
        today: NaiveDate,
    ) -> CoreResult<Result<Classification, StatusError>> {
        let sex: Sex = match animal.sex.parse() {
            Ok(sex) => sex,
            Err(err) => return Ok(Err(err)),
        };
        let birth_date = match parse_birth_date(animal.birth_date.as_deref()) {
            Ok(date) => date,
            Err(err) => return Ok(Err(err)),
        };

        if sex == Sex::Male {
            return Ok(Ok(classify(sex, birth_date, None, None, today)));
        }

        let bred = match self.repo.latest_breeding(animal.id).await? {
            Some(b) => match parse_event_date("breeding", &b.breeding_date) {
                Ok(date) => Some(date),
                Err(err) => return Ok(Err(err)),
            },
            None => None,
        };
        let calved = match self.repo.latest_calving(&animal.tag_number).await? {
            Some(c) => match parse_event_date("calving", &c.birth_date) {
                Ok(date) => Some(date),
                Err(err) => return Ok(Err(err)),
            },
            None => None,
        };

        Ok(Ok(classify(sex, birth_date, bred, calved, today)))
    }

    /// Reclassify one animal, writing only when the stored pair differs.
    pub async fn reclassify(&self, animal: &AnimalSnapshot, today: NaiveDate) -> CoreResult<Outcome> {
        let classification = match self.derive(animal, today).await? {
            Ok(c) => c,
            Err(err) => {
                warn!(
                    "Skipping status update for {} ({}): {}",
                    animal.tag_number, animal.id, err
                );
                return Ok(Outcome::Skipped(err));
            }
        };

        if classification.matches(animal.status_category.as_deref(), animal.status.as_deref()) {
            return Ok(Outcome::Unchanged(classification));
        }

        let changed = self
            .repo
            .write_status(
                animal.id,
                classification.category.as_str(),
                classification.status.as_str(),
            )
            .await?;
        if !changed {
            // Another pass already wrote the same pair.
            return Ok(Outcome::Unchanged(classification));
        }

        info!(
            "Status update {} - {}: {}/{} -> {}",
            animal.tag_number,
            animal.name.as_deref().unwrap_or("Unnamed"),
            animal.status_category.as_deref().unwrap_or("none"),
            animal.status.as_deref().unwrap_or("none"),
            classification
        );

        Ok(Outcome::Updated {
            previous_category: animal.status_category.clone(),
            previous_status: animal.status.clone(),
            current: classification,
        })
    }

    /// Reclassify the whole herd. Data errors skip single animals; storage
    /// errors abort the sweep and are returned.
    pub async fn sweep(&self, today: NaiveDate) -> CoreResult<SweepReport> {
        let animals = self.repo.read_all_animals().await?;
        let mut report = SweepReport::default();

        for animal in &animals {
            report.examined += 1;
            match self.reclassify(animal, today).await? {
                Outcome::Updated { .. } => report.updated += 1,
                Outcome::Unchanged(_) => report.unchanged += 1,
                Outcome::Skipped(_) => report.skipped += 1,
            }
        }

        info!(
            "Status sweep for {}: examined {}, updated {}, unchanged {}, skipped {}",
            today, report.examined, report.updated, report.unchanged, report.skipped
        );
        Ok(report)
    }

    /// Inline sweep after a mutating action. Failures are logged and never
    /// propagate to the action that triggered it.
    pub async fn sweep_after(&self, trigger: StatusTrigger, today: NaiveDate) -> Option<SweepReport> {
        match self.sweep(today).await {
            Ok(report) => {
                debug!("Status sweep after {} finished", trigger.as_str());
                Some(report)
            }
            Err(err) => {
                warn!("Status sweep after {} failed: {}", trigger.as_str(), err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;
    use crate::status::{CattleStatus, InMemoryHerd, StatusCategory};
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn service() -> (Arc<InMemoryHerd>, StatusService<Arc<InMemoryHerd>>) {
        let herd = Arc::new(InMemoryHerd::new());
        (herd.clone(), StatusService::new(herd))
    }

    #[tokio::test]
    async fn second_sweep_writes_nothing() {
        let (herd, service) = service();
        let cow = herd.add_animal("TNF0001/01/2021", "F", Some("2021-01-05"));
        herd.add_breeding(cow, "2024-01-10");
        herd.add_calving("TNF0001/01/2021", "2023-06-01");
        herd.add_animal("TNF0002/01/2022", "M", Some("2022-01-05"));

        let today = date("2024-07-01");
        let first = service.sweep(today).await.unwrap();
        assert_eq!(first.updated, 2);
        let writes = herd.write_count();

        let second = service.sweep(today).await.unwrap();
        assert_eq!(second.updated, 0);
        assert_eq!(second.unchanged, 2);
        assert_eq!(herd.write_count(), writes);

        let stored = herd.animal(cow).unwrap();
        assert_eq!(stored.status_category.as_deref(), Some("mature_stock"));
        assert_eq!(stored.status.as_deref(), Some("lactating in_calf"));
    }

    #[tokio::test]
    async fn write_lost_to_concurrent_sweep_counts_as_unchanged() {
        let (herd, service) = service();
        let bull = herd.add_animal("B1", "M", Some("2020-01-01"));
        let snapshot = herd.animal(bull).unwrap();

        // Another pass stores the same pair after our snapshot was read.
        herd.set_status(bull, "bull", "mature bull");

        let outcome = service
            .reclassify(&snapshot, date("2024-07-01"))
            .await
            .unwrap();
        match outcome {
            Outcome::Unchanged(current) => {
                assert_eq!(current.category, StatusCategory::Bull);
                assert_eq!(current.status, CattleStatus::MatureBull);
            }
            other => panic!("expected unchanged, got {:?}", other),
        }
        assert_eq!(herd.write_count(), 0);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn sweep_summary_is_logged_at_info() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .without_time()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (herd, service) = service();
        let bull = herd.add_animal("B1", "M", Some("2020-01-01"));
        herd.set_status(bull, "bull", "mature bull");

        let report = service
            .sweep_after(StatusTrigger::Login, date("2024-07-01"))
            .await
            .unwrap();
        assert_eq!(report.updated, 0);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Status sweep for 2024-07-01: examined 1, updated 0"));
    }

    #[tokio::test]
    async fn bad_birth_date_is_skipped_and_sweep_continues() {
        let (herd, service) = service();
        let broken = herd.add_animal("TNF0001/01/2021", "F", Some("05/01/2021"));
        let missing = herd.add_animal("TNF0002/01/2021", "F", None);
        let fine = herd.add_animal("TNF0003/01/2021", "M", Some("2021-01-05"));

        let report = service.sweep(date("2024-07-01")).await.unwrap();
        assert_eq!(report.examined, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(herd.animal(broken).unwrap().status, None);
        assert_eq!(herd.animal(missing).unwrap().status, None);
        assert_eq!(herd.animal(fine).unwrap().status.as_deref(), Some("mature bull"));
    }

    #[tokio::test]
    async fn malformed_event_date_skips_the_animal() {
        let (herd, service) = service();
        let cow = herd.add_animal("C1", "F", Some("2020-01-01"));
        herd.set_status(cow, "mature_stock", "lactating");
        herd.add_breeding(cow, "sometime in May");

        let outcome = service
            .reclassify(&herd.animal(cow).unwrap(), date("2024-07-01"))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Skipped(StatusError::InvalidEventDate { event: "breeding", .. })
        ));
        assert_eq!(herd.animal(cow).unwrap().status.as_deref(), Some("lactating"));
    }

    #[tokio::test]
    async fn unknown_sex_keeps_manual_status() {
        let (herd, service) = service();
        let animal = herd.add_animal("X1", "?", Some("2020-01-01"));
        herd.set_status(animal, "mature_stock", "dry cow");

        let report = service.sweep(date("2024-07-01")).await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(herd.animal(animal).unwrap().status.as_deref(), Some("dry cow"));
    }

    #[tokio::test]
    async fn storage_failure_surfaces_from_sweep() {
        let (herd, service) = service();
        herd.add_animal("B1", "M", Some("2020-01-01"));
        herd.fail_writes(true);

        let err = service.sweep(date("2024-07-01")).await.unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn inline_sweep_swallows_storage_failure() {
        let (herd, service) = service();
        herd.add_animal("B1", "M", Some("2020-01-01"));
        herd.fail_writes(true);

        let report = service
            .sweep_after(StatusTrigger::Breeding, date("2024-07-01"))
            .await;
        assert!(report.is_none());
    }

    #[tokio::test]
    async fn manual_override_stands_until_rule_recomputes() {
        let (herd, service) = service();
        let heifer = herd.add_animal("H1", "F", Some("2023-01-01"));
        let today = date("2024-07-01");

        service.sweep(today).await.unwrap();
        assert_eq!(
            herd.animal(heifer).unwrap().status.as_deref(),
            Some("bullying heifer")
        );

        herd.add_breeding(heifer, "2024-06-20");
        let outcome = service
            .reclassify(&herd.animal(heifer).unwrap(), today)
            .await
            .unwrap();
        match outcome {
            Outcome::Updated {
                previous_status,
                current,
                ..
            } => {
                assert_eq!(previous_status.as_deref(), Some("bullying heifer"));
                assert_eq!(current.category, StatusCategory::YoungStock);
                assert_eq!(current.status, CattleStatus::InCalfHeifer);
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn males_never_read_events() {
        let (herd, service) = service();
        let bull = herd.add_animal("B1", "M", Some("2024-05-01"));
        herd.add_breeding(bull, "not a date");

        let outcome = service
            .reclassify(&herd.animal(bull).unwrap(), date("2024-07-01"))
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Updated { .. }));
        assert_eq!(herd.animal(bull).unwrap().status.as_deref(), Some("newborn calf"));
    }
}
