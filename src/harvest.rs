use anyhow::Result;

use crate::config::{CompiledSelectors, HarvestConfig};
use crate::document::DocumentExtractor;
use crate::fetch::ContentFetcher;
use crate::listing::parse_listing;
use crate::models::{FailedCandidate, JobAdCandidate, JobAdRecord, RunSummary};
use crate::store::{Batch, Store};

/// What happened to a single candidate during a run.
#[derive(Debug, PartialEq)]
enum CandidateOutcome {
    Inserted,
    AlreadyPresent,
    Failed(String),
}

/// Runs one listing page through parse, dedup and document extraction.
pub struct Harvester<'a, 'd> {
    fetcher: &'a dyn ContentFetcher,
    documents: &'a DocumentExtractor<'d>,
    selectors: CompiledSelectors,
    dry_run: bool,
}

impl<'a, 'd> Harvester<'a, 'd> {
    pub fn new(
        fetcher: &'a dyn ContentFetcher,
        documents: &'a DocumentExtractor<'d>,
        config: &HarvestConfig,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            documents,
            selectors: config.selectors.compile()?,
            dry_run: config.dry_run,
        })
    }

    /// Harvest `location` into `store` as one transaction.
    ///
    /// Per-document failures are recorded in the summary. Any other error
    /// rolls the whole run back and is returned.
    pub fn run(&self, location: &str, store: &mut Store) -> Result<RunSummary> {
        log::info!("Processing input: {}", location);
        let batch = store.begin()?;

        let mut summary = match self.collect(location, &batch) {
            Ok(summary) => summary,
            Err(e) => {
                log::error!("Error processing input {}: {:#}", location, e);
                if let Err(rollback) = batch.rollback() {
                    log::error!("{:#}", rollback);
                }
                return Err(e);
            }
        };

        if self.dry_run {
            batch.rollback()?;
            log::info!("Dry run: rolled back {} new job ad(s)", summary.inserted.len());
        } else {
            batch.commit()?;
            summary.committed = true;
        }

        log::info!(
            "Run finished: found={} inserted={} already_present={} failed={} committed={}",
            summary.found,
            summary.inserted.len(),
            summary.skipped.len(),
            summary.failed.len(),
            summary.committed
        );
        Ok(summary)
    }

    fn collect(&self, location: &str, batch: &Batch) -> Result<RunSummary> {
        let page = self.fetcher.fetch(location)?;
        let listing = parse_listing(&page.content, &page.base, &self.selectors);

        let summary = RunSummary {
            location: location.to_string(),
            job_type: listing.job_type,
            found: listing.candidates.len(),
            ..Default::default()
        };

        listing
            .candidates
            .iter()
            .try_fold(summary, |mut summary, candidate| {
                let id = candidate.id.to_string();
                match self.process(candidate, batch)? {
                    CandidateOutcome::Inserted => summary.inserted.push(id),
                    CandidateOutcome::AlreadyPresent => summary.skipped.push(id),
                    CandidateOutcome::Failed(reason) => summary.failed.push(FailedCandidate {
                        id,
                        title: candidate.title.clone(),
                        reason,
                    }),
                }
                Ok(summary)
            })
    }

    fn process(&self, candidate: &JobAdCandidate, batch: &Batch) -> Result<CandidateOutcome> {
        let id = candidate.id.as_str();
        if batch.contains(id)? {
            log::info!("Job ad already in database: id={} outcome=skipped", id);
            return Ok(CandidateOutcome::AlreadyPresent);
        }

        log::info!("Processing new job ad: id={} title={}", id, candidate.title);
        let full_text = match self.documents.extract(&candidate.document_url) {
            Ok(full_text) => full_text,
            Err(e) => {
                log::error!("Error processing PDF for job {}: {} (stage=document outcome=failed)", id, e);
                return Ok(CandidateOutcome::Failed(e.to_string()));
            }
        };

        // A rejected insert only loses this record; the rest of the batch stays.
        match batch.insert(&JobAdRecord::from_candidate(candidate, full_text)) {
            Ok(()) => {
                log::info!("Inserted new job ad: id={} outcome=inserted", id);
                Ok(CandidateOutcome::Inserted)
            }
            Err(e) => {
                log::error!("Error storing job {}: {:#} (stage=store outcome=failed)", id, e);
                Ok(CandidateOutcome::Failed(format!("{:#}", e)))
            }
        }
    }
}
