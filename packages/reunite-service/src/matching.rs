//! Scanning the complementary population for a newly ingested record.

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::task::JoinSet;

use crate::{ReuniteService, Result, SimilarityOracle};
use reunite_domain::{Embedding, MatchPair, MatchPolicy, MatchRecord, PersonRecord, SimilarityScore};

/// Counters for one scan. A scan never fails as a whole; problems show up here and in the logs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
	/// Active, embedded records in the complementary population.
	pub candidates: usize,
	/// Candidates the oracle returned a score for.
	pub scored: usize,
	/// Candidates skipped because scoring or match creation failed.
	pub failed: usize,
	/// Match records created by this scan.
	pub matched: usize,
	/// Qualifying pairs that already had a match record.
	pub duplicates: usize,
}

type Scored = (PersonRecord, reunite_providers::Result<SimilarityScore>);

impl ReuniteService {
	/// Scores `subject` against every active, embedded record of the other population and turns
	/// qualifying pairs into matches.
	///
	/// Each created match is reconciled and fanned out before the next pair is handled. Under
	/// `all_qualifying` a pair is handled as soon as its score arrives; under `best_only` every
	/// candidate is scored first.
	pub async fn scan(&self, subject: &PersonRecord) -> ScanReport {
		let mut report = ScanReport::default();
		let Some(embedding) = subject.embedding.as_embedding() else {
			tracing::debug!(
				person_id = %subject.person_id,
				"Skipping scan for record without embedding."
			);

			return report;
		};

		if !subject.status.is_active() {
			tracing::debug!(person_id = %subject.person_id, "Skipping scan for resolved record.");

			return report;
		}

		let target = subject.population.complement();
		let candidates = match self.store.list_scan_candidates(target).await {
			Ok(candidates) => candidates,
			Err(err) => {
				tracing::error!(
					error = %err,
					person_id = %subject.person_id,
					"Failed to load scan candidates."
				);

				return report;
			},
		};
		let candidates: Vec<_> =
			candidates.into_iter().filter(PersonRecord::is_scannable).collect();

		report.candidates = candidates.len();

		let limit = self.settings.candidate_concurrency.max(1);
		let mut pending = candidates.into_iter();
		let mut in_flight = JoinSet::new();
		let mut best: Vec<(PersonRecord, SimilarityScore)> = Vec::new();

		loop {
			while in_flight.len() < limit {
				let Some(candidate) = pending.next() else {
					break;
				};

				in_flight.spawn(score_candidate(self.oracle.clone(), embedding.clone(), candidate));
			}

			let Some(joined) = in_flight.join_next().await else {
				break;
			};
			let (candidate, outcome) = match joined {
				Ok(scored) => scored,
				Err(err) => {
					tracing::error!(
						error = %err,
						person_id = %subject.person_id,
						"Scoring task failed."
					);

					report.failed += 1;

					continue;
				},
			};
			let score = match outcome {
				Ok(score) => score,
				Err(err) => {
					tracing::warn!(
						error = %err,
						person_id = %subject.person_id,
						candidate_id = %candidate.person_id,
						"Similarity call failed. Skipping candidate."
					);

					report.failed += 1;

					continue;
				},
			};

			report.scored += 1;

			tracing::debug!(
				person_id = %subject.person_id,
				candidate_id = %candidate.person_id,
				similarity = score.value(),
				"Scored candidate."
			);

			match self.settings.policy {
				MatchPolicy::AllQualifying =>
					if score.qualifies() {
						self.handle_pair(subject, &candidate, score, &mut report).await;
					},
				MatchPolicy::BestOnly => best.push((candidate, score)),
			}
		}

		// Scores arrive in completion order. Restore candidate order so ties resolve the same way
		// regardless of concurrency.
		best.sort_by_key(|(candidate, _)| (candidate.created_at, candidate.person_id));

		for (candidate, score) in self.settings.policy.select_qualifying(best) {
			self.handle_pair(subject, &candidate, score, &mut report).await;
		}

		tracing::info!(
			person_id = %subject.person_id,
			population = %subject.population,
			candidates = report.candidates,
			scored = report.scored,
			failed = report.failed,
			matched = report.matched,
			duplicates = report.duplicates,
			"Scan finished."
		);

		report
	}

	/// Creates the match for one qualifying pair, then reconciles and fans it out.
	async fn handle_pair(
		&self,
		subject: &PersonRecord,
		candidate: &PersonRecord,
		score: SimilarityScore,
		report: &mut ScanReport,
	) {
		let pair = MatchPair::from_scan(subject.population, subject.person_id, candidate.person_id);

		match self.create_match(pair, score).await {
			Ok(Some(record)) => {
				report.matched += 1;

				tracing::info!(
					match_id = %record.match_id,
					missing_id = %record.missing_id,
					unknown_id = %record.unknown_id,
					similarity = record.similarity.value(),
					confidence = record.confidence.as_str(),
					"Match created."
				);

				self.reconcile_pair(&record, subject.population).await;
				self.fanout(&record).await;
			},
			Ok(None) => {
				report.duplicates += 1;

				tracing::debug!(
					missing_id = %pair.missing_id,
					unknown_id = %pair.unknown_id,
					"Match already exists for pair."
				);
			},
			Err(err) => {
				report.failed += 1;

				tracing::error!(
					error = %err,
					missing_id = %pair.missing_id,
					unknown_id = %pair.unknown_id,
					"Failed to create match."
				);
			},
		}
	}

	/// `Ok(None)` means another scan already created this pair, which is the normal outcome of
	/// overlapping scans.
	pub async fn create_match(
		&self,
		pair: MatchPair,
		score: SimilarityScore,
	) -> Result<Option<MatchRecord>> {
		let record = MatchRecord::pending(pair, score, OffsetDateTime::now_utc());

		self.store.insert_match(&record).await
	}
}

async fn score_candidate(
	oracle: Arc<dyn SimilarityOracle>,
	subject: Embedding,
	candidate: PersonRecord,
) -> Scored {
	let outcome = match candidate.embedding.as_embedding() {
		Some(other) => oracle.similarity(&subject, other).await,
		None => Err(reunite_providers::Error::InvalidResponse {
			message: "Candidate has no embedding.".to_string(),
		}),
	};

	(candidate, outcome)
}
