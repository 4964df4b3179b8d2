use serde::Serialize;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{ReuniteService, Result};
use reunite_domain::{MatchRecord, Population};

/// Which sides of a match ended up resolved after one reconcile attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
	pub missing_resolved: bool,
	pub unknown_resolved: bool,
}
impl ReconcileOutcome {
	pub fn is_complete(&self) -> bool {
		self.missing_resolved && self.unknown_resolved
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
	/// Matches returned by the store as needing follow-up.
	pub examined: usize,
	/// Matches whose both sides are resolved after the sweep.
	pub reconciled: usize,
	/// Notifications created by the sweep.
	pub notified: usize,
}

impl ReuniteService {
	/// Resolves both records referenced by `record`, starting with the `first` population.
	///
	/// The two updates are independent. A failed step is logged and does not undo the other one;
	/// the sweep picks the match up again later.
	pub async fn reconcile_pair(
		&self,
		record: &MatchRecord,
		first: Population,
	) -> ReconcileOutcome {
		let pair = record.pair();
		let mut outcome = ReconcileOutcome::default();

		for population in [first, first.complement()] {
			let person_id = pair.id_for(population);
			let matched_with = pair.id_for(population.complement());
			let resolved = self
				.store
				.resolve_person(population, person_id, matched_with, OffsetDateTime::now_utc())
				.await;
			let done = match resolved {
				Ok(Some(_)) => true,
				Ok(None) => {
					tracing::error!(
						match_id = %record.match_id,
						person_id = %person_id,
						population = %population,
						"Matched record does not exist."
					);

					false
				},
				Err(err) => {
					tracing::error!(
						error = %err,
						match_id = %record.match_id,
						person_id = %person_id,
						population = %population,
						"Failed to resolve matched record."
					);

					false
				},
			};

			match population {
				Population::Missing => outcome.missing_resolved = done,
				Population::Unknown => outcome.unknown_resolved = done,
			}
		}

		outcome
	}

	/// Completes matches left half-done by an interrupted or partially failed scan.
	///
	/// Only matches older than the configured grace period are considered so that scans still in
	/// progress are left alone. Reapplying resolution and fanout is safe: resolution converges and
	/// notifications are deduplicated.
	pub async fn sweep_once(&self) -> Result<SweepReport> {
		// A grace beyond the calendar's range leaves nothing old enough to sweep.
		let cutoff = OffsetDateTime::now_utc()
			.checked_sub(self.settings.sweep_grace)
			.unwrap_or_else(|| PrimitiveDateTime::MIN.assume_utc());
		let pending = self
			.store
			.list_matches_needing_reconcile(cutoff, self.settings.sweep_batch_size)
			.await?;
		let mut report = SweepReport { examined: pending.len(), ..Default::default() };

		for record in &pending {
			let outcome = self.reconcile_pair(record, Population::Missing).await;
			let fanout = self.fanout(record).await;

			if outcome.is_complete() {
				report.reconciled += 1;
			}

			report.notified += fanout.created;
		}

		if report.examined > 0 {
			tracing::info!(
				examined = report.examined,
				reconciled = report.reconciled,
				notified = report.notified,
				"Reconciliation sweep finished."
			);
		}

		Ok(report)
	}
}
