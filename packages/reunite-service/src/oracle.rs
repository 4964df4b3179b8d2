use reunite_domain::{Embedding, SimilarityScore};
use reunite_providers::oracle;

use crate::BoxFuture;

pub trait SimilarityOracle
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		image_ref: &'a str,
	) -> BoxFuture<'a, reunite_providers::Result<Embedding>>;

	fn similarity<'a>(
		&'a self,
		a: &'a Embedding,
		b: &'a Embedding,
	) -> BoxFuture<'a, reunite_providers::Result<SimilarityScore>>;
}

/// The oracle reached over HTTP with the configured endpoints and deadlines.
pub struct HttpOracle {
	cfg: reunite_config::Oracle,
}
impl HttpOracle {
	pub fn new(cfg: reunite_config::Oracle) -> Self {
		Self { cfg }
	}
}

impl SimilarityOracle for HttpOracle {
	fn extract<'a>(
		&'a self,
		image_ref: &'a str,
	) -> BoxFuture<'a, reunite_providers::Result<Embedding>> {
		Box::pin(oracle::extract(&self.cfg, image_ref))
	}

	fn similarity<'a>(
		&'a self,
		a: &'a Embedding,
		b: &'a Embedding,
	) -> BoxFuture<'a, reunite_providers::Result<SimilarityScore>> {
		Box::pin(oracle::similarity(&self.cfg, a, b))
	}
}
