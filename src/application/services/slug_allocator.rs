//! Slug collision resolution.

use std::sync::Arc;

use crate::domain::entities::{FinalizedSlug, SlugAvailability, SlugCandidate, SlugOrigin};
use crate::domain::repositories::SlugRepository;
use crate::error::AppError;

/// Default bound on suffixed candidates probed before giving up.
pub const DEFAULT_MAX_PROBES: usize = 100;

/// Picks the slug a new link will be written under.
///
/// The storage collaborator's existence check is the single source of truth.
/// Probing is sequential and holds no lock: two concurrent allocations for the
/// same base can both see the same free candidate, and the loser gets
/// [`AppError::SlugConflict`] from the write. Nothing here retries on its own.
pub struct SlugAllocator {
    repository: Arc<dyn SlugRepository>,
    max_probes: usize,
}

impl SlugAllocator {
    pub fn new(repository: Arc<dyn SlugRepository>) -> Self {
        Self::with_max_probes(repository, DEFAULT_MAX_PROBES)
    }

    pub fn with_max_probes(repository: Arc<dyn SlugRepository>, max_probes: usize) -> Self {
        Self {
            repository,
            max_probes: max_probes.max(1),
        }
    }

    pub fn max_probes(&self) -> usize {
        self.max_probes
    }

    /// Decides the final slug for a new link.
    ///
    /// - No `desired` slug: the generator's token is used as-is with no
    ///   existence check. A collision surfaces at write time as a conflict.
    /// - `desired` is free: it is used unchanged.
    /// - `desired` is taken: the first free of `desired-1`, `desired-2`, ...
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SlugExhausted`] if every suffixed candidate up to
    /// the probe limit is taken.
    ///
    /// Propagates storage errors from the existence check unchanged.
    pub async fn allocate<G>(
        &self,
        desired: Option<&str>,
        generator: G,
    ) -> Result<FinalizedSlug, AppError>
    where
        G: FnOnce() -> String,
    {
        match desired {
            None => Ok(FinalizedSlug::new(generator(), SlugOrigin::Generated, 0)),
            Some(base) => self.resolve(base).await,
        }
    }

    /// Returns `base` if it is free, otherwise the first free suffixed variant.
    ///
    /// Deterministic: against the same storage state the same candidates are
    /// probed in the same order.
    pub async fn generate_unique_slug(&self, base: &str) -> Result<String, AppError> {
        self.resolve(base).await.map(|slug| slug.value)
    }

    /// Probes a single candidate.
    pub async fn check(&self, candidate: &str) -> Result<SlugAvailability, AppError> {
        metrics::counter!("slug_probes_total").increment(1);

        if self.repository.exists_slug(candidate).await? {
            Ok(SlugAvailability::Taken)
        } else {
            Ok(SlugAvailability::Available)
        }
    }

    async fn resolve(&self, base: &str) -> Result<FinalizedSlug, AppError> {
        if self.check(base).await? == SlugAvailability::Available {
            return Ok(FinalizedSlug::new(base, SlugOrigin::Requested, 1));
        }

        let mut probes = 1;
        for candidate in SlugCandidate::suffixed(base).take(self.max_probes) {
            probes += 1;
            if self.check(&candidate).await? == SlugAvailability::Available {
                tracing::info!(base, slug = %candidate, probes, "Derived alternative slug");
                return Ok(FinalizedSlug::new(candidate, SlugOrigin::Derived, probes));
            }
        }

        tracing::warn!(base, probes, "Slug candidates exhausted");
        Err(AppError::SlugExhausted {
            base: base.to_string(),
            probes,
        })
    }
}
