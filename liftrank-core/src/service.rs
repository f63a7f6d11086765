//! The single entry point of the presentation boundary.
//!
//! `RankingService` owns the snapshot and view caches and turns a
//! `(FilterCriteria, UserInput)` pair into an [`Assessment`]. It is
//! locale-agnostic; labels and rendering belong to the caller.

use serde::Serialize;
use std::sync::Arc;

use crate::cache::{Clock, SystemClock, TtlCache, ViewKey};
use crate::config::{ConfigError, LiftrankConfig};
use crate::data::schema::TOTAL_KG;
use crate::data::{CanonicalTable, DataError, SnapshotStore, SnapshotVersion};
use crate::domain::{Attribute, FilterCriteria, Lift, Outcome, PerLift, UserInput};
use crate::engine::{
    self, compare_to_group, distribution, percentile, weakest_and_strongest, Distribution,
    EngineError, FilteredView, GroupComparison, LiftExtremes,
};

/// Everything computed for one valid user input.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub snapshot_version: SnapshotVersion,
    pub criteria: FilterCriteria,
    pub input: UserInput,
    pub total: f64,
    /// Records in the filtered view.
    pub sample_size: usize,
    pub percentiles: PerLift<Outcome<f64>>,
    pub total_percentile: Outcome<f64>,
    pub distributions: PerLift<Outcome<Distribution>>,
    pub total_distribution: Outcome<Distribution>,
    pub comparison: Outcome<GroupComparison>,
    pub extremes: Outcome<LiftExtremes>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Assessment {
    /// Some lift was zero, negative or not a number. Nothing was computed.
    IncompleteInput { invalid: Vec<Lift> },
    Ranked(Report),
}

impl Assessment {
    pub fn report(&self) -> Option<&Report> {
        match self {
            Assessment::Ranked(report) => Some(report),
            Assessment::IncompleteInput { .. } => None,
        }
    }
}

enum TableSource {
    Store(SnapshotStore),
    Fixed(Arc<CanonicalTable>),
}

pub struct RankingService<C: Clock = SystemClock> {
    source: TableSource,
    config: LiftrankConfig,
    clock: C,
    snapshot: TtlCache<(), Arc<CanonicalTable>>,
    views: TtlCache<ViewKey, Arc<FilteredView>>,
    loaded_version: Option<SnapshotVersion>,
}

impl RankingService<SystemClock> {
    /// Serve the snapshot named in `config`, loaded lazily on first use.
    pub fn new(config: LiftrankConfig) -> Result<Self, ServiceError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> RankingService<C> {
    pub fn with_clock(config: LiftrankConfig, clock: C) -> Result<Self, ServiceError> {
        config.validate()?;
        let store = SnapshotStore::new(config.snapshot.path.clone());
        Ok(Self::build(TableSource::Store(store), config, clock))
    }

    /// Serve an in-memory table that never expires.
    pub fn from_table(
        table: CanonicalTable,
        config: LiftrankConfig,
        clock: C,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        Ok(Self::build(TableSource::Fixed(Arc::new(table)), config, clock))
    }

    fn build(source: TableSource, config: LiftrankConfig, clock: C) -> Self {
        let snapshot = TtlCache::new(config.snapshot.ttl(), 1);
        let views = TtlCache::new(config.views.ttl(), config.views.max_entries);
        Self {
            source,
            config,
            clock,
            snapshot,
            views,
            loaded_version: None,
        }
    }

    pub fn config(&self) -> &LiftrankConfig {
        &self.config
    }

    pub fn cached_views(&self) -> usize {
        self.views.len()
    }

    /// The canonical table, reloaded from disk once the cached load is stale.
    pub fn table(&mut self) -> Result<Arc<CanonicalTable>, ServiceError> {
        let store = match &self.source {
            TableSource::Fixed(table) => {
                let table = Arc::clone(table);
                self.note_version(table.version().clone());
                return Ok(table);
            }
            TableSource::Store(store) => store,
        };

        let now = self.clock.now();
        if let Some(table) = self.snapshot.get(&(), now) {
            return Ok(Arc::clone(table));
        }
        if self.snapshot.is_expired(&(), now) {
            tracing::warn!(path = %store.path().display(), "snapshot cache stale, reloading");
        }

        let table = Arc::new(store.load()?);
        self.snapshot.insert((), Arc::clone(&table), now);
        self.note_version(table.version().clone());
        Ok(table)
    }

    /// The filtered view for `criteria`, from cache when fresh.
    pub fn view(&mut self, criteria: &FilterCriteria) -> Result<Arc<FilteredView>, ServiceError> {
        let table = self.table()?;
        let key = ViewKey::new(table.version(), criteria)?;
        let now = self.clock.now();

        if let Some(view) = self.views.get(&key, now) {
            tracing::debug!(key = %key, "view cache hit");
            return Ok(Arc::clone(view));
        }

        tracing::debug!(key = %key, "view cache miss");
        let view = Arc::new(engine::filter(&table, criteria)?);
        self.views.insert(key, Arc::clone(&view), now);
        Ok(view)
    }

    /// Rank `input` against the records matching `criteria`.
    pub fn assess(
        &mut self,
        criteria: &FilterCriteria,
        input: &UserInput,
    ) -> Result<Assessment, ServiceError> {
        let invalid = input.invalid_lifts();
        if !invalid.is_empty() {
            tracing::debug!(?invalid, "incomplete input");
            return Ok(Assessment::IncompleteInput { invalid });
        }

        let snapshot_version = self.table()?.version().clone();
        let view = self.view(criteria)?;
        let buckets = self.config.engine.bucket_count;
        let total = input.total();

        let percentiles =
            PerLift::try_from_fn(|lift| percentile(&view, lift.column(), input.get(lift)))?;
        let distributions =
            PerLift::try_from_fn(|lift| distribution(&view, lift.column(), buckets))?;
        let total_percentile = percentile(&view, TOTAL_KG, total)?;
        let total_distribution = distribution(&view, TOTAL_KG, buckets)?;
        let comparison = compare_to_group(&view, total, self.config.engine.group_percentile)?;
        let extremes: Outcome<LiftExtremes> = ready_percentiles(&percentiles)
            .map(|values| weakest_and_strongest(&values))
            .into();

        Ok(Assessment::Ranked(Report {
            snapshot_version,
            criteria: criteria.clone(),
            input: *input,
            total,
            sample_size: view.height(),
            percentiles,
            total_percentile,
            distributions,
            total_distribution,
            comparison,
            extremes,
        }))
    }

    /// Distinct values of `attribute` in the current snapshot, most frequent
    /// first.
    pub fn distinct_values(&mut self, attribute: Attribute) -> Result<Vec<(String, usize)>, ServiceError> {
        let table = self.table()?;
        Ok(engine::distinct_values(&table, attribute)?)
    }

    fn note_version(&mut self, version: SnapshotVersion) {
        if self.loaded_version.as_ref() == Some(&version) {
            return;
        }
        if self.loaded_version.is_some() {
            tracing::info!(version = %version, "snapshot version changed, clearing view cache");
        }
        self.views.invalidate_all();
        self.loaded_version = Some(version);
    }
}

fn ready_percentiles(percentiles: &PerLift<Outcome<f64>>) -> Option<PerLift<f64>> {
    let value = |lift: Lift| percentiles.get(lift).as_ref().ready().copied();
    Some(PerLift {
        squat: value(Lift::Squat)?,
        bench: value(Lift::Bench)?,
        deadlift: value(Lift::Deadlift)?,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot encode view key: {0}")]
    ViewKey(#[from] serde_json::Error),
}
