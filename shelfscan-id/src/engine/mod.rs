//! Book identification engine
//!
//! Runs the phase list over a shelf. Each phase dispatches every unresolved
//! spine against the catalogue, reconciles the results, and optionally tries
//! to heal spines that OCR broke apart. Phases run strictly in order; all
//! concurrency lives inside a single dispatch.

pub mod dispatch;
pub mod healing;
pub mod permutations;
pub mod phase;
pub mod reconcile;
pub mod results;

pub use phase::{standard_phases, HealMode, Phase};
pub use results::{PhaseContext, SearchResult};

use crate::models::Shelf;
use crate::services::SearchClient;
use serde::Serialize;
use shelfscan_common::config::TomlConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Engine tuning, taken from the `[engine]` and `[search]` config sections
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Word-mangled healing is skipped above this many words
    pub mangle_word_limit: usize,
    /// Largest spine window for adjacent and permuted healing
    pub max_heal_window: usize,
    /// Candidate searches in flight per dispatch
    pub max_concurrent_queries: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&TomlConfig::default())
    }
}

impl From<&TomlConfig> for EngineSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            mangle_word_limit: config.engine.mangle_word_limit,
            max_heal_window: config.engine.max_heal_window,
            max_concurrent_queries: config.search.max_concurrent_queries,
        }
    }
}

/// Outcome of one phase
#[derive(Debug, Clone, Serialize)]
pub struct PhaseSummary {
    pub phase: Phase,
    /// Spines resolved by this phase, healing included
    pub resolved: usize,
    pub elapsed: Duration,
}

/// Identifies the books on a shelf against a catalogue
pub struct IdentificationEngine {
    client: Arc<SearchClient>,
    settings: EngineSettings,
    phases: Vec<Phase>,
}

impl IdentificationEngine {
    /// Engine running the standard phase list
    pub fn new(client: Arc<SearchClient>, settings: EngineSettings) -> Self {
        Self::with_phases(client, settings, standard_phases())
    }

    pub fn with_phases(
        client: Arc<SearchClient>,
        settings: EngineSettings,
        phases: Vec<Phase>,
    ) -> Self {
        Self {
            client,
            settings,
            phases,
        }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Run every phase over `shelf` and return the final state
    pub async fn identify_books(&self, shelf: Shelf) -> Shelf {
        let (shelf, _) = self.identify_books_with_summary(shelf).await;
        shelf
    }

    /// As [`identify_books`](Self::identify_books), also returning per-phase outcomes
    pub async fn identify_books_with_summary(
        &self,
        mut shelf: Shelf,
    ) -> (Shelf, Vec<PhaseSummary>) {
        let run_start = Instant::now();
        let mut summaries = Vec::with_capacity(self.phases.len());

        info!(
            spines = shelf.len(),
            fragments = shelf.fragments.len(),
            phases = self.phases.len(),
            "Starting identification"
        );

        for phase in &self.phases {
            let start = Instant::now();
            let resolved = self.run_phase(&mut shelf, phase).await;
            let elapsed = start.elapsed();

            info!(
                phase = %phase,
                resolved,
                total_resolved = shelf.resolved_count(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Phase complete"
            );

            summaries.push(PhaseSummary {
                phase: *phase,
                resolved,
                elapsed,
            });
        }

        info!(
            resolved = shelf.resolved_count(),
            spines = shelf.len(),
            backend_calls = self.client.backend_calls(),
            elapsed_ms = run_start.elapsed().as_millis() as u64,
            "All phases complete"
        );

        for fragment in shelf.leftover_fragments() {
            info!("LEFTOVER: spine {} {}", fragment.spine_index, fragment.text);
        }

        for spine in &shelf.spines {
            if let (Some(author), Some(title)) = (&spine.author, &spine.title) {
                info!("RESULT: {} - {}", author, title);
            }
        }

        (shelf, summaries)
    }

    /// Direct search, reconcile, then healing. Returns spines resolved.
    async fn run_phase(&self, shelf: &mut Shelf, phase: &Phase) -> usize {
        debug!(phase = %phase, spines = ?shelf.spines, "Spines at start of phase");

        let ctx = PhaseContext::new();
        let len = shelf.len();
        dispatch::search_spines(
            &self.client,
            shelf,
            phase,
            0,
            len,
            &ctx,
            self.settings.max_concurrent_queries,
        )
        .await;

        let mut resolved = reconcile::process_search_results(shelf, ctx.take_results().await);

        if phase.heal != HealMode::None {
            resolved += self.heal_broken_spines(shelf, phase).await;
        }

        resolved
    }
}
