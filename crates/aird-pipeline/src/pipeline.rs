// crates/aird-pipeline/src/pipeline.rs
// ============================================================================
// Module: Pipeline Orchestrator
// Description: The assess flow from connection to persisted report.
// Purpose: Wire discover, expand, run, report, and persist together.
// Dependencies: aird-core, aird-platform, aird-suites, aird-store-sqlite
// ============================================================================

//! ## Overview
//! [`Pipeline`] holds the three registries (platforms, suites,
//! requirements), built once at initialisation and shared read-only by
//! every run. `assess` validates the connection, loads context and
//! thresholds leniently, discovers the inventory with
//! args-over-context filter precedence, runs the suite, optionally runs the
//! survey, restricts data products, builds the report, persists it, and
//! stamps the previous assessment id for diffing. Dry runs return the
//! expansion preview without executing or persisting anything. Cancelled
//! runs surface the cancellation error and persist nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aird_core::CancellationToken;
use aird_core::DataProduct;
use aird_core::InventoryFilter;
use aird_core::Report;
use aird_core::ReportInputs;
use aird_core::RequirementRegistry;
use aird_core::RunOutcome;
use aird_core::Thresholds;
use aird_core::WorkloadLevel;
use aird_core::build_report;
use aird_core::fingerprint;
use aird_platform::PlatformRegistry;
use aird_store_sqlite::AssessmentFilter;
use aird_store_sqlite::HistoryStore;
use aird_suites::SuiteRegistry;

use crate::PipelineError;
use crate::audit::StoreAuditSink;
use crate::config::AssessConfig;
use crate::config::load_context;
use crate::config::load_threshold_overrides;
use crate::discovery::discover;
use crate::runner::ProgressFn;
use crate::runner::RunOptions;
use crate::runner::run_tests;
use crate::survey;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of one `assess` invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum AssessOutcome {
    /// Dry run: expansion preview, nothing executed or persisted.
    DryRun(RunOutcome),
    /// Full run: the built (and possibly persisted) report.
    Report(Box<Report>),
}

impl AssessOutcome {
    /// Returns the report for full runs.
    #[must_use]
    pub fn into_report(self) -> Option<Report> {
        match self {
            Self::DryRun(_) => None,
            Self::Report(report) => Some(*report),
        }
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Assessment pipeline with its shared registries.
///
/// # Invariants
/// - Registries are built once and never mutated afterwards; the pipeline
///   is safe to share across benchmark worker threads.
pub struct Pipeline {
    /// Scheme-to-adapter registry.
    platforms: PlatformRegistry,
    /// Declarative suite registry.
    suites: SuiteRegistry,
    /// Canonical requirement catalog.
    requirements: RequirementRegistry,
}

impl Pipeline {
    /// Creates a pipeline with the built-in registries.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when built-in suites fail to register.
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self {
            platforms: PlatformRegistry::with_builtin_adapters(),
            suites: SuiteRegistry::with_builtin_suites()?,
            requirements: RequirementRegistry::builtin(),
        })
    }

    /// Returns the platform registry.
    #[must_use]
    pub const fn platforms(&self) -> &PlatformRegistry {
        &self.platforms
    }

    /// Returns the suite registry.
    #[must_use]
    pub const fn suites(&self) -> &SuiteRegistry {
        &self.suites
    }

    /// Returns the requirement catalog.
    #[must_use]
    pub const fn requirements(&self) -> &RequirementRegistry {
        &self.requirements
    }

    /// Resolves thresholds for a run (defaults plus optional override file).
    #[must_use]
    pub fn thresholds_for(&self, config: &AssessConfig) -> Thresholds {
        let overrides = load_threshold_overrides(config.thresholds_path.as_deref());
        Thresholds::with_overrides(&self.requirements, &overrides)
    }

    /// Resolves the effective suite name (`auto` maps to the adapter
    /// default).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when the connection scheme is unknown.
    pub fn resolve_suite_name(
        &self,
        config: &AssessConfig,
        connection: &str,
    ) -> Result<String, PipelineError> {
        if config.suite == "auto" {
            Ok(self.platforms.default_suite(connection)?.to_string())
        } else {
            Ok(config.suite.clone())
        }
    }

    /// Runs the full assess pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] on usage errors, connection failure,
    /// cancellation, or persistence failure. Per-probe failures travel
    /// inside the report instead.
    pub fn assess(
        &self,
        config: &AssessConfig,
        progress: Option<&mut ProgressFn<'_>>,
        cancel: &CancellationToken,
    ) -> Result<AssessOutcome, PipelineError> {
        let connection_string =
            config.connection.as_deref().ok_or(PipelineError::MissingConnection)?;

        let context = load_context(config.context_path.as_deref());
        let thresholds = self.thresholds_for(config);

        // Explicit arguments take precedence over context scope.
        let (context_value, user_context) = match context {
            Some((typed, raw)) => (Some(typed), Some(raw)),
            None => (None, None),
        };
        let schemas = if config.schemas.is_empty() {
            context_value.as_ref().map(|ctx| ctx.schemas.clone()).unwrap_or_default()
        } else {
            config.schemas.clone()
        };
        let tables = if config.tables.is_empty() {
            context_value.as_ref().map(|ctx| ctx.tables.clone()).unwrap_or_default()
        } else {
            config.tables.clone()
        };
        let filter = InventoryFilter::new(schemas, tables);

        let entry = self.platforms.resolve(connection_string)?;
        let adapter_name = entry.name;
        cancel.check().map_err(PipelineError::Connection)?;
        let connection = self.platforms.connect(connection_string)?;
        cancel.check().map_err(PipelineError::Connection)?;
        let inventory = discover(connection.as_ref(), adapter_name, &filter)?;

        let suite_name = self.resolve_suite_name(config, connection_string)?;
        let tests = self.suites.resolve(&suite_name);

        let audit_sink = if config.audit {
            Some(StoreAuditSink::new(HistoryStore::open(&config.db_path)?))
        } else {
            None
        };
        let options = RunOptions {
            dry_run: config.dry_run,
            factor_filter: config.factor_filter,
            audit: audit_sink.as_ref().map(|sink| sink as &dyn aird_core::AuditSink),
            cancel: cancel.clone(),
        };
        let outcome = run_tests(
            connection.as_ref(),
            &tests,
            &inventory,
            &thresholds,
            &options,
            progress,
        )?;
        drop(connection);

        if config.dry_run {
            return Ok(AssessOutcome::DryRun(outcome));
        }

        let question_results = if config.survey {
            let answers = survey::load_answers(config.survey_answers_path.as_deref());
            Some(survey::run_survey(&survey::default_questions(), &answers))
        } else {
            None
        };

        let target_workload = config
            .target_workload
            .map(|level| level.short().to_string())
            .or_else(|| {
                context_value
                    .as_ref()
                    .and_then(|ctx| ctx.target_level.as_deref().and_then(WorkloadLevel::parse))
                    .map(|level| level.short().to_string())
            });

        let declared_products =
            context_value.as_ref().map(|ctx| ctx.data_products.clone()).unwrap_or_default();
        let (data_products, scoped_product) =
            select_products(declared_products, config.product.as_deref())?;

        let mut report = build_report(
            outcome.results,
            ReportInputs {
                inventory: Some(inventory),
                connection_fingerprint: fingerprint(connection_string),
                target_workload,
                data_products,
                question_results,
                user_context,
            },
        );

        if !config.no_save {
            let store = HistoryStore::open(&config.db_path)?;
            let payload = serde_json::to_value(&report)
                .map_err(|err| PipelineError::Invalid(err.to_string()))?;
            let assessment_id = store.save_assessment(&payload, scoped_product.as_deref())?;
            report.assessment_id = Some(assessment_id.clone());

            if config.compare {
                let previous = store.list_assessments(&AssessmentFilter {
                    fingerprint: Some(report.connection_fingerprint.clone()),
                    limit: Some(2),
                    ..AssessmentFilter::default()
                })?;
                report.diff_previous_id = previous
                    .into_iter()
                    .map(|summary| summary.id)
                    .find(|id| id != &assessment_id);
            }
        }

        Ok(AssessOutcome::Report(Box::new(report)))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies the product restriction to the declared product list.
///
/// With no restriction, every declared product gets a roll-up. A named
/// product restricts to that product; an unknown name fails listing the
/// declared names.
fn select_products(
    declared: Vec<DataProduct>,
    requested: Option<&str>,
) -> Result<(Vec<DataProduct>, Option<String>), PipelineError> {
    let Some(name) = requested else {
        return Ok((declared, None));
    };
    if declared.is_empty() {
        return Err(PipelineError::UnknownDataProduct {
            name: name.to_string(),
            available: "(none declared)".to_string(),
        });
    }
    let matched: Vec<DataProduct> =
        declared.iter().filter(|product| product.name == name).cloned().collect();
    if matched.is_empty() {
        let available: Vec<&str> =
            declared.iter().map(|product| product.name.as_str()).collect();
        return Err(PipelineError::UnknownDataProduct {
            name: name.to_string(),
            available: available.join(", "),
        });
    }
    Ok((matched, Some(name.to_string())))
}
