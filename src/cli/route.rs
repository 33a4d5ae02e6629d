//! CLI route: run context that wires config, builder, diff engine and driver.

use crate::cli::parse::Cli;
use crate::config::{ConfigLoader, TreesyncConfig};
use crate::diff::{DiffEngine, DiffResult};
use crate::error::ApiError;
use crate::reconcile::{self, AutoApprove, Decision, DryRun, Interactive, ReconciliationDriver};
use crate::report;
use crate::tree::builder::{ChildErrorPolicy, SkippedEntry, Tree, TreeBuilder};
use crate::types::Digest;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

/// How planned actions get approved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    DryRun,
    AutoApprove,
    Interactive,
}

/// Runtime context for one comparison run
pub struct RunContext {
    config: TreesyncConfig,
    from: PathBuf,
    to: PathBuf,
    json: bool,
    show_trees: bool,
    driver: DriverKind,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    from: &'a Path,
    to: &'a Path,
    from_digest: Digest,
    to_digest: Digest,
    diff: &'a DiffResult,
    skipped_from: &'a [SkippedEntry],
    skipped_to: &'a [SkippedEntry],
    decision: &'a Decision,
}

impl RunContext {
    /// Load configuration and apply CLI overrides on top of it.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let (from, to) = cli.endpoints()?;
        let mut config = ConfigLoader::load(cli.config.as_deref())?;
        apply_overrides(&mut config, cli);
        config.validate()?;

        let driver = if cli.interactive {
            DriverKind::Interactive
        } else if cli.yes {
            DriverKind::AutoApprove
        } else {
            DriverKind::DryRun
        };

        Ok(Self {
            config,
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            json: cli.format == "json",
            show_trees: cli.show_trees,
            driver,
        })
    }

    /// Build both trees, hash them, diff, plan and decide.
    ///
    /// All output is rendered only after every step succeeded.
    #[instrument(skip(self), fields(from = %self.from.display(), to = %self.to.display()))]
    pub fn execute(&self) -> Result<String, ApiError> {
        let start = Instant::now();
        let deadline = self.config.hashing.deadline_from(start);
        let hasher = self.config.hashing.hasher(deadline);

        let from_tree = self.build(&self.from, deadline)?;
        let to_tree = self.build(&self.to, deadline)?;

        let from_digest = from_tree.hash_all(&hasher)?;
        let to_digest = to_tree.hash_all(&hasher)?;

        let diff = DiffEngine::new(self.config.diff.clone())
            .with_hasher(hasher.clone())
            .diff(from_tree.root(), to_tree.root())?;

        let actions = reconcile::plan(&diff, to_tree.root().path());
        let decision = self.make_driver().decide(actions)?;

        info!(
            duration_ms = start.elapsed().as_millis(),
            changes = diff.change_count(),
            approved = decision.approved.len(),
            "Run completed"
        );

        if self.json {
            let report = JsonReport {
                from: from_tree.root().path(),
                to: to_tree.root().path(),
                from_digest,
                to_digest,
                diff: &diff,
                skipped_from: from_tree.skipped(),
                skipped_to: to_tree.skipped(),
                decision: &decision,
            };
            return serde_json::to_string_pretty(&report)
                .map_err(|e| ApiError::ConfigError(format!("Failed to encode report: {}", e)));
        }

        let color = self.config.logging.color;
        let mut out = String::new();
        if self.show_trees {
            out.push_str(&report::render_tree(from_tree.root(), &hasher)?);
            out.push_str(&report::render_tree(to_tree.root(), &hasher)?);
            out.push('\n');
        }
        out.push_str(&report::render_skipped("from", from_tree.skipped()));
        out.push_str(&report::render_skipped("to", to_tree.skipped()));
        out.push_str(&format!("{}\n{}\n", from_digest, to_digest));
        out.push_str(&report::render_diff(&diff, color));
        out.push_str(&report::render_decision(&decision));
        Ok(out.trim_end().to_string())
    }

    fn build(&self, root: &Path, deadline: Option<Instant>) -> Result<Tree, ApiError> {
        let mut builder = TreeBuilder::new(root.to_path_buf()).with_config(self.config.build.clone());
        if let Some(deadline) = deadline {
            builder = builder.with_deadline(deadline);
        }
        Ok(builder.build()?)
    }

    fn make_driver(&self) -> Box<dyn ReconciliationDriver> {
        match self.driver {
            DriverKind::DryRun => Box::new(DryRun),
            DriverKind::AutoApprove => Box::new(AutoApprove),
            DriverKind::Interactive => Box::new(Interactive),
        }
    }
}

/// CLI flags take precedence over every config source.
fn apply_overrides(config: &mut TreesyncConfig, cli: &Cli) {
    if cli.recursive {
        config.diff.recursive = true;
    }
    if cli.skip_errors {
        config.build.on_child_error = ChildErrorPolicy::Skip;
    }
    if cli.follow_symlinks {
        config.build.follow_symlinks = true;
    }
    if let Some(secs) = cli.timeout_secs {
        config.hashing.timeout_secs = Some(secs);
    }
}
