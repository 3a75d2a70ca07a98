//! Event handling and progress display

use console::{Style, Term};
use flowtidy_events::{
    AppEvent, DedupeEvent, EventMessage, GeneralEvent, ImportEvent, ProgressEvent, RepairEvent,
    SiteEvent,
};
use flowtidy_types::HealthStatus;

/// Renders events on stderr while a command runs
///
/// Stdout is left to the final result, so JSON output stays parseable.
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    /// Print nothing; events are still logged
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);
        if self.quiet {
            return;
        }

        match message.event {
            AppEvent::General(event) => self.handle_general(event),
            AppEvent::Progress(event) => self.handle_progress(event),
            AppEvent::Dedupe(event) => self.handle_dedupe(event),
            AppEvent::Repair(event) => self.handle_repair(event),
            AppEvent::Import(event) => self.handle_import(event),
            AppEvent::Site(event) => self.handle_site(event),
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => self.show_warning(&format!("{message}: {context}")),
                None => self.show_warning(&message),
            },
            GeneralEvent::Error { message, details } => match details {
                Some(details) => self.show_error(&format!("{message}: {details}")),
                None => self.show_error(&message),
            },
            GeneralEvent::DebugLog { message, .. } => {
                if self.debug_enabled {
                    self.show_status(&self.dim(&message));
                }
            }
            GeneralEvent::OperationStarted { operation } => {
                if self.debug_enabled {
                    self.show_status(&self.dim(&format!("Starting {operation}")));
                }
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                if self.debug_enabled {
                    let outcome = if success { "finished" } else { "finished with issues" };
                    self.show_status(&self.dim(&format!("{operation} {outcome}")));
                }
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                self.show_error(&format!("{operation} failed: {}", failure.message));
                if let Some(hint) = failure.hint {
                    self.show_status(&self.dim(&format!("  hint: {hint}")));
                }
            }
        }
    }

    fn handle_progress(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started {
                operation, total, ..
            } => match total {
                Some(total) => self.show_status(&format!("{operation} ({total} files)")),
                None => self.show_status(&operation),
            },
            ProgressEvent::Updated { current, total, .. } => {
                if self.debug_enabled {
                    let total = total.map_or_else(|| "?".to_string(), |t| t.to_string());
                    self.show_status(&self.dim(&format!("  {current}/{total}")));
                }
            }
            ProgressEvent::Completed {
                duration,
                total_processed,
                ..
            } => {
                self.show_status(&self.dim(&format!(
                    "Processed {total_processed} files in {:.1}s",
                    duration.as_secs_f64()
                )));
            }
            ProgressEvent::Failed {
                failure,
                completed_items,
                ..
            } => {
                self.show_error(&format!(
                    "Stopped after {completed_items} files: {}",
                    failure.message
                ));
            }
        }
    }

    fn handle_dedupe(&self, event: DedupeEvent) {
        match event {
            DedupeEvent::ScanStarted { dir } => {
                self.show_status(&format!("Scanning {} for duplicates", dir.display()));
            }
            DedupeEvent::FileSkipped { path, reason } => {
                self.show_warning(&format!("Skipped {}: {reason}", path.display()));
            }
            DedupeEvent::DuplicateGroupFound {
                kept, duplicates, ..
            } => {
                if self.debug_enabled {
                    self.show_status(&self.dim(&format!(
                        "  {} has {duplicates} duplicate(s)",
                        kept.display()
                    )));
                }
            }
            DedupeEvent::FileRemoved { path } => {
                self.show_success(&format!("Removed {}", path.display()));
            }
            DedupeEvent::RemoveFailed { path, error } => {
                self.show_error(&format!("Could not remove {}: {error}", path.display()));
            }
            DedupeEvent::IndexDeduplicated { removed, remaining } => {
                self.show_success(&format!(
                    "Category index: removed {removed} duplicate entries, {remaining} remain"
                ));
            }
            DedupeEvent::ReindexFinished { success } => {
                if success {
                    self.show_success("Search index rebuilt");
                }
            }
        }
    }

    fn handle_repair(&self, event: RepairEvent) {
        match event {
            RepairEvent::BatchStarted {
                mode,
                files,
                dry_run,
            } => {
                let suffix = if dry_run { " (dry run)" } else { "" };
                self.show_status(&format!(
                    "Repairing {files} workflows in {mode} mode{suffix}"
                ));
            }
            RepairEvent::BackupCreated { dir } => {
                self.show_status(&format!("Backing up originals to {}", dir.display()));
            }
            RepairEvent::FileRepaired {
                path,
                orphans_before,
                orphans_after,
                ..
            } => {
                if self.debug_enabled {
                    self.show_status(&self.dim(&format!(
                        "  {}: {orphans_before} -> {orphans_after} orphans",
                        path.display()
                    )));
                }
            }
            RepairEvent::FileUnresolved { path, orphans } => {
                if self.debug_enabled {
                    self.show_status(&self.dim(&format!(
                        "  {}: {orphans} orphans left untouched",
                        path.display()
                    )));
                }
            }
            RepairEvent::FileFailed { path, failure } => {
                self.show_error(&format!("{}: {}", path.display(), failure.message));
            }
        }
    }

    fn handle_import(&self, event: ImportEvent) {
        match event {
            ImportEvent::EngineDetected { version } => {
                self.show_status(&format!("Workflow engine {version}"));
            }
            ImportEvent::HealthChecked { url, status } => match status {
                HealthStatus::Healthy => self.show_success(&format!("{url} is healthy")),
                HealthStatus::Assumed { .. } | HealthStatus::Unreachable { .. } => {}
            },
            ImportEvent::BatchStarted { dir, files } => {
                self.show_status(&format!("Importing {files} files from {}", dir.display()));
            }
            ImportEvent::FileSkipped { path, reasons } => {
                self.show_warning(&format!(
                    "Skipped {}: {}",
                    path.display(),
                    reasons.join("; ")
                ));
            }
            ImportEvent::FileImported { filename } => {
                self.show_success(&format!("Imported {filename}"));
            }
            ImportEvent::FileFailed {
                filename,
                error,
                timed_out,
            } => {
                if timed_out {
                    self.show_error(&format!("Timed out importing {filename}"));
                } else {
                    self.show_error(&format!("Failed to import {filename}: {error}"));
                }
            }
            ImportEvent::CategoryUpdated {
                filename,
                category,
                created,
            } => {
                if self.debug_enabled {
                    let verb = if created { "added" } else { "updated" };
                    self.show_status(&self.dim(&format!("  {filename} {verb} as {category}")));
                }
            }
            ImportEvent::RateLimited { pause_ms } => {
                if self.debug_enabled {
                    self.show_status(&self.dim(&format!("  pausing {pause_ms} ms")));
                }
            }
            ImportEvent::LogSaved { path } => {
                self.show_status(&self.dim(&format!("Import log saved to {}", path.display())));
            }
        }
    }

    fn handle_site(&self, event: SiteEvent) {
        match event {
            SiteEvent::TimestampPatched {
                path,
                meta_inserted,
            } => {
                let extra = if meta_inserted { " (meta tag added)" } else { "" };
                self.show_success(&format!("Patched {}{extra}", path.display()));
            }
            SiteEvent::FileWritten { path } => {
                self.show_success(&format!("Wrote {}", path.display()));
            }
            SiteEvent::ReferencesRewritten { path, count } => {
                self.show_status(&format!(
                    "Rewrote {count} references in {}",
                    path.display()
                ));
            }
            SiteEvent::StepSkipped { step, reason } => {
                self.show_warning(&format!("Skipped {step}: {reason}"));
            }
            SiteEvent::FileMissing { path } => {
                self.show_warning(&format!("Missing {path}"));
            }
        }
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.colors_enabled)
    }

    fn dim(&self, message: &str) -> String {
        self.style(Style::new().dim()).apply_to(message).to_string()
    }

    fn show_status(&self, message: &str) {
        // Rendering must never abort a running command
        let _ = self.term.write_line(message);
    }

    fn show_success(&self, message: &str) {
        let mark = self.style(Style::new().green()).apply_to("✓");
        self.show_status(&format!("{mark} {message}"));
    }

    fn show_warning(&self, message: &str) {
        let mark = self.style(Style::new().yellow().bold()).apply_to("!");
        self.show_status(&format!("{mark} {message}"));
    }

    fn show_error(&self, message: &str) {
        let mark = self.style(Style::new().red().bold()).apply_to("✗");
        self.show_status(&format!("{mark} {message}"));
    }
}
