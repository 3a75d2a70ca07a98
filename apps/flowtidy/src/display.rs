//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::Style;
use flowtidy_ops::OperationResult;
use flowtidy_types::{
    ColorChoice, DedupeReport, HealthStatus, ImportReport, NodeRole, RepairReport, SiteReport,
    WorkflowAnalysis,
};
use std::io;
use std::path::Path;

/// Items listed before the rest are summarized as "... and N more"
const NAME_GROUP_PREVIEW: usize = 5;
const ERROR_PREVIEW: usize = 10;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
}

impl OutputRenderer {
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            OperationResult::Dedupe(report) => self.render_dedupe(report),
            OperationResult::RepairCheck(analysis) => self.render_analysis(analysis),
            OperationResult::Repair(report) => self.render_repair(report),
            OperationResult::Import(report) => self.render_import(report),
            OperationResult::Site(report) => self.render_site(report),
        }
        Ok(())
    }

    fn render_dedupe(&self, report: &DedupeReport) {
        println!("{}", self.heading(&format!("Duplicates in {}", report.dir.display())));

        let mut table = self.summary_table();
        table.add_row(vec!["Files scanned".to_string(), report.scanned.to_string()]);
        table.add_row(vec!["Skipped".to_string(), report.skipped.len().to_string()]);
        table.add_row(vec![
            "Duplicate groups".to_string(),
            report.duplicate_groups.len().to_string(),
        ]);
        table.add_row(vec![
            "Removable files".to_string(),
            report.removable.to_string(),
        ]);
        if !report.dry_run {
            table.add_row(vec!["Removed".to_string(), report.removed.to_string()]);
        }
        if let Some(removed) = report.index_entries_removed {
            table.add_row(vec![
                "Index entries removed".to_string(),
                removed.to_string(),
            ]);
        }
        println!("{table}");

        for group in &report.duplicate_groups {
            println!();
            println!("{} {}", self.style_ok("keep"), group.kept.display());
            for duplicate in &group.duplicates {
                let verb = if report.dry_run { "dup " } else { "del " };
                println!("{} {}", self.style_warn(verb), duplicate.display());
            }
        }

        if !report.name_groups.is_empty() {
            println!();
            println!(
                "{}",
                self.heading(&format!(
                    "{} names shared by several files",
                    report.name_groups.len()
                ))
            );
            for group in report.name_groups.iter().take(NAME_GROUP_PREVIEW) {
                println!("  {} ({} files)", group.name, group.files.len());
            }
            print_remainder(report.name_groups.len(), NAME_GROUP_PREVIEW);
        }

        if report.dry_run && report.removable > 0 {
            println!();
            println!("Run with --fix-files to delete the duplicates.");
        }
    }

    fn render_analysis(&self, analysis: &WorkflowAnalysis) {
        let title = analysis
            .workflow_name
            .clone()
            .unwrap_or_else(|| file_label(&analysis.path));
        println!("{}", self.heading(&title));

        let mut table = self.summary_table();
        table.add_row(vec!["Nodes".to_string(), analysis.total_nodes.to_string()]);
        table.add_row(vec![
            "Connected".to_string(),
            analysis.connected_nodes.to_string(),
        ]);
        table.add_row(vec![
            "Orphaned".to_string(),
            analysis.orphaned_nodes.to_string(),
        ]);
        table.add_row(vec![
            "Coverage".to_string(),
            format!("{:.1}%", analysis.coverage),
        ]);
        println!("{table}");

        if analysis.orphans.is_empty() {
            println!("{}", self.style_ok("No orphaned nodes."));
            return;
        }

        let mut orphans = Table::new();
        orphans
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Node").add_attribute(Attribute::Bold),
                Cell::new("Id").add_attribute(Attribute::Bold),
                Cell::new("Type").add_attribute(Attribute::Bold),
                Cell::new("Role").add_attribute(Attribute::Bold),
            ]);
        for orphan in &analysis.orphans {
            orphans.add_row(vec![
                Cell::new(&orphan.name),
                Cell::new(orphan.id.as_deref().unwrap_or("-")),
                Cell::new(&orphan.node_type),
                self.role_cell(orphan.role),
            ]);
        }
        println!("{orphans}");
    }

    fn render_repair(&self, report: &RepairReport) {
        let suffix = if report.dry_run { " (dry run)" } else { "" };
        println!(
            "{}",
            self.heading(&format!("Repair, {} mode{suffix}", report.mode))
        );

        let tally = &report.tally;
        let mut table = self.summary_table();
        table.add_row(vec!["Scanned".to_string(), tally.scanned.to_string()]);
        table.add_row(vec!["Fixed".to_string(), tally.fixed.to_string()]);
        table.add_row(vec!["Already clean".to_string(), tally.already_ok.to_string()]);
        table.add_row(vec![
            "Left unresolved".to_string(),
            tally.unresolved.to_string(),
        ]);
        table.add_row(vec!["Failed".to_string(), tally.failed.to_string()]);
        table.add_row(vec![
            "Nodes removed".to_string(),
            format!(
                "{} ({:.1} per fixed file)",
                tally.nodes_removed,
                report.avg_nodes_removed()
            ),
        ]);
        table.add_row(vec!["Nodes linked".to_string(), tally.nodes_linked.to_string()]);
        println!("{table}");

        if let Some(dir) = &report.backup_dir {
            println!("Backups: {}", dir.display());
        }

        if !report.errors.is_empty() {
            println!();
            println!("{}", self.style_err("Errors:"));
            for error in report.errors.iter().take(ERROR_PREVIEW) {
                println!("  {}: {}", error.path.display(), error.message);
            }
            print_remainder(report.errors.len(), ERROR_PREVIEW);
        }
        println!("Completed in {}ms", report.duration_ms);
    }

    fn render_import(&self, report: &ImportReport) {
        println!(
            "{}",
            self.heading(&format!("Import from {}", report.dir.display()))
        );

        let health = match &report.health {
            HealthStatus::Healthy => self.style_ok("healthy"),
            HealthStatus::Assumed { reason } => self.style_warn(&format!("assumed ({reason})")),
            HealthStatus::Unreachable { reason } => {
                self.style_err(&format!("unreachable ({reason})"))
            }
        };
        println!("Engine: {health}");

        let tally = &report.tally;
        let mut table = self.summary_table();
        table.add_row(vec!["Total".to_string(), tally.total.to_string()]);
        table.add_row(vec!["Imported".to_string(), tally.imported.to_string()]);
        table.add_row(vec![
            "Failed".to_string(),
            format!("{} ({} timed out)", tally.failed, tally.timed_out),
        ]);
        table.add_row(vec!["Skipped".to_string(), tally.skipped.to_string()]);
        println!("{table}");

        if !report.errors.is_empty() {
            println!();
            println!("{}", self.style_err("Errors:"));
            for error in report.errors.iter().take(ERROR_PREVIEW) {
                println!("  {error}");
            }
            print_remainder(report.errors.len(), ERROR_PREVIEW);
        }

        if let Some(path) = &report.log_path {
            println!("Log: {}", path.display());
        }
        if report.is_success() {
            println!("{}", self.style_ok("Import succeeded."));
        } else {
            println!("{}", self.style_err("Import did not fully succeed."));
        }
        println!("Completed in {}ms", report.duration_ms);
    }

    fn render_site(&self, report: &SiteReport) {
        println!(
            "{}",
            self.heading(&format!("Site {}", report.root.display()))
        );

        let mut table = self.summary_table();
        table.add_row(vec!["index.html patched".to_string(), yes_no(report.html_patched)]);
        table.add_row(vec!["Meta tag inserted".to_string(), yes_no(report.meta_inserted)]);
        table.add_row(vec!["stats.json updated".to_string(), yes_no(report.stats_updated)]);
        table.add_row(vec![
            "Files written".to_string(),
            report.files_written.len().to_string(),
        ]);
        println!("{table}");

        for (path, count) in &report.references_rewritten {
            println!("Rewrote {count} references in {}", path.display());
        }

        if !report.missing_files.is_empty() {
            println!();
            println!(
                "{} of {} expected files present; missing:",
                report.present_files.len(),
                report.present_files.len() + report.missing_files.len()
            );
            for file in &report.missing_files {
                println!("  {}", self.style_warn(file));
            }
        }

        for warning in &report.warnings {
            println!("{} {warning}", self.style_warn("warning:"));
        }
    }

    fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors_enabled() {
            table.force_no_tty();
        }
        table
    }

    fn role_cell(&self, role: NodeRole) -> Cell {
        let cell = Cell::new(role.to_string());
        if !self.colors_enabled() {
            return cell;
        }
        match role {
            NodeRole::Trigger => cell.fg(Color::Cyan),
            NodeRole::Auxiliary => cell.fg(Color::Yellow),
            NodeRole::Regular => cell,
        }
    }

    fn colors_enabled(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
        }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        style
            .force_styling(self.colors_enabled())
            .apply_to(text)
            .to_string()
    }

    fn heading(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text)
    }

    fn style_ok(&self, text: &str) -> String {
        self.paint(Style::new().green(), text)
    }

    fn style_warn(&self, text: &str) -> String {
        self.paint(Style::new().yellow(), text)
    }

    fn style_err(&self, text: &str) -> String {
        self.paint(Style::new().red().bold(), text)
    }
}

fn print_remainder(total: usize, shown: usize) {
    if total > shown {
        println!("  ... and {} more", total - shown);
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowtidy_types::{DuplicateGroup, ImportTally, NameGroup};
    use std::path::PathBuf;

    #[test]
    fn renders_every_result_as_text() {
        let renderer = OutputRenderer::new(false, ColorChoice::Never);

        let dedupe = DedupeReport {
            dir: PathBuf::from("workflows"),
            scanned: 3,
            duplicate_groups: vec![DuplicateGroup {
                hash: "ab".repeat(32),
                kept: PathBuf::from("workflows/a.json"),
                duplicates: vec![PathBuf::from("workflows/b.json")],
            }],
            name_groups: (0..7)
                .map(|i| NameGroup {
                    name: format!("Flow {i}"),
                    files: vec![PathBuf::from("x.json"), PathBuf::from("y.json")],
                })
                .collect(),
            removable: 1,
            dry_run: true,
            ..DedupeReport::default()
        };
        renderer
            .render_result(&OperationResult::Dedupe(dedupe))
            .unwrap();

        let import = ImportReport {
            dir: PathBuf::from("workflows"),
            health: HealthStatus::Healthy,
            tally: ImportTally {
                total: 12,
                imported: 0,
                failed: 12,
                skipped: 0,
                timed_out: 1,
            },
            errors: (0..12).map(|i| format!("f{i}.json: rejected")).collect(),
            log_path: None,
            duration_ms: 5,
        };
        renderer
            .render_result(&OperationResult::Import(import))
            .unwrap();

        renderer
            .render_result(&OperationResult::Site(SiteReport::default()))
            .unwrap();
    }

    #[test]
    fn plain_styles_without_colors() {
        let renderer = OutputRenderer::new(false, ColorChoice::Never);
        assert_eq!(renderer.style_ok("done"), "done");
        assert_eq!(yes_no(false), "no");
        assert_eq!(file_label(Path::new("dir/flow.json")), "flow.json");
    }
}
