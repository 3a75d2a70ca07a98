//! Operation requests

use flowtidy_types::RepairMode;
use std::path::PathBuf;

/// Which duplicate fixes to apply; neither flag means check only
#[derive(Clone, Debug, Default)]
pub struct DedupeRequest {
    /// Overrides `paths.workflows_dir`
    pub dir: Option<PathBuf>,
    pub fix_files: bool,
    pub fix_index: bool,
}

impl DedupeRequest {
    #[must_use]
    pub fn is_check_only(&self) -> bool {
        !self.fix_files && !self.fix_index
    }
}

/// Parameters of a repair batch
#[derive(Clone, Debug, Default)]
pub struct RepairRequest {
    pub dir: Option<PathBuf>,
    pub mode: RepairMode,
    pub dry_run: bool,
    pub limit: Option<usize>,
}

/// Parameters of an import batch
///
/// Recursion and health policy come from `[import]` in the configuration,
/// which the CLI overrides from its flags.
#[derive(Clone, Debug, Default)]
pub struct ImportRequest {
    pub dir: Option<PathBuf>,
    pub limit: Option<usize>,
}
