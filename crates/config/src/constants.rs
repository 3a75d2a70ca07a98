//! Default locations and engine invocations
//!
//! Paths are relative to the working directory unless overridden in the
//! `[paths]` section.

pub const WORKFLOWS_DIR: &str = "workflows";
pub const CATEGORY_INDEX: &str = "context/search_categories.json";
pub const IMPORT_LOG: &str = "import_log.json";
pub const BACKUP_ROOT: &str = ".";
pub const SITE_ROOT: &str = "docs";
pub const LOG_DIR: &str = "logs";

pub const CONFIG_DIR_NAME: &str = "flowtidy";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Placeholder replaced with the workflow path in the import command
pub const FILE_PLACEHOLDER: &str = "{file}";

pub const IMPORT_COMMAND: [&str; 4] = ["npx", "n8n", "import:workflow", "--input={file}"];
pub const VERSION_COMMAND: [&str; 3] = ["npx", "n8n", "--version"];
pub const HEALTH_URL: &str = "http://localhost:5678/healthz";

pub const UNCATEGORIZED: &str = "Uncategorized";
