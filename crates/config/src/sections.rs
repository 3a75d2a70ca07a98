//! Configuration sections

use crate::constants;
use flowtidy_types::{ColorChoice, HealthPolicy, OutputFormat, RepairMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub default_output: OutputFormat,
    #[serde(default)]
    pub color: ColorChoice,
}

/// Path configuration; unset entries fall back to `constants`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub workflows_dir: Option<PathBuf>,
    pub category_index: Option<PathBuf>,
    pub import_log: Option<PathBuf>,
    pub backup_root: Option<PathBuf>,
    pub site_root: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

/// Duplicate removal configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DedupeConfig {
    /// Command run after the category index was deduplicated
    #[serde(default)]
    pub reindex_command: Option<Vec<String>>,
}

/// Connection repair configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    #[serde(default)]
    pub default_mode: RepairMode,
    /// Sample size for dry runs without an explicit limit
    #[serde(default = "default_dry_run_limit")]
    pub dry_run_limit: Option<usize>,
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            default_mode: RepairMode::Minimal,
            dry_run_limit: default_dry_run_limit(),
            progress_every: default_progress_every(),
        }
    }
}

/// Keyword rule mapping workflow filenames to a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

/// Workflow import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Import invocation; `{file}` is replaced with the workflow path
    #[serde(default = "default_import_command")]
    pub command: Vec<String>,
    #[serde(default = "default_version_command")]
    pub version_command: Vec<String>,
    #[serde(default = "default_import_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_version_timeout")]
    pub version_timeout_secs: u64,
    #[serde(default = "default_health_url")]
    pub health_url: String,
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,
    #[serde(default)]
    pub health_policy: HealthPolicy,
    /// Pause after this many import attempts (0 disables)
    #[serde(default = "default_rate_limit_every")]
    pub rate_limit_every: usize,
    #[serde(default = "default_rate_limit_pause_ms")]
    pub rate_limit_pause_ms: u64,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    #[serde(default = "default_category_rules")]
    pub categories: Vec<CategoryRule>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            command: default_import_command(),
            version_command: default_version_command(),
            timeout_secs: default_import_timeout(),
            version_timeout_secs: default_version_timeout(),
            health_url: default_health_url(),
            health_timeout_ms: default_health_timeout_ms(),
            health_policy: HealthPolicy::AssumeAvailable,
            rate_limit_every: default_rate_limit_every(),
            rate_limit_pause_ms: default_rate_limit_pause_ms(),
            recursive: default_recursive(),
            categories: default_category_rules(),
        }
    }
}

/// Static site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,
    #[serde(default = "default_site_description")]
    pub description: String,
    #[serde(default = "default_site_baseurl")]
    pub baseurl: String,
    #[serde(default = "default_site_url")]
    pub url: String,
    #[serde(default = "default_site_version")]
    pub version: String,
    #[serde(default = "default_deployment_type")]
    pub deployment_type: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            description: default_site_description(),
            baseurl: default_site_baseurl(),
            url: default_site_url(),
            version: default_site_version(),
            deployment_type: default_deployment_type(),
        }
    }
}

// Default value functions for serde
#[allow(clippy::unnecessary_wraps)]
fn default_dry_run_limit() -> Option<usize> {
    Some(10)
}

fn default_progress_every() -> usize {
    100
}

fn default_import_command() -> Vec<String> {
    constants::IMPORT_COMMAND.iter().map(|s| (*s).to_string()).collect()
}

fn default_version_command() -> Vec<String> {
    constants::VERSION_COMMAND.iter().map(|s| (*s).to_string()).collect()
}

fn default_import_timeout() -> u64 {
    30
}

fn default_version_timeout() -> u64 {
    10
}

fn default_health_url() -> String {
    constants::HEALTH_URL.to_string()
}

fn default_health_timeout_ms() -> u64 {
    2000
}

fn default_rate_limit_every() -> usize {
    10
}

fn default_rate_limit_pause_ms() -> u64 {
    1000
}

fn default_recursive() -> bool {
    true
}

fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("AI Agent Development", &["openai", "agent", "llm", "gpt", "langchain"]),
        CategoryRule::new(
            "Communication & Messaging",
            &["slack", "telegram", "discord", "gmail", "email", "whatsapp"],
        ),
        CategoryRule::new("Data Processing & Analysis", &["sheets", "airtable", "postgres", "mysql"]),
        CategoryRule::new("Project Management", &["jira", "trello", "asana", "clickup"]),
        CategoryRule::new("Social Media Management", &["twitter", "linkedin", "instagram"]),
        CategoryRule::new("Cloud Storage & File Management", &["drive", "dropbox", "s3"]),
    ]
}

fn default_site_title() -> String {
    "N8N Workflows Repository".to_string()
}

fn default_site_description() -> String {
    "Browse and search 2000+ n8n workflow automation templates".to_string()
}

fn default_site_baseurl() -> String {
    "/n8n-workflows".to_string()
}

fn default_site_url() -> String {
    "https://zie619.github.io".to_string()
}

fn default_site_version() -> String {
    "2.0.1".to_string()
}

fn default_deployment_type() -> String {
    "github_pages".to_string()
}
