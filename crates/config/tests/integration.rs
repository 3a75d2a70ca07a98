//! Integration tests for config

#[cfg(test)]
mod tests {
    use flowtidy_config::*;
    use flowtidy_types::{ColorChoice, HealthPolicy, OutputFormat, RepairMode};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_output = "plain"
color = "never"

[paths]
workflows_dir = "exports"

[repair]
default_mode = "aggressive"
dry_run_limit = 25

[import]
timeout_secs = 5
health_policy = "require"
rate_limit_every = 0
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.workflows_dir(), PathBuf::from("exports"));
        assert_eq!(config.repair.default_mode, RepairMode::Aggressive);
        assert_eq!(config.repair.dry_run_limit, Some(25));
        assert_eq!(config.import.timeout_secs, 5);
        assert_eq!(config.import.health_policy, HealthPolicy::Require);
        assert_eq!(config.import.rate_limit_every, 0);
        // untouched sections keep their defaults
        assert_eq!(config.import.command[0], "npx");
        assert_eq!(config.site.version, "2.0.1");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.workflows_dir(), PathBuf::from("workflows"));
        assert_eq!(
            config.category_index_path(),
            PathBuf::from("context/search_categories.json")
        );
        assert_eq!(config.import_log_path(), PathBuf::from("import_log.json"));
        assert_eq!(config.site_root(), PathBuf::from("docs"));
        assert_eq!(config.repair.dry_run_limit, Some(10));
        assert_eq!(config.import.timeout_secs, 30);
        assert_eq!(config.import.version_timeout_secs, 10);
        assert_eq!(config.import.health_url, "http://localhost:5678/healthz");
        assert_eq!(config.import.health_policy, HealthPolicy::AssumeAvailable);
        assert_eq!(
            config.import.command,
            vec!["npx", "n8n", "import:workflow", "--input={file}"]
        );
    }

    #[test]
    fn test_merge_env() {
        let mut config = Config::default();
        config
            .merge_env_from(lookup(&[
                ("FLOWTIDY_OUTPUT", "json"),
                ("FLOWTIDY_COLOR", "always"),
                ("FLOWTIDY_WORKFLOWS_DIR", "/srv/workflows"),
                ("FLOWTIDY_HEALTH_POLICY", "require"),
                ("FLOWTIDY_IMPORT_TIMEOUT", "90"),
            ]))
            .unwrap();

        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.general.color, ColorChoice::Always);
        assert_eq!(config.workflows_dir(), PathBuf::from("/srv/workflows"));
        assert_eq!(config.import.health_policy, HealthPolicy::Require);
        assert_eq!(config.import.timeout_secs, 90);
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = Config::default();
        assert!(config
            .merge_env_from(lookup(&[("FLOWTIDY_OUTPUT", "invalid")]))
            .is_err());
        assert!(config
            .merge_env_from(lookup(&[("FLOWTIDY_IMPORT_TIMEOUT", "soon")]))
            .is_err());
    }

    #[tokio::test]
    async fn test_empty_import_command_is_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[import]\ncommand = []").unwrap();
        assert!(Config::load_from_file(temp_file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(Config::load_or_default(Some(missing.as_path())).await.is_err());
    }
}
