//! Static documentation site refresh

use crate::OpsCtx;
use chrono::{DateTime, Utc};
use flowtidy_config::SiteConfig;
use flowtidy_errors::{Error, UserFacingError};
use flowtidy_events::{AppEvent, EventEmitter, SiteEvent};
use flowtidy_platform::fs;
use flowtidy_types::SiteReport;
use regex::Regex;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

const INDEX_HTML: &str = "index.html";

/// Files a deployed site is expected to contain
pub const EXPECTED_FILES: [&str; 8] = [
    "index.html",
    "css/styles.css",
    "js/app.js",
    "js/search.js",
    "api/search-index.json",
    "api/stats.json",
    "api/categories.json",
    "api/integrations.json",
];

const HTML_REFERENCES: [(&str, &str); 5] = [
    ("href=\"/css/", "href=\"css/"),
    ("src=\"/js/", "src=\"js/"),
    ("href=\"/api/", "href=\"api/"),
    ("fetch(\"/api/", "fetch(\"api/"),
    ("fetch('/api/", "fetch('api/"),
];

const SCRIPT_REFERENCES: [(&str, &str); 4] = [
    ("fetch('/api/", "fetch('api/"),
    ("fetch(\"/api/", "fetch(\"api/"),
    ("'/api/", "'api/"),
    ("\"/api/", "\"api/"),
];

const SCRIPTS: [&str; 2] = ["js/app.js", "js/search.js"];

/// Refresh timestamps, deployment files and asset references of the site
///
/// Missing inputs are skipped with a warning; only an absent site root is
/// an error.
///
/// # Errors
///
/// Returns an error if the site root does not exist or a generated file
/// cannot be written.
pub async fn patch_site(ctx: &OpsCtx, root: Option<PathBuf>) -> Result<SiteReport, Error> {
    let root = root.unwrap_or_else(|| ctx.config.site_root());
    fs::ensure_dir(&root).await?;
    let now = Utc::now();

    let mut report = SiteReport {
        root: root.clone(),
        ..SiteReport::default()
    };

    patch_index_html(ctx, &root, now, &mut report).await?;
    write_metadata(ctx, &root, now, &mut report).await?;
    update_stats(ctx, &root, now, &mut report).await;
    write_deployment_files(ctx, &root, &mut report).await?;

    for script in SCRIPTS {
        let path = root.join(script);
        if !fs::exists(&path).await {
            continue;
        }
        let text = fs::read_to_string(&path).await?;
        let (rewritten, count) = rewrite_references(&text, &SCRIPT_REFERENCES);
        if count > 0 {
            fs::write_string(&path, &rewritten).await?;
            note_rewrite(ctx, &mut report, path, count);
        }
    }

    for file in EXPECTED_FILES {
        if fs::exists(&root.join(file)).await {
            report.present_files.push(file.to_string());
        } else {
            ctx.emit(AppEvent::Site(SiteEvent::FileMissing {
                path: file.to_string(),
            }));
            report.missing_files.push(file.to_string());
        }
    }

    Ok(report)
}

/// Set the footer's "Last updated" to the current month and add a
/// `last-updated` meta tag when the page has none
///
/// Returns the new document and whether the meta tag was inserted.
///
/// # Errors
///
/// Returns an internal error if the footer pattern fails to compile.
pub fn patch_timestamp(html: &str, now: DateTime<Utc>) -> Result<(String, bool), Error> {
    let footer = Regex::new(r#"(<p class="footer-meta">Last updated:)\s*([^<]+)"#)
        .map_err(|e| Error::internal(format!("invalid footer pattern: {e}")))?;
    let month = now.format("%B %Y").to_string();
    let mut patched = footer
        .replace_all(html, |caps: &regex::Captures<'_>| format!("{} {month}", &caps[1]))
        .into_owned();

    let has_meta = patched.contains("name=\"last-updated\"");
    let mut inserted = false;
    if !has_meta {
        if let Some(pos) = patched.find("</head>") {
            let tag = format!(
                "    <meta name=\"last-updated\" content=\"{}\">\n",
                now.to_rfc3339()
            );
            patched.insert_str(pos, &tag);
            inserted = true;
        }
    }
    Ok((patched, inserted))
}

/// Apply literal substitutions in order, returning the text and the number
/// of replacements made
#[must_use]
pub fn rewrite_references(text: &str, rules: &[(&str, &str)]) -> (String, usize) {
    let mut current = text.to_string();
    let mut count = 0;
    for (from, to) in rules {
        let hits = current.matches(from).count();
        if hits > 0 {
            count += hits;
            current = current.replace(from, to);
        }
    }
    (current, count)
}

async fn patch_index_html(
    ctx: &OpsCtx,
    root: &Path,
    now: DateTime<Utc>,
    report: &mut SiteReport,
) -> Result<(), Error> {
    let path = root.join(INDEX_HTML);
    if !fs::exists(&path).await {
        skip(ctx, report, "timestamp", format!("{} not found", path.display()));
        return Ok(());
    }

    let html = fs::read_to_string(&path).await?;
    let (patched, meta_inserted) = patch_timestamp(&html, now)?;
    let (rewritten, count) = rewrite_references(&patched, &HTML_REFERENCES);
    fs::write_string(&path, &rewritten).await?;

    report.html_patched = true;
    report.meta_inserted = meta_inserted;
    ctx.emit(AppEvent::Site(SiteEvent::TimestampPatched {
        path: path.clone(),
        meta_inserted,
    }));
    if count > 0 {
        note_rewrite(ctx, report, path, count);
    }
    Ok(())
}

async fn write_metadata(
    ctx: &OpsCtx,
    root: &Path,
    now: DateTime<Utc>,
    report: &mut SiteReport,
) -> Result<(), Error> {
    let api = root.join("api");
    fs::create_dir_all(&api).await?;
    let metadata = json!({
        "last_updated": now.to_rfc3339(),
        "last_updated_readable": now.format("%B %d, %Y at %H:%M UTC").to_string(),
        "version": ctx.config.site.version,
        "deployment_type": ctx.config.site.deployment_type,
    });
    let path = api.join("metadata.json");
    fs::write_json_pretty(&path, &metadata).await?;
    note_written(ctx, report, path);
    Ok(())
}

/// Stats are produced by another tool; a missing or odd file is not fatal
async fn update_stats(ctx: &OpsCtx, root: &Path, now: DateTime<Utc>, report: &mut SiteReport) {
    let path = root.join("api/stats.json");
    if !fs::exists(&path).await {
        skip(ctx, report, "stats", format!("{} not found", path.display()));
        return;
    }

    match stamp_stats(&path, now).await {
        Ok(true) => {
            report.stats_updated = true;
            note_written(ctx, report, path);
        }
        Ok(false) => skip(ctx, report, "stats", format!("{} is not an object", path.display())),
        Err(e) => skip(ctx, report, "stats", e.user_message().into_owned()),
    }
}

async fn stamp_stats(path: &Path, now: DateTime<Utc>) -> Result<bool, Error> {
    let mut stats = fs::read_json(path).await?;
    let Some(map) = stats.as_object_mut() else {
        return Ok(false);
    };
    map.insert("last_updated".to_string(), Value::String(now.to_rfc3339()));
    fs::write_json_pretty(path, &stats).await?;
    Ok(true)
}

async fn write_deployment_files(
    ctx: &OpsCtx,
    root: &Path,
    report: &mut SiteReport,
) -> Result<(), Error> {
    let files = [
        ("_config.yml", jekyll_config(&ctx.config.site)),
        (".nojekyll", String::new()),
        ("404.html", not_found_page(&ctx.config.site)),
    ];
    for (name, contents) in files {
        let path = root.join(name);
        fs::write_string(&path, &contents).await?;
        note_written(ctx, report, path);
    }
    Ok(())
}

fn jekyll_config(site: &SiteConfig) -> String {
    let excludes = [
        "workflows/",
        "scripts/",
        "src/",
        "\"*.py\"",
        "requirements.txt",
        "Dockerfile",
        "docker-compose.yml",
        "k8s/",
        "helm/",
        "Documentation/",
        "context/",
        "database/",
        "static/",
        "templates/",
        ".github/",
        ".devcontainer/",
    ];
    let mut out = format!(
        "# GitHub Pages Configuration\n\
         theme: null\n\
         title: {}\n\
         description: {}\n\
         baseurl: \"{}\"\n\
         url: \"{}\"\n\
         \n\
         # Build settings\n\
         markdown: kramdown\n\
         exclude:\n",
        site.title, site.description, site.baseurl, site.url
    );
    for entry in excludes {
        out.push_str("  - ");
        out.push_str(entry);
        out.push('\n');
    }
    out
}

fn not_found_page(site: &SiteConfig) -> String {
    let home = format!("{}/", site.baseurl.trim_end_matches('/'));
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>404 - Page Not Found</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
            margin: 0;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
        }}
        .container {{
            text-align: center;
            padding: 2rem;
        }}
        h1 {{ font-size: 6rem; margin: 0; }}
        p {{ font-size: 1.5rem; margin: 1rem 0; }}
        a {{
            display: inline-block;
            margin-top: 2rem;
            padding: 1rem 2rem;
            background: white;
            color: #667eea;
            text-decoration: none;
            border-radius: 5px;
            transition: transform 0.2s;
        }}
        a:hover {{ transform: scale(1.05); }}
    </style>
</head>
<body>
    <div class="container">
        <h1>404</h1>
        <p>Page not found</p>
        <p>The n8n workflows repository has been updated.</p>
        <a href="{home}">Go to Homepage</a>
    </div>
</body>
</html>
"#
    )
}

fn note_written(ctx: &OpsCtx, report: &mut SiteReport, path: PathBuf) {
    ctx.emit(AppEvent::Site(SiteEvent::FileWritten { path: path.clone() }));
    report.files_written.push(path);
}

fn note_rewrite(ctx: &OpsCtx, report: &mut SiteReport, path: PathBuf, count: usize) {
    ctx.emit(AppEvent::Site(SiteEvent::ReferencesRewritten {
        path: path.clone(),
        count,
    }));
    report.references_rewritten.push((path, count));
}

fn skip(ctx: &OpsCtx, report: &mut SiteReport, step: &str, reason: String) {
    ctx.emit(AppEvent::Site(SiteEvent::StepSkipped {
        step: step.to_string(),
        reason: reason.clone(),
    }));
    report.warnings.push(reason);
}
