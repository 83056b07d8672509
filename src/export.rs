//! Output artifacts of a discovery run.
//!
//! - `feeds.js`: a `const feeds = [...]` array literal, one URL per line
//! - `feeds.json`: the same URLs as a pretty-printed JSON array
//! - `feed_audit.csv`: one `(site, result)` row per discovered feed, per site
//!   without feeds, or per site whose discovery failed
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

pub const FEEDS_JS: &str = "feeds.js";
pub const FEEDS_JSON: &str = "feeds.json";
pub const AUDIT_CSV: &str = "feed_audit.csv";

/// Audit cell written for a site where no feed was found.
pub const NONE_FOUND: &str = "—";

const AUDIT_HEADER: [&str; 2] = ["Site URL", "Found Feed URL"];

/// Result column of an audit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    Feed(String),
    NoneFound,
    Error(String),
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditResult::Feed(url) => f.write_str(url),
            AuditResult::NoneFound => f.write_str(NONE_FOUND),
            AuditResult::Error(message) => write!(f, "ERROR: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub site: String,
    pub result: AuditResult,
}

/// Paths of the three artifacts inside `dir`.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub js: PathBuf,
    pub json: PathBuf,
    pub audit: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            js: dir.join(FEEDS_JS),
            json: dir.join(FEEDS_JSON),
            audit: dir.join(AUDIT_CSV),
        }
    }
}

/// Renders the feed list as a JavaScript array literal.
///
/// Each URL is written as a JSON string, which is also a valid JS string literal.
pub fn render_js(feeds: &[String]) -> Result<String> {
    let mut out = String::from("const feeds = [\n");
    for url in feeds {
        let literal = serde_json::to_string(url).context("Failed to encode feed URL")?;
        out.push_str("  ");
        out.push_str(&literal);
        out.push_str(",\n");
    }
    out.push_str("];\n");
    Ok(out)
}

pub fn write_js(feeds: &[String], path: &Path) -> Result<()> {
    let content = render_js(feeds)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    println!("[OK] Saved JS: {}", path.display());
    Ok(())
}

pub fn write_json(feeds: &[String], path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(feeds).context("Failed to encode feeds as JSON")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    println!("[OK] Saved JSON: {}", path.display());
    Ok(())
}

pub fn write_audit(rows: &[AuditRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;

    writer
        .write_record(AUDIT_HEADER)
        .context("Failed to write audit header")?;
    for row in rows {
        writer
            .write_record([row.site.as_str(), row.result.to_string().as_str()])
            .with_context(|| format!("Failed to write audit row for '{}'", row.site))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush '{}'", path.display()))?;

    println!("[OK] Saved audit: {}", path.display());
    Ok(())
}

/// Writes all three artifacts.
pub fn write_all(feeds: &[String], audit: &[AuditRow], paths: &OutputPaths) -> Result<()> {
    write_js(feeds, &paths.js)?;
    write_json(feeds, &paths.json)?;
    write_audit(audit, &paths.audit)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("feedscout_export_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn feeds() -> Vec<String> {
        vec![
            "https://a.example/feed".to_owned(),
            "https://b.example/rss.xml".to_owned(),
        ]
    }

    #[test]
    fn test_render_js() {
        assert_eq!(
            render_js(&feeds()).unwrap(),
            "const feeds = [\n  \"https://a.example/feed\",\n  \"https://b.example/rss.xml\",\n];\n"
        );
    }

    #[test]
    fn test_render_js_empty() {
        assert_eq!(render_js(&[]).unwrap(), "const feeds = [\n];\n");
    }

    #[test]
    fn test_render_js_escapes_quotes() {
        let js = render_js(&["https://x.example/?q=\"a\"".to_owned()]).unwrap();
        assert!(js.contains(r#""https://x.example/?q=\"a\"""#));
    }

    #[test]
    fn test_audit_result_display() {
        assert_eq!(
            AuditResult::Feed("https://a.example/feed".into()).to_string(),
            "https://a.example/feed"
        );
        assert_eq!(AuditResult::NoneFound.to_string(), "—");
        assert_eq!(
            AuditResult::Error("boom".into()).to_string(),
            "ERROR: boom"
        );
    }

    #[test]
    fn test_write_all() {
        let dir = temp_dir("all");
        let paths = OutputPaths::in_dir(&dir);
        let audit = vec![
            AuditRow {
                site: "https://a.example".into(),
                result: AuditResult::Feed("https://a.example/feed".into()),
            },
            AuditRow {
                site: "https://c.example".into(),
                result: AuditResult::NoneFound,
            },
            AuditRow {
                site: "https://d.example".into(),
                result: AuditResult::Error("invalid, site".into()),
            },
        ];

        write_all(&feeds(), &audit, &paths).unwrap();

        let json = std::fs::read_to_string(&paths.json).unwrap();
        assert_eq!(
            json,
            "[\n  \"https://a.example/feed\",\n  \"https://b.example/rss.xml\"\n]"
        );

        let js = std::fs::read_to_string(&paths.js).unwrap();
        assert!(js.starts_with("const feeds = [\n"));

        let csv = std::fs::read_to_string(&paths.audit).unwrap();
        assert_eq!(
            csv,
            "Site URL,Found Feed URL\n\
             https://a.example,https://a.example/feed\n\
             https://c.example,—\n\
             https://d.example,\"ERROR: invalid, site\"\n"
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_json_keeps_non_ascii() {
        let dir = temp_dir("non_ascii");
        let path = dir.join(FEEDS_JSON);
        write_json(&["https://приклад.укр/feed".to_owned()], &path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("приклад"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
