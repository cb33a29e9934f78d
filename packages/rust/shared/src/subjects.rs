//! Subject list loading.
//!
//! An inline list in the config takes precedence; otherwise subjects come
//! from a fallback file with one identifier per line. Order is preserved and
//! becomes the processing order.

use std::path::Path;

use tracing::info;

use crate::config::AppConfig;
use crate::error::{Result, ScoutError};
use crate::types::SubjectId;

/// Load the ordered subject list from the configured source.
///
/// Returns a `Config` error if neither source yields any subjects; the
/// pipeline has nothing to do without them.
pub fn load_subjects(config: &AppConfig) -> Result<Vec<SubjectId>> {
    if !config.subjects.list.is_empty() {
        let subjects: Vec<SubjectId> = config
            .subjects
            .list
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(SubjectId::from)
            .collect();

        info!(count = subjects.len(), "loaded subjects from config list");
        return non_empty(subjects);
    }

    let path = Path::new(&config.subjects.file);
    let subjects = load_subjects_from_file(path)?;
    info!(count = subjects.len(), path = %path.display(), "loaded subjects from file");
    non_empty(subjects)
}

/// Parse a subject file: one identifier per line, `#` lines and blanks skipped.
pub fn load_subjects_from_file(path: &Path) -> Result<Vec<SubjectId>> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(SubjectId::from)
        .collect())
}

fn non_empty(subjects: Vec<SubjectId>) -> Result<Vec<SubjectId>> {
    if subjects.is_empty() {
        return Err(ScoutError::config("no subjects loaded"));
    }
    Ok(subjects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inline_list_takes_precedence() {
        let mut config = AppConfig::default();
        config.subjects.list = vec!["111".into(), " 222 ".into()];
        config.subjects.file = "/nonexistent/path".into();

        let subjects = load_subjects(&config).expect("load");
        assert_eq!(subjects, vec![SubjectId::from("111"), SubjectId::from("222")]);
    }

    #[test]
    fn file_skips_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "# batch one").expect("write");
        writeln!(file, "111").expect("write");
        writeln!(file).expect("write");
        writeln!(file, "  222  ").expect("write");
        writeln!(file, "# trailing comment").expect("write");

        let subjects = load_subjects_from_file(file.path()).expect("load");
        assert_eq!(subjects, vec![SubjectId::from("111"), SubjectId::from("222")]);
    }

    #[test]
    fn empty_sources_are_fatal() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");

        let mut config = AppConfig::default();
        config.subjects.list = vec![];
        config.subjects.file = file.path().to_string_lossy().into_owned();

        let err = load_subjects(&config).unwrap_err();
        assert!(err.to_string().contains("no subjects"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut config = AppConfig::default();
        config.subjects.file = "/definitely/not/here.txt".into();

        assert!(load_subjects(&config).is_err());
    }
}
