//! Run labels.

use std::collections::HashSet;
use std::path::Path;

/// Label resolution errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LabelError {
    /// Explicit labels do not line up with the runs
    #[error("{labels} labels provided but {paths} databases given")]
    CountMismatch {
        /// Labels given
        labels: usize,
        /// Runs given
        paths: usize,
    },
}

/// Resolve one label per run.
///
/// `explicit` is a comma-separated list and must name every run. Without
/// it each run is labelled by its file stem; a stem seen before becomes
/// `parent/stem`, and a label that still collides gets a `#n` suffix.
pub fn resolve_labels<P: AsRef<Path>>(
    paths: &[P],
    explicit: Option<&str>,
) -> Result<Vec<String>, LabelError> {
    if let Some(list) = explicit {
        let labels: Vec<String> = list.split(',').map(|l| l.trim().to_string()).collect();
        if labels.len() != paths.len() {
            return Err(LabelError::CountMismatch {
                labels: labels.len(),
                paths: paths.len(),
            });
        }
        return Ok(labels);
    }

    let mut used = HashSet::new();
    let mut labels = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut label = stem.clone();
        if used.contains(&label) {
            let parent = path
                .parent()
                .and_then(|p| p.file_name())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            label = format!("{}/{}", parent, stem);
        }

        let base = label.clone();
        let mut n = 2;
        while used.contains(&label) {
            label = format!("{}#{}", base, n);
            n += 1;
        }

        used.insert(label.clone());
        labels.push(label);
    }

    Ok(labels)
}
