#[allow(non_snake_case)]
/// For clean importing
pub mod CheckpointPaths {
    use std::path::{Path, PathBuf};

    use crate::constants::{CHECKPOINT_FILE_SUFFIX, CHECKPOINT_TEMP_SUFFIX};

    // Checkpoints: <checkpoint dir>/<identifier>.<CHECKPOINT_FILE_SUFFIX>
    // Pending:     <checkpoint dir>/<identifier>.<CHECKPOINT_FILE_SUFFIX>.<CHECKPOINT_TEMP_SUFFIX>

    /// Maps an arbitrary run identifier to a single file-name component.
    pub fn sanitize(identifier: &str) -> String {
        identifier
            .chars()
            .map(|c| match c {
                'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
                _ => '_',
            })
            .collect()
    }

    pub fn checkpoint_path(dir: &Path, identifier: &str) -> PathBuf {
        dir.join(format!("{}.{}", sanitize(identifier), CHECKPOINT_FILE_SUFFIX))
    }

    pub fn temp_path(checkpoint: &Path) -> PathBuf {
        let mut name = checkpoint.as_os_str().to_owned();
        name.push(".");
        name.push(CHECKPOINT_TEMP_SUFFIX);
        PathBuf::from(name)
    }

}
