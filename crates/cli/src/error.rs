//! Failures of a `curlflow` invocation and their exit codes.
//!
//! | code | meaning |
//! |------|---------|
//! | 2    | clap could not parse the arguments |
//! | 10   | the simulation rejected its config or a tick |
//! | 11   | a run spec could not be read or a snapshot could not be written |
//! | 12   | malformed user input: `--params`, `--pointer`, run spec contents |
//! | 13   | JSON encoding of a snapshot or report failed |

use curlflow_core::SimError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Building or ticking the simulation failed.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// `--params` is not valid JSON.
    #[error("invalid --params JSON: {0}")]
    Params(String),

    /// `--pointer` is not `x,y,z` or `x,y,z,strength`.
    #[error("invalid --pointer '{text}': {reason}")]
    Pointer { text: String, reason: String },

    /// The `--spec` file is unreadable or not a valid run spec.
    #[error("run spec {}: {source}", .path.display())]
    RunSpec { path: PathBuf, source: SimError },

    /// The `--output` snapshot could not be written.
    #[error("snapshot {}: {source}", .path.display())]
    Snapshot { path: PathBuf, source: SimError },

    /// The summary report could not be encoded.
    #[error("report: {0}")]
    Report(#[from] serde_json::Error),
}

impl CliError {
    pub fn pointer(text: &str, reason: impl Into<String>) -> Self {
        CliError::Pointer {
            text: text.to_owned(),
            reason: reason.into(),
        }
    }

    /// Process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Sim(_) => 10,
            CliError::Params(_) | CliError::Pointer { .. } => 12,
            CliError::RunSpec { source, .. } => match source {
                SimError::Io(_) => 11,
                _ => 12,
            },
            CliError::Snapshot { source, .. } => match source {
                SimError::Serialization(_) => 13,
                _ => 11,
            },
            CliError::Report(_) => 13,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curlflow_core::RunSpec;
    use std::path::Path;

    #[test]
    fn rejected_config_exits_10() {
        let err = CliError::from(SimError::InvalidDamping(3.0));
        assert_eq!(err.exit_code(), 10);
        assert!(err.to_string().contains("damping"));
    }

    #[test]
    fn bad_pointer_exits_12_and_names_the_text() {
        let err = CliError::pointer("1,2", "expected 3 or 4 numbers");
        assert_eq!(err.exit_code(), 12);
        assert!(err.to_string().contains("'1,2'"));
    }

    #[test]
    fn missing_run_spec_is_io() {
        let path = Path::new("/nonexistent/curlflow-run.json");
        let err = CliError::RunSpec {
            path: path.to_path_buf(),
            source: RunSpec::load(path).unwrap_err(),
        };
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("curlflow-run.json"));
    }

    #[test]
    fn malformed_run_spec_is_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"width": 0, "height": 4, "seed": 1}"#).unwrap();
        let err = CliError::RunSpec {
            source: RunSpec::load(&path).unwrap_err(),
            path,
        };
        assert_eq!(err.exit_code(), 12);

        std::fs::write(dir.path().join("junk.json"), "{").unwrap();
        let source = RunSpec::load(&dir.path().join("junk.json")).unwrap_err();
        assert!(matches!(source, SimError::Serialization(_)));
        let err = CliError::RunSpec {
            path: dir.path().join("junk.json"),
            source,
        };
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn snapshot_write_failure_is_io() {
        let err = CliError::Snapshot {
            path: PathBuf::from("out/snap.json"),
            source: SimError::Io("no such directory".into()),
        };
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().starts_with("snapshot out/snap.json"));
    }

    #[test]
    fn report_encoding_failure_exits_13() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(CliError::from(json_err).exit_code(), 13);
    }
}
