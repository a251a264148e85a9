//! JSON snapshots of the front buffer.

use curlflow_core::error::SimError;
use curlflow_core::{ParticleCell, StateReader};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

#[derive(Serialize)]
struct Snapshot<'a> {
    width: usize,
    height: usize,
    tick: u64,
    cells: &'a [ParticleCell],
}

impl<'a> Snapshot<'a> {
    fn new(reader: StateReader<'a>, tick: u64) -> Self {
        Self {
            width: reader.width(),
            height: reader.height(),
            tick,
            cells: reader.cells(),
        }
    }
}

/// Builds `{width, height, tick, cells}` for the given reader.
pub fn to_value(reader: StateReader<'_>, tick: u64) -> Result<Value, SimError> {
    Ok(serde_json::to_value(Snapshot::new(reader, tick))?)
}

/// Writes the snapshot as pretty-printed JSON.
///
/// Returns `SimError::Serialization` if encoding fails, or `SimError::Io`
/// on write failure.
pub fn write_json(reader: StateReader<'_>, tick: u64, path: &Path) -> Result<(), SimError> {
    let json = serde_json::to_string_pretty(&Snapshot::new(reader, tick))?;
    std::fs::write(path, json).map_err(|e| SimError::Io(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use curlflow_core::StateBuffer;
    use glam::DVec3;

    fn buffer() -> StateBuffer {
        let cells = vec![
            ParticleCell::at(DVec3::new(1.0, 2.0, 3.0)),
            ParticleCell::moving(DVec3::ZERO, DVec3::new(0.5, -0.5, 0.0)),
        ];
        StateBuffer::from_cells(2, 1, cells).unwrap()
    }

    #[test]
    fn value_has_expected_shape() {
        let b = buffer();
        let v = to_value(b.reader(), 7).unwrap();
        assert_eq!(v["width"], 2);
        assert_eq!(v["height"], 1);
        assert_eq!(v["tick"], 7);
        let cells = v["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0]["position"], serde_json::json!([1.0, 2.0, 3.0]));
        assert_eq!(cells[1]["velocity"], serde_json::json!([0.5, -0.5, 0.0]));
        assert!(cells[0].get("respawn_pending").is_none());
    }

    #[test]
    fn write_json_round_trip() {
        let b = buffer();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        write_json(b.reader(), 3, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["tick"], 3);
        let cells: Vec<ParticleCell> = serde_json::from_value(v["cells"].clone()).unwrap();
        assert_eq!(cells, b.reader().cells());
    }

    #[test]
    fn write_to_missing_directory_is_io_error() {
        let b = buffer();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("snapshot.json");
        assert!(matches!(
            write_json(b.reader(), 0, &path),
            Err(SimError::Io(_))
        ));
    }
}
