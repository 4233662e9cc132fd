use std::fs;
use std::path::{Path, PathBuf};

use crate::bbox::BBox;
use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;

/// Parses one YOLO-style prediction line: `class cx cy w h conf`, all
/// coordinates normalized. A missing trailing confidence defaults to 1.0
/// (ground-truth label files omit it).
pub fn parse_line(line: &str, path: &Path, lineno: usize) -> Result<Detection, Error> {
    let mut fields = line.split_whitespace();

    let class_label = fields
        .next()
        .ok_or_else(|| label_err(path, lineno, "empty line"))?
        .to_string();

    let mut xywh = [0.0f32; 4];
    for (slot, name) in xywh.iter_mut().zip(["cx", "cy", "w", "h"]) {
        let raw = fields
            .next()
            .ok_or_else(|| label_err(path, lineno, &format!("missing {name}")))?;
        *slot = raw
            .parse()
            .map_err(|_| label_err(path, lineno, &format!("bad {name}: {raw}")))?;
    }

    let confidence = match fields.next() {
        Some(raw) => raw
            .parse()
            .map_err(|_| label_err(path, lineno, &format!("bad conf: {raw}")))?,
        None => 1.0,
    };

    // Predicted boxes can spill a hair past the frame edge; clip rather
    // than reject.
    let bbox = BBox::xywh(xywh[0], xywh[1], xywh[2], xywh[3])
        .as_ltrb()
        .clamped();

    Ok(Detection {
        frame_index: 0,
        bbox,
        confidence,
        class_label,
        source_ref: Some(path.display().to_string()),
    })
}

/// Reads one frame's prediction file. Blank lines are skipped.
pub fn load_frame(path: &Path) -> Result<Frame, Error> {
    let text = fs::read_to_string(path)?;
    let mut detections = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        detections.push(parse_line(line, path, lineno + 1)?);
    }

    Ok(Frame {
        source_ref: Some(path.display().to_string()),
        detections,
    })
}

/// Loads a sequence from a directory of per-frame `.txt` prediction files
/// (the `labels_predictions/` layout). Files sorted by name define the frame
/// order; any parse failure rejects the whole sequence.
pub fn load_sequence(dir: &Path) -> Result<Vec<Frame>, Error> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "txt").unwrap_or(false))
        .collect();
    paths.sort();

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        frames.push(load_frame(path)?);
    }

    Ok(frames)
}

fn label_err(path: &Path, line: usize, reason: &str) -> Error {
    Error::Label {
        path: path.display().to_string(),
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn parses_a_prediction_line() {
        let det = parse_line("0 0.5 0.5 0.2 0.4 0.87", Path::new("f.txt"), 1).unwrap();
        assert_eq!(det.class_label, "0");
        assert_relative_eq!(det.confidence, 0.87);
        assert_relative_eq!(det.bbox.left(), 0.4);
        assert_relative_eq!(det.bbox.bottom(), 0.7);
    }

    #[test]
    fn confidence_defaults_to_one_when_absent() {
        let det = parse_line("0 0.5 0.5 0.2 0.2", Path::new("f.txt"), 1).unwrap();
        assert_relative_eq!(det.confidence, 1.0);
    }

    #[test]
    fn edge_box_is_clipped_into_the_unit_square() {
        let det = parse_line("0 0.02 0.5 0.1 0.2 0.9", Path::new("f.txt"), 1).unwrap();
        assert_relative_eq!(det.bbox.left(), 0.0);
    }

    #[test]
    fn malformed_line_names_file_and_line() {
        let err = parse_line("0 0.5 oops 0.2 0.2 0.9", Path::new("f.txt"), 7).unwrap_err();
        assert_eq!(err.to_string(), "f.txt:7: bad cy: oops");
    }

    #[test]
    fn loads_a_sequence_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();

        for (name, conf) in [("0002.txt", 0.7), ("0001.txt", 0.9)] {
            let mut file = fs::File::create(dir.path().join(name)).unwrap();
            writeln!(file, "0 0.5 0.5 0.2 0.2 {conf}").unwrap();
        }
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let frames = load_sequence(dir.path()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_relative_eq!(frames[0].detections[0].confidence, 0.9);
        assert_relative_eq!(frames[1].detections[0].confidence, 0.7);
    }

    #[test]
    fn empty_prediction_file_is_an_empty_frame() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0001.txt"), "\n").unwrap();

        let frames = load_sequence(dir.path()).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_empty());
    }
}
