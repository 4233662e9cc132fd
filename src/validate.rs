use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;

/// Checks one detection against the ingestion contract: all four bbox
/// coordinates in `[0, 1]`, corners ordered, confidence in `[0, 1]`.
/// NaN fails the range checks.
pub fn check_detection(det: &Detection) -> Result<(), Error> {
    let b = &det.bbox;

    unit("x1", b.left())?;
    unit("y1", b.top())?;
    unit("x2", b.right())?;
    unit("y2", b.bottom())?;

    if b.left() > b.right() {
        return Err(Error::Validation {
            field: "x1",
            value: b.left(),
        });
    }

    if b.top() > b.bottom() {
        return Err(Error::Validation {
            field: "y1",
            value: b.top(),
        });
    }

    unit("confidence", det.confidence)
}

/// Validates a whole sequence. The first violation rejects the batch;
/// no partial results are returned.
pub fn check_sequence(frames: &[Frame]) -> Result<(), Error> {
    for frame in frames {
        for det in frame.iter() {
            check_detection(det)?;
        }
    }

    Ok(())
}

/// Validates and normalizes: every detection's `frame_index` is rewritten
/// from its frame's position, making the frame list the single source of
/// temporal truth.
pub fn normalized(frames: &[Frame]) -> Result<Vec<Frame>, Error> {
    check_sequence(frames)?;

    Ok(frames
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            let mut frame = frame.clone();
            for det in &mut frame.detections {
                det.frame_index = index;
            }
            frame
        })
        .collect())
}

fn unit(field: &'static str, value: f32) -> Result<(), Error> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, conf: f32) -> Detection {
        Detection::new(0, BBox::ltrb(x1, y1, x2, y2), conf, "smoke")
    }

    #[test]
    fn accepts_a_well_formed_sequence() {
        let frames = vec![
            Frame::new(vec![det(0.1, 0.1, 0.3, 0.3, 0.9)]),
            Frame::new(vec![]),
        ];
        assert!(check_sequence(&frames).is_ok());
    }

    #[test]
    fn rejects_out_of_range_coordinate_naming_the_field() {
        let frames = vec![Frame::new(vec![det(0.1, 0.1, 1.3, 0.3, 0.9)])];
        let err = check_sequence(&frames).unwrap_err();
        assert_eq!(err.to_string(), "invalid x2: 1.3");
    }

    #[test]
    fn rejects_inverted_corners() {
        let frames = vec![Frame::new(vec![det(0.5, 0.1, 0.3, 0.3, 0.9)])];
        assert!(matches!(
            check_sequence(&frames),
            Err(Error::Validation { field: "x1", .. })
        ));
    }

    #[test]
    fn rejects_nan_confidence() {
        let frames = vec![Frame::new(vec![det(0.1, 0.1, 0.3, 0.3, f32::NAN)])];
        assert!(matches!(
            check_sequence(&frames),
            Err(Error::Validation {
                field: "confidence",
                ..
            })
        ));
    }

    #[test]
    fn normalized_rewrites_frame_indices_from_position() {
        let mut stray = det(0.1, 0.1, 0.3, 0.3, 0.9);
        stray.frame_index = 42;

        let frames = vec![Frame::new(vec![]), Frame::new(vec![stray])];
        let frames = normalized(&frames).unwrap();
        assert_eq!(frames[1].detections[0].frame_index, 1);
    }
}
