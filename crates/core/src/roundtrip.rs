//! Comparing an uploaded annotation with the one downloaded back.
//!
//! Keys and server ids are ignored. Objects are compared as a multiset of
//! class names; figures are matched per frame by class name and geometry.

use crate::annotation::VideoAnnotation;
use crate::geometry::Geometry;

/// The downloaded annotation differs from the uploaded one.
#[derive(Debug, thiserror::Error)]
#[error("round-trip mismatch: {}", .mismatches.join("; "))]
pub struct RoundTripError {
    pub mismatches: Vec<String>,
}

/// Describe every difference between `expected` and `actual`.
pub fn compare(expected: &VideoAnnotation, actual: &VideoAnnotation) -> Vec<String> {
    let mut mismatches = Vec::new();

    if expected.size() != actual.size() {
        mismatches.push(format!(
            "frame size {:?} != {:?}",
            expected.size(),
            actual.size()
        ));
    }

    if expected.frames_count() != actual.frames_count() {
        mismatches.push(format!(
            "frames count {} != {}",
            expected.frames_count(),
            actual.frames_count()
        ));
    }

    let class_names = |ann: &VideoAnnotation| {
        let mut names: Vec<String> = ann
            .objects()
            .iter()
            .map(|o| o.class().name().to_string())
            .collect();
        names.sort();
        names
    };
    let (expected_classes, actual_classes) = (class_names(expected), class_names(actual));
    if expected_classes != actual_classes {
        mismatches.push(format!("objects {expected_classes:?} != {actual_classes:?}"));
    }

    let expected_indices: Vec<u32> = expected.frames().iter().map(|f| f.index()).collect();
    let actual_indices: Vec<u32> = actual.frames().iter().map(|f| f.index()).collect();
    if expected_indices != actual_indices {
        mismatches.push(format!(
            "annotated frames {expected_indices:?} != {actual_indices:?}"
        ));
    }

    for frame in expected.frames() {
        let Some(other) = actual.frame(frame.index()) else {
            continue;
        };

        if frame.figures().len() != other.figures().len() {
            mismatches.push(format!(
                "frame {}: {} figures != {}",
                frame.index(),
                frame.figures().len(),
                other.figures().len()
            ));
            continue;
        }

        let mut remaining: Vec<(&str, &Geometry)> = other
            .figures()
            .iter()
            .filter_map(|f| {
                actual
                    .object(f.object_key())
                    .map(|o| (o.class().name(), f.geometry()))
            })
            .collect();

        for figure in frame.figures() {
            let Some(object) = expected.object(figure.object_key()) else {
                continue;
            };
            let class = object.class().name();
            match remaining
                .iter()
                .position(|(c, g)| *c == class && *g == figure.geometry())
            {
                Some(pos) => {
                    remaining.swap_remove(pos);
                }
                None => mismatches.push(format!(
                    "frame {}: no matching {} figure for class '{class}'",
                    frame.index(),
                    figure.geometry().kind()
                )),
            }
        }
    }

    mismatches
}

/// Fail with every difference if the two annotations are not equivalent.
pub fn verify_round_trip(
    expected: &VideoAnnotation,
    actual: &VideoAnnotation,
) -> Result<(), RoundTripError> {
    let mismatches = compare(expected, actual);
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(RoundTripError { mismatches })
    }
}
