//! MED (Median Edge Detector) predictor, applied independently per
//! component.
//!
//! The three-branch formula mirrors the teacher's
//! `get_median(a, b, c) = a + b + c - min - max` identity for its middle
//! case, and is named after `HybridCodec.py::predict`'s W/N/NW
//! neighbours, which is this crate's direct source for the predictor.

/// Given West, North, and Northwest neighbour values, returns the MED
/// prediction for the current sample.
pub fn med_predict(w: i32, n: i32, nw: i32) -> i32 {
    let lo = w.min(n);
    let hi = w.max(n);
    if nw >= hi {
        lo
    } else if nw <= lo {
        hi
    } else {
        w + n - nw
    }
}

/// Applies `med_predict` to each of the three (Y, U, V) components.
pub fn med_predict_triple(
    west: (i32, i32, i32),
    north: (i32, i32, i32),
    northwest: (i32, i32, i32),
) -> (i32, i32, i32) {
    (
        med_predict(west.0, north.0, northwest.0),
        med_predict(west.1, north.1, northwest.1),
        med_predict(west.2, north.2, northwest.2),
    )
}
