//! Canonical dimension order.
//!
//! Variable dimension tuples follow
//! `N_COMPONENT, TIME, DEPTH|PRESSURE|SIGMA0, LATITUDE, LONGITUDE`, with any
//! subset allowed as long as the relative order is kept and at most one
//! vertical dimension appears.

use crate::{LATITUDE, LONGITUDE, N_COMPONENT, TIME, VERTICAL_DIMS};

/// Position of a dimension in the canonical order, `None` if it has none.
pub fn canonical_rank(dim: &str) -> Option<usize> {
    match dim {
        N_COMPONENT => Some(0),
        TIME => Some(1),
        d if VERTICAL_DIMS.contains(&d) => Some(2),
        LATITUDE => Some(3),
        LONGITUDE => Some(4),
        _ => None,
    }
}

/// Whether `dims` is a subsequence of the canonical order.
pub fn follows_canonical_order<S: AsRef<str>>(dims: &[S]) -> bool {
    let mut last: Option<usize> = None;
    for dim in dims {
        let Some(rank) = canonical_rank(dim.as_ref()) else {
            return false;
        };
        if last.is_some_and(|l| rank <= l) {
            return false;
        }
        last = Some(rank);
    }
    true
}

/// Whether `dim` is one of the vertical dimensions.
pub fn is_vertical(dim: &str) -> bool {
    VERTICAL_DIMS.contains(&dim)
}
