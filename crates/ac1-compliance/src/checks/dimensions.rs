//! Dimension table and canonical axis order.

use ac1_common::follows_canonical_order;

use super::Checker;
use crate::report::Category;

pub(crate) fn check(c: &mut Checker<'_>) {
    let (dataset, schema) = (c.dataset, c.schema);

    for spec in &schema.dimensions {
        let Some(dim) = dataset.dimension(&spec.name) else {
            c.error(Category::Dimension, &spec.name, "required dimension is missing");
            continue;
        };
        if spec.unlimited && !dim.unlimited {
            c.error(Category::Dimension, &spec.name, "dimension must be unlimited");
        }
        if let Some(size) = spec.size {
            if dim.size != size {
                c.error(
                    Category::Dimension,
                    &spec.name,
                    format!("dimension has size {}, schema requires {}", dim.size, size),
                );
            }
        }
    }

    for name in &schema.forbidden_dimensions {
        if dataset.has_dimension(name) {
            c.error(Category::Dimension, name, "dimension is not allowed in this product");
        }
    }

    for (name, var, _) in dataset.variables() {
        if !follows_canonical_order(var.dims()) {
            c.error(
                Category::Dimension,
                name,
                format!(
                    "dimensions {:?} break the canonical N_COMPONENT, TIME, Z, Y, X order",
                    var.dims()
                ),
            );
        }
    }
}
