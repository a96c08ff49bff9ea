//! Price Projector
//!
//! Turns a resolution into the price and image set the storefront shows.

use serde::{Deserialize, Serialize};

use super::resolve::Resolution;
use crate::domain::aggregates::Product;
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayProjection {
    pub price: Money,
    pub images: Vec<String>,
}

/// Projection rules, in order: a resolved variant shows its own price and
/// its own images when it has any, else the base images. Without a resolved
/// variant a listing with variants shows the cheapest variant price over the
/// base images; a listing without variants shows its base price and images.
pub fn project(product: &Product, resolution: &Resolution<'_>) -> DisplayProjection {
    match resolution.variant {
        Some(variant) => DisplayProjection {
            price: variant.price.clone(),
            images: variant.own_images().unwrap_or_else(|| product.display_images()),
        },
        None => DisplayProjection {
            price: cheapest_price(product),
            images: product.display_images(),
        },
    }
}

/// The "from" price: the lowest variant price, or the base price for a
/// listing without variants.
pub fn cheapest_price(product: &Product) -> Money {
    product
        .variants
        .iter()
        .map(|v| &v.price)
        .min_by_key(|m| m.amount())
        .cloned()
        .unwrap_or_else(|| product.price.clone())
}
