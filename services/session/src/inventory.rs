//! Starting-inventory generation
//!
//! Every joiner receives a random inventory whose scrap value lands inside
//! the configured window around the target. Generation is deterministic
//! under a seeded RNG, which is how the tests pin it down.

use rand::Rng;
use std::collections::BTreeMap;

use types::config::GameConfig;
use types::product::Product;

/// Generate a starting inventory with scrap value in
/// `[target·(1−f), target·(1+f)]`
///
/// Random phase: draw uniformly among products, adding a unit whenever it
/// fits under the ceiling, until the floor is reached. Top-up phase: if the
/// random phase stopped short of the target, add the cheapest product that
/// still fits until the target is met or nothing fits.
pub fn generate_starting_inventory<R: Rng>(
    config: &GameConfig,
    rng: &mut R,
) -> BTreeMap<Product, u64> {
    let floor = config.inventory_value_floor();
    let ceiling = config.inventory_value_ceiling();
    let target = config.starting_inventory_target_value;

    let mut inventory: BTreeMap<Product, u64> = config
        .products
        .iter()
        .map(|p| (p.clone(), 0u64))
        .collect();
    let mut current = 0u64;

    let min_value = config
        .products
        .iter()
        .map(|p| config.scrap_value(p))
        .min()
        .unwrap_or(0);
    if min_value == 0 {
        return inventory;
    }

    // Random phase: uniform draws until the floor is reached or nothing
    // can fit under the ceiling anymore
    while current < floor && current + min_value <= ceiling {
        let pick = rng.gen_range(0..config.products.len());
        let product = &config.products[pick];
        let value = config.scrap_value(product);
        if current + value <= ceiling {
            *inventory
                .entry(product.clone())
                .or_insert(0) += 1;
            current += value;
        }
    }

    // Top-up phase: cheapest product that still fits, until the target
    while current < target {
        let fitting = config
            .products
            .iter()
            .filter(|p| current + config.scrap_value(p) <= ceiling)
            .min_by_key(|p| config.scrap_value(p));
        let Some(product) = fitting else {
            break;
        };
        current += config.scrap_value(product);
        *inventory.entry(product.clone()).or_insert(0) += 1;
    }

    inventory
}
