//! Immutable game configuration
//!
//! A configuration snapshot is taken at session creation; nothing in it
//! changes for the lifetime of the session. The randomization factor is
//! expressed in whole percent so starting-inventory bounds stay in integer
//! arithmetic.

use crate::product::Product;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Game duration must be positive")]
    ZeroDuration,

    #[error("At least 2 players are required, got {0}")]
    TooFewMaxPlayers(u32),

    #[error("Product list must not be empty")]
    NoProducts,

    #[error("Duplicate product: {0}")]
    DuplicateProduct(Product),

    #[error("Missing or non-positive scrap value for {0}")]
    BadScrapValue(Product),

    #[error("Missing or non-positive set recipe entry for {0}")]
    BadRecipeEntry(Product),

    #[error("Recipe references unknown product: {0}")]
    UnknownRecipeProduct(Product),

    #[error("Set value must be positive")]
    ZeroSetValue,

    #[error("Starting inventory target value must be positive")]
    ZeroInventoryTarget,

    #[error("Inventory spread must be below 100 percent, got {0}")]
    SpreadOutOfRange(u8),

    #[error("Order size bounds invalid: min {min}, max {max}")]
    BadOrderSizeBounds { min: u64, max: u64 },
}

/// Immutable parameters of a game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Length of the trading phase in seconds
    pub game_duration_seconds: u64,
    /// Cash every participant starts with
    pub starting_cash: u64,
    /// Maximum number of participants (>= 2)
    pub max_players: u32,
    /// Ordered, distinct product identifiers
    pub products: Vec<Product>,
    /// Per-unit end-of-game value of leftover inventory
    pub scrap_values: BTreeMap<Product, u64>,
    /// Value of one complete set at scoring
    pub set_value: u64,
    /// Units of each product required for one set
    pub set_recipe: BTreeMap<Product, u64>,
    /// Target total scrap value of a generated starting inventory
    pub starting_inventory_target_value: u64,
    /// Allowed deviation from the target, in whole percent (0..100)
    pub starting_inventory_spread_pct: u8,
    pub min_order_size: u64,
    pub max_order_size: u64,
    /// Whether depth projections expose per-order participant names
    pub show_order_names: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        let products: Vec<Product> = ["bread", "veggies", "cheese", "meat"]
            .iter()
            .map(|name| Product::new(*name))
            .collect();
        let scrap_values = products
            .iter()
            .cloned()
            .zip([2u64, 4, 6, 8])
            .collect::<BTreeMap<_, _>>();
        let set_recipe = products.iter().cloned().map(|p| (p, 1u64)).collect();

        Self {
            game_duration_seconds: 300,
            starting_cash: 100,
            max_players: 8,
            products,
            scrap_values,
            set_value: 30,
            set_recipe,
            starting_inventory_target_value: 40,
            starting_inventory_spread_pct: 20,
            min_order_size: 1,
            max_order_size: 100,
            show_order_names: true,
        }
    }
}

impl GameConfig {
    /// Check every structural constraint on the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game_duration_seconds == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.max_players < 2 {
            return Err(ConfigError::TooFewMaxPlayers(self.max_players));
        }
        if self.products.is_empty() {
            return Err(ConfigError::NoProducts);
        }
        for (i, product) in self.products.iter().enumerate() {
            if self.products[..i].contains(product) {
                return Err(ConfigError::DuplicateProduct(product.clone()));
            }
        }
        for product in &self.products {
            match self.scrap_values.get(product) {
                Some(v) if *v > 0 => {}
                _ => return Err(ConfigError::BadScrapValue(product.clone())),
            }
            match self.set_recipe.get(product) {
                Some(v) if *v > 0 => {}
                _ => return Err(ConfigError::BadRecipeEntry(product.clone())),
            }
        }
        for product in self.set_recipe.keys() {
            if !self.products.contains(product) {
                return Err(ConfigError::UnknownRecipeProduct(product.clone()));
            }
        }
        if self.set_value == 0 {
            return Err(ConfigError::ZeroSetValue);
        }
        if self.starting_inventory_target_value == 0 {
            return Err(ConfigError::ZeroInventoryTarget);
        }
        if self.starting_inventory_spread_pct >= 100 {
            return Err(ConfigError::SpreadOutOfRange(
                self.starting_inventory_spread_pct,
            ));
        }
        if self.min_order_size == 0 || self.min_order_size > self.max_order_size {
            return Err(ConfigError::BadOrderSizeBounds {
                min: self.min_order_size,
                max: self.max_order_size,
            });
        }
        Ok(())
    }

    /// Per-unit scrap value of a configured product
    pub fn scrap_value(&self, product: &Product) -> u64 {
        self.scrap_values.get(product).copied().unwrap_or(0)
    }

    /// The configured product with the lowest scrap value
    ///
    /// Ties resolve to the earliest product in the configured order.
    pub fn cheapest_product(&self) -> Option<&Product> {
        self.products
            .iter()
            .min_by_key(|product| self.scrap_value(product))
    }

    /// Lower bound of the starting-inventory value window
    pub fn inventory_value_floor(&self) -> u64 {
        self.starting_inventory_target_value * (100 - self.starting_inventory_spread_pct as u64)
            / 100
    }

    /// Upper bound of the starting-inventory value window
    pub fn inventory_value_ceiling(&self) -> u64 {
        self.starting_inventory_target_value * (100 + self.starting_inventory_spread_pct as u64)
            / 100
    }
}
