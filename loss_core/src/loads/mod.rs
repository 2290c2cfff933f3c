//! Product loads and per-load-type ledgers
//!
//! # Overview
//!
//! - [`ProductForce`] - the load types every force increment is booked against
//! - [`Mechanism`] - creep, shrinkage and relaxation
//! - [`LoadLedger`] - one value per product load type
//! - [`applicable_loads`] - which load types act in a given interval
//!
//! # Example
//!
//! ```
//! use loss_core::loads::{LoadLedger, ProductForce};
//!
//! let ledger = LoadLedger::zero()
//!     .with(ProductForce::GirderSelfWeight, 120.0)
//!     .with(ProductForce::Deck, 80.0);
//!
//! assert_eq!(ledger.total(), 200.0);
//! assert_eq!(ledger[ProductForce::Deck], 80.0);
//! ```

pub mod applicable;
pub mod load_types;

pub use applicable::applicable_loads;
pub use load_types::{Mechanism, ProductForce};

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// A value for each product load type.
///
/// Used for every incremental (`d...`) and cumulative quantity in the
/// time-step records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadLedger {
    values: [f64; ProductForce::COUNT],
}

impl Default for LoadLedger {
    fn default() -> Self {
        LoadLedger::zero()
    }
}

impl LoadLedger {
    pub fn zero() -> Self {
        LoadLedger {
            values: [0.0; ProductForce::COUNT],
        }
    }

    /// Builder-style setter
    pub fn with(mut self, load: ProductForce, value: f64) -> Self {
        self.values[load.index()] = value;
        self
    }

    pub fn get(&self, load: ProductForce) -> f64 {
        self.values[load.index()]
    }

    pub fn set(&mut self, load: ProductForce, value: f64) {
        self.values[load.index()] = value;
    }

    pub fn add(&mut self, load: ProductForce, value: f64) {
        self.values[load.index()] += value;
    }

    /// Sum over all load types
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Sum over the load types selected by `filter`
    pub fn total_where(&self, filter: impl Fn(ProductForce) -> bool) -> f64 {
        ProductForce::ALL
            .iter()
            .filter(|load| filter(**load))
            .map(|load| self.get(*load))
            .sum()
    }

    /// Element-wise sum of two ledgers
    pub fn plus(&self, other: &LoadLedger) -> LoadLedger {
        let mut result = *self;
        for (value, increment) in result.values.iter_mut().zip(other.values.iter()) {
            *value += increment;
        }
        result
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductForce, f64)> + '_ {
        ProductForce::ALL.iter().map(move |load| (*load, self.get(*load)))
    }
}

impl Index<ProductForce> for LoadLedger {
    type Output = f64;

    fn index(&self, load: ProductForce) -> &f64 {
        &self.values[load.index()]
    }
}

impl IndexMut<ProductForce> for LoadLedger {
    fn index_mut(&mut self, load: ProductForce) -> &mut f64 {
        &mut self.values[load.index()]
    }
}
