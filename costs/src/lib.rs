#![deny(missing_docs)]
//! Cost accounting for hash tree operations.
//!
//! Every tree operation reports how much hashing and comparison work it did,
//! wrapped together with its result in a [`CostContext`].

use std::ops::{Add, AddAssign};

/// Result wrappers carrying an [`OperationCost`].
pub mod context;

pub use context::{CostContext, CostResult, CostsExt};

/// Work performed by a single tree operation.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct OperationCost {
    /// How many times a content item was asked for its digest.
    pub content_hash_calls: u32,
    /// How many internal node digests were computed.
    pub hash_node_calls: u32,
    /// How many content equality checks were performed during lookups.
    pub equality_checks: u32,
}

impl OperationCost {
    /// Returns `true` if no work was recorded.
    pub fn is_nothing(&self) -> bool {
        *self == Self::default()
    }

    /// Helper function to build default `OperationCost` with different
    /// `content_hash_calls`.
    pub fn with_content_hash_calls(content_hash_calls: u32) -> Self {
        OperationCost {
            content_hash_calls,
            ..Default::default()
        }
    }

    /// Helper function to build default `OperationCost` with different
    /// `hash_node_calls`.
    pub fn with_hash_node_calls(hash_node_calls: u32) -> Self {
        OperationCost {
            hash_node_calls,
            ..Default::default()
        }
    }

    /// Helper function to build default `OperationCost` with different
    /// `equality_checks`.
    pub fn with_equality_checks(equality_checks: u32) -> Self {
        OperationCost {
            equality_checks,
            ..Default::default()
        }
    }
}

impl Add for OperationCost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        OperationCost {
            content_hash_calls: self.content_hash_calls + rhs.content_hash_calls,
            hash_node_calls: self.hash_node_calls + rhs.hash_node_calls,
            equality_checks: self.equality_checks + rhs.equality_checks,
        }
    }
}

impl AddAssign for OperationCost {
    fn add_assign(&mut self, rhs: Self) {
        self.content_hash_calls += rhs.content_hash_calls;
        self.hash_node_calls += rhs.hash_node_calls;
        self.equality_checks += rhs.equality_checks;
    }
}

/// Early-return helper for functions returning a [`CostResult`].
///
/// Unwraps a `CostResult`, adding its cost to the accumulator `$cost`. On
/// `Err` the function returns immediately with everything accumulated so
/// far, so no cost is lost on the error path.
#[macro_export]
macro_rules! cost_return_on_error {
    ( &mut $cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result_with_cost = { $($body)+ };
            let result = result_with_cost.unwrap_add_cost(&mut $cost);
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}

/// Like [`cost_return_on_error!`] but for a plain `Result`; only the costs
/// accumulated so far are returned on `Err`.
#[macro_export]
macro_rules! cost_return_on_error_no_add {
    ( $cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result = { $($body)+ };
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}
