use crate::OperationCost;

/// A value together with the hashing work spent on it.
#[must_use]
#[derive(Debug, Eq, PartialEq)]
pub struct CostContext<T> {
    /// What the operation produced.
    pub value: T,
    /// Hashes and comparisons it took.
    pub cost: OperationCost,
}

impl<T> CostContext<T> {
    /// Move the cost into `total` and return the value.
    pub fn unwrap_add_cost(self, total: &mut OperationCost) -> T {
        *total += self.cost;
        self.value
    }

    /// Return the value, discarding the cost.
    pub fn unwrap(self) -> T {
        self.value
    }

    /// Fold work done before this operation into its cost.
    pub fn add_cost(mut self, earlier: OperationCost) -> Self {
        self.cost += earlier;
        self
    }
}

/// Fallible operation with its cost.
pub type CostResult<T, E> = CostContext<Result<T, E>>;

/// Attaches an [`OperationCost`] to any value.
pub trait CostsExt {
    /// Pair `self` with `cost`.
    fn wrap_with_cost(self, cost: OperationCost) -> CostContext<Self>
    where
        Self: Sized,
    {
        CostContext { value: self, cost }
    }
}

impl<T> CostsExt for T {}
