//! PostgreSQL. The base rules are written against Postgres, so the only
//! dialect-specific state is the configurable null ordering.

use crate::dialect::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrder {
    First,
    Last,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Postgres {
    /// When set, every ORDER BY clause gets the corresponding
    /// `NULLS FIRST`/`NULLS LAST` suffix.
    pub null_order: Option<NullOrder>,
}

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn null_order_suffix(&self) -> Option<&'static str> {
        self.null_order.map(|order| match order {
            NullOrder::First => "NULLS FIRST",
            NullOrder::Last => "NULLS LAST",
        })
    }
}
