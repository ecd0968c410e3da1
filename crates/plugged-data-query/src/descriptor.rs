use crate::filter::Filter;

/// Sort direction for [`OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: OrderDirection,
}

/// Inclusive, zero-based row window sent as the `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub from: u64,
    pub to: u64,
}

impl RowRange {
    pub fn header_value(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

/// Everything needed to render one read request.
///
/// Plain data: builders own one and hand a modified copy to the next stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryDescriptor {
    pub table: String,
    pub projection: String,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub limit: Option<u64>,
    pub range: Option<RowRange>,
    /// Ask for an exact row count (`Prefer: count=exact`).
    pub count: bool,
}

impl QueryDescriptor {
    pub fn new(table: impl Into<String>, projection: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: projection.into(),
            ..Default::default()
        }
    }

    /// Restrict to the first matching row.
    ///
    /// A ranged descriptor keeps its start row; otherwise the limit becomes 1.
    pub fn first_row_only(&mut self) {
        match self.range {
            Some(range) => {
                self.range = Some(RowRange {
                    from: range.from,
                    to: range.from,
                })
            }
            None => self.limit = Some(1),
        }
    }
}

/// Ordering and pagination shared by read builders.
pub trait Modifiable: Sized {
    fn descriptor_mut(&mut self) -> &mut QueryDescriptor;

    /// Sort by a column. A later call replaces an earlier one.
    fn order(mut self, column: &str, direction: OrderDirection) -> Self {
        if let Err(e) = crate::filter::validate_column_name(column) {
            tracing::error!("Invalid column name in order: {e}");
            return self;
        }
        self.descriptor_mut().order = Some(OrderBy {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Sort ascending (`ascending = true`) or descending.
    fn order_by(self, column: &str, ascending: bool) -> Self {
        let direction = if ascending {
            OrderDirection::Ascending
        } else {
            OrderDirection::Descending
        };
        self.order(column, direction)
    }

    /// Return at most `count` rows. Ignored when a range is set.
    fn limit(mut self, count: u64) -> Self {
        self.descriptor_mut().limit = Some(count);
        self
    }

    /// Return rows `from..=to` (zero-based).
    fn range(mut self, from: u64, to: u64) -> Self {
        if to < from {
            tracing::error!("Invalid range {from}-{to}: end before start");
            return self;
        }
        self.descriptor_mut().range = Some(RowRange { from, to });
        self
    }

    /// Request an exact total row count alongside the data.
    fn count_exact(mut self) -> Self {
        self.descriptor_mut().count = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(QueryDescriptor);

    impl Modifiable for Probe {
        fn descriptor_mut(&mut self) -> &mut QueryDescriptor {
            &mut self.0
        }
    }

    #[test]
    fn later_order_replaces_earlier() {
        let probe = Probe(QueryDescriptor::new("orders", "*"))
            .order("created_at", OrderDirection::Ascending)
            .order_by("total", false);
        assert_eq!(
            probe.0.order,
            Some(OrderBy {
                column: "total".into(),
                direction: OrderDirection::Descending
            })
        );
    }

    #[test]
    fn inverted_range_is_skipped() {
        let probe = Probe(QueryDescriptor::new("orders", "*")).range(5, 2);
        assert_eq!(probe.0.range, None);
    }

    #[test]
    fn first_row_only_respects_range() {
        let mut d = QueryDescriptor::new("orders", "*");
        d.first_row_only();
        assert_eq!(d.limit, Some(1));

        let mut d = QueryDescriptor::new("orders", "*");
        d.range = Some(RowRange { from: 10, to: 19 });
        d.first_row_only();
        assert_eq!(d.range, Some(RowRange { from: 10, to: 10 }));
        assert_eq!(d.limit, None);
    }
}
