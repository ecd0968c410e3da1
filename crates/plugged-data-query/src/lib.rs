pub mod builder;
pub mod descriptor;
pub mod execute;
pub mod filter;
pub mod postgrest;
pub mod select;
pub mod write;

pub use builder::{ConnectionQueryExt, QueryBuilder};
pub use descriptor::{Modifiable, OrderBy, OrderDirection, QueryDescriptor, RowRange};
pub use filter::{Filter, FilterOperator, FilterValue, Filterable, IntoFilterValue, IsValue};
pub use postgrest::RestRequest;
pub use select::SelectBuilder;
pub use write::{DeleteBuilder, InsertBuilder, UpdateBuilder};
