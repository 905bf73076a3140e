//! Execution adapter for query augmentation
//!
//! Wraps any parameterized-SQL [`Executor`] so that calls carrying a
//! [`Builder`](sqlshape_sql::Builder) in their [`QueryContext`] are rewritten
//! before they reach the database.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlshape_exec::{Augmented, Executor, MockExecutor, QueryContext};
//! use sqlshape_sql::Builder;
//!
//! let db = Augmented::new(MockExecutor::new());
//! let ctx = QueryContext::new().with_builder(
//!     Builder::new().and_where("tenant_id = ?", [42]).limit(20),
//! );
//! let rows = db.query(&ctx, "SELECT * FROM orders", vec![]).await?;
//! ```

pub mod adapter;
pub mod mock;

pub use adapter::{Augmented, ExecError, Executor, QueryContext};
pub use mock::{CallKind, MockError, MockExecutor, MockExecutorBuilder, MockStatement, RecordedCall};
