//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod merchant;
pub mod report;
pub mod transaction;
pub mod user;

pub use merchant::MerchantRepository;
pub use report::ReportRepository;
pub use transaction::TransactionRepository;
pub use user::{NewUser, UserRepository};

use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use tally_core::ledger::search::LIKE_ESCAPE;
use tally_core::ledger::{contains_pattern, literal_pattern};

/// Case-insensitive "contains `term`" on `column`.
///
/// `LOWER(column) LIKE lower(term) OR column LIKE term`. SQLite's `LOWER`
/// and `LIKE` fold ASCII only, so there a non-ASCII letter matches only in
/// its stored case; PostgreSQL folds fully.
pub(crate) fn icontains<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    let folded = Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(contains_pattern(term)).escape(LIKE_ESCAPE));
    let literal = Expr::col(column.as_column_ref())
        .like(LikeExpr::new(literal_pattern(term)).escape(LIKE_ESCAPE));
    folded.or(literal)
}
