//! Paginated query builder.
//!
//! Translates a `(page, per_page, filter, ordering)` request into two
//! queries against one table — a bounded/offset row fetch and a total
//! count — executed concurrently, and assembles a page descriptor.

use std::time::Instant;

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use tazeai_core::{DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE};

use crate::Db;
use crate::error::DbError;

/// Page boundary metadata, serialized with the wire field names the
/// console UI expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
}

/// Result of a paginated query: the data slice plus totals and the
/// wall-clock duration of both queries, in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
    pub total: i64,
    pub duration: u64,
}

/// Coerce a numeric-string parameter to an integer.
///
/// Unparseable, non-finite, or sub-1 values silently fall back to the
/// default — availability over strict validation, by contract. Fractional
/// inputs floor.
#[must_use]
pub fn coerce_int(value: Option<&str>, default: i64) -> i64 {
    let Some(raw) = value else { return default };
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return if n >= 1 { n } else { default };
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 1.0 => f.floor() as i64,
        _ => default,
    }
}

#[derive(Debug, Clone)]
enum Clause {
    ILike { column: String, pattern: String },
    Eq { column: String, value: String },
}

/// Parameterized predicate over a table. Values are always bound, never
/// interpolated; column names are validated as identifiers when rendered.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match: `column ILIKE %needle%`, with
    /// LIKE metacharacters in the needle escaped.
    #[must_use]
    pub fn ilike(mut self, column: impl Into<String>, needle: &str) -> Self {
        self.clauses.push(Clause::ILike {
            column: column.into(),
            pattern: format!("%{}%", escape_like(needle)),
        });
        self
    }

    /// Exact match on a text column.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Eq { column: column.into(), value: value.into() });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders `WHERE ...` with placeholders starting at `$1`, returning
    /// the SQL fragment and the values to bind, in order.
    fn render(&self) -> Result<(String, Vec<&str>), DbError> {
        if self.clauses.is_empty() {
            return Ok((String::new(), Vec::new()));
        }
        let mut parts = Vec::with_capacity(self.clauses.len());
        let mut binds = Vec::with_capacity(self.clauses.len());
        for (idx, clause) in self.clauses.iter().enumerate() {
            let placeholder = idx + 1;
            match clause {
                Clause::ILike { column, pattern } => {
                    check_identifier(column)?;
                    parts.push(format!("{column} ILIKE ${placeholder}"));
                    binds.push(pattern.as_str());
                },
                Clause::Eq { column, value } => {
                    check_identifier(column)?;
                    parts.push(format!("{column} = ${placeholder}"));
                    binds.push(value.as_str());
                },
            }
        }
        Ok((format!(" WHERE {}", parts.join(" AND ")), binds))
    }
}

/// A single ordering term.
#[derive(Debug, Clone)]
pub struct OrderBy {
    column: String,
    descending: bool,
}

impl OrderBy {
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into(), descending: false }
    }

    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self { column: column.into(), descending: true }
    }
}

/// Options for [`Builder::paginate`]. `per_page` takes the raw query-string
/// value and is coerced like `page`.
#[derive(Debug, Clone, Default)]
pub struct PaginateOptions {
    pub per_page: Option<String>,
    pub filter: Option<Filter>,
    pub order_by: Vec<OrderBy>,
}

/// Pagination helper over a single table.
#[derive(Debug)]
pub struct Builder<'a> {
    pool: &'a PgPool,
    table: String,
    columns: Vec<String>,
}

impl<'a> Builder<'a> {
    pub fn new(db: &'a Db, table: impl Into<String>) -> Self {
        Self { pool: db.pool(), table: table.into(), columns: Vec::new() }
    }

    /// Restrict the row fetch to specific columns (defaults to `*`).
    #[must_use]
    pub fn select<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Fetch one page plus the total count, concurrently.
    ///
    /// `page` is the raw query-string value; invalid or absent input falls
    /// back to page 1 (see [`coerce_int`]). The offset is unbounded above:
    /// a page past the end of the result set yields an empty `data` with
    /// `total` and `last_page` still correct. `per_page` is clamped to
    /// [`MAX_PER_PAGE`]; a caller asking for more rows gets that many.
    ///
    /// # Errors
    /// Database errors from either query abort the whole call — no retry,
    /// no partial result.
    pub async fn paginate<T>(
        &self,
        page: Option<&str>,
        options: PaginateOptions,
    ) -> Result<Page<T>, DbError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        check_identifier(&self.table)?;
        let current_page = coerce_int(page, DEFAULT_PAGE);
        let per_page =
            coerce_int(options.per_page.as_deref(), DEFAULT_PER_PAGE).min(MAX_PER_PAGE);
        let offset = page_offset(current_page, per_page);

        let filter = options.filter.unwrap_or_default();
        let (where_sql, binds) = filter.render()?;
        let order_sql = render_order_by(&options.order_by)?;

        let select_sql = format!(
            "SELECT {columns} FROM {table}{where_sql}{order_sql} LIMIT {per_page} OFFSET {offset}",
            columns = self.column_list()?,
            table = self.table,
        );
        let count_sql = format!("SELECT COUNT(*) FROM {}{}", self.table, where_sql);

        let rows_query = {
            let mut query = sqlx::query_as::<_, T>(&select_sql);
            for bind in &binds {
                query = query.bind(*bind);
            }
            query
        };
        let count_query = {
            let mut query = sqlx::query_scalar::<_, i64>(&count_sql);
            for bind in &binds {
                query = query.bind(*bind);
            }
            query
        };

        let start = Instant::now();
        let (data, total) = tokio::try_join!(
            rows_query.fetch_all(self.pool),
            count_query.fetch_one(self.pool),
        )?;
        let duration = start.elapsed().as_millis() as u64;

        Ok(Page {
            data,
            pagination: PageInfo {
                current_page,
                last_page: last_page(total, per_page),
                per_page,
            },
            total,
            duration,
        })
    }

    fn column_list(&self) -> Result<String, DbError> {
        if self.columns.is_empty() {
            return Ok("*".to_owned());
        }
        for column in &self.columns {
            check_identifier(column)?;
        }
        Ok(self.columns.join(", "))
    }
}

/// `ceil(total / per_page)` in integer arithmetic.
fn last_page(total: i64, per_page: i64) -> i64 {
    if total <= 0 { 0 } else { (total + per_page - 1) / per_page }
}

/// Rows to skip for a page. Saturates so that an absurdly large (but
/// numerically valid) page number stays a non-negative `OFFSET` instead of
/// overflowing.
fn page_offset(current_page: i64, per_page: i64) -> i64 {
    current_page.saturating_sub(1).saturating_mul(per_page)
}

fn render_order_by(terms: &[OrderBy]) -> Result<String, DbError> {
    if terms.is_empty() {
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(terms.len());
    for term in terms {
        check_identifier(&term.column)?;
        let direction = if term.descending { "DESC" } else { "ASC" };
        parts.push(format!("{} {}", term.column, direction));
    }
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}

/// Escapes LIKE metacharacters in a user-supplied needle.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Identifiers (tables, columns) come from code, never from callers, but
/// the check keeps a typo from turning into interpolated SQL.
fn check_identifier(name: &str) -> Result<(), DbError> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.chars().next().is_some_and(|c| c.is_ascii_digit());
    if valid { Ok(()) } else { Err(DbError::InvalidIdentifier(name.to_owned())) }
}
