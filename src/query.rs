// Typed filter criteria and pagination for list endpoints
//
// Each list endpoint declares a criteria struct whose fields are all
// `Option<T>`. `Criteria::apply` pushes only the present fields into a
// `FilterBuilder`, which wraps `sqlx::QueryBuilder` so every value is bound
// as a parameter.

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, Encode, FromRow, PgPool, Postgres, QueryBuilder, Type};

/// Default page size
pub const DEFAULT_LIMIT: u32 = 10;
/// Maximum page size
pub const MAX_LIMIT: u32 = 100;

/// Page request parsed from `?page=&limit=`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }.normalized()
    }

    /// Clamp page to >= 1 and limit to 1..=MAX_LIMIT
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }

    /// SQL `OFFSET` value
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }

    /// SQL `LIMIT` value
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        let limit = u64::from(request.limit.max(1));
        let total_pages = if total == 0 { 1 } else { (total + limit - 1) / limit };
        let page = u64::from(request.page);

        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}

/// SQL builder that appends `WHERE` conditions only for present filters
pub struct FilterBuilder<'args> {
    builder: QueryBuilder<'args, Postgres>,
    has_condition: bool,
}

impl<'args> FilterBuilder<'args> {
    /// Start from a base statement such as `SELECT ... FROM rooms`
    pub fn new(base: &str) -> Self {
        Self {
            builder: QueryBuilder::new(base),
            has_condition: false,
        }
    }

    fn next_condition(&mut self) -> &mut QueryBuilder<'args, Postgres> {
        if self.has_condition {
            self.builder.push(" AND ");
        } else {
            self.builder.push(" WHERE ");
            self.has_condition = true;
        }
        &mut self.builder
    }

    fn compare<T>(&mut self, column: &str, op: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        if let Some(value) = value {
            self.next_condition()
                .push(column)
                .push(op)
                .push_bind(value);
        }
        self
    }

    /// `column = value`
    pub fn eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        self.compare(column, " = ", value)
    }

    /// `column >= value`
    pub fn gte<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        self.compare(column, " >= ", value)
    }

    /// `column <= value`
    pub fn lte<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        self.compare(column, " <= ", value)
    }

    /// `column < value`
    pub fn lt<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        self.compare(column, " < ", value)
    }

    /// `column > value`
    pub fn gt<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        self.compare(column, " > ", value)
    }

    /// `column IS NULL` / `column IS NOT NULL`
    pub fn is_null(&mut self, column: &str, value: Option<bool>) -> &mut Self {
        if let Some(is_null) = value {
            let suffix = if is_null { " IS NULL" } else { " IS NOT NULL" };
            self.next_condition().push(column).push(suffix);
        }
        self
    }

    /// Case-insensitive substring match across several columns
    pub fn search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        let term = match term.map(str::trim) {
            Some(term) if !term.is_empty() => term,
            _ => return self,
        };
        let pattern = format!("%{}%", term);

        let builder = self.next_condition();
        builder.push("(");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder.push(*column).push(" ILIKE ").push_bind(pattern.clone());
        }
        builder.push(")");
        self
    }

    /// Raw condition with no bound values
    pub fn condition(&mut self, sql: &str) -> &mut Self {
        self.next_condition().push(sql);
        self
    }

    pub fn order_by(&mut self, clause: &str) -> &mut Self {
        self.builder.push(" ORDER BY ").push(clause);
        self
    }

    pub fn paginate(&mut self, page: &PageRequest) -> &mut Self {
        self.builder
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        self
    }

    /// Generated SQL, for logging and tests
    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub fn into_inner(self) -> QueryBuilder<'args, Postgres> {
        self.builder
    }
}

/// Typed filter criteria applied to a `FilterBuilder`
pub trait Criteria {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>);
}

/// Run a filtered count and a filtered page query with the same criteria
pub async fn fetch_page<T, C>(
    pool: &PgPool,
    select_sql: &str,
    count_sql: &str,
    criteria: &C,
    order_by: &str,
    page: PageRequest,
) -> Result<Page<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize,
    C: Criteria + Sync,
{
    let page = page.normalized();

    let mut counter = FilterBuilder::new(count_sql);
    criteria.apply(&mut counter);
    let mut counter = counter.into_inner();
    let total: i64 = counter.build_query_scalar().fetch_one(pool).await?;

    let mut rows = FilterBuilder::new(select_sql);
    criteria.apply(&mut rows);
    rows.order_by(order_by).paginate(&page);
    tracing::debug!(sql = rows.sql(), "Fetching page");
    let mut rows = rows.into_inner();
    let items = rows.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Page::new(items, &page, total.max(0) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_page_request_offsets() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
        assert_eq!(PageRequest::new(0, 10).page, 1);
        assert_eq!(PageRequest::new(1, 0).limit, 1);
        assert_eq!(PageRequest::new(1, 1000).limit, MAX_LIMIT);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2, 3], &PageRequest::new(2, 3), 7);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_previous);

        let empty: Page<i32> = Page::new(vec![], &PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next);
        assert!(!empty.has_previous);
    }

    #[test]
    fn test_absent_filters_add_no_where_clause() {
        let mut filter = FilterBuilder::new("SELECT * FROM rooms");
        filter
            .eq::<Uuid>("property_id", None)
            .search(&["number"], None)
            .search(&["number"], Some("   "))
            .is_null("notes", None);
        assert_eq!(filter.sql(), "SELECT * FROM rooms");
    }

    #[test]
    fn test_present_filters_are_bound() {
        let mut filter = FilterBuilder::new("SELECT * FROM reservations r");
        filter
            .eq("r.property_id", Some(Uuid::new_v4()))
            .search(&["r.confirmation_code", "g.email"], Some("smith"))
            .is_null("r.room_id", Some(false))
            .order_by("r.created_at DESC")
            .paginate(&PageRequest::new(2, 5));

        assert_eq!(
            filter.sql(),
            "SELECT * FROM reservations r WHERE r.property_id = $1 AND \
             (r.confirmation_code ILIKE $2 OR g.email ILIKE $3) AND r.room_id IS NOT NULL \
             ORDER BY r.created_at DESC LIMIT $4 OFFSET $5"
        );
    }
}
