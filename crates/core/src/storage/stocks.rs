use crate::domain::stock::StockRecord;
use anyhow::Context;
use sqlx::{Postgres, QueryBuilder};

pub const PAGE_SIZE: i64 = 5;

const SELECT_STOCKS: &str = "SELECT id, ticker, target_from, target_to, company, action, \
     brokerage, rating_from, rating_to, time FROM stocks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Id,
    #[default]
    Ticker,
    TargetFrom,
    TargetTo,
    Company,
    Action,
    Brokerage,
    RatingFrom,
    RatingTo,
    Time,
}

impl SortColumn {
    pub fn from_field(name: &str) -> Option<Self> {
        Some(match name {
            "Id" => Self::Id,
            "Ticker" => Self::Ticker,
            "TargetFrom" => Self::TargetFrom,
            "TargetTo" => Self::TargetTo,
            "Company" => Self::Company,
            "Action" => Self::Action,
            "Brokerage" => Self::Brokerage,
            "RatingFrom" => Self::RatingFrom,
            "RatingTo" => Self::RatingTo,
            "Time" => Self::Time,
            _ => return None,
        })
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Ticker => "ticker",
            Self::TargetFrom => "target_from",
            Self::TargetTo => "target_to",
            Self::Company => "company",
            Self::Action => "action",
            Self::Brokerage => "brokerage",
            Self::RatingFrom => "rating_from",
            Self::RatingTo => "rating_to",
            Self::Time => "time",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockQuery {
    pub page: i64,
    pub sort_by: SortColumn,
    pub ascending: bool,
    pub ticker_filter: Option<String>,
}

impl StockQuery {
    // Bad values fall back to defaults.
    pub fn from_params(
        offset: Option<&str>,
        sort_by: Option<&str>,
        asc: Option<&str>,
        query: Option<&str>,
    ) -> Self {
        let page = offset
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|p| *p >= 0)
            .unwrap_or(0);

        Self {
            page,
            sort_by: sort_by.and_then(SortColumn::from_field).unwrap_or_default(),
            ascending: asc == Some("true"),
            ticker_filter: query.filter(|q| !q.is_empty()).map(str::to_string),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(PAGE_SIZE)
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn build_list_query(query: &StockQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_STOCKS);

    if let Some(filter) = &query.ticker_filter {
        qb.push(" WHERE ticker ILIKE ")
            .push_bind(format!("%{}%", escape_like(filter)));
    }

    let direction = if query.ascending { "ASC" } else { "DESC" };
    qb.push(format!(" ORDER BY {} {direction}", query.sort_by.column()));
    // Tiebreaker for stable paging.
    if query.sort_by != SortColumn::Id {
        qb.push(", id");
    }
    qb.push(" LIMIT ")
        .push_bind(PAGE_SIZE)
        .push(" OFFSET ")
        .push_bind(query.offset());
    qb
}

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: String,
    ticker: String,
    target_from: String,
    target_to: String,
    company: Option<String>,
    action: Option<String>,
    brokerage: Option<String>,
    rating_from: Option<String>,
    rating_to: Option<String>,
    time: String,
}

impl From<StockRow> for StockRecord {
    fn from(row: StockRow) -> Self {
        Self {
            id: row.id,
            ticker: row.ticker,
            target_from: row.target_from,
            target_to: row.target_to,
            company: row.company.unwrap_or_default(),
            action: row.action.unwrap_or_default(),
            brokerage: row.brokerage.unwrap_or_default(),
            rating_from: row.rating_from.unwrap_or_default(),
            rating_to: row.rating_to.unwrap_or_default(),
            time: row.time,
        }
    }
}

pub async fn list_stocks(pool: &sqlx::PgPool, query: &StockQuery) -> anyhow::Result<Vec<StockRecord>> {
    let t0 = std::time::Instant::now();
    let rows = build_list_query(query)
        .build_query_as::<StockRow>()
        .fetch_all(pool)
        .await
        .context("select stocks page failed")?;

    tracing::debug!(
        page = query.page,
        sort_by = query.sort_by.column(),
        ascending = query.ascending,
        rows = rows.len(),
        elapsed_ms = t0.elapsed().as_millis(),
        "stocks page query"
    );
    Ok(rows.into_iter().map(StockRecord::from).collect())
}

pub async fn fetch_first_stock(pool: &sqlx::PgPool) -> anyhow::Result<Option<StockRecord>> {
    let row = sqlx::query_as::<_, StockRow>(&format!("{SELECT_STOCKS} ORDER BY id LIMIT 1"))
        .fetch_optional(pool)
        .await
        .context("select first stock failed")?;
    Ok(row.map(StockRecord::from))
}

pub async fn fetch_stock_by_id(
    pool: &sqlx::PgPool,
    id: &str,
) -> anyhow::Result<Option<StockRecord>> {
    let row = sqlx::query_as::<_, StockRow>(&format!("{SELECT_STOCKS} WHERE id = $1 LIMIT 1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("select stock id={id} failed"))?;
    Ok(row.map(StockRecord::from))
}
