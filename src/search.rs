//! Filtered, paginated video queries.
//!
//! Every listing endpoint funnels through [`search_videos`], so the count
//! query and the page query are always built from the same [`VideoFilter`].

use log::debug;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{Video, VideoType};

/// Raw query-string parameters accepted by the listing and search endpoints.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<String>,
    #[serde(rename = "type")]
    pub video_type: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRange {
    pub min: f64,
    pub max: Option<f64>,
}

/// Parses the rating filter the clients send (`"8-9"`, `"9+"`, `"7"`).
/// Anything else is ignored rather than rejected.
pub fn parse_rating_range(raw: &str) -> Option<RatingRange> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let in_bounds = |v: f64| (0.0..=10.0).contains(&v);

    if let Some(min) = raw.strip_suffix('+') {
        let min: f64 = min.trim().parse().ok()?;
        return in_bounds(min).then_some(RatingRange { min, max: None });
    }

    if let Some((lo, hi)) = raw.split_once('-') {
        let min: f64 = lo.trim().parse().ok()?;
        let max: f64 = hi.trim().parse().ok()?;
        if !in_bounds(min) || !in_bounds(max) || min > max {
            return None;
        }
        return Some(RatingRange { min, max: Some(max) });
    }

    let min: f64 = raw.parse().ok()?;
    in_bounds(min).then_some(RatingRange { min, max: None })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Rating,
    Views,
    Title,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("oldest") => SortOrder::Oldest,
            Some("rating") => SortOrder::Rating,
            Some("views") | Some("popular") => SortOrder::Views,
            Some("title") => SortOrder::Title,
            _ => SortOrder::Newest,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            SortOrder::Newest => " ORDER BY created_at DESC, id DESC",
            SortOrder::Oldest => " ORDER BY created_at ASC, id ASC",
            SortOrder::Rating => " ORDER BY rating DESC, id DESC",
            SortOrder::Views => " ORDER BY views DESC, id DESC",
            SortOrder::Title => " ORDER BY title COLLATE NOCASE ASC, id ASC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn from_params(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        let limit = pagination.limit.max(1) as i64;
        let total_pages = ((total.max(0) + limit - 1) / limit) as u32;
        Self {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages,
            has_more: pagination.page < total_pages,
        }
    }
}

/// A normalized video filter.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub text: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<RatingRange>,
    pub video_type: Option<VideoType>,
    pub featured_only: bool,
    pub new_only: bool,
    pub include_hidden: bool,
    pub sort: SortOrder,
}

impl VideoFilter {
    pub fn from_params(params: &SearchParams) -> Self {
        let rating = params.rating.as_deref().and_then(|raw| {
            let parsed = parse_rating_range(raw);
            if parsed.is_none() {
                debug!("Ignoring unrecognised rating filter {:?}", raw);
            }
            parsed
        });

        Self {
            text: non_blank(params.q.as_deref()),
            genre: non_blank(params.genre.as_deref()),
            year: params.year,
            rating,
            video_type: params.video_type.as_deref().and_then(|t| t.parse().ok()),
            sort: SortOrder::parse(params.sort.as_deref()),
            ..Self::default()
        }
    }

    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1=1");

        if !self.include_hidden {
            qb.push(" AND is_hidden = 0");
        }
        if self.featured_only {
            qb.push(" AND is_featured = 1");
        }
        if self.new_only {
            qb.push(" AND is_new = 1");
        }
        if let Some(video_type) = self.video_type {
            qb.push(" AND video_type = ");
            qb.push_bind(video_type.as_str());
        }
        if let Some(text) = &self.text {
            let pattern = format!("%{}%", escape_like_literal(text));
            qb.push(" AND (title LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR description LIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\')");
        }
        if let Some(genre) = &self.genre {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(videos.genre_keys) WHERE json_each.value = ");
            qb.push_bind(genre.to_lowercase());
            qb.push(")");
        }
        if let Some(year) = self.year {
            qb.push(" AND year = ");
            qb.push_bind(year);
        }
        if let Some(range) = self.rating {
            qb.push(" AND rating >= ");
            qb.push_bind(range.min);
            if let Some(max) = range.max {
                qb.push(" AND rating <= ");
                qb.push_bind(max);
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn escape_like_literal(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            other => out.push(other),
        }
    }
    out
}

pub async fn count_videos(pool: &SqlitePool, filter: &VideoFilter) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM videos");
    filter.push_conditions(&mut qb);
    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn search_videos(
    pool: &SqlitePool,
    filter: &VideoFilter,
    pagination: Pagination,
) -> Result<Paginated<Video>, sqlx::Error> {
    let total = count_videos(pool, filter).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM videos");
    filter.push_conditions(&mut qb);
    qb.push(filter.sort.order_by());
    qb.push(" LIMIT ");
    qb.push_bind(pagination.limit as i64);
    qb.push(" OFFSET ");
    qb.push_bind(pagination.offset());

    let items = qb.build_query_as::<Video>().fetch_all(pool).await?;
    debug!(
        "Video search matched {} rows (page {}, limit {})",
        total, pagination.page, pagination.limit
    );

    Ok(Paginated::new(items, total, pagination))
}
