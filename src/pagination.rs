//! This modules defines the common functionality for paging and sorting data.

use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request, larger sizes are clamped to this value.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 2000,
        }
    }
}

/// The raw paging parameters from a query string, e.g. `?page=0&size=1&sort=amount,desc`.
///
/// `page` and `size` are kept as text so that malformed values fall back to the defaults instead
/// of rejecting the request. `sort` may be repeated to sort by several keys.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// The zero-based page number.
    pub page: Option<String>,
    /// The number of items per page.
    pub size: Option<String>,
    /// Sort keys in priority order, each a field optionally followed by a comma and direction.
    #[serde(default)]
    pub sort: Vec<String>,
}

/// The order to sort items in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    #[default]
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

impl SortOrder {
    /// The SQL keyword for this order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Ascending)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Descending)
        } else {
            Err(Error::InvalidSortDirection(s.to_owned()))
        }
    }
}

/// A sort key made of a field and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    /// The field to sort by.
    pub field: F,
    /// The direction to sort in.
    pub order: SortOrder,
}

impl<F> Sort<F>
where
    F: FromStr<Err = Error>,
{
    /// Parse a sort parameter of the form `field` or `field,direction`.
    ///
    /// Surrounding whitespace is ignored and the direction defaults to ascending.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidSortField] or [Error::InvalidSortDirection] if either part is not
    /// recognised.
    pub fn parse(param: &str) -> Result<Self, Error> {
        let (field, order) = match param.split_once(',') {
            Some((field, order)) => (field.trim(), order.trim().parse()?),
            None => (param.trim(), SortOrder::default()),
        };

        Ok(Self {
            field: field.parse()?,
            order,
        })
    }
}

impl<F: Display> Display for Sort<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order = match self.order {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        };

        write!(f, "{},{}", self.field, order)
    }
}

/// A validated request for one page of sorted items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    /// The zero-based page number.
    pub page: u64,
    /// The number of items per page, always at least one.
    pub size: u64,
    /// How to order items before slicing out the page, most significant key first.
    /// Never empty.
    pub sort: Vec<Sort<F>>,
}

impl<F> PageRequest<F>
where
    F: FromStr<Err = Error>,
{
    /// Build a page request from query parameters, filling in defaults from `config` and
    /// `default_sort`.
    ///
    /// A page that is not a non-negative integer is treated as the first page. A size that is not
    /// a positive integer is treated as missing, and sizes above the configured maximum are
    /// clamped. Blank sort keys are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a sort key names an unknown field or direction.
    pub fn from_params(
        params: PageParams,
        config: &PaginationConfig,
        default_sort: Sort<F>,
    ) -> Result<Self, Error> {
        let page = parse_number(params.page.as_deref()).unwrap_or(0);

        let size = parse_number(params.size.as_deref())
            .filter(|&size| size > 0)
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size.max(1));

        let mut sort = params
            .sort
            .iter()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Sort::parse(key))
            .collect::<Result<Vec<_>, _>>()?;

        if sort.is_empty() {
            sort.push(default_sort);
        }

        Ok(Self { page, size, sort })
    }
}

fn parse_number(param: Option<&str>) -> Option<u64> {
    param.and_then(|param| param.trim().parse().ok())
}

impl<F> PageRequest<F> {
    /// The SQL `LIMIT` for this page.
    pub fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    /// The SQL `OFFSET` for this page, or `None` if the offset does not fit in an SQL integer.
    pub fn offset(&self) -> Option<i64> {
        self.page
            .checked_mul(self.size)
            .and_then(|offset| i64::try_from(offset).ok())
    }
}

impl<F: Display> PageRequest<F> {
    /// The sort keys joined with semicolons, e.g. `amount,desc;id,asc`.
    pub fn sort_description(&self) -> String {
        self.sort
            .iter()
            .map(|sort| sort.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }
}
