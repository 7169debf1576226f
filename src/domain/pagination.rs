use serde::Deserialize;

const INVALID_PAGINATION: &str = "page and count fields are required and must be > 0";

/// A 1-indexed page of `count` subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    count: i64,
}

#[derive(Deserialize, Debug)]
pub struct PaginationBody {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub count: i64,
}

impl Pagination {
    pub fn parse(page: i64, count: i64) -> Result<Pagination, String> {
        if page <= 0 || count <= 0 {
            return Err(INVALID_PAGINATION.to_string());
        }

        Ok(Self { page, count })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn limit(&self) -> i64 {
        self.count
    }

    /// Saturates instead of overflowing: such an offset is past any stored row.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.count)
    }
}

impl TryFrom<PaginationBody> for Pagination {
    type Error = String;

    fn try_from(body: PaginationBody) -> Result<Self, Self::Error> {
        Pagination::parse(body.page, body.count)
    }
}
