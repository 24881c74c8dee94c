//! OpenAPI schema definitions for list envelopes.
//!
//! The `pagination` crate stays free of framework dependencies, so the
//! `{data, page, limit, total, totalPages}` envelope is described here once per
//! item type for documentation.

use utoipa::ToSchema;

use crate::domain::{Admin, Match, News, User};

macro_rules! page_schema {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(ToSchema)]
        #[schema(rename_all = "camelCase")]
        #[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
        pub struct $name {
            /// Items on the current page.
            data: Vec<$item>,
            /// One-based page number.
            #[schema(example = 1)]
            page: u64,
            /// Requested page size.
            #[schema(example = 20)]
            limit: u64,
            /// Items across all pages.
            total: u64,
            /// Pages needed for `total` items.
            total_pages: u64,
        }
    };
}

page_schema!(
    /// Page of fan profiles.
    UserPage,
    User
);
page_schema!(
    /// Page of staff profiles.
    AdminPage,
    Admin
);
page_schema!(
    /// Page of fixtures.
    MatchPage,
    Match
);
page_schema!(
    /// Page of articles.
    NewsPage,
    News
);
