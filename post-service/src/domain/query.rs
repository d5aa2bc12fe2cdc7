/// Relations to load together with a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostRelations {
    pub author: bool,
    pub comments: bool,
    /// Only meaningful together with `comments`.
    pub comment_authors: bool,
}

impl PostRelations {
    pub const NONE: Self = Self {
        author: false,
        comments: false,
        comment_authors: false,
    };

    /// Author, comments and comment authors.
    pub const FULL: Self = Self {
        author: true,
        comments: true,
        comment_authors: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
