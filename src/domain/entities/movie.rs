use serde::{Deserialize, Serialize};

/// A movie genre tag as served by the metadata provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// A catalog entry as it appears in search/popular/trending listings.
///
/// Wire names stay snake_case: the public movie endpoints mirror the
/// metadata provider's shape, and listing responses omit the fields the
/// provider only returns on the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<Genre>,
}

/// One page of catalog results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePage {
    pub results: Vec<MovieSummary>,
    pub total_results: u32,
    pub total_pages: u32,
    pub page: u32,
}

impl MoviePage {
    /// Wrap an already-complete result set as a single page
    #[must_use]
    pub fn single(results: Vec<MovieSummary>) -> Self {
        let total_results = results.len() as u32;
        Self { results, total_results, total_pages: 1, page: 1 }
    }
}

/// Full movie detail, including the credit-derived extras
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub summary: MovieSummary,
    pub tagline: Option<String>,
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_totals() {
        let page = MoviePage::single(vec![MovieSummary {
            id: 550,
            title: "Fight Club".to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: 8.4,
            vote_count: 26280,
            runtime: None,
            genres: Vec::new(),
        }]);

        assert_eq!(page.total_results, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_summary_deserializes_sparse_listing() {
        // Search listings carry no runtime or genres
        let json = r#"{"id": 13, "title": "Forrest Gump", "vote_average": 8.8}"#;
        let summary: MovieSummary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.id, 13);
        assert!(summary.runtime.is_none());
        assert!(summary.genres.is_empty());
    }

    #[test]
    fn test_detail_flattens_summary() {
        let detail = MovieDetail {
            summary: MovieSummary {
                id: 550,
                title: "Fight Club".to_string(),
                overview: String::new(),
                poster_path: None,
                backdrop_path: None,
                release_date: None,
                vote_average: 8.4,
                vote_count: 26280,
                runtime: Some(139),
                genres: Vec::new(),
            },
            tagline: Some("Mischief. Mayhem. Soap.".to_string()),
            director: Some("David Fincher".to_string()),
            cast: vec!["Brad Pitt".to_string()],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 550);
        assert_eq!(json["runtime"], 139);
        assert_eq!(json["director"], "David Fincher");
        assert!(json.get("summary").is_none());
    }
}
