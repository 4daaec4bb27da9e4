//! Default informational page.

use askama::Template;
use askama_web::WebTemplate;

/// Template for the landing page shown when a query has no bang to resolve.
///
/// Renders `templates/index.html` with the OpenSearch-style URL the user
/// adds as a custom search engine.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub public_url: String,
}
