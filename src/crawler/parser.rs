//! HTML parser for extracting the references a page makes
//!
//! Every element kind maps to a capability: sub-resources (images, media,
//! scripts, favicons, inline-style URLs) are only checked, while nested
//! documents (iframes, stylesheets) and internal hyperlinks are fetched and
//! parsed in turn.

use crate::crawler::css::{extract_style_urls, FROM_CSS};
use crate::state::{Capability, FetchFailure};
use crate::url::{is_mixed_content, resolve_link, BaseDomain};
use scraper::{Html, Selector};
use url::Url;

/// A reference found in a document, resolved and classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub url: Url,
    pub capability: Capability,
    pub depth: u32,
}

/// Everything extracted from one document
#[derive(Debug, Default)]
pub struct Extraction {
    /// Children to submit, in document order
    pub links: Vec<DiscoveredLink>,
    /// Mixed-content failures for the document itself
    pub failures: Vec<FetchFailure>,
}

/// Resolves references against a base and applies the mixed-content rule
pub(crate) struct LinkCollector<'a> {
    page_url: &'a Url,
    base: Url,
    base_domain: &'a BaseDomain,
    extraction: Extraction,
}

impl<'a> LinkCollector<'a> {
    pub(crate) fn new(page_url: &'a Url, base_domain: &'a BaseDomain) -> Self {
        Self {
            page_url,
            base: page_url.clone(),
            base_domain,
            extraction: Extraction::default(),
        }
    }

    fn set_base(&mut self, base: Url) {
        self.base = base;
    }

    /// Resolves and records a reference, returning its URL
    ///
    /// With a `mixed_context`, an http reference from an https page also
    /// records a mixed-content failure; the reference is kept either way.
    pub(crate) fn add(
        &mut self,
        href: &str,
        capability: Capability,
        depth: u32,
        mixed_context: Option<&'static str>,
    ) -> Option<Url> {
        let url = resolve_link(href, &self.base, self.base_domain)?;

        if let Some(context) = mixed_context {
            if is_mixed_content(self.page_url, &url) {
                self.extraction.failures.push(FetchFailure::MixedContent {
                    context,
                    url: url.to_string(),
                });
            }
        }

        self.extraction.links.push(DiscoveredLink {
            url: url.clone(),
            capability,
            depth,
        });
        Some(url)
    }

    pub(crate) fn finish(self) -> Extraction {
        self.extraction
    }
}

/// Splits a `srcset` attribute into its candidate URLs
///
/// # Examples
///
/// ```
/// use site_validator::crawler::parse_srcset;
///
/// let urls = parse_srcset("small.jpg 480w, large.jpg 1080w");
/// assert_eq!(urls, vec!["small.jpg", "large.jpg"]);
/// ```
pub fn parse_srcset(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .collect()
}

/// Extracts every reference from an HTML document
///
/// # Classification
///
/// | Source | Capability |
/// |--------|------------|
/// | `img`/`embed`/`source`/`video`/`audio` `src`, `srcset`, `video` `poster` | Check |
/// | `iframe` `src` | Full |
/// | `link[rel~=stylesheet]` `href` | Full |
/// | `script` `src` | Check |
/// | favicons, `meta[...$=":image"]` `content` | Check |
/// | `a` `href` | Full at `depth + 1` if internal, Check if outbound |
/// | `<style>` text, `style` attributes | Check |
///
/// The first `<base href>` replaces `page_url` as the resolution base.
/// `page_url` should be the final URL of the response, after redirects.
///
/// # Example
///
/// ```
/// use site_validator::crawler::extract_html_links;
/// use site_validator::url::BaseDomain;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/about">About</a><img src="img.png"></body></html>"#;
/// let page = Url::parse("https://example.com/").unwrap();
/// let extraction = extract_html_links(html, &page, 0, &BaseDomain::new());
/// assert_eq!(extraction.links.len(), 2);
/// ```
pub fn extract_html_links(
    html: &str,
    page_url: &Url,
    depth: u32,
    base_domain: &BaseDomain,
) -> Extraction {
    let document = Html::parse_document(html);
    let mut collector = LinkCollector::new(page_url, base_domain);

    if let Ok(selector) = Selector::parse("base[href]") {
        let base_href = document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("href"));
        if let Some(base) = base_href.and_then(|href| resolve_link(href, page_url, base_domain)) {
            collector.set_base(base);
        }
    }

    // Images, media and embeds
    if let Ok(selector) = Selector::parse("img, embed, source, video, audio") {
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                collector.add(src, Capability::Check, depth, Some("to file"));
            }
            if let Some(srcset) = element.value().attr("srcset") {
                for candidate in parse_srcset(srcset) {
                    collector.add(candidate, Capability::Check, depth, Some("to file"));
                }
            }
            if element.value().name() == "video" {
                if let Some(poster) = element.value().attr("poster") {
                    collector.add(poster, Capability::Check, depth, Some("to file"));
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("iframe[src]") {
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                collector.add(src, Capability::Full, depth, Some("to file"));
            }
        }
    }

    if let Ok(selector) = Selector::parse(r#"link[rel~="stylesheet"][href]"#) {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                collector.add(href, Capability::Full, depth, Some("link to CSS"));
            }
        }
    }

    if let Ok(selector) = Selector::parse("script[src]") {
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                collector.add(src, Capability::Check, depth, Some("to JS"));
            }
        }
    }

    // Favicons
    if let Ok(selector) = Selector::parse(
        r#"link[rel~="icon"][href], link[rel="apple-touch-icon"][href], link[rel="apple-touch-icon-precomposed"][href]"#,
    ) {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                collector.add(href, Capability::Check, depth, Some("to favicon"));
            }
        }
    }

    // Open Graph / Twitter card images
    if let Ok(selector) =
        Selector::parse(r#"meta[property$=":image"][content], meta[name$=":image"][content]"#)
    {
        for element in document.select(&selector) {
            if let Some(content) = element.value().attr("content") {
                collector.add(content, Capability::Check, depth, Some("to favicon"));
            }
        }
    }

    // Hyperlinks are navigations, not sub-resources: no mixed-content check
    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_link(href, &collector.base, base_domain) else {
                continue;
            };
            if base_domain.is_outbound(&url) {
                collector.add(url.as_str(), Capability::Check, depth, None);
            } else {
                collector.add(url.as_str(), Capability::Full, depth + 1, None);
            }
        }
    }

    if let Ok(selector) = Selector::parse("style") {
        for element in document.select(&selector) {
            let text = element.text().collect::<String>();
            for reference in extract_style_urls(&text) {
                collector.add(&reference, Capability::Check, depth, Some(FROM_CSS));
            }
        }
    }

    if let Ok(selector) = Selector::parse("[style]") {
        for element in document.select(&selector) {
            if let Some(style) = element.value().attr("style") {
                for reference in extract_style_urls(style) {
                    collector.add(&reference, Capability::Check, depth, Some(FROM_CSS));
                }
            }
        }
    }

    collector.finish()
}
