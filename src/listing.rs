use scraper::{ElementRef, Html};
use url::Url;

use crate::config::CompiledSelectors;
use crate::deadline::parse_deadline;
use crate::identifier::job_id;
use crate::models::JobAdCandidate;

/// Result of parsing one listing page.
#[derive(Debug, Default)]
pub struct Listing {
    pub job_type: Option<String>,
    pub candidates: Vec<JobAdCandidate>,
}

/// Parse the job ads out of a listing page, in document order.
///
/// A page without heading or listing container yields no candidates. Items
/// without a document link are skipped.
pub fn parse_listing(html: &str, base: &Url, selectors: &CompiledSelectors) -> Listing {
    let document = Html::parse_document(html);

    let Some(heading) = document.select(&selectors.heading).next() else {
        log::warn!("Could not find the page heading");
        return Listing::default();
    };
    let job_type = visible_text(heading);
    log::info!("Job type found: {}", job_type);

    let Some(container) = document.select(&selectors.container).next() else {
        log::warn!("Could not find the job listings container");
        return Listing {
            job_type: Some(job_type),
            candidates: Vec::new(),
        };
    };

    let mut candidates = Vec::new();
    for item in container.select(&selectors.item) {
        let Some(link) = item.select(&selectors.anchor).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            log::debug!("Skipping document link without href");
            continue;
        };
        let document_url = match base.join(href.trim()) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Skipping unresolvable link '{}': {}", href, e);
                continue;
            }
        };

        let title = visible_text(link);
        if title.is_empty() {
            log::debug!("Skipping document link without title: {}", document_url);
            continue;
        }

        let raw_text = visible_text(item);
        let deadline = parse_deadline(&raw_text);
        let id = job_id(&raw_text, &title, deadline);

        log::info!(
            "Found job ad: id={} authoritative={} title={} deadline={}",
            id,
            id.is_authoritative(),
            title,
            deadline.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
        );

        candidates.push(JobAdCandidate {
            id,
            title,
            document_url: document_url.to_string(),
            job_type: job_type.clone(),
            deadline,
            raw_text,
        });
    }

    log::info!("Total job ads found: {}", candidates.len());
    Listing {
        job_type: Some(job_type),
        candidates,
    }
}

/// Text of an element with whitespace runs collapsed to single spaces.
///
/// Fragments split only by inline markup (`<b>Bewerbungs</b>schluss`) join
/// without a gap; fragments with whitespace between them stay separated.
fn visible_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListingSelectors;
    use crate::identifier::derived_id;
    use crate::models::JobId;
    use chrono::NaiveDate;

    const PAGE: &str = r#"
        <html><body>
          <h1>  Wissenschaftliches Personal </h1>
          <div class="up-content-link-box">
            <ul>
              <li>
                <a class="up-document-link" href="/fileadmin/jobs/ra.pdf">Research Assistant</a>
                <p>Kenn-Nr. 123/2024</p>
                <p>Bewerbungsschluss: 15.03.2024</p>
              </li>
              <li>No link here</li>
              <li>
                <a class="up-document-link" href="https://cdn.example.org/postdoc.pdf">Postdoc</a>
                <span>Deadline:</span> <span>March 15, 2024</span>
              </li>
              <li><a class="other-link" href="/x.pdf">Not a document</a></li>
            </ul>
          </div>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://www.uni-potsdam.de/de/stellenausschreibungen/").unwrap()
    }

    fn parse(html: &str) -> Listing {
        let selectors = ListingSelectors::default().compile().unwrap();
        parse_listing(html, &base(), &selectors)
    }

    #[test]
    fn test_parse_listing_extracts_candidates_in_order() {
        let listing = parse(PAGE);
        assert_eq!(listing.job_type.as_deref(), Some("Wissenschaftliches Personal"));
        assert_eq!(listing.candidates.len(), 2);

        let first = &listing.candidates[0];
        assert_eq!(first.title, "Research Assistant");
        assert_eq!(first.document_url, "https://www.uni-potsdam.de/fileadmin/jobs/ra.pdf");
        assert_eq!(first.job_type, "Wissenschaftliches Personal");
        assert_eq!(first.id, JobId::Reference("123/2024".to_string()));
        assert_eq!(first.deadline, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(
            first.raw_text,
            "Research Assistant Kenn-Nr. 123/2024 Bewerbungsschluss: 15.03.2024"
        );

        let second = &listing.candidates[1];
        assert_eq!(second.title, "Postdoc");
        assert_eq!(second.document_url, "https://cdn.example.org/postdoc.pdf");
        assert_eq!(second.deadline, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(second.id, JobId::Derived(derived_id("Postdoc", second.deadline)));
    }

    #[test]
    fn test_missing_container_yields_no_candidates() {
        let listing = parse("<html><body><h1>Jobs</h1><ul><li><a class='up-document-link' href='a.pdf'>A</a></li></ul></body></html>");
        assert_eq!(listing.job_type.as_deref(), Some("Jobs"));
        assert!(listing.candidates.is_empty());
    }

    #[test]
    fn test_missing_heading_yields_no_candidates() {
        let listing = parse("<div class='up-content-link-box'><li><a class='up-document-link' href='a.pdf'>A</a></li></div>");
        assert!(listing.job_type.is_none());
        assert!(listing.candidates.is_empty());
    }

    #[test]
    fn test_anchor_without_href_is_skipped() {
        let listing = parse(
            "<h1>Jobs</h1><div class='up-content-link-box'><ul>\
             <li><a class='up-document-link'>No href</a></li>\
             <li><a class='up-document-link' href='b.pdf'>B</a></li></ul></div>",
        );
        assert_eq!(listing.candidates.len(), 1);
        assert_eq!(listing.candidates[0].title, "B");
        assert_eq!(listing.candidates[0].deadline, None);
    }

    #[test]
    fn test_inline_markup_does_not_split_words() {
        let listing = parse(
            "<h1>Jobs</h1><div class='up-content-link-box'><ul>\
             <li><a class='up-document-link' href='a.pdf'>Tu<b>tor</b></a> \
             <b>Bewerbungs</b>schluss: 15.03.2024<br>Kenn-Nr. 7</li></ul></div>",
        );
        let candidate = &listing.candidates[0];
        assert_eq!(candidate.title, "Tutor");
        assert_eq!(candidate.raw_text, "Tutor Bewerbungsschluss: 15.03.2024Kenn-Nr. 7");
        assert_eq!(candidate.deadline, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(candidate.id, JobId::Reference("7".to_string()));
    }

    #[test]
    fn test_relative_link_resolves_against_base_path() {
        let listing = parse(
            "<h1>Jobs</h1><div class='up-content-link-box'><ul>\
             <li><a class='up-document-link' href='ausschreibung.pdf'>Tutor</a></li></ul></div>",
        );
        assert_eq!(
            listing.candidates[0].document_url,
            "https://www.uni-potsdam.de/de/stellenausschreibungen/ausschreibung.pdf"
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = parse(PAGE);
        let b = parse(PAGE);
        let ids_a: Vec<_> = a.candidates.iter().map(|c| c.id.clone()).collect();
        let ids_b: Vec<_> = b.candidates.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids_a, ids_b);
    }
}
