//! Track extraction from the live page
//!
//! Each track region yields artist, track name and up to two download links.
//! Names are required; links are optional and resolved through
//! [`LinkResolver`] as soon as they are read, concurrently with the rest of
//! the record.

use super::link_resolver::LinkResolver;
use super::queue::TrackQueue;
use super::track::{display_artist, LinkRef, Track};
use crate::browser::{BrowserPage, BrowserResult, PageElement};
use futures::future::join_all;
use hype_common::PageLayout;
use tracing::debug;

/// Reads track records out of track regions
#[derive(Clone)]
pub struct TrackExtractor {
    layout: PageLayout,
    resolver: LinkResolver,
}

impl TrackExtractor {
    pub fn new(layout: PageLayout, resolver: LinkResolver) -> Self {
        Self { layout, resolver }
    }

    /// Extract one track record
    ///
    /// Fails only if the artist or track text cannot be read. All field reads
    /// and link resolutions complete before the first hard failure is
    /// returned.
    pub async fn extract<E: PageElement>(&self, element: E) -> BrowserResult<Track<E>> {
        let (artist, track, download, download_extra) = tokio::join!(
            element.text(&self.layout.artist),
            element.text(&self.layout.track),
            self.download_link(&element, &self.layout.download),
            self.download_link(&element, &self.layout.download_extra),
        );

        Ok(Track {
            artist_name: display_artist(&artist?),
            track_name: track?.trim().to_string(),
            download,
            download_extra,
            element,
        })
    }

    /// Rebuild the queue from every visible track region
    ///
    /// Regions whose record cannot be extracted are dropped. Order follows
    /// the page, reversed, whatever order extractions finish in.
    pub async fn scan<P: BrowserPage>(&self, page: &P) -> BrowserResult<TrackQueue<P::Element>> {
        let elements = page.query_all(&self.layout.track_region).await?;
        let listed = elements.len();

        let results = join_all(elements.into_iter().map(|element| self.extract(element))).await;
        let tracks: Vec<_> = results
            .into_iter()
            .filter_map(|result| match result {
                Ok(track) => Some(track),
                Err(e) => {
                    debug!("Dropping unreadable track: {}", e);
                    None
                }
            })
            .collect();

        debug!("Extracted {} of {} listed tracks", tracks.len(), listed);
        Ok(TrackQueue::from_newest_first(tracks))
    }

    /// Read and resolve an optional download link
    async fn download_link<E: PageElement>(&self, element: &E, selector: &str) -> Option<LinkRef> {
        let (label, href) = tokio::join!(
            element.text(selector),
            element.attribute(selector, "href"),
        );

        let mut link = match (label, href) {
            (Ok(label), Ok(href)) => LinkRef::new(label.trim(), href.unwrap_or_default()),
            (Err(e), _) | (_, Err(e)) => {
                debug!("No link for {}: {}", selector, e);
                return None;
            }
        };

        if link.is_downloadable() {
            link.href = self.resolver.resolve(&link).await;
        }
        Some(link)
    }
}
