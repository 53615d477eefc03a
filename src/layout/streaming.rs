//! Page-by-page processing over a channel.
//!
//! Header and footer detection needs every page, so all pages are segmented
//! before the first event is sent. Items are then built and sent one page at
//! a time, letting the consumer serialize pages while later ones are still
//! being sorted.
//!
//! # Example
//!
//! ```no_run
//! use relayout::layout::{LayoutPipeline, PageEvent};
//! use relayout::JsonSource;
//!
//! fn main() -> relayout::Result<()> {
//!     let input = JsonSource::open("extracted.json")?.into_inner();
//!     let events = LayoutPipeline::default().stream(input.pages);
//!
//!     for event in events {
//!         match event {
//!             PageEvent::Page(page) => println!("page {}: {} items", page.number, page.items.len()),
//!             PageEvent::Failed(failure) => eprintln!("page {}: {}", failure.page, failure.error),
//!             PageEvent::Finished { processed, failed } => {
//!                 println!("{} pages, {} failed", processed, failed)
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use std::thread;

use crossbeam_channel::{Receiver, Sender};

use super::options::ErrorMode;
use super::pipeline::LayoutPipeline;
use crate::model::{Page, PageFailure, PageInput};

/// Events emitted while a document is processed.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// A page finished successfully.
    Page(Page),

    /// A page failed.
    Failed(PageFailure),

    /// No further events follow.
    Finished {
        /// Pages that produced output
        processed: usize,
        /// Pages that failed
        failed: usize,
    },
}

impl PageEvent {
    /// Check if this is the final event.
    pub fn is_finished(&self) -> bool {
        matches!(self, PageEvent::Finished { .. })
    }

    /// Get the page if this is a page event.
    pub fn page(&self) -> Option<&Page> {
        match self {
            PageEvent::Page(page) => Some(page),
            _ => None,
        }
    }
}

impl LayoutPipeline {
    /// Process pages on a background thread, delivering results in page order.
    ///
    /// In strict mode the stream ends after the first failed page.
    pub fn stream(&self, pages: Vec<PageInput>) -> Receiver<PageEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let pipeline = self.clone();
        thread::spawn(move || pipeline.emit(pages, &tx));
        rx
    }

    fn emit(&self, pages: Vec<PageInput>, tx: &Sender<PageEvent>) {
        let mut drafts = self.drafts(self.select(pages));
        self.mark_headers_footers(&mut drafts);

        let (mut processed, mut failed) = (0, 0);
        for (number, draft) in drafts {
            let event = match draft {
                Ok(draft) => {
                    processed += 1;
                    PageEvent::Page(self.finish(draft))
                }
                Err(e) => {
                    failed += 1;
                    let e = e.on_page(number);
                    log::warn!("{}", e);
                    PageEvent::Failed(PageFailure {
                        page: number,
                        error: e.to_string(),
                    })
                }
            };

            let stop = self.options().error_mode == ErrorMode::Strict
                && matches!(event, PageEvent::Failed(_));
            if tx.send(event).is_err() {
                log::debug!("Page stream receiver dropped; stopping");
                return;
            }
            if stop {
                break;
            }
        }

        let _ = tx.send(PageEvent::Finished { processed, failed });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::options::LayoutOptions;
    use crate::model::{SourceBlock, SourceLine};

    fn pages() -> Vec<PageInput> {
        let artbox = Rect::new(0.0, 0.0, 600.0, 800.0);
        vec![
            PageInput::new(1, artbox).with_block(SourceBlock::from_lines(vec![SourceLine::simple(
                Rect::new(50.0, 50.0, 550.0, 62.0),
                "first",
            )])),
            PageInput::new(2, Rect::new(0.0, 0.0, -1.0, 0.0)),
            PageInput::new(3, artbox),
        ]
    }

    #[test]
    fn test_stream_events_in_page_order() {
        let events: Vec<PageEvent> = LayoutPipeline::default().stream(pages()).iter().collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].page().map(|p| p.number), Some(1));
        assert!(matches!(&events[1], PageEvent::Failed(f) if f.page == 2));
        assert_eq!(events[2].page().map(|p| p.number), Some(3));
        assert!(matches!(
            events[3],
            PageEvent::Finished {
                processed: 2,
                failed: 1
            }
        ));
    }

    #[test]
    fn test_strict_stream_stops_at_failure() {
        let pipeline = LayoutPipeline::new(LayoutOptions::new().strict());
        let events: Vec<PageEvent> = pipeline.stream(pages()).iter().collect();
        assert_eq!(events.len(), 3);
        assert!(events[2].is_finished());
    }
}
