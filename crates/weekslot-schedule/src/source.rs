//! Boundary with the upstream scraper.

use chrono::NaiveDate;

use crate::event::Period;

/// The page a batch of events was scraped from.
///
/// Events built with [`Event::from_source`](crate::event::Event::from_source)
/// take their title, annotation and validity window from here.
pub trait PlaceSource {
    /// Display name of the place, used as the title prefix.
    fn event_title(&self) -> &str;

    /// Short annotation currently shown on the page, if any.
    fn notice(&self) -> Option<&str>;

    /// Longer text accompanying [`notice`](Self::notice).
    fn notice_details(&self) -> Option<&str>;

    fn season_from(&self) -> NaiveDate;

    fn season_to(&self) -> NaiveDate;

    /// Validity window shared by every regular slot of the place.
    fn season(&self) -> Period {
        Period::new(self.season_from(), self.season_to())
    }
}
