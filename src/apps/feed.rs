//! Announcement feed ("Propaganda").

use chrono::{DateTime, Local, NaiveDate};
use serde::Deserialize;
use std::path::Path;

use super::{clip, load_data, AppAction, ContentLine, KeyInput};
use crate::core::error::ContentLoadError;
use crate::core::registry::AppId;

pub const ANNOUNCEMENTS_FILE: &str = "announcements.json";
pub const SNIPPET_CHARS: usize = 150;
pub const SEE_MORE_URL: &str = "https://www.nopixel.net/upload/index.php?forums/city-hall.264/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Announcement {
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub body: String,
}

impl Announcement {
    pub fn snippet(&self) -> String {
        format!("{}...", clip(&self.body, SNIPPET_CHARS))
    }

    /// `M/D/YYYY` in local time; the raw string if it does not parse.
    pub fn local_date(&self) -> String {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.date) {
            return dt.with_timezone(&Local).format("%-m/%-d/%Y").to_string();
        }
        if let Ok(d) = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            return d.format("%-m/%-d/%Y").to_string();
        }
        self.date.clone()
    }
}

#[derive(Debug)]
pub struct FeedApp {
    items: Vec<Announcement>,
    // `items.len()` selects the "See more" entry.
    selected: usize,
}

impl FeedApp {
    pub fn load(data_dir: &Path, app_id: &AppId) -> Result<Self, ContentLoadError> {
        load_data(data_dir, ANNOUNCEMENTS_FILE, app_id).map(Self::new)
    }

    pub fn new(items: Vec<Announcement>) -> Self {
        Self { items, selected: 0 }
    }

    pub fn items(&self) -> &[Announcement] {
        &self.items
    }

    fn activate(&self) -> AppAction {
        match self.items.get(self.selected) {
            Some(a) => AppAction::dialog(&a.title, a.url.clone()),
            None => AppAction::dialog("See more...", SEE_MORE_URL),
        }
    }

    pub fn key(&mut self, key: KeyInput) -> AppAction {
        match key {
            KeyInput::Up => {
                self.selected = self.selected.saturating_sub(1);
                AppAction::None
            }
            KeyInput::Down => {
                self.selected = (self.selected + 1).min(self.items.len());
                AppAction::None
            }
            KeyInput::Enter => self.activate(),
            _ => AppAction::None,
        }
    }

    /// Each announcement occupies a block of [`Self::BLOCK`] rows.
    pub fn click(&mut self, row: usize) -> AppAction {
        let idx = row / Self::BLOCK;
        if idx > self.items.len() {
            return AppAction::None;
        }
        self.selected = idx;
        self.activate()
    }

    const BLOCK: usize = 4;

    pub fn lines(&self, width: usize) -> Vec<ContentLine> {
        let mut out = Vec::new();
        for (i, a) in self.items.iter().enumerate() {
            let on = i == self.selected;
            out.push(ContentLine::choice(a.title.clone(), on));
            out.push(ContentLine::dim(a.local_date()));
            out.push(ContentLine::normal(clip(&a.snippet(), width.max(4))));
            out.push(ContentLine::blank());
        }
        out.push(ContentLine::choice(
            "[ See more... ]",
            self.selected == self.items.len(),
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, body: &str) -> Announcement {
        Announcement {
            title: title.to_string(),
            date: "2024-03-01".to_string(),
            url: format!("https://city.example/{title}"),
            body: body.to_string(),
        }
    }

    #[test]
    fn snippet_is_150_chars_plus_ellipsis() {
        let long = "x".repeat(400);
        assert_eq!(item("a", &long).snippet().chars().count(), 153);
        assert_eq!(item("a", "short").snippet(), "short...");
    }

    #[test]
    fn date_formats_as_month_day_year() {
        assert_eq!(item("a", "").local_date(), "3/1/2024");
        let mut odd = item("a", "");
        odd.date = "sometime".to_string();
        assert_eq!(odd.local_date(), "sometime");
    }

    #[test]
    fn enter_opens_selected_link_then_see_more() {
        let mut feed = FeedApp::new(vec![item("one", ""), item("two", "")]);
        feed.key(KeyInput::Down);
        assert_eq!(
            feed.key(KeyInput::Enter),
            AppAction::dialog("two", "https://city.example/two")
        );
        feed.key(KeyInput::Down);
        feed.key(KeyInput::Down);
        assert_eq!(feed.key(KeyInput::Enter), AppAction::dialog("See more...", SEE_MORE_URL));
    }

    #[test]
    fn click_selects_block() {
        let mut feed = FeedApp::new(vec![item("one", ""), item("two", "")]);
        assert_eq!(
            feed.click(5),
            AppAction::dialog("two", "https://city.example/two")
        );
        assert_eq!(feed.click(40), AppAction::None);
    }
}
