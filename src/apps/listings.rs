//! Lemon List directory: search, category filters, two-column pages.

use serde::Deserialize;
use std::path::Path;

use super::{fit, load_data, AppAction, ContentLine, KeyInput, Tone};
use crate::core::error::ContentLoadError;
use crate::core::registry::AppId;
use crate::core::router::{self, Params};

pub const LISTINGS_FILE: &str = "listings.json";
pub const PER_PAGE: usize = 50;
pub const COLUMN_ROWS: usize = PER_PAGE / 2;

pub const PARAM_SEARCH: &str = "search";
pub const PARAM_FILTERS: &str = "filters";

pub const EMOJI_TOOLTIPS: &[(&str, &str)] = &[
    ("🚓", "Law Enforcement"),
    ("🚑", "Los Santos Medical Group"),
    ("⚖️", "Lawyer/Paralegal"),
    ("🏛️", "Government Employee"),
    ("🎵", "Musician/Producer"),
    ("🌽", "Farmer"),
    ("💵", "Loans"),
    ("🚗", "Car Sales"),
    ("🧰", "Impound/Tow"),
    ("🪑", "Furniture Sales"),
    ("🔧", "Mechanic"),
    ("🧺", "Laundry"),
    ("🚕", "Taxi"),
];

pub fn tooltip(emoji: &str) -> &'static str {
    EMOJI_TOOLTIPS
        .iter()
        .find(|(e, _)| *e == emoji)
        .map(|(_, t)| *t)
        .unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Search,
    Filters,
    Results,
}

#[derive(Debug)]
pub struct ListingsApp {
    app_id: AppId,
    link_origin: String,
    all: Vec<Listing>,
    categories: Vec<String>,
    search: String,
    active: Vec<bool>,
    page: usize,
    focus: Focus,
    cursor: usize,
}

impl ListingsApp {
    pub fn load(data_dir: &Path, app_id: &AppId, link_origin: &str) -> Result<Self, ContentLoadError> {
        let rows: Vec<Listing> = load_data(data_dir, LISTINGS_FILE, app_id)?;
        log::debug!("{app_id}: {} listings", rows.len());
        Ok(Self::from_listings(app_id.clone(), link_origin, rows))
    }

    pub fn from_listings(app_id: AppId, link_origin: &str, rows: Vec<Listing>) -> Self {
        let all: Vec<Listing> = rows
            .into_iter()
            .filter(|l| !l.text.trim().is_empty())
            .collect();
        let mut categories: Vec<String> = Vec::new();
        for l in &all {
            if !l.emoji.is_empty() && !categories.contains(&l.emoji) {
                categories.push(l.emoji.clone());
            }
        }
        let active = vec![false; categories.len()];
        Self {
            app_id,
            link_origin: link_origin.to_string(),
            all,
            categories,
            search: String::new(),
            active,
            page: 1,
            focus: Focus::Search,
            cursor: 0,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn active_filters(&self) -> Vec<&str> {
        self.categories
            .iter()
            .zip(&self.active)
            .filter(|(_, on)| **on)
            .map(|(c, _)| c.as_str())
            .collect()
    }

    pub fn filtered(&self) -> Vec<&Listing> {
        let needle = self.search.to_lowercase();
        let filters = self.active_filters();
        self.all
            .iter()
            .filter(|l| l.text.to_lowercase().contains(&needle))
            .filter(|l| filters.is_empty() || filters.contains(&l.emoji.as_str()))
            .collect()
    }

    /// Never less than one, so an empty result still reads "Page 1 of 1".
    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(PER_PAGE).max(1)
    }

    pub fn page_items(&self) -> Vec<&Listing> {
        self.filtered()
            .into_iter()
            .skip((self.page - 1) * PER_PAGE)
            .take(PER_PAGE)
            .collect()
    }

    pub fn page_indicator(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages())
    }

    pub fn params(&self) -> Params {
        let mut p = Params::new();
        p.insert(PARAM_SEARCH.to_string(), self.search.clone());
        p.insert(PARAM_FILTERS.to_string(), self.active_filters().join(","));
        p
    }

    pub fn share_link(&self) -> String {
        router::deep_link(&self.link_origin, &self.app_id, &self.params())
    }

    // ── Mutations ─────────────────────────────────────────────────────────────

    /// Pre-fill from deep-link params. Unknown categories are ignored.
    pub fn apply_params(&mut self, params: &Params) {
        if let Some(search) = params.get(PARAM_SEARCH) {
            self.search = search.clone();
        }
        if let Some(filters) = params.get(PARAM_FILTERS) {
            let wanted: Vec<&str> = filters.split(',').filter(|f| !f.is_empty()).collect();
            for (cat, on) in self.categories.iter().zip(self.active.iter_mut()) {
                *on = wanted.contains(&cat.as_str());
            }
        }
        self.page = 1;
    }

    pub fn set_search(&mut self, search: &str) -> AppAction {
        self.search = search.to_string();
        self.changed()
    }

    pub fn toggle_filter(&mut self, idx: usize) -> AppAction {
        match self.active.get_mut(idx) {
            Some(on) => {
                *on = !*on;
                self.changed()
            }
            None => AppAction::None,
        }
    }

    pub fn reset(&mut self) -> AppAction {
        self.search.clear();
        self.active.iter_mut().for_each(|on| *on = false);
        self.changed()
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    fn changed(&mut self) -> AppAction {
        self.page = 1;
        AppAction::UpdateLink(self.params())
    }

    pub fn key(&mut self, key: KeyInput) -> AppAction {
        match (self.focus, key) {
            (_, KeyInput::Tab) => {
                self.focus = match self.focus {
                    Focus::Search => Focus::Filters,
                    Focus::Filters => Focus::Results,
                    Focus::Results => Focus::Search,
                };
                AppAction::None
            }
            (_, KeyInput::BackTab) => {
                self.focus = match self.focus {
                    Focus::Search => Focus::Results,
                    Focus::Filters => Focus::Search,
                    Focus::Results => Focus::Filters,
                };
                AppAction::None
            }
            (_, KeyInput::PageDown) => {
                self.next_page();
                AppAction::None
            }
            (_, KeyInput::PageUp) => {
                self.prev_page();
                AppAction::None
            }
            (Focus::Search, KeyInput::Char(c)) => {
                let mut s = self.search.clone();
                s.push(c);
                self.set_search(&s)
            }
            (Focus::Search, KeyInput::Backspace) => {
                let mut s = self.search.clone();
                if s.pop().is_none() {
                    return AppAction::None;
                }
                self.set_search(&s)
            }
            (Focus::Filters, KeyInput::Left) => {
                self.cursor = self.cursor.saturating_sub(1);
                AppAction::None
            }
            (Focus::Filters, KeyInput::Right) => {
                if self.cursor + 1 < self.categories.len() {
                    self.cursor += 1;
                }
                AppAction::None
            }
            (Focus::Filters, KeyInput::Enter | KeyInput::Char(' ')) => self.toggle_filter(self.cursor),
            (Focus::Results, KeyInput::Left | KeyInput::Char('<')) => {
                self.prev_page();
                AppAction::None
            }
            (Focus::Results, KeyInput::Right | KeyInput::Char('>')) => {
                self.next_page();
                AppAction::None
            }
            (Focus::Results, KeyInput::Char('r')) => self.reset(),
            (Focus::Results, KeyInput::Char('s')) => {
                AppAction::dialog("Share search", self.share_link())
            }
            _ => AppAction::None,
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn lines(&self, width: usize) -> Vec<ContentLine> {
        let mut out = Vec::with_capacity(COLUMN_ROWS + 6);
        out.push(ContentLine::choice(
            format!("Search: {}_", self.search),
            self.focus == Focus::Search,
        ));

        let mut filters = String::from("Filter: ");
        for (i, (cat, on)) in self.categories.iter().zip(&self.active).enumerate() {
            let mark = if *on { 'x' } else { ' ' };
            let (l, r) = if self.focus == Focus::Filters && i == self.cursor {
                ('>', '<')
            } else {
                (' ', ' ')
            };
            filters.push_str(&format!("{l}[{mark}]{cat}{r}"));
        }
        out.push(ContentLine::choice(filters, self.focus == Focus::Filters));
        let hint = self
            .categories
            .get(self.cursor)
            .filter(|_| self.focus == Focus::Filters)
            .map(|c| tooltip(c))
            .unwrap_or("");
        out.push(ContentLine::dim(hint));
        out.push(ContentLine::blank());

        let items = self.page_items();
        let col = width.saturating_sub(1) / 2;
        for row in 0..COLUMN_ROWS {
            let left = items.get(row).map(|l| render_item(l)).unwrap_or_default();
            let right = items.get(row + COLUMN_ROWS).map(|l| render_item(l));
            if right.is_none() && left.is_empty() {
                continue;
            }
            let text = match right {
                Some(r) => format!("{} {}", fit(&left, col), fit(&r, col)),
                None => left,
            };
            out.push(ContentLine::normal(text));
        }
        if items.is_empty() {
            out.push(ContentLine::dim("No listings match."));
        }

        out.push(ContentLine::blank());
        let prev = if self.page > 1 { "◀" } else { " " };
        let next = if self.page < self.total_pages() { "▶" } else { " " };
        out.push(ContentLine::new(
            format!("{prev} {} {next}", self.page_indicator()),
            if self.focus == Focus::Results { Tone::Selected } else { Tone::Heading },
        ));
        out.push(ContentLine::dim("[Tab] focus  [PgUp/PgDn] page  [r] reset  [s] share"));
        out
    }
}

fn render_item(l: &Listing) -> String {
    if l.emoji.is_empty() {
        l.text.clone()
    } else {
        format!("{} {}", l.emoji, l.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(emoji: &str, text: &str) -> Listing {
        Listing {
            emoji: emoji.to_string(),
            text: text.to_string(),
        }
    }

    fn app(rows: Vec<Listing>) -> ListingsApp {
        ListingsApp::from_listings(AppId::from("lemon-list"), "https://vixen.example", rows)
    }

    fn many(n: usize) -> Vec<Listing> {
        (0..n)
            .map(|i| listing(if i % 2 == 0 { "🚗" } else { "🔧" }, &format!("Shop {i}")))
            .collect()
    }

    #[test]
    fn blank_rows_are_dropped_and_categories_keep_first_seen_order() {
        let a = app(vec![
            listing("🔧", "Benny's"),
            listing("🚗", "  "),
            listing("🚗", "PDM"),
            listing("🔧", "Hayes"),
            listing("", "Uncategorised"),
        ]);
        assert_eq!(a.filtered().len(), 4);
        assert_eq!(a.categories(), ["🔧", "🚗"]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut a = app(vec![listing("🚗", "Premium Deluxe Motorsport"), listing("🔧", "Hayes Autos")]);
        a.set_search("deluxe");
        let hits: Vec<&str> = a.filtered().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(hits, vec!["Premium Deluxe Motorsport"]);
    }

    #[test]
    fn no_active_filter_means_everything_passes() {
        let mut a = app(many(10));
        assert_eq!(a.filtered().len(), 10);
        a.toggle_filter(1);
        assert!(a.filtered().iter().all(|l| l.emoji == "🔧"));
        a.toggle_filter(1);
        assert_eq!(a.filtered().len(), 10);
    }

    #[test]
    fn pagination_is_bounded() {
        let mut a = app(many(120));
        assert_eq!(a.total_pages(), 3);
        a.prev_page();
        assert_eq!(a.page(), 1);
        a.next_page();
        a.next_page();
        a.next_page();
        assert_eq!(a.page(), 3);
        assert_eq!(a.page_items().len(), 20);
        assert_eq!(a.page_indicator(), "Page 3 of 3");
    }

    #[test]
    fn empty_result_is_page_one_of_one() {
        let mut a = app(many(3));
        a.set_search("nothing matches this");
        assert_eq!(a.page_indicator(), "Page 1 of 1");
        a.next_page();
        assert_eq!(a.page(), 1);
    }

    #[test]
    fn changes_return_to_first_page_and_update_link() {
        let mut a = app(many(120));
        a.next_page();
        let action = a.toggle_filter(0);
        assert_eq!(a.page(), 1);
        let AppAction::UpdateLink(p) = action else {
            panic!("expected link update");
        };
        assert_eq!(p.get(PARAM_FILTERS).map(String::as_str), Some("🚗"));
        assert_eq!(p.get(PARAM_SEARCH).map(String::as_str), Some(""));
    }

    #[test]
    fn deep_link_params_prefill_state() {
        let mut a = app(many(10));
        let mut p = Params::new();
        p.insert(PARAM_SEARCH.into(), "shop 1".into());
        p.insert(PARAM_FILTERS.into(), "🔧,🛸".into());
        a.apply_params(&p);
        assert_eq!(a.search(), "shop 1");
        assert_eq!(a.active_filters(), vec!["🔧"]);
    }

    #[test]
    fn share_link_round_trips_through_router() {
        let mut a = app(many(4));
        a.set_search("a&b");
        a.toggle_filter(0);
        let link = a.share_link();
        let fragment = link.strip_prefix("https://vixen.example/").unwrap();
        let parsed = router::parse(fragment).unwrap();
        assert_eq!(parsed.app.as_str(), "lemon-list");
        assert_eq!(parsed.params, a.params());
    }

    #[test]
    fn reset_clears_search_and_filters() {
        let mut a = app(many(4));
        a.set_search("x");
        a.toggle_filter(0);
        a.reset();
        assert_eq!(a.search(), "");
        assert!(a.active_filters().is_empty());
    }

    #[test]
    fn first_page_splits_into_two_columns() {
        let a = app(many(60));
        let lines = a.lines(80);
        // Header rows, then 25 rows each carrying two listings.
        assert!(lines[4].text.starts_with("🚗 Shop 0"));
        assert!(lines[4].text.contains("Shop 25"));
    }

    #[test]
    fn typing_in_search_updates_link() {
        let mut a = app(many(4));
        let action = a.key(KeyInput::Char('s'));
        assert!(matches!(action, AppAction::UpdateLink(_)));
        assert_eq!(a.search(), "s");
    }
}
