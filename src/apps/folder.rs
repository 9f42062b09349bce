use super::{AppAction, ContentLine, KeyInput};
use crate::core::registry::{AccessLevel, AppDescriptor, AppId};

#[derive(Debug, Clone)]
struct FolderEntry {
    id: AppId,
    label: String,
    required: AccessLevel,
}

/// Sub-app launcher. Entries the current level cannot open are not listed.
#[derive(Debug)]
pub struct FolderApp {
    entries: Vec<FolderEntry>,
    level: AccessLevel,
    selected: usize,
}

impl FolderApp {
    pub fn new(children: Vec<&AppDescriptor>, level: AccessLevel) -> Self {
        let entries = children
            .into_iter()
            .map(|d| FolderEntry {
                id: d.id.clone(),
                label: format!("{} {}", d.icon, d.name),
                required: d.access_level,
            })
            .collect();
        Self {
            entries,
            level,
            selected: 0,
        }
    }

    pub fn set_access_level(&mut self, level: AccessLevel) {
        self.level = level;
        self.selected = self.selected.min(self.visible().len().saturating_sub(1));
    }

    fn visible(&self) -> Vec<&FolderEntry> {
        self.entries
            .iter()
            .filter(|e| self.level >= e.required)
            .collect()
    }

    pub fn visible_ids(&self) -> Vec<AppId> {
        self.visible().into_iter().map(|e| e.id.clone()).collect()
    }

    pub fn key(&mut self, key: KeyInput) -> AppAction {
        let count = self.visible().len();
        match key {
            KeyInput::Up => {
                self.selected = self.selected.saturating_sub(1);
                AppAction::None
            }
            KeyInput::Down => {
                if self.selected + 1 < count {
                    self.selected += 1;
                }
                AppAction::None
            }
            KeyInput::Enter => self.open_selected(),
            _ => AppAction::None,
        }
    }

    pub fn click(&mut self, row: usize) -> AppAction {
        if row < self.visible().len() {
            self.selected = row;
            self.open_selected()
        } else {
            AppAction::None
        }
    }

    fn open_selected(&self) -> AppAction {
        self.visible()
            .get(self.selected)
            .map(|e| AppAction::Open(e.id.clone()))
            .unwrap_or(AppAction::None)
    }

    pub fn lines(&self) -> Vec<ContentLine> {
        let visible = self.visible();
        if visible.is_empty() {
            return vec![ContentLine::dim("This folder is empty.")];
        }
        visible
            .iter()
            .enumerate()
            .map(|(i, e)| ContentLine::choice(format!(" {}", e.label), i == self.selected))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::ContentKind;

    fn children() -> Vec<AppDescriptor> {
        vec![
            AppDescriptor::new("open", "Open", "📄", ContentKind::Placeholder),
            AppDescriptor::new("secret", "Secret", "🔒", ContentKind::Placeholder).with_access(3),
            AppDescriptor::new("other", "Other", "📄", ContentKind::Placeholder),
        ]
    }

    #[test]
    fn hides_entries_above_current_level() {
        let kids = children();
        let mut app = FolderApp::new(kids.iter().collect(), AccessLevel::DEFAULT);
        assert_eq!(app.visible_ids(), vec![AppId::from("open"), AppId::from("other")]);
        app.set_access_level(AccessLevel(3));
        assert_eq!(app.visible_ids().len(), 3);
    }

    #[test]
    fn enter_and_click_open_selection() {
        let kids = children();
        let mut app = FolderApp::new(kids.iter().collect(), AccessLevel::DEFAULT);
        app.key(KeyInput::Down);
        app.key(KeyInput::Down);
        assert_eq!(app.key(KeyInput::Enter), AppAction::Open(AppId::from("other")));
        assert_eq!(app.click(0), AppAction::Open(AppId::from("open")));
        assert_eq!(app.click(5), AppAction::None);
    }

    #[test]
    fn empty_folder_says_so() {
        let app = FolderApp::new(Vec::new(), AccessLevel::DEFAULT);
        assert_eq!(app.lines()[0].text, "This folder is empty.");
    }
}
