use crate::config::actions::{
    DialogAction, FormAction, GlobalAction, LoginAction, NavAction, ProfileAction, SearchAction,
    ServicesAction,
};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;
use crossterm::event::KeyEvent;
use std::sync::Arc;

/// Maps key events to the actions configured for them.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::Theme => &kb.theme,
            GlobalAction::Back => &kb.back,
        }
    }

    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global(action).display()
    }

    fn nav(&self, action: NavAction) -> &KeyBinding {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => &kb.up,
            NavAction::Down => &kb.down,
            NavAction::PageUp => &kb.page_up,
            NavAction::PageDown => &kb.page_down,
            NavAction::Home => &kb.home,
            NavAction::End => &kb.end,
            NavAction::Select => &kb.select,
        }
    }

    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        self.nav(action).matches(event)
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        self.nav(action).display()
    }

    fn search(&self, action: SearchAction) -> &KeyBinding {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => &kb.toggle,
            SearchAction::Exit => &kb.exit,
        }
    }

    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        self.search(action).matches(event)
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        self.search(action).display()
    }

    fn services(&self, action: ServicesAction) -> &KeyBinding {
        let kb = &self.keybindings.services;
        match action {
            ServicesAction::Add => &kb.add,
            ServicesAction::Profile => &kb.profile,
            ServicesAction::Reload => &kb.reload,
        }
    }

    pub fn matches_services(&self, event: &KeyEvent, action: ServicesAction) -> bool {
        self.services(action).matches(event)
    }

    pub fn display_services(&self, action: ServicesAction) -> String {
        self.services(action).display()
    }

    fn form(&self, action: FormAction) -> &KeyBinding {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Next => &kb.next,
            FormAction::Previous => &kb.previous,
            FormAction::Submit => &kb.submit,
            FormAction::ToggleVisibility => &kb.toggle_visibility,
            FormAction::Cancel => &kb.cancel,
        }
    }

    pub fn matches_form(&self, event: &KeyEvent, action: FormAction) -> bool {
        self.form(action).matches(event)
    }

    pub fn display_form(&self, action: FormAction) -> String {
        self.form(action).display()
    }

    pub fn matches_login(&self, event: &KeyEvent, action: LoginAction) -> bool {
        match action {
            LoginAction::Register => self.keybindings.login.register.matches(event),
        }
    }

    pub fn display_login(&self, action: LoginAction) -> String {
        match action {
            LoginAction::Register => self.keybindings.login.register.display(),
        }
    }

    pub fn matches_profile(&self, event: &KeyEvent, action: ProfileAction) -> bool {
        match action {
            ProfileAction::Logout => self.keybindings.profile.logout.matches(event),
        }
    }

    pub fn display_profile(&self, action: ProfileAction) -> String {
        match action {
            ProfileAction::Logout => self.keybindings.profile.logout.display(),
        }
    }

    fn dialog(&self, action: DialogAction) -> &KeyBinding {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => &kb.confirm,
            DialogAction::Cancel => &kb.cancel,
            DialogAction::Dismiss => &kb.dismiss,
        }
    }

    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        self.dialog(action).matches(event)
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        self.dialog(action).display()
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_default_bindings() {
        let resolver = KeyResolver::default();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert!(resolver.matches_search(&key(KeyCode::Char('/')), SearchAction::Toggle));
        assert!(resolver.matches_nav(&key(KeyCode::Char('j')), NavAction::Down));
        assert!(resolver.matches_form(&key(KeyCode::Tab), FormAction::Next));
        assert!(resolver.matches_form(
            &KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT),
            FormAction::Previous
        ));
        assert!(resolver.matches_login(
            &KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
            LoginAction::Register
        ));
        assert!(!resolver.matches_login(&key(KeyCode::Char('r')), LoginAction::Register));
    }

    #[test]
    fn test_display() {
        let resolver = KeyResolver::default();
        assert_eq!(resolver.display_services(ServicesAction::Add), "a");
        assert_eq!(resolver.display_form(FormAction::ToggleVisibility), "ctrl+t");
        assert_eq!(resolver.display_nav(NavAction::Down), "j/Down");
    }
}
