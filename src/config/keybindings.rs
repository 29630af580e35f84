use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub theme: KeyBinding,
    pub back: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchKeybindings {
    pub toggle: KeyBinding,
    pub exit: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesKeybindings {
    pub add: KeyBinding,
    pub profile: KeyBinding,
    pub reload: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormKeybindings {
    pub next: KeyBinding,
    pub previous: KeyBinding,
    pub submit: KeyBinding,
    pub toggle_visibility: KeyBinding,
    pub cancel: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginKeybindings {
    pub register: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileKeybindings {
    pub logout: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
    pub dismiss: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub search: SearchKeybindings,
    pub services: ServicesKeybindings,
    pub form: FormKeybindings,
    pub login: LoginKeybindings,
    pub profile: ProfileKeybindings,
    pub dialog: DialogKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('q')),
                Key::with_ctrl(KeyCode::Char('c')),
            ]),
            theme: Key::new(KeyCode::Char('t')).into(),
            back: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![Key::new(KeyCode::Char('k')), Key::new(KeyCode::Up)]),
            down: KeyBinding::multiple(vec![Key::new(KeyCode::Char('j')), Key::new(KeyCode::Down)]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::multiple(vec![Key::new(KeyCode::Char('g')), Key::new(KeyCode::Home)]),
            end: KeyBinding::multiple(vec![Key::new(KeyCode::Char('G')), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for SearchKeybindings {
    fn default() -> Self {
        Self {
            toggle: Key::new(KeyCode::Char('/')).into(),
            exit: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for ServicesKeybindings {
    fn default() -> Self {
        Self {
            add: Key::new(KeyCode::Char('a')).into(),
            profile: Key::new(KeyCode::Char('p')).into(),
            reload: Key::new(KeyCode::Char('r')).into(),
        }
    }
}

impl Default for FormKeybindings {
    fn default() -> Self {
        Self {
            next: KeyBinding::multiple(vec![Key::new(KeyCode::Tab), Key::new(KeyCode::Down)]),
            previous: KeyBinding::multiple(vec![
                Key::with_shift(KeyCode::BackTab),
                Key::new(KeyCode::BackTab),
                Key::new(KeyCode::Up),
            ]),
            submit: Key::new(KeyCode::Enter).into(),
            toggle_visibility: Key::with_ctrl(KeyCode::Char('t')).into(),
            cancel: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for LoginKeybindings {
    fn default() -> Self {
        Self {
            register: Key::with_ctrl(KeyCode::Char('r')).into(),
        }
    }
}

impl Default for ProfileKeybindings {
    fn default() -> Self {
        Self {
            logout: Key::new(KeyCode::Char('l')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('y')),
                Key::new(KeyCode::Char('Y')),
                Key::new(KeyCode::Enter),
            ]),
            cancel: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('n')),
                Key::new(KeyCode::Char('N')),
                Key::new(KeyCode::Esc),
            ]),
            dismiss: KeyBinding::multiple(vec![
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Esc),
                Key::new(KeyCode::Char('q')),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: KeybindingsConfig = toml::from_str(
            r#"
            [services]
            add = "n"
            "#,
        )
        .unwrap();

        assert_eq!(config.services.add, Key::new(KeyCode::Char('n')).into());
        assert_eq!(config.services.reload, Key::new(KeyCode::Char('r')).into());
        assert_eq!(config.login.register, Key::with_ctrl(KeyCode::Char('r')).into());
    }

    #[test]
    fn test_multiple_keys() {
        let config: KeybindingsConfig = toml::from_str(
            r#"
            [profile]
            logout = ["l", "ctrl+q"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.profile.logout,
            KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('l')),
                Key::with_ctrl(KeyCode::Char('q')),
            ])
        );
    }
}
