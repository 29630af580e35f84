//! Page stack and named routes.

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::debug;

use crate::Theme;
use crate::commands::Command;
use crate::model::{ServiceRecord, UserProfile};
use crate::ui::{EventResult, Keybinding};

/// A navigation target together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Login,
    Register,
    AdminHome(UserProfile),
    CustomerHome(UserProfile),
    ServiceDetails(ServiceRecord),
    AddService,
    Profile(UserProfile),
}

impl Route {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
            Self::AdminHome(_) => "AdminHome",
            Self::CustomerHome(_) => "CustomerHome",
            Self::ServiceDetails(_) => "ServiceDetails",
            Self::AddService => "AddService",
            Self::Profile(_) => "Profile",
        }
    }

    /// The home route for a signed-in profile.
    pub fn home(profile: UserProfile) -> Self {
        if profile.is_admin() {
            Self::AdminHome(profile)
        } else {
            Self::CustomerHome(profile)
        }
    }
}

pub enum PageMsg {
    /// No action needed
    Idle,
    /// Run one or more commands
    Run(Vec<Box<dyn Command>>),
    /// Open a route, or return to it if it is already on the stack
    Navigate(Route),
    /// Close this page
    Back,
    /// Replace the whole stack with a single route
    Reset(Route),
    /// Show a blocking alert
    Alert { title: String, message: String },
}

impl<T: Command> From<T> for PageMsg {
    fn from(value: T) -> Self {
        Self::Run(vec![Box::new(value)])
    }
}

impl PageMsg {
    pub fn alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Alert {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// One screen of the application.
///
/// Pages keep their own state and message queue. The App calls methods in
/// this order:
///
/// 1. `init()` - once when the page is pushed
/// 2. `update()` - immediately after init to process startup messages
/// 3. For each event:
///    - `handle_tick()` if tick event
///    - `handle_key()` if key event, then `update()` if consumed
///    - `on_focus()` when the page becomes visible again, then `update()`
/// 4. When a command completes: `update()`
pub trait Page {
    /// Queue the messages the page needs when it is first shown.
    fn init(&mut self) {}

    /// Called when the page is on top again: the page above it was closed
    /// or the terminal regained focus.
    fn on_focus(&mut self) {}

    fn handle_tick(&mut self) {}

    /// Handle a key event. `Ignored` keys fall through to global bindings.
    ///
    /// # Errors
    /// Returns an error if a component failed to handle the key.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>>;

    /// Process all queued messages.
    ///
    /// # Errors
    /// Returns an error if message processing fails. The App shows it as an
    /// alert and keeps the page.
    fn update(&mut self) -> Result<PageMsg>;

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    fn breadcrumb(&self) -> String;

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}

struct Entry {
    name: &'static str,
    page: Box<dyn Page>,
}

/// The navigation stack. The last entry is the visible page.
#[derive(Default)]
pub struct PageStack {
    entries: Vec<Entry>,
}

impl PageStack {
    /// Show `route`.
    ///
    /// If a page for the same route name is already on the stack, everything
    /// above it is closed and it receives `on_focus`. Otherwise `build` creates
    /// a new page which is pushed and initialized.
    pub fn navigate(&mut self, route: Route, build: impl FnOnce(Route) -> Box<dyn Page>) {
        let name = route.name();
        if let Some(index) = self.entries.iter().position(|e| e.name == name) {
            debug!(route = name, "Returning to page on stack");
            self.entries.truncate(index + 1);
            self.focus_top();
        } else {
            debug!(route = name, "Pushing page");
            let mut page = build(route);
            page.init();
            self.entries.push(Entry { name, page });
        }
    }

    /// Close the top page. The root page is never closed.
    pub fn back(&mut self) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        if let Some(closed) = self.entries.pop() {
            debug!(route = closed.name, "Closing page");
        }
        self.focus_top();
        true
    }

    /// Replace the stack with a single new page.
    pub fn reset(&mut self, route: Route, build: impl FnOnce(Route) -> Box<dyn Page>) {
        debug!(route = route.name(), "Resetting page stack");
        self.entries.clear();
        self.navigate(route, build);
    }

    pub fn focus_top(&mut self) {
        if let Some(top) = self.top_mut() {
            top.on_focus();
        }
    }

    pub fn top_mut(&mut self) -> Option<&mut Box<dyn Page>> {
        self.entries.last_mut().map(|e| &mut e.page)
    }

    #[cfg(test)]
    pub fn top_name(&self) -> Option<&'static str> {
        self.entries.last().map(|e| e.name)
    }

    pub fn breadcrumbs(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.page.breadcrumb()).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::model::{Price, Role};

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: String,
        log: Log,
    }

    impl Page for Probe {
        fn init(&mut self) {
            self.log.borrow_mut().push(format!("init {}", self.name));
        }

        fn on_focus(&mut self) {
            self.log.borrow_mut().push(format!("focus {}", self.name));
        }

        fn handle_key(&mut self, _key: KeyEvent) -> Result<EventResult<()>> {
            Ok(EventResult::Ignored)
        }

        fn update(&mut self) -> Result<PageMsg> {
            Ok(PageMsg::Idle)
        }

        fn render(&mut self, _frame: &mut Frame, _area: Rect, _theme: &Theme) {}

        fn breadcrumb(&self) -> String {
            self.name.clone()
        }
    }

    fn builder(log: &Log) -> impl FnOnce(Route) -> Box<dyn Page> {
        let log = log.clone();
        move |route| {
            Box::new(Probe {
                name: route.name().to_string(),
                log,
            })
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: "uid".to_string(),
            email: "boss@example.com".to_string(),
            name: "Boss".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_push_and_back() {
        let log = Log::default();
        let mut stack = PageStack::default();
        stack.navigate(Route::AdminHome(profile()), builder(&log));
        stack.navigate(Route::AddService, builder(&log));

        assert_eq!(stack.breadcrumbs(), vec!["AdminHome", "AddService"]);
        assert!(stack.back());
        assert_eq!(stack.top_name(), Some("AdminHome"));
        assert!(!stack.back());
        assert_eq!(
            *log.borrow(),
            vec!["init AdminHome", "init AddService", "focus AdminHome"]
        );
    }

    #[test]
    fn test_navigate_to_existing_route_pops_back() {
        let log = Log::default();
        let mut stack = PageStack::default();
        stack.navigate(Route::AdminHome(profile()), builder(&log));
        let record = ServiceRecord::new("Haircut", Price::whole(100_000));
        stack.navigate(Route::ServiceDetails(record), builder(&log));
        stack.navigate(Route::Profile(profile()), builder(&log));

        stack.navigate(Route::AdminHome(profile()), builder(&log));

        assert_eq!(stack.len(), 1);
        assert_eq!(log.borrow().last().map(String::as_str), Some("focus AdminHome"));
        assert_eq!(log.borrow().iter().filter(|l| l.starts_with("init")).count(), 3);
    }

    #[test]
    fn test_reset_replaces_stack() {
        let log = Log::default();
        let mut stack = PageStack::default();
        stack.navigate(Route::Login, builder(&log));
        stack.navigate(Route::Register, builder(&log));

        stack.reset(Route::home(profile()), builder(&log));

        assert_eq!(stack.breadcrumbs(), vec!["AdminHome"]);
    }

    #[test]
    fn test_home_route_depends_on_role() {
        let mut customer = profile();
        customer.role = Role::User;
        assert_eq!(Route::home(customer).name(), "CustomerHome");
        assert_eq!(Route::home(profile()).name(), "AdminHome");
    }
}
