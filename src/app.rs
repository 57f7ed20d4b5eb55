use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::AppConfig;
use crate::dialog::{DeleteDialog, Dialog, DialogStack, EditDialog, EditPayload};
use crate::form::{FieldId, FieldKind, Form};
use crate::notice::{NoticeId, Notifications, Severity};
use crate::page::{FormAction, Listing, Location, Navigation, Page};
use crate::scheduler::{Scheduler, Task, TaskId};
use crate::storage::draft::DraftCache;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields.";
pub const CREATED_MESSAGE: &str = "Listing created successfully!";

/// The two mutually exclusive dashboard panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Panel {
    #[default]
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "current")]
    Listings,
}

/// Arrangement of the panel toggle buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Horizontal, // full-width row
    Stacked,    // one button per line
}

impl LayoutMode {
    pub fn for_viewport(width_px: u32, breakpoint_px: u32) -> Self {
        if width_px < breakpoint_px {
            LayoutMode::Stacked
        } else {
            LayoutMode::Horizontal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Toggles,
    Field(FieldId),
    Listings,
}

impl Focus {
    /// Inputs and text areas swallow the panel shortcuts; selects do not
    fn is_input(self) -> bool {
        match self {
            Focus::Field(id) => id.kind() != FieldKind::Select,
            Focus::Toggles | Focus::Listings => false,
        }
    }
}

pub struct App {
    pub config: AppConfig,
    pub location: Location,
    pub user_name: String,

    // Listings panel
    pub listings: Vec<Listing>,
    pub selected_listing: usize,

    // Visibility and focus
    pub panel: Panel,
    pub focus: Focus,
    pub layout: LayoutMode,

    pub create_form: Form,
    pub dialogs: DialogStack,
    pub notifications: Notifications,

    // Form post waiting to be carried out by the backend
    pub navigation: Option<Navigation>,
    // A post is queued or in flight; the page takes no other
    navigating: bool,
    desktop_notice: Option<String>,

    pub should_quit: bool,

    drafts: DraftCache,
    scheduler: Scheduler,
    draft_clear: Option<TaskId>,
}

impl App {
    /// Build the page the server rendered for `location`
    pub fn load(
        page: Page,
        location: Location,
        config: AppConfig,
        drafts: DraftCache,
        columns: u16,
        now: Instant,
    ) -> Self {
        let mut create_form = Form::create();
        for (name, value) in &page.create_form {
            match FieldId::ALL.into_iter().find(|f| f.name() == name) {
                Some(FieldId::IsAvailable) => {
                    create_form.set_checked(FieldId::IsAvailable, value == "on" || value == "true")
                }
                Some(id) => create_form.set_value(id, value.clone()),
                None => tracing::debug!("Ignoring unknown create field {}", name),
            }
        }

        let focus = match page.section {
            Panel::Create => Focus::Toggles,
            Panel::Listings => Focus::Listings,
        };

        let mut app = Self {
            config,
            location,
            user_name: page.user_name,
            listings: page.listings,
            selected_listing: 0,
            panel: page.section,
            focus,
            layout: LayoutMode::Horizontal,
            create_form,
            dialogs: DialogStack::default(),
            notifications: Notifications::default(),
            navigation: None,
            navigating: false,
            desktop_notice: None,
            should_quit: false,
            drafts,
            scheduler: Scheduler::new(),
            draft_clear: None,
        };

        app.drafts.restore(&mut app.create_form);

        let counters: Vec<(String, usize)> = app
            .config
            .counters
            .iter()
            .map(|(id, max)| (id.clone(), *max))
            .collect();
        for (id, max) in counters {
            if !app.add_character_counter(&id, max) {
                tracing::debug!("No field {} for a character counter", id);
            }
        }

        app.resize(columns);

        // Server flashes render above the list in template order
        for flash in page.flashes.iter().rev() {
            app.show_alert(flash.message.clone(), flash.severity(), now);
        }

        if app.location.is_created_redirect() {
            app.show_alert(CREATED_MESSAGE, Severity::Success, now);
            app.create_form.reset();
            // Whatever was restored belongs to the listing just created
            app.drafts.clear(&app.create_form);
            if app.config.desktop_notifications {
                app.desktop_notice = Some(CREATED_MESSAGE.to_string());
            }
        }

        tracing::info!("Loaded {} ({} listings)", app.location, app.listings.len());
        app
    }

    /// Show one panel and hide the other
    pub fn show_section(&mut self, panel: Panel, now: Instant) {
        self.panel = panel;
        match panel {
            Panel::Create => {
                self.focus = Focus::Toggles;
                if !self.scheduler.is_scheduled(Task::FocusFirstField) {
                    let delay = self.config.focus_delay();
                    self.scheduler.schedule(now, delay, Task::FocusFirstField);
                }
            }
            Panel::Listings => self.focus = Focus::Listings,
        }
        tracing::debug!("Showing {:?} panel", panel);
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.panel == panel
    }

    /// Raise a banner that goes away on its own after the configured time
    pub fn show_alert(&mut self, message: impl Into<String>, severity: Severity, now: Instant) -> NoticeId {
        let id = self.notifications.push(message, severity);
        let ttl = self.config.notification_ttl();
        self.scheduler.schedule(now, ttl, Task::DismissNotification(id));
        id
    }

    /// Attach a counter to a create field by its page id
    pub fn add_character_counter(&mut self, element_id: &str, max: usize) -> bool {
        match FieldId::from_element_id(element_id) {
            Some(id) => self.create_form.attach_counter(id, max),
            None => false,
        }
    }

    /// Populate the edit dialog and open it
    pub fn edit_listing(&mut self, payload: EditPayload) {
        tracing::debug!("Editing listing {}", payload.id);
        self.dialogs.show(Dialog::Edit(EditDialog::populate(payload)));
    }

    /// Populate the delete confirmation and open it
    pub fn delete_listing(&mut self, id: &str, item_name: &str) {
        tracing::debug!("Confirming delete of listing {}", id);
        self.dialogs.show(Dialog::Delete(DeleteDialog::populate(id, item_name)));
    }

    pub fn selected(&self) -> Option<&Listing> {
        self.listings.get(self.selected_listing)
    }

    /// Validate the create form and post it. Returns true if navigation
    /// was started.
    pub fn submit_create(&mut self, now: Instant) -> bool {
        if self.create_form.submit.is_disabled() || self.post_in_progress() {
            return false;
        }

        let missing = self.create_form.missing_required();
        if !missing.is_empty() {
            tracing::debug!("Create blocked, missing {:?}", missing);
            self.show_alert(REQUIRED_FIELDS_MESSAGE, Severity::Error, now);
            return false;
        }

        self.create_form.submit.pending = true;
        self.navigating = true;
        self.navigation = Some(Navigation {
            action: FormAction::Create,
            fields: self.create_form.to_submission(),
        });

        let delay = self.config.draft_clear_delay();
        self.draft_clear = Some(self.scheduler.schedule(now, delay, Task::ClearDrafts));
        tracing::info!("Submitting new listing");
        true
    }

    /// Post the open edit dialog. The server validates updates.
    pub fn submit_edit(&mut self) -> bool {
        if self.post_in_progress() {
            return false;
        }
        let Some(Dialog::Edit(dialog)) = self.dialogs.top_mut() else {
            return false;
        };
        if dialog.form.submit.is_disabled() {
            return false;
        }
        dialog.form.submit.pending = true;
        self.navigating = true;
        self.navigation = Some(Navigation {
            action: dialog.action.clone(),
            fields: dialog.form.to_submission(),
        });
        tracing::info!("Submitting {}", dialog.action.path());
        true
    }

    /// Confirm the open delete dialog
    pub fn submit_delete(&mut self) -> bool {
        if self.post_in_progress() {
            return false;
        }
        let Some(Dialog::Delete(dialog)) = self.dialogs.top_mut() else {
            return false;
        };
        if dialog.submit.is_disabled() {
            return false;
        }
        dialog.submit.pending = true;
        self.navigating = true;
        self.navigation = Some(Navigation {
            action: dialog.action.clone(),
            fields: Default::default(),
        });
        tracing::info!("Submitting {}", dialog.action.path());
        true
    }

    fn post_in_progress(&self) -> bool {
        if self.navigating {
            tracing::debug!("Ignoring submit, a form post is already in progress");
        }
        self.navigating
    }

    pub fn take_navigation(&mut self) -> Option<Navigation> {
        self.navigation.take()
    }

    pub fn take_desktop_notice(&mut self) -> Option<String> {
        self.desktop_notice.take()
    }

    /// The post never left: make the page usable again
    pub fn navigation_failed(&mut self, error: &str, now: Instant) {
        self.navigating = false;
        self.create_form.submit.pending = false;
        if let Some(id) = self.draft_clear.take() {
            self.scheduler.cancel(id);
        }
        if let Some(dialog) = self.dialogs.top_mut() {
            match dialog {
                Dialog::Edit(d) => d.form.submit.pending = false,
                Dialog::Delete(d) => d.submit.pending = false,
                Dialog::Help => {}
            }
        }
        self.show_alert(format!("Submission failed: {}", error), Severity::Error, now);
    }

    /// Terminal width changed (also called once on load)
    pub fn resize(&mut self, columns: u16) {
        let width = self.config.viewport_px(columns);
        self.layout = LayoutMode::for_viewport(width, self.config.breakpoint_px);
    }

    /// Run every scheduled task that is due
    pub fn tick(&mut self, now: Instant) {
        for task in self.scheduler.due(now) {
            match task {
                Task::FocusFirstField => {
                    // a hidden field cannot take focus
                    if self.panel == Panel::Create && self.focus == Focus::Toggles {
                        self.focus = Focus::Field(FieldId::ItemName);
                    }
                }
                Task::DismissNotification(id) => {
                    self.notifications.dismiss(id);
                }
                Task::ClearDrafts => {
                    self.draft_clear = None;
                    self.drafts.clear(&self.create_form);
                }
            }
        }
    }

    /// The page is going away: cancel everything still scheduled
    pub fn teardown(&mut self) {
        let dropped = self.scheduler.clear();
        self.draft_clear = None;
        if dropped > 0 {
            tracing::debug!("Dropped {} pending task(s) on teardown", dropped);
        }
    }

    #[cfg(test)]
    pub fn drafts(&self) -> &DraftCache {
        &self.drafts
    }

    #[cfg(test)]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    fn in_text_input(&self) -> bool {
        match self.dialogs.top() {
            Some(Dialog::Edit(d)) => d.focused().kind() != FieldKind::Select,
            Some(_) => false,
            None => self.focus.is_input(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let command = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER);

        if key.code == KeyCode::Esc {
            if self.dialogs.hide_all() == 0 && self.focus.is_input() {
                self.focus = Focus::Toggles;
            }
            return;
        }

        if command {
            match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                }
                KeyCode::Char('n') if !self.in_text_input() => self.show_section(Panel::Create, now),
                KeyCode::Char('l') if !self.in_text_input() => self.show_section(Panel::Listings, now),
                _ => {}
            }
            return;
        }

        if !self.dialogs.is_empty() {
            self.handle_dialog_key(key);
            return;
        }

        match self.focus {
            Focus::Field(id) => self.handle_field_key(id, key, now),
            Focus::Toggles => self.handle_toggles_key(key, now),
            Focus::Listings => self.handle_listings_key(key),
        }
    }

    /// Bracketed paste lands in the focused text field as one input event
    pub fn handle_paste(&mut self, text: &str) {
        if let Some(Dialog::Edit(dialog)) = self.dialogs.top_mut() {
            let id = dialog.focused();
            dialog.form.insert(id, text);
            return;
        }
        if !self.dialogs.is_empty() {
            return;
        }
        if let Focus::Field(id) = self.focus {
            if self.create_form.insert(id, text) {
                self.save_draft(id);
            }
        }
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.dialogs.show(Dialog::Help),
            KeyCode::Char('x') => {
                self.notifications.dismiss_top();
            }
            _ => return false,
        }
        true
    }

    fn handle_toggles_key(&mut self, key: KeyEvent, now: Instant) {
        if self.handle_global_key(key) {
            return;
        }
        match key.code {
            KeyCode::Left => self.show_section(Panel::Create, now),
            KeyCode::Right => self.show_section(Panel::Listings, now),
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => {
                if self.panel == Panel::Create {
                    self.focus = Focus::Field(FieldId::ALL[0]);
                } else {
                    self.focus = Focus::Listings;
                }
            }
            _ => {}
        }
    }

    fn handle_listings_key(&mut self, key: KeyEvent) {
        if self.handle_global_key(key) {
            return;
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.listings.is_empty() {
                    self.selected_listing = (self.selected_listing + 1) % self.listings.len();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if !self.listings.is_empty() {
                    self.selected_listing = self
                        .selected_listing
                        .checked_sub(1)
                        .unwrap_or(self.listings.len() - 1);
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(listing) = self.selected() {
                    let payload = EditPayload::from(listing);
                    self.edit_listing(payload);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(listing) = self.selected() {
                    let (id, name) = (listing.id.clone(), listing.item_name.clone());
                    self.delete_listing(&id, &name);
                }
            }
            KeyCode::BackTab => self.focus = Focus::Toggles,
            _ => {}
        }
    }

    fn handle_field_key(&mut self, id: FieldId, key: KeyEvent, now: Instant) {
        let position = FieldId::ALL.iter().position(|f| *f == id).unwrap_or(0);
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                if let Some(next) = FieldId::ALL.get(position + 1) {
                    self.focus = Focus::Field(*next);
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = match position.checked_sub(1) {
                    Some(prev) => Focus::Field(FieldId::ALL[prev]),
                    None => Focus::Toggles,
                };
            }
            KeyCode::Enter => {
                self.submit_create(now);
            }
            KeyCode::Backspace => {
                if self.create_form.backspace(id) {
                    self.save_draft(id);
                }
            }
            KeyCode::Left => {
                self.create_form.cycle_option(id, false);
            }
            KeyCode::Right => {
                self.create_form.cycle_option(id, true);
            }
            KeyCode::Char(c) => match id.kind() {
                FieldKind::Checkbox if c == ' ' => {
                    self.create_form.toggle(id);
                }
                FieldKind::Select if c == ' ' => {
                    self.create_form.cycle_option(id, true);
                }
                FieldKind::Select | FieldKind::Checkbox => {
                    self.handle_global_key(key);
                }
                FieldKind::Text | FieldKind::Number => {
                    if self.create_form.insert(id, &c.to_string()) {
                        self.save_draft(id);
                    }
                }
            },
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(top) = self.dialogs.top_mut() else {
            return;
        };
        match top {
            Dialog::Help => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(1)) {
                    self.dialogs.hide_top();
                }
            }
            Dialog::Delete(_) => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.submit_delete();
                }
                KeyCode::Char('n') => {
                    self.dialogs.hide_top();
                }
                _ => {}
            },
            Dialog::Edit(dialog) => {
                let id = dialog.focused();
                match key.code {
                    KeyCode::Tab | KeyCode::Down => dialog.focus_next(),
                    KeyCode::BackTab | KeyCode::Up => dialog.focus_prev(),
                    KeyCode::Backspace => {
                        dialog.form.backspace(id);
                    }
                    KeyCode::Left => {
                        dialog.form.cycle_option(id, false);
                    }
                    KeyCode::Right => {
                        dialog.form.cycle_option(id, true);
                    }
                    KeyCode::Char(' ') if !id.accepts_text() => {
                        dialog.form.toggle(id);
                        dialog.form.cycle_option(id, true);
                    }
                    KeyCode::Char(c) => {
                        dialog.form.insert(id, &c.to_string());
                    }
                    KeyCode::Enter => {
                        self.submit_edit();
                    }
                    _ => {}
                }
            }
        }
    }

    fn save_draft(&mut self, id: FieldId) {
        if id.is_text_like() {
            let value = self.create_form.value(id).to_string();
            self.drafts.save(id.name(), &value);
        }
    }
}
