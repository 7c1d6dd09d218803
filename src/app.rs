use crate::aggregate::{chapter_tally, visible_subjects, Dashboard, Tally};
use crate::catalog::Catalog;
use crate::model::*;
use crate::notify::{self, NotifySettings, PlanRequest};
use crate::panel::TopicPanel;
use crate::progress::Progress;
use crate::state::ViewState;
use crate::storage::SnapshotStore;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// One line of the subject navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRow {
    Subject(Subject),
    Chapter { subject: Subject, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    ComboPicker(Combo),
    PlanForm(PlanField),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanField {
    Name,
    Email,
    Hours,
    ExamDate,
}

impl PlanField {
    pub const ALL: [PlanField; 4] = [
        PlanField::Name,
        PlanField::Email,
        PlanField::Hours,
        PlanField::ExamDate,
    ];

    pub fn next(&self) -> Self {
        match self {
            PlanField::Name => PlanField::Email,
            PlanField::Email => PlanField::Hours,
            PlanField::Hours => PlanField::ExamDate,
            PlanField::ExamDate => PlanField::Name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PlanField::Name => "Name",
            PlanField::Email => "Email",
            PlanField::Hours => "Hours/Day",
            PlanField::ExamDate => "Exam Date",
        }
    }
}

pub struct App<S: SnapshotStore> {
    // Study data
    pub catalog: Catalog,
    pub catalog_status: CatalogStatus,
    pub progress: Progress<S>,
    pub dashboard: Dashboard,

    // Navigator
    pub rows: Vec<NavRow>,
    pub selected_index: usize,
    pub collapsed: HashSet<Subject>,

    // Topic sheet
    pub panel: TopicPanel,

    // Input
    pub input_mode: InputMode,
    pub should_quit: bool,

    // Plan request
    pub plan_form: PlanRequest,
    pub notify: NotifySettings,

    // View
    pub theme_name: ThemeName,
    pub theme: Theme,
    pub show_help: bool,
    pub alert: Option<String>,

    // Status
    pub status_message: Option<(String, Instant)>,

    // Spinner
    pub tick_count: u64,
}

impl<S: SnapshotStore> App<S> {
    pub fn new(progress: Progress<S>, notify: NotifySettings) -> Self {
        let mut app = Self {
            catalog: Catalog::default(),
            catalog_status: CatalogStatus::Loading,
            progress,
            dashboard: Dashboard::default(),
            rows: Vec::new(),
            selected_index: 0,
            collapsed: HashSet::new(),
            panel: TopicPanel::default(),
            input_mode: InputMode::Normal,
            should_quit: false,
            plan_form: PlanRequest::default(),
            notify,
            theme_name: ThemeName::Dark,
            theme: Theme::from_name(ThemeName::Dark),
            show_help: false,
            alert: None,
            status_message: None,
            tick_count: 0,
        };
        app.recompute_rows();
        app.recompute_dashboard();
        app
    }

    // Catalog lifecycle
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        self.catalog_status = CatalogStatus::Ready;
        self.recompute_rows();
        self.recompute_dashboard();
    }

    /// Leave the catalog empty and tell the user why.
    pub fn catalog_failed(&mut self, message: String) {
        tracing::error!(error = %message, "Catalog load failed");
        self.catalog = Catalog::default();
        self.catalog_status = CatalogStatus::Failed(message.clone());
        self.alert = Some(format!("Could not load the subject catalog.\n\n{message}"));
        self.recompute_rows();
        self.recompute_dashboard();
    }

    pub fn recompute_dashboard(&mut self) {
        self.dashboard = Dashboard::compute(&self.catalog, self.progress.snapshot());
    }

    pub fn recompute_rows(&mut self) {
        let mut rows = Vec::new();
        for subject in visible_subjects(self.progress.combo()) {
            rows.push(NavRow::Subject(subject));
            if self.collapsed.contains(&subject) {
                continue;
            }
            rows.extend(
                (0..self.catalog.chapters(subject).len())
                    .map(|index| NavRow::Chapter { subject, index }),
            );
        }
        self.rows = rows;

        if self.rows.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len() - 1;
        }
    }

    pub fn chapter_progress(&self, subject: Subject, index: usize) -> Tally {
        self.catalog
            .chapters(subject)
            .get(index)
            .map(|chapter| chapter_tally(self.progress.snapshot(), subject, chapter))
            .unwrap_or_default()
    }

    // Navigation
    pub fn select_next(&mut self) {
        if self.panel.is_open() {
            self.panel.select_next();
            return;
        }
        let len = self.rows.len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        if self.panel.is_open() {
            self.panel.select_prev();
            return;
        }
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.rows.len().saturating_sub(1);
    }

    /// Enter on a subject folds it; Enter on a chapter opens its topics.
    pub fn activate_selected(&mut self) {
        match self.rows.get(self.selected_index).cloned() {
            Some(NavRow::Subject(subject)) => {
                if !self.collapsed.remove(&subject) {
                    self.collapsed.insert(subject);
                }
                self.recompute_rows();
            }
            Some(NavRow::Chapter { subject, index }) => {
                if let Some(chapter) = self.catalog.chapters(subject).get(index) {
                    let name = chapter.name.clone();
                    self.panel.open(&self.catalog, subject, &name);
                }
            }
            None => {}
        }
    }

    pub fn close_panel(&mut self) {
        self.panel.close();
    }

    // Progress
    pub fn toggle_selected_topic(&mut self) {
        let Some((subject, chapter, topic)) = self.panel.selected() else {
            return;
        };
        let (chapter, topic) = (chapter.to_string(), topic.to_string());
        let value = !self.progress.is_done(subject, &chapter, &topic);
        match self.progress.toggle(subject, &chapter, &topic, value) {
            Ok(()) => self.recompute_dashboard(),
            Err(e) => self.set_status(format!("Could not save progress: {e}")),
        }
    }

    pub fn reset_open_chapter(&mut self) {
        let TopicPanel::Open {
            subject, chapter, ..
        } = &self.panel
        else {
            return;
        };
        let (subject, chapter) = (*subject, chapter.clone());
        match self.progress.reset_chapter(&self.catalog, subject, &chapter) {
            Ok(cleared) => {
                self.recompute_dashboard();
                self.set_status(format!("Reset {chapter}: {cleared} topics cleared"));
            }
            Err(e) => self.set_status(format!("Could not save progress: {e}")),
        }
    }

    // Combo
    pub fn open_combo_picker(&mut self) {
        self.input_mode = InputMode::ComboPicker(self.progress.combo());
    }

    pub fn apply_combo(&mut self, code: &str) {
        match self.progress.set_combo(code) {
            Ok(combo) => {
                if let TopicPanel::Open { subject, .. } = &self.panel {
                    if !visible_subjects(combo).contains(subject) {
                        self.panel.close();
                    }
                }
                self.recompute_rows();
                self.recompute_dashboard();
                self.set_status(format!("Combo: {combo}"));
            }
            Err(e) => self.set_status(e.to_string()),
        }
        self.input_mode = InputMode::Normal;
    }

    // Plan request
    pub fn wants_plan(&self) -> bool {
        matches!(self.input_mode, InputMode::PlanForm(_))
    }

    pub fn toggle_plan_form(&mut self) {
        self.input_mode = if self.wants_plan() {
            InputMode::Normal
        } else {
            InputMode::PlanForm(PlanField::Name)
        };
    }

    pub fn plan_field_mut(&mut self, field: PlanField) -> &mut String {
        match field {
            PlanField::Name => &mut self.plan_form.name,
            PlanField::Email => &mut self.plan_form.email,
            PlanField::Hours => &mut self.plan_form.hours_per_day,
            PlanField::ExamDate => &mut self.plan_form.exam_date,
        }
    }

    pub fn plan_field(&self, field: PlanField) -> &str {
        match field {
            PlanField::Name => &self.plan_form.name,
            PlanField::Email => &self.plan_form.email,
            PlanField::Hours => &self.plan_form.hours_per_day,
            PlanField::ExamDate => &self.plan_form.exam_date,
        }
    }

    pub fn send_plan(&mut self) {
        let overall = self.dashboard.overall_text();
        match notify::send_plan_request(&self.notify, &self.plan_form, &overall) {
            Ok(_) => {
                self.input_mode = InputMode::Normal;
                self.set_status("Plan request opened in your messaging app".to_string());
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    // Status
    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    pub fn status_text(&self) -> Option<&str> {
        if let Some((msg, when)) = &self.status_message {
            if when.elapsed() < Duration::from_secs(5) {
                return Some(msg.as_str());
            }
        }
        None
    }

    pub fn spinner_char(&self) -> char {
        const CHARS: &[char] = &['\u{25dc}', '\u{25dd}', '\u{25de}', '\u{25df}'];
        CHARS[(self.tick_count as usize / 2) % CHARS.len()]
    }

    pub fn cycle_theme(&mut self) {
        self.theme_name = self.theme_name.next();
        self.theme = Theme::from_name(self.theme_name);
    }

    pub fn set_theme(&mut self, name: ThemeName) {
        self.theme_name = name;
        self.theme = Theme::from_name(name);
    }

    // View state persistence
    pub fn to_view_state(&self) -> ViewState {
        ViewState {
            theme_name: Some(self.theme_name.label().to_lowercase()),
            selected_index: Some(self.selected_index),
        }
    }

    pub fn restore_view_state(&mut self, state: &ViewState) {
        if let Some(ref tn) = state.theme_name {
            self.set_theme(ThemeName::parse(tn));
        }
        if let Some(idx) = state.selected_index {
            self.selected_index = idx;
        }
    }
}
