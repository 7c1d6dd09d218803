use crate::app::{App, InputMode};
use crate::catalog::{self, Catalog, CatalogSource};
use crate::error::CatalogError;
use crate::storage::SnapshotStore;
use crate::ui;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

const POLL_RATE: Duration = Duration::from_millis(100);

struct CatalogMsg {
    result: Result<Catalog, CatalogError>,
}

pub fn run_loop<S: SnapshotStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
    source: CatalogSource,
) -> io::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let (catalog_tx, mut catalog_rx) = mpsc::channel::<CatalogMsg>(1);

    // One load attempt per start; the UI runs against an empty catalog meanwhile
    rt.spawn(async move {
        let result = match catalog::build_client() {
            Ok(client) => catalog::load_catalog(&client, &source).await,
            Err(e) => Err(e),
        };
        let _ = catalog_tx.send(CatalogMsg { result }).await;
    });

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(POLL_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }

        while let Ok(msg) = catalog_rx.try_recv() {
            match msg.result {
                Ok(catalog) => {
                    app.set_catalog(catalog);
                    if app.catalog.is_empty() {
                        app.set_status("Catalog loaded but lists no chapters".to_string());
                    }
                }
                Err(e) => app.catalog_failed(e.to_string()),
            }
        }

        if app.should_quit {
            return Ok(());
        }

        app.tick_count = app.tick_count.wrapping_add(1);
    }
}

pub fn handle_key<S: SnapshotStore>(app: &mut App<S>, key: KeyEvent) {
    // Global: Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Load failure alert swallows the next key
    if app.alert.is_some() {
        app.alert = None;
        return;
    }

    if app.show_help {
        if key.code == KeyCode::Char('?') || key.code == KeyCode::Esc {
            app.show_help = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => {
            if app.panel.is_open() {
                handle_panel_key(app, key);
            } else {
                handle_navigator_key(app, key);
            }
        }
        InputMode::ComboPicker(_) => handle_combo_key(app, key),
        InputMode::PlanForm(_) => handle_plan_key(app, key),
    }
}

fn handle_navigator_key<S: SnapshotStore>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('g') => app.select_first(),
        KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.activate_selected(),

        KeyCode::Char('c') => app.open_combo_picker(),
        KeyCode::Char('p') => app.toggle_plan_form(),

        KeyCode::Char('t') => {
            app.cycle_theme();
            app.set_status(format!("Theme: {}", app.theme_name.label()));
        }

        _ => {}
    }
}

fn handle_panel_key<S: SnapshotStore>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Left | KeyCode::Char('h') => {
            app.close_panel()
        }
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('x') => app.toggle_selected_topic(),
        KeyCode::Char('R') => app.reset_open_chapter(),
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
}

fn handle_combo_key<S: SnapshotStore>(app: &mut App<S>, key: KeyEvent) {
    let InputMode::ComboPicker(pending) = app.input_mode else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Char('j')
        | KeyCode::Down
        | KeyCode::Tab
        | KeyCode::Char('c')
        | KeyCode::Char(' ') => {
            app.input_mode = InputMode::ComboPicker(pending.next());
        }
        KeyCode::Char('k') | KeyCode::Up => {
            // three steps forward is one step back in a four-entry cycle
            app.input_mode = InputMode::ComboPicker(pending.next().next().next());
        }
        KeyCode::Enter => app.apply_combo(pending.code()),
        _ => {}
    }
}

fn handle_plan_key<S: SnapshotStore>(app: &mut App<S>, key: KeyEvent) {
    let InputMode::PlanForm(field) = app.input_mode else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.toggle_plan_form(),
        KeyCode::Tab | KeyCode::Down => app.input_mode = InputMode::PlanForm(field.next()),
        KeyCode::Enter => app.send_plan(),
        KeyCode::Backspace => {
            app.plan_field_mut(field).pop();
        }
        KeyCode::Char(c) => app.plan_field_mut(field).push(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PlanField;
    use crate::model::{Combo, Subject};
    use crate::notify::NotifySettings;
    use crate::progress::Progress;
    use crate::storage::MemoryStore;

    fn press(app: &mut App<MemoryStore>, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> App<MemoryStore> {
        let mut app = App::new(
            Progress::load(MemoryStore::default()),
            NotifySettings::default(),
        );
        app.set_catalog(
            Catalog::from_json(r#"{"Physics": {"Optics": ["Lenses", "Mirrors"]}}"#).unwrap(),
        );
        app
    }

    #[test]
    fn open_toggle_close_flow() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(app.panel.is_open());

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.progress.is_done(Subject::Physics, "Optics", "Mirrors"));
        assert_eq!(app.dashboard.overall, 50);

        press(&mut app, KeyCode::Esc);
        assert!(!app.panel.is_open());
        press(&mut app, KeyCode::Esc);
        assert!(!app.panel.is_open());
    }

    #[test]
    fn combo_picker_cycles_and_applies() {
        let mut app = app();
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.input_mode, InputMode::ComboPicker(Combo::Pcmb));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.input_mode, InputMode::ComboPicker(Combo::Pcm));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.progress.combo(), Combo::Pcm);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn plan_form_collects_text() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        for c in "Ravi".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.plan_form.name, "Ravi");
        assert_eq!(app.plan_form.email, "");
        assert_eq!(app.input_mode, InputMode::PlanForm(PlanField::Email));

        // invalid form is reported, not sent
        press(&mut app, KeyCode::Enter);
        assert!(app.status_text().unwrap().contains("email"));
        assert_eq!(app.input_mode, InputMode::PlanForm(PlanField::Email));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn alert_is_dismissed_by_any_key() {
        let mut app = app();
        app.catalog_failed("boom".to_string());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.alert.is_none());
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
