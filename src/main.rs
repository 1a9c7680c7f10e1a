use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use math_quiz_builder::{
    config::Config,
    db::{self, SqliteStorage},
    editor::{handle_editor_input, ProblemDraft},
    logger,
    models::AppState,
    render::UnicodeRenderer,
    session::{handle_quiz_input, QuizRunner},
    store::ProblemStore,
    ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

struct App {
    config: Config,
    store: ProblemStore,
    renderer: UnicodeRenderer,
    state: AppState,
    selected_index: usize,
    draft: ProblemDraft,
    runner: Option<QuizRunner>,
    status: Option<String>,
}

impl App {
    fn new(config: Config, store: ProblemStore) -> Self {
        Self {
            config,
            store,
            renderer: UnicodeRenderer::new(),
            state: AppState::Menu,
            selected_index: 0,
            draft: ProblemDraft::new(),
            runner: None,
            status: None,
        }
    }

    fn clamp_selection(&mut self) {
        self.selected_index = self.selected_index.min(self.store.len().saturating_sub(1));
    }

    fn start_quiz(&mut self) {
        if self.store.is_empty() {
            self.status = Some("Add a problem before taking the quiz.".to_string());
            return;
        }
        let problems = self.store.problems().to_vec();
        let runner = if self.config.shuffle {
            QuizRunner::shuffled(problems)
        } else {
            QuizRunner::new(problems)
        };
        logger::log(&format!("Quiz started with {} problems", runner.problems.len()));
        self.runner = Some(runner);
        self.state = AppState::Quiz;
    }

    fn delete_selected(&mut self) -> math_quiz_builder::Result<()> {
        let Some(id) = self
            .store
            .problems()
            .get(self.selected_index)
            .map(|p| p.id().to_string())
        else {
            return Ok(());
        };
        if self.store.delete(&id)? {
            self.status = Some("Problem deleted.".to_string());
        }
        self.clamp_selection();
        Ok(())
    }

    /// Returns false when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> math_quiz_builder::Result<bool> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(false);
        }

        match self.state {
            AppState::Menu => {
                self.status = None;
                match key.code {
                    KeyCode::Up => self.selected_index = self.selected_index.saturating_sub(1),
                    KeyCode::Down => {
                        if self.selected_index + 1 < self.store.len() {
                            self.selected_index += 1;
                        }
                    }
                    KeyCode::Enter | KeyCode::Char('p') => {
                        if !self.store.is_empty() {
                            self.state = AppState::Preview;
                        }
                    }
                    KeyCode::Char('c') => {
                        self.draft = ProblemDraft::new();
                        self.state = AppState::Create;
                    }
                    KeyCode::Char('t') => self.start_quiz(),
                    KeyCode::Char('d') => {
                        if !self.store.is_empty() {
                            self.state = AppState::DeleteConfirm;
                        }
                    }
                    KeyCode::Esc | KeyCode::Char('q') => return Ok(false),
                    _ => {}
                }
            }
            AppState::Preview => match key.code {
                KeyCode::Left => self.selected_index = self.selected_index.saturating_sub(1),
                KeyCode::Right => {
                    if self.selected_index + 1 < self.store.len() {
                        self.selected_index += 1;
                    }
                }
                KeyCode::Char('d') => self.state = AppState::DeleteConfirm,
                KeyCode::Esc | KeyCode::Char('q') => self.state = AppState::Menu,
                _ => {}
            },
            AppState::DeleteConfirm => match key.code {
                KeyCode::Char('y') => {
                    self.delete_selected()?;
                    self.state = AppState::Menu;
                }
                KeyCode::Char('n') | KeyCode::Esc => self.state = AppState::Menu,
                _ => {}
            },
            AppState::Create => {
                handle_editor_input(&mut self.draft, key, &mut self.store, &mut self.state)?;
                if self.state == AppState::Menu {
                    self.clamp_selection();
                }
            }
            AppState::Quiz => {
                if let Some(runner) = &mut self.runner {
                    handle_quiz_input(runner, key, &mut self.state)?;
                }
            }
            AppState::QuizQuitConfirm => match key.code {
                KeyCode::Char('y') => {
                    self.runner = None;
                    self.state = AppState::Menu;
                }
                KeyCode::Char('n') | KeyCode::Esc => self.state = AppState::Quiz,
                _ => {}
            },
            AppState::Summary => match key.code {
                KeyCode::Char('m') | KeyCode::Enter => {
                    self.runner = None;
                    self.state = AppState::Menu;
                }
                KeyCode::Esc | KeyCode::Char('q') => return Ok(false),
                _ => {}
            },
        }
        Ok(true)
    }

    fn draw(&self, f: &mut ratatui::Frame) {
        let api_key = self.config.graph_api_key.as_deref();
        let renderer = &self.renderer;
        match self.state {
            AppState::Menu => ui::draw_menu(
                f,
                self.store.problems(),
                self.selected_index,
                self.status.as_deref(),
                renderer,
            ),
            AppState::Preview => {
                if let Some(problem) = self.store.problems().get(self.selected_index) {
                    ui::draw_preview(
                        f,
                        problem,
                        (self.selected_index, self.store.len()),
                        api_key,
                        renderer,
                    );
                }
            }
            AppState::DeleteConfirm => {
                if let Some(problem) = self.store.problems().get(self.selected_index) {
                    ui::draw_delete_confirmation(f, problem, renderer);
                }
            }
            AppState::Create => ui::draw_editor(f, &self.draft, api_key, renderer),
            AppState::Quiz => {
                if let Some(runner) = &self.runner {
                    ui::draw_quiz(f, runner, api_key, renderer);
                }
            }
            AppState::QuizQuitConfirm => ui::draw_quit_confirmation(f),
            AppState::Summary => {
                if let Some(runner) = &self.runner {
                    ui::draw_summary(f, runner, renderer);
                }
            }
        }
    }
}

fn open_store(config: &Config) -> math_quiz_builder::Result<ProblemStore> {
    let conn = db::open(&config.store)?;
    ProblemStore::open(Box::new(SqliteStorage::new(conn)))
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.draw(f))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_key(key) {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => {
                    logger::error(&format!("{}", e));
                    app.status = Some(format!("Error: {}", e));
                    app.state = AppState::Menu;
                }
            }
        }
    }
}

fn main() -> io::Result<()> {
    let config = Config::from_env();
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    logger::init(&config.log_path);
    logger::log("Starting math-quiz-builder");

    let store = open_store(&config).map_err(|e| io::Error::other(e.to_string()))?;
    let mut app = App::new(config, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    logger::log("Exiting");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_quiz_builder::config::StoreLocation;
    use math_quiz_builder::models::{AnswerKind, BlankProblem, Problem};
    use ratatui::backend::TestBackend;

    fn config() -> Config {
        Config {
            store: StoreLocation::Memory,
            log_path: std::env::temp_dir().join("math-quiz-test.log"),
            shuffle: false,
            graph_api_key: None,
        }
    }

    fn blank(question: &str, answer: &str) -> Problem {
        Problem::FillBlank(BlankProblem {
            id: String::new(),
            question: question.into(),
            answer: answer.into(),
            answer_kind: Some(AnswerKind::Text),
            answer_graph: None,
            graph: None,
        })
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn app_with(problems: &[(&str, &str)]) -> App {
        let config = config();
        let mut store = open_store(&config).unwrap();
        for (q, a) in problems {
            store.add(blank(q, a)).unwrap();
        }
        App::new(config, store)
    }

    #[test]
    fn test_quiz_round_trip() {
        let mut app = app_with(&[("1+1", "2"), ("2+2", "4")]);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.state, AppState::Quiz);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Summary);
        let score = app.runner.as_ref().unwrap().score();
        assert_eq!((score.correct, score.total), (1, 2));
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.state, AppState::Menu);
    }

    #[test]
    fn test_empty_store_does_not_start_quiz() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.state, AppState::Menu);
        assert!(app.status.is_some());
    }

    #[test]
    fn test_delete_with_confirmation() {
        let mut app = app_with(&[("a", "1"), ("b", "2"), ("c", "3")]);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::DeleteConfirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.len(), 3);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        let questions: Vec<&str> = app.store.problems().iter().map(|p| p.question()).collect();
        assert_eq!(questions, vec!["a", "c"]);
    }

    #[test]
    fn test_quit_confirmation_returns_to_menu() {
        let mut app = app_with(&[("a", "1")]);
        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::QuizQuitConfirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.state, AppState::Quiz);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.state, AppState::Menu);
        assert!(app.runner.is_none());
    }

    #[test]
    fn test_ctrl_c_exits() {
        let mut app = app_with(&[]);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!app.handle_key(ctrl_c).unwrap());
    }

    #[test]
    fn test_every_screen_draws() {
        let mut app = app_with(&[("Area of $\\pi r^2$", "x")]);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let states = [
            AppState::Menu,
            AppState::Preview,
            AppState::DeleteConfirm,
            AppState::Create,
        ];
        for state in states {
            app.state = state;
            terminal.draw(|f| app.draw(f)).unwrap();
        }
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('t'));
        terminal.draw(|f| app.draw(f)).unwrap();
        press(&mut app, KeyCode::Esc);
        terminal.draw(|f| app.draw(f)).unwrap();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Summary);
        terminal.draw(|f| app.draw(f)).unwrap();
    }
}
