use std::sync::Arc;
use std::time::Instant;

use ratatui::layout::Rect;
use tracing::{debug, warn};

use tui_geoquiz::config::{Config, HOVER_THROTTLE, RECENTER_THROTTLE};
use tui_geoquiz::data::{Dataset, GeoDataProvider};
use tui_geoquiz::map::{hover_target, resolve_click, LayerState, MapRenderer, Viewport, WorldBuffer};
use tui_geoquiz::quiz::{Phase, QuestionKind, QuizEngine};
use tui_geoquiz::stats::{StatsStore, StoredStats};
use tui_geoquiz::telemetry::{TelemetryEvent, TelemetrySink};
use tui_geoquiz::throttle::Throttle;

use crate::ui;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    Game,
    Results,
}

/// Application state
pub struct App {
    pub config: Config,
    pub engine: QuizEngine,
    pub viewport: Viewport,
    pub buffer: Option<WorldBuffer>,
    dataset: Option<Arc<Dataset>>,
    pub map_renderer: MapRenderer,
    pub layers: LayerState,
    pub screen: Screen,
    pub should_quit: bool,
    /// Inner map area in terminal cells
    pub map_area: Rect,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Set once the button moved while down, so release is not a click
    dragged: bool,
    pub last_kind: Option<QuestionKind>,
    /// Error shown on the home screen
    pub message: Option<String>,
    /// Stats from the store, for the home and results screens
    pub stored_stats: StoredStats,
    telemetry: Arc<dyn TelemetrySink>,
    hover_throttle: Throttle,
    recenter_throttle: Throttle,
}

impl App {
    pub fn new(
        config: Config,
        provider: Arc<dyn GeoDataProvider>,
        telemetry: Arc<dyn TelemetrySink>,
        stats: Arc<dyn StatsStore>,
        width: u16,
        height: u16,
    ) -> Self {
        let engine = match config.seed {
            Some(seed) => QuizEngine::seeded(
                Arc::clone(&provider),
                Arc::clone(&telemetry),
                Arc::clone(&stats),
                config.quiz(),
                seed,
            ),
            None => QuizEngine::new(
                Arc::clone(&provider),
                Arc::clone(&telemetry),
                Arc::clone(&stats),
                config.quiz(),
            ),
        };

        // The map is shown on every screen, so load outlines up front
        let (dataset, message) = match provider.initialize() {
            Ok(dataset) => (Some(dataset), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let buffer = dataset
            .as_ref()
            .map(|d| WorldBuffer::new(d.features(), config.buffer()));
        let stored_stats = stats.read().unwrap_or_else(|e| {
            warn!(error = %e, "could not read stats");
            StoredStats::default()
        });

        let map_area = ui::map_inner(Rect::new(0, 0, width, height));
        Self {
            viewport: Viewport::world(map_area.width as usize * 2, map_area.height as usize * 4),
            engine,
            buffer,
            dataset,
            map_renderer: MapRenderer::new(),
            layers: LayerState::new(),
            screen: Screen::Home,
            should_quit: false,
            map_area,
            last_mouse: None,
            mouse_pos: None,
            dragged: false,
            last_kind: config.kind,
            message,
            stored_stats,
            telemetry,
            hover_throttle: Throttle::new(HOVER_THROTTLE),
            recenter_throttle: Throttle::new(RECENTER_THROTTLE),
            config,
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.map_area = ui::map_inner(Rect::new(0, 0, width, height));
        self.viewport.width = self.map_area.width as usize * 2;
        self.viewport.height = self.map_area.height as usize * 4;
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.engine.dataset().or(self.dataset.as_ref())
    }

    pub fn start_game(&mut self, kind: QuestionKind, now: Instant) {
        self.last_kind = Some(kind);
        match self.engine.start(kind, self.config.question_count(), now) {
            Ok(()) => {
                self.message = None;
                self.layers.clear_feedback();
                if self.buffer.is_none() {
                    if let Some(dataset) = self.engine.dataset() {
                        self.buffer = Some(WorldBuffer::new(dataset.features(), self.config.buffer()));
                        self.dataset = Some(Arc::clone(dataset));
                    }
                }
                self.screen = Screen::Game;
            }
            Err(e) => {
                self.message = Some(format!("{e}. Pick a quiz to retry."));
                self.screen = Screen::Home;
            }
        }
    }

    pub fn restart(&mut self, now: Instant) {
        if let Some(kind) = self.last_kind {
            self.start_game(kind, now);
        }
    }

    /// Leave the game for the home screen
    pub fn abandon(&mut self) {
        self.engine.abandon();
        self.engine.reset();
        self.layers.clear_feedback();
        self.screen = Screen::Home;
    }

    /// Answer with option `n` (1-based)
    pub fn choose_option(&mut self, n: usize, now: Instant) {
        if self.screen != Screen::Game {
            return;
        }
        let session = self.engine.session();
        let Some(question) = session.current_question() else {
            return;
        };
        if !question.kind.has_options() {
            return;
        }
        let Some(option) = n.checked_sub(1).and_then(|i| question.options.get(i)).cloned() else {
            return;
        };
        let spent = session.time_spent();
        self.engine.submit_answer(Some(option), spent, now);
        self.sync_feedback();
    }

    /// Per-frame work: quiz timers, trailing throttled pointer work, and
    /// screen transitions that follow the session phase
    pub fn update(&mut self, now: Instant) {
        self.engine.advance(now);
        self.sync_feedback();

        if self.hover_throttle.poll(now) {
            self.update_hover();
        }
        if self.recenter_throttle.poll(now) {
            self.recenter();
        }

        match (self.screen, self.engine.phase()) {
            (Screen::Game, Phase::Complete) => {
                if let Some(stored) = self.engine.stored_stats() {
                    self.stored_stats = stored.clone();
                }
                self.screen = Screen::Results;
            }
            (Screen::Game, Phase::Abandoned | Phase::Idle) => self.screen = Screen::Home,
            _ => {}
        }
    }

    /// Validation layers mirror the session's feedback; hover is held off
    /// for every kind while feedback is pending
    fn sync_feedback(&mut self) {
        let session = self.engine.session();
        match session.feedback() {
            Some(feedback) if feedback_marks_map(session.kind()) => self.layers.show_feedback(feedback),
            _ => self.layers.clear_feedback(),
        }
        self.layers
            .set_feedback_pending(session.phase() == Phase::FeedbackPending);
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32, now: Instant) {
        self.viewport.pan(dx, dy);
        self.center_moved(now);
    }

    /// Any change of the view center must eventually reach the buffer
    fn center_moved(&mut self, now: Instant) {
        if self.recenter_throttle.request(now) {
            self.recenter();
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Braille pixel under a terminal cell, or `None` outside the map
    pub fn cell_to_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area;
        if col < area.x || row < area.y || col >= area.x + area.width || row >= area.y + area.height {
            return None;
        }
        let px = (col - area.x) as i32 * 2 + 1;
        let py = (row - area.y) as i32 * 4 + 2;
        Some((px, py))
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16, now: Instant) {
        if let Some((px, py)) = self.cell_to_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
            self.center_moved(now);
        }
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16, now: Instant) {
        if let Some((px, py)) = self.cell_to_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
            self.center_moved(now);
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    pub fn handle_drag(&mut self, col: u16, row: u16, now: Instant) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - col as i32) * 2;
            let dy = (last_y as i32 - row as i32) * 4;
            if dx != 0 || dy != 0 {
                self.dragged = true;
                self.pan(dx, dy, now);
            }
        }
        self.last_mouse = Some((col, row));
    }

    /// Button released: a press without movement is a click
    pub fn release(&mut self, col: u16, row: u16, now: Instant) {
        let was_click = self.last_mouse.is_some() && !self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        if was_click {
            self.click(col, row, now);
        }
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16, now: Instant) {
        self.mouse_pos = Some((col, row));
        if self.hover_throttle.request(now) {
            self.update_hover();
        }
    }

    fn pointer_geo(&self, col: u16, row: u16) -> Option<(f64, f64)> {
        let (px, py) = self.cell_to_pixel(col, row)?;
        let p = self.viewport.unproject_f(px as f64, py as f64);
        Some((p.x, p.y))
    }

    fn update_hover(&mut self) {
        let target = match (&self.buffer, self.mouse_pos) {
            (Some(buffer), Some((col, row))) => self
                .pointer_geo(col, row)
                .and_then(|(lon, lat)| hover_target(buffer, lon, lat)),
            _ => None,
        };
        if self.layers.set_hover(target) {
            debug!(hover = ?self.layers.hovered(), "hover changed");
        }
    }

    fn recenter(&mut self) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.maybe_recenter(self.viewport.center_lon);
        }
    }

    /// Map click: answers location questions
    fn click(&mut self, col: u16, row: u16, now: Instant) {
        if self.screen != Screen::Game {
            return;
        }
        let session = self.engine.session();
        if session.phase() != Phase::Active || session.kind() != Some(QuestionKind::Location) {
            return;
        }
        let (Some(buffer), Some(dataset), Some((lon, lat))) =
            (&self.buffer, self.engine.dataset(), self.pointer_geo(col, row))
        else {
            return;
        };

        let hit = resolve_click(buffer, dataset, lon, lat);
        self.telemetry.record(TelemetryEvent::MapClick {
            country_id: hit.map(|h| h.country.id.clone()),
            lon,
            lat,
            direct_hit: hit.is_some_and(|h| h.direct),
        });
        let Some(hit) = hit else {
            return;
        };
        let answer = hit.country.id.clone();
        let spent = session.time_spent();
        self.engine.submit_answer(Some(answer), spent, now);
        self.sync_feedback();
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        let lon = self.viewport.wrapped_center_lon();
        let lat = self.viewport.center_lat;
        format!(
            "{:.1}°{}, {:.1}°{}",
            lat.abs(),
            if lat >= 0.0 { "N" } else { "S" },
            lon.abs(),
            if lon >= 0.0 { "E" } else { "W" }
        )
    }
}

fn feedback_marks_map(kind: Option<QuestionKind>) -> bool {
    kind.is_some_and(QuestionKind::marks_map)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use tui_geoquiz::data::StaticProvider;
    use tui_geoquiz::geo::world_offset;
    use tui_geoquiz::map::Fill;
    use tui_geoquiz::stats::MemoryStatsStore;
    use tui_geoquiz::telemetry::MemorySink;

    use super::*;

    fn app(questions: &str) -> (App, Arc<MemorySink>, Arc<MemoryStatsStore>) {
        let config = Config::try_parse_from(["tui-geoquiz", "--questions", questions, "--seed", "7"]).unwrap();
        let sink = Arc::new(MemorySink::new());
        let store = Arc::new(MemoryStatsStore::new());
        let app = App::new(
            config,
            Arc::new(StaticProvider::builtin()),
            sink.clone(),
            store.clone(),
            100,
            40,
        );
        (app, sink, store)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn current_answer(app: &App) -> String {
        app.engine.session().current_question().unwrap().answer.clone()
    }

    /// Close-up on a country; returns the terminal cell at the map center
    fn look_at(app: &mut App, id: &str) -> (u16, u16) {
        let c = app.dataset().unwrap().country_by_id(id).unwrap().centroid.unwrap();
        app.viewport.center_lon = c.lon;
        app.viewport.center_lat = c.lat;
        app.viewport.zoom = 40.0;
        let area = app.map_area;
        (area.x + area.width / 2, area.y + area.height / 2)
    }

    fn option_number(app: &App) -> usize {
        let question = app.engine.session().current_question().unwrap();
        question.options.iter().position(|o| *o == question.answer).unwrap() + 1
    }

    #[test]
    fn test_click_answers_location_question() {
        let (mut app, sink, _) = app("3");
        let t0 = Instant::now();
        app.start_game(QuestionKind::Location, t0);
        assert_eq!(app.screen, Screen::Game);

        let target = current_answer(&app);
        let (col, row) = look_at(&mut app, &target);
        app.press(col, row);
        app.release(col, row, t0 + ms(2000));

        assert_eq!(app.engine.phase(), Phase::FeedbackPending);
        assert_eq!(sink.count("map_click"), 1);
        assert_eq!(app.layers.validation_fill(&target), Fill::Correct);
        assert!(app.engine.session().feedback().unwrap().is_correct);

        app.update(t0 + ms(2750));
        assert_eq!(app.engine.phase(), Phase::Active);
        assert_eq!(app.layers.validation_fill(&target), Fill::Transparent);
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let (mut app, sink, _) = app("3");
        let t0 = Instant::now();
        app.start_game(QuestionKind::Location, t0);
        let target = current_answer(&app);
        let (col, row) = look_at(&mut app, &target);
        let lon = app.viewport.center_lon;

        app.press(col, row);
        app.handle_drag(col + 3, row, t0 + ms(10));
        app.release(col + 3, row, t0 + ms(20));

        assert!(app.viewport.center_lon < lon);
        assert_eq!(app.engine.phase(), Phase::Active);
        assert_eq!(sink.count("map_click"), 0);
    }

    #[test]
    fn test_click_ignored_for_multiple_choice() {
        let (mut app, sink, _) = app("3");
        let t0 = Instant::now();
        app.start_game(QuestionKind::Capital, t0);
        let id = app.engine.session().current_question().unwrap().country.id.clone();
        let (col, row) = look_at(&mut app, &id);
        app.press(col, row);
        app.release(col, row, t0 + ms(500));

        assert_eq!(app.engine.phase(), Phase::Active);
        assert_eq!(sink.count("map_click"), 0);
    }

    #[test]
    fn test_hover_held_off_during_capital_feedback() {
        let (mut app, _, _) = app("3");
        let t0 = Instant::now();
        app.start_game(QuestionKind::Capital, t0);
        let id = app.engine.session().current_question().unwrap().country.id.clone();
        app.layers.set_hover(Some(&id));
        assert_eq!(app.layers.hover_fill(&id), Fill::Highlight);

        let n = option_number(&app);
        app.choose_option(n, t0 + ms(1000));
        assert_eq!(app.engine.phase(), Phase::FeedbackPending);
        // Capital feedback paints nothing, yet hover still stays off
        assert_eq!(app.layers.validation_fill(&id), Fill::Transparent);
        assert_eq!(app.layers.hover_fill(&id), Fill::Transparent);

        app.update(t0 + ms(1750));
        assert_eq!(app.engine.phase(), Phase::Active);
        assert_eq!(app.layers.hover_fill(&id), Fill::Highlight);
    }

    #[test]
    fn test_hover_throttle_applies_last_position() {
        let (mut app, _, _) = app("3");
        let t0 = Instant::now();
        let (col, row) = look_at(&mut app, "FRA");

        // Outside the map: nothing to hover, and the throttle window opens
        app.set_mouse_pos(0, 0, t0);
        assert_eq!(app.layers.hovered(), None);

        app.set_mouse_pos(col, row, t0 + ms(20));
        assert_eq!(app.layers.hovered(), None);
        app.update(t0 + ms(60));
        assert_eq!(app.layers.hovered(), None);
        app.update(t0 + ms(150));
        assert_eq!(app.layers.hovered(), Some("FRA"));
    }

    #[test]
    fn test_edge_zooming_recenters_buffer() {
        let (mut app, _, _) = app("3");
        let area = app.map_area;
        let (left, right) = (area.x, area.x + area.width - 1);
        let row = area.y + area.height / 2;

        // Zooming in at one edge and out at the other walks the view east
        let mut now = Instant::now();
        for _ in 0..6 {
            now += Duration::from_secs(1);
            app.zoom_in_at(right, row, now);
            app.zoom_out_at(left, row, now);
            app.update(now);
        }
        app.update(now + Duration::from_secs(1));

        let lon = app.viewport.center_lon;
        let buffer = app.buffer.as_ref().unwrap();
        assert!(lon > 360.0, "center {lon}");
        assert_eq!(buffer.center_offset(), world_offset(lon));
        assert!((lon - buffer.center_offset()).abs() <= 180.0);
    }

    #[test]
    fn test_completed_game_shows_results() {
        let (mut app, sink, store) = app("1");
        let t0 = Instant::now();
        app.start_game(QuestionKind::Population, t0);

        let n = option_number(&app);
        app.choose_option(n, t0 + ms(1000));
        app.update(t0 + ms(1500));
        assert_eq!(app.screen, Screen::Game);

        app.update(t0 + ms(1750));
        assert_eq!(app.screen, Screen::Results);
        assert_eq!(app.stored_stats.total_games, 1);
        assert_eq!(store.saved().len(), 1);
        assert_eq!(sink.count("game_completed"), 1);

        app.restart(t0 + ms(5000));
        assert_eq!(app.screen, Screen::Game);
        assert_eq!(app.engine.session().kind(), Some(QuestionKind::Population));
    }

    #[test]
    fn test_abandon_returns_home() {
        let (mut app, sink, _) = app("3");
        let t0 = Instant::now();
        app.start_game(QuestionKind::Flag, t0);
        let n = option_number(&app);
        app.choose_option(n, t0 + ms(500));
        assert!(app.layers.feedback_active());

        app.abandon();
        assert_eq!(app.screen, Screen::Home);
        assert_eq!(app.engine.phase(), Phase::Idle);
        assert!(!app.layers.feedback_active());
        assert_eq!(sink.count("game_abandoned"), 1);

        // A stale resolve timer must not pull the app back into a game
        app.update(t0 + ms(2000));
        assert_eq!(app.screen, Screen::Home);
    }
}
