//! Civic Desktop: egui app state and UI.

use eframe::egui;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, OnceLock};

use civic::gateway::{AnalysisError, ChatContinuation, CivicGateway, SearchError};
use civic::llm::GeminiClient;
use civic::model::{
    Author, Bill, BillAnalysis, ChatMessage, MediaKind, UserVote, LANGUAGES,
};
use civic::selection::{AnalysisState, AnalysisTicket};
use civic::session::{
    BrowserSession, ChatTicket, DetailTab, ListState, OverviewTab, SearchTicket,
};
use civic::view::{self, SortKey, YearFilter};

use crate::speech::Speech;

const LOG_BUFFER_MAX_LINES: usize = 2000;
const BILL_LIST_WIDTH: f32 = 380.0;
const DISCUSSION_HEIGHT: f32 = 360.0;

/// Ring buffer of log lines for the Logs screen. Written by DesktopLogger.
static LOG_LINES: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();

fn log_buffer() -> &'static Mutex<VecDeque<String>> {
    LOG_LINES.get_or_init(|| Mutex::new(VecDeque::new()))
}

fn push_log_line(line: String) {
    if let Ok(mut buf) = log_buffer().lock() {
        buf.push_back(line);
        while buf.len() > LOG_BUFFER_MAX_LINES {
            buf.pop_front();
        }
    }
}

/// Logger that appends to LOG_LINES for display in the Logs screen.
struct DesktopLogger;

impl log::Log for DesktopLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let line = format!(
            "{} [{}] {}",
            clock_time(),
            record.level(),
            record.args()
        );
        push_log_line(line);
    }

    fn flush(&self) {}
}

/// UTC wall-clock time as HH:MM:SS.mmm.
fn clock_time() -> String {
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = t.as_secs();
    let millis = t.subsec_millis();
    let h = (secs / 3600) % 24;
    let m = (secs / 60) % 60;
    let s = secs % 60;
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, millis)
}

static LOGGER: DesktopLogger = DesktopLogger;

type Gateway = CivicGateway<GeminiClient>;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
enum Screen {
    #[default]
    Browse,
    Logs,
}

/// A finished background request, carried back to the UI thread with its ticket.
enum Completion {
    Search(SearchTicket, Result<Vec<Bill>, SearchError>),
    Analysis(AnalysisTicket, Result<BillAnalysis, AnalysisError>),
    Chat(ChatTicket, ChatContinuation),
}

/// User intent collected while drawing a frame and applied afterwards.
enum Action {
    Search,
    Select(String),
    Year(YearFilter),
    Sort(SortKey),
    Tab(DetailTab),
    OverviewTab(OverviewTab),
    Vote(UserVote),
    SendChat,
    Listen { key: String, text: String },
    StopListening,
    Language(String),
    FlipCard(usize),
}

/// Input text and purely visual state that the session does not own.
#[derive(Default)]
struct Inputs {
    search: String,
    chat: String,
    /// Flipped flashcards, by index, for `flipped_for`.
    flipped: HashSet<usize>,
    flipped_for: Option<String>,
}

pub struct CivicApp {
    /// None when no API key resolved; the reason is in `startup_error`.
    gateway: Option<Arc<Gateway>>,
    startup_error: Option<String>,
    session: BrowserSession,
    inputs: Inputs,
    speech: Speech,
    years: Vec<YearFilter>,
    completions_tx: mpsc::Sender<Completion>,
    completions_rx: mpsc::Receiver<Completion>,
    current_screen: Screen,
}

/// Load config and build the gateway.
fn connect() -> anyhow::Result<(Arc<Gateway>, String)> {
    let (config, path) = civic::config::load_config(None)?;
    log::debug!("using config {}", path.display());
    let client = GeminiClient::from_config(&config)?;
    log::info!("generation model: {}", client.model());
    let language = civic::config::resolve_language(&config).to_string();
    Ok((Arc::new(CivicGateway::new(client)), language))
}

impl CivicApp {
    /// Space between the main screen title and the content below.
    const SCREEN_TITLE_BOTTOM_SPACING: f32 = 18.0;
    /// Space between the bottom of the content and the window edge.
    const SCREEN_FOOTER_SPACING: f32 = 48.0;

    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let _ = LOG_LINES.get_or_init(|| Mutex::new(VecDeque::new()));
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);
        log::info!("desktop started");

        let (gateway, startup_error, language) = match connect() {
            Ok((gateway, language)) => (Some(gateway), None, language),
            Err(e) => {
                log::error!("cannot start generation client: {:#}", e);
                (None, Some(format!("{:#}", e)), civic::model::DEFAULT_LANGUAGE.to_string())
            }
        };
        let (completions_tx, completions_rx) = mpsc::channel();
        Self {
            gateway,
            startup_error,
            session: BrowserSession::new(language),
            inputs: Inputs::default(),
            speech: Speech::default(),
            years: view::year_options(view::current_year()),
            completions_tx,
            completions_rx,
            current_screen: Screen::default(),
        }
    }

    /// Run one gateway call on a worker thread with its own runtime; the result comes back
    /// through the completion channel.
    fn run_in_background<F, Fut>(&self, ctx: &egui::Context, job: F)
    where
        F: FnOnce(Arc<Gateway>) -> Fut + Send + 'static,
        Fut: Future<Output = Completion>,
    {
        let Some(gateway) = self.gateway.clone() else {
            log::error!("no generation client; request skipped");
            return;
        };
        let tx = self.completions_tx.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("failed to start runtime: {}", e);
                    return;
                }
            };
            let completion = rt.block_on(job(gateway));
            let _ = tx.send(completion);
            ctx.request_repaint();
        });
    }

    fn spawn_search(&self, ctx: &egui::Context, ticket: SearchTicket) {
        self.run_in_background(ctx, move |gateway| async move {
            let result = gateway.search_bills(&ticket.query).await;
            Completion::Search(ticket, result)
        });
    }

    fn spawn_analysis(&self, ctx: &egui::Context, ticket: Option<AnalysisTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        let language = self.session.language().to_string();
        self.run_in_background(ctx, move |gateway| async move {
            let result = gateway.analyze_bill(&ticket.title, &language).await;
            Completion::Analysis(ticket, result)
        });
    }

    fn spawn_chat(&self, ctx: &egui::Context, ticket: ChatTicket) {
        self.run_in_background(ctx, move |gateway| async move {
            let outcome = gateway.continue_chat(&ticket.thread, &ticket.bill_title).await;
            Completion::Chat(ticket, outcome)
        });
    }

    /// Apply finished requests. Call each frame.
    fn poll_completions(&mut self, ctx: &egui::Context) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            match completion {
                Completion::Search(ticket, result) => {
                    let next = self.session.complete_search(&ticket, result);
                    self.spawn_analysis(ctx, next);
                }
                Completion::Analysis(ticket, result) => {
                    self.session.complete_analysis(&ticket, result);
                }
                Completion::Chat(ticket, outcome) => {
                    if outcome.is_degraded() {
                        log::warn!("discussion turn degraded");
                    }
                    self.session.complete_chat(&ticket, outcome);
                }
            }
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::Search => {
                if let Some(ticket) = self.session.begin_search(&self.inputs.search) {
                    self.speech.stop();
                    self.spawn_search(ctx, ticket);
                }
            }
            Action::Select(id) => {
                let ticket = self.session.select_bill(&id);
                self.spawn_analysis(ctx, ticket);
            }
            Action::Year(year) => {
                let ticket = self.session.set_year_filter(year);
                self.spawn_analysis(ctx, ticket);
            }
            Action::Sort(sort) => {
                let ticket = self.session.set_sort(sort);
                self.spawn_analysis(ctx, ticket);
            }
            Action::Tab(tab) => self.session.set_tab(tab),
            Action::OverviewTab(tab) => self.session.set_overview_tab(tab),
            Action::Vote(vote) => self.session.cast_vote(vote),
            Action::SendChat => {
                if let Some(ticket) = self.session.begin_chat(&self.inputs.chat) {
                    self.inputs.chat.clear();
                    self.spawn_chat(ctx, ticket);
                }
            }
            Action::Listen { key, text } => {
                if let Err(e) = self.speech.speak(key, &text) {
                    log::error!("speech: {:#}", e);
                }
            }
            Action::StopListening => self.speech.stop(),
            Action::Language(language) => {
                log::info!("analysis language set to {}", language);
                let ticket = self.session.set_language(language);
                self.spawn_analysis(ctx, ticket);
            }
            Action::FlipCard(index) => {
                if !self.inputs.flipped.remove(&index) {
                    self.inputs.flipped.insert(index);
                }
            }
        }
    }

    /// Flashcard flips belong to one bill; forget them when the selection moves.
    fn sync_view_state(&mut self) {
        let current = self.session.selection().selected_id().map(str::to_string);
        if self.inputs.flipped_for != current {
            self.inputs.flipped.clear();
            self.inputs.flipped_for = current;
            self.speech.stop();
        }
    }

    fn ui_search_bar(ui: &mut egui::Ui, session: &BrowserSession, inputs: &mut Inputs, enabled: bool, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            let searching = session.is_searching();
            let edit = ui.add_enabled(
                enabled,
                egui::TextEdit::singleline(&mut inputs.search)
                    .hint_text("Search bills, e.g. environment")
                    .desired_width(ui.available_width() - 80.0),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let label = if searching { "Searching..." } else { "Search" };
            let clicked = ui
                .add_enabled(enabled && !searching && !inputs.search.trim().is_empty(), egui::Button::new(label))
                .clicked();
            if (clicked || submitted) && !searching {
                actions.push(Action::Search);
            }
        });
    }

    fn ui_controls(ui: &mut egui::Ui, session: &BrowserSession, years: &[YearFilter], actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            let mut sort = session.sort();
            egui::ComboBox::from_id_source("sort")
                .selected_text(sort.label())
                .show_ui(ui, |ui| {
                    for key in SortKey::ALL {
                        ui.selectable_value(&mut sort, key, key.label());
                    }
                });
            if sort != session.sort() {
                actions.push(Action::Sort(sort));
            }

            let mut year = session.year();
            let year_text = match year {
                YearFilter::All => "All years".to_string(),
                YearFilter::Year(y) => y.to_string(),
            };
            egui::ComboBox::from_id_source("year")
                .selected_text(year_text)
                .show_ui(ui, |ui| {
                    for option in years {
                        let text = match option {
                            YearFilter::All => "All years".to_string(),
                            YearFilter::Year(y) => y.to_string(),
                        };
                        ui.selectable_value(&mut year, *option, text);
                    }
                });
            if year != session.year() {
                actions.push(Action::Year(year));
            }
        });
    }

    fn ui_bill_list(ui: &mut egui::Ui, session: &BrowserSession, actions: &mut Vec<Action>) {
        match session.list_state() {
            ListState::NotSearched => {
                ui.label("Search for a topic to find recent bills and policies.");
            }
            ListState::Searching => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Searching the web for bills...");
                });
            }
            ListState::SearchFailed(message) => {
                ui.colored_label(ui.visuals().error_fg_color, message);
            }
            ListState::NoResults => {
                ui.label("No bills yet. Try searching for a different topic.");
            }
            ListState::FilteredOut => {
                ui.label("No bills match the selected year.");
            }
            ListState::Bills(list) => {
                let selected = session.selection().selected_id();
                egui::ScrollArea::vertical()
                    .id_source("bill_list")
                    .show(ui, |ui| {
                        for bill in list {
                            let is_selected = selected == Some(bill.id.as_str());
                            if Self::ui_bill_card(ui, bill, is_selected) {
                                actions.push(Action::Select(bill.id.clone()));
                            }
                            ui.add_space(8.0);
                        }
                    });
            }
        }
    }

    /// Returns true when the card was clicked.
    fn ui_bill_card(ui: &mut egui::Ui, bill: &Bill, selected: bool) -> bool {
        let visuals = ui.visuals().clone();
        let frame = egui::Frame::none()
            .fill(if selected {
                visuals.selection.bg_fill
            } else {
                visuals.panel_fill
            })
            .stroke(egui::Stroke::new(1.0, visuals.widgets.noninteractive.bg_stroke.color))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(8.0));
        let response = frame
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(egui::RichText::new(&bill.title).strong());
                ui.label(
                    egui::RichText::new(format!("{} · {} · {}", bill.status, bill.category, bill.date)).small(),
                );
                ui.add(egui::Label::new(&bill.summary).wrap(true));
                ui.label(
                    egui::RichText::new(format!(
                        "For {} · Against {}",
                        bill.vote_count.for_votes, bill.vote_count.against
                    ))
                    .small(),
                );
            })
            .response
            .interact(egui::Sense::click());
        response.clicked()
    }

    fn ui_detail(
        ui: &mut egui::Ui,
        session: &BrowserSession,
        inputs: &mut Inputs,
        playing: Option<&str>,
        actions: &mut Vec<Action>,
    ) {
        let (Some(bill), Some(detail)) = (session.selected_bill(), session.detail()) else {
            ui.label("Select a bill to see its analysis.");
            return;
        };

        ui.heading(&bill.title);
        ui.label(format!("{} · {} · {}", bill.status, bill.category, bill.date));
        ui.add(egui::Label::new(&bill.summary).wrap(true));
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let vote = detail.vote();
            let tally = bill.vote_count;
            let options = [
                (UserVote::For, format!("For ({})", tally.for_votes)),
                (UserVote::Against, format!("Against ({})", tally.against)),
                (UserVote::Abstain, "Abstain".to_string()),
            ];
            for (choice, text) in options {
                if ui.selectable_label(vote == choice, text).clicked() {
                    actions.push(Action::Vote(choice));
                }
            }
        });
        ui.add_space(8.0);
        ui.separator();

        let analysis = match session.selection().state() {
            AnalysisState::Idle => return,
            AnalysisState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Analyzing bill...");
                });
                return;
            }
            AnalysisState::Failed(message) => {
                ui.colored_label(ui.visuals().error_fg_color, message);
                return;
            }
            AnalysisState::Ready(analysis) => analysis,
        };

        ui.horizontal(|ui| {
            for tab in DetailTab::ALL {
                if ui.selectable_label(detail.tab == tab, tab.label()).clicked() {
                    actions.push(Action::Tab(tab));
                }
            }
        });
        ui.add_space(8.0);

        match detail.tab {
            DetailTab::Overview => Self::ui_overview(ui, analysis, detail.overview_tab, inputs, actions),
            DetailTab::Viewpoints => Self::ui_viewpoints(ui, analysis),
            DetailTab::Impact => Self::ui_impact(ui, analysis),
            DetailTab::Debates => Self::ui_debates(ui, analysis),
            DetailTab::Media => Self::ui_media(ui, analysis, playing, actions),
            DetailTab::Discussion => {
                Self::ui_discussion(ui, detail.chat().messages(), detail.chat().in_flight(), inputs, actions)
            }
        }
    }

    fn ui_overview(
        ui: &mut egui::Ui,
        analysis: &BillAnalysis,
        current: OverviewTab,
        inputs: &Inputs,
        actions: &mut Vec<Action>,
    ) {
        ui.horizontal(|ui| {
            for tab in OverviewTab::ALL {
                if ui.selectable_label(current == tab, tab.label()).clicked() {
                    actions.push(Action::OverviewTab(tab));
                }
            }
        });
        ui.add_space(8.0);
        match current {
            OverviewTab::Explanation => {
                ui.add(egui::Label::new(&analysis.explanation).wrap(true));
            }
            OverviewTab::MindMap => {
                let map = &analysis.mind_map;
                ui.label(egui::RichText::new(&map.central_topic).heading());
                for (i, branch) in map.branches.iter().enumerate() {
                    egui::CollapsingHeader::new(&branch.title)
                        .id_source(("mind_map_branch", i))
                        .default_open(true)
                        .show(ui, |ui| {
                            for child in &branch.children {
                                ui.label(format!("• {}", child));
                            }
                        });
                }
            }
            OverviewTab::Flashcards => {
                if analysis.flashcards.is_empty() {
                    ui.label("No flashcards for this bill.");
                }
                for (i, card) in analysis.flashcards.iter().enumerate() {
                    let flipped = inputs.flipped.contains(&i);
                    let (caption, text) = if flipped {
                        ("Answer", &card.answer)
                    } else {
                        ("Question", &card.question)
                    };
                    let response = egui::Frame::none()
                        .fill(ui.visuals().extreme_bg_color)
                        .rounding(egui::Rounding::same(8.0))
                        .inner_margin(egui::Margin::same(12.0))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.label(egui::RichText::new(caption).small());
                            ui.add(egui::Label::new(text.as_str()).wrap(true));
                        })
                        .response
                        .interact(egui::Sense::click())
                        .on_hover_text("Click to flip");
                    if response.clicked() {
                        actions.push(Action::FlipCard(i));
                    }
                    ui.add_space(8.0);
                }
            }
        }
    }

    fn ui_viewpoints(ui: &mut egui::Ui, analysis: &BillAnalysis) {
        let v = &analysis.viewpoints;
        for (title, text) in [("For", &v.pro), ("Against", &v.con), ("Neutral", &v.neutral)] {
            ui.label(egui::RichText::new(title).strong());
            ui.add(egui::Label::new(text.as_str()).wrap(true));
            ui.add_space(12.0);
        }
    }

    /// Horizontal bar centred on zero for a score in [-100, 100].
    fn impact_bar(ui: &mut egui::Ui, value: f64) {
        let width = ui.available_width().min(360.0);
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 12.0), egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 3.0, ui.visuals().extreme_bg_color);
        let mid = rect.center().x;
        let len = (value.clamp(-100.0, 100.0) / 100.0) as f32 * rect.width() / 2.0;
        let (left, right) = if len >= 0.0 { (mid, mid + len) } else { (mid + len, mid) };
        let bar = egui::Rect::from_min_max(egui::pos2(left, rect.top()), egui::pos2(right, rect.bottom()));
        let color = if value >= 0.0 {
            egui::Color32::from_rgb(46, 160, 67)
        } else {
            egui::Color32::from_rgb(218, 54, 51)
        };
        painter.rect_filled(bar, 3.0, color);
        painter.line_segment(
            [egui::pos2(mid, rect.top()), egui::pos2(mid, rect.bottom())],
            ui.visuals().widgets.noninteractive.fg_stroke,
        );
    }

    fn ui_impact(ui: &mut egui::Ui, analysis: &BillAnalysis) {
        if analysis.impact.is_empty() {
            ui.label("No impact data for this bill.");
            return;
        }
        for point in &analysis.impact {
            ui.label(egui::RichText::new(&point.name).strong());
            ui.horizontal(|ui| {
                ui.label(format!("If passed ({:+.0})", point.if_passed));
                Self::impact_bar(ui, point.if_passed);
            });
            ui.horizontal(|ui| {
                ui.label(format!("If not passed ({:+.0})", point.if_not_passed));
                Self::impact_bar(ui, point.if_not_passed);
            });
            ui.add_space(10.0);
        }
    }

    fn ui_debates(ui: &mut egui::Ui, analysis: &BillAnalysis) {
        if analysis.debate.is_empty() {
            ui.label("No recorded debate for this bill.");
        }
        for segment in &analysis.debate {
            ui.label(egui::RichText::new(format!("{} ({})", segment.speaker, segment.party)).strong());
            ui.add(egui::Label::new(&segment.statement).wrap(true));
            ui.add_space(10.0);
        }
    }

    fn ui_media(ui: &mut egui::Ui, analysis: &BillAnalysis, playing: Option<&str>, actions: &mut Vec<Action>) {
        if analysis.media.is_empty() {
            ui.label("No media for this bill.");
        }
        for (i, item) in analysis.media.iter().enumerate() {
            ui.label(egui::RichText::new(format!("[{}] {}", item.kind, item.title)).strong());
            ui.add(egui::Label::new(&item.description).wrap(true));
            match item.kind {
                MediaKind::News => {
                    if let Some(uri) = &item.uri {
                        ui.hyperlink_to("Read article", uri);
                    }
                }
                MediaKind::Audio => {
                    let key = format!("media-{}", i);
                    if playing == Some(key.as_str()) {
                        if ui.button("Stop").clicked() {
                            actions.push(Action::StopListening);
                        }
                    } else if ui.button("Listen").clicked() {
                        actions.push(Action::Listen {
                            key,
                            text: item.description.clone(),
                        });
                    }
                }
                MediaKind::Video => {}
            }
            ui.add_space(10.0);
        }
    }

    fn render_chat_message(ui: &mut egui::Ui, m: &ChatMessage) {
        let is_user = m.author == Author::User;
        let frame = egui::Frame::none()
            .fill(if is_user {
                ui.style().visuals.extreme_bg_color
            } else {
                ui.style().visuals.panel_fill
            })
            .stroke(egui::Stroke::new(
                1.0,
                ui.style().visuals.widgets.noninteractive.bg_stroke.color,
            ))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(8.0));

        frame.show(ui, |ui| {
            ui.label(egui::RichText::new(&m.name).strong());
            ui.add(egui::Label::new(&m.text).wrap(true));
        });
    }

    fn ui_discussion(
        ui: &mut egui::Ui,
        messages: &[ChatMessage],
        in_flight: bool,
        inputs: &mut Inputs,
        actions: &mut Vec<Action>,
    ) {
        egui::ScrollArea::vertical()
            .id_source("discussion")
            .max_height(DISCUSSION_HEIGHT)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for m in messages {
                    Self::render_chat_message(ui, m);
                    ui.add_space(8.0);
                }
                if in_flight {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Others are typing...");
                    });
                }
            });
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut inputs.chat)
                    .hint_text("Share your view")
                    .desired_width(ui.available_width() - 70.0),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let can_send = !in_flight && !inputs.chat.trim().is_empty();
            let clicked = ui.add_enabled(can_send, egui::Button::new("Send")).clicked();
            if (clicked || submitted) && can_send {
                actions.push(Action::SendChat);
            }
        });
    }

    fn ui_logs_screen(ui: &mut egui::Ui) {
        ui.add_space(24.0);
        ui.heading("Logs");
        ui.add_space(Self::SCREEN_TITLE_BOTTOM_SPACING);

        let lines: Vec<String> = log_buffer()
            .lock()
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default();

        let available = ui.available_height();
        let scroll_height = (available - Self::SCREEN_FOOTER_SPACING).max(0.0);
        egui::ScrollArea::vertical()
            .max_height(scroll_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &lines {
                    ui.label(
                        egui::RichText::new(line.as_str()).family(egui::FontFamily::Monospace),
                    );
                }
                if lines.is_empty() {
                    ui.label("No log output yet.");
                }
            });
        ui.add_space(Self::SCREEN_FOOTER_SPACING);
    }
}

impl eframe::App for CivicApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_completions(ctx);
        self.speech.poll();
        self.sync_view_state();
        if self.speech.playing().is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }

        let mut actions = Vec::new();
        let connected = self.gateway.is_some();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                .show(ui, |ui| {
                    ui.add_space(16.0);
                    ui.horizontal(|ui| {
                        ui.heading("Civic");
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let mut language = self.session.language().to_string();
                            egui::ComboBox::from_id_source("language")
                                .selected_text(language.clone())
                                .show_ui(ui, |ui| {
                                    for l in LANGUAGES {
                                        ui.selectable_value(&mut language, l.to_string(), *l);
                                    }
                                });
                            if language != self.session.language() {
                                actions.push(Action::Language(language));
                            }
                            ui.label("Analysis language");
                        });
                    });
                    ui.add_space(16.0);
                });
        });

        let current_screen = &mut self.current_screen;
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(120.0)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                    .show(ui, |ui| {
                        ui.add_space(24.0);
                        if ui.selectable_label(*current_screen == Screen::Browse, "Bills").clicked() {
                            *current_screen = Screen::Browse;
                        }
                        ui.add_space(12.0);
                        if ui.selectable_label(*current_screen == Screen::Logs, "Logs").clicked() {
                            *current_screen = Screen::Logs;
                        }
                    });
            });

        if self.current_screen == Screen::Browse {
            egui::SidePanel::left("bill_list_panel")
                .resizable(true)
                .default_width(BILL_LIST_WIDTH)
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .inner_margin(egui::Margin::symmetric(16.0, 0.0))
                        .show(ui, |ui| {
                            ui.add_space(24.0);
                            if let Some(ref error) = self.startup_error {
                                ui.colored_label(ui.visuals().error_fg_color, error);
                                ui.add_space(8.0);
                            }
                            Self::ui_search_bar(ui, &self.session, &mut self.inputs, connected, &mut actions);
                            ui.add_space(8.0);
                            Self::ui_controls(ui, &self.session, &self.years, &mut actions);
                            ui.add_space(12.0);
                            Self::ui_bill_list(ui, &self.session, &mut actions);
                        });
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                .show(ui, |ui| match self.current_screen {
                    Screen::Logs => Self::ui_logs_screen(ui),
                    Screen::Browse => {
                        ui.add_space(24.0);
                        egui::ScrollArea::vertical()
                            .id_source("detail")
                            .show(ui, |ui| {
                                Self::ui_detail(
                                    ui,
                                    &self.session,
                                    &mut self.inputs,
                                    self.speech.playing(),
                                    &mut actions,
                                );
                                ui.add_space(Self::SCREEN_FOOTER_SPACING);
                            });
                    }
                });
        });

        for action in actions {
            self.apply(ctx, action);
        }
    }
}
