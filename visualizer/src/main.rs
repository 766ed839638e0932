use anyhow::Context;
use canvas::{LiveTrace, StoredTrace};
use clap::Parser;
use config::ViewerConfig;
use ecgcore::api::{ApiError, EcgBackend, HttpBackend};
use ecgcore::model::{ActivePatient, SampleBlock, SaveAck, StoredReading};
use ecgcore::playback::{
    group_readings, load_error_message, ReadingDetail, ReadingGroup, ReadingNavigator,
};
use ecgcore::recording::{
    format_elapsed, Effect, ReadingForm, RecorderState, RecordingController, Rejection,
};
use ecgcore::render::LiveRenderer;
use ecgcore::stream::{HttpFeedConnector, StreamClient};
use ecgcore::telemetry::LogManager;
use iced::{
    task, time,
    widget::{
        button, canvas::Cache, column, pick_list, progress_bar, row, scrollable, text,
        text_input, Canvas, Column, Container,
    },
    Alignment, Element, Length, Subscription, Task, Theme,
};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder as TokioBuilder, Handle};

mod canvas;
mod config;

#[derive(Parser)]
#[command(author, version, about = "ECG monitor, recorder and reading viewer")]
struct Args {
    /// Load the viewer config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the backend API base URL
    #[arg(long)]
    api: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    }
    .with_api(args.api);

    // the feed client needs a runtime that outlives every iced task
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating feed runtime")?;
    let handle = runtime.handle().clone();

    iced::application(
        move || Viewer::boot(config.clone(), handle.clone()),
        Viewer::update,
        Viewer::view,
    )
    .title(application_title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()
    .map_err(|err| anyhow::anyhow!("running visualizer: {err}"))
}

fn application_title(state: &Viewer) -> String {
    match state.screen {
        Screen::Monitor => "ECG Monitor".into(),
        Screen::Readings => "ECG Readings".into(),
        Screen::Detail => "ECG Reading Detail".into(),
    }
}

fn application_subscription(state: &Viewer) -> Subscription<Message> {
    if state.recorder.timer_armed() {
        time::every(Duration::from_secs(1)).map(|_| Message::Tick)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Viewer) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Monitor,
    Readings,
    Detail,
}

struct DetailScreen {
    navigator: ReadingNavigator,
    loading: bool,
    detail: Option<ReadingDetail>,
    error: Option<String>,
    cache: Cache,
}

struct Viewer {
    config: ViewerConfig,
    backend: Arc<HttpBackend>,
    stream: StreamClient<HttpFeedConnector>,
    feed_task: Option<task::Handle>,
    screen: Screen,
    recorder: RecordingController,
    live: LiveRenderer,
    form: ReadingForm,
    groups: Vec<ReadingGroup>,
    detail: Option<DetailScreen>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    PatientsLoaded(Result<Vec<ActivePatient>, ApiError>),
    PatientSelected(PatientOption),
    RecordCountChanged(String),
    ObservationsChanged(String),
    ConnectDevice,
    OpenFeed(Option<String>),
    DisconnectDevice,
    Block(SampleBlock),
    StartRecording,
    StopRecording,
    Tick,
    SessionStatusUpdated(Result<(), ApiError>),
    Save,
    ReadingSaved(Result<SaveAck, ApiError>),
    Cancel,
    ShowMonitor,
    ShowReadings,
    ReadingsLoaded(Result<Vec<StoredReading>, ApiError>),
    OpenReading { id: u64, siblings: Vec<u64> },
    ReadingLoaded(u64, Result<StoredReading, ApiError>),
    PreviousReading,
    NextReading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientOption {
    id: String,
    label: String,
}

impl PatientOption {
    fn from_patient(patient: &ActivePatient) -> Self {
        Self {
            id: patient.patient_id.clone(),
            label: format!(
                "{} · {}",
                patient.display_name(),
                patient.patient_identification
            ),
        }
    }
}

impl fmt::Display for PatientOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn feed_summary(stream: &StreamClient<HttpFeedConnector>) -> String {
    let metrics = stream.metrics();
    format!(
        "feed: {} blocks, {} dropped, {} reconnects",
        metrics.blocks, metrics.malformed, metrics.reconnects
    )
}

impl Viewer {
    fn boot(config: ViewerConfig, runtime: Handle) -> (Self, Task<Message>) {
        let pipeline = &config.pipeline;
        let backend = Arc::new(HttpBackend::new(&pipeline.api_base_url));
        let stream = StreamClient::new(
            Arc::new(HttpFeedConnector::new(&pipeline.api_base_url)),
            pipeline.reconnect.clone(),
            runtime,
        );
        let viewer = Viewer {
            recorder: RecordingController::new(pipeline.recorder.clone()),
            live: LiveRenderer::new(pipeline.live.clone()),
            backend: backend.clone(),
            stream,
            feed_task: None,
            screen: Screen::Monitor,
            form: ReadingForm {
                record_count: "1".into(),
                ..ReadingForm::default()
            },
            groups: Vec::new(),
            detail: None,
            status: format!("Connecting to {}...", pipeline.api_base_url),
            history: Vec::new(),
            config,
        };
        (
            viewer,
            Task::perform(backend.active_patients(), Message::PatientsLoaded),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::PatientsLoaded(Ok(patients)) => {
                state.status = format!("{} patients with an active session", patients.len());
                state.recorder.set_patients(patients);
                Task::none()
            }
            Message::PatientsLoaded(Err(err)) => {
                state.report(err.user_message("Error loading active patients"));
                Task::none()
            }
            Message::PatientSelected(option) => {
                match state.recorder.select_patient(Some(&option.id)) {
                    Ok(()) => state.form.patient_id = Some(option.id),
                    Err(rejection) => state.reject(rejection),
                }
                Task::none()
            }
            Message::RecordCountChanged(value) => {
                state.form.record_count = value;
                Task::none()
            }
            Message::ObservationsChanged(value) => {
                state.form.observations = value;
                Task::none()
            }
            Message::ConnectDevice => match state.recorder.connect_device() {
                Ok(effects) => state.run_effects(effects),
                Err(rejection) => {
                    state.reject(rejection);
                    Task::none()
                }
            },
            Message::OpenFeed(device_id) => {
                if !state.recorder.is_connected() {
                    return Task::none();
                }
                state.close_feed();
                state.stream.connect(device_id);
                let (feed, handle) = Task::run(state.stream.blocks(), Message::Block).abortable();
                state.feed_task = Some(handle.abort_on_drop());
                state.push_history("Live feed opened".into());
                feed
            }
            Message::DisconnectDevice => {
                let effects = state.recorder.disconnect_device();
                state.run_effects(effects)
            }
            Message::Block(block) => {
                if state.recorder.is_connected() {
                    let summary = state.live.ingest(&block);
                    state.recorder.observe_block(&summary);
                }
                Task::none()
            }
            Message::StartRecording => {
                match state.recorder.start_recording() {
                    Ok(()) => state.push_history("Recording started".into()),
                    Err(rejection) => state.reject(rejection),
                }
                Task::none()
            }
            Message::StopRecording => {
                let effects = state.recorder.stop_recording();
                state.run_effects(effects)
            }
            Message::Tick => {
                let effects = state.recorder.tick();
                state.run_effects(effects)
            }
            Message::SessionStatusUpdated(result) => {
                let effects = state.recorder.on_session_status(result);
                state.run_effects(effects)
            }
            Message::Save => match state.recorder.create_lectura(&state.form) {
                Ok(effects) => state.run_effects(effects),
                Err(rejection) => {
                    state.reject(rejection);
                    Task::none()
                }
            },
            Message::ReadingSaved(result) => {
                let effects = state.recorder.on_reading_saved(result);
                state.run_effects(effects)
            }
            Message::Cancel => {
                let effects = state.recorder.cancel();
                state.run_effects(effects)
            }
            Message::ShowMonitor => state.show_monitor(),
            Message::ShowReadings => {
                let mut effects = state.recorder.disconnect_device();
                effects.push(Effect::NavigateToReadings);
                state.run_effects(effects)
            }
            Message::ReadingsLoaded(Ok(readings)) => {
                state.groups = group_readings(&readings);
                state.status = format!(
                    "{} readings in {} groups",
                    readings.len(),
                    state.groups.len()
                );
                Task::none()
            }
            Message::ReadingsLoaded(Err(err)) => {
                state.report(err.user_message("Error loading ECG readings"));
                Task::none()
            }
            Message::OpenReading { id, siblings } => {
                let mut navigator = ReadingNavigator::new(&siblings, None);
                navigator.open(&id.to_string());
                state.push_history(format!("Opened reading {id} ({})", navigator.query()));
                state.screen = Screen::Detail;
                state.detail = Some(DetailScreen {
                    navigator,
                    loading: true,
                    detail: None,
                    error: None,
                    cache: Cache::new(),
                });
                state.load_reading(id)
            }
            Message::ReadingLoaded(id, result) => {
                let stored = state.config.pipeline.stored.clone();
                let Some(screen) = state.detail.as_mut() else {
                    return Task::none();
                };
                if screen.navigator.current_id() != Some(id) {
                    return Task::none();
                }
                screen.loading = false;
                match result {
                    Ok(reading) => {
                        screen.detail = Some(ReadingDetail::new(reading, &stored));
                        screen.error = None;
                    }
                    Err(err) => {
                        LogManager::new("playback").warn(&format!("reading {id} failed to load: {err}"));
                        screen.detail = None;
                        screen.error = Some(load_error_message(&err));
                    }
                }
                screen.cache.clear();
                Task::none()
            }
            Message::PreviousReading => {
                let target = state
                    .detail
                    .as_mut()
                    .and_then(|screen| screen.navigator.previous());
                match target {
                    Some(id) => state.load_reading(id),
                    None => Task::none(),
                }
            }
            Message::NextReading => {
                let target = state
                    .detail
                    .as_mut()
                    .and_then(|screen| screen.navigator.next());
                match target {
                    Some(id) => state.load_reading(id),
                    None => Task::none(),
                }
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let nav = row![
            button("Monitor").on_press(Message::ShowMonitor).padding(8),
            button("Readings").on_press(Message::ShowReadings).padding(8),
        ]
        .spacing(10);

        let body = match state.screen {
            Screen::Monitor => state.view_monitor(),
            Screen::Readings => state.view_readings(),
            Screen::Detail => state.view_detail(),
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let layout = column![
            nav,
            body,
            text(&state.status).size(14),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(14)
        .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_monitor(&self) -> Element<'_, Message> {
        let options: Vec<PatientOption> = self
            .recorder
            .patients()
            .iter()
            .map(PatientOption::from_patient)
            .collect();
        let selected = options
            .iter()
            .find(|option| Some(option.id.as_str()) == self.recorder.selected_patient_id())
            .cloned();
        let context = self.recorder.context();
        let connected = self.recorder.is_connected();
        let recording = self.recorder.is_recording();

        let patient_column = column![
            text("Patient").size(18),
            pick_list(options, selected, Message::PatientSelected)
                .placeholder("Select a patient")
                .width(Length::Fixed(320.0)),
            text(format!("Doctor: {}", context.doctor_label())).size(13),
            text(format!("Device: {}", context.device_label())).size(13),
            text(format!("Session: {}", context.status_label())).size(13),
        ]
        .spacing(6)
        .width(Length::Fixed(360.0));

        let controls = row![
            button(if connected { "Disconnect" } else { "Connect device" })
                .on_press(if connected {
                    Message::DisconnectDevice
                } else {
                    Message::ConnectDevice
                })
                .padding(8),
            button(if recording { "Stop recording" } else { "Start recording" })
                .on_press_maybe(match (connected, recording) {
                    (_, true) => Some(Message::StopRecording),
                    (true, false) if !self.recorder.is_submitting() => {
                        Some(Message::StartRecording)
                    }
                    _ => None,
                })
                .padding(8),
            text(format_elapsed(self.recorder.elapsed_secs())).size(18),
            text(format!("{:.0} bpm", self.recorder.current_bpm())).size(18),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let live = Container::new(
            Canvas::new(LiveTrace {
                renderer: &self.live,
            })
            .width(Length::Fill)
            .height(Length::Fixed(self.config.pipeline.live.height)),
        )
        .padding([0.0, self.config.pipeline.live.side_padding / 2.0]);

        let form = column![
            text("Save reading").size(18),
            text_input("Record count", &self.form.record_count)
                .on_input(Message::RecordCountChanged)
                .padding(6),
            text_input("Observations", &self.form.observations)
                .on_input(Message::ObservationsChanged)
                .padding(6),
            row![
                button("Save")
                    .on_press_maybe((!self.recorder.is_submitting()).then_some(Message::Save))
                    .padding(8),
                button("Cancel").on_press(Message::Cancel).padding(8),
            ]
            .spacing(10),
            text(format!("{} samples captured", self.recorder.captured().len())).size(12),
            text(feed_summary(&self.stream)).size(12),
        ]
        .spacing(8)
        .width(Length::Fixed(360.0));

        column![
            row![patient_column, form].spacing(30),
            controls,
            progress_bar(0.0..=100.0, self.recorder.progress_percent()),
            live,
        ]
        .spacing(12)
        .into()
    }

    fn view_readings(&self) -> Element<'_, Message> {
        let list = if self.groups.is_empty() {
            Column::new().push(text("No readings stored yet").size(14))
        } else {
            self.groups
                .iter()
                .fold(Column::new().spacing(10), |col, group| {
                    let ids = group.ids();
                    let buttons = group.readings.iter().fold(row![].spacing(6), |line, reading| {
                        line.push(
                            button(text(format!("#{}", reading.id)).size(12))
                                .on_press(Message::OpenReading {
                                    id: reading.id,
                                    siblings: ids.clone(),
                                })
                                .padding(6),
                        )
                    });
                    col.push(
                        column![
                            text(format!(
                                "{} · {} ({} readings)",
                                group.patient_name,
                                group.date_label(),
                                group.readings.len()
                            ))
                            .size(15),
                            buttons,
                        ]
                        .spacing(4),
                    )
                })
        };

        column![
            text("Stored readings").size(24),
            scrollable(list).height(Length::Fill),
        ]
        .spacing(10)
        .height(Length::Fill)
        .into()
    }

    fn view_detail(&self) -> Element<'_, Message> {
        let Some(screen) = &self.detail else {
            return text("No reading selected").into();
        };
        let navigator = &screen.navigator;
        let navigation = row![
            button("Back").on_press(Message::ShowReadings).padding(6),
            button("Previous")
                .on_press_maybe(navigator.can_go_previous().then_some(Message::PreviousReading))
                .padding(6),
            text(navigator.label()).size(14),
            button("Next")
                .on_press_maybe(navigator.can_go_next().then_some(Message::NextReading))
                .padding(6),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let content: Element<'_, Message> = if screen.loading {
            text("Loading reading...").into()
        } else if let Some(error) = &screen.error {
            text(error.clone()).size(16).into()
        } else if let Some(detail) = &screen.detail {
            column![
                text(format!("Patient: {} ({})", detail.patient_name(), detail.patient_identification()))
                    .size(14),
                text(format!("Doctor: {}", detail.doctor_name())).size(14),
                text(format!("Recorded: {}", detail.created_at())).size(14),
                text(format!(
                    "Records: {} · {} Hz · {:.1} s",
                    detail.reading().record_count,
                    detail.sample_rate_hz(),
                    detail.duration_secs()
                ))
                .size(14),
                text(format!("Observations: {}", detail.observations())).size(14),
                Canvas::new(StoredTrace {
                    renderer: detail.renderer(),
                    cache: &screen.cache,
                })
                .width(Length::Fill)
                .height(Length::Fixed(self.config.pipeline.stored.height)),
            ]
            .spacing(6)
            .into()
        } else {
            text("Reading not found.").into()
        };

        column![navigation, content].spacing(12).into()
    }

    /// Maps controller effects onto tasks and local side effects.
    fn run_effects(&mut self, effects: Vec<Effect>) -> Task<Message> {
        let mut tasks = Vec::new();
        for effect in effects {
            match effect {
                Effect::OpenStream { device_id, delay } => {
                    tasks.push(Task::perform(
                        async move {
                            tokio::time::sleep(delay).await;
                            device_id
                        },
                        Message::OpenFeed,
                    ));
                }
                Effect::CloseStream => {
                    self.close_feed();
                    self.push_history("Live feed closed".into());
                }
                Effect::UpdateSessionStatus { session_id, status } => {
                    tasks.push(Task::perform(
                        self.backend.update_session_status(session_id, status),
                        Message::SessionStatusUpdated,
                    ));
                }
                Effect::SubmitReading(reading) => {
                    self.status = "Saving reading...".into();
                    tasks.push(Task::perform(
                        self.backend.create_reading(reading),
                        Message::ReadingSaved,
                    ));
                }
                Effect::Notify(notice) => self.report(notice.to_string()),
                Effect::NavigateToReadings => {
                    self.screen = Screen::Readings;
                    self.detail = None;
                    tasks.push(Task::perform(
                        self.backend.readings(),
                        Message::ReadingsLoaded,
                    ));
                }
            }
        }
        Task::batch(tasks)
    }

    fn show_monitor(&mut self) -> Task<Message> {
        self.screen = Screen::Monitor;
        self.detail = None;
        if self.recorder.state() != RecorderState::Disconnected {
            return Task::none();
        }
        // a closed recording screen starts over with a fresh selection
        self.recorder = RecordingController::new(self.config.pipeline.recorder.clone());
        self.form = ReadingForm {
            record_count: "1".into(),
            ..ReadingForm::default()
        };
        Task::perform(self.backend.active_patients(), Message::PatientsLoaded)
    }

    fn load_reading(&mut self, id: u64) -> Task<Message> {
        if let Some(screen) = self.detail.as_mut() {
            screen.loading = true;
        }
        Task::perform(self.backend.reading(id), move |result| {
            Message::ReadingLoaded(id, result)
        })
    }

    fn close_feed(&mut self) {
        self.stream.disconnect();
        if let Some(handle) = self.feed_task.take() {
            handle.abort();
        }
        self.live.reset();
    }

    fn reject(&mut self, rejection: Rejection) {
        LogManager::new("viewer").warn(&rejection.to_string());
        self.status = rejection.to_string();
        self.push_history(rejection.to_string());
    }

    fn report(&mut self, message: String) {
        self.status = message.clone();
        self.push_history(message);
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > self.config.history_limit {
            self.history.remove(0);
        }
    }
}
