//! Cloneable, thread-safe access to a running [`FloatingPlayer`].
//!
//! [`spawn`] moves the player onto its own task, which serializes host
//! commands and adapter reports. Any page component can then trigger playback
//! through a [`PlayerHandle`], or through the process-wide handle installed
//! with [`install_global`].

use once_cell::sync::OnceCell;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::PlayerError;
use crate::events::{PlayerEvent, PromptChoice};
use crate::geometry::{PlayerPosition, Viewport};
use crate::models::{DefaultSize, PauseBehavior, PreferencesPatch, VideoRef};
use crate::session::SessionState;
use crate::shell::controls::{ControlAction, FocusContext, Key};
use crate::shell::gesture::{HitRegion, PointerEvent};
use crate::shell::FloatingPlayer;

/// One edit to the open settings draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEdit {
    PauseBehavior(PauseBehavior),
    DefaultSize(DefaultSize),
    AutoPlayNext(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    PlayVideo(VideoRef),
    Enqueue(VideoRef),
    Pause,
    Resume,
    TogglePlay,
    Close,
    ToggleMinimize,
    MoveTo(PlayerPosition),
    Resize(Viewport),
    Navigate(String),
    AnswerPrompt(PromptChoice),
    UpdatePreferences(PreferencesPatch),
    PointerDown(PointerEvent, HitRegion),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    PointerCancel,
    Control(ControlAction),
    SeekBarClick { offset_px: f64, bar_width_px: f64 },
    SeekTo(f64),
    Key(Key, FocusContext),
    OpenSettings,
    EditSettings(SettingsEdit),
    SaveSettings,
    CloseSettings,
    Shutdown,
}

impl FloatingPlayer {
    /// Applies one command. Returns false once the player should stop.
    pub fn dispatch(&mut self, command: PlayerCommand) -> bool {
        match command {
            PlayerCommand::PlayVideo(video) => self.play_video(video),
            PlayerCommand::Enqueue(video) => self.enqueue(video),
            PlayerCommand::Pause => self.pause_video(),
            PlayerCommand::Resume => self.resume_video(),
            PlayerCommand::TogglePlay => self.toggle_play(),
            PlayerCommand::Close => self.close_player(),
            PlayerCommand::ToggleMinimize => self.toggle_minimize(),
            PlayerCommand::MoveTo(position) => self.update_position(position),
            PlayerCommand::Resize(viewport) => self.resize_viewport(viewport),
            PlayerCommand::Navigate(route) => {
                self.navigate(&route);
            }
            PlayerCommand::AnswerPrompt(choice) => {
                self.answer_prompt(choice);
            }
            PlayerCommand::UpdatePreferences(patch) => self.update_preferences(patch),
            PlayerCommand::PointerDown(event, region) => self.pointer_down(event, region),
            PlayerCommand::PointerMove(event) => self.pointer_move(event),
            PlayerCommand::PointerUp(event) => {
                self.pointer_up(event);
            }
            PlayerCommand::PointerCancel => self.pointer_cancel(),
            PlayerCommand::Control(action) => self.control(action),
            PlayerCommand::SeekBarClick {
                offset_px,
                bar_width_px,
            } => {
                self.seek_bar_click(offset_px, bar_width_px);
            }
            PlayerCommand::SeekTo(seconds) => {
                self.seek_to(seconds);
            }
            PlayerCommand::Key(key, focus) => {
                self.key_down(key, focus);
            }
            PlayerCommand::OpenSettings => self.open_settings(),
            PlayerCommand::EditSettings(edit) => match self.settings_panel_mut() {
                Some(panel) => match edit {
                    SettingsEdit::PauseBehavior(v) => panel.set_pause_behavior(v),
                    SettingsEdit::DefaultSize(v) => panel.set_default_size(v),
                    SettingsEdit::AutoPlayNext(v) => panel.set_auto_play_next(v),
                },
                None => debug!(?edit, "Settings edit with no open panel"),
            },
            PlayerCommand::SaveSettings => {
                self.save_settings();
            }
            PlayerCommand::CloseSettings => self.close_settings(),
            PlayerCommand::Shutdown => return false,
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<PlayerCommand>,
    session: watch::Receiver<SessionState>,
    events: broadcast::Sender<PlayerEvent>,
}

impl PlayerHandle {
    pub fn send(&self, command: PlayerCommand) -> Result<(), PlayerError> {
        self.tx.send(command).map_err(|_| PlayerError::PlayerClosed)
    }

    pub fn play_video(&self, video: VideoRef) -> Result<(), PlayerError> {
        self.send(PlayerCommand::PlayVideo(video))
    }

    pub fn pause(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Pause)
    }

    pub fn resume(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Resume)
    }

    pub fn close(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Close)
    }

    pub fn navigate(&self, route: impl Into<String>) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Navigate(route.into()))
    }

    pub fn shutdown(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Shutdown)
    }

    /// Watch the published session state.
    pub fn session(&self) -> watch::Receiver<SessionState> {
        self.session.clone()
    }

    /// Latest published session state.
    pub fn state(&self) -> SessionState {
        self.session.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Moves the player onto a task and returns a handle to it.
///
/// The task exits on [`PlayerCommand::Shutdown`] or once every handle is
/// dropped, releasing any mounted adapter on the way out.
pub fn spawn(mut player: FloatingPlayer) -> (PlayerHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = PlayerHandle {
        tx,
        session: player.session(),
        events: player.event_sender(),
    };

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                command = rx.recv() => match command {
                    Some(command) => {
                        if !player.dispatch(command) {
                            break;
                        }
                    }
                    None => break,
                },
                Some(event) = player.next_adapter_event() => {
                    player.handle_adapter_event(event);
                }
            }
        }
        player.close_player();
        info!("Player loop stopped");
    });

    (handle, task)
}

static GLOBAL_HANDLE: OnceCell<PlayerHandle> = OnceCell::new();

/// Installs the process-wide handle. Only the first call wins.
pub fn install_global(handle: PlayerHandle) -> Result<(), PlayerError> {
    GLOBAL_HANDLE
        .set(handle)
        .map_err(|_| PlayerError::GlobalAlreadyInstalled)
}

pub fn global() -> Result<&'static PlayerHandle, PlayerError> {
    GLOBAL_HANDLE.get().ok_or(PlayerError::GlobalNotInstalled)
}

/// Plays a video on the globally installed player.
pub fn play_video(video: VideoRef) -> Result<(), PlayerError> {
    global()?.play_video(video)
}
