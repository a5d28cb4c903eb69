#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use floating_player::adapter::{
    ScriptHost, ScriptRegistry, SocialEmbedPlayer, SocialEmbedSdk, SocialSdkEvent,
    StreamEmbedPlayer, StreamEmbedSdk, StreamSdkEvent,
};
use floating_player::{
    BackendKind, Config, ContainerHandle, EmbedAdapterFactory, FloatingPlayer, MemoryPreferenceStore,
    PlayerError, PlayerPreferences, PreferenceStore, VideoRef, Viewport,
};
use tokio::sync::mpsc;

/// Ordered record of every native call the fakes saw.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub fn index_of(&self, entry: &str) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|e| e == entry)
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub struct FakeHost {
    log: CallLog,
    ready: Mutex<HashSet<BackendKind>>,
    ready_on_inject: AtomicBool,
    failures_left: AtomicU32,
    injections: AtomicU32,
}

impl FakeHost {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ready: Mutex::new(HashSet::new()),
            ready_on_inject: AtomicBool::new(true),
            failures_left: AtomicU32::new(0),
            injections: AtomicU32::new(0),
        }
    }

    /// The script loads but the SDK global never shows up.
    pub fn never_ready(log: CallLog) -> Self {
        let host = Self::new(log);
        host.ready_on_inject.store(false, Ordering::SeqCst);
        host
    }

    pub fn fail_injections(&self, times: u32) {
        self.failures_left.store(times, Ordering::SeqCst);
    }

    pub fn injections(&self) -> u32 {
        self.injections.load(Ordering::SeqCst)
    }
}

impl ScriptHost for FakeHost {
    fn inject_script(&self, kind: BackendKind, _src: &str) -> Result<(), PlayerError> {
        self.injections.fetch_add(1, Ordering::SeqCst);
        self.log.record(format!("inject:{kind}"));
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(PlayerError::IoError(io::Error::other("script blocked")));
        }
        if self.ready_on_inject.load(Ordering::SeqCst) {
            self.ready.lock().unwrap().insert(kind);
        }
        Ok(())
    }

    fn sdk_ready(&self, kind: BackendKind) -> bool {
        self.ready.lock().unwrap().contains(&kind)
    }
}

#[derive(Debug, Clone, Copy)]
struct NativeClock {
    current_time: f64,
    duration: f64,
    muted: bool,
}

pub struct FakeStreamPlayer {
    channel: String,
    log: CallLog,
    clock: Arc<Mutex<NativeClock>>,
}

impl StreamEmbedPlayer for FakeStreamPlayer {
    fn play(&mut self) {
        self.log.record(format!("stream:{}:play", self.channel));
    }

    fn pause(&mut self) {
        self.log.record(format!("stream:{}:pause", self.channel));
    }

    fn seek(&mut self, seconds: f64) {
        self.log.record(format!("stream:{}:seek:{seconds}", self.channel));
        self.clock.lock().unwrap().current_time = seconds;
    }

    fn set_muted(&mut self, muted: bool) {
        self.log.record(format!("stream:{}:muted:{muted}", self.channel));
        self.clock.lock().unwrap().muted = muted;
    }

    fn muted(&self) -> bool {
        self.clock.lock().unwrap().muted
    }

    fn current_time(&self) -> f64 {
        self.clock.lock().unwrap().current_time
    }

    fn duration(&self) -> f64 {
        self.clock.lock().unwrap().duration
    }

    fn destroy(&mut self) {
        self.log.record(format!("stream:{}:destroy", self.channel));
    }
}

pub struct FakeStreamSdk {
    log: CallLog,
    duration: f64,
    fail_create: AtomicBool,
    senders: Mutex<HashMap<String, mpsc::UnboundedSender<StreamSdkEvent>>>,
}

impl FakeStreamSdk {
    pub fn new(log: CallLog, duration: f64) -> Self {
        Self {
            log,
            duration,
            fail_create: AtomicBool::new(false),
            senders: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Fires a native callback for `channel`; false if no such embed exists.
    pub fn emit(&self, channel: &str, event: StreamSdkEvent) -> bool {
        self.senders
            .lock()
            .unwrap()
            .get(channel)
            .is_some_and(|tx| tx.send(event).is_ok())
    }
}

impl StreamEmbedSdk for FakeStreamSdk {
    fn create_player(
        &self,
        _container: &ContainerHandle,
        channel: &str,
        events: mpsc::UnboundedSender<StreamSdkEvent>,
    ) -> Result<Box<dyn StreamEmbedPlayer>, PlayerError> {
        self.log.record(format!("stream:create:{channel}"));
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(PlayerError::IoError(io::Error::other("embed rejected")));
        }
        self.senders
            .lock()
            .unwrap()
            .insert(channel.to_string(), events);
        Ok(Box::new(FakeStreamPlayer {
            channel: channel.to_string(),
            log: self.log.clone(),
            clock: Arc::new(Mutex::new(NativeClock {
                current_time: 0.0,
                duration: self.duration,
                muted: false,
            })),
        }))
    }
}

pub struct FakeSocialPlayer {
    href: String,
    log: CallLog,
    clock: Arc<Mutex<NativeClock>>,
}

impl SocialEmbedPlayer for FakeSocialPlayer {
    fn play(&mut self) {
        self.log.record(format!("social:{}:play", self.href));
    }

    fn pause(&mut self) {
        self.log.record(format!("social:{}:pause", self.href));
    }

    fn seek(&mut self, seconds: f64) {
        self.log.record(format!("social:{}:seek:{seconds}", self.href));
        self.clock.lock().unwrap().current_time = seconds;
    }

    fn mute(&mut self) {
        self.clock.lock().unwrap().muted = true;
    }

    fn unmute(&mut self) {
        self.clock.lock().unwrap().muted = false;
    }

    fn is_muted(&self) -> bool {
        self.clock.lock().unwrap().muted
    }

    fn get_current_position(&self) -> f64 {
        self.log.record(format!("social:{}:get_current_position", self.href));
        self.clock.lock().unwrap().current_time
    }

    fn get_duration(&self) -> f64 {
        self.clock.lock().unwrap().duration
    }

    fn release(&mut self) {
        self.log.record(format!("social:{}:release", self.href));
    }
}

pub struct FakeSocialSdk {
    log: CallLog,
    clock: Arc<Mutex<NativeClock>>,
    senders: Mutex<HashMap<String, mpsc::UnboundedSender<SocialSdkEvent>>>,
}

impl FakeSocialSdk {
    pub fn new(log: CallLog, duration: f64) -> Self {
        Self {
            log,
            clock: Arc::new(Mutex::new(NativeClock {
                current_time: 0.0,
                duration,
                muted: false,
            })),
            senders: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_position(&self, seconds: f64) {
        self.clock.lock().unwrap().current_time = seconds;
    }

    /// Delivers the player instance for `href`, as the SDK's ready callback would.
    pub fn ready(&self, href: &str) -> bool {
        let player = FakeSocialPlayer {
            href: href.to_string(),
            log: self.log.clone(),
            clock: self.clock.clone(),
        };
        self.emit(href, SocialSdkEvent::Ready(Box::new(player)))
    }

    pub fn emit(&self, href: &str, event: SocialSdkEvent) -> bool {
        self.senders
            .lock()
            .unwrap()
            .get(href)
            .is_some_and(|tx| tx.send(event).is_ok())
    }
}

impl SocialEmbedSdk for FakeSocialSdk {
    fn parse(
        &self,
        _container: &ContainerHandle,
        href: &str,
        events: mpsc::UnboundedSender<SocialSdkEvent>,
    ) -> Result<(), PlayerError> {
        self.log.record(format!("social:parse:{href}"));
        self.senders.lock().unwrap().insert(href.to_string(), events);
        Ok(())
    }
}

/// A store whose writes always fail.
#[derive(Debug, Default)]
pub struct ReadOnlyStore;

impl PreferenceStore for ReadOnlyStore {
    fn load(&self) -> Result<Option<PlayerPreferences>, PlayerError> {
        Ok(None)
    }

    fn save(&self, _prefs: &PlayerPreferences) -> Result<(), PlayerError> {
        Err(PlayerError::PreferenceSave("quota exceeded".to_string()))
    }
}

pub struct Harness {
    pub player: FloatingPlayer,
    pub log: CallLog,
    pub host: Arc<FakeHost>,
    pub stream: Arc<FakeStreamSdk>,
    pub social: Arc<FakeSocialSdk>,
    pub registry: Arc<ScriptRegistry>,
}

pub fn test_config() -> Config {
    Config {
        bootstrap_poll_interval: Duration::from_millis(10),
        bootstrap_max_attempts: 5,
        inject_backoff: Duration::from_millis(10),
        ..Config::default()
    }
}

pub fn harness() -> Harness {
    harness_with(test_config(), Arc::new(MemoryPreferenceStore::new()), |log| {
        FakeHost::new(log)
    })
}

pub fn harness_with(
    config: Config,
    store: Arc<dyn PreferenceStore>,
    host: impl FnOnce(CallLog) -> FakeHost,
) -> Harness {
    let log = CallLog::default();
    let host = Arc::new(host(log.clone()));
    let stream = Arc::new(FakeStreamSdk::new(log.clone(), 120.0));
    let social = Arc::new(FakeSocialSdk::new(log.clone(), 120.0));
    let registry = Arc::new(ScriptRegistry::new());
    let factory = EmbedAdapterFactory::with_registry(
        registry.clone(),
        host.clone(),
        stream.clone(),
        social.clone(),
        config.clone(),
    );
    let player = FloatingPlayer::new(
        config,
        store,
        Arc::new(factory),
        ContainerHandle::new("floating-player-embed"),
        Viewport::new(1280.0, 720.0),
    )
    .expect("player should build");

    Harness {
        player,
        log,
        host,
        stream,
        social,
        registry,
    }
}

pub fn stream_video(id: &str, channel: &str) -> VideoRef {
    VideoRef::new(
        id,
        format!("Stream {id}"),
        BackendKind::StreamEmbed,
        channel,
        format!("https://img.example/{id}.jpg"),
    )
}

pub fn social_video(id: &str, href: &str) -> VideoRef {
    VideoRef::new(
        id,
        format!("Clip {id}"),
        BackendKind::SocialEmbed,
        href,
        format!("https://img.example/{id}.jpg"),
    )
}

/// Lets spawned adapter tasks run; the paused clock auto-advances.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

/// Mounts a stream video and drives it to ready.
pub async fn ready_stream(h: &mut Harness, video: VideoRef) {
    let channel = video.backend_locator.clone();
    h.player.play_video(video);
    settle().await;
    assert!(h.stream.emit(&channel, StreamSdkEvent::Ready));
    settle().await;
    h.player.pump();
}

/// Mounts a social video and drives it to ready.
pub async fn ready_social(h: &mut Harness, video: VideoRef) {
    let href = video.backend_locator.clone();
    h.player.play_video(video);
    settle().await;
    assert!(h.social.ready(&href));
    settle().await;
    h.player.pump();
}
