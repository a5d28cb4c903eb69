use std::error::Error;
use std::io;
use std::sync::Arc;

use floating_player::adapter::{
    ScriptHost, SocialEmbedSdk, SocialSdkEvent, StreamEmbedPlayer, StreamEmbedSdk,
    StreamSdkEvent,
};
use floating_player::{
    spawn, BackendKind, ContainerHandle, EmbedAdapterFactory, FilePreferenceStore,
    FloatingPlayer, PlayerCommand, PlayerError, PlayerEvent, PlayerHandle, PromptChoice,
    VideoRef, Viewport, CONFIG,
};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration};

/// Stands in for the page: every SDK script "loads" as soon as it is injected.
struct ConsoleHost;

impl ScriptHost for ConsoleHost {
    fn inject_script(&self, kind: BackendKind, src: &str) -> Result<(), PlayerError> {
        println!("inject {kind} SDK from {src}");
        Ok(())
    }

    fn sdk_ready(&self, _kind: BackendKind) -> bool {
        true
    }
}

struct ConsoleStreamPlayer {
    channel: String,
    muted: bool,
}

impl StreamEmbedPlayer for ConsoleStreamPlayer {
    fn play(&mut self) {
        println!("[{}] play", self.channel);
    }

    fn pause(&mut self) {
        println!("[{}] pause", self.channel);
    }

    fn seek(&mut self, seconds: f64) {
        println!("[{}] seek to {seconds}s", self.channel);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> f64 {
        0.0
    }

    fn destroy(&mut self) {
        println!("[{}] destroyed", self.channel);
    }
}

/// Live-stream SDK whose embeds are ready the moment they are created.
struct ConsoleStreamSdk;

impl StreamEmbedSdk for ConsoleStreamSdk {
    fn create_player(
        &self,
        _container: &ContainerHandle,
        channel: &str,
        events: mpsc::UnboundedSender<StreamSdkEvent>,
    ) -> Result<Box<dyn StreamEmbedPlayer>, PlayerError> {
        let _ = events.send(StreamSdkEvent::Ready);
        Ok(Box::new(ConsoleStreamPlayer {
            channel: channel.to_string(),
            muted: false,
        }))
    }
}

/// Social SDK that refuses every embed, so the player falls back to a thumbnail.
struct BlockedSocialSdk;

impl SocialEmbedSdk for BlockedSocialSdk {
    fn parse(
        &self,
        _container: &ContainerHandle,
        href: &str,
        _events: mpsc::UnboundedSender<SocialSdkEvent>,
    ) -> Result<(), PlayerError> {
        Err(PlayerError::IoError(io::Error::other(format!(
            "embed blocked for {href}"
        ))))
    }
}

/// Prints what the player published so far, answering any pause prompt.
fn report(
    handle: &PlayerHandle,
    events: &mut broadcast::Receiver<PlayerEvent>,
) -> Result<(), PlayerError> {
    while let Ok(event) = events.try_recv() {
        match event {
            PlayerEvent::PausePrompt { route } => {
                println!("Pause prompt for {route}, keeping it playing");
                handle.send(PlayerCommand::AnswerPrompt(PromptChoice::KeepPlaying))?;
            }
            PlayerEvent::Degraded { external_url, .. } => {
                println!("Embed unavailable, open {external_url} instead");
            }
            other => println!("Event: {}", other.event_type()),
        }
    }
    Ok(())
}

/// Spawns a player, triggers playback from "anywhere" through the global
/// handle, and walks into a reading route to get the pause prompt.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Step 1: Build the player from the environment-driven config
    let config = CONFIG.clone();
    let store = Arc::new(FilePreferenceStore::from_config(std::env::temp_dir(), &config));
    let factory = Arc::new(EmbedAdapterFactory::new(
        Arc::new(ConsoleHost),
        Arc::new(ConsoleStreamSdk),
        Arc::new(BlockedSocialSdk),
        config.clone(),
    ));
    let player = FloatingPlayer::new(
        config,
        store,
        factory,
        ContainerHandle::new("player-embed"),
        Viewport::new(1280.0, 720.0),
    )?;

    // Step 2: Run it on its own task and make the handle reachable from anywhere
    let (handle, task) = spawn(player);
    let mut events = handle.subscribe();
    floating_player::install_global(handle.clone())?;

    // Step 3: Play a live stream through the global entry point
    floating_player::play_video(VideoRef::new(
        "live-1",
        "Friday stream",
        BackendKind::StreamEmbed,
        "somechannel",
        "https://img.example/live-1.jpg",
    ))?;
    sleep(Duration::from_millis(200)).await;

    // Step 4: Open an article; the default preference asks before pausing
    handle.navigate("/articles/some-story")?;
    sleep(Duration::from_millis(100)).await;
    report(&handle, &mut events)?;

    // Step 5: A social clip that can't be embedded degrades to a thumbnail
    floating_player::play_video(VideoRef::new(
        "clip-7",
        "Highlights",
        BackendKind::SocialEmbed,
        "https://social.example/videos/7",
        "https://img.example/clip-7.jpg",
    ))?;
    sleep(Duration::from_millis(200)).await;
    report(&handle, &mut events)?;

    let state = handle.state();
    println!(
        "Now showing {:?}, playing: {}",
        state.current_video_id(),
        state.is_playing
    );

    // Step 6: Stop the player task
    handle.shutdown()?;
    task.await?;
    Ok(())
}
