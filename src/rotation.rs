//! Rotation loop: the only place engine state is mutated
//!
//! Three wake-up sources (the interval timer, the key stream, and the key
//! stream closing) meet in a single `tokio::select!`. Each wake-up runs one
//! transition to completion before the loop waits again, so the settings
//! write and the status line always describe the same transition.

use anyhow::{bail, Result};
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::sync::mpsc::Receiver;
use tokio::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::{resolve, EffectiveSettings, GlobalDefaults, RuntimeOverride};
use crate::console::print_block;
use crate::error::RotateResult;
use crate::hotkeys::{help_text, Command};
use crate::settings::{publish, Background};
use crate::traversal::Traversal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// What caused a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First image, shown as soon as the loop starts
    Start,
    Timer,
    Command(Command),
}

/// The rotation engine: traversal state, config tiers and publish target
pub struct Rotator {
    traversal: Traversal,
    defaults: GlobalDefaults,
    overrides: RuntimeOverride,
    settings_path: PathBuf,
    state: LoopState,
    transitions: u64,
}

impl Rotator {
    pub fn new(
        traversal: Traversal,
        defaults: GlobalDefaults,
        overrides: RuntimeOverride,
        settings_path: PathBuf,
    ) -> Self {
        Self {
            traversal,
            defaults,
            overrides,
            settings_path,
            state: LoopState::Idle,
            transitions: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }

    /// Settings for whatever collection is active right now
    pub fn effective(&self) -> EffectiveSettings {
        resolve(
            &self.defaults,
            Some(&self.traversal.current_collection().overrides),
            Some(&self.overrides),
        )
    }

    fn period(&self) -> Duration {
        Duration::from_secs(u64::from(self.effective().interval_minutes.max(1)) * 60)
    }

    /// Run until the quit key arrives or the key stream closes.
    ///
    /// A rotator runs once: calling this again after it stopped is an error.
    pub async fn run(&mut self, commands: &mut Receiver<char>) -> Result<()> {
        if self.state != LoopState::Idle {
            bail!("rotation loop cannot start from state {:?}", self.state);
        }
        self.state = LoopState::Running;
        info!(
            collections = self.traversal.collections().len(),
            settings = %self.settings_path.display(),
            "Rotation started"
        );

        self.handle(Trigger::Start);
        let timer = tokio::time::sleep(self.period());
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = &mut timer => {
                    self.handle(Trigger::Timer);
                    timer.as_mut().reset(Instant::now() + self.period());
                }
                key = commands.recv() => {
                    let Some(key) = key else {
                        info!("Key stream closed");
                        break;
                    };
                    match Command::from_key(key) {
                        Some(Command::Quit) => {
                            info!("Quit requested");
                            break;
                        }
                        Some(Command::Help) => print_block(&help_text()),
                        Some(Command::DebugState) => print_block(&self.describe()),
                        Some(command) => {
                            self.handle(Trigger::Command(command));
                            // A manual change restarts the countdown
                            timer.as_mut().reset(Instant::now() + self.period());
                        }
                        None => warn!(key = %key.escape_debug(), "Unknown command key, press 'h' for help"),
                    }
                }
            }
        }

        self.state = LoopState::Stopped;
        info!(transitions = self.transitions, "Rotation stopped");
        Ok(())
    }

    /// Apply one transition, reporting failures without stopping the loop
    fn handle(&mut self, trigger: Trigger) {
        if let Err(e) = self.step(trigger) {
            error!(
                trigger = ?trigger,
                kind = e.as_label(),
                retryable = e.is_retryable(),
                error = %e,
                "Transition failed"
            );
        }
    }

    /// Move the cursor for `trigger`, then publish the image under it.
    ///
    /// If the move fails nothing is published; if the publish fails the cursor
    /// stays where it moved to. Quit, help and state keys are not transitions
    /// and leave the settings file alone.
    pub fn step(&mut self, trigger: Trigger) -> RotateResult<EffectiveSettings> {
        match trigger {
            Trigger::Start => {}
            Trigger::Timer | Trigger::Command(Command::NextImage) => self.traversal.next_image()?,
            Trigger::Command(Command::PreviousImage) => self.traversal.previous_image()?,
            Trigger::Command(Command::NextCollection) => self.traversal.next_collection()?,
            Trigger::Command(Command::PreviousCollection) => self.traversal.previous_collection()?,
            Trigger::Command(Command::ShuffleImages) => self.traversal.shuffle_images(),
            Trigger::Command(Command::ShuffleCollections) => self.traversal.shuffle_collections()?,
            Trigger::Command(Command::Quit | Command::Help | Command::DebugState) => {
                return Ok(self.effective());
            }
        }
        self.publish_current()
    }

    fn publish_current(&mut self) -> RotateResult<EffectiveSettings> {
        let settings = self.effective();
        let background = Background {
            image: self.traversal.current_image().to_path_buf(),
            alignment: settings.alignment,
            stretch: settings.stretch,
            opacity: settings.opacity,
        };
        publish(&self.settings_path, settings.profile, &background)?;
        self.transitions += 1;

        info!(
            image = %background.image.display(),
            collection = %self.traversal.current_collection().path.display(),
            profile = %settings.profile,
            alignment = %settings.alignment,
            stretch = %settings.stretch,
            opacity = %settings.opacity,
            interval_minutes = settings.interval_minutes,
            "Background updated"
        );
        Ok(settings)
    }

    /// Human-readable dump of the engine for the state key
    pub fn describe(&self) -> String {
        let cursor = self.traversal.cursor();
        let settings = self.effective();
        let mut out = String::new();

        let _ = writeln!(out, "state:        {:?} ({} transitions)", self.state, self.transitions);
        let _ = writeln!(out, "settings:     {}", self.settings_path.display());
        let _ = writeln!(
            out,
            "effective:    profile={} alignment={} stretch={} opacity={} interval={}m",
            settings.profile, settings.alignment, settings.stretch, settings.opacity, settings.interval_minutes
        );
        let _ = writeln!(
            out,
            "image:        {} ({}/{})",
            self.traversal.current_image().display(),
            cursor.image + 1,
            self.traversal.images().len()
        );
        let _ = write!(out, "collections:");
        for (index, collection) in self.traversal.collections().iter().enumerate() {
            let marker = if index == cursor.collection { '>' } else { ' ' };
            let _ = write!(out, "\n  {marker} {index:>3}  {}", collection.path.display());
            if !collection.overrides.is_empty() {
                let _ = write!(out, "  {:?}", collection.overrides);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::config::CollectionOverride;
    use crate::constants::keys;
    use crate::types::{Alignment, Opacity, ProfileTarget, Stretch};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;
    use std::fs;
    use std::num::NonZeroUsize;
    use std::path::Path;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    const SETTINGS: &str = r#"{
        "theme": "dark",
        "profiles": {
            "defaults": { "font": { "face": "Cascadia Mono" } },
            "list": [ { "name": "pwsh" }, { "name": "wsl" } ]
        }
    }"#;

    struct Fixture {
        root: TempDir,
        settings: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let settings = root.path().join("settings.json");
            fs::write(&settings, SETTINGS).unwrap();
            Self { root, settings }
        }

        fn collection(&self, name: &str, files: &[&str]) -> Collection {
            let dir = self.root.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            for file in files {
                fs::write(dir.join(file), b"").unwrap();
            }
            Collection::new(dir, CollectionOverride::default())
        }

        fn rotator(&self, collections: Vec<Collection>, overrides: RuntimeOverride) -> Rotator {
            let traversal = Traversal::new(collections, false, StdRng::seed_from_u64(1)).unwrap();
            Rotator::new(traversal, defaults(), overrides, self.settings.clone())
        }

        fn document(&self) -> Value {
            serde_json::from_str(&fs::read_to_string(&self.settings).unwrap()).unwrap()
        }

        fn shown(&self) -> String {
            let document = self.document();
            let image = document["profiles"]["defaults"]["backgroundImage"].as_str().unwrap().to_string();
            Path::new(&image).file_name().unwrap().to_string_lossy().into_owned()
        }
    }

    fn defaults() -> GlobalDefaults {
        GlobalDefaults {
            profile: ProfileTarget::Defaults,
            interval_minutes: 1,
            alignment: Alignment::Center,
            stretch: Stretch::UniformToFill,
            opacity: Opacity::new(0.3).unwrap(),
        }
    }

    #[test]
    fn test_timer_steps_cycle_through_collection() {
        let fx = Fixture::new();
        let mut rotator = fx.rotator(vec![fx.collection("walls", &["a.png", "b.png"])], RuntimeOverride::default());

        let mut shown = Vec::new();
        rotator.step(Trigger::Start).unwrap();
        shown.push(fx.shown());
        for _ in 0..3 {
            rotator.step(Trigger::Timer).unwrap();
            shown.push(fx.shown());
        }
        assert_eq!(shown, vec!["a.png", "b.png", "a.png", "b.png"]);
    }

    #[test]
    fn test_collection_override_reaches_settings_file() {
        let fx = Fixture::new();
        let plain = fx.collection("plain", &["a.png"]);
        let mut dim = fx.collection("dim", &["b.png"]);
        dim.overrides = CollectionOverride {
            opacity: Some(Opacity::new(0.0).unwrap()),
            alignment: Some(Alignment::TopLeft),
            stretch: None,
        };
        let mut rotator = fx.rotator(vec![plain, dim], RuntimeOverride::default());

        rotator.step(Trigger::Start).unwrap();
        assert_eq!(fx.document()["profiles"]["defaults"]["backgroundImageOpacity"], serde_json::json!(0.3));

        let settings = rotator.step(Trigger::Command(Command::NextCollection)).unwrap();
        assert_eq!(settings.alignment, Alignment::TopLeft);
        let defaults = &fx.document()["profiles"]["defaults"];
        assert_eq!(defaults["backgroundImageOpacity"], serde_json::json!(0));
        assert_eq!(defaults["backgroundImageAlignment"], serde_json::json!("topLeft"));
        assert_eq!(defaults["backgroundImageStretchMode"], serde_json::json!("uniformToFill"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_rotates_on_timer_until_quit() {
        let fx = Fixture::new();
        let mut rotator = fx.rotator(vec![fx.collection("walls", &["a.png", "b.png"])], RuntimeOverride::default());
        let (tx, mut rx) = mpsc::channel(8);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(61)).await;
            tx.send(keys::QUIT).await.unwrap();
        });

        rotator.run(&mut rx).await.unwrap();
        assert_eq!(rotator.state(), LoopState::Stopped);
        assert_eq!(fx.shown(), "b.png");
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_command_restarts_countdown() {
        let fx = Fixture::new();
        let mut rotator = fx.rotator(vec![fx.collection("walls", &["a.png", "b.png"])], RuntimeOverride::default());
        let (tx, mut rx) = mpsc::channel(8);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(50)).await;
            tx.send(keys::NEXT_IMAGE).await.unwrap();
            // Without the reset the timer would have fired at 60s
            tokio::time::sleep(Duration::from_secs(50)).await;
            tx.send(keys::QUIT).await.unwrap();
        });

        rotator.run(&mut rx).await.unwrap();
        assert_eq!(fx.shown(), "b.png");
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_and_unknown_keys() {
        let fx = Fixture::new();
        let first = fx.collection("first", &["a.png", "b.png"]);
        let second = fx.collection("second", &["c.png"]);
        let mut rotator = fx.rotator(vec![first, second], RuntimeOverride::default());
        let (tx, mut rx) = mpsc::channel(8);

        for key in ['x', keys::NEXT_COLLECTION, keys::PREVIOUS_IMAGE, keys::DEBUG_STATE, keys::QUIT] {
            tx.send(key).await.unwrap();
        }
        rotator.run(&mut rx).await.unwrap();

        // N -> c.png, p -> back across the boundary to b.png
        assert_eq!(fx.shown(), "b.png");
        assert_eq!(rotator.traversal().cursor().collection, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_key_stream_stops_loop() {
        let fx = Fixture::new();
        let mut rotator = fx.rotator(vec![fx.collection("walls", &["a.png"])], RuntimeOverride::default());
        let (tx, mut rx) = mpsc::channel::<char>(1);
        drop(tx);

        rotator.run(&mut rx).await.unwrap();
        assert_eq!(rotator.state(), LoopState::Stopped);
        assert_eq!(fx.shown(), "a.png");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_rotator_cannot_restart() {
        let fx = Fixture::new();
        let mut rotator = fx.rotator(vec![fx.collection("walls", &["a.png"])], RuntimeOverride::default());
        let (tx, mut rx) = mpsc::channel(1);
        tx.send(keys::QUIT).await.unwrap();
        rotator.run(&mut rx).await.unwrap();

        tx.send(keys::QUIT).await.unwrap();
        assert!(rotator.run(&mut rx).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_failure_keeps_loop_running() {
        let fx = Fixture::new();
        let overrides = RuntimeOverride {
            profile: Some(ProfileTarget::List(NonZeroUsize::new(3).unwrap())),
            ..RuntimeOverride::default()
        };
        let mut rotator = fx.rotator(vec![fx.collection("walls", &["a.png", "b.png"])], overrides);
        let (tx, mut rx) = mpsc::channel(8);
        for key in [keys::NEXT_IMAGE, keys::NEXT_IMAGE, keys::QUIT] {
            tx.send(key).await.unwrap();
        }

        rotator.run(&mut rx).await.unwrap();
        assert_eq!(fs::read_to_string(&fx.settings).unwrap(), SETTINGS);
        // Cursor still moved: two nexts on two images wrap back to the start
        assert_eq!(rotator.traversal().cursor().image, 0);
    }

    #[test]
    fn test_non_transition_commands_do_not_publish() {
        let fx = Fixture::new();
        let mut rotator = fx.rotator(vec![fx.collection("walls", &["a.png", "b.png"])], RuntimeOverride::default());

        for command in [Command::Help, Command::DebugState, Command::Quit] {
            let settings = rotator.step(Trigger::Command(command)).unwrap();
            assert_eq!(settings.alignment, Alignment::Center);
        }
        assert_eq!(fs::read_to_string(&fx.settings).unwrap(), SETTINGS);
        assert_eq!(rotator.traversal().cursor().image, 0);
        assert!(rotator.describe().contains("(0 transitions)"));
    }

    #[test]
    fn test_publish_to_numbered_profile() {
        let fx = Fixture::new();
        let overrides = RuntimeOverride {
            profile: Some(ProfileTarget::List(NonZeroUsize::new(2).unwrap())),
            ..RuntimeOverride::default()
        };
        let mut rotator = fx.rotator(vec![fx.collection("walls", &["a.png"])], overrides);
        rotator.step(Trigger::Start).unwrap();

        let document = fx.document();
        assert_eq!(document["profiles"]["list"][0], serde_json::json!({ "name": "pwsh" }));
        assert!(document["profiles"]["list"][1]["backgroundImage"].as_str().unwrap().ends_with("a.png"));
        assert_eq!(document["theme"], serde_json::json!("dark"));
    }

    #[test]
    fn test_describe_marks_active_collection() {
        let fx = Fixture::new();
        let first = fx.collection("first", &["a.png"]);
        let second = fx.collection("second", &["b.png"]);
        let mut rotator = fx.rotator(vec![first, second], RuntimeOverride::default());
        rotator.step(Trigger::Command(Command::NextCollection)).unwrap();

        let text = rotator.describe();
        assert!(text.contains("state:        Idle (1 transitions)"));
        let active: Vec<&str> = text.lines().filter(|l| l.trim_start().starts_with('>')).collect();
        assert_eq!(active.len(), 1);
        assert!(active[0].contains("second"));
    }
}
