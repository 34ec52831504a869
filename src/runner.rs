//! Bridge runner - wires config, store, surfaces and the engine for one process

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dartbridge_app::config::{self, Settings};
use dartbridge_app::signals;
use dartbridge_app::surface::{ConsoleToggle, FileSink, FileSource};
use dartbridge_app::{Engine, FileStore, Message};
use dartbridge_core::prelude::*;
use dartbridge_core::Role;

use crate::stdin::spawn_stdin_reader_blocking;

/// What the command line asked for
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub workdir: PathBuf,
    /// Forced role; detected from the surfaces present when `None`
    pub role: Option<Role>,
    /// Enable the bridge right after startup
    pub enable: bool,
}

/// Decide this process's role
pub fn resolve_role(options: &RunOptions, settings: &Settings) -> Result<Role> {
    if let Some(role) = options.role {
        return Ok(role);
    }

    let source = settings.source.resolve_file(&options.workdir);
    let sink = settings.sink.resolve_dir(&options.workdir);
    Role::detect(&source, &sink)
}

/// Build the engine for `role` on top of a file store
pub fn build_engine(options: &RunOptions, settings: Settings, role: Role) -> Result<Engine> {
    let store_dir = settings.store.resolve_dir(&options.workdir);
    let mut store = FileStore::open(&store_dir)?;
    if let Err(e) = store.watch(settings.store.debounce()) {
        warn!("Failed to watch store: {}", e);
    }
    info!("Store: {}", store_dir.display());

    let builder = Engine::builder(role, Arc::new(store)).settings(settings.clone());
    let builder = match role {
        Role::Producer => {
            let path = settings.source.resolve_file(&options.workdir);
            info!("Source: {}", path.display());
            builder.source(Arc::new(Mutex::new(FileSource::new(path))))
        }
        Role::Consumer => {
            let dir = settings.sink.resolve_dir(&options.workdir);
            info!("Sink: {}", dir.display());
            builder
                .sink(Arc::new(Mutex::new(FileSink::new(dir))))
                .toggle(Box::new(ConsoleToggle::stdout()))
        }
    };

    builder.build()
}

/// Run one bridge context until quit or a termination signal
pub async fn run_bridge(options: RunOptions) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("Dart bridge starting");
    info!("Working directory: {}", options.workdir.display());
    info!("═══════════════════════════════════════════════════════");

    let settings = config::load_settings(&options.workdir);
    let role = resolve_role(&options, &settings)?;
    info!("Role: {}", role);

    let mut engine = build_engine(&options, settings, role)?;

    signals::spawn_signal_handler(engine.msg_sender());

    let stdin_tx = engine.msg_sender();
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(stdin_tx);
    });

    if options.enable {
        engine.process_message(Message::SetEnabled(true));
    }

    engine.run().await;

    info!("Dart bridge exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dartbridge_app::BridgePhase;
    use tempfile::tempdir;

    fn options(workdir: PathBuf) -> RunOptions {
        RunOptions {
            workdir,
            role: None,
            enable: false,
        }
    }

    #[test]
    fn test_role_from_source_file() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("source.txt"), "").unwrap();

        let opts = options(temp.path().to_path_buf());
        let role = resolve_role(&opts, &Settings::default()).unwrap();
        assert_eq!(role, Role::Producer);
    }

    #[test]
    fn test_forced_role_wins() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("source.txt"), "").unwrap();
        std::fs::create_dir(temp.path().join("sink")).unwrap();

        let mut opts = options(temp.path().to_path_buf());
        assert!(resolve_role(&opts, &Settings::default()).is_err());

        opts.role = Some(Role::Consumer);
        assert_eq!(
            resolve_role(&opts, &Settings::default()).unwrap(),
            Role::Consumer
        );
    }

    #[test]
    fn test_no_surface_is_fatal() {
        let temp = tempdir().unwrap();
        let opts = options(temp.path().to_path_buf());
        let err = resolve_role(&opts, &Settings::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_build_consumer_engine() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("sink")).unwrap();
        let opts = options(temp.path().to_path_buf());

        let mut engine = build_engine(&opts, Settings::default(), Role::Consumer).unwrap();
        assert_eq!(engine.phase(), BridgePhase::Disabled);
        assert!(temp.path().join(".dartbridge/store").is_dir());

        engine.shutdown().await;
    }
}
