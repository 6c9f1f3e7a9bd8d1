use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use snmpfs::metrics;
use snmpfs::run_bringup;
use snmpfs::EmptyMib;
use snmpfs::Error;
use snmpfs::MibResolver;
use snmpfs::Result;
use snmpfs::Settings;
use snmpfs::SimSessionFactory;
use snmpfs::SnmpFs;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let settings = Settings::load(args.get(1).map(String::as_str))?;
    settings.validate()?;

    // Initializing Logs
    let _guard = init_observability(&settings.log_dir)?;

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    // The wire transport is external; the bundled factory simulates one
    // demo device per configured entry.
    let factory = Arc::new(SimSessionFactory::new("public"));
    let resolver: Arc<dyn MibResolver> = Arc::new(EmptyMib);
    let fs = SnmpFs::new(settings.clone(), factory, resolver);

    if settings.monitoring.prometheus_enabled {
        let port = settings.monitoring.prometheus_port;
        let shutdown = graceful_rx.clone();
        tokio::spawn(async move {
            metrics::start_server(port, shutdown).await;
        });
    }

    // Trap feed: the external listener pushes decoded PDUs into this
    // channel; the receiver's handler chain does the rest. The sender
    // half stays alive for the process lifetime.
    let mut _trap_feed: Option<mpsc::Sender<snmpfs::TrapPdu>> = None;
    if settings.trap.enabled {
        let (trap_tx, trap_rx) = mpsc::channel(64);
        _trap_feed = Some(trap_tx);
        let receiver = fs.trap_receiver();
        let shutdown = graceful_rx.clone();
        tokio::spawn(async move {
            receiver.run(trap_rx, shutdown).await;
        });
    }

    fs.start()?;

    let bringup = tokio::spawn(run_bringup(fs.clone(), graceful_rx.clone()));

    info!("Application started. Waiting for CTRL+C signal...");
    // Listen on Shutdown Signal
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    let mut graceful_rx = graceful_rx;
    let _ = graceful_rx.changed().await;

    if let Err(e) = bringup.await {
        error!("bring-up task failed: {:?}", e);
    }
    fs.shutdown().await;

    println!("Exiting program.");
    Ok(())
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    info!("Shutdown server..");
    let mut sigint = signal(SignalKind::interrupt()).expect("signal handler can be installed");
    let mut sigterm = signal(SignalKind::terminate()).expect("signal handler can be installed");
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    graceful_tx.send(()).map_err(|e| {
        error!("Failed to send shutdown signal: {}", e);
        Error::Fatal(format!("Failed to send shutdown signal: {}", e))
    })?;

    info!("Shutdown completed");
    Ok(())
}

pub fn init_observability(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| Error::Fatal(format!("could not create log dir: {e}")))?;
    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_dir.join("snmpfs.log"))
        .map_err(|e| Error::Fatal(format!("could not open log file: {e}")))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(guard)
}
