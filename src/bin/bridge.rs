use servobus::config::ArmConfig;
use servobus::controller::ArmController;
use servobus::driver::TraceDriver;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::time;
use tracing::{error, info, warn};

const TCP_PORT: u16 = 8090;
const READ_CHUNK_SIZE: usize = 256;

type SharedController = Arc<Mutex<ArmController<TraceDriver>>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            let config: ArmConfig = serde_json::from_str(&raw)?;
            info!("loaded channel table from {path}");
            config
        }
        None => ArmConfig::braccio(),
    };

    let controller = ArmController::new(&config, TraceDriver::new())?;
    let greeting = controller.greeting();
    info!("{greeting}");

    let controller: SharedController = Arc::new(Mutex::new(controller));
    let started = Instant::now();

    // Stepper cadence: the tick itself is gated, so driving it at the step
    // interval is enough and calling faster would only produce no-ops.
    let tick_controller = Arc::clone(&controller);
    let step_interval = Duration::from_millis(config.step_interval_ms.max(1));
    let _stepper_task = tokio::spawn(async move {
        let mut interval = time::interval(step_interval);
        loop {
            interval.tick().await;
            let now_ms = started.elapsed().as_millis() as u64;
            let mut guard = tick_controller.lock().await;
            let _ = guard.tick(now_ms);
        }
    });

    let listener = TcpListener::bind(format!("127.0.0.1:{TCP_PORT}")).await?;
    info!("serial bridge listening on port {TCP_PORT}");

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("host connected: {addr}");
                let client_controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    if let Err(e) = handle_host(stream, client_controller).await {
                        warn!("host {addr} error: {e}");
                    }
                    info!("host {addr} disconnected");
                });
            }
            Err(e) => {
                error!("failed to accept connection: {e}");
            }
        }
    }
}

async fn handle_host(
    mut stream: TcpStream,
    controller: SharedController,
) -> Result<(), Box<dyn std::error::Error>> {
    // One-time greeting, mirroring the firmware's startup banner.
    let greeting = {
        let guard = controller.lock().await;
        guard.greeting()
    };
    stream.write_all(greeting.as_bytes()).await?;
    stream.write_all(b"\n").await?;

    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let mut guard = controller.lock().await;
                guard.push_bytes(&chunk[..n]);
                let stats = *guard.stats();
                drop(guard);
                info!(
                    lines = stats.lines_parsed,
                    applied = stats.segments_applied,
                    dropped = stats.segments_dropped,
                    "command intake"
                );
            }
            Err(e) => {
                warn!("read error: {e}");
                break;
            }
        }
    }

    Ok(())
}
