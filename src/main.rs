use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crewwatch::config::Settings;
use crewwatch::events;
use crewwatch::gateway::{GatewayClient, OverallState};
use crewwatch::logging::{init_logging, LogTarget};
use crewwatch::notify;
use crewwatch::ui;
use crewwatch::{App, DataSource, GatewaySource};

#[derive(Parser, Debug)]
#[command(name = "crewwatch")]
#[command(about = "Terminal dashboard for astronaut crew monitoring")]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gateway base URL
    #[arg(short, long)]
    gateway: Option<String>,

    /// Polling interval (e.g., "60s", "500ms", "2m")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Request timeout (e.g., "10s")
    #[arg(long)]
    timeout: Option<String>,

    /// Visual alerts only
    #[arg(long)]
    no_sound: bool,

    /// Do not re-alert on astronauts that stay CRITICO
    #[arg(long)]
    no_sustained_alerts: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export crew state to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref url) = self.gateway {
            settings.gateway.base_url = url.clone();
        }
        if let Some(ref refresh) = self.refresh {
            settings.refresh = refresh.clone();
        }
        if let Some(ref timeout) = self.timeout {
            settings.gateway.timeout = timeout.clone();
        }
        if self.no_sound {
            settings.alerts.sound = false;
        }
        if self.no_sustained_alerts {
            settings.alerts.sustained_critical = false;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    let refresh = settings.refresh_interval()?;
    let client = GatewayClient::builder()
        .endpoint(settings.gateway.base_url.clone())
        .timeout(settings.request_timeout()?)
        .build()
        .context("Failed to build gateway client")?;

    let rt = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        let target = args
            .log_file
            .clone()
            .map(LogTarget::File)
            .unwrap_or(LogTarget::Stderr);
        init_logging(target)?;
        return rt.block_on(export_to_file(&client, export_path));
    }

    init_logging(LogTarget::for_tui(args.log_file.clone()))?;
    info!(
        gateway = client.endpoint(),
        refresh = ?refresh,
        sound = settings.alerts.sound,
        sustained_critical = settings.alerts.sustained_critical,
        "starting crewwatch"
    );

    // The worker task runs on the runtime while the TUI owns the main thread
    let _guard = rt.enter();
    let source = GatewaySource::spawn(client, refresh);
    let notifier = notify::from_settings(settings.alerts.sound);

    run_tui(Box::new(source), notifier, settings.alerts.sustained_critical)
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    notifier: Box<dyn notify::Notifier>,
    sustained_critical: bool,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, notifier, sustained_critical);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        // Updates drive the detector before the frame is drawn
        app.reload_data();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                // Content starts after header (1) + tabs (1)
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, 2),
                _ => {}
            }
        }
    }

    info!("crewwatch stopped");
    Ok(())
}

/// Fetch the dashboard documents and write them to a JSON file
async fn export_to_file(client: &GatewayClient, export_path: &Path) -> Result<()> {
    let (crew, dashboard, statistics) = tokio::join!(
        client.crew_status(),
        client.dashboard(),
        client.crew_statistics()
    );

    let crew = crew.context("Failed to fetch crew status")?;

    let optional = |name: &str, value: serde_json::Result<serde_json::Value>| match value {
        Ok(v) => v,
        Err(e) => {
            warn!(document = name, error = %e, "failed to encode document");
            serde_json::Value::Null
        }
    };
    let dashboard = match dashboard {
        Ok(d) => optional("dashboard", serde_json::to_value(d)),
        Err(e) => {
            warn!(error = %e, "dashboard unavailable, exporting without it");
            serde_json::Value::Null
        }
    };
    let statistics = match statistics {
        Ok(s) => optional("crewStatistics", serde_json::to_value(s)),
        Err(e) => {
            warn!(error = %e, "crew statistics unavailable, exporting without them");
            serde_json::Value::Null
        }
    };

    let count = |state: OverallState| crew.crew_members.iter().filter(|m| m.status == state).count();
    let summary = serde_json::json!({
        "total": crew.crew_members.len(),
        "optimal": count(OverallState::Optimo),
        "stressed": count(OverallState::Estresado),
        "critical": count(OverallState::Critico),
    });

    let export = serde_json::json!({
        "gateway": client.endpoint(),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "summary": summary,
        "crewStatus": crew,
        "dashboard": dashboard,
        "crewStatistics": statistics,
    });

    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    info!(path = %export_path.display(), "export written");
    println!("Exported crew state to: {}", export_path.display());
    Ok(())
}
