use std::sync::Arc;

use tracing::{info, warn};
use wavebody::api::next_snapshot;
use wavebody::{
    init_logging, CsvFormatter, DetectionSession, DetectionSnapshot, JsonFormatter, MockScanProvider,
    OutputFormat, Position, ScanProvider, SessionConfig, SourceKind, TextFormatter, UnsupportedScanProvider,
};

struct DemoOptions {
    config_path: Option<String>,
    cycles: u64,
    interval_ms: Option<u64>,
    unsupported: bool,
    format: OutputFormat,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [config.json] [--cycles N] [--interval-ms MS] [--format text|json|csv] [--unsupported]"
    )
}

fn parse_args(args: &[String]) -> Result<DemoOptions, Box<dyn std::error::Error>> {
    let mut options = DemoOptions {
        config_path: None,
        cycles: 3,
        interval_ms: None,
        unsupported: false,
        format: OutputFormat::Text,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--cycles" => {
                options.cycles = iter.next().ok_or("--cycles needs a value")?.parse()?;
            }
            "--interval-ms" => {
                options.interval_ms = Some(iter.next().ok_or("--interval-ms needs a value")?.parse()?);
            }
            "--format" => {
                options.format = iter.next().ok_or("--format needs a value")?.parse()?;
            }
            "--json" => options.format = OutputFormat::Json,
            "--unsupported" => options.unsupported = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{flag}'").into()),
            path => options.config_path = Some(path.to_string()),
        }
    }

    Ok(options)
}

/// Mock provider with two bodies and matching Bluetooth tags
fn demo_provider(config: &SessionConfig) -> MockScanProvider {
    let provider = MockScanProvider::new();
    provider.add_subject(&config.emitters, Position::new(2.0, 0.5, -1.0), config.path_loss_exponent, 3.0);
    provider.add_subject(&config.emitters, Position::new(-4.0, 0.5, 3.0), config.path_loss_exponent, 1.5);
    provider.add_reading(SourceKind::Bluetooth, "tag-1", -68.0);
    provider.add_reading(SourceKind::Bluetooth, "tag-2", -74.0);
    provider
}

fn render(format: OutputFormat, snapshot: &DetectionSnapshot) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Text => TextFormatter {
            include_diagnostics: true,
            compact: false,
        }
        .format_text(snapshot),
        OutputFormat::Json => JsonFormatter::pretty().format_json(snapshot)?,
        OutputFormat::Csv => CsvFormatter {
            include_header: snapshot.cycle == 1,
        }
        .format_csv(snapshot),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("wavebody", |s| s.as_str()).to_string();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{}", usage(&program));
            return Err(err);
        }
    };

    init_logging("wavebody=info")?;

    let mut config = match &options.config_path {
        Some(path) => SessionConfig::load_from_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(interval_ms) = options.interval_ms {
        config.cycle_interval_ms = interval_ms;
    }

    let provider: Arc<dyn ScanProvider> = if options.unsupported {
        Arc::new(UnsupportedScanProvider)
    } else {
        Arc::new(demo_provider(&config))
    };

    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    runtime.block_on(async move {
        let wait = config.cycle_interval() + config.scan_timeout() * 2;
        let session = Arc::new(DetectionSession::new(Arc::new(config), provider)?);
        info!(emitters = session.emitters().len(), cycles = options.cycles, "starting detection demo");

        let mut rx = session.subscribe();
        let handle = session.clone().start();

        for _ in 0..options.cycles {
            let Some(snapshot) = next_snapshot(&mut rx, wait).await else {
                warn!("no snapshot published in time");
                break;
            };
            println!("{}", render(options.format, &snapshot)?);
        }

        handle.shutdown().await;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
