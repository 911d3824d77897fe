use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;

use crate::cli::args::{CliArgs, Command, FormatKind};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::export::{self, DirectorySink, QuotePolicy};
use crate::fetch::{self, FetchOptions, RemoteFetch};
use crate::format;
use crate::html::Page;
use crate::notify::{Severity, TerminalNotifier, DEFAULT_DURATION};
use crate::page::{self, DEFAULT_REFRESH_INTERVAL};
use crate::service::{Toolkit, ToolkitSettings};
use crate::sort::SortDirection;
use crate::validate;

const DEFAULT_FILENAME: &str = "logs.csv";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<12}: {}", label, value);
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[derive(Clone, Debug)]
struct RunConfig {
    command: Command,
    config_path: Option<PathBuf>,
    no_color: bool,
    base_url: Option<reqwest::Url>,
    notification_duration: Duration,
    refresh_interval: Duration,
    fetch_timeout: Option<Duration>,
    quote_policy: QuotePolicy,
    export_dir: String,
    default_filename: String,
}

fn secs_or_none(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let base_url = match cfg.base_url.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            reqwest::Url::parse(raw).map_err(|e| format!("invalid base_url '{raw}': {e}"))?,
        ),
        _ => None,
    };

    let notification_duration = cfg
        .notification_duration_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DURATION);
    let refresh_interval = cfg
        .refresh_interval_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_REFRESH_INTERVAL);

    let fetch_timeout = match &args.command {
        Command::Fetch {
            timeout: Some(secs),
            ..
        } => secs_or_none(*secs),
        _ => secs_or_none(cfg.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)),
    };

    let cli_policy = match &args.command {
        Command::Export { quote_policy, .. } => quote_policy.clone(),
        _ => None,
    };
    let quote_policy = match cli_policy.or(cfg.quote_policy) {
        Some(raw) => QuotePolicy::parse(&raw)
            .ok_or_else(|| format!("invalid quote_policy '{raw}', expected doubled or verbatim"))?,
        None => QuotePolicy::default(),
    };

    let (cli_dir, cli_filename) = match &args.command {
        Command::Export {
            out_dir, output, ..
        } => (out_dir.clone(), output.clone()),
        _ => (None, None),
    };
    let export_dir = config::expand_tilde_string(
        cli_dir
            .or(cfg.export_dir)
            .unwrap_or_else(|| ".".to_string())
            .as_str(),
    );
    let default_filename = cli_filename
        .or(cfg.default_filename)
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

    let config_path = args
        .config
        .as_deref()
        .map(config::expand_tilde)
        .or_else(config::default_config_path);

    Ok(RunConfig {
        command: args.command,
        config_path,
        no_color,
        base_url,
        notification_duration,
        refresh_interval,
        fetch_timeout,
        quote_policy,
        export_dir,
        default_filename,
    })
}

fn build_toolkit(run: &RunConfig, notifier: Arc<TerminalNotifier>) -> Result<Toolkit, String> {
    let client = fetch::build_client(run.fetch_timeout).map_err(|e| e.to_string())?;
    let mut fetcher = RemoteFetch::new(client, notifier.clone());
    if let Some(base) = run.base_url.clone() {
        fetcher = fetcher.with_base_url(base);
    }
    let sink = Arc::new(DirectorySink::new(run.export_dir.clone()));
    Ok(Toolkit::new(
        notifier,
        fetcher,
        sink,
        ToolkitSettings {
            quote_policy: run.quote_policy,
            notification_duration: run.notification_duration,
        },
    ))
}

fn load_page(input: &str) -> Result<Page, String> {
    Page::load(&config::expand_tilde_string(input)).map_err(|e| e.to_string())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let notifier = Arc::new(TerminalNotifier::new());
    let toolkit = build_toolkit(&run, notifier.clone())?;

    match run.command.clone() {
        Command::Export {
            input, table_id, ..
        } => {
            let page = load_page(&input)?;
            toolkit
                .export_table_to_csv(&page, &run.default_filename, table_id.as_deref())
                .map_err(|e| e.to_string())?;
            toolkit.show_notification(
                &format!(
                    "Exported {} to {}",
                    run.default_filename.bold(),
                    run.export_dir
                ),
                Severity::Success,
                None,
            );
        }
        Command::Sort {
            input,
            table_id,
            column,
            descending,
        } => {
            let page = load_page(&input)?;
            let direction = SortDirection::from_ascending(!descending);
            let sorted = toolkit
                .sort_table(&page, table_id.as_deref(), column, direction)
                .map_err(|e| e.to_string())?;
            let label = sorted
                .headers
                .get(sorted.outcome.column)
                .map(|h| h.trim().to_string())
                .unwrap_or_else(|| format!("#{}", sorted.outcome.column));
            format_kv_line("Column", &label);
            format_kv_line("Direction", sorted.outcome.direction.css_class());
            println!();
            println!(
                "{}",
                export::serialize(&sorted.outcome.table, run.quote_policy)
            );
        }
        Command::Fetch {
            url,
            method,
            header,
            data,
            ..
        } => {
            let mut options = FetchOptions::default();
            if let Some(m) = method {
                let parsed = reqwest::Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes())
                    .map_err(|_| format!("invalid method '{m}'"))?;
                options = options.method(parsed);
            }
            for line in header.iter() {
                if let Some((k, v)) = fetch::parse_header_line(line) {
                    options = options.header(k, v);
                }
            }
            options.body = data;
            let value = toolkit
                .fetch_data(&url, options)
                .await
                .map_err(|e| e.to_string())?;
            let pretty = serde_json::to_string_pretty(&value)
                .map_err(|e| format!("failed to render response: {e}"))?;
            println!("{pretty}");
        }
        Command::Validate { input, form } => {
            let page = load_page(&input)?;
            let mut fields = page
                .form_fields(&form)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("no form matches '{form}'"))?;
            crate::mask::apply_masks(&mut fields);
            let report = validate::validate_with_report(&mut fields);
            format_kv_line("Fields", &fields.len().to_string());
            format_kv_line("Valid", format_bool(report.valid));
            for name in report.invalid_fields.iter() {
                println!("   {} {}", "is-invalid".red(), name);
            }
            if !report.valid {
                return Err(format!(
                    "{} required field(s) are blank",
                    report.invalid_fields.len()
                ));
            }
        }
        Command::Inspect { input } => {
            let page = load_page(&input)?;
            let today = chrono::Local::now().date_naive();
            let setup = page::scan(&page, today, run.refresh_interval).map_err(|e| e.to_string())?;
            format_kv_line("Tooltips", &setup.tooltips.len().to_string());
            for t in setup.tooltips.iter() {
                println!("   <{}> {}", t.tag, t.title);
            }
            format_kv_line("Confirm", &setup.destructive_forms.join(", "));
            if let Some(range) = setup.date_range.as_ref() {
                format_kv_line("Date from", &range.date_from);
                format_kv_line("Date to", &range.date_to);
            }
            match setup.auto_refresh {
                Some(refresh) => format_kv_line(
                    "Refresh",
                    &format!("every {}ms (skipped while hidden)", refresh.interval.as_millis()),
                ),
                None => format_kv_line("Refresh", "off"),
            }
        }
        Command::InitConfig => {
            let path = run
                .config_path
                .clone()
                .ok_or("cannot locate a home directory; pass --config")?;
            let existed = path.exists();
            config::ensure_default_config_file(&path).map_err(|e| e.to_string())?;
            format_kv_line("Config", &path.display().to_string());
            format_kv_line("Created", format_bool(!existed));
        }
        Command::Format { kind } => match kind {
            FormatKind::Bytes { bytes, decimals } => {
                println!("{}", format::format_bytes(bytes, decimals))
            }
            FormatKind::Duration { seconds } => println!("{}", format::format_duration(seconds)),
            FormatKind::Date { value } => {
                println!("{}", format::format_date(&value).map_err(|e| e.to_string())?)
            }
        },
    }

    tracing::debug!(banners = notifier.center().len(), "done");
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    crate::logging::init(args.verbose, args.no_color);

    // init-config is how a missing explicit config gets created.
    let init = matches!(args.command, Command::InitConfig);
    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, init).map_err(|e| e.to_string())?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true).map_err(|e| e.to_string())?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
