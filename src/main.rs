use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use pushapp_bridge::bridge::{Bridge, Params, required_rect};
use pushapp_bridge::config::BridgeConfig;
use pushapp_bridge::headless::HeadlessHost;
use pushapp_bridge::logging;
use pushapp_bridge::overlay::{ContentTarget, OverlayKind, OverlayManager};
use pushapp_bridge::rect::Rect;
use pushapp_bridge::repl::readline;
use pushapp_bridge::sdk::RecordingSdk;
use pushapp_bridge::window::{HostWindow, WindowId};

/// Everything the shell drives
struct Shell {
    config: BridgeConfig,
    host: HeadlessHost,
    bridge: Bridge,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let config = BridgeConfig::load();

    let overlays = OverlayManager::start(config.overlay.clone()).map_err(|e| e.to_string())?;
    let sdk = Arc::new(RecordingSdk::new(format!("pushapp-shell-{}", std::process::id())));
    let shell = Shell {
        config,
        host: HeadlessHost::new(),
        bridge: Bridge::new(sdk, overlays),
    };

    loop {
        let Some(line) = readline()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &shell).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    shell.bridge.shutdown().await;
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "pushapp bridge shell")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args)]
struct RectArgs {
    #[arg(short, long, allow_negative_numbers = true)]
    x: f64,
    #[arg(short, long, allow_negative_numbers = true)]
    y: f64,
    #[arg(short, long, allow_negative_numbers = true)]
    width: f64,
    #[arg(short = 'H', long, allow_negative_numbers = true)]
    height: f64,
}

impl RectArgs {
    /// Same checks a bridge registration applies
    fn rect(&self) -> Result<Rect, String> {
        let mut params = Params::new();
        params.insert("x".to_string(), json!(self.x));
        params.insert("y".to_string(), json!(self.y));
        params.insert("width".to_string(), json!(self.width));
        params.insert("height".to_string(), json!(self.height));
        required_rect(&params).map_err(|e| e.to_string())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open a window and bring it to the foreground
    Open,
    /// Bring an open window to the foreground
    Focus { window: u64 },
    /// Leave no window in the foreground
    Blur,
    /// Destroy a window
    Close { window: u64 },
    Init {
        #[arg(short, long)]
        identifier: Option<String>,
        #[arg(short, long)]
        sandbox: bool,
    },
    Login {
        user_id: String,
    },
    Page {
        name: String,
    },
    Event {
        name: String,
        /// Event data as a JSON object
        #[arg(short, long, default_value = "{}")]
        data: String,
    },
    Headers,
    Placeholder {
        id: String,
        #[command(flatten)]
        rect: RectArgs,
    },
    Unplaceholder {
        id: String,
    },
    Tooltip {
        id: String,
        #[command(flatten)]
        rect: RectArgs,
    },
    Untooltip {
        id: String,
    },
    /// Move an existing overlay
    Move {
        id: String,
        #[arg(short, long)]
        tooltip: bool,
        #[command(flatten)]
        rect: RectArgs,
    },
    /// Load HTML into the overlay for an id
    Show {
        id: String,
        html: String,
    },
    /// List registered overlays and each window's view tree
    List,
    /// Remove every overlay
    Clear,
    Exit,
}

async fn respond(line: &str, shell: &Shell) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "pushapp".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let bridge = &shell.bridge;
    let overlays = bridge.overlays();

    match cli.command {
        Some(Commands::Open) => {
            let window = shell.host.open_window();
            let report = overlays
                .set_foreground(Some(window.as_window_ref()))
                .await
                .map_err(|e| e.to_string())?;
            println!("opened {} ({} overlays migrated)", window.id(), report.migrated.len());
        }
        Some(Commands::Focus { window }) => {
            let window = shell
                .host
                .window(WindowId(window))
                .ok_or_else(|| format!("no such window: {window}"))?;
            let report = overlays
                .set_foreground(Some(window.as_window_ref()))
                .await
                .map_err(|e| e.to_string())?;
            println!("{} in foreground", window.id());
            for (key, err) in &report.failed {
                println!("  dropped {key}: {err}");
            }
        }
        Some(Commands::Blur) => {
            overlays.set_foreground(None).await.map_err(|e| e.to_string())?;
            println!("no foreground window");
        }
        Some(Commands::Close { window }) => {
            let window = shell
                .host
                .window(WindowId(window))
                .ok_or_else(|| format!("no such window: {window}"))?;
            window.destroy();
            let dropped = overlays
                .window_destroyed(window.id())
                .await
                .map_err(|e| e.to_string())?;
            println!("closed {} ({dropped} overlays dropped)", window.id());
        }
        Some(Commands::Init { identifier, sandbox }) => {
            let identifier = identifier.unwrap_or_else(|| shell.config.identifier.clone());
            let sandbox = sandbox || shell.config.sandbox;
            let params = json!({ "identifier": identifier, "sandbox": sandbox });
            print_result(bridge.call("initialize", &to_params(params)).await);
        }
        Some(Commands::Login { user_id }) => {
            print_result(bridge.call("login", &to_params(json!({ "userId": user_id }))).await);
        }
        Some(Commands::Page { name }) => {
            print_result(bridge.call("setPageName", &to_params(json!({ "pageName": name }))).await);
        }
        Some(Commands::Event { name, data }) => {
            let data: Value = serde_json::from_str(&data).map_err(|e| format!("invalid event data: {e}"))?;
            let params = json!({ "eventName": name, "eventData": data });
            print_result(bridge.call("sendEvent", &to_params(params)).await);
        }
        Some(Commands::Headers) => {
            print_result(bridge.call("getDeviceHeaders", &Params::new()).await);
        }
        Some(Commands::Placeholder { id, rect }) => {
            let params = overlay_params(OverlayKind::Placeholder, &id, Some(&rect));
            print_result(bridge.call("registerPlaceholder", &params).await);
        }
        Some(Commands::Unplaceholder { id }) => {
            let params = overlay_params(OverlayKind::Placeholder, &id, None);
            print_result(bridge.call("unregisterPlaceholder", &params).await);
        }
        Some(Commands::Tooltip { id, rect }) => {
            let params = overlay_params(OverlayKind::TooltipTarget, &id, Some(&rect));
            print_result(bridge.call("registerTooltipTarget", &params).await);
        }
        Some(Commands::Untooltip { id }) => {
            let params = overlay_params(OverlayKind::TooltipTarget, &id, None);
            print_result(bridge.call("unregisterTooltipTarget", &params).await);
        }
        Some(Commands::Move { id, tooltip, rect }) => {
            let kind = if tooltip {
                OverlayKind::TooltipTarget
            } else {
                OverlayKind::Placeholder
            };
            let moved = overlays
                .reposition(kind, &id, rect.rect()?)
                .await
                .map_err(|e| e.to_string())?;
            println!("{} '{}' now at {}", moved.kind, moved.identifier, moved.rect);
        }
        Some(Commands::Show { id, html }) => {
            match overlays.dispatch_content(&id, &html).await.map_err(|e| e.to_string())? {
                ContentTarget::Placeholder { window_id } => {
                    println!("content loaded into placeholder '{id}' on {window_id}")
                }
                ContentTarget::Tooltip { rect } => {
                    let (cx, cy) = rect.center();
                    println!("show tooltip for '{id}' anchored at ({cx}, {cy}) on {rect}")
                }
            }
        }
        Some(Commands::List) => {
            let entries = overlays.entries().await.map_err(|e| e.to_string())?;
            let foreground = overlays.foreground().await.map_err(|e| e.to_string())?;
            match foreground {
                Some(id) => println!("foreground: {id}"),
                None => println!("foreground: none"),
            }
            println!("{} overlays", entries.len());
            for entry in &entries {
                println!(
                    "  {} '{}' {} on {} ({})",
                    entry.kind, entry.identifier, entry.rect, entry.window_id, entry.element
                );
            }
            for window in shell.host.windows() {
                let state = if window.is_alive() { "open" } else { "destroyed" };
                println!("{} [{state}] {} elements", window.id(), window.element_count());
            }
        }
        Some(Commands::Clear) => {
            let removed = overlays.clear().await.map_err(|e| e.to_string())?;
            println!("removed {removed} overlays");
        }
        Some(Commands::Exit) => {
            write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
            std::io::stdout().flush().map_err(|e| e.to_string())?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}

fn to_params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

fn overlay_params(kind: OverlayKind, id: &str, rect: Option<&RectArgs>) -> Params {
    let mut params = Params::new();
    params.insert(kind.id_param().to_string(), json!(id));
    if let Some(rect) = rect {
        params.insert("x".to_string(), json!(rect.x));
        params.insert("y".to_string(), json!(rect.y));
        params.insert("width".to_string(), json!(rect.width));
        params.insert("height".to_string(), json!(rect.height));
    }
    params
}

fn print_result(result: Result<Value, pushapp_bridge::bridge::BridgeError>) {
    match result {
        Ok(value) => println!("{value}"),
        Err(e) => println!("error: {e}"),
    }
}
