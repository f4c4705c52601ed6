use anyhow::Result;
use clap::Parser;
use trackshare_page::api::ApiClient;
use trackshare_page::config::{ConfigManager, PageConfig};
use trackshare_page::logging::{self, LogConfig};
use trackshare_page::page::{PageBody, PageEvent, View};
use trackshare_page::{PageDriver, Services};
use trackshare_types::{DisplayMode, UserId};

/// TrackShare profile page - load one user's profile the way the web page does
#[derive(Parser)]
#[command(name = "trackshare-page")]
#[command(about = "Resolve a TrackShare profile and print what the page would show")]
#[command(version)]
struct Cli {
    /// Name of the profile to open
    username: String,

    /// Id of the signed-in viewer; omit to browse anonymously
    #[arg(long, env = "TRACKSHARE_VIEWER_ID")]
    viewer_id: Option<i64>,

    /// Server URL to connect to
    #[arg(long, short, env = "TRACKSHARE_SERVER_URL")]
    server: Option<String>,

    /// Session token sent with every request
    #[arg(long, env = "TRACKSHARE_SESSION_TOKEN")]
    session_token: Option<String>,

    /// Refresh attempts for a freshly shared post
    #[arg(long)]
    max_refreshes: Option<u32>,

    /// Tab to open: shares, followers, following or history
    #[arg(long, default_value = "shares", value_parser = parse_tab)]
    tab: DisplayMode,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

fn parse_tab(s: &str) -> Result<DisplayMode, String> {
    DisplayMode::parse(s).ok_or_else(|| format!("unknown tab '{}'", s))
}

// Pick up TRACKSHARE_* variables from a local .env file
fn load_env() {
    let _ = dotenv::dotenv();
}

fn load_config() -> PageConfig {
    match ConfigManager::new().and_then(|manager| manager.load_or_default()) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Falling back to default config: {}", e);
            PageConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    logging::init_logging(&log_config)?;

    let mut config = load_config();
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if cli.session_token.is_some() {
        config.session_token = cli.session_token;
    }
    if let Some(max) = cli.max_refreshes {
        config.max_increment_refreshes = max;
    }

    log::info!("Opening profile {} on {}", cli.username, config.server_url);

    let client = ApiClient::from_config(&config);
    let mut driver = PageDriver::mount(
        cli.username,
        cli.viewer_id.map(UserId),
        None,
        config.page_options(log_config),
        Services::from_backend(client),
    );
    driver.dispatch(PageEvent::SelectTab(cli.tab));
    driver.settle().await;

    print_view(driver.page().view());
    Ok(())
}

fn print_view(view: View<'_>) {
    match view {
        View::Guest => println!("Not signed in; pass --viewer-id to open a profile"),
        View::Pending => println!("Viewer profile still loading"),
        View::Error { error, .. } => println!("Error: {}", error),
        View::NotFound { viewer } => {
            println!("Signed in as {}; no such user", viewer.username)
        }
        View::Profile(profile) => {
            let header = profile.header;
            println!(
                "{} ({}) - {} shares, viewed by {}",
                header.username,
                header
                    .owner_id
                    .map_or_else(|| "unresolved".to_string(), |id| id.to_string()),
                header.share_count,
                profile.viewer.username
            );
            match profile.body {
                PageBody::Shares(items) => {
                    for item in items {
                        println!("  {} - {} [{}]", item.title, item.creator, item.id);
                    }
                }
                PageBody::FollowList { follow_type, .. } => {
                    println!("  showing {}", follow_type.as_str())
                }
                PageBody::History { .. } => println!("  showing listening history"),
            }
            if let Some(notice) = profile.notice {
                println!("Notice: {}", notice);
            }
        }
    }
}
