use anyhow::{Context, Result};
use connect_common::models::RegisterForm;
use connect_common::ApiClient;
use connect_web::commands::{Command, HELP};
use connect_web::home::{HomeController, HomeOptions, MapClick, PlacementReport};
use connect_web::surface::TerminalLayer;
use connect_web::views::{ToastLine, APP_TITLE};
use connect_web::Config;
use geocoding::OpenCageGeocoder;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(production: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,connect_web=debug".into());

    // stdout belongs to the front-end.
    if production {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.app.is_production());

    info!(
        env = %config.app.env,
        api = %config.api.base_url,
        geocoder = %config.geocoder.base_url,
        "Starting {}",
        APP_TITLE
    );

    let api = ApiClient::new(&config.api.base_url, config.api.timeout)
        .context("Failed to build API client")?;
    let geocoder = OpenCageGeocoder::new(
        &config.geocoder.base_url,
        config.geocoder.api_key.clone(),
        config.geocoder.timeout,
    )
    .context("Failed to build geocoder")?;

    let layer = TerminalLayer::new();
    let home = HomeController::new(
        layer.clone(),
        api,
        Arc::new(geocoder),
        HomeOptions::from(&config.map),
    );

    // Posts are public; load them before anyone signs in.
    let _ = home.refresh_posts().await;
    if let Some(token) = config.api.session_token.clone() {
        match home.restore(token).await {
            Ok(user) => info!(username = %user.username, "session resumed"),
            Err(e) => warn!(error = %e, "stored session rejected"),
        }
    }
    println!("{}", APP_TITLE);
    for toast in home.notifier().drain() {
        println!("{}", ToastLine(&toast));
    }
    println!("{}", home.region_alert());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        run(&home, &layer, command).await;

        for toast in home.notifier().drain() {
            println!("{}", ToastLine(&toast));
        }
        println!("{}", home.region_alert());
    }

    info!("Shutting down");
    Ok(())
}

/// Failures are already reported as toasts.
async fn run(home: &HomeController<TerminalLayer>, layer: &TerminalLayer, command: Command) {
    match command {
        Command::Login { username, password } => {
            let _ = home.login(&username, &password).await;
        }
        Command::Register {
            username,
            email,
            password,
            confirm_password,
            is_mentor,
            profile_photo_url,
        } => {
            let form = RegisterForm {
                username,
                email,
                password,
                confirm_password,
                is_mentor,
                profile_photo_url,
            };
            let _ = home.register(form).await;
        }
        Command::Logout => {
            let _ = home.logout().await;
        }
        Command::Posts => {
            if home.refresh_posts().await.is_ok() {
                for post in home.posts().posts() {
                    println!(
                        "#{} {}: {} -> {} ({} comments)",
                        post.id,
                        post.author.username,
                        post.source.country.name,
                        post.destination.country.name,
                        post.comment_count
                    );
                }
            }
        }
        Command::Click(point) => {
            let report = home.on_map_click(MapClick::at(point)).await;
            match &report.placement {
                PlacementReport::Placed { role, country, .. } => {
                    println!("{} pin: {}", role, country.name)
                }
                PlacementReport::Cleared { removed } => println!("removed {} pin(s)", removed),
                _ => {}
            }
            if report.opened_post.is_some() {
                if let Some(sheet) = home.post_sheet() {
                    println!("{}", sheet);
                }
            }
        }
        Command::Reset => home.reset_placement(),
        Command::Confirm => println!("{}", home.compose_sheet()),
        Command::Submit(message) => {
            let _ = home.submit_post(&message).await;
        }
        Command::Open(post_id) => {
            if home.open_post(&post_id).await.is_ok() {
                if let Some(sheet) = home.post_sheet() {
                    println!("{}", sheet);
                }
            }
        }
        Command::Close => home.close_post(),
        Command::DeletePost => {
            let _ = home.delete_post().await;
        }
        Command::Comment(message) => {
            if home.post_comment(&message).await.is_ok() {
                if let Some(sheet) = home.post_sheet() {
                    println!("{}", sheet);
                }
            }
        }
        Command::DeleteComment(comment_id) => {
            let _ = home.delete_comment(&comment_id).await;
        }
        Command::Mentors => {
            if home.load_mentors().await.is_ok() {
                if let Some(sheet) = home.post_sheet() {
                    println!("{}", sheet);
                }
            }
        }
        Command::Choose(mentor_id) => {
            let _ = home.mentors().choose(&mentor_id).await;
        }
        Command::Toggle => {
            if let Ok(available) = home.mentors().toggle_availability().await {
                println!("available: {}", available);
            }
        }
        Command::Mentee => match home.mentors().load_mentee().await {
            Ok(Some(link)) => match link.mentor {
                Some(mentor) => println!("{} is mentored by {}", link.mentee.username, mentor.username),
                None => println!("{} has no mentor yet", link.mentee.username),
            },
            Ok(None) => println!("no mentee record"),
            Err(_) => {}
        },
        Command::Map => match layer.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => println!("failed to encode map layer: {}", e),
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}
