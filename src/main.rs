use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidcat::handlers::{admin, auth, navigation, player, videos};
use vidcat::ui::dom::Element;
use vidcat::validation::forms::{LoginForm, RegisterForm, UploadForm};
use vidcat::{AppState, Config};

const HELP: &str = "\
commands:
  go <#fragment>                            navigate
  login <email> <password>
  register <username> <email> <password> <confirm>
  upload <file> <title> <category> [description]
  logout
  click <action> <id>                       press a button in a list
  confirm | cancel                          answer the open dialog
  play <id> | seek <seconds> | close
  download <id> [path]
  show                                      print the page
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = Arc::new(AppState::from_config(config)?);
    navigation::start(&state).await;

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some((command, args)) = words.split_first() else {
            continue;
        };

        match (command.as_str(), args) {
            ("quit" | "exit", _) => break,
            ("help", _) => println!("{}", HELP),
            ("show", _) => println!("{}", state.snapshot().to_html()),
            ("go", [fragment]) => navigation::navigate(&state, fragment).await,
            ("login", [email, password]) => {
                auth::login(&state, LoginForm::new(email.as_str(), password.as_str())).await;
            }
            ("register", [username, email, password, confirm]) => {
                let form = RegisterForm::new(username.as_str(), email.as_str(), password.as_str(), confirm.as_str());
                auth::register(&state, form).await;
            }
            ("upload", [file, title, category, description @ ..]) => {
                let form = UploadForm {
                    title: title.clone(),
                    category: category.clone(),
                    description: description.join(" "),
                    file: Some(PathBuf::from(file)),
                };
                videos::upload(&state, form).await;
            }
            ("logout", _) => {
                auth::logout(&state).await;
            }
            ("click", [action, id]) => click(&state, action, id),
            ("confirm", _) => state.confirm.confirm(),
            ("cancel", _) => state.confirm.cancel(),
            ("play", [id]) => match id.parse::<i64>() {
                Ok(id) => {
                    player::open_video(&state, id).await;
                }
                Err(_) => println!("invalid id: {}", id),
            },
            ("seek", [seconds]) => match seconds.parse::<f64>() {
                Ok(seconds) => {
                    if let Err(e) = player::record_playback(&state, seconds) {
                        e.log("seek");
                    }
                }
                Err(_) => println!("invalid position: {}", seconds),
            },
            ("close", _) => player::close_player(&state),
            ("download", [id, rest @ ..]) => match id.parse::<i64>() {
                Ok(id) => {
                    player::download_video(&state, id, rest.first().map(PathBuf::from)).await;
                }
                Err(_) => println!("invalid id: {}", id),
            },
            _ => println!("unknown command, try `help`"),
        }

        let notification = state.snapshot().notification;
        if notification.visible {
            let kind = if notification.is_error { "error" } else { "ok" };
            println!("[{}] {}", kind, notification.message);
        }
    }

    tracing::info!("👋 Bye");
    Ok(())
}

/// Dispatches a button press found in the rendered lists.
///
/// Runs in the background so the dialog it may open can be answered.
fn click(state: &Arc<AppState>, action: &str, id: &str) {
    let Ok(id) = id.parse::<i64>() else {
        println!("invalid id: {}", id);
        return;
    };

    let page = state.snapshot();
    let target: Option<Element> = [&page.video_list, &page.admin_user_list, &page.admin_video_list]
        .into_iter()
        .find_map(|list| list.find_action(action, id))
        .cloned();

    let Some(target) = target else {
        println!("no `{}` button for #{}", action, id);
        return;
    };

    let state = state.clone();
    tokio::spawn(async move {
        if target.get_data("action") == Some("play-video") {
            videos::handle_catalog_click(&state, &target).await;
        } else {
            admin::handle_dashboard_click(&state, &target).await;
        }
    });
}
