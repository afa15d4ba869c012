use carematch::client::models::app_state::{App, AppView};
use carematch::client::models::events::{Event, NavTarget};
use carematch::client::services::match_service::SwipePhase;
use carematch::common::config::ClientConfig;
use carematch::common::models::{Profile, UserRole, LOCAL_SENDER};
use carematch::store::{AuthClient, Store};
use std::str::FromStr;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.log_level),
    )
    .init();

    let store = Store::connect(&config.database_url).await?;
    let auth = AuthClient::new(store.clone());
    let mut app = App::new(store.clone(), auth, &config);
    app.bootstrap().await;

    println!("[CLIENT] Welcome to CareMatch. Type /help for commands.");
    render(&app);

    let mut input = BufReader::new(stdin());
    let mut line = String::new();
    loop {
        line.clear();
        tokio::select! {
            n = input.read_line(&mut line) => {
                if n? == 0 {
                    break;
                }
                let cmd = line.trim();
                if cmd.is_empty() {
                    continue;
                }
                if cmd == "/quit" {
                    break;
                }
                match parse_command(cmd, &app, &store).await {
                    Ok(events) => {
                        for event in events {
                            app.update(event).await;
                        }
                        render(&app);
                    }
                    Err(e) => println!("[CLIENT] {}", e),
                }
            }
            event = app.poll_background() => {
                app.update(event).await;
                render(&app);
            }
        }
    }
    Ok(())
}

/// Translates a slash command into controller events. Commands mirror the
/// actions available in each view.
async fn parse_command(cmd: &str, app: &App, store: &Store) -> anyhow::Result<Vec<Event>> {
    let mut parts = cmd.split_whitespace();
    let command = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    let events = match command {
        "/help" => {
            print_help();
            vec![]
        }
        "/register" | "/login" if args.len() == 2 => {
            let mut events = vec![
                Event::EmailChanged(args[0].to_string()),
                Event::PasswordChanged(args[1].to_string()),
            ];
            if (command == "/login") != app.is_login {
                events.push(Event::ToggleLoginRegister);
            }
            events.push(Event::SubmitLoginOrRegister);
            events
        }
        "/logout" => vec![Event::Logout],
        "/role" if args.len() == 1 => {
            let role = UserRole::from_str(&args[0].to_uppercase())?;
            vec![Event::RoleSelected(role)]
        }
        "/name" => vec![Event::NameChanged(args.join(" "))],
        "/location" => vec![Event::LocationChanged(args.join(" "))],
        "/bio" => vec![Event::BioChanged(args.join(" "))],
        "/tags" => {
            let tags = args
                .join(" ")
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            vec![Event::TagsChanged(tags)]
        }
        "/save" => vec![Event::SaveProfile],
        "/like" => vec![Event::SwipeLike],
        "/pass" => vec![Event::SwipePass],
        "/reload" => vec![Event::ReloadCandidates],
        "/dismiss" => vec![Event::DismissMatchOverlay],
        "/openchat" => vec![Event::OpenMatchChat],
        "/nav" if args.len() == 1 => {
            let target = match args[0] {
                "swipe" => NavTarget::Swipe,
                "chats" => NavTarget::Chats,
                "settings" => NavTarget::Settings,
                other => anyhow::bail!("unknown destination: {}", other),
            };
            vec![Event::NavigateTo(target)]
        }
        "/chat" if args.len() == 1 => vec![Event::SelectChat(args[0].to_string())],
        "/msg" => vec![
            Event::MessageInputChanged(args.join(" ")),
            Event::SendMessage,
        ],
        "/back" => vec![Event::BackToChats],
        "/edit" => vec![Event::EditProfile],
        "/seed" => {
            seed_demo_profiles(store).await?;
            println!("[CLIENT] Demo profiles seeded.");
            vec![Event::ReloadCandidates]
        }
        _ => anyhow::bail!("unknown or malformed command, try /help"),
    };
    Ok(events)
}

fn render(app: &App) {
    if let Some(error) = &app.error_message {
        println!("[CLIENT] error: {}", error);
    }
    match app.view {
        AppView::Auth => {
            println!(
                "-- AUTH ({}) -- /register <email> <password> or /login <email> <password>",
                if app.is_login { "login" } else { "register" }
            );
        }
        AppView::RoleSelect => {
            println!("-- ROLE SELECT -- /role caregiver | /role careseeker");
        }
        AppView::ProfileEdit => {
            if let Some(p) = &app.profile {
                println!(
                    "-- PROFILE EDIT -- name='{}' location='{}' bio='{}' tags={:?} ({})",
                    p.name, p.location, p.bio, p.tags, p.role
                );
                println!("   /name /location /bio /tags then /save");
            }
        }
        AppView::Swipe => {
            if let Some(matched) = &app.swipe.match_found {
                println!(
                    "** IT'S A MATCH with {}! ** /openchat or /dismiss",
                    matched.name
                );
            }
            match app.swipe.phase {
                SwipePhase::Loading => println!("-- SWIPE -- loading candidates..."),
                SwipePhase::Ready(_) => {
                    if let Some(c) = app.swipe.current() {
                        println!("-- SWIPE -- {} | /like /pass", describe(c));
                    }
                }
                SwipePhase::Exhausted => {
                    println!("-- SWIPE -- no more profiles. /reload to try again");
                }
            }
        }
        AppView::Chats => {
            println!("-- CHATS -- {} match(es); /chat <id>", app.matches.len());
            for p in &app.matches {
                println!("   {} {}", p.id, describe(p));
            }
        }
        AppView::ChatDetail => {
            if let Some(session) = &app.active_chat {
                println!("-- CHAT with {} -- /msg <text>, /back", session.participant.name);
                for m in &session.messages {
                    let who = if m.sender_id == LOCAL_SENDER {
                        "me"
                    } else {
                        session.participant.name.as_str()
                    };
                    println!("   [{}] {}", who, m.text);
                }
            }
        }
        AppView::Settings => {
            println!("-- SETTINGS -- /edit to edit profile, /logout to sign out");
        }
    }
    if app.view.header_visible() {
        println!("   (nav: /nav swipe | /nav chats | /nav settings)");
    }
}

fn describe(p: &Profile) -> String {
    format!(
        "{} ({}, {}, rating {:.0}) - {}",
        p.name, p.role, p.location, p.rating, p.bio
    )
}

fn print_help() {
    println!("Commands:");
    println!("  /register <email> <password>   create an account");
    println!("  /login <email> <password>      sign in");
    println!("  /role caregiver|careseeker     pick a role after sign-up");
    println!("  /name | /location | /bio | /tags a,b   edit the profile draft");
    println!("  /save                          persist the profile");
    println!("  /like | /pass | /reload        swipe on the current candidate");
    println!("  /dismiss | /openchat           act on a match overlay");
    println!("  /nav swipe|chats|settings      navigate");
    println!("  /chat <participant-id>         open a chat from the match list");
    println!("  /msg <text> | /back            chat actions");
    println!("  /edit | /logout                settings actions");
    println!("  /seed                          insert demo candidate profiles");
    println!("  /quit                          exit");
}

/// Demo candidates, useful for trying the swipe flow on a fresh store.
async fn seed_demo_profiles(store: &Store) -> anyhow::Result<()> {
    let demo = [
        Profile {
            id: "demo-anna".to_string(),
            name: "Anna Schmidt".to_string(),
            role: UserRole::Caregiver,
            photo: "https://picsum.photos/seed/anna/600/800".to_string(),
            location: "Berlin, 5km".to_string(),
            bio: "Experienced nurse with a heart for elderly care.".to_string(),
            tags: vec![
                "Medical Care".to_string(),
                "Night Shifts".to_string(),
                "Friendly".to_string(),
            ],
            rating: 5.0,
        },
        Profile {
            id: "demo-thomas".to_string(),
            name: "Thomas Mueller".to_string(),
            role: UserRole::Careseeker,
            photo: "https://picsum.photos/seed/thomas/600/800".to_string(),
            location: "Munich, 2km".to_string(),
            bio: "Looking for help with daily errands and light cleaning.".to_string(),
            tags: vec!["Shopping".to_string(), "Cleaning".to_string(), "Weekly".to_string()],
            rating: 4.0,
        },
        Profile {
            id: "demo-elena".to_string(),
            name: "Elena K.".to_string(),
            role: UserRole::Caregiver,
            photo: "https://picsum.photos/seed/elena/600/800".to_string(),
            location: "Hamburg, 10km".to_string(),
            bio: "Student looking for part-time care opportunities.".to_string(),
            tags: vec!["Flexible".to_string(), "Driver".to_string(), "Cooking".to_string()],
            rating: 5.0,
        },
    ];
    for profile in &demo {
        store.set_profile(profile).await?;
    }
    Ok(())
}
