//! Line-oriented frontend for the client runtime.

use std::{fmt::Write as _, io, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use client::{App, AppEvent, Frontend, RemoteApi, Runtime, Screen, Selection, SelectionKind};
use shared::models::{Restaurant, RestaurantFilters};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    task::JoinHandle,
};
use tracing::warn;

use super::{
    Context,
    restaurants::{print_menu, print_packages},
};

const HELP: &str = "\
commands:
  login [email]   sign in (password is prompted)
  test            check that the server is reachable
  refresh, r      reload the restaurant list
  select <n>      voucher packages of restaurant n
  menu <n>        menu of restaurant n
  check           re-check the session for the current screen
  back, b         previous screen; leaves at the first one
  logout          sign out
  help            show this help
  quit, q         leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Empty,
    Help,
    Login(Option<String>),
    Test,
    Refresh,
    Select(usize),
    Menu(usize),
    Check,
    Back,
    Logout,
    Quit,
}

/// Parses a line of input. Restaurant numbers are 1-based.
fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Empty);
    };
    let arg = words.next();

    let command = match head.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "login" => Command::Login(arg.map(str::to_string)),
        "test" | "ping" => Command::Test,
        "refresh" | "r" => Command::Refresh,
        "select" | "s" => Command::Select(parse_index(arg)?),
        "menu" | "m" => Command::Menu(parse_index(arg)?),
        "check" => Command::Check,
        "back" | "b" => Command::Back,
        "logout" => Command::Logout,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(command)
}

fn parse_index(arg: Option<&str>) -> Result<usize, String> {
    let arg = arg.ok_or_else(|| "missing restaurant number".to_string())?;
    match arg.parse::<usize>() {
        Ok(number) if number > 0 => Ok(number - 1),
        _ => Err(format!("`{arg}` is not a restaurant number")),
    }
}

struct PendingLogin {
    email: String,
    password: JoinHandle<io::Result<String>>,
}

/// Reads commands from stdin and prints screens to stdout.
struct CliFrontend {
    api: Arc<dyn RemoteApi>,
    lines: Lines<BufReader<Stdin>>,
    pending: Option<PendingLogin>,
    last_frame: String,
}

impl CliFrontend {
    fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            lines: BufReader::new(tokio::io::stdin()).lines(),
            pending: None,
            last_frame: String::new(),
        }
    }

    /// Finishes a login whose password prompt is running.
    async fn finish_login(&mut self) -> Option<AppEvent> {
        let pending = self.pending.as_mut()?;
        let joined = (&mut pending.password).await;
        let email = std::mem::take(&mut pending.email);
        self.pending = None;

        match joined {
            Ok(Ok(password)) => Some(AppEvent::SubmitLogin { email, password }),
            Ok(Err(err)) => {
                warn!(error = %err, "password prompt failed");
                println!("could not read password: {err}");
                None
            }
            Err(err) => {
                warn!(error = %err, "password prompt task failed");
                None
            }
        }
    }

    fn to_event(&mut self, command: Command, app: &App) -> Option<AppEvent> {
        let event = match command {
            Command::Empty => return None,
            Command::Help => {
                println!("{HELP}");
                return None;
            }
            Command::Login(None) => AppEvent::SubmitLogin {
                email: String::new(),
                password: String::new(),
            },
            Command::Login(Some(email)) => {
                if app.screen() != Screen::Login {
                    println!("already signed in; `logout` first");
                    return None;
                }
                let password =
                    tokio::task::spawn_blocking(|| rpassword::prompt_password("Password: "));
                self.pending = Some(PendingLogin { email, password });
                return None;
            }
            Command::Test => AppEvent::TestConnection,
            Command::Refresh => AppEvent::Refresh,
            Command::Select(index) => AppEvent::SelectRestaurant(index),
            Command::Menu(index) => AppEvent::ViewMenu(index),
            Command::Check => AppEvent::ScreenFocused,
            Command::Back => AppEvent::Back,
            Command::Logout => AppEvent::Logout,
            Command::Quit => AppEvent::Quit,
        };
        Some(event)
    }
}

#[async_trait]
impl Frontend for CliFrontend {
    async fn next_event(&mut self, app: &App) -> Option<AppEvent> {
        loop {
            if self.pending.is_some() {
                if let Some(event) = self.finish_login().await {
                    return Some(event);
                }
                continue;
            }

            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(err) => {
                    warn!(error = %err, "failed to read input");
                    return None;
                }
            };

            match parse_command(&line) {
                Ok(command) => {
                    if let Some(event) = self.to_event(command, app) {
                        return Some(event);
                    }
                }
                Err(message) => println!("{message}"),
            }
        }
    }

    fn render(&mut self, app: &App) {
        let frame = frame(app);
        if frame != self.last_frame {
            if !frame.is_empty() {
                println!("{frame}");
            }
            self.last_frame = frame;
        }
    }

    fn navigated(&mut self, screen: Screen) {
        self.last_frame.clear();
        match screen {
            Screen::Splash => {}
            Screen::Login => println!("== login ==  (type `login <email>` or `help`)"),
            Screen::Restaurants => println!("== restaurants ==  (type `help` for commands)"),
        }
    }

    fn selected(&mut self, selection: &Selection) {
        let api = Arc::clone(&self.api);
        let kind = selection.kind;
        let Restaurant { id, name, .. } = selection.restaurant.clone();

        tokio::spawn(async move {
            match kind {
                SelectionKind::Packages => match api.restaurant_packages(id).await {
                    Ok(packages) if packages.is_empty() => {
                        println!("{name} has no voucher packages");
                    }
                    Ok(packages) => {
                        println!("Voucher packages for {name}");
                        print_packages(&packages);
                    }
                    Err(err) => println!("Could not load packages for {name}: {err}"),
                },
                SelectionKind::Menu => match api.restaurant_menu(id).await {
                    Ok(items) if items.is_empty() => println!("{name} has no menu items"),
                    Ok(items) => {
                        println!("Menu for {name}");
                        print_menu(&items);
                    }
                    Err(err) => println!("Could not load the menu of {name}: {err}"),
                },
            }
        });
    }
}

/// Text of the current screen.
fn frame(app: &App) -> String {
    let mut out = String::new();
    match app.screen() {
        Screen::Splash => {}
        Screen::Login => {
            if let Some(status) = app.login().status() {
                out.push_str(&status.message);
            }
        }
        Screen::Restaurants => {
            let list = app.restaurants();
            if let Some(user) = app.session().current_user() {
                let _ = writeln!(out, "signed in as {}", user.display_name());
            }
            for (index, restaurant) in list.items().iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>3}. {} ({}, {})  rating {}",
                    index + 1,
                    restaurant.name,
                    restaurant.cuisine,
                    restaurant.location,
                    restaurant.formatted_rating()
                );
            }
            if list.is_refreshing() {
                out.push_str(if list.items().is_empty() {
                    "Loading restaurants..."
                } else {
                    "refreshing..."
                });
            } else if let Some(notice) = list.notice() {
                out.push_str(notice.message());
            }
        }
    }
    out.trim_end().to_string()
}

/// Runs the interactive session until `quit` or end of input.
pub async fn run(ctx: &Context, filters: RestaurantFilters) -> Result<()> {
    let app = App::with_filters(ctx.session.clone(), filters);
    let api: Arc<dyn RemoteApi> = ctx.api.clone();
    let frontend = CliFrontend::new(Arc::clone(&api));
    let mut runtime = Runtime::new(app, api, frontend);
    runtime.run().await;
    Ok(())
}
