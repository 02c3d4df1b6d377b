//! Event loop for the interactive dashboard.
//!
//! One thread owns the [`Dashboard`] and handles events strictly one at a
//! time: typed lines from a stdin reader thread, finished requests from
//! worker threads, and timer deadlines (the next status poll, the next
//! alert expiry). Requests run on their own short-lived threads so the
//! loop keeps taking input while they are pending.

pub mod commands;

use std::collections::VecDeque;
use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Instant;

use anyhow::Result;

use crate::api::{self, Backend, Reply, Request};
use crate::dashboard::alerts::{OverlayDismiss, Severity};
use crate::dashboard::simulations::ModalDismiss;
use crate::dashboard::table::Table;
use crate::dashboard::tabs::Tab;
use crate::dashboard::{Action, Dashboard};
use crate::diagnostics::DiagnosticLog;
use crate::poller::{Poller, RetryPolicy};
use crate::render::{self, RenderOptions};

use commands::{Command, Target};

enum Event {
    Input(String),
    InputClosed,
    Reply(Reply),
}

/// What handling one command asks of the loop.
#[derive(Debug, Default, PartialEq)]
pub struct Handled {
    pub requests: Vec<Request>,
    pub refresh_status: bool,
    pub show_help: bool,
    pub quit: bool,
}

/// Apply one parsed command to the dashboard.
pub fn handle_command(dash: &mut Dashboard, command: Command, now: Instant) -> Handled {
    let mut handled = Handled::default();
    match command {
        Command::ClickOutside => {
            dash.click_outside();
        }
        Command::Tab(tab) => {
            dash.activate_tab(tab, now);
        }
        Command::BotSet(pairs) => {
            for (field, value) in pairs {
                if let Err(e) = dash.bot_form_mut().set(&field, &value) {
                    dash.notify(Severity::Warning, e.to_string(), now);
                }
            }
        }
        Command::BotStart(pairs) => {
            let mut ok = true;
            for (field, value) in pairs {
                if let Err(e) = dash.bot_form_mut().set(&field, &value) {
                    dash.notify(Severity::Warning, e.to_string(), now);
                    ok = false;
                }
            }
            if ok {
                handled.requests.extend(dash.submit_bot_form(now));
            }
        }
        Command::BotSubmit => handled.requests.extend(dash.submit_bot_form(now)),
        Command::BotStop(target) => {
            if let Some(id) = resolve(dash, Rows::Bots, &target, now) {
                handled.requests.push(dash.dispatch(&Action::StopBot(id)));
            }
        }
        Command::SimSet(pairs) => {
            for (field, value) in pairs {
                if let Err(e) = dash.simulation_form_mut().set(&field, &value) {
                    dash.notify(Severity::Warning, e.to_string(), now);
                }
            }
        }
        Command::SimStart(pairs) => {
            let mut ok = true;
            for (field, value) in pairs {
                if let Err(e) = dash.simulation_form_mut().set(&field, &value) {
                    dash.notify(Severity::Warning, e.to_string(), now);
                    ok = false;
                }
            }
            if ok {
                handled.requests.extend(dash.submit_simulation_form(now));
            }
        }
        Command::SimSubmit => handled.requests.extend(dash.submit_simulation_form(now)),
        Command::SimExec(target) => {
            if let Some(id) = resolve(dash, Rows::Simulations, &target, now) {
                handled
                    .requests
                    .push(dash.dispatch(&Action::ExecuteSimulation(id)));
            }
        }
        Command::SimResults(target) => {
            if let Some(id) = resolve(dash, Rows::Simulations, &target, now) {
                handled.requests.push(dash.dispatch(&Action::ShowResults(id)));
            }
        }
        Command::SimStop(target) => {
            if let Some(id) = resolve(dash, Rows::Simulations, &target, now) {
                handled
                    .requests
                    .push(dash.dispatch(&Action::StopSimulation(id)));
            }
        }
        Command::History(None) => {
            if dash.activate_tab(Tab::History, now) {
                handled.requests.extend(dash.refresh_history());
            }
        }
        Command::History(Some(target)) => {
            if let Some(id) = resolve(dash, Rows::History, &target, now) {
                handled.requests.push(dash.dispatch(&Action::ShowResults(id)));
            }
        }
        Command::Wallet => {
            if dash.activate_tab(Tab::Wallet, now) {
                handled.requests.extend(dash.refresh_wallet());
            }
        }
        Command::Close => {
            if !dash.dismiss_overlay(OverlayDismiss::Close) {
                dash.dismiss_modal(ModalDismiss::CloseButton);
            }
        }
        Command::GotoWallet => {
            dash.dismiss_overlay(OverlayDismiss::GotoWallet);
        }
        Command::Dismiss(position) => {
            dash.dismiss_alert(position);
        }
        Command::Resize(width) => dash.resize(width),
        Command::Refresh => handled.refresh_status = true,
        Command::Help => handled.show_help = true,
        Command::Quit => handled.quit = true,
    }
    handled
}

/// Table a `#n` target is counted in.
#[derive(Debug, Clone, Copy)]
enum Rows {
    Bots,
    Simulations,
    History,
}

/// Turn a target into an entity id, warning when a `#n` row does not exist.
fn resolve(dash: &mut Dashboard, rows: Rows, target: &Target, now: Instant) -> Option<String> {
    let n = match target {
        Target::Id(id) => return Some(id.clone()),
        Target::Row(n) => *n,
    };
    let table: Option<&Table> = match rows {
        Rows::Bots => Some(dash.bots()),
        Rows::Simulations => Some(dash.simulations()),
        Rows::History => dash.history().map(|h| &h.table),
    };
    let id = table.and_then(|t| t.key_at(n)).map(str::to_string);
    if id.is_none() {
        dash.notify(Severity::Warning, format!("Linha #{n} não encontrada"), now);
    }
    id
}

/// Run requests to completion on the current thread, following every
/// follow-up they produce. Used by the one-shot commands.
pub fn run_once(dash: &mut Dashboard, backend: &dyn Backend, requests: Vec<Request>) -> Vec<Reply> {
    let mut queue: VecDeque<Request> = requests.into();
    let mut replies = Vec::new();
    while let Some(request) = queue.pop_front() {
        dash.log().info(&format!("request {}", request.describe()));
        let reply = api::execute(backend, request);
        let effects = dash.apply(reply.clone(), Instant::now());
        queue.extend(effects.requests);
        if effects.refresh_status {
            queue.push_back(Request::Status);
        }
        replies.push(reply);
    }
    replies
}

fn spawn_request(backend: &Arc<dyn Backend>, request: Request, tx: &Sender<Event>, log: &DiagnosticLog) {
    log.info(&format!("request {}", request.describe()));
    let backend = Arc::clone(backend);
    let tx = tx.clone();
    thread::spawn(move || {
        let reply = api::execute(backend.as_ref(), request);
        let _ = tx.send(Event::Reply(reply));
    });
}

fn spawn_input(tx: Sender<Event>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(Event::Input(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Event::InputClosed);
    });
}

/// Run the interactive dashboard until `quit` or end of input.
pub fn watch(
    mut dash: Dashboard,
    backend: Arc<dyn Backend>,
    policy: RetryPolicy,
    opts: RenderOptions,
    title: &str,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Event>();
    spawn_input(tx.clone());

    let mut poller = Poller::new(policy, Instant::now());
    for request in dash.startup_requests() {
        spawn_request(&backend, request, &tx, dash.log());
    }

    let clear = std::io::stdout().is_terminal();
    let mut show_help = false;

    loop {
        let now = Instant::now();
        if poller.take_due(now) {
            spawn_request(&backend, Request::Status, &tx, dash.log());
        }
        dash.tick(now);
        draw(&dash, &opts, title, show_help, clear)?;

        let deadline = [poller.deadline(), dash.next_deadline()]
            .into_iter()
            .flatten()
            .min();
        let event = match deadline {
            Some(at) => rx.recv_timeout(at.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let now = Instant::now();
        match event {
            Ok(Event::Input(line)) => {
                show_help = false;
                let handled = match commands::parse(&line) {
                    Ok(command) => handle_command(&mut dash, command, now),
                    Err(e) => {
                        dash.notify(Severity::Warning, e.to_string(), now);
                        Handled::default()
                    }
                };
                if handled.quit {
                    break;
                }
                show_help = handled.show_help;
                if handled.refresh_status {
                    poller.refresh(now);
                }
                for request in handled.requests {
                    spawn_request(&backend, request, &tx, dash.log());
                }
            }
            Ok(Event::Reply(reply)) => {
                let effects = dash.apply(reply, now);
                if let Some(succeeded) = effects.poll_settled
                    && let Some(delay) = poller.settle(succeeded, now)
                {
                    dash.log()
                        .info(&format!("next status poll in {}s", delay.as_secs()));
                }
                if effects.refresh_status {
                    poller.refresh(now);
                }
                for request in effects.requests {
                    spawn_request(&backend, request, &tx, dash.log());
                }
            }
            Ok(Event::InputClosed) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
    Ok(())
}

fn draw(dash: &Dashboard, opts: &RenderOptions, title: &str, show_help: bool, clear: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if clear {
        write!(out, "\x1b[2J\x1b[H")?;
    }
    writeln!(out, "{title}")?;
    write!(out, "{}", render::screen(dash, opts))?;
    if show_help {
        writeln!(out, "\n{}", commands::HELP)?;
    }
    write!(out, "\n> ")?;
    out.flush()?;
    Ok(())
}
