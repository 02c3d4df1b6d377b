//! Parser for the interactive command line.

use thiserror::Error;

use crate::dashboard::bots::{FormError, parse_assignments};
use crate::dashboard::tabs::Tab;

/// A row addressed by entity id or by its `#n` position in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Id(String),
    Row(usize),
}

impl Target {
    fn parse(arg: &str) -> Result<Self, CommandError> {
        match arg.strip_prefix('#') {
            Some(n) => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Self::Row)
                .ok_or_else(|| CommandError::InvalidRow(arg.to_string())),
            None => Ok(Self::Id(arg.to_string())),
        }
    }
}

type Assignments = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty line: the "click outside" gesture.
    ClickOutside,
    Tab(Tab),
    BotSet(Assignments),
    BotSubmit,
    BotStart(Assignments),
    BotStop(Target),
    SimSet(Assignments),
    SimSubmit,
    SimStart(Assignments),
    SimExec(Target),
    SimResults(Target),
    SimStop(Target),
    History(Option<Target>),
    Wallet,
    Close,
    Dismiss(usize),
    GotoWallet,
    Resize(u16),
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("comando desconhecido: {0}")]
    Unknown(String),
    #[error("uso: {0}")]
    Usage(&'static str),
    #[error("aba desconhecida: {0}")]
    UnknownTab(String),
    #[error("linha inválida: {0}")]
    InvalidRow(String),
    #[error("número inválido: {0}")]
    InvalidNumber(String),
    #[error(transparent)]
    Form(#[from] FormError),
}

pub const HELP: &str = "\
Comandos:
  tab <bots|sims|history|wallet>     trocar de aba
  bot set campo=valor ...            preencher o formulário de bot
  bot submit                         iniciar bot com o formulário
  bot start campo=valor ...          preencher e iniciar
  bot stop <id|#linha>               parar bot
  sim set|submit|start ...           formulário de simulação
  sim exec|results|stop <id|#linha>  executar passo, ver resultados, parar
  history [view <id|#linha>]         recarregar histórico ou ver detalhes
  wallet                             recarregar a carteira
  close                              fechar janela
  ok                                 ver carteira (aviso de saldo)
  dismiss <n>                        descartar o alerta n
  resize <colunas>                   simular largura do terminal
  refresh                            atualizar bots agora
  help | quit
  (linha vazia fecha a janela aberta)";

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = words.split_first() else {
        return Ok(Command::ClickOutside);
    };

    match head.to_ascii_lowercase().as_str() {
        "tab" => {
            let name = one(rest, "tab <bots|sims|history|wallet>")?;
            Tab::parse(name)
                .map(Command::Tab)
                .ok_or_else(|| CommandError::UnknownTab(name.to_string()))
        }
        "bot" => parse_bot(rest),
        "sim" => parse_sim(rest),
        "history" => match rest {
            [] => Ok(Command::History(None)),
            ["view", target] => Ok(Command::History(Some(Target::parse(target)?))),
            _ => Err(CommandError::Usage("history [view <id|#linha>]")),
        },
        "wallet" => Ok(Command::Wallet),
        "close" => Ok(Command::Close),
        "ok" => Ok(Command::GotoWallet),
        "dismiss" => {
            let n = one(rest, "dismiss <n>")?;
            n.parse::<usize>()
                .map(Command::Dismiss)
                .map_err(|_| CommandError::InvalidNumber(n.to_string()))
        }
        "resize" => {
            let cols = one(rest, "resize <colunas>")?;
            cols.parse::<u16>()
                .ok()
                .filter(|c| *c > 0)
                .map(Command::Resize)
                .ok_or_else(|| CommandError::InvalidNumber(cols.to_string()))
        }
        "refresh" => Ok(Command::Refresh),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn one<'a>(rest: &[&'a str], usage: &'static str) -> Result<&'a str, CommandError> {
    match rest {
        [arg] => Ok(*arg),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn parse_bot(rest: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "bot set|submit|start|stop ...";
    let Some((&verb, args)) = rest.split_first() else {
        return Err(CommandError::Usage(USAGE));
    };
    match verb {
        "set" => Ok(Command::BotSet(parse_assignments(args.iter().copied())?)),
        "submit" => Ok(Command::BotSubmit),
        "start" => Ok(Command::BotStart(parse_assignments(args.iter().copied())?)),
        "stop" => Ok(Command::BotStop(Target::parse(one(args, "bot stop <id|#linha>")?)?)),
        _ => Err(CommandError::Usage(USAGE)),
    }
}

fn parse_sim(rest: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "sim set|submit|start|exec|results|stop ...";
    let Some((&verb, args)) = rest.split_first() else {
        return Err(CommandError::Usage(USAGE));
    };
    let target = |usage| one(args, usage).and_then(Target::parse);
    match verb {
        "set" => Ok(Command::SimSet(parse_assignments(args.iter().copied())?)),
        "submit" => Ok(Command::SimSubmit),
        "start" => Ok(Command::SimStart(parse_assignments(args.iter().copied())?)),
        "exec" | "execute" => Ok(Command::SimExec(target("sim exec <id|#linha>")?)),
        "results" => Ok(Command::SimResults(target("sim results <id|#linha>")?)),
        "stop" => Ok(Command::SimStop(target("sim stop <id|#linha>")?)),
        _ => Err(CommandError::Usage(USAGE)),
    }
}
