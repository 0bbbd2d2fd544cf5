//! Line commands understood by the terminal front end.

use std::str::FromStr;
use thiserror::Error;

use crate::form::{Field, UnknownField};

pub const HELP: &str = "\
comandos:
  <campo>=<valor>   preenche um campo (nome, sobrenome, email, dia, mes, ano)
  submit            calcula
  reset             limpa o formulário
  theme             alterna tema claro/escuro
  show              mostra o formulário
  json              mostra o estado em JSON
  help              esta ajuda
  quit              sai";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Change a field and then blur it.
    Set(Field, String),
    Submit,
    Reset,
    ToggleTheme,
    Show,
    Json,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error(transparent)]
    Field(#[from] UnknownField),
}

/// Portuguese aliases accepted besides the field names and labels.
fn field_alias(name: &str) -> Option<Field> {
    match name.to_ascii_lowercase().as_str() {
        "nome" => Some(Field::FirstName),
        "sobrenome" => Some(Field::LastName),
        "dia" => Some(Field::Day),
        "mes" => Some(Field::Month),
        "ano" => Some(Field::Year),
        _ => None,
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        if let Some((name, value)) = line.split_once('=') {
            let name = name.trim();
            let field = match field_alias(name) {
                Some(field) => field,
                None => name.parse::<Field>()?,
            };
            // The value is kept verbatim; trimming is the validators' call.
            return Ok(Command::Set(field, value.to_string()));
        }

        match line.to_ascii_lowercase().as_str() {
            "submit" | "calcular" => Ok(Command::Submit),
            "reset" | "limpar" => Ok(Command::Reset),
            "theme" | "tema" => Ok(Command::ToggleTheme),
            "show" => Ok(Command::Show),
            "json" => Ok(Command::Json),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(line.to_string())),
        }
    }
}
