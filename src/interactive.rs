use std::io::{BufRead, Write};
use tracing::debug;

use crate::error::{PolyglotError, Result};
use crate::session::Session;

const HELP: &str = "\
Type English text and press Enter to translate it.
  :lang <name>    choose the destination language
  :small on|off   use the smaller CPU-friendly model
  :list           show available destination languages
  :help           show this message
  :quit           leave";

/// One parsed line of prompt input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptCommand {
    Translate(String),
    SelectLanguage(String),
    SmallModel(bool),
    List,
    Help,
    Quit,
    Invalid(String),
}

impl PromptCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            return PromptCommand::Translate(line.trim_end_matches(['\r', '\n']).to_string());
        };

        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };

        match (name.to_lowercase().as_str(), argument) {
            ("lang" | "language", "") => PromptCommand::Invalid("Usage: :lang <name>".to_string()),
            ("lang" | "language", language) => PromptCommand::SelectLanguage(language.to_string()),
            ("small", "on") => PromptCommand::SmallModel(true),
            ("small", "off") => PromptCommand::SmallModel(false),
            ("small", _) => PromptCommand::Invalid("Usage: :small on|off".to_string()),
            ("list", _) => PromptCommand::List,
            ("help", _) => PromptCommand::Help,
            ("quit" | "exit" | "q", _) => PromptCommand::Quit,
            (other, _) => PromptCommand::Invalid(format!("Unknown command ':{}'. Type :help", other)),
        }
    }
}

/// Line-oriented translation prompt over a session
pub struct Prompt<'a> {
    session: &'a Session,
    language: Option<String>,
    use_alternate: bool,
}

impl<'a> Prompt<'a> {
    pub fn new(session: &'a Session, language: Option<String>, use_alternate: bool) -> Self {
        Self {
            session,
            language,
            use_alternate,
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn uses_alternate(&self) -> bool {
        self.use_alternate
    }

    /// Read lines until end of input or `:quit`
    pub async fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "{}", HELP)?;
        self.write_prompt(&mut output)?;

        for line in input.lines() {
            let line = line?;
            let command = PromptCommand::parse(&line);
            debug!("Prompt command: {:?}", command);

            if command == PromptCommand::Quit {
                break;
            }
            self.handle(command, &mut output).await?;
            self.write_prompt(&mut output)?;
        }

        writeln!(output)?;
        Ok(())
    }

    async fn handle<W: Write>(&mut self, command: PromptCommand, output: &mut W) -> Result<()> {
        match command {
            PromptCommand::Translate(text) => self.translate(&text, output).await?,
            PromptCommand::SelectLanguage(name) => {
                if self.session.languages().resolve_code(&name).is_some() {
                    writeln!(output, "Destination language: {}", name)?;
                    self.language = Some(name);
                } else {
                    writeln!(output, "{}", PolyglotError::UnknownLanguage(name))?;
                }
            }
            PromptCommand::SmallModel(enabled) => {
                self.use_alternate = enabled;
                writeln!(
                    output,
                    "Smaller model {}",
                    if enabled { "enabled" } else { "disabled" }
                )?;
            }
            PromptCommand::List => {
                for name in self.session.languages().names() {
                    writeln!(output, "  {}", name)?;
                }
            }
            PromptCommand::Help => writeln!(output, "{}", HELP)?,
            PromptCommand::Invalid(message) => writeln!(output, "{}", message)?,
            PromptCommand::Quit => {}
        }
        Ok(())
    }

    async fn translate<W: Write>(&self, text: &str, output: &mut W) -> Result<()> {
        let Some(language) = &self.language else {
            writeln!(output, "Choose a destination language first with :lang <name>")?;
            return Ok(());
        };

        match self.session.translate(text, language, self.use_alternate).await {
            Ok(outcome) => writeln!(output, "{}", outcome)?,
            Err(e @ PolyglotError::UnknownLanguage(_)) => writeln!(output, "{}", e)?,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn write_prompt<W: Write>(&self, output: &mut W) -> Result<()> {
        let language = self.language.as_deref().unwrap_or("?");
        write!(output, "[en -> {}]> ", language)?;
        output.flush()?;
        Ok(())
    }
}
