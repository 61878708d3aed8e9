//! One run of the generator: read a description, build the prompt, stream
//! the answer.

use crate::{
    config::{Config, API_KEY_VAR},
    input::InputCollector,
    llm_generator::{stream_to_writer, CodeGenerator, GeminiGenerator, MockGenerator},
    prompt::{build_code_generation_prompt, indent},
};
use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing::{info, warn};

const RULE: &str = "-----------------------------------------";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// End of input or an empty description; nothing was sent.
    NoInput,
    /// The credential was not set; nothing was sent.
    MissingCredential,
    /// A request was made. `None` when generation failed.
    Generated(Option<String>),
}

impl Outcome {
    pub fn exit_status(&self) -> u8 {
        match self {
            Outcome::MissingCredential => 1,
            Outcome::NoInput | Outcome::Generated(_) => 0,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

pub struct CodeSession {
    config: Config,
    collector: InputCollector,
}

impl CodeSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            collector: InputCollector::new(),
        }
    }

    /// Runs against the process stdin, stdout and stderr, reading the
    /// credential from the environment.
    pub async fn run(&self, description: Option<String>) -> Result<Outcome> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stderr = io::stderr();
        self.run_with_io(
            description,
            &mut stdin.lock(),
            &mut stdout,
            &mut stderr,
            Config::api_key(),
        )
        .await
    }

    /// Runs the whole flow on injected streams.
    ///
    /// When `description` is given the interactive prompt is skipped.
    pub async fn run_with_io<R: BufRead, W: Write, E: Write>(
        &self,
        description: Option<String>,
        input: &mut R,
        output: &mut W,
        errors: &mut E,
        api_key: Option<String>,
    ) -> Result<Outcome> {
        let description = match description {
            Some(description) => Some(description),
            None => self.collector.collect_with_io(input, output)?,
        };

        let description = match description {
            None => {
                writeln!(output, "\nNo input received. Exiting.")?;
                return Ok(Outcome::NoInput);
            }
            Some(d) if d.is_empty() => {
                writeln!(output, "No description provided. Exiting.")?;
                return Ok(Outcome::NoInput);
            }
            Some(d) => d,
        };

        info!("Building {} prompt for: {}", self.config.language, description);
        let prompt = build_code_generation_prompt(&description, &self.config.language);

        writeln!(output, "\nSending the following request to Gemma:")?;
        writeln!(output, "{}", RULE)?;
        writeln!(output, "{}", indent(&prompt, "  "))?;
        writeln!(output, "{}", RULE)?;
        output.flush()?;

        let generator: Box<dyn CodeGenerator> = if self.config.is_mock_mode() {
            info!("Using mock generator (GEMMA_CODEGEN_USE_MOCK is set)");
            Box::new(MockGenerator::new())
        } else {
            match api_key {
                Some(key) => Box::new(GeminiGenerator::new(&self.config, key)),
                None => {
                    writeln!(errors, "Error: {} environment variable not set.", API_KEY_VAR)?;
                    writeln!(errors, "Please set the environment variable and try again.")?;
                    return Ok(Outcome::MissingCredential);
                }
            }
        };

        let generated = Self::generate_with(generator.as_ref(), &prompt, output, errors).await?;

        if generated.as_deref().is_some_and(|text| !text.is_empty()) {
            writeln!(output, "\nCode generation process complete.")?;
        }

        Ok(Outcome::Generated(generated))
    }

    /// Streams one generation to `output`.
    ///
    /// Generation failures are reported on `errors` and turned into `None`;
    /// only failures to write to the terminal itself are returned as errors.
    pub async fn generate_with<W: Write, E: Write>(
        generator: &dyn CodeGenerator,
        prompt: &str,
        output: &mut W,
        errors: &mut E,
    ) -> Result<Option<String>> {
        writeln!(output, "\nAttempting to generate code...")?;
        writeln!(output, "\n--- Gemma's Generated Code ({}) ---", generator.model_name())?;
        output.flush()?;

        let result = match generator.stream_fragments(prompt).await {
            Ok(fragments) => stream_to_writer(fragments, output).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => {
                writeln!(output, "\n--- End of Generation ---")?;
                info!("Generation finished with {} characters", text.len());
                Ok(Some(text))
            }
            Err(e) => {
                warn!("Generation failed: {:#}", e);
                output.flush()?;
                writeln!(errors, "\nAn error occurred during generation: {:#}", e)?;
                writeln!(
                    errors,
                    "This could be due to API key issues, network problems, or model errors."
                )?;
                Ok(None)
            }
        }
    }
}
