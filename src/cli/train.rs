//! Training command: load or create a session, run generations, save it back.

use super::CliError;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use strgp::builtin;
use strgp::gp::{evolve, load_session, load_training_file, save_session, EvolutionConfig, Population, Session};

/// Options for the train command.
#[derive(Debug)]
pub(crate) struct TrainOptions {
    pub(crate) trainer: PathBuf,
    pub(crate) session: PathBuf,
    pub(crate) size: Option<usize>,
    pub(crate) generations: Option<usize>,
    pub(crate) max_tries: Option<usize>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) seed: Option<u64>,
    pub(crate) conservative: bool,
    pub(crate) progress: bool,
}

impl TrainOptions {
    /// Resolve the run configuration: file first, then command-line overrides.
    fn evolution_config(&self) -> Result<EvolutionConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => EvolutionConfig::from_json_file(path)
                .map_err(|e| CliError::new(format!("Failed to load config {}: {e}", path.display())))?,
            None => EvolutionConfig::default(),
        };
        if let Some(size) = self.size {
            config.population_size = size;
        }
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(max_tries) = self.max_tries {
            config.max_tries = max_tries;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.conservative {
            config.mutation = strgp::MutationConfig::conservative();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Execute the train command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, or the trainer or
/// session file cannot be read or written.
pub(crate) fn execute(options: &TrainOptions) -> Result<(), CliError> {
    let config = options.evolution_config()?;
    let library = builtin::library();
    let set = load_training_file(&options.trainer)
        .map_err(|e| CliError::new(format!("Failed to load trainer {}: {e}", options.trainer.display())))?;
    let mut rng = config.rng();

    let mut session = if options.session.exists() {
        load_session(&library, &options.session)
            .map_err(|e| CliError::new(format!("Failed to load {}: {e}", options.session.display())))?
    } else {
        let population = Population::new(config.population_size, &library, &config.mutation, &mut rng)?;
        Session::new(population)
    };

    println!(
        "Training {} trees for {} generations on {} cases (starting at generation {})",
        session.population.size(),
        config.generations,
        set.len(),
        session.generation
    );

    let pb = if options.progress {
        let pb = ProgressBar::new(config.generations as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations ({msg})")
            .map_err(|e| CliError::new(format!("Bad progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let stats = evolve(&mut session, &set, &library, &config, &mut rng, |g| {
        if let Some(ref pb) = pb {
            pb.set_message(format!("{} matched, {} forced", g.report.matched, g.report.forced));
            pb.inc(1);
        }
    })?;

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    save_session(&session, &library, &options.session)?;

    println!();
    println!("Generation:  {}", session.generation);
    println!("Matched:     {}", stats.matched);
    println!("Forced:      {}", stats.forced);
    println!("Match rate:  {:.1}%", stats.match_rate() * 100.0);
    println!("Time:        {:.2}s", stats.elapsed_seconds);
    println!("Saved to {}", options.session.display());

    Ok(())
}
