//! Generational EA configuration.
//!
//! [`EaConfig`] holds the parameters of the evolutionary loop itself.
//! Genome length and bounds belong to the representation, tournament size
//! to the [`Selection`](super::Selection), and rates to the mutation
//! operators.

use crate::error::ConfigError;

/// Configuration for the generational EA.
///
/// # Defaults
///
/// ```
/// use u_evolve::ea::EaConfig;
///
/// let config = EaConfig::default();
/// assert_eq!(config.population_size, 10);
/// assert_eq!(config.max_generations, 100);
/// assert_eq!(config.elites, 0);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evolve::ea::EaConfig;
///
/// let config = EaConfig::default()
///     .with_population_size(50)
///     .with_max_generations(200)
///     .with_elites(1)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EaConfig {
    /// Number of individuals in every generation.
    pub population_size: usize,

    /// Number of generations produced after generation 0.
    pub max_generations: usize,

    /// Number of best parents that compete with offspring for survival.
    ///
    /// 0 gives full generational replacement.
    pub elites: usize,

    /// Whether to evaluate each generation with rayon.
    ///
    /// Evaluation stages of the pipeline are deferred until the offspring
    /// are pooled, then the whole population is evaluated in one parallel
    /// pass. Only runs on rayon with the `parallel` feature; without it the
    /// deferred pass is sequential.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked before each generation is built, so the run may exceed the
    /// limit by one generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for EaConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            max_generations: 100,
            elites: 0,
            parallel: false,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl EaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the elite count.
    pub fn with_elites(mut self, k: usize) -> Self {
        self.elites = k;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.max_generations == 0 {
            return Err(ConfigError::ZeroGenerations);
        }
        if self.elites >= self.population_size {
            return Err(ConfigError::TooManyElites {
                elites: self.elites,
                population_size: self.population_size,
            });
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EaConfig::default();
        assert_eq!(config.population_size, 10);
        assert_eq!(config.max_generations, 100);
        assert_eq!(config.elites, 0);
        assert!(!config.parallel);
        assert!(config.seed.is_none());
        assert!(config.time_limit_ms.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EaConfig::default()
            .with_population_size(200)
            .with_max_generations(1000)
            .with_elites(2)
            .with_parallel(true)
            .with_seed(42)
            .with_time_limit_ms(5000);

        assert_eq!(config.population_size, 200);
        assert_eq!(config.max_generations, 1000);
        assert_eq!(config.elites, 2);
        assert!(config.parallel);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.time_limit_ms, Some(5000));
    }

    #[test]
    fn test_validate_ok() {
        assert!(EaConfig::default().validate().is_ok());
        assert!(EaConfig::default().with_population_size(1).validate().is_ok());
    }

    #[test]
    fn test_validate_zero_population() {
        let config = EaConfig::default().with_population_size(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroPopulation));
    }

    #[test]
    fn test_validate_zero_generations() {
        let config = EaConfig::default().with_max_generations(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroGenerations));
    }

    #[test]
    fn test_validate_elites_fill_population() {
        let config = EaConfig::default()
            .with_population_size(10)
            .with_elites(10);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyElites { .. })
        ));
    }

    #[test]
    fn test_validate_zero_time_limit() {
        let config = EaConfig::default().with_time_limit_ms(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeLimit));
        assert!(EaConfig::default().with_time_limit_ms(1).validate().is_ok());
    }
}
