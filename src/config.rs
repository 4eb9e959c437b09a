use std::env;

use errors::*;

/// Whether assignments may be split across worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    Serial,
    Smp,
}

/// Default minimum number of target elements before an assignment runs in parallel.
pub const DEFAULT_SMP_THRESHOLD: usize = 30_000;

/// Evaluation settings, passed explicitly to the `*_with` assignment functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub concurrency: Concurrency,
    pub smp_threshold: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            concurrency: Concurrency::Smp,
            smp_threshold: DEFAULT_SMP_THRESHOLD,
        }
    }
}

impl Config {
    pub fn serial() -> Config {
        Config { concurrency: Concurrency::Serial, ..Config::default() }
    }
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Config {
        self.concurrency = concurrency;
        self
    }
    pub fn with_smp_threshold(mut self, threshold: usize) -> Config {
        self.smp_threshold = threshold;
        self
    }

    /// Reads `WEE_EXPR_SMP` (`0`, `off` or `false` disable parallel assignment) and
    /// `WEE_EXPR_SMP_THRESHOLD` on top of the defaults.
    pub fn from_env() -> Result<Config> {
        Config::from_vars(env::var("WEE_EXPR_SMP").ok(), env::var("WEE_EXPR_SMP_THRESHOLD").ok())
    }

    fn from_vars(smp: Option<String>, threshold: Option<String>) -> Result<Config> {
        let mut config = Config::default();
        if let Some(smp) = smp {
            config.concurrency = match smp.trim().to_lowercase().as_str() {
                "0" | "off" | "false" | "no" => Concurrency::Serial,
                "1" | "on" | "true" | "yes" => Concurrency::Smp,
                other => {
                    return Err(Error::from_kind(ErrorKind::InvalidArgument(
                        format!("WEE_EXPR_SMP: unrecognized value '{}'", other))))
                }
            };
        }
        if let Some(threshold) = threshold {
            config.smp_threshold = threshold.trim().parse().map_err(|_| {
                Error::from_kind(ErrorKind::InvalidArgument(
                    format!("WEE_EXPR_SMP_THRESHOLD: expected an element count, found '{}'",
                        threshold)))
            })?;
        }
        debug!("evaluation config: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = Config::default();
        assert_eq!(c.concurrency, Concurrency::Smp);
        assert_eq!(c.smp_threshold, DEFAULT_SMP_THRESHOLD);
        assert_eq!(Config::serial().concurrency, Concurrency::Serial);
    }

    #[test]
    fn test_builder() {
        let c = Config::serial().with_concurrency(Concurrency::Smp).with_smp_threshold(0);
        assert_eq!(c, Config { concurrency: Concurrency::Smp, smp_threshold: 0 });
    }

    #[test]
    fn test_from_vars() {
        let c = Config::from_vars(Some("off".to_string()), Some(" 128 ".to_string())).unwrap();
        assert_eq!(c.concurrency, Concurrency::Serial);
        assert_eq!(c.smp_threshold, 128);

        let c = Config::from_vars(None, None).unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn test_from_vars_invalid() {
        let e = Config::from_vars(None, Some("many".to_string())).unwrap_err();
        assert!(e.is_invalid_argument());
        let e = Config::from_vars(Some("maybe".to_string()), None).unwrap_err();
        assert!(e.is_invalid_argument());
    }
}
