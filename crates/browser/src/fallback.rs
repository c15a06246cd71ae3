use futures::FutureExt;
use futures::future::BoxFuture;
use hireflow_core::{DriverError, DriverResult};
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

type Attempt<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, DriverResult<T>> + Send + 'a>;

/// Ordered chain of alternative ways to achieve one thing.
///
/// Steps run lazily in insertion order; the first `Ok` wins and later steps
/// never start.
pub struct Fallback<'a, T> {
    label: &'static str,
    steps: Vec<(&'static str, Attempt<'a, T>)>,
}

impl<'a, T: Send + 'a> Fallback<'a, T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            steps: Vec::new(),
        }
    }

    pub fn step<F, Fut>(mut self, name: &'static str, attempt: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = DriverResult<T>> + Send + 'a,
    {
        self.steps.push((name, Box::new(move || attempt().boxed())));
        self
    }

    /// Runs steps until one succeeds, returning its name and value.
    pub async fn run(self) -> Result<(&'static str, T), FallbackExhausted> {
        let mut failures = Vec::with_capacity(self.steps.len());

        for (name, attempt) in self.steps {
            match attempt().await {
                Ok(value) => {
                    debug!(chain = self.label, step = name, "fallback step succeeded");
                    return Ok((name, value));
                }
                Err(e) => {
                    debug!(chain = self.label, step = name, error = %e, "fallback step failed");
                    failures.push((name, e));
                }
            }
        }

        warn!(chain = self.label, tried = failures.len(), "all fallback steps failed");
        Err(FallbackExhausted {
            label: self.label,
            failures,
        })
    }
}

#[derive(Debug)]
pub struct FallbackExhausted {
    pub label: &'static str,
    pub failures: Vec<(&'static str, DriverError)>,
}

impl fmt::Display for FallbackExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: every strategy failed", self.label)?;
        for (name, err) in &self.failures {
            write!(f, "; {}: {}", name, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for FallbackExhausted {}

impl From<FallbackExhausted> for DriverError {
    fn from(e: FallbackExhausted) -> Self {
        DriverError::NoSuchElement(e.to_string())
    }
}
