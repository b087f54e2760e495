//! Executors: the units that implement a command's behavior
//!
//! Executors are looked up by the path the inventory declares. In-process
//! executors are registered up front in an [`ExecutorRegistry`]; paths not in
//! the registry may resolve to executable files run by [`ExternalExecutor`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{Invocation, OptionValue};
use crate::exitcode;
use crate::infrastructure::traits::CommandRunner;

/// Failure raised by an executor. Opaque to the dispatcher.
pub type ExecutorError = Box<dyn std::error::Error + Send + Sync>;

/// Exit status produced by an executor, or its failure.
pub type ExecutorResult = Result<i32, ExecutorError>;

/// Implements one command.
pub trait Executor: Send + Sync {
    fn execute(&self, invocation: &Invocation) -> ExecutorResult;
}

impl<F> Executor for F
where
    F: Fn(&Invocation) -> ExecutorResult + Send + Sync,
{
    fn execute(&self, invocation: &Invocation) -> ExecutorResult {
        self(invocation)
    }
}

/// Normalize an executor path so `./cmd/a`, `cmd/a` and `cmd\a` name the same executor.
pub fn executor_key(path: &str) -> String {
    let mut key = path.trim().replace('\\', "/");
    while let Some(rest) = key.strip_prefix("./") {
        key = rest.to_string();
    }
    key
}

/// Executor path → in-process executor.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: BTreeMap<String, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration.
    pub fn register(mut self, path: &str, executor: impl Executor + 'static) -> Self {
        self.insert(path, executor);
        self
    }

    /// Builder-style registration of a closure; its signature is inferred.
    pub fn register_fn<F>(self, path: &str, f: F) -> Self
    where
        F: Fn(&Invocation) -> ExecutorResult + Send + Sync + 'static,
    {
        self.register(path, f)
    }

    /// Register `executor` under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: &str, executor: impl Executor + 'static) {
        self.executors.insert(executor_key(path), Arc::new(executor));
    }

    pub fn get(&self, path: &str) -> Option<Arc<dyn Executor>> {
        self.executors.get(&executor_key(path)).cloned()
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.executors.keys()).finish()
    }
}

/// Runs an executable file as a child process.
///
/// argv is the command name followed by `--<option> <value>` pairs in option
/// name order. Booleans are passed as a bare `--<option>` when true and
/// omitted when false.
pub struct ExternalExecutor {
    program: PathBuf,
    working_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl ExternalExecutor {
    pub fn new(program: PathBuf, working_dir: PathBuf, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program,
            working_dir,
            runner,
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// Arguments passed to the program for `invocation`.
    pub fn arguments(invocation: &Invocation) -> Vec<String> {
        let mut args = vec![invocation.name.clone()];
        for (name, value) in &invocation.options {
            match value {
                OptionValue::Boolean(true) => args.push(format!("--{}", name)),
                OptionValue::Boolean(false) => {}
                other => {
                    args.push(format!("--{}", name));
                    args.push(other.to_string());
                }
            }
        }
        args
    }
}

impl Executor for ExternalExecutor {
    fn execute(&self, invocation: &Invocation) -> ExecutorResult {
        let args = Self::arguments(invocation);
        debug!("execute: program={} args={:?}", self.program.display(), args);
        let status = self
            .runner
            .run_inherited(&self.program, &args, &self.working_dir)?;
        // Killed by a signal: no code to forward.
        Ok(status.code().unwrap_or(exitcode::FAILURE))
    }
}
