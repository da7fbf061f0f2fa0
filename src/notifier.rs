// Lifecycle listeners - fan-out of lifecycle events to extensions

use crate::model::{StepResult, TestResult};
use anyhow::Result;
use std::panic::{self, AssertUnwindSafe};

/// Hooks an extension can observe. Every method is optional.
///
/// Listeners may mutate the result they are handed. A listener that returns an
/// error or panics is logged and skipped; the remaining listeners still run.
pub trait LifecycleListener: Send + Sync {
    fn before_test_result_start(&self, _result: &mut TestResult) -> Result<()> {
        Ok(())
    }

    fn after_test_result_start(&self, _result: &mut TestResult) -> Result<()> {
        Ok(())
    }

    fn before_test_result_stop(&self, _result: &mut TestResult) -> Result<()> {
        Ok(())
    }

    fn after_test_result_stop(&self, _result: &mut TestResult) -> Result<()> {
        Ok(())
    }

    fn before_test_result_update(&self, _result: &mut TestResult) -> Result<()> {
        Ok(())
    }

    fn after_test_result_update(&self, _result: &mut TestResult) -> Result<()> {
        Ok(())
    }

    fn before_test_result_write(&self, _result: &mut TestResult) -> Result<()> {
        Ok(())
    }

    fn after_test_result_write(&self, _result: &mut TestResult) -> Result<()> {
        Ok(())
    }

    fn before_step_stop(&self, _result: &mut StepResult) -> Result<()> {
        Ok(())
    }

    fn after_step_stop(&self, _result: &mut StepResult) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct Notifier {
    listeners: Vec<Box<dyn LifecycleListener>>,
}

impl Notifier {
    pub fn new(listeners: Vec<Box<dyn LifecycleListener>>) -> Self {
        Self { listeners }
    }

    pub fn add(&mut self, listener: Box<dyn LifecycleListener>) {
        self.listeners.push(listener);
    }

    fn dispatch<T>(
        &self,
        hook: &str,
        result: &mut T,
        call: impl Fn(&dyn LifecycleListener, &mut T) -> Result<()>,
    ) {
        for listener in &self.listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| call(listener.as_ref(), result)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Lifecycle listener failed in {}: {:#}", hook, e),
                Err(_) => tracing::error!("Lifecycle listener panicked in {}", hook),
            }
        }
    }

    pub fn before_test_result_start(&self, result: &mut TestResult) {
        self.dispatch("beforeTestResultStart", result, |l, r| l.before_test_result_start(r));
    }

    pub fn after_test_result_start(&self, result: &mut TestResult) {
        self.dispatch("afterTestResultStart", result, |l, r| l.after_test_result_start(r));
    }

    pub fn before_test_result_stop(&self, result: &mut TestResult) {
        self.dispatch("beforeTestResultStop", result, |l, r| l.before_test_result_stop(r));
    }

    pub fn after_test_result_stop(&self, result: &mut TestResult) {
        self.dispatch("afterTestResultStop", result, |l, r| l.after_test_result_stop(r));
    }

    pub fn before_test_result_update(&self, result: &mut TestResult) {
        self.dispatch("beforeTestResultUpdate", result, |l, r| l.before_test_result_update(r));
    }

    pub fn after_test_result_update(&self, result: &mut TestResult) {
        self.dispatch("afterTestResultUpdate", result, |l, r| l.after_test_result_update(r));
    }

    pub fn before_test_result_write(&self, result: &mut TestResult) {
        self.dispatch("beforeTestResultWrite", result, |l, r| l.before_test_result_write(r));
    }

    pub fn after_test_result_write(&self, result: &mut TestResult) {
        self.dispatch("afterTestResultWrite", result, |l, r| l.after_test_result_write(r));
    }

    pub fn before_step_stop(&self, result: &mut StepResult) {
        self.dispatch("beforeStepStop", result, |l, r| l.before_step_stop(r));
    }

    pub fn after_step_stop(&self, result: &mut StepResult) {
        self.dispatch("afterStepStop", result, |l, r| l.after_step_stop(r));
    }
}
