//! Lifecycle callback chains
//!
//! A [`CallbackChain`] wraps a core action in three phases, each run in
//! registration order:
//!
//! ```text
//! before* -> around*(core) -> after*
//! ```
//!
//! A before callback returning [`Flow::Halt`] cancels the action: the core and
//! all later phases are skipped and [`CallbackChain::run`] reports `false`.
//! Around callbacks receive an explicit continuation and must call it for the
//! core to happen; the first registered around callback is the outermost.
//!
//! # Example
//!
//! ```rust
//! use acton_paranoid::callbacks::{CallbackChain, Flow};
//! use acton_paranoid::Record;
//!
//! let mut chain = CallbackChain::default();
//! chain.before(|record| {
//!     Ok(if record.get("locked").is_null() { Flow::Continue } else { Flow::Halt })
//! });
//!
//! let mut record = Record::new("Post", "id").with("locked", true);
//! let ran = chain.run(&mut record, |_| Ok(())).unwrap();
//! assert!(!ran);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::record::Record;

/// Outcome of a before callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Proceed with the action
    Continue,
    /// Cancel the action
    Halt,
}

/// Continuation handed to around callbacks
pub type Next<'a> = &'a mut dyn FnMut(&mut Record) -> Result<()>;

/// Callback run before the action
pub type BeforeCallback = Arc<dyn Fn(&Record) -> Result<Flow> + Send + Sync>;

/// Callback wrapping the action
pub type AroundCallback = Arc<dyn Fn(&mut Record, Next<'_>) -> Result<()> + Send + Sync>;

/// Callback run after the action
pub type AfterCallback = Arc<dyn Fn(&Record) -> Result<()> + Send + Sync>;

/// Ordered before/around/after callbacks for one named action
#[derive(Clone, Default)]
pub struct CallbackChain {
    before: Vec<BeforeCallback>,
    around: Vec<AroundCallback>,
    after: Vec<AfterCallback>,
}

impl CallbackChain {
    /// Register a before callback
    pub fn before<F>(&mut self, callback: F)
    where
        F: Fn(&Record) -> Result<Flow> + Send + Sync + 'static,
    {
        self.before.push(Arc::new(callback));
    }

    /// Register an around callback
    pub fn around<F>(&mut self, callback: F)
    where
        F: Fn(&mut Record, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.around.push(Arc::new(callback));
    }

    /// Register an after callback
    pub fn after<F>(&mut self, callback: F)
    where
        F: Fn(&Record) -> Result<()> + Send + Sync + 'static,
    {
        self.after.push(Arc::new(callback));
    }

    /// Whether no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.around.is_empty() && self.after.is_empty()
    }

    /// Run the chain around `core`
    ///
    /// Returns `Ok(true)` when the core ran and every phase completed, and
    /// `Ok(false)` when a before callback halted or no around callback
    /// continued. Errors from callbacks or the core propagate unchanged.
    pub fn run<F>(&self, record: &mut Record, mut core: F) -> Result<bool>
    where
        F: FnMut(&mut Record) -> Result<()>,
    {
        for callback in &self.before {
            if callback(record)? == Flow::Halt {
                tracing::debug!(
                    record_type = record.type_name(),
                    id = %record.id(),
                    "before callback halted the chain"
                );
                return Ok(false);
            }
        }

        let mut ran = false;
        {
            let mut tracked = |r: &mut Record| {
                ran = true;
                core(r)
            };
            run_around(&self.around, record, &mut tracked)?;
        }
        if !ran {
            tracing::debug!(
                record_type = record.type_name(),
                id = %record.id(),
                "around callbacks did not continue"
            );
            return Ok(false);
        }

        for callback in &self.after {
            callback(record)?;
        }
        Ok(true)
    }
}

fn run_around(callbacks: &[AroundCallback], record: &mut Record, core: Next<'_>) -> Result<()> {
    match callbacks.split_first() {
        None => core(record),
        Some((callback, rest)) => callback(record, &mut |r: &mut Record| {
            run_around(rest, r, &mut *core)
        }),
    }
}

impl fmt::Debug for CallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackChain")
            .field("before", &self.before.len())
            .field("around", &self.around.len())
            .field("after", &self.after.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::filter::Value;
    use std::sync::Mutex;

    fn record() -> Record {
        Record::new("Post", "id").with("id", 1_i64)
    }

    fn logger(log: &Arc<Mutex<Vec<String>>>, entry: &'static str) -> impl Fn() + Send + Sync {
        let log = Arc::clone(log);
        move || log.lock().unwrap().push(entry.to_string())
    }

    #[test]
    fn test_empty_chain_runs_core() {
        let chain = CallbackChain::default();
        let mut r = record();
        let ran = chain.run(&mut r, |r| {
            r.set("touched", true);
            Ok(())
        });
        assert!(ran.unwrap());
        assert_eq!(r.get("touched"), &Value::Boolean(true));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_phase_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = CallbackChain::default();

        let b1 = logger(&log, "before1");
        chain.before(move |_| {
            b1();
            Ok(Flow::Continue)
        });
        let b2 = logger(&log, "before2");
        chain.before(move |_| {
            b2();
            Ok(Flow::Continue)
        });
        let (a_in, a_out) = (logger(&log, "outer>"), logger(&log, "<outer"));
        chain.around(move |r, next| {
            a_in();
            next(r)?;
            a_out();
            Ok(())
        });
        let (i_in, i_out) = (logger(&log, "inner>"), logger(&log, "<inner"));
        chain.around(move |r, next| {
            i_in();
            next(r)?;
            i_out();
            Ok(())
        });
        let after = logger(&log, "after");
        chain.after(move |_| {
            after();
            Ok(())
        });

        let core = logger(&log, "core");
        let ran = chain
            .run(&mut record(), |_| {
                core();
                Ok(())
            })
            .unwrap();

        assert!(ran);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["before1", "before2", "outer>", "inner>", "core", "<inner", "<outer", "after"]
        );
    }

    #[test]
    fn test_before_halt_skips_everything_after() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = CallbackChain::default();
        chain.before(|_| Ok(Flow::Halt));
        let later = logger(&log, "later-before");
        chain.before(move |_| {
            later();
            Ok(Flow::Continue)
        });
        let after = logger(&log, "after");
        chain.after(move |_| {
            after();
            Ok(())
        });

        let core = logger(&log, "core");
        let ran = chain
            .run(&mut record(), |_| {
                core();
                Ok(())
            })
            .unwrap();

        assert!(!ran);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_around_without_continuation_skips_core() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = CallbackChain::default();
        chain.around(|_, _| Ok(()));
        let after = logger(&log, "after");
        chain.after(move |_| {
            after();
            Ok(())
        });

        let core = logger(&log, "core");
        let ran = chain
            .run(&mut record(), |_| {
                core();
                Ok(())
            })
            .unwrap();

        assert!(!ran);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_errors_propagate() {
        let mut chain = CallbackChain::default();
        chain.after(|_| Err(Error::Callback("boom".to_string())));
        let result = chain.run(&mut record(), |_| Ok(()));
        assert!(matches!(result, Err(Error::Callback(msg)) if msg == "boom"));

        let chain = CallbackChain::default();
        let result = chain.run(&mut record(), |_| Err(Error::Callback("core".to_string())));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_shows_counts() {
        let mut chain = CallbackChain::default();
        chain.before(|_| Ok(Flow::Continue));
        let debug = format!("{:?}", chain);
        assert!(debug.contains("before: 1"));
        assert!(debug.contains("around: 0"));
    }
}
